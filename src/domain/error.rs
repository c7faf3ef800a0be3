//! Domain error types.

/// Top-level error type for bandtrader.
#[derive(Debug, thiserror::Error)]
pub enum BandtraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid weights: {reason}")]
    InvalidWeights { reason: String },

    #[error("instrument {id} has no price at rebalance time")]
    UnknownInstrument { id: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("insufficient data: have {have} records, need {need}")]
    InsufficientData { have: usize, need: usize },

    #[error("series mismatch: {reason}")]
    SeriesMismatch { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BandtraderError {
    /// True for the configuration family (bad parameters, weights, lookups).
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            BandtraderError::ConfigParse { .. }
                | BandtraderError::ConfigMissing { .. }
                | BandtraderError::ConfigInvalid { .. }
                | BandtraderError::InvalidWeights { .. }
                | BandtraderError::UnknownInstrument { .. }
        )
    }
}

impl From<&BandtraderError> for std::process::ExitCode {
    fn from(err: &BandtraderError) -> Self {
        let code: u8 = match err {
            BandtraderError::Io(_) => 1,
            BandtraderError::ConfigParse { .. }
            | BandtraderError::ConfigMissing { .. }
            | BandtraderError::ConfigInvalid { .. }
            | BandtraderError::InvalidWeights { .. }
            | BandtraderError::UnknownInstrument { .. } => 2,
            BandtraderError::Data { .. }
            | BandtraderError::InsufficientData { .. }
            | BandtraderError::SeriesMismatch { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

//! Configuration validation.
//!
//! Checks every analysis field before any data is read, so a bad config
//! fails fast with the offending section and key.

use crate::domain::error::BandtraderError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DATA_SECTION: &str = "data";
pub const ANALYSIS_SECTION: &str = "analysis";
pub const WEIGHTS_SECTION: &str = "weights";
pub const REPORT_SECTION: &str = "report";

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), BandtraderError> {
    validate_prices(config)?;
    validate_dates(config)?;
    validate_initial_investment(config)?;
    validate_halflife(config)?;
    validate_rebalance(config)?;
    validate_flags(config)?;
    validate_weights(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> BandtraderError {
    BandtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_prices(config: &dyn ConfigPort) -> Result<(), BandtraderError> {
    match config.get_string(DATA_SECTION, "prices") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(BandtraderError::ConfigMissing {
            section: DATA_SECTION.to_string(),
            key: "prices".to_string(),
        }),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), BandtraderError> {
    let start = parse_optional_date(config, "start_date")?;
    let end = parse_optional_date(config, "end_date")?;

    match (start, end) {
        (Some(start), Some(end)) if start >= end => Err(invalid(
            DATA_SECTION,
            "start_date",
            "start_date must be before end_date",
        )),
        _ => Ok(()),
    }
}

/// Optional `[data]` date; present but malformed is an error.
pub fn parse_optional_date(
    config: &dyn ConfigPort,
    field: &str,
) -> Result<Option<NaiveDate>, BandtraderError> {
    match config.get_string(DATA_SECTION, field) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                invalid(
                    DATA_SECTION,
                    field,
                    format!("invalid {} format, expected YYYY-MM-DD", field),
                )
            }),
    }
}

/// Accepted spellings of a boolean config value.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

// Validation and the config builder both read typed values through these,
// so a value that validates is the value that runs.

/// Optional `[analysis]` number; present but unparsable is an error.
pub fn read_number(config: &dyn ConfigPort, key: &str) -> Result<Option<f64>, BandtraderError> {
    match config.get_string(ANALYSIS_SECTION, key) {
        None => Ok(None),
        Some(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| invalid(ANALYSIS_SECTION, key, format!("{} must be a number", key))),
    }
}

/// Optional `[analysis]` integer. `5.0` and `1e1` are rejected.
pub fn read_whole(config: &dyn ConfigPort, key: &str) -> Result<Option<i64>, BandtraderError> {
    match config.get_string(ANALYSIS_SECTION, key) {
        None => Ok(None),
        Some(s) => s.trim().parse::<i64>().map(Some).map_err(|_| {
            invalid(
                ANALYSIS_SECTION,
                key,
                format!("{} must be a whole number, got {:?}", key, s.trim()),
            )
        }),
    }
}

/// Optional `[analysis]` boolean.
pub fn read_flag(config: &dyn ConfigPort, key: &str) -> Result<Option<bool>, BandtraderError> {
    match config.get_string(ANALYSIS_SECTION, key) {
        None => Ok(None),
        Some(s) => parse_flag(&s).map(Some).ok_or_else(|| {
            invalid(
                ANALYSIS_SECTION,
                key,
                format!("{} must be true or false, got {:?}", key, s.trim()),
            )
        }),
    }
}

fn validate_initial_investment(config: &dyn ConfigPort) -> Result<(), BandtraderError> {
    match read_number(config, "initial_investment")? {
        Some(v) if v <= 0.0 || !v.is_finite() => Err(invalid(
            ANALYSIS_SECTION,
            "initial_investment",
            "initial_investment must be positive",
        )),
        _ => Ok(()),
    }
}

fn validate_halflife(config: &dyn ConfigPort) -> Result<(), BandtraderError> {
    match read_whole(config, "halflife_days")? {
        Some(v) if v < 1 => Err(invalid(
            ANALYSIS_SECTION,
            "halflife_days",
            "halflife_days must be at least 1",
        )),
        _ => Ok(()),
    }
}

fn validate_rebalance(config: &dyn ConfigPort) -> Result<(), BandtraderError> {
    read_flag(config, "rebalance")?;
    match read_whole(config, "rebalance_frequency")? {
        Some(v) if v < 0 => Err(invalid(
            ANALYSIS_SECTION,
            "rebalance_frequency",
            "rebalance_frequency must be non-negative",
        )),
        _ => Ok(()),
    }
}

fn validate_flags(config: &dyn ConfigPort) -> Result<(), BandtraderError> {
    read_flag(config, "compare_policies")?;
    Ok(())
}

fn validate_weights(config: &dyn ConfigPort) -> Result<(), BandtraderError> {
    for (id, raw) in config.section_entries(WEIGHTS_SECTION) {
        let weight: f64 = raw
            .trim()
            .parse()
            .map_err(|_| invalid(WEIGHTS_SECTION, &id, "weight must be a number"))?;
        if weight < 0.0 || !weight.is_finite() {
            return Err(invalid(WEIGHTS_SECTION, &id, "weight must be non-negative"));
        }
    }
    Ok(())
}

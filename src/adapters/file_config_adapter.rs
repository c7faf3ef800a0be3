//! INI file configuration adapter.
//!
//! Keys are case-sensitive so instrument ids in `[weights]` keep their case.

use crate::domain::config_validation::WEIGHTS_SECTION;
use crate::domain::error::BandtraderError;
use crate::ports::config_port::ConfigPort;
use crate::ports::weight_port::WeightSource;
use configparser::ini::Ini;
use std::collections::BTreeMap;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new_cs();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new_cs();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn section_entries(&self, section: &str) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .config
            .get_map_ref()
            .get(section)
            .map(|keys| {
                keys.iter()
                    .map(|(k, v)| (k.clone(), v.clone().unwrap_or_default()))
                    .collect()
            })
            .unwrap_or_default();
        entries.sort();
        entries
    }
}

/// Weights listed as `ID = weight` lines under `[weights]`.
impl WeightSource for FileConfigAdapter {
    fn target_weights(&self) -> Result<BTreeMap<String, f64>, BandtraderError> {
        self.section_entries(WEIGHTS_SECTION)
            .into_iter()
            .map(|(id, raw)| {
                let weight: f64 = raw.trim().parse().map_err(|_| BandtraderError::ConfigInvalid {
                    section: WEIGHTS_SECTION.to_string(),
                    key: id.clone(),
                    reason: format!("weight must be a number, got {:?}", raw),
                })?;
                Ok((id, weight))
            })
            .collect()
    }
}

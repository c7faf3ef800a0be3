//! Analysis parameters.
//!
//! `AnalysisSettings` carries the scalar parameters shared by every series of
//! one run; `AnalysisConfig` is the full run description assembled from the
//! configuration file.

use crate::domain::valuation::RebalancePolicy;
use chrono::NaiveDate;
use std::path::PathBuf;

pub const DEFAULT_INITIAL_INVESTMENT: f64 = 1000.0;
pub const DEFAULT_HALFLIFE_DAYS: usize = 20;
pub const DEFAULT_REBALANCE_FREQUENCY: usize = 1;
/// Trading days per week, the source's "weekly" rebalance interval.
pub const WEEKLY_REBALANCE_DAYS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisSettings {
    pub initial_investment: f64,
    pub halflife_days: usize,
    pub policy: RebalancePolicy,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            initial_investment: DEFAULT_INITIAL_INVESTMENT,
            halflife_days: DEFAULT_HALFLIFE_DAYS,
            policy: RebalancePolicy::from_frequency(DEFAULT_REBALANCE_FREQUENCY),
        }
    }
}

/// Where the target weights come from.
#[derive(Debug, Clone, PartialEq)]
pub enum WeightSpec {
    /// `[weights]` section of the config file.
    Section,
    /// Two-column CSV file produced by an optimiser.
    File(PathBuf),
    /// Equal split over every priced instrument except the benchmark.
    Equal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub prices_path: PathBuf,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub title: String,
    pub settings: AnalysisSettings,
    pub weights: WeightSpec,
    pub benchmark: Option<String>,
    pub comparators: Vec<String>,
    pub compare_policies: bool,
    pub output: Option<PathBuf>,
    pub trade_log: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings() {
        let s = AnalysisSettings::default();
        assert!((s.initial_investment - 1000.0).abs() < f64::EPSILON);
        assert_eq!(s.halflife_days, 20);
        assert_eq!(s.policy, RebalancePolicy::Periodic { frequency_days: 1 });
    }

    #[test]
    fn settings_override() {
        let s = AnalysisSettings {
            policy: RebalancePolicy::NoRebalance,
            ..AnalysisSettings::default()
        };
        assert_eq!(s.policy, RebalancePolicy::NoRebalance);
        assert_eq!(s.halflife_days, DEFAULT_HALFLIFE_DAYS);
    }
}

//! Core domain types and logic.

pub mod prices;
pub mod weights;
pub mod valuation;
pub mod indicator;
pub mod position;
pub mod simulation;
pub mod backtest;
pub mod orchestrator;
pub mod metrics;
pub mod config_validation;
pub mod error;

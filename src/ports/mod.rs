//! Port traits for everything outside the valuation-and-signal engine.

pub mod config_port;
pub mod price_port;
pub mod report_port;
pub mod weight_port;

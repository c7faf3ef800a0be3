//! Trade log written as CSV: one row per date of the target portfolio.

use std::fs;
use std::path::Path;

use crate::domain::error::BandtraderError;
use crate::domain::orchestrator::AnalysisReport;
use crate::ports::report_port::ReportPort;

pub const TRADE_LOG_HEADER: [&str; 4] = ["date", "price", "event", "pnl_snapshot"];

#[derive(Debug, Default)]
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn csv_error(e: csv::Error) -> BandtraderError {
    BandtraderError::Io(std::io::Error::other(e.to_string()))
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &AnalysisReport, output_path: &str) -> Result<(), BandtraderError> {
        let path = Path::new(output_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(BandtraderError::Io)?;
        }

        let mut wtr = csv::Writer::from_path(path).map_err(csv_error)?;
        wtr.write_record(TRADE_LOG_HEADER).map_err(csv_error)?;
        for trade in &report.target.simulation.trades {
            wtr.write_record([
                trade.date.to_string(),
                format!("{:.4}", trade.reference_price),
                trade.event.as_str().to_string(),
                format!("{:.4}", trade.pnl_snapshot),
            ])
            .map_err(csv_error)?;
        }
        wtr.flush().map_err(BandtraderError::Io)?;

        tracing::info!(
            path = %output_path,
            rows = report.target.simulation.trades.len(),
            "trade log written"
        );
        Ok(())
    }
}

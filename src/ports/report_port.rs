//! Report generation port trait.

use crate::domain::error::BandtraderError;
use crate::domain::orchestrator::AnalysisReport;

/// Port for rendering analysis results.
pub trait ReportPort {
    fn write(&self, report: &AnalysisReport, output_path: &str) -> Result<(), BandtraderError>;
}

//! Reference bands over a portfolio value series.
//!
//! - `ewma`: exponentially weighted mean, halflife-parameterised
//! - `stddev`: trailing-window sample standard deviation
//! - `bollinger`: combines both into [`BandPoint`]s

pub mod bollinger;
pub mod ewma;
pub mod stddev;

use chrono::NaiveDate;

pub use bollinger::estimate_bands;

/// One date of band data. `stddev`, `upper` and `lower` are `None` until the
/// rolling window has filled; `None` is never the same as zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPoint {
    pub date: NaiveDate,
    pub ewma: f64,
    pub stddev: Option<f64>,
    pub upper: Option<f64>,
    pub lower: Option<f64>,
}

impl BandPoint {
    /// Upper and lower band, when both are defined.
    pub fn bands(&self) -> Option<(f64, f64)> {
        self.upper.zip(self.lower)
    }
}

pub type BandSeries = Vec<BandPoint>;

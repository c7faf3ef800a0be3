//! Bollinger-style bands around an EWMA.
//!
//! - Middle: EWMA with halflife h
//! - Upper: Middle + 2 × STDDEV(h)
//! - Lower: Middle − 2 × STDDEV(h)
//!
//! The rolling window length equals the halflife. Bands are undefined
//! wherever the standard deviation is.

use crate::domain::error::BandtraderError;
use crate::domain::indicator::ewma::calculate_ewma;
use crate::domain::indicator::stddev::rolling_stddev;
use crate::domain::indicator::{BandPoint, BandSeries};
use crate::domain::valuation::ValuePoint;

/// Band half-width in standard deviations.
pub const BAND_WIDTH_STDDEVS: f64 = 2.0;

pub fn estimate_bands(
    values: &[ValuePoint],
    halflife_days: usize,
) -> Result<BandSeries, BandtraderError> {
    if halflife_days == 0 {
        return Err(BandtraderError::ConfigInvalid {
            section: "analysis".into(),
            key: "halflife_days".into(),
            reason: "halflife_days must be at least 1".into(),
        });
    }
    if values.len() < halflife_days {
        tracing::warn!(
            records = values.len(),
            halflife_days,
            "value series shorter than band window; bands stay undefined"
        );
    }

    let raw: Vec<f64> = values.iter().map(|p| p.value).collect();
    let ewma = calculate_ewma(&raw, halflife_days);
    let stddev = rolling_stddev(&raw, halflife_days);

    let bands = values
        .iter()
        .zip(ewma)
        .zip(stddev)
        .map(|((point, middle), sd)| BandPoint {
            date: point.date,
            ewma: middle,
            stddev: sd,
            upper: sd.map(|s| middle + BAND_WIDTH_STDDEVS * s),
            lower: sd.map(|s| middle - BAND_WIDTH_STDDEVS * s),
        })
        .collect();

    Ok(bands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::ewma::decay_alpha;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_values(values: &[f64]) -> Vec<ValuePoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| ValuePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                value,
            })
            .collect()
    }

    #[test]
    fn warmup_leaves_bands_undefined() {
        let series = estimate_bands(&make_values(&[10.0, 20.0, 30.0, 40.0, 50.0]), 3).unwrap();

        assert!(series[0].bands().is_none());
        assert!(series[1].bands().is_none());
        assert!(series[2].bands().is_some());
        assert!(series[4].bands().is_some());
        // EWMA is defined throughout
        assert_eq!(series[0].ewma, 10.0);
    }

    #[test]
    fn constant_values_collapse_bands() {
        let series = estimate_bands(&make_values(&[100.0; 5]), 3).unwrap();
        let point = series[3];
        assert_relative_eq!(point.ewma, 100.0);
        assert_relative_eq!(point.upper.unwrap(), 100.0);
        assert_relative_eq!(point.lower.unwrap(), 100.0);
    }

    #[test]
    fn bands_are_two_stddevs_around_ewma() {
        let series = estimate_bands(&make_values(&[100.0, 160.0, 95.0, 130.0]), 2).unwrap();
        let alpha = decay_alpha(2);
        let ewma1 = alpha * 160.0 + (1.0 - alpha) * 100.0;
        let sd1 = 60.0 / 2.0_f64.sqrt();

        let p = series[1];
        assert_relative_eq!(p.ewma, ewma1, epsilon = 1e-12);
        assert_relative_eq!(p.stddev.unwrap(), sd1, epsilon = 1e-12);
        assert_relative_eq!(p.upper.unwrap(), ewma1 + 2.0 * sd1, epsilon = 1e-12);
        assert_relative_eq!(p.lower.unwrap(), ewma1 - 2.0 * sd1, epsilon = 1e-12);
    }

    #[test]
    fn symmetric_around_middle() {
        let series = estimate_bands(&make_values(&[10.0, 20.0, 15.0, 30.0]), 3).unwrap();
        let p = series[3];
        let up = p.upper.unwrap() - p.ewma;
        let down = p.ewma - p.lower.unwrap();
        assert_relative_eq!(up, down, epsilon = 1e-10);
    }

    #[test]
    fn dates_are_aligned() {
        let values = make_values(&[1.0, 2.0, 3.0]);
        let series = estimate_bands(&values, 2).unwrap();
        for (v, b) in values.iter().zip(&series) {
            assert_eq!(v.date, b.date);
        }
    }

    #[test]
    fn series_shorter_than_window_is_all_undefined() {
        let series = estimate_bands(&make_values(&[1.0, 2.0]), 20).unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.iter().all(|p| p.stddev.is_none()));
    }

    #[test]
    fn zero_halflife_rejected() {
        let err = estimate_bands(&make_values(&[1.0, 2.0]), 0).unwrap_err();
        assert!(err.is_config());
    }
}

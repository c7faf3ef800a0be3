#![allow(dead_code)]

use bandtrader::domain::error::BandtraderError;
use bandtrader::domain::indicator::BandPoint;
use bandtrader::domain::prices::{PriceRecord, PriceSeries};
use bandtrader::domain::valuation::ValuePoint;
use bandtrader::ports::price_port::PricePort;
use bandtrader::ports::weight_port::WeightSource;
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub struct MockPricePort {
    pub series: Option<PriceSeries>,
    pub error: Option<String>,
}

impl MockPricePort {
    pub fn new(series: PriceSeries) -> Self {
        Self {
            series: Some(series),
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            series: None,
            error: Some(reason.to_string()),
        }
    }

    fn series(&self) -> Result<&PriceSeries, BandtraderError> {
        match (&self.series, &self.error) {
            (_, Some(reason)) => Err(BandtraderError::Data {
                reason: reason.clone(),
            }),
            (Some(series), None) => Ok(series),
            (None, None) => Err(BandtraderError::Data {
                reason: "no data".into(),
            }),
        }
    }
}

impl PricePort for MockPricePort {
    fn load_prices(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, BandtraderError> {
        let series = self.series()?;
        let records = series
            .records()
            .iter()
            .filter(|r| start_date.is_none_or(|s| r.date >= s))
            .filter(|r| end_date.is_none_or(|e| r.date <= e))
            .cloned()
            .collect();
        PriceSeries::new(series.instruments().to_vec(), records)
    }

    fn list_instruments(&self) -> Result<Vec<String>, BandtraderError> {
        Ok(self.series()?.instruments().to_vec())
    }

    fn data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, BandtraderError> {
        let series = self.series()?;
        Ok(series
            .first_date()
            .zip(series.last_date())
            .map(|(first, last)| (first, last, series.len())))
    }
}

pub struct MockWeightSource(pub BTreeMap<String, f64>);

impl WeightSource for MockWeightSource {
    fn target_weights(&self) -> Result<BTreeMap<String, f64>, BandtraderError> {
        Ok(self.0.clone())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive calendar days starting 2024-01-01.
pub fn day(index: usize) -> NaiveDate {
    date(2024, 1, 1) + chrono::Duration::days(index as i64)
}

/// Price series from `(instrument, closes)` columns of equal length.
pub fn make_prices(columns: &[(&str, &[f64])]) -> PriceSeries {
    let len = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
    let records = (0..len)
        .map(|i| {
            let prices = columns
                .iter()
                .map(|(id, closes)| (id.to_string(), closes[i]))
                .collect();
            PriceRecord::new(day(i), prices)
        })
        .collect();
    let instruments = columns.iter().map(|(id, _)| id.to_string()).collect();
    PriceSeries::new(instruments, records).unwrap()
}

pub fn make_values(values: &[f64]) -> Vec<ValuePoint> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| ValuePoint {
            date: day(i),
            value: *v,
        })
        .collect()
}

/// Hand-built band point; `None` bands model an unfilled window.
pub fn band(index: usize, ewma: f64, bands: Option<(f64, f64)>) -> BandPoint {
    BandPoint {
        date: day(index),
        ewma,
        stddev: bands.map(|(upper, lower)| (upper - lower) / 4.0),
        upper: bands.map(|(upper, _)| upper),
        lower: bands.map(|(_, lower)| lower),
    }
}

pub fn raw_weights(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(id, w)| (id.to_string(), *w)).collect()
}

pub const SAMPLE_CSV: &str = "Date,AAPL,MSFT,SPY\n\
2024-01-02,100.0,200.0,400.0\n\
2024-01-03,104.0,198.0,401.0\n\
2024-01-04,99.0,205.0,399.0\n\
2024-01-05,112.0,201.0,402.0\n\
2024-01-08,96.0,210.0,404.0\n\
2024-01-09,118.0,195.0,403.0\n\
2024-01-10,91.0,207.0,405.0\n\
2024-01-11,107.0,203.0,407.0\n\
2024-01-12,101.0,199.0,406.0\n\
2024-01-16,99.0,204.0,408.0\n";

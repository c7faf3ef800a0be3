//! Date-indexed closing prices for a set of instruments.
//!
//! The instrument list travels with the series itself; there is no ambient
//! "current tickers" state.

use crate::domain::error::BandtraderError;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// One trading day: instrument id → closing price.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub prices: BTreeMap<String, f64>,
}

impl PriceRecord {
    pub fn new(date: NaiveDate, prices: BTreeMap<String, f64>) -> Self {
        Self { date, prices }
    }

    pub fn price(&self, instrument: &str) -> Option<f64> {
        self.prices.get(instrument).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    instruments: Vec<String>,
    records: Vec<PriceRecord>,
}

impl PriceSeries {
    /// Build a series, checking that dates strictly increase, every record
    /// prices every listed instrument, and all prices are positive.
    pub fn new(
        instruments: Vec<String>,
        records: Vec<PriceRecord>,
    ) -> Result<Self, BandtraderError> {
        for pair in records.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(BandtraderError::Data {
                    reason: format!(
                        "dates must strictly increase ({} follows {})",
                        pair[1].date, pair[0].date
                    ),
                });
            }
        }

        for record in &records {
            for id in &instruments {
                match record.price(id) {
                    Some(p) if p > 0.0 && p.is_finite() => {}
                    Some(p) => {
                        return Err(BandtraderError::Data {
                            reason: format!("non-positive price {} for {} on {}", p, id, record.date),
                        });
                    }
                    None => {
                        return Err(BandtraderError::Data {
                            reason: format!("missing price for {} on {}", id, record.date),
                        });
                    }
                }
            }
        }

        Ok(Self {
            instruments,
            records,
        })
    }

    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, instrument: &str) -> bool {
        self.instruments.iter().any(|i| i == instrument)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }

    /// Closing prices of one instrument in date order.
    pub fn column(&self, instrument: &str) -> Option<Vec<f64>> {
        if !self.contains(instrument) {
            return None;
        }
        self.records.iter().map(|r| r.price(instrument)).collect()
    }

    /// Instrument list with the given ids removed, e.g. to take the benchmark
    /// out of the investable universe.
    pub fn instruments_except(&self, excluded: &[&str]) -> Vec<String> {
        self.instruments
            .iter()
            .filter(|i| !excluded.contains(&i.as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn record(d: u32, pairs: &[(&str, f64)]) -> PriceRecord {
        PriceRecord::new(
            date(d),
            pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        )
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builds_valid_series() {
        let series = PriceSeries::new(
            ids(&["A", "B"]),
            vec![
                record(1, &[("A", 10.0), ("B", 20.0)]),
                record(2, &[("A", 11.0), ("B", 19.0)]),
            ],
        )
        .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.first_date(), Some(date(1)));
        assert_eq!(series.last_date(), Some(date(2)));
        assert_eq!(series.column("A"), Some(vec![10.0, 11.0]));
        assert_eq!(series.column("Z"), None);
    }

    #[test]
    fn rejects_unordered_dates() {
        let result = PriceSeries::new(
            ids(&["A"]),
            vec![record(2, &[("A", 10.0)]), record(1, &[("A", 11.0)])],
        );
        assert!(matches!(result, Err(BandtraderError::Data { .. })));
    }

    #[test]
    fn rejects_duplicate_dates() {
        let result = PriceSeries::new(
            ids(&["A"]),
            vec![record(1, &[("A", 10.0)]), record(1, &[("A", 11.0)])],
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_missing_price() {
        let result = PriceSeries::new(
            ids(&["A", "B"]),
            vec![record(1, &[("A", 10.0)])],
        );
        assert!(matches!(result, Err(BandtraderError::Data { reason }) if reason.contains("missing price for B")));
    }

    #[test]
    fn rejects_non_positive_price() {
        let result = PriceSeries::new(ids(&["A"]), vec![record(1, &[("A", 0.0)])]);
        assert!(result.is_err());
    }

    #[test]
    fn instruments_except_removes_benchmark() {
        let series = PriceSeries::new(
            ids(&["A", "SPY", "B"]),
            vec![record(1, &[("A", 1.0), ("SPY", 2.0), ("B", 3.0)])],
        )
        .unwrap();
        assert_eq!(series.instruments_except(&["SPY"]), ids(&["A", "B"]));
    }
}

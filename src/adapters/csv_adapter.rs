//! CSV file data adapters.
//!
//! - [`CsvPriceAdapter`]: wide close-price table, `Date,<ID1>,<ID2>,...`
//! - [`CsvWeightAdapter`]: two-column `instrument,weight` table

use crate::domain::error::BandtraderError;
use crate::domain::prices::{PriceRecord, PriceSeries};
use crate::ports::price_port::PricePort;
use crate::ports::weight_port::WeightSource;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

pub struct CsvPriceAdapter {
    path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_all(&self) -> Result<PriceSeries, BandtraderError> {
        let content = fs::read_to_string(&self.path).map_err(|e| BandtraderError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| BandtraderError::Data {
            reason: format!("CSV header error: {}", e),
        })?;
        if headers.len() < 2 {
            return Err(BandtraderError::Data {
                reason: format!(
                    "{} needs a date column and at least one instrument column",
                    self.path.display()
                ),
            });
        }
        let instruments: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();
        for (i, id) in instruments.iter().enumerate() {
            if instruments[..i].contains(id) {
                return Err(BandtraderError::Data {
                    reason: format!("duplicate instrument column {}", id),
                });
            }
        }

        let mut records = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| BandtraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| BandtraderError::Data {
                reason: "missing date column".into(),
            })?;
            let date = parse_date(date_str)?;

            let mut prices = BTreeMap::new();
            for (i, id) in instruments.iter().enumerate() {
                let cell = record.get(i + 1).unwrap_or("").trim();
                let price: f64 = cell.parse().map_err(|_| BandtraderError::Data {
                    reason: format!("invalid price {:?} for {} on {}", cell, id, date),
                })?;
                prices.insert(id.clone(), price);
            }
            records.push(PriceRecord::new(date, prices));
        }

        records.sort_by_key(|r| r.date);
        PriceSeries::new(instruments, records)
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part which is dropped.
fn parse_date(raw: &str) -> Result<NaiveDate, BandtraderError> {
    let day = raw
        .trim()
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or("");
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| BandtraderError::Data {
        reason: format!("invalid date {:?}: {}", raw, e),
    })
}

impl PricePort for CsvPriceAdapter {
    fn load_prices(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, BandtraderError> {
        let all = self.read_all()?;
        if start_date.is_none() && end_date.is_none() {
            return Ok(all);
        }

        let records = all
            .records()
            .iter()
            .filter(|r| start_date.is_none_or(|s| r.date >= s))
            .filter(|r| end_date.is_none_or(|e| r.date <= e))
            .cloned()
            .collect();
        PriceSeries::new(all.instruments().to_vec(), records)
    }

    fn list_instruments(&self) -> Result<Vec<String>, BandtraderError> {
        Ok(self.read_all()?.instruments().to_vec())
    }

    fn data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, BandtraderError> {
        let series = self.read_all()?;
        Ok(series
            .first_date()
            .zip(series.last_date())
            .map(|(first, last)| (first, last, series.len())))
    }
}

pub struct CsvWeightAdapter {
    path: PathBuf,
}

impl CsvWeightAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl WeightSource for CsvWeightAdapter {
    fn target_weights(&self) -> Result<BTreeMap<String, f64>, BandtraderError> {
        let content = fs::read_to_string(&self.path).map_err(|e| BandtraderError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut weights = BTreeMap::new();

        for result in rdr.records() {
            let record = result.map_err(|e| BandtraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            let id = record
                .get(0)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| BandtraderError::InvalidWeights {
                    reason: "missing instrument column".into(),
                })?;
            let raw = record.get(1).unwrap_or("").trim();
            let weight: f64 = raw.parse().map_err(|_| BandtraderError::InvalidWeights {
                reason: format!("invalid weight {:?} for {}", raw, id),
            })?;
            if weights.insert(id.to_string(), weight).is_some() {
                return Err(BandtraderError::InvalidWeights {
                    reason: format!("duplicate instrument {}", id),
                });
            }
        }

        Ok(weights)
    }
}

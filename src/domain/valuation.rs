//! Portfolio valuation under drift or periodic rebalancing.
//!
//! Both policies buy a fixed share count per instrument at the first close.
//! `NoRebalance` then lets weights drift with relative price moves.
//! `Periodic(n)` resets share counts to the original target weights every
//! `n` records (never on the first record), using the portfolio value of
//! that day.

use crate::domain::error::BandtraderError;
use crate::domain::prices::{PriceRecord, PriceSeries};
use crate::domain::weights::{AllocationWeights, WeightMap};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

/// Minimum number of price records a valuation needs.
pub const MIN_PRICE_RECORDS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebalancePolicy {
    NoRebalance,
    Periodic { frequency_days: usize },
}

impl RebalancePolicy {
    /// `0` days means never rebalance.
    pub fn from_frequency(frequency_days: usize) -> Self {
        if frequency_days == 0 {
            RebalancePolicy::NoRebalance
        } else {
            RebalancePolicy::Periodic { frequency_days }
        }
    }

    fn rebalances_at(&self, index: usize) -> bool {
        match *self {
            RebalancePolicy::NoRebalance => false,
            RebalancePolicy::Periodic { frequency_days } => {
                frequency_days > 0 && index != 0 && index % frequency_days == 0
            }
        }
    }
}

impl fmt::Display for RebalancePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebalancePolicy::NoRebalance => write!(f, "no rebalancing"),
            RebalancePolicy::Periodic { frequency_days: 1 } => write!(f, "rebalanced daily"),
            RebalancePolicy::Periodic { frequency_days } => {
                write!(f, "rebalanced every {} days", frequency_days)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Portfolio value per price date, aligned 1:1 with the input series.
pub type ValueSeries = Vec<ValuePoint>;

/// Instrument id → share count.
pub type Holdings = BTreeMap<String, f64>;

/// Share counts bought with `initial_investment` at the first close.
pub fn initial_shares(
    prices: &PriceSeries,
    weights: &WeightMap,
    initial_investment: f64,
) -> Result<Holdings, BandtraderError> {
    check_investment(initial_investment)?;
    let first = prices.records().first().ok_or(BandtraderError::InsufficientData {
        have: 0,
        need: MIN_PRICE_RECORDS,
    })?;
    let alloc = allocation_weights(prices, weights)?;
    allocate(first, &alloc, initial_investment)
}

pub fn valuate(
    prices: &PriceSeries,
    weights: &WeightMap,
    initial_investment: f64,
    policy: RebalancePolicy,
) -> Result<ValueSeries, BandtraderError> {
    if prices.len() < MIN_PRICE_RECORDS {
        return Err(BandtraderError::InsufficientData {
            have: prices.len(),
            need: MIN_PRICE_RECORDS,
        });
    }
    check_investment(initial_investment)?;

    let alloc = allocation_weights(prices, weights)?;
    let records = prices.records();
    let mut shares = allocate(&records[0], &alloc, initial_investment)?;
    let mut values = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        let value = mark_to_market(record, &shares)?;
        values.push(ValuePoint {
            date: record.date,
            value,
        });

        if policy.rebalances_at(i) {
            shares = allocate(record, &alloc, value)?;
        }
    }

    tracing::debug!(
        records = values.len(),
        %policy,
        final_value = values.last().map(|v| v.value).unwrap_or_default(),
        "portfolio valuated"
    );
    Ok(values)
}

fn check_investment(initial_investment: f64) -> Result<(), BandtraderError> {
    if initial_investment > 0.0 && initial_investment.is_finite() {
        Ok(())
    } else {
        Err(BandtraderError::ConfigInvalid {
            section: "analysis".into(),
            key: "initial_investment".into(),
            reason: format!("must be positive, got {}", initial_investment),
        })
    }
}

fn allocation_weights(
    prices: &PriceSeries,
    weights: &WeightMap,
) -> Result<AllocationWeights, BandtraderError> {
    let (alloc, excluded) = weights.retain_available(prices);
    if !excluded.is_empty() {
        tracing::warn!(
            excluded = %excluded.join(","),
            retained_weight = alloc.sum(),
            "instruments without prices excluded from allocation"
        );
    }
    if alloc.is_empty() {
        return Err(BandtraderError::InvalidWeights {
            reason: "no weighted instrument has price data".into(),
        });
    }
    Ok(alloc)
}

fn allocate(
    record: &PriceRecord,
    weights: &AllocationWeights,
    capital: f64,
) -> Result<Holdings, BandtraderError> {
    weights
        .iter()
        .map(|(id, &w)| {
            let price = record
                .price(id)
                .ok_or_else(|| BandtraderError::UnknownInstrument { id: id.clone() })?;
            Ok((id.clone(), capital * w / price))
        })
        .collect()
}

fn mark_to_market(record: &PriceRecord, shares: &Holdings) -> Result<f64, BandtraderError> {
    shares.iter().try_fold(0.0, |acc, (id, &qty)| {
        let price = record
            .price(id)
            .ok_or_else(|| BandtraderError::UnknownInstrument { id: id.clone() })?;
        Ok(acc + qty * price)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn series(columns: &[(&str, &[f64])]) -> PriceSeries {
        let n = columns[0].1.len();
        let records = (0..n)
            .map(|i| {
                let prices = columns
                    .iter()
                    .map(|(id, col)| (id.to_string(), col[i]))
                    .collect();
                PriceRecord::new(
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64),
                    prices,
                )
            })
            .collect();
        PriceSeries::new(columns.iter().map(|(id, _)| id.to_string()).collect(), records).unwrap()
    }

    fn weights(pairs: &[(&str, f64)]) -> WeightMap {
        WeightMap::normalized(pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()).unwrap()
    }

    #[test]
    fn policy_from_zero_frequency_is_no_rebalance() {
        assert_eq!(RebalancePolicy::from_frequency(0), RebalancePolicy::NoRebalance);
        assert_eq!(
            RebalancePolicy::from_frequency(5),
            RebalancePolicy::Periodic { frequency_days: 5 }
        );
    }

    #[test]
    fn policy_display() {
        assert_eq!(RebalancePolicy::NoRebalance.to_string(), "no rebalancing");
        assert_eq!(RebalancePolicy::from_frequency(1).to_string(), "rebalanced daily");
        assert_eq!(
            RebalancePolicy::from_frequency(5).to_string(),
            "rebalanced every 5 days"
        );
    }

    #[test]
    fn no_rebalance_drifts() {
        let prices = series(&[("A", &[10.0, 20.0, 20.0]), ("B", &[10.0, 10.0, 5.0])]);
        let w = weights(&[("A", 0.5), ("B", 0.5)]);
        let values = valuate(&prices, &w, 1000.0, RebalancePolicy::NoRebalance).unwrap();

        // 50 shares of each
        assert_relative_eq!(values[0].value, 1000.0);
        assert_relative_eq!(values[1].value, 1500.0);
        assert_relative_eq!(values[2].value, 1250.0);
    }

    #[test]
    fn daily_rebalance_resets_to_target_weights() {
        let prices = series(&[("A", &[10.0, 20.0, 20.0]), ("B", &[10.0, 10.0, 5.0])]);
        let w = weights(&[("A", 0.5), ("B", 0.5)]);
        let values = valuate(&prices, &w, 1000.0, RebalancePolicy::from_frequency(1)).unwrap();

        assert_relative_eq!(values[0].value, 1000.0);
        assert_relative_eq!(values[1].value, 1500.0);
        // rebalanced at index 1: 37.5 A, 75 B
        assert_relative_eq!(values[2].value, 37.5 * 20.0 + 75.0 * 5.0);
    }

    #[test]
    fn rebalance_never_fires_at_index_zero() {
        let policy = RebalancePolicy::from_frequency(3);
        assert!(!policy.rebalances_at(0));
        assert!(!policy.rebalances_at(2));
        assert!(policy.rebalances_at(3));
        assert!(policy.rebalances_at(6));
    }

    #[test]
    fn weekly_rebalance_holds_shares_between_dates() {
        let a = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0];
        let b = [10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0];
        let prices = series(&[("A", &a), ("B", &b)]);
        let w = weights(&[("A", 0.5), ("B", 0.5)]);
        let drift = valuate(&prices, &w, 1000.0, RebalancePolicy::NoRebalance).unwrap();
        let weekly = valuate(&prices, &w, 1000.0, RebalancePolicy::from_frequency(5)).unwrap();

        for i in 0..=5 {
            assert_relative_eq!(drift[i].value, weekly[i].value, epsilon = 1e-9);
        }
        assert!((drift[6].value - weekly[6].value).abs() > 1e-6);
    }

    #[test]
    fn initial_shares_match_investment() {
        let prices = series(&[("A", &[12.5, 13.0]), ("B", &[40.0, 41.0]), ("C", &[3.0, 3.3])]);
        let w = weights(&[("A", 0.2), ("B", 0.5), ("C", 0.3)]);
        let shares = initial_shares(&prices, &w, 1000.0).unwrap();

        let first = &prices.records()[0];
        let total: f64 = shares.iter().map(|(id, q)| q * first.price(id).unwrap()).sum();
        assert_relative_eq!(total, 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn single_record_is_insufficient() {
        let prices = series(&[("A", &[10.0])]);
        let err = valuate(&prices, &WeightMap::single("A"), 1000.0, RebalancePolicy::NoRebalance)
            .unwrap_err();
        assert!(matches!(err, BandtraderError::InsufficientData { have: 1, need: 2 }));
    }

    #[test]
    fn non_positive_investment_is_config_error() {
        let prices = series(&[("A", &[10.0, 11.0])]);
        let err = valuate(&prices, &WeightMap::single("A"), 0.0, RebalancePolicy::NoRebalance)
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn all_weights_excluded_is_config_error() {
        let prices = series(&[("A", &[10.0, 11.0])]);
        let err = valuate(&prices, &WeightMap::single("ZZZ"), 1000.0, RebalancePolicy::NoRebalance)
            .unwrap_err();
        assert!(matches!(err, BandtraderError::InvalidWeights { .. }));
    }

    #[test]
    fn excluded_weight_is_left_unallocated() {
        let prices = series(&[("A", &[10.0, 10.0])]);
        let w = weights(&[("A", 0.75), ("MISSING", 0.25)]);
        let values = valuate(&prices, &w, 1000.0, RebalancePolicy::NoRebalance).unwrap();
        assert_relative_eq!(values[0].value, 750.0);
    }

    proptest! {
        #[test]
        fn zero_frequency_matches_no_rebalance(
            a in prop::collection::vec(1.0f64..500.0, 2..40),
            b_scale in 0.5f64..2.0,
        ) {
            let b: Vec<f64> = a.iter().rev().map(|p| p * b_scale).collect();
            let prices = series(&[("A", &a), ("B", &b)]);
            let w = weights(&[("A", 0.4), ("B", 0.6)]);
            let drift = valuate(&prices, &w, 1000.0, RebalancePolicy::NoRebalance).unwrap();
            let zero = valuate(&prices, &w, 1000.0, RebalancePolicy::from_frequency(0)).unwrap();
            prop_assert_eq!(drift, zero);
        }

        #[test]
        fn constant_prices_keep_constant_value(
            pa in 1.0f64..500.0,
            pb in 1.0f64..500.0,
            len in 2usize..30,
            freq in 0usize..6,
        ) {
            let a = vec![pa; len];
            let b = vec![pb; len];
            let prices = series(&[("A", &a), ("B", &b)]);
            let w = weights(&[("A", 0.3), ("B", 0.7)]);
            let values = valuate(&prices, &w, 1000.0, RebalancePolicy::from_frequency(freq)).unwrap();
            for v in values {
                prop_assert!((v.value - 1000.0).abs() < 1e-9);
            }
        }
    }
}

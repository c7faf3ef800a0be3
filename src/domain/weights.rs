//! Target weight maps.
//!
//! Raw weights (from an optimiser, a config file or an equal split) are
//! normalised exactly once, here, when a [`WeightMap`] is constructed.

use crate::domain::error::BandtraderError;
use crate::domain::prices::PriceSeries;
use std::collections::BTreeMap;

/// Normalised instrument weights. Invariant: the weights sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMap {
    weights: BTreeMap<String, f64>,
}

impl WeightMap {
    /// Normalise raw weights so they sum to 1. When the raw sum already
    /// equals 1 the weights are kept as given.
    pub fn normalized(raw: BTreeMap<String, f64>) -> Result<Self, BandtraderError> {
        if raw.is_empty() {
            return Err(BandtraderError::InvalidWeights {
                reason: "weight map is empty".into(),
            });
        }
        if let Some((id, w)) = raw.iter().find(|(_, w)| !w.is_finite() || **w < 0.0) {
            return Err(BandtraderError::InvalidWeights {
                reason: format!("weight for {} must be a non-negative number, got {}", id, w),
            });
        }

        let total: f64 = raw.values().sum();
        if total <= 0.0 {
            return Err(BandtraderError::InvalidWeights {
                reason: "weights must have a positive sum".into(),
            });
        }

        let weights = if total == 1.0 {
            raw
        } else {
            raw.into_iter().map(|(id, w)| (id, w / total)).collect()
        };
        Ok(Self { weights })
    }

    /// Equal split over the given instruments.
    pub fn equal(instruments: &[String]) -> Result<Self, BandtraderError> {
        let raw = instruments.iter().map(|id| (id.clone(), 1.0)).collect();
        Self::normalized(raw)
    }

    /// A single instrument holding the whole allocation.
    pub fn single(instrument: &str) -> Self {
        let mut weights = BTreeMap::new();
        weights.insert(instrument.to_string(), 1.0);
        Self { weights }
    }

    /// Drop instruments the price series does not carry.
    ///
    /// The surviving weights are NOT renormalised, so the allocated capital
    /// shrinks by the excluded share. Returns the retained map and the ids
    /// that were dropped.
    pub fn retain_available(&self, prices: &PriceSeries) -> (AllocationWeights, Vec<String>) {
        let mut retained = BTreeMap::new();
        let mut excluded = Vec::new();
        for (id, &w) in &self.weights {
            if prices.contains(id) {
                retained.insert(id.clone(), w);
            } else {
                excluded.push(id.clone());
            }
        }
        (AllocationWeights { weights: retained }, excluded)
    }

    pub fn get(&self, instrument: &str) -> Option<f64> {
        self.weights.get(instrument).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.weights.iter()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }
}

/// Weights actually used for allocation after excluding instruments that
/// have no prices. May sum to less than 1.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationWeights {
    weights: BTreeMap<String, f64>,
}

impl AllocationWeights {
    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.weights.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.weights
    }
}

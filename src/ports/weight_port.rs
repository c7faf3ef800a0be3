//! Target weight source port trait.
//!
//! Implemented by whatever produces portfolio weights (an optimiser's output
//! file, a config section). Weights are returned raw; normalisation happens
//! in [`crate::domain::weights::WeightMap::normalized`].

use crate::domain::error::BandtraderError;
use std::collections::BTreeMap;

pub trait WeightSource {
    fn target_weights(&self) -> Result<BTreeMap<String, f64>, BandtraderError>;
}

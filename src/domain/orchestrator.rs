//! Fan-out/fan-in over valuation, band estimation and simulation.
//!
//! The target portfolio gets the full pipeline (value → bands → trades).
//! Policy variants, the benchmark and single-instrument comparators get
//! value and bands only. Every series is built from the same `PriceSeries`.

use crate::domain::backtest::{AnalysisSettings, WEEKLY_REBALANCE_DAYS};
use crate::domain::error::BandtraderError;
use crate::domain::indicator::{estimate_bands, BandSeries};
use crate::domain::prices::PriceSeries;
use crate::domain::simulation::{simulate, SimulationResult};
use crate::domain::valuation::{valuate, RebalancePolicy, ValueSeries};
use crate::domain::weights::WeightMap;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioSpec {
    pub title: String,
    pub weights: WeightMap,
    pub policy: RebalancePolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioReport {
    pub title: String,
    /// Normalised target weights, before exclusion.
    pub weights: WeightMap,
    /// Weighted instruments the price data does not carry.
    pub excluded: Vec<String>,
    pub policy: RebalancePolicy,
    pub values: ValueSeries,
    pub bands: BandSeries,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyRun {
    pub portfolio: PortfolioReport,
    pub simulation: SimulationResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub title: String,
    pub weights: WeightMap,
    pub settings: AnalysisSettings,
    pub benchmark: Option<String>,
    pub comparators: Vec<String>,
    pub compare_policies: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub target: StrategyRun,
    pub settings: AnalysisSettings,
    pub variants: Vec<PortfolioReport>,
    pub benchmark: Option<PortfolioReport>,
    pub comparators: Vec<PortfolioReport>,
}

/// Value and bands for one named portfolio.
pub fn compile_portfolio(
    prices: &PriceSeries,
    spec: &PortfolioSpec,
    settings: &AnalysisSettings,
) -> Result<PortfolioReport, BandtraderError> {
    let values = valuate(prices, &spec.weights, settings.initial_investment, spec.policy)?;
    let bands = estimate_bands(&values, settings.halflife_days)?;
    let (_, excluded) = spec.weights.retain_available(prices);

    Ok(PortfolioReport {
        title: spec.title.clone(),
        weights: spec.weights.clone(),
        excluded,
        policy: spec.policy,
        values,
        bands,
    })
}

/// Full pipeline for the traded portfolio.
pub fn run_strategy(
    prices: &PriceSeries,
    spec: &PortfolioSpec,
    settings: &AnalysisSettings,
) -> Result<StrategyRun, BandtraderError> {
    let portfolio = compile_portfolio(prices, spec, settings)?;
    let simulation = simulate(&portfolio.values, &portfolio.bands, settings.initial_investment)?;
    Ok(StrategyRun {
        portfolio,
        simulation,
    })
}

/// One single-instrument portfolio per id, rebalanced daily.
pub fn compile_comparators(
    prices: &PriceSeries,
    instruments: &[String],
    settings: &AnalysisSettings,
) -> Result<Vec<PortfolioReport>, BandtraderError> {
    instruments
        .iter()
        .map(|id| {
            if !prices.contains(id) {
                return Err(BandtraderError::ConfigInvalid {
                    section: "analysis".into(),
                    key: "comparators".into(),
                    reason: format!("{} has no price data", id),
                });
            }
            let spec = PortfolioSpec {
                title: id.clone(),
                weights: WeightMap::single(id),
                policy: RebalancePolicy::from_frequency(1),
            };
            compile_portfolio(prices, &spec, settings)
        })
        .collect()
}

/// Daily, never and weekly rebalanced versions of the same weights.
pub fn policy_variants(title: &str, weights: &WeightMap) -> Vec<PortfolioSpec> {
    [
        RebalancePolicy::from_frequency(1),
        RebalancePolicy::NoRebalance,
        RebalancePolicy::from_frequency(WEEKLY_REBALANCE_DAYS),
    ]
    .into_iter()
    .map(|policy| PortfolioSpec {
        title: format!("{} ({})", title, policy),
        weights: weights.clone(),
        policy,
    })
    .collect()
}

/// Resolve target weights: explicit raw weights are normalised; without any,
/// every priced instrument except the benchmark gets an equal share.
pub fn target_weights(
    raw: Option<BTreeMap<String, f64>>,
    prices: &PriceSeries,
    benchmark: Option<&str>,
) -> Result<WeightMap, BandtraderError> {
    match raw {
        Some(raw) => WeightMap::normalized(raw),
        None => {
            let excluded: Vec<&str> = benchmark.into_iter().collect();
            WeightMap::equal(&prices.instruments_except(&excluded))
        }
    }
}

pub fn analyze(
    prices: &PriceSeries,
    request: &AnalysisRequest,
) -> Result<AnalysisReport, BandtraderError> {
    let settings = request.settings;
    let spec = PortfolioSpec {
        title: request.title.clone(),
        weights: request.weights.clone(),
        policy: settings.policy,
    };

    tracing::info!(
        title = %spec.title,
        instruments = spec.weights.len(),
        records = prices.len(),
        policy = %spec.policy,
        "running strategy"
    );
    let target = run_strategy(prices, &spec, &settings)?;

    let variants = if request.compare_policies {
        policy_variants(&request.title, &request.weights)
            .iter()
            .map(|v| compile_portfolio(prices, v, &settings))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        Vec::new()
    };

    let benchmark = match &request.benchmark {
        Some(id) => compile_comparators(prices, std::slice::from_ref(id), &settings)?
            .into_iter()
            .next(),
        None => None,
    };

    let comparators = compile_comparators(prices, &request.comparators, &settings)?;

    Ok(AnalysisReport {
        target,
        settings,
        variants,
        benchmark,
        comparators,
    })
}

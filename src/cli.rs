//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{CsvPriceAdapter, CsvWeightAdapter};
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_report::SvgReportAdapter;
use crate::domain::backtest::{
    AnalysisConfig, AnalysisSettings, WeightSpec, DEFAULT_HALFLIFE_DAYS,
    DEFAULT_INITIAL_INVESTMENT, DEFAULT_REBALANCE_FREQUENCY,
};
use crate::domain::config_validation::{
    parse_optional_date, read_flag, read_number, read_whole, validate_analysis_config,
    ANALYSIS_SECTION, DATA_SECTION, REPORT_SECTION, WEIGHTS_SECTION,
};
use crate::domain::error::BandtraderError;
use crate::domain::metrics::{series_return, Summary};
use crate::domain::orchestrator::{analyze, target_weights, AnalysisReport, AnalysisRequest};
use crate::domain::valuation::RebalancePolicy;
use crate::domain::weights::WeightMap;
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use crate::ports::report_port::ReportPort;
use crate::ports::weight_port::WeightSource;

pub const DEFAULT_REPORT_PATH: &str = "report.svg";

#[derive(Parser, Debug)]
#[command(
    name = "bandtrader",
    about = "Portfolio valuation and Bollinger-band mean-reversion backtester"
)]
pub struct Cli {
    /// Diagnostic log level (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Value the portfolio, simulate the band strategy and write reports
    Run {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        trade_log: Option<PathBuf>,
        /// Buy and hold: never rebalance to the target weights
        #[arg(long, conflicts_with = "frequency")]
        no_rebalance: bool,
        /// Rebalance every N records (0 disables rebalancing)
        #[arg(long)]
        frequency: Option<usize>,
        /// Also value the daily, never and weekly rebalanced variants
        #[arg(long)]
        compare_policies: bool,
    },
    /// Validate a configuration and its weights
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show instruments and date range of the configured price data
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunOverrides {
    pub output: Option<PathBuf>,
    pub trade_log: Option<PathBuf>,
    pub no_rebalance: bool,
    pub frequency: Option<usize>,
    pub compare_policies: bool,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            output,
            trade_log,
            no_rebalance,
            frequency,
            compare_policies,
        } => run_analysis(
            &config,
            RunOverrides {
                output,
                trade_log,
                no_rebalance,
                frequency,
                compare_policies,
            },
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config } => run_info(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = BandtraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Comma-separated instrument list, e.g. `AAPL, WBA`.
pub fn parse_instrument_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn build_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, BandtraderError> {
    let prices_path = non_empty(config.get_string(DATA_SECTION, "prices")).ok_or_else(|| {
        BandtraderError::ConfigMissing {
            section: DATA_SECTION.into(),
            key: "prices".into(),
        }
    })?;

    let halflife = read_whole(config, "halflife_days")?.unwrap_or(DEFAULT_HALFLIFE_DAYS as i64);
    if halflife < 1 {
        return Err(BandtraderError::ConfigInvalid {
            section: ANALYSIS_SECTION.into(),
            key: "halflife_days".into(),
            reason: "halflife_days must be at least 1".into(),
        });
    }

    let frequency = read_whole(config, "rebalance_frequency")?
        .unwrap_or(DEFAULT_REBALANCE_FREQUENCY as i64);
    if frequency < 0 {
        return Err(BandtraderError::ConfigInvalid {
            section: ANALYSIS_SECTION.into(),
            key: "rebalance_frequency".into(),
            reason: "rebalance_frequency must be non-negative".into(),
        });
    }
    let policy = if read_flag(config, "rebalance")?.unwrap_or(true) {
        RebalancePolicy::from_frequency(frequency as usize)
    } else {
        RebalancePolicy::NoRebalance
    };

    let weights = match non_empty(config.get_string(ANALYSIS_SECTION, "weights_file")) {
        Some(path) => WeightSpec::File(PathBuf::from(path)),
        None if !config.section_entries(WEIGHTS_SECTION).is_empty() => WeightSpec::Section,
        None => WeightSpec::Equal,
    };

    Ok(AnalysisConfig {
        prices_path: PathBuf::from(prices_path),
        start_date: parse_optional_date(config, "start_date")?,
        end_date: parse_optional_date(config, "end_date")?,
        title: non_empty(config.get_string(ANALYSIS_SECTION, "title"))
            .unwrap_or_else(|| "Portfolio".to_string()),
        settings: AnalysisSettings {
            initial_investment: read_number(config, "initial_investment")?
                .unwrap_or(DEFAULT_INITIAL_INVESTMENT),
            halflife_days: halflife as usize,
            policy,
        },
        weights,
        benchmark: non_empty(config.get_string(ANALYSIS_SECTION, "benchmark")),
        comparators: config
            .get_string(ANALYSIS_SECTION, "comparators")
            .map(|s| parse_instrument_list(&s))
            .unwrap_or_default(),
        compare_policies: read_flag(config, "compare_policies")?.unwrap_or(false),
        output: non_empty(config.get_string(REPORT_SECTION, "output")).map(PathBuf::from),
        trade_log: non_empty(config.get_string(REPORT_SECTION, "trade_log")).map(PathBuf::from),
    })
}

pub fn apply_overrides(config: &mut AnalysisConfig, overrides: RunOverrides) {
    if overrides.output.is_some() {
        config.output = overrides.output;
    }
    if overrides.trade_log.is_some() {
        config.trade_log = overrides.trade_log;
    }
    if overrides.no_rebalance {
        config.settings.policy = RebalancePolicy::NoRebalance;
    } else if let Some(frequency) = overrides.frequency {
        config.settings.policy = RebalancePolicy::from_frequency(frequency);
    }
    config.compare_policies |= overrides.compare_policies;
}

/// Raw weights named by the config, or `None` for equal weights.
pub fn read_weights(
    spec: &WeightSpec,
    section: &dyn WeightSource,
) -> Result<Option<BTreeMap<String, f64>>, BandtraderError> {
    match spec {
        WeightSpec::File(path) => CsvWeightAdapter::new(path.clone()).target_weights().map(Some),
        WeightSpec::Section => section.target_weights().map(Some),
        WeightSpec::Equal => Ok(None),
    }
}

fn prepare(config_path: &Path) -> Result<(FileConfigAdapter, AnalysisConfig), ExitCode> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;

    let config = validate_analysis_config(&adapter)
        .and_then(|()| build_analysis_config(&adapter))
        .map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        })?;
    Ok((adapter, config))
}

fn run_analysis(config_path: &Path, overrides: RunOverrides) -> ExitCode {
    let (adapter, mut config) = match prepare(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    apply_overrides(&mut config, overrides);

    match execute(&adapter, &config) {
        Ok(report) => {
            print_summary(&report);
            match write_reports(&report, &config) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("error: {e}");
                    (&e).into()
                }
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Load prices and weights, then run the full analysis.
pub fn execute(
    weights_section: &dyn WeightSource,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, BandtraderError> {
    eprintln!("Loading prices from {}", config.prices_path.display());
    let prices = CsvPriceAdapter::new(config.prices_path.clone())
        .load_prices(config.start_date, config.end_date)?;
    eprintln!(
        "  {} instruments, {} records",
        prices.instruments().len(),
        prices.len()
    );

    let raw = read_weights(&config.weights, weights_section)?;
    let weights = target_weights(raw, &prices, config.benchmark.as_deref())?;

    eprintln!(
        "Running analysis: {} ({}, halflife {} days)",
        config.title, config.settings.policy, config.settings.halflife_days
    );
    let request = AnalysisRequest {
        title: config.title.clone(),
        weights,
        settings: config.settings,
        benchmark: config.benchmark.clone(),
        comparators: config.comparators.clone(),
        compare_policies: config.compare_policies,
    };
    analyze(&prices, &request)
}

pub fn write_reports(report: &AnalysisReport, config: &AnalysisConfig) -> Result<(), BandtraderError> {
    let output = config
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_PATH));
    let output = output.to_string_lossy();
    SvgReportAdapter::new().write(report, &output)?;
    eprintln!("\nReport written to: {}", output);

    if let Some(path) = &config.trade_log {
        let path = path.to_string_lossy();
        CsvReportAdapter::new().write(report, &path)?;
        eprintln!("Trade log written to: {}", path);
    }
    Ok(())
}

fn print_summary(report: &AnalysisReport) {
    let target = &report.target.portfolio;
    let summary = Summary::compute(&report.target.simulation, report.settings.initial_investment);

    eprintln!("\n=== {} ({}) ===", target.title, target.policy);
    eprintln!("Initial Investment: {:.2}", summary.initial_investment);
    eprintln!("Realized Balance:   {:.2}", summary.final_realized_balance);
    eprintln!("Final Snapshot:     {:.2}", summary.final_snapshot);
    eprintln!("Total Return:       {:.2}%", summary.total_return * 100.0);
    eprintln!("Total Trades:       {}", summary.trades_tally);
    eprintln!("Win Rate:           {:.1}%", summary.win_rate * 100.0);
    eprintln!("Largest Win:        {:.2}", summary.largest_win);
    eprintln!("Largest Loss:       {:.2}", summary.largest_loss);
    eprintln!("Avg Duration:       {:.1} days", summary.avg_trade_duration);
    eprintln!("Max Drawdown:       -{:.1}%", summary.max_drawdown * 100.0);
    if let Some(side) = summary.open_position {
        eprintln!(
            "warning: {} position still open on the last date; snapshot includes unrealized PnL",
            side
        );
    }

    eprintln!("\n=== Weights ===");
    print_weights(&target.weights, &target.excluded);

    let others: Vec<_> = report
        .benchmark
        .iter()
        .chain(&report.variants)
        .chain(&report.comparators)
        .collect();
    if !others.is_empty() {
        eprintln!("\n=== Value Returns ===");
        eprintln!("  {}: {:.2}%", target.title, series_return(&target.values) * 100.0);
        for p in others {
            eprintln!("  {}: {:.2}%", p.title, series_return(&p.values) * 100.0);
        }
    }
}

fn print_weights(weights: &WeightMap, excluded: &[String]) {
    for (id, w) in weights.iter() {
        if excluded.contains(id) {
            eprintln!("  {}: {:.2}% (no price data, excluded)", id, w * 100.0);
        } else {
            eprintln!("  {}: {:.2}%", id, w * 100.0);
        }
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    let (adapter, config) = match prepare(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let weights = read_weights(&config.weights, &adapter).and_then(|raw| match raw {
        Some(raw) => WeightMap::normalized(raw).map(Some),
        None => Ok(None),
    });
    match weights {
        Ok(Some(weights)) => {
            eprintln!("\nNormalised weights:");
            print_weights(&weights, &[]);
        }
        Ok(None) => eprintln!("\nWeights: equal split over priced instruments"),
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    eprintln!("  prices:    {}", config.prices_path.display());
    eprintln!("  policy:    {}", config.settings.policy);
    eprintln!("  halflife:  {} days", config.settings.halflife_days);
    eprintln!("  investment: {:.2}", config.settings.initial_investment);
    if let Some(b) = &config.benchmark {
        eprintln!("  benchmark: {}", b);
    }
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_info(config_path: &Path) -> ExitCode {
    let (_, config) = match prepare(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let prices = CsvPriceAdapter::new(config.prices_path.clone());

    let instruments = match prices.list_instruments() {
        Ok(i) => i,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    match prices.data_range() {
        Ok(Some((first, last, count))) => {
            println!(
                "{}: {} instruments, {} records, {} to {}",
                config.prices_path.display(),
                instruments.len(),
                count,
                first,
                last
            );
        }
        Ok(None) => eprintln!("{}: no records", config.prices_path.display()),
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }
    for id in &instruments {
        println!("{}", id);
    }
    ExitCode::SUCCESS
}

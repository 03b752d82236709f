//! Backtest runner: wires together loading, annotation, the engine and the
//! performance summary.
//!
//! Three entry points:
//! - `run_backtest()`: loads the CSV named in the config, then runs. Used by the CLI.
//! - `run_pipeline()`: takes a pre-loaded series. No I/O.
//! - `run_annotated()`: takes an already annotated series. Used by sweeps so
//!   indicators are computed once per series, not once per configuration.

use kumo_core::{
    annotate, simulate, AnnotatedSeries, PerformanceReport, SimulationError, SimulationResult,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::{BacktestConfig, ConfigError, RunId};
use crate::data_loader::{load_csv, LoadError, LoadedSeries};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("simulation error: {0}")]
    Simulation(#[from] SimulationError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub symbol: String,
    pub dataset_hash: String,
    pub has_synthetic: bool,
    /// Raw bars handed to annotation.
    pub bars_loaded: usize,
    /// Bars dropped because indicators were still warming up.
    pub warmup_dropped: usize,
    pub config: BacktestConfig,
    pub simulation: SimulationResult,
    pub report: PerformanceReport,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestResult {
    pub fn bars_simulated(&self) -> usize {
        self.simulation.bar_count
    }
}

/// Load the configured CSV and run it.
pub fn run_backtest(config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let series = load_csv(config.data_path()?)?;
    run_pipeline(&series, config)
}

/// Annotate, simulate and summarize a pre-loaded series.
pub fn run_pipeline(
    series: &LoadedSeries,
    config: &BacktestConfig,
) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let annotated = annotate(&series.bars, &config.indicators)?;
    run_annotated(series, &annotated, config)
}

/// Simulate and summarize a series already annotated with `config.indicators`.
pub fn run_annotated(
    series: &LoadedSeries,
    annotated: &AnnotatedSeries,
    config: &BacktestConfig,
) -> Result<BacktestResult, RunError> {
    let simulation = simulate(&annotated.bars, &config.simulation_config())?;
    let report = PerformanceReport::compute(&simulation);
    let run_id = config.run_id();

    info!(
        run_id = run_id.get(..12).unwrap_or(&run_id),
        symbol = %config.backtest.symbol,
        trades = report.trade_count,
        total_return_pct = report.total_return_pct,
        "backtest complete"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id,
        symbol: config.backtest.symbol.clone(),
        dataset_hash: series.dataset_hash.clone(),
        has_synthetic: series.has_synthetic,
        bars_loaded: series.len(),
        warmup_dropped: annotated.dropped,
        config: config.clone(),
        simulation,
        report,
    })
}

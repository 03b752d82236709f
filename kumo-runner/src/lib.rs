//! Kumo Runner: backtest orchestration, parameter sweeps, artifact export.
//!
//! This crate builds on `kumo-core` to provide:
//! - TOML configuration with content-addressed run IDs
//! - OHLCV CSV loading and a seeded synthetic series
//! - Single-backtest runner (annotate, simulate, summarize)
//! - Parallel risk-parameter sweeps
//! - JSON, CSV and Markdown artifacts

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod sweep;

pub use config::{BacktestConfig, ConfigError, RunId};
pub use data_loader::{
    load_csv, read_csv, synthetic_bars, synthetic_series, LoadError, LoadedSeries,
};
pub use export::{
    export_equity_csv, export_json, export_trades_csv, generate_report, import_json,
    load_artifacts, save_artifacts,
};
pub use runner::{
    run_annotated, run_backtest, run_pipeline, BacktestResult, RunError, SCHEMA_VERSION,
};
pub use sweep::{ParamGrid, ParamSweep, SweepResults};

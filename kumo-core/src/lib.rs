//! Kumo Core: domain types, indicator engine, signals, simulation engine, performance summary.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (bars, annotated bars, positions, trades, equity points)
//! - Indicator engine (EMA trend baseline, Ichimoku cloud lines, ATR volatility range)
//! - Cloud-trend signal rule mapping indicator values to Long/Short/Flat
//! - Single-position simulation state machine with touch-fill stop-losses
//! - Performance summarizer with explicit sentinels for degenerate statistics
//!
//! Everything here is pure and synchronous. Loading files, sweeping parameters
//! and writing artifacts live in `kumo-runner`.

pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod metrics;
pub mod signals;

pub use domain::{
    AnnotatedBar, Bar, EquityPoint, ExitReason, IndicatorSnapshot, Position, PositionSide, Signal,
    SizingRule, TradeRecord,
};
pub use engine::{simulate, SimulationConfig, SimulationResult};
pub use error::SimulationError;
pub use indicators::{annotate, AnnotatedSeries, IndicatorConfig};
pub use metrics::{PerformanceReport, RiskReward};

//! Simulation engine: a single-position, bar-by-bar state machine.
//!
//! Per bar (from the second bar on), in fixed priority order:
//!
//! 1. Stop-loss: a long whose stop is touched by the low, or a short whose stop
//!    is touched by the high, closes at the stop price.
//! 2. Opposite signal: a position still open closes at the bar close when the
//!    bar's signal points the other way.
//! 3. Entry: if flat (including just after an exit on this bar), a Long or
//!    Short signal opens a position at the bar close.
//!
//! Every bar then appends a mark-to-market equity point reflecting the
//! post-transition state. The first bar only seeds the equity curve.

pub mod config;
pub mod loop_runner;
pub mod sizing;
pub mod state;
pub mod validate;

pub use config::SimulationConfig;
pub use loop_runner::simulate;
pub use sizing::{size_position, Sizing};
pub use state::{SimulationResult, SimulationState};
pub use validate::validate_series;

//! Signal generation: a pure mapping from indicator values to a directional label.
//!
//! Signals see one bar and its indicator snapshot. They never see the open
//! position or account state; entries, exits and stops belong to the engine.

pub mod cloud_trend;

pub use cloud_trend::cloud_trend_signal;

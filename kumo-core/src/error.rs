//! Fatal simulation errors.
//!
//! Both variants are raised before any simulation state is created, so a
//! failed run never produces a partial ledger or equity curve.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Invalid run parameters, or nothing to simulate.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Input bars violate the ordering or OHLC contract.
    #[error("invalid series at bar {index}: {reason}")]
    InvalidSeries { index: usize, reason: String },
}

impl SimulationError {
    pub(crate) fn invalid_series(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidSeries {
            index,
            reason: reason.into(),
        }
    }
}

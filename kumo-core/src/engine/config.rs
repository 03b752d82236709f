//! Run parameters for a single simulation.

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

/// Configuration for a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub initial_capital: f64,
    /// Fraction of current capital risked per trade, in (0, 1].
    pub risk_fraction: f64,
    /// Stop distance as a multiple of the volatility range at entry.
    pub stop_multiplier: f64,
    /// Floor on position size.
    pub minimum_size: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            risk_fraction: 0.01,
            stop_multiplier: 2.0,
            minimum_size: 0.01,
        }
    }
}

impl SimulationConfig {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            ..Self::default()
        }
    }

    pub fn with_risk_fraction(mut self, risk_fraction: f64) -> Self {
        self.risk_fraction = risk_fraction;
        self
    }

    pub fn with_stop_multiplier(mut self, stop_multiplier: f64) -> Self {
        self.stop_multiplier = stop_multiplier;
        self
    }

    pub fn with_minimum_size(mut self, minimum_size: f64) -> Self {
        self.minimum_size = minimum_size;
        self
    }

    /// Reject parameters the engine cannot run with.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(SimulationError::Configuration(format!(
                "initial_capital must be positive, got {}",
                self.initial_capital
            )));
        }
        if !(self.risk_fraction > 0.0 && self.risk_fraction <= 1.0) {
            return Err(SimulationError::Configuration(format!(
                "risk_fraction must be in (0, 1], got {}",
                self.risk_fraction
            )));
        }
        if !(self.stop_multiplier.is_finite() && self.stop_multiplier > 0.0) {
            return Err(SimulationError::Configuration(format!(
                "stop_multiplier must be positive, got {}",
                self.stop_multiplier
            )));
        }
        if !(self.minimum_size.is_finite() && self.minimum_size >= 0.0) {
            return Err(SimulationError::Configuration(format!(
                "minimum_size must be >= 0, got {}",
                self.minimum_size
            )));
        }
        Ok(())
    }
}

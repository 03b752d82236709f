//! Serializable backtest configuration, loaded from TOML.
//!
//! ```toml
//! [backtest]
//! data = "historical_data.csv"
//! symbol = "SPY"
//! initial_capital = 10000.0
//!
//! [risk]
//! risk_fraction = 0.01
//! stop_multiplier = 2.0
//! minimum_size = 0.01
//!
//! [indicators]
//! trend_period = 200
//! ```
//!
//! Every field except `backtest.data` has a default. `data` is only needed
//! when the series is loaded from disk.

use std::path::{Path, PathBuf};

use kumo_core::{IndicatorConfig, SimulationConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a backtest configuration (content-addressable hash).
pub type RunId = String;

/// Errors from reading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete configuration for one backtest run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    #[serde(default)]
    pub backtest: BacktestSection,
    #[serde(default)]
    pub risk: RiskSection,
    #[serde(default)]
    pub indicators: IndicatorConfig,
}

/// `[backtest]`: what to run on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSection {
    /// OHLCV CSV file.
    pub data: Option<PathBuf>,
    /// Label used in reports and artifact directory names.
    pub symbol: String,
    pub initial_capital: f64,
}

impl Default for BacktestSection {
    fn default() -> Self {
        Self {
            data: None,
            symbol: "SPY".into(),
            initial_capital: 10_000.0,
        }
    }
}

/// `[risk]`: sizing and stop placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSection {
    pub risk_fraction: f64,
    pub stop_multiplier: f64,
    pub minimum_size: f64,
}

impl Default for RiskSection {
    fn default() -> Self {
        let sim = SimulationConfig::default();
        Self {
            risk_fraction: sim.risk_fraction,
            stop_multiplier: sim.stop_multiplier,
            minimum_size: sim.minimum_size,
        }
    }
}

impl BacktestConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;

        // Relative data paths are resolved against the config file's directory.
        if let (Some(data), Some(dir)) = (config.backtest.data.as_mut(), path.parent()) {
            if data.is_relative() {
                *data = dir.join(&*data);
            }
        }
        Ok(config)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Engine parameters for this configuration.
    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            initial_capital: self.backtest.initial_capital,
            risk_fraction: self.risk.risk_fraction,
            stop_multiplier: self.risk.stop_multiplier,
            minimum_size: self.risk.minimum_size,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backtest.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("backtest.symbol must not be empty".into()));
        }
        self.simulation_config()
            .validate()
            .and_then(|()| self.indicators.validate())
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// The data file, required when loading from disk.
    pub fn data_path(&self) -> Result<&Path, ConfigError> {
        self.backtest
            .data
            .as_deref()
            .ok_or_else(|| ConfigError::Invalid("backtest.data is required to load a series".into()))
    }

    pub fn with_risk(mut self, risk_fraction: f64, stop_multiplier: f64) -> Self {
        self.risk.risk_fraction = risk_fraction;
        self.risk.stop_multiplier = stop_multiplier;
        self
    }

    /// Deterministic BLAKE3 hash of the configuration.
    ///
    /// Two runs with identical parameters share a `RunId`.
    pub fn run_id(&self) -> RunId {
        // Only a non-UTF-8 data path can fail to serialize.
        let canonical =
            serde_json::to_vec(self).unwrap_or_else(|_| format!("{self:?}").into_bytes());
        blake3::hash(&canonical).to_hex().to_string()
    }
}

//! Parameter sweeps over risk settings.
//!
//! Parallelism is across independent runs only. The series is annotated once
//! and shared read-only by every run; each run owns its own simulation state.

use kumo_core::annotate;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::info;

use crate::config::BacktestConfig;
use crate::data_loader::LoadedSeries;
use crate::runner::{run_annotated, BacktestResult, RunError};

/// Parameter grid specification.
///
/// Indicator periods are not swept: they change annotation, which the sweep
/// performs once.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGrid {
    pub risk_fractions: Vec<f64>,
    pub stop_multipliers: Vec<f64>,
}

impl ParamGrid {
    /// 0.5% / 1% / 2% risk against 1.5x / 2x / 3x volatility stops.
    pub fn risk_default() -> Self {
        Self {
            risk_fractions: vec![0.005, 0.01, 0.02],
            stop_multipliers: vec![1.5, 2.0, 3.0],
        }
    }

    /// Number of distinct configurations in this grid.
    pub fn size(&self) -> usize {
        distinct(&self.risk_fractions).len() * distinct(&self.stop_multipliers).len()
    }

    /// All distinct configurations, risk fraction major.
    ///
    /// Repeated axis values are dropped (first occurrence kept), so every
    /// configuration, and therefore every run ID, appears once.
    pub fn generate_configs(&self, base_config: &BacktestConfig) -> Vec<BacktestConfig> {
        let stops = distinct(&self.stop_multipliers);
        distinct(&self.risk_fractions)
            .into_iter()
            .flat_map(|risk| {
                stops
                    .iter()
                    .map(move |&mult| base_config.clone().with_risk(risk, mult))
            })
            .collect()
    }
}

fn distinct(values: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::with_capacity(values.len());
    for &v in values {
        if !out.iter().any(|seen| seen.to_bits() == v.to_bits()) {
            out.push(v);
        }
    }
    out
}

/// Parameter sweep executor.
///
/// Runs every configuration in a grid against one series, optionally in parallel.
pub struct ParamSweep {
    base_config: BacktestConfig,
    parallel: bool,
}

impl ParamSweep {
    pub fn new(base_config: BacktestConfig) -> Self {
        Self {
            base_config,
            parallel: true,
        }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run the grid. Results come back in grid order either way.
    ///
    /// Every configuration is validated before any run starts.
    pub fn sweep(&self, series: &LoadedSeries, grid: &ParamGrid) -> Result<SweepResults, RunError> {
        let configs = grid.generate_configs(&self.base_config);
        for config in &configs {
            config.validate()?;
        }

        let annotated = annotate(&series.bars, &self.base_config.indicators)?;
        info!(
            configs = configs.len(),
            bars = annotated.bars.len(),
            parallel = self.parallel,
            "starting parameter sweep"
        );

        let results: Vec<BacktestResult> = if self.parallel {
            configs
                .par_iter()
                .map(|config| run_annotated(series, &annotated, config))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            configs
                .iter()
                .map(|config| run_annotated(series, &annotated, config))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(SweepResults::new(results))
    }
}

/// Results from a parameter sweep.
#[derive(Debug)]
pub struct SweepResults {
    results: Vec<BacktestResult>,
    by_run_id: HashMap<String, usize>,
}

impl SweepResults {
    fn new(results: Vec<BacktestResult>) -> Self {
        let by_run_id = results
            .iter()
            .enumerate()
            .map(|(i, r)| (r.run_id.clone(), i))
            .collect();
        Self { results, by_run_id }
    }

    /// All results in grid order.
    pub fn all(&self) -> &[BacktestResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, run_id: &str) -> Option<&BacktestResult> {
        self.by_run_id.get(run_id).map(|&i| &self.results[i])
    }

    /// Results sorted by total return (descending).
    pub fn sorted_by_return(&self) -> Vec<&BacktestResult> {
        let mut sorted: Vec<_> = self.results.iter().collect();
        sorted.sort_by(|a, b| {
            b.report
                .total_return_pct
                .total_cmp(&a.report.total_return_pct)
        });
        sorted
    }

    pub fn best(&self) -> Option<&BacktestResult> {
        self.sorted_by_return().into_iter().next()
    }
}

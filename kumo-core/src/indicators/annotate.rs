//! Annotation: raw bars in, simulation-ready bars out.
//!
//! Computes every indicator series once, applies the signal rule per bar, and
//! drops bars whose derived fields are not all finite. The engine therefore
//! never sees an incomplete warm-up window.

use serde::{Deserialize, Serialize};

use super::{Atr, Ema, Ichimoku, Indicator};
use crate::domain::{AnnotatedBar, Bar, IndicatorSnapshot};
use crate::error::SimulationError;
use crate::signals::cloud_trend_signal;

/// Indicator periods. Defaults are EMA 200, Ichimoku 9/26/52, ATR 14.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub trend_period: usize,
    pub conversion_period: usize,
    pub base_period: usize,
    pub span_b_period: usize,
    pub volatility_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            trend_period: 200,
            conversion_period: 9,
            base_period: 26,
            span_b_period: 52,
            volatility_period: 14,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        let periods = [
            ("trend_period", self.trend_period),
            ("conversion_period", self.conversion_period),
            ("base_period", self.base_period),
            ("span_b_period", self.span_b_period),
            ("volatility_period", self.volatility_period),
        ];
        for (name, value) in periods {
            if value == 0 {
                return Err(SimulationError::Configuration(format!(
                    "{name} must be >= 1"
                )));
            }
        }
        Ok(())
    }

    /// Cloud displacement; follows the base-line period.
    pub fn displacement(&self) -> usize {
        self.base_period
    }

    /// Bars consumed before the first fully annotated bar.
    pub fn warmup(&self) -> usize {
        self.indicators()
            .iter()
            .map(|i| i.lookback())
            .max()
            .unwrap_or(0)
    }

    /// Indicators in snapshot field order.
    fn indicators(&self) -> [Box<dyn Indicator>; 6] {
        [
            Box::new(Ema::new(self.trend_period)),
            Box::new(Ichimoku::span_a(
                self.conversion_period,
                self.base_period,
                self.displacement(),
            )),
            Box::new(Ichimoku::span_b(self.span_b_period, self.displacement())),
            Box::new(Ichimoku::conversion(self.conversion_period)),
            Box::new(Ichimoku::base(self.base_period)),
            Box::new(Atr::new(self.volatility_period)),
        ]
    }
}

/// Bars ready for simulation plus how many raw bars were discarded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotatedSeries {
    pub bars: Vec<AnnotatedBar>,
    /// Raw bars dropped because at least one derived field was undefined.
    pub dropped: usize,
}

/// Annotate a raw series with indicator values and signals.
pub fn annotate(bars: &[Bar], config: &IndicatorConfig) -> Result<AnnotatedSeries, SimulationError> {
    config.validate()?;

    let series: Vec<Vec<f64>> = config
        .indicators()
        .iter()
        .map(|ind| {
            let values = ind.compute(bars);
            debug_assert_eq!(
                values.len(),
                bars.len(),
                "indicator '{}' produced {} values for {} bars",
                ind.name(),
                values.len(),
                bars.len()
            );
            values
        })
        .collect();

    let mut annotated = Vec::with_capacity(bars.len().saturating_sub(config.warmup()));
    for (i, bar) in bars.iter().enumerate() {
        let snapshot = IndicatorSnapshot {
            trend_baseline: series[0][i],
            cloud_upper: series[1][i],
            cloud_lower: series[2][i],
            conversion_line: series[3][i],
            base_line: series[4][i],
            volatility_range: series[5][i],
        };
        if !snapshot.is_complete() {
            continue;
        }
        let signal = cloud_trend_signal(bar, &snapshot);
        annotated.push(AnnotatedBar::new(bar.clone(), snapshot, signal));
    }

    let dropped = bars.len() - annotated.len();
    tracing::debug!(
        raw = bars.len(),
        annotated = annotated.len(),
        dropped,
        "annotated series"
    );

    Ok(AnnotatedSeries {
        bars: annotated,
        dropped,
    })
}

//! Indicator engine.
//!
//! Indicators are pure functions: bar history in, numeric series out. They are
//! computed once over the whole series before simulation; the first
//! `lookback()` values of each series are `f64::NAN` (warm-up).
//!
//! Multi-line indicators (Ichimoku) are exposed as separate named instances
//! per line, keeping the single-series `Indicator` trait unchanged.

pub mod annotate;
pub mod atr;
pub mod ema;
pub mod ichimoku;

pub use annotate::{annotate, AnnotatedSeries, IndicatorConfig};
pub use atr::Atr;
pub use ema::Ema;
pub use ichimoku::Ichimoku;

use crate::domain::Bar;

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
/// Every indicator must give the same value at t on a truncated series as on
/// the full one.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_200", "atr_14").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    ///
    /// Returns a `Vec<f64>` of the same length as `bars`.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    /// Values up to t must not change when bars after t are removed.
    #[test]
    fn no_indicator_looks_ahead() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 8.0 + i as f64 * 0.05)
            .collect();
        let full = make_bars(&closes);
        let truncated = &full[..90];

        let indicators: Vec<Box<dyn Indicator>> = vec![
            Box::new(Ema::new(20)),
            Box::new(Atr::new(14)),
            Box::new(Ichimoku::conversion(9)),
            Box::new(Ichimoku::base(26)),
            Box::new(Ichimoku::span_a(9, 26, 26)),
            Box::new(Ichimoku::span_b(52, 26)),
        ];

        for ind in &indicators {
            let a = ind.compute(&full);
            let b = ind.compute(truncated);
            for t in 0..truncated.len() {
                if a[t].is_nan() {
                    assert!(b[t].is_nan(), "{} differs at {t}", ind.name());
                } else {
                    assert_approx(a[t], b[t], DEFAULT_EPSILON);
                }
            }
        }
    }
}

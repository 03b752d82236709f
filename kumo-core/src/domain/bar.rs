//! Bar: the fundamental market data unit, and its annotated form.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::signal::Signal;

/// OHLCV bar at one time step.
///
/// Timestamps are unique and strictly increasing across a series; gaps
/// (weekends, halts) are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Returns true if any price field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// OHLCV sanity check: finite prices, high >= low, high >= max(open, close),
    /// low <= min(open, close), non-negative volume.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.volume >= 0.0
    }
}

/// Derived per-bar fields supplied by the indicator engine.
///
/// `cloud_upper` / `cloud_lower` carry Senkou span A / B as computed; which of
/// the two is numerically higher changes as the cloud twists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    /// Long-period EMA of close.
    pub trend_baseline: f64,
    /// Senkou span A.
    pub cloud_upper: f64,
    /// Senkou span B.
    pub cloud_lower: f64,
    /// Tenkan-sen.
    pub conversion_line: f64,
    /// Kijun-sen.
    pub base_line: f64,
    /// ATR, used for stop placement and sizing.
    pub volatility_range: f64,
}

impl IndicatorSnapshot {
    /// True when every derived field holds a finite value (warm-up complete).
    pub fn is_complete(&self) -> bool {
        self.trend_baseline.is_finite()
            && self.cloud_upper.is_finite()
            && self.cloud_lower.is_finite()
            && self.conversion_line.is_finite()
            && self.base_line.is_finite()
            && self.volatility_range.is_finite()
    }
}

/// A bar with its indicator snapshot and directional label.
///
/// This is the only input the simulation engine reads. It is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedBar {
    pub bar: Bar,
    pub indicators: IndicatorSnapshot,
    pub signal: Signal,
}

impl AnnotatedBar {
    pub fn new(bar: Bar, indicators: IndicatorSnapshot, signal: Signal) -> Self {
        Self {
            bar,
            indicators,
            signal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar() -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_void() {
        let mut bar = sample_bar();
        bar.open = f64::NAN;
        assert!(bar.is_void());
        assert!(!bar.is_sane());

        let mut bar = sample_bar();
        bar.high = f64::INFINITY;
        assert!(bar.is_void());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 97.0; // below low
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_close_outside_range() {
        let mut bar = sample_bar();
        bar.close = 106.0;
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_rejects_negative_volume() {
        let mut bar = sample_bar();
        bar.volume = -1.0;
        assert!(!bar.is_sane());
    }

    #[test]
    fn snapshot_completeness() {
        let mut snap = IndicatorSnapshot {
            trend_baseline: 100.0,
            cloud_upper: 101.0,
            cloud_lower: 99.0,
            conversion_line: 100.5,
            base_line: 100.2,
            volatility_range: 2.0,
        };
        assert!(snap.is_complete());
        snap.cloud_lower = f64::NAN;
        assert!(!snap.is_complete());
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar, deser);
    }
}

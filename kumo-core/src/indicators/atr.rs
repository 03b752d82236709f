//! Average True Range (ATR): the volatility range used for stops and sizing.
//!
//! True range of bar t (t >= 1) is the widest of high-low, |high - prev close|
//! and |low - prev close|. Bar 0 has no previous close and contributes nothing.
//! The range is smoothed with Wilder's method (alpha = 1/period), seeded by the
//! mean of the first `period` true ranges, so the first value lands at index
//! `period`.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
            name: format!("atr_{period}"),
        }
    }
}

/// True range per bar. Index 0 is NaN.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let mut out = Vec::with_capacity(bars.len());
    if bars.is_empty() {
        return out;
    }
    out.push(f64::NAN);
    out.extend(bars.windows(2).map(|pair| {
        let (prev, bar) = (&pair[0], &pair[1]);
        let span = bar.high - bar.low;
        span.max((bar.high - prev.close).abs())
            .max((bar.low - prev.close).abs())
    }));
    out
}

/// Wilder smoothing over a series whose leading values may be NaN.
///
/// The seed is the mean of the first run of `period` finite values. A NaN
/// after the seed ends the output there; later indices stay NaN.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let Some(start) = values
        .windows(period)
        .position(|w| w.iter().all(|v| v.is_finite()))
    else {
        return out;
    };

    let seed_idx = start + period - 1;
    let mut prev = values[start..=seed_idx].iter().sum::<f64>() / period as f64;
    out[seed_idx] = prev;

    let alpha = 1.0 / period as f64;
    for (slot, &v) in out[seed_idx + 1..].iter_mut().zip(&values[seed_idx + 1..]) {
        if !v.is_finite() {
            break;
        }
        prev += alpha * (v - prev);
        *slot = prev;
    }
    out
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        wilder_smooth(&true_range(bars), self.period)
    }
}

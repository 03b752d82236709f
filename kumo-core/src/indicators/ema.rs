//! Exponential Moving Average (EMA): the trend baseline.
//!
//! Seeded with the simple mean of the first `period` closes, then
//! `ema += alpha * (close - ema)` with `alpha = 2 / (period + 1)`.
//! First value at index `period - 1`.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    /// `period` must be >= 1; callers validate via `IndicatorConfig::validate`.
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
            name: format!("ema_{period}"),
        }
    }

    fn alpha(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut out = vec![f64::NAN; bars.len()];
        if bars.len() < self.period {
            return out;
        }

        let (seed_window, rest) = bars.split_at(self.period);
        if seed_window.iter().any(|b| !b.close.is_finite()) {
            return out;
        }
        let mut ema = seed_window.iter().map(|b| b.close).sum::<f64>() / self.period as f64;
        out[self.period - 1] = ema;

        let alpha = self.alpha();
        for (slot, bar) in out[self.period..].iter_mut().zip(rest) {
            if !bar.close.is_finite() {
                break;
            }
            ema += alpha * (bar.close - ema);
            *slot = ema;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn period_one_tracks_close() {
        let bars = make_bars(&[42.0, 40.0, 45.5]);
        let values = Ema::new(1).compute(&bars);
        assert_eq!(values.len(), 3);
        for (v, b) in values.iter().zip(&bars) {
            assert_approx(*v, b.close, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn seeded_by_simple_mean() {
        // alpha = 2/5 = 0.4; seed = mean(20, 22, 24, 26) = 23 at index 3.
        // next: 23 + 0.4 * (33 - 23) = 27; then 27 + 0.4 * (22 - 27) = 25.
        let bars = make_bars(&[20.0, 22.0, 24.0, 26.0, 33.0, 22.0]);
        let values = Ema::new(4).compute(&bars);
        assert!(values[..3].iter().all(|v| v.is_nan()));
        assert_approx(values[3], 23.0, DEFAULT_EPSILON);
        assert_approx(values[4], 27.0, DEFAULT_EPSILON);
        assert_approx(values[5], 25.0, DEFAULT_EPSILON);
    }

    #[test]
    fn shorter_than_period_is_all_nan() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        assert!(Ema::new(4).compute(&bars).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn non_finite_close_stops_the_series() {
        let mut bars = make_bars(&[10.0, 12.0, 14.0, 16.0, 18.0]);
        bars[3].close = f64::NAN;
        let values = Ema::new(2).compute(&bars);
        assert_approx(values[1], 11.0, DEFAULT_EPSILON);
        assert!(!values[2].is_nan());
        assert!(values[3].is_nan());
        assert!(values[4].is_nan());
    }

    #[test]
    fn lookback_and_name() {
        let ema = Ema::new(200);
        assert_eq!(ema.lookback(), 199);
        assert_eq!(ema.name(), "ema_200");
    }
}

//! Ichimoku cloud lines.
//!
//! Exposed as separate Indicator instances per line:
//! - Conversion (Tenkan-sen): midpoint of highest high / lowest low over `period`.
//! - Base (Kijun-sen): same midpoint over a longer `period`.
//! - Span A (Senkou A): (conversion + base) / 2, displaced forward.
//! - Span B (Senkou B): midpoint over the long `period`, displaced forward.
//!
//! Displacement shifts a value computed at bar t to bar t + displacement, so
//! the cloud at bar t only uses data up to t - displacement. The lagging span
//! is not provided: it places today's close on an earlier bar.

use super::Indicator;
use crate::domain::Bar;

/// Which Ichimoku line to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IchimokuLine {
    Conversion { period: usize },
    Base { period: usize },
    SpanA { conversion: usize, base: usize, displacement: usize },
    SpanB { period: usize, displacement: usize },
}

#[derive(Debug, Clone)]
pub struct Ichimoku {
    line: IchimokuLine,
    name: String,
}

impl Ichimoku {
    pub fn conversion(period: usize) -> Self {
        let period = period.max(1);
        Self {
            line: IchimokuLine::Conversion { period },
            name: format!("ichimoku_conversion_{period}"),
        }
    }

    pub fn base(period: usize) -> Self {
        let period = period.max(1);
        Self {
            line: IchimokuLine::Base { period },
            name: format!("ichimoku_base_{period}"),
        }
    }

    pub fn span_a(conversion: usize, base: usize, displacement: usize) -> Self {
        let (conversion, base) = (conversion.max(1), base.max(1));
        Self {
            line: IchimokuLine::SpanA {
                conversion,
                base,
                displacement,
            },
            name: format!("ichimoku_span_a_{conversion}_{base}_{displacement}"),
        }
    }

    pub fn span_b(period: usize, displacement: usize) -> Self {
        let period = period.max(1);
        Self {
            line: IchimokuLine::SpanB {
                period,
                displacement,
            },
            name: format!("ichimoku_span_b_{period}_{displacement}"),
        }
    }
}

/// Midpoint of the highest high and lowest low over a trailing window.
///
/// NaN for the first `period - 1` bars and for any window containing NaN.
pub fn rolling_midpoint(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];

    if n < period || period == 0 {
        return result;
    }

    for i in (period - 1)..n {
        let window = &bars[i + 1 - period..=i];
        let mut max_high = f64::NEG_INFINITY;
        let mut min_low = f64::INFINITY;
        let mut has_nan = false;
        for bar in window {
            if bar.high.is_nan() || bar.low.is_nan() {
                has_nan = true;
                break;
            }
            max_high = max_high.max(bar.high);
            min_low = min_low.min(bar.low);
        }
        if !has_nan {
            result[i] = (max_high + min_low) / 2.0;
        }
    }

    result
}

/// Shift a series forward by `by` positions, padding the front with NaN.
fn displace(values: Vec<f64>, by: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    for i in by..n {
        result[i] = values[i - by];
    }
    result
}

impl Indicator for Ichimoku {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            IchimokuLine::Conversion { period } | IchimokuLine::Base { period } => period - 1,
            IchimokuLine::SpanA {
                conversion,
                base,
                displacement,
            } => conversion.max(base) - 1 + displacement,
            IchimokuLine::SpanB {
                period,
                displacement,
            } => period - 1 + displacement,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        match self.line {
            IchimokuLine::Conversion { period } | IchimokuLine::Base { period } => {
                rolling_midpoint(bars, period)
            }
            IchimokuLine::SpanA {
                conversion,
                base,
                displacement,
            } => {
                let tenkan = rolling_midpoint(bars, conversion);
                let kijun = rolling_midpoint(bars, base);
                let raw = tenkan
                    .iter()
                    .zip(&kijun)
                    .map(|(t, k)| (t + k) / 2.0)
                    .collect();
                displace(raw, displacement)
            }
            IchimokuLine::SpanB {
                period,
                displacement,
            } => displace(rolling_midpoint(bars, period), displacement),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn conversion_is_window_midpoint() {
        // make_bars: high = max(open, close) + 1, low = min(open, close) - 1
        let bars = make_bars(&[10.0, 12.0, 11.0, 15.0]);
        let result = Ichimoku::conversion(3).compute(&bars);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        // bars 0..=2: highs 11, 13, 13; lows 9, 9, 10 → (13 + 9) / 2
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        // bars 1..=3: highs 13, 13, 16; lows 9, 10, 10 → (16 + 9) / 2
        assert_approx(result[3], 12.5, DEFAULT_EPSILON);
    }

    #[test]
    fn span_a_is_displaced_average() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        let tenkan = Ichimoku::conversion(2).compute(&bars);
        let kijun = Ichimoku::base(3).compute(&bars);
        let span_a = Ichimoku::span_a(2, 3, 4).compute(&bars);

        for t in 0..6 {
            assert!(span_a[t].is_nan(), "span A should be warm-up at {t}");
        }
        for t in 6..10 {
            let expected = (tenkan[t - 4] + kijun[t - 4]) / 2.0;
            assert_approx(span_a[t], expected, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn span_b_is_displaced_midpoint() {
        let closes: Vec<f64> = (0..8).map(|i| 50.0 + (i * i) as f64).collect();
        let bars = make_bars(&closes);
        let mid = rolling_midpoint(&bars, 3);
        let span_b = Ichimoku::span_b(3, 2).compute(&bars);
        for t in 4..8 {
            assert_approx(span_b[t], mid[t - 2], DEFAULT_EPSILON);
        }
        assert!(span_b[3].is_nan());
    }

    #[test]
    fn lookbacks_match_first_valid_index() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64).cos()).collect();
        let bars = make_bars(&closes);
        for ind in [
            Ichimoku::conversion(9),
            Ichimoku::base(26),
            Ichimoku::span_a(9, 26, 26),
            Ichimoku::span_b(52, 26),
        ] {
            let values = ind.compute(&bars);
            let first_valid = values.iter().position(|v| !v.is_nan()).unwrap();
            assert_eq!(first_valid, ind.lookback(), "{}", ind.name());
        }
    }

    #[test]
    fn short_series_is_all_nan() {
        let bars = make_bars(&[1.0, 2.0]);
        assert!(Ichimoku::span_b(52, 26).compute(&bars).iter().all(|v| v.is_nan()));
    }
}

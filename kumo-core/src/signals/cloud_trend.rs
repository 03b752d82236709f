//! Cloud-trend rule: trade with the long-term trend when price clears the cloud
//! and the conversion line confirms.
//!
//! Long:  close above the trend baseline, above both cloud spans, and
//!        conversion line above base line.
//! Short: close below the trend baseline, below both cloud spans, and
//!        conversion line below base line.
//! Flat:  anything else.

use crate::domain::{Bar, IndicatorSnapshot, Signal};

pub fn cloud_trend_signal(bar: &Bar, ind: &IndicatorSnapshot) -> Signal {
    let close = bar.close;

    let uptrend =
        close > ind.trend_baseline && close > ind.cloud_upper && close > ind.cloud_lower;
    let bullish_cross = ind.conversion_line > ind.base_line;

    let downtrend =
        close < ind.trend_baseline && close < ind.cloud_upper && close < ind.cloud_lower;
    let bearish_cross = ind.conversion_line < ind.base_line;

    // Short is applied last, so it would win a tie.
    let mut signal = Signal::Flat;
    if uptrend && bullish_cross {
        signal = Signal::Long;
    }
    if downtrend && bearish_cross {
        signal = Signal::Short;
    }
    signal
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(close: f64) -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 0.0,
        }
    }

    fn snapshot(conversion: f64, base: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            trend_baseline: 100.0,
            cloud_upper: 102.0,
            cloud_lower: 98.0,
            conversion_line: conversion,
            base_line: base,
            volatility_range: 1.5,
        }
    }

    #[test]
    fn long_above_everything_with_bullish_cross() {
        assert_eq!(cloud_trend_signal(&bar(105.0), &snapshot(104.0, 103.0)), Signal::Long);
    }

    #[test]
    fn short_below_everything_with_bearish_cross() {
        assert_eq!(cloud_trend_signal(&bar(95.0), &snapshot(96.0, 97.0)), Signal::Short);
    }

    #[test]
    fn price_inside_cloud_is_flat() {
        assert_eq!(cloud_trend_signal(&bar(101.0), &snapshot(104.0, 103.0)), Signal::Flat);
    }

    #[test]
    fn trend_without_confirmation_is_flat() {
        assert_eq!(cloud_trend_signal(&bar(105.0), &snapshot(103.0, 104.0)), Signal::Flat);
        assert_eq!(cloud_trend_signal(&bar(95.0), &snapshot(97.0, 97.0)), Signal::Flat);
    }

    #[test]
    fn below_baseline_but_above_cloud_is_flat() {
        let mut snap = snapshot(104.0, 103.0);
        snap.trend_baseline = 110.0;
        assert_eq!(cloud_trend_signal(&bar(105.0), &snap), Signal::Flat);
    }
}

//! Bar-by-bar event loop.
//!
//! The first bar has no predecessor to act on; it only adds a flat equity
//! point. Every later bar runs the transition step, then marks to market.

use tracing::{debug, info, warn};

use crate::domain::{AnnotatedBar, ExitReason, PositionSide, Signal, SizingRule};
use crate::error::SimulationError;

use super::config::SimulationConfig;
use super::sizing::size_position;
use super::state::{SimulationResult, SimulationState};
use super::validate::validate_series;

/// Run one simulation over a fully annotated series.
///
/// Fails before any state is created if the configuration or the series is
/// invalid. The returned equity curve always has `bars.len() + 1` points.
pub fn simulate(
    bars: &[AnnotatedBar],
    config: &SimulationConfig,
) -> Result<SimulationResult, SimulationError> {
    config.validate()?;
    validate_series(bars)?;

    let first = &bars[0].bar;
    info!(
        bars = bars.len(),
        initial_capital = config.initial_capital,
        risk_fraction = config.risk_fraction,
        stop_multiplier = config.stop_multiplier,
        "simulation started"
    );

    let mut state = SimulationState::new(config.initial_capital, first.timestamp, bars.len());
    state.mark_to_market(first.timestamp, first.close);

    for (i, ab) in bars.iter().enumerate().skip(1) {
        step(&mut state, i, ab, config);
        state.mark_to_market(ab.bar.timestamp, ab.bar.close);
    }

    if let Some(pos) = &state.position {
        let last = &bars[bars.len() - 1].bar;
        info!(
            side = ?pos.side,
            entry_bar = pos.entry_bar,
            entry_price = pos.entry_price,
            unrealized = pos.pnl_at(last.close),
            "position still open at end of series"
        );
    }

    let result = state.into_result(bars.len());
    info!(
        trades = result.trades.len(),
        final_capital = result.final_capital,
        final_equity = result.final_equity(),
        degenerate_sizing = result.degenerate_sizing_count,
        "simulation finished"
    );
    Ok(result)
}

/// Transition for a single bar: stop-loss, then opposite signal, then entry.
fn step(state: &mut SimulationState, i: usize, ab: &AnnotatedBar, config: &SimulationConfig) {
    let bar = &ab.bar;

    // 1. Stop-loss, filled at the stop price.
    let stop_hit = state
        .position
        .as_ref()
        .filter(|p| p.stop_touched(bar.low, bar.high))
        .map(|p| p.stop_loss);
    if let Some(stop) = stop_hit {
        if let Some(trade) = state.close(i, bar.timestamp, stop, ExitReason::StopLoss) {
            debug!(
                bar = i,
                side = ?trade.side,
                exit_price = trade.exit_price,
                profit = trade.profit,
                "stop-loss exit"
            );
        }
    }

    // 2. Opposite signal, filled at the close.
    if state.side().map(PositionSide::opposite_signal) == Some(ab.signal) {
        if let Some(trade) = state.close(i, bar.timestamp, bar.close, ExitReason::OppositeSignal) {
            debug!(
                bar = i,
                side = ?trade.side,
                exit_price = trade.exit_price,
                profit = trade.profit,
                "opposite-signal exit"
            );
        }
    }

    // 3. Entry, possibly on the same bar as an exit.
    if state.is_flat() {
        let side = match ab.signal {
            Signal::Long => PositionSide::Long,
            Signal::Short => PositionSide::Short,
            Signal::Flat => return,
        };
        let sizing = size_position(state.capital, ab.indicators.volatility_range, config);
        if sizing.rule == SizingRule::DegenerateVolatility {
            warn!(
                bar = i,
                timestamp = %bar.timestamp,
                size = sizing.size,
                "zero volatility range at entry; using fallback size"
            );
        }
        let pos = state.open(side, i, bar.timestamp, bar.close, sizing);
        debug!(
            bar = i,
            side = ?pos.side,
            entry_price = pos.entry_price,
            stop_loss = pos.stop_loss,
            size = pos.size,
            "entry"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bar, IndicatorSnapshot};
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(i: usize) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + chrono::Duration::days(i as i64)
    }

    /// Bar with explicit low/high, a fixed volatility range and a signal.
    fn bar(i: usize, close: f64, low: f64, high: f64, vol: f64, signal: Signal) -> AnnotatedBar {
        AnnotatedBar::new(
            Bar {
                timestamp: ts(i),
                open: close,
                high,
                low,
                close,
                volume: 1_000.0,
            },
            IndicatorSnapshot {
                trend_baseline: close,
                cloud_upper: close,
                cloud_lower: close,
                conversion_line: close,
                base_line: close,
                volatility_range: vol,
            },
            signal,
        )
    }

    fn flat(i: usize, close: f64) -> AnnotatedBar {
        bar(i, close, close - 1.0, close + 1.0, 2.0, Signal::Flat)
    }

    #[test]
    fn single_bar_produces_two_flat_points() {
        let result = simulate(&[flat(0, 100.0)], &SimulationConfig::default()).unwrap();
        assert_eq!(result.equity_curve.len(), 2);
        assert!(result.trades.is_empty());
        assert_eq!(result.final_capital, 10_000.0);
    }

    #[test]
    fn signal_on_first_bar_is_ignored() {
        let bars = vec![
            bar(0, 100.0, 99.0, 101.0, 2.0, Signal::Long),
            flat(1, 101.0),
        ];
        let result = simulate(&bars, &SimulationConfig::default()).unwrap();
        assert!(result.open_position.is_none());
        assert!(result.trades.is_empty());
    }

    #[test]
    fn long_stopped_out_at_stop_price() {
        // Entry at 105 with stop 101; bar 2 trades down to 94.
        let bars = vec![
            flat(0, 100.0),
            bar(1, 105.0, 104.0, 106.0, 2.0, Signal::Long),
            bar(2, 95.0, 94.0, 96.0, 2.0, Signal::Flat),
            flat(3, 90.0),
            flat(4, 110.0),
        ];
        let result = simulate(&bars, &SimulationConfig::default()).unwrap();

        assert_eq!(result.trades.len(), 1);
        let t = &result.trades[0];
        assert_eq!(t.exit_reason, ExitReason::StopLoss);
        assert_eq!(t.exit_price, 101.0);
        assert_eq!(t.size, 25.0);
        assert_eq!(t.profit, -100.0);
        assert_eq!(result.final_capital, 9_900.0);
        assert_eq!(result.equity_curve.len(), 6);
        assert_eq!(result.final_equity(), 9_900.0);
    }

    #[test]
    fn stop_takes_priority_over_opposite_signal() {
        let bars = vec![
            flat(0, 100.0),
            bar(1, 100.0, 99.0, 101.0, 2.0, Signal::Long),
            // Stop at 96 touched and opposite signal on the same bar.
            bar(2, 97.0, 95.0, 98.0, 2.0, Signal::Short),
        ];
        let result = simulate(&bars, &SimulationConfig::default()).unwrap();
        assert_eq!(result.trades[0].exit_reason, ExitReason::StopLoss);
        assert_eq!(result.trades[0].exit_price, 96.0);
    }

    #[test]
    fn exit_and_reentry_on_same_bar() {
        let bars = vec![
            flat(0, 100.0),
            bar(1, 100.0, 99.0, 101.0, 2.0, Signal::Long),
            bar(2, 102.0, 101.0, 103.0, 2.0, Signal::Short),
        ];
        let result = simulate(&bars, &SimulationConfig::default()).unwrap();

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].exit_reason, ExitReason::OppositeSignal);
        assert_eq!(result.trades[0].profit, 50.0);

        let open = result.open_position.as_ref().unwrap();
        assert_eq!(open.side, PositionSide::Short);
        assert_eq!(open.entry_bar, 2);
        // Sized from the post-exit capital: 10_050 * 1% / 4
        assert_eq!(open.size, 10_050.0 * 0.01 / 4.0);
    }

    #[test]
    fn same_direction_signal_does_not_pyramid() {
        let bars = vec![
            flat(0, 100.0),
            bar(1, 100.0, 99.0, 101.0, 2.0, Signal::Long),
            bar(2, 101.0, 100.0, 102.0, 2.0, Signal::Long),
            bar(3, 102.0, 101.0, 103.0, 2.0, Signal::Long),
        ];
        let result = simulate(&bars, &SimulationConfig::default()).unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(result.open_position.as_ref().unwrap().entry_bar, 1);
    }

    #[test]
    fn open_position_marks_to_market_but_stays_unrealized() {
        let bars = vec![
            flat(0, 100.0),
            bar(1, 100.0, 99.0, 101.0, 2.0, Signal::Short),
            flat(2, 98.0),
        ];
        let result = simulate(&bars, &SimulationConfig::default()).unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(result.final_capital, 10_000.0);
        // 25 units short from 100 to 98
        assert_eq!(result.final_equity(), 10_050.0);
    }

    #[test]
    fn zero_volatility_entry_uses_fallback() {
        let bars = vec![
            flat(0, 100.0),
            bar(1, 100.0, 100.0, 100.0, 0.0, Signal::Long),
            // Stop sits at the entry price; stay clear of it.
            bar(2, 102.0, 101.0, 103.0, 2.0, Signal::Flat),
        ];
        let result = simulate(&bars, &SimulationConfig::default()).unwrap();
        let pos = result.open_position.as_ref().unwrap();
        assert_eq!(pos.sizing, SizingRule::DegenerateVolatility);
        assert_eq!(pos.size, 1.0);
        assert_eq!(result.degenerate_sizing_count, 1);
    }

    #[test]
    fn invalid_config_rejected_before_running() {
        let cfg = SimulationConfig::default().with_risk_fraction(0.0);
        assert!(matches!(
            simulate(&[flat(0, 100.0)], &cfg),
            Err(SimulationError::Configuration(_))
        ));
    }

    #[test]
    fn empty_series_rejected() {
        assert!(simulate(&[], &SimulationConfig::default()).is_err());
    }
}

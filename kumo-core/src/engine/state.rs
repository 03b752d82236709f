//! Simulation state record and run result types.
//!
//! All mutable state of a run lives in one `SimulationState`, created by
//! `simulate` and consumed into a `SimulationResult` at the end. Nothing is
//! shared between runs.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{EquityPoint, ExitReason, Position, PositionSide, SizingRule, TradeRecord};

use super::sizing::Sizing;

/// Mutable state that evolves bar-by-bar during the engine loop.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub initial_capital: f64,
    /// Realized capital. Changes only when a trade closes.
    pub capital: f64,
    /// `None` while flat.
    pub position: Option<Position>,
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<EquityPoint>,
    /// Entries sized by the zero-volatility fallback.
    pub degenerate_sizing_count: usize,
}

impl SimulationState {
    /// Flat state seeded with the pre-series equity point.
    pub fn new(initial_capital: f64, seed_timestamp: NaiveDateTime, bar_count: usize) -> Self {
        let mut equity_curve = Vec::with_capacity(bar_count + 1);
        equity_curve.push(EquityPoint {
            timestamp: seed_timestamp,
            equity: initial_capital,
        });
        Self {
            initial_capital,
            capital: initial_capital,
            position: None,
            trades: Vec::new(),
            equity_curve,
            degenerate_sizing_count: 0,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    pub fn side(&self) -> Option<PositionSide> {
        self.position.as_ref().map(|p| p.side)
    }

    /// Open a position. The caller guarantees the state is flat.
    pub fn open(
        &mut self,
        side: PositionSide,
        bar_index: usize,
        timestamp: NaiveDateTime,
        entry_price: f64,
        sizing: Sizing,
    ) -> &Position {
        debug_assert!(self.is_flat(), "opened a position while one is open");
        if sizing.rule == SizingRule::DegenerateVolatility {
            self.degenerate_sizing_count += 1;
        }
        self.position.insert(Position {
            side,
            entry_bar: bar_index,
            entry_timestamp: timestamp,
            entry_price,
            stop_loss: sizing.stop_price(side, entry_price),
            size: sizing.size,
            sizing: sizing.rule,
        })
    }

    /// Close the open position, realize its profit and append to the ledger.
    ///
    /// Returns `None` (and changes nothing) if already flat.
    pub fn close(
        &mut self,
        bar_index: usize,
        timestamp: NaiveDateTime,
        exit_price: f64,
        reason: ExitReason,
    ) -> Option<&TradeRecord> {
        let position = self.position.take()?;
        let trade = TradeRecord::close(&position, bar_index, timestamp, exit_price, reason);
        self.capital += trade.profit;
        self.trades.push(trade);
        self.trades.last()
    }

    /// Unrealized PnL of the open position at `price` (zero when flat).
    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.position.as_ref().map_or(0.0, |p| p.pnl_at(price))
    }

    /// Append the mark-to-market equity for a bar closing at `close`.
    pub fn mark_to_market(&mut self, timestamp: NaiveDateTime, close: f64) {
        let equity = self.capital + self.unrealized_pnl(close);
        self.equity_curve.push(EquityPoint { timestamp, equity });
    }

    pub fn into_result(self, bar_count: usize) -> SimulationResult {
        SimulationResult {
            initial_capital: self.initial_capital,
            final_capital: self.capital,
            trades: self.trades,
            equity_curve: self.equity_curve,
            open_position: self.position,
            degenerate_sizing_count: self.degenerate_sizing_count,
            bar_count,
        }
    }
}

/// Result of a complete simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub initial_capital: f64,
    /// Realized capital after the last closed trade.
    pub final_capital: f64,
    /// Closed trades in exit order.
    pub trades: Vec<TradeRecord>,
    /// Pre-series seed followed by one point per bar (`bar_count + 1` total).
    pub equity_curve: Vec<EquityPoint>,
    /// Position still open at the last bar. It is not force-closed, is not in
    /// `trades`, and its PnL shows only in the final equity point.
    pub open_position: Option<Position>,
    /// Entries that used the zero-volatility fallback size.
    pub degenerate_sizing_count: usize,
    pub bar_count: usize,
}

impl SimulationResult {
    /// Last mark-to-market equity, including any unrealized PnL.
    pub fn final_equity(&self) -> f64 {
        self.equity_curve
            .last()
            .map_or(self.final_capital, |p| p.equity)
    }

    pub fn equity_values(&self) -> Vec<f64> {
        self.equity_curve.iter().map(|p| p.equity).collect()
    }

    pub fn has_degenerate_sizing(&self) -> bool {
        self.degenerate_sizing_count > 0
    }
}

//! TradeRecord: a completed round-trip trade.

use super::position::{Position, PositionSide, SizingRule};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitReason {
    /// Bar range touched the stop; filled at the stop price.
    StopLoss,
    /// Signal flipped against the position; filled at the bar close.
    OppositeSignal,
}

/// A complete round-trip trade record: entry → exit.
///
/// Appended to the ledger exactly once per closed position and never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub side: PositionSide,

    // ── Entry ──
    pub entry_bar: usize,
    pub entry_timestamp: NaiveDateTime,
    pub entry_price: f64,

    // ── Exit ──
    pub exit_bar: usize,
    pub exit_timestamp: NaiveDateTime,
    pub exit_price: f64,
    pub exit_reason: ExitReason,

    /// Stop level in force when the position closed.
    pub stop_loss: f64,
    pub size: f64,
    pub sizing: SizingRule,

    /// Realized profit in account currency (negative for a loss).
    pub profit: f64,
}

impl TradeRecord {
    /// Close `position` at `exit_price` and record the outcome.
    pub fn close(
        position: &Position,
        exit_bar: usize,
        exit_timestamp: NaiveDateTime,
        exit_price: f64,
        exit_reason: ExitReason,
    ) -> Self {
        Self {
            side: position.side,
            entry_bar: position.entry_bar,
            entry_timestamp: position.entry_timestamp,
            entry_price: position.entry_price,
            exit_bar,
            exit_timestamp,
            exit_price,
            exit_reason,
            stop_loss: position.stop_loss,
            size: position.size,
            sizing: position.sizing,
            profit: position.pnl_at(exit_price),
        }
    }

    pub fn is_winner(&self) -> bool {
        self.profit > 0.0
    }

    pub fn bars_held(&self) -> usize {
        self.exit_bar - self.entry_bar
    }

    /// Profit as a percentage of entry notional. Zero for a zero-notional entry.
    pub fn return_pct(&self) -> f64 {
        let notional = self.entry_price * self.size;
        if notional == 0.0 {
            return 0.0;
        }
        self.profit / notional * 100.0
    }
}

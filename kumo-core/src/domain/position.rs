use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::signal::Signal;

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// The signal that would close a position on this side.
    pub fn opposite_signal(self) -> Signal {
        match self {
            PositionSide::Long => Signal::Short,
            PositionSide::Short => Signal::Long,
        }
    }

    /// +1 for long, -1 for short. Multiplies price moves into signed PnL.
    pub fn direction(self) -> f64 {
        match self {
            PositionSide::Long => 1.0,
            PositionSide::Short => -1.0,
        }
    }
}

/// How the size of a position was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizingRule {
    /// `capital * risk_fraction / stop_distance`, floored at the minimum size.
    RiskBudget,
    /// Stop distance was zero, so the fixed one-unit fallback was used.
    DegenerateVolatility,
}

/// The single open position. Flat is represented by its absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: PositionSide,
    pub entry_bar: usize,
    pub entry_timestamp: NaiveDateTime,
    pub entry_price: f64,
    /// Fixed at entry; never trailed.
    pub stop_loss: f64,
    pub size: f64,
    pub sizing: SizingRule,
}

impl Position {
    /// Profit of closing at `price`, signed in account currency.
    pub fn pnl_at(&self, price: f64) -> f64 {
        (price - self.entry_price) * self.size * self.side.direction()
    }

    /// Touch-fill check: has this bar's range reached the stop?
    pub fn stop_touched(&self, low: f64, high: f64) -> bool {
        match self.side {
            PositionSide::Long => low <= self.stop_loss,
            PositionSide::Short => high >= self.stop_loss,
        }
    }
}

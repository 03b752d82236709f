use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One mark-to-market sample of the equity curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    /// Realized capital plus unrealized PnL of the open position, if any.
    pub equity: f64,
}

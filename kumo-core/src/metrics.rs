//! Performance summary: pure functions over a finished run.
//!
//! Return and trade statistics use realized capital and the closed-trade
//! ledger. Drawdown uses the mark-to-market equity curve. Degenerate cases are
//! explicit values (`None`, `RiskReward::Unbounded`, `RiskReward::NoTrades`),
//! so the report never carries NaN or infinity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::TradeRecord;
use crate::engine::SimulationResult;

/// Ratio of average win to average loss, with explicit out-of-band cases.
///
/// A plain float would need infinity both for "no losing trades" and for
/// "no trades at all". Those two cases are separate variants here instead.
/// `Display` renders them as `∞` and `n/a`. In JSON they are
/// `{"kind": "unbounded"}` and `{"kind": "no_trades"}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RiskReward {
    Ratio(f64),
    /// Trades exist but none lost money.
    Unbounded,
    /// The ledger is empty.
    NoTrades,
}

impl RiskReward {
    pub fn as_ratio(self) -> Option<f64> {
        match self {
            RiskReward::Ratio(r) => Some(r),
            _ => None,
        }
    }
}

impl fmt::Display for RiskReward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskReward::Ratio(r) => write!(f, "{r:.2}"),
            RiskReward::Unbounded => write!(f, "∞"),
            RiskReward::NoTrades => write!(f, "n/a"),
        }
    }
}

/// Fixed-shape summary of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub total_return_pct: f64,
    pub trade_count: usize,
    pub win_rate_pct: f64,
    /// Mean profit of winning trades; `None` without winners.
    pub avg_win: Option<f64>,
    /// Mean profit of non-winning trades (≤ 0); `None` without losers.
    pub avg_loss: Option<f64>,
    pub risk_reward: RiskReward,
    /// Deepest peak-to-trough decline, as a non-positive percentage.
    pub max_drawdown_pct: f64,
}

impl PerformanceReport {
    pub fn compute(result: &SimulationResult) -> Self {
        let trades = &result.trades;
        Self {
            total_return_pct: total_return_pct(result.initial_capital, result.final_capital),
            trade_count: trades.len(),
            win_rate_pct: win_rate_pct(trades),
            avg_win: average_win(trades),
            avg_loss: average_loss(trades),
            risk_reward: risk_reward(trades),
            max_drawdown_pct: max_drawdown_pct(&result.equity_values()),
        }
    }
}

/// `(final / initial - 1) * 100`. Zero for a non-positive initial capital.
pub fn total_return_pct(initial_capital: f64, final_capital: f64) -> f64 {
    if initial_capital <= 0.0 {
        return 0.0;
    }
    (final_capital / initial_capital - 1.0) * 100.0
}

/// Percentage of trades with strictly positive profit; 0 with no trades.
pub fn win_rate_pct(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64 * 100.0
}

pub fn average_win(trades: &[TradeRecord]) -> Option<f64> {
    mean(trades.iter().filter(|t| t.is_winner()).map(|t| t.profit))
}

/// Break-even trades count as losses.
pub fn average_loss(trades: &[TradeRecord]) -> Option<f64> {
    mean(trades.iter().filter(|t| !t.is_winner()).map(|t| t.profit))
}

/// `|avg_win / avg_loss|`, with a missing average win read as zero.
pub fn risk_reward(trades: &[TradeRecord]) -> RiskReward {
    if trades.is_empty() {
        return RiskReward::NoTrades;
    }
    match average_loss(trades) {
        Some(loss) if loss != 0.0 => {
            let win = average_win(trades).unwrap_or(0.0);
            RiskReward::Ratio((win / loss).abs())
        }
        _ => RiskReward::Unbounded,
    }
}

/// Minimum over `t` of `equity[t] / max(equity[..=t]) - 1`, in percent.
pub fn max_drawdown_pct(equity: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &eq in equity {
        peak = peak.max(eq);
        if peak > 0.0 {
            worst = worst.min(eq / peak - 1.0);
        }
    }
    worst * 100.0
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

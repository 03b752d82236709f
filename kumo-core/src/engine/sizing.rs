//! Risk-budget position sizing and stop placement.
//!
//! ```text
//! stop_distance = volatility_range * stop_multiplier
//! risk_amount   = capital * risk_fraction
//! size          = max(risk_amount / stop_distance, minimum_size)
//! ```
//!
//! A zero stop distance (flat volatility) cannot size by risk. The engine then
//! trades a fixed single unit and marks the position `DegenerateVolatility`;
//! the minimum-size floor still applies.

use super::config::SimulationConfig;
use crate::domain::{PositionSide, SizingRule};

/// Units trade when the stop distance is zero.
pub const DEGENERATE_FALLBACK_SIZE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sizing {
    pub stop_distance: f64,
    pub size: f64,
    pub rule: SizingRule,
}

impl Sizing {
    /// Stop level for an entry at `entry_price` on `side`.
    pub fn stop_price(&self, side: PositionSide, entry_price: f64) -> f64 {
        match side {
            PositionSide::Long => entry_price - self.stop_distance,
            PositionSide::Short => entry_price + self.stop_distance,
        }
    }
}

pub fn size_position(capital: f64, volatility_range: f64, config: &SimulationConfig) -> Sizing {
    let stop_distance = volatility_range * config.stop_multiplier;

    let (raw_size, rule) = if stop_distance > 0.0 {
        let risk_amount = capital * config.risk_fraction;
        (risk_amount / stop_distance, SizingRule::RiskBudget)
    } else {
        (DEGENERATE_FALLBACK_SIZE, SizingRule::DegenerateVolatility)
    };

    Sizing {
        stop_distance,
        size: raw_size.max(config.minimum_size),
        rule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_budget_size_is_exact() {
        // 10_000 * 1% = 100 at risk over a 2 * 2 = 4 stop → 25 units
        let cfg = SimulationConfig::new(10_000.0);
        let sizing = size_position(10_000.0, 2.0, &cfg);
        assert_eq!(sizing.stop_distance, 4.0);
        assert_eq!(sizing.size, 25.0);
        assert_eq!(sizing.rule, SizingRule::RiskBudget);
    }

    #[test]
    fn stop_prices_by_side() {
        let sizing = size_position(10_000.0, 2.0, &SimulationConfig::default());
        assert_eq!(sizing.stop_price(PositionSide::Long, 105.0), 101.0);
        assert_eq!(sizing.stop_price(PositionSide::Short, 105.0), 109.0);
    }

    #[test]
    fn zero_volatility_uses_fallback() {
        let sizing = size_position(10_000.0, 0.0, &SimulationConfig::default());
        assert_eq!(sizing.stop_distance, 0.0);
        assert_eq!(sizing.size, DEGENERATE_FALLBACK_SIZE);
        assert_eq!(sizing.rule, SizingRule::DegenerateVolatility);
        // Stop sits at the entry price itself.
        assert_eq!(sizing.stop_price(PositionSide::Long, 50.0), 50.0);
    }

    #[test]
    fn minimum_size_floor_applies() {
        // 100 * 1% = 1 at risk over a 2 * 500 stop → 0.001, floored at 0.01
        let sizing = size_position(100.0, 500.0, &SimulationConfig::default());
        assert_eq!(sizing.size, 0.01);
        assert_eq!(sizing.rule, SizingRule::RiskBudget);
    }

    #[test]
    fn minimum_size_floor_also_covers_fallback() {
        let cfg = SimulationConfig::default().with_minimum_size(3.0);
        assert_eq!(size_position(10_000.0, 0.0, &cfg).size, 3.0);
    }

    #[test]
    fn sizing_scales_with_capital() {
        let cfg = SimulationConfig::default();
        let small = size_position(10_000.0, 2.0, &cfg);
        let large = size_position(20_000.0, 2.0, &cfg);
        assert_eq!(large.size, 2.0 * small.size);
    }
}

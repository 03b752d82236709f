//! Input contract checks, run before any simulation state exists.

use crate::domain::AnnotatedBar;
use crate::error::SimulationError;

/// Verify the series is non-empty, strictly time-ordered, OHLC-sane and fully
/// annotated. Reports the first offending bar.
pub fn validate_series(bars: &[AnnotatedBar]) -> Result<(), SimulationError> {
    if bars.is_empty() {
        return Err(SimulationError::Configuration(
            "series is empty; nothing to simulate".into(),
        ));
    }

    for (i, ab) in bars.iter().enumerate() {
        let bar = &ab.bar;
        if bar.is_void() {
            return Err(SimulationError::invalid_series(i, "non-finite price"));
        }
        if !bar.is_sane() {
            return Err(SimulationError::invalid_series(
                i,
                format!(
                    "OHLCV out of range (o={}, h={}, l={}, c={}, v={})",
                    bar.open, bar.high, bar.low, bar.close, bar.volume
                ),
            ));
        }
        if !ab.indicators.is_complete() {
            return Err(SimulationError::invalid_series(
                i,
                "derived fields incomplete (warm-up bars must be excluded)",
            ));
        }
        if ab.indicators.volatility_range < 0.0 {
            return Err(SimulationError::invalid_series(i, "negative volatility range"));
        }
        if i > 0 && bar.timestamp <= bars[i - 1].bar.timestamp {
            return Err(SimulationError::invalid_series(
                i,
                format!(
                    "timestamp {} does not follow {}",
                    bar.timestamp,
                    bars[i - 1].bar.timestamp
                ),
            ));
        }
    }

    Ok(())
}

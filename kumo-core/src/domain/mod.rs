//! Domain types for Kumo

pub mod bar;
pub mod equity;
pub mod position;
pub mod signal;
pub mod trade;

pub use bar::{AnnotatedBar, Bar, IndicatorSnapshot};
pub use equity::EquityPoint;
pub use position::{Position, PositionSide, SizingRule};
pub use signal::Signal;
pub use trade::{ExitReason, TradeRecord};

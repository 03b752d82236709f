//! Directional label attached to every annotated bar.

use serde::{Deserialize, Serialize};

/// Per-bar directional label produced by the signal generator.
///
/// A closed enum: a label outside Long/Short/Flat cannot be constructed, and
/// fails deserialization rather than reaching the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Long,
    Short,
    Flat,
}

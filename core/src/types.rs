//! Shared primitive types used across the entire roster engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Roster-wide budget currency. Spent by unit templates and extras.
pub type Points = u32;

/// Per-unit budget currency. Spent by weapons and equipment.
pub type Supply = u32;

/// Hand slots a weapon or item occupies.
pub type Hands = u32;

/// A stable, unique identifier for a unit within one roster.
pub type UnitId = u64;

/// Largest unit id an imported roster may carry. Keeps the id counter
/// far away from wrapping.
pub const MAX_UNIT_ID: UnitId = u32::MAX as UnitId;

/// Point budget a fresh roster starts with.
pub const DEFAULT_TOTAL_POINTS: Points = 100;

/// Every unit has exactly two hands.
pub const HAND_CAPACITY: Hands = 2;

/// The one template allowed to carry a two-handed weapon in a single hand.
pub const DUAL_WIELD_TEMPLATE: &str = "mech";

/// Catalog key of a unit template.
///
/// Keys are only trusted once resolved against a `Catalog`; imported
/// units may carry keys the catalog does not know.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateKey(String);

impl TemplateKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for TemplateKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

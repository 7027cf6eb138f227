//! Roster invariants: consistency checks that detect bugs.
//!
//! Every engine mutation preserves these. A roster straight out of an
//! import may not (trusted `pointsUsed`, missing leader, unknown
//! templates), which is why they are reported rather than asserted.

use crate::{config::Catalog, roster::Roster};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    pub message: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all roster invariants.
///
/// Returns every violation found, or empty if the roster is consistent.
#[must_use]
pub fn check_invariants(roster: &Roster, catalog: &Catalog) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut push = |message: String| violations.push(InvariantViolation { message });

    // Points budget
    let computed = roster.computed_points(catalog);
    if roster.points_used != computed {
        push(format!("pointsUsed {} != unit costs {computed}", roster.points_used));
    }
    if roster.points_used > roster.total_points {
        push(format!(
            "pointsUsed {} exceeds budget {}",
            roster.points_used, roster.total_points
        ));
    }

    let capacity = catalog.rules.hand_capacity;
    let mut ids = HashSet::new();

    for unit in &roster.units {
        if !ids.insert(unit.id) {
            push(format!("duplicate unit id {}", unit.id));
        }

        // Supply
        let supply = unit.supply_sum();
        if unit.used_supply != supply {
            push(format!(
                "unit {}: usedSupply {} != item costs {supply}",
                unit.id, unit.used_supply
            ));
        }
        match catalog.template(&unit.template) {
            Some(template) if supply > template.supply => push(format!(
                "unit {}: supply {supply} exceeds capacity {}",
                unit.id, template.supply
            )),
            Some(_) => {}
            None => push(format!("unit {}: unknown template '{}'", unit.id, unit.template)),
        }

        // Hands. Dual wielders may end one hand over after a one-handed two-hander.
        let limit = if catalog.rules.can_dual_wield(&unit.template) {
            capacity.saturating_add(1)
        } else {
            capacity
        };
        if unit.hands_used() > limit {
            push(format!(
                "unit {}: {} hands used, limit {limit}",
                unit.id,
                unit.hands_used()
            ));
        }

        // Unique items
        let mut names = HashSet::new();
        for item in unit.equipment.iter().filter(|e| e.unique_per_unit) {
            if !names.insert(item.name.as_str()) {
                push(format!("unit {}: unique item '{}' taken twice", unit.id, item.name));
            }
        }
    }

    // Leadership
    let leaders = roster.leader_count();
    let expected = usize::from(!roster.is_empty());
    if leaders != expected {
        push(format!("{leaders} leaders, expected {expected}"));
    }

    violations
}

//! Snapshot serialization: the roster exchange format to/from JSON.
//!
//! Export produces a `RosterSnapshot`. Import accepts any JSON value,
//! checks its shape, and rebuilds a `Roster` the engine can trust:
//!   - `usedSupply` is always recomputed from weapons and equipment.
//!   - `pointsUsed` is taken from the payload unless the rules say
//!     to recompute it.
//!   - equipment flags are re-resolved from the catalog by name.

use crate::{
    config::{Catalog, UnknownTemplatePolicy},
    error::{RosterError, RosterResult},
    roster::{Roster, Unit},
    types::{Points, MAX_UNIT_ID},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

pub const EXPORT_FILE_SUFFIX: &str = ".shiver.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSnapshot {
    pub shiver_name: String,
    pub points_used: Points,
    pub total_points: Points,
    pub sharkanoids: Vec<Unit>,
}

impl From<&Roster> for RosterSnapshot {
    fn from(roster: &Roster) -> Self {
        Self {
            shiver_name: roster.shiver_name.clone(),
            points_used: roster.points_used,
            total_points: roster.total_points,
            sharkanoids: roster.units.clone(),
        }
    }
}

impl RosterSnapshot {
    pub fn to_json(&self) -> RosterResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> RosterResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_value(&self) -> RosterResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// File name for an exported roster: anything outside `[A-Za-z0-9]`
/// becomes `_`.
pub fn export_file_name(shiver_name: &str) -> String {
    let stem: String = shiver_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{stem}{EXPORT_FILE_SUFFIX}")
}

/// Validate and rebuild a roster from raw exchange data.
pub fn parse_import(raw: &Value, catalog: &Catalog) -> RosterResult<Roster> {
    let obj = raw.as_object().ok_or_else(|| malformed("expected a JSON object"))?;

    let shiver_name = obj
        .get("shiverName")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("shiverName must be a string"))?
        .to_string();

    let raw_units = obj
        .get("sharkanoids")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("sharkanoids must be an array"))?;

    let total_points = optional_points(obj.get("totalPoints"), "totalPoints")?
        .unwrap_or(catalog.rules.total_points);
    let payload_points = optional_points(obj.get("pointsUsed"), "pointsUsed")?;

    let mut units = Vec::with_capacity(raw_units.len());
    let mut seen_ids = HashSet::new();
    for (i, raw_unit) in raw_units.iter().enumerate() {
        let mut unit = Unit::deserialize(raw_unit)
            .map_err(|e| malformed(&format!("sharkanoid {i}: {e}")))?;

        if unit.id > MAX_UNIT_ID {
            return Err(malformed(&format!("sharkanoid id {} out of range", unit.id)));
        }
        if !seen_ids.insert(unit.id) {
            return Err(malformed(&format!("duplicate sharkanoid id {}", unit.id)));
        }

        if catalog.template(&unit.template).is_none() {
            match catalog.rules.unknown_template_policy {
                UnknownTemplatePolicy::Accept => {
                    log::warn!("Unknown template: {} (unit '{}')", unit.template, unit.name);
                }
                UnknownTemplatePolicy::Reject => {
                    return Err(malformed(&format!("unknown template '{}'", unit.template)));
                }
            }
        }

        for item in &mut unit.equipment {
            if let Some(known) = catalog.equipment_item(&item.name) {
                item.occupies_hand = known.occupies_hand;
                item.unique_per_unit = known.unique_per_unit;
            }
        }

        let capacity = catalog.rules.hand_capacity;
        if let Some(w) = unit.weapons.iter().find(|w| w.hands > capacity) {
            return Err(malformed(&format!(
                "sharkanoid {}: weapon '{}' needs {} hands",
                unit.id, w.name, w.hands
            )));
        }

        let supply = unit
            .checked_supply_sum()
            .ok_or_else(|| malformed(&format!("sharkanoid {}: supply overflow", unit.id)))?;
        if supply != unit.used_supply {
            log::debug!(
                "unit {}: usedSupply {} recomputed as {supply}",
                unit.id,
                unit.used_supply
            );
        }
        unit.used_supply = supply;

        units.push(unit);
    }

    let mut roster = Roster { shiver_name, points_used: 0, total_points, units };

    let computed = roster
        .checked_computed_points(catalog)
        .ok_or_else(|| malformed("point costs overflow"))?;
    roster.points_used = if catalog.rules.recompute_points_on_import {
        computed
    } else {
        payload_points.unwrap_or(0)
    };
    if roster.points_used != computed {
        log::warn!(
            "imported pointsUsed {} disagrees with unit costs {computed}",
            roster.points_used
        );
    }

    let leaders = roster.leader_count();
    if !roster.is_empty() && leaders != 1 {
        log::warn!("imported roster has {leaders} leaders");
    }

    Ok(roster)
}

fn optional_points(value: Option<&Value>, field: &str) -> RosterResult<Option<Points>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| Points::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| malformed(&format!("{field} must be a non-negative integer"))),
    }
}

fn malformed(reason: &str) -> RosterError {
    RosterError::MalformedImport { reason: reason.to_string() }
}

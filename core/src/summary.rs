//! Printable summary sheet for a finished Shiver.
//!
//! Built from the roster plus catalog stats. `Display` renders the
//! plain-text sheet; richer renderers consume the struct directly.

use crate::{
    config::{Catalog, SpecialRule, UnitTemplate},
    engine::RosterEngine,
    error::RosterResult,
    roster::Unit,
    types::{Hands, Points, Supply},
};
use serde::Serialize;
use std::fmt;

const UNKNOWN_TEMPLATE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatLine {
    pub health: u32,
    pub speed: u32,
    pub armor: u32,
    pub melee_attack: u32,
    pub range_attack: u32,
    pub actions: u32,
}

impl From<&UnitTemplate> for StatLine {
    fn from(t: &UnitTemplate) -> Self {
        Self {
            health: t.health,
            speed: t.speed,
            armor: t.armor,
            melee_attack: t.melee_attack,
            range_attack: t.range_attack,
            actions: t.actions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeaponLine {
    pub name: String,
    pub supply_cost: Supply,
    pub range: String,
    pub hands: Hands,
    pub attack_dice: u32,
    pub damage: u32,
    pub special: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemLine {
    pub name: String,
    pub cost: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitSummary {
    pub name: String,
    pub is_leader: bool,
    pub template_name: String,
    pub template_points: Option<Points>,
    pub stats: Option<StatLine>,
    pub special: Option<String>,
    pub weapons: Vec<WeaponLine>,
    pub equipment: Vec<ItemLine>,
    pub extras: Vec<ItemLine>,
}

impl UnitSummary {
    fn build(unit: &Unit, catalog: &Catalog) -> Self {
        let template = catalog.template(&unit.template);
        Self {
            name: unit.name.clone(),
            is_leader: unit.is_leader,
            template_name: template.map_or_else(|| UNKNOWN_TEMPLATE.to_string(), |t| t.name.clone()),
            template_points: template.map(|t| t.points),
            stats: template.map(StatLine::from),
            special: template.and_then(|t| t.special.clone()),
            weapons: unit
                .weapons
                .iter()
                .map(|w| WeaponLine {
                    name: w.name.clone(),
                    supply_cost: w.supply_cost,
                    range: w.range.clone(),
                    hands: w.hands,
                    attack_dice: w.attack_dice,
                    damage: w.damage,
                    special: w.special.clone(),
                })
                .collect(),
            equipment: unit
                .equipment
                .iter()
                .map(|e| ItemLine {
                    name: e.name.clone(),
                    cost: e.supply_cost,
                    description: e.special.clone(),
                })
                .collect(),
            extras: unit
                .extras
                .iter()
                .map(|x| ItemLine {
                    name: x.name.clone(),
                    cost: x.point_cost,
                    description: x.special.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShiverSummary {
    pub shiver_name: String,
    pub points_used: Points,
    pub total_points: Points,
    pub unit_count: usize,
    pub units: Vec<UnitSummary>,
    pub special_rules: Vec<SpecialRule>,
}

impl ShiverSummary {
    /// Same precondition as export; only the first failure is reported.
    pub fn build(engine: &RosterEngine) -> RosterResult<Self> {
        engine.first_export_error()?;

        let roster = engine.roster();
        let catalog = engine.catalog();
        Ok(Self {
            shiver_name: roster.shiver_name.clone(),
            points_used: roster.points_used,
            total_points: roster.total_points,
            unit_count: roster.units.len(),
            units: roster.units.iter().map(|u| UnitSummary::build(u, catalog)).collect(),
            special_rules: catalog.special_rules.clone(),
        })
    }
}

impl fmt::Display for ShiverSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.shiver_name)?;
        writeln!(f, "{}", "=".repeat(self.shiver_name.chars().count().max(1)))?;
        writeln!(
            f,
            "Points: {}/{}    Sharkanoids: {}",
            self.points_used, self.total_points, self.unit_count
        )?;

        for unit in &self.units {
            writeln!(f)?;
            let badge = if unit.is_leader { " [LEADER]" } else { "" };
            match unit.template_points {
                Some(points) => writeln!(f, "{}{badge} - {} ({points} pts)", unit.name, unit.template_name)?,
                None => writeln!(f, "{}{badge} - {}", unit.name, unit.template_name)?,
            }
            if let Some(s) = &unit.stats {
                writeln!(
                    f,
                    "  Health {} | Speed {} | Armor {} | M.Atk {} | R.Atk {} | Acts {}",
                    s.health, s.speed, s.armor, s.melee_attack, s.range_attack, s.actions
                )?;
            }
            if let Some(special) = &unit.special {
                writeln!(f, "  Special: {special}")?;
            }
            if !unit.weapons.is_empty() {
                writeln!(f, "  Weapons:")?;
                for w in &unit.weapons {
                    write!(
                        f,
                        "    {} (S:{}) R:{} | H:{} | A:{} | D:{}",
                        w.name, w.supply_cost, w.range, w.hands, w.attack_dice, w.damage
                    )?;
                    match &w.special {
                        Some(special) => writeln!(f, " | {special}")?,
                        None => writeln!(f)?,
                    }
                }
            }
            if !unit.equipment.is_empty() {
                writeln!(f, "  Equipment:")?;
                for e in &unit.equipment {
                    writeln!(f, "    {} (S:{}) {}", e.name, e.cost, e.description)?;
                }
            }
            if !unit.extras.is_empty() {
                writeln!(f, "  Extras:")?;
                for x in &unit.extras {
                    writeln!(f, "    {} (P:{}) {}", x.name, x.cost, x.description)?;
                }
            }
        }

        if !self.special_rules.is_empty() {
            writeln!(f)?;
            writeln!(f, "Special Rules Reference")?;
            for rule in &self.special_rules {
                writeln!(f, "  {}: {}", rule.name, rule.description)?;
            }
        }
        Ok(())
    }
}

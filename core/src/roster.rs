//! The roster data model: a Shiver and its Sharkanoids.
//!
//! Field names on the wire are camelCase to match the exchange format.

use crate::{
    config::{Catalog, EquipmentEntry, ExtraEntry, WeaponEntry},
    types::{Hands, Points, Supply, TemplateKey, UnitId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub template: TemplateKey,
    #[serde(default)]
    pub weapons: Vec<WeaponEntry>,
    #[serde(default)]
    pub equipment: Vec<EquipmentEntry>,
    #[serde(default)]
    pub extras: Vec<ExtraEntry>,
    #[serde(default)]
    pub is_leader: bool,
    #[serde(default)]
    pub used_supply: Supply,
}

impl Unit {
    pub fn new(id: UnitId, name: String, template: TemplateKey, is_leader: bool) -> Self {
        Self {
            id,
            name,
            template,
            weapons: Vec::new(),
            equipment: Vec::new(),
            extras: Vec::new(),
            is_leader,
            used_supply: 0,
        }
    }

    /// Hands taken by weapons alone.
    pub fn weapon_hands(&self) -> Hands {
        self.weapons.iter().fold(0, |acc, w| acc.saturating_add(w.hands))
    }

    /// Hands taken by weapons plus every hand-occupying item.
    pub fn hands_used(&self) -> Hands {
        let items = self.equipment.iter().filter(|e| e.occupies_hand).count();
        self.weapon_hands()
            .saturating_add(Hands::try_from(items).unwrap_or(Hands::MAX))
    }

    /// Supply as it should be: the sum over weapons and equipment.
    pub fn supply_sum(&self) -> Supply {
        self.checked_supply_sum().unwrap_or(Supply::MAX)
    }

    /// `None` when the item costs do not fit a `Supply`.
    pub fn checked_supply_sum(&self) -> Option<Supply> {
        let weapons = self.weapons.iter().map(|w| w.supply_cost);
        let equipment = self.equipment.iter().map(|e| e.supply_cost);
        weapons.chain(equipment).try_fold(0, Supply::checked_add)
    }

    pub fn extra_points(&self) -> Points {
        self.checked_extra_points().unwrap_or(Points::MAX)
    }

    pub fn checked_extra_points(&self) -> Option<Points> {
        self.extras.iter().map(|x| x.point_cost).try_fold(0, Points::checked_add)
    }

    pub fn carries(&self, equipment_name: &str) -> bool {
        self.equipment.iter().any(|e| e.name == equipment_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    pub shiver_name: String,
    pub points_used: Points,
    pub total_points: Points,
    #[serde(rename = "sharkanoids")]
    pub units: Vec<Unit>,
}

impl Roster {
    pub fn new(total_points: Points) -> Self {
        Self {
            shiver_name: String::new(),
            points_used: 0,
            total_points,
            units: Vec::new(),
        }
    }

    pub fn points_remaining(&self) -> Points {
        self.total_points.saturating_sub(self.points_used)
    }

    pub fn position(&self, id: UnitId) -> Option<usize> {
        self.units.iter().position(|u| u.id == id)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    pub fn leader(&self) -> Option<&Unit> {
        self.units.iter().find(|u| u.is_leader)
    }

    pub fn leader_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_leader).count()
    }

    /// Points as they should be: template costs plus extras.
    /// Units with unknown templates contribute only their extras.
    pub fn computed_points(&self, catalog: &Catalog) -> Points {
        self.checked_computed_points(catalog).unwrap_or(Points::MAX)
    }

    /// `None` when the total does not fit a `Points`.
    pub fn checked_computed_points(&self, catalog: &Catalog) -> Option<Points> {
        self.units.iter().try_fold(0, |total: Points, u| {
            let base = catalog.template(&u.template).map_or(0, |t| t.points);
            total.checked_add(base)?.checked_add(u.checked_extra_points()?)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

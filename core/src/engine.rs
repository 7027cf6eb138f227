//! The roster engine: owns the Shiver being built.
//!
//! RULES:
//!   - Every operation validates before it mutates. A failed call leaves
//!     the roster exactly as it was.
//!   - Points are roster-wide: unit templates and extras spend them.
//!   - Supply is per unit: weapons and equipment spend it.
//!   - A non-empty roster has exactly one leader.
//!   - The catalog is read-only for the lifetime of the engine.

use crate::{
    command::{CommandOutcome, RosterCommand},
    config::{Catalog, EquipmentEntry, ExtraEntry, UnitTemplate, WeaponEntry},
    error::{EntityKind, RosterError, RosterResult},
    invariants::{check_invariants, InvariantViolation},
    roster::{Roster, Unit},
    snapshot::{self, RosterSnapshot},
    types::{Points, Supply, TemplateKey, UnitId},
};
use std::sync::Arc;

pub struct RosterEngine {
    catalog:  Arc<Catalog>,
    roster:   Roster,
    next_id:  UnitId,
    selected: Option<usize>,
}

impl RosterEngine {
    /// Empty roster with the catalog's configured point budget.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let total_points = catalog.rules.total_points;
        Self::with_budget(catalog, total_points)
    }

    pub fn with_budget(catalog: Arc<Catalog>, total_points: Points) -> Self {
        Self {
            catalog,
            roster:   Roster::new(total_points),
            next_id:  1,
            selected: None,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // ── Shiver ─────────────────────────────────────────────────

    /// Validation is deferred to export and print.
    pub fn set_shiver_name(&mut self, name: impl Into<String>) {
        self.roster.shiver_name = name.into();
    }

    // ── Units ──────────────────────────────────────────────────

    pub fn add_unit(&mut self, key: &TemplateKey) -> RosterResult<UnitId> {
        let template = self
            .catalog
            .template(key)
            .ok_or_else(|| not_found(EntityKind::Template, key.as_str()))?;

        let remaining = self.roster.points_remaining();
        if template.points > remaining {
            return Err(RosterError::InsufficientPoints { needed: template.points, remaining });
        }

        let id = self.next_id;
        let name = format!("{}-{}", template.name, self.roster.units.len() + 1);
        let is_leader = self.roster.is_empty();
        let points = template.points;

        self.next_id += 1;
        self.roster.units.push(Unit::new(id, name, key.clone(), is_leader));
        self.roster.points_used += points;
        self.selected = Some(self.roster.units.len() - 1);

        log::debug!(
            "unit added: id={id} template={key} points={}/{} leader={is_leader}",
            self.roster.points_used,
            self.roster.total_points
        );
        Ok(id)
    }

    pub fn remove_unit(&mut self, id: UnitId) -> RosterResult<Unit> {
        let index = self.position(id)?;

        let unit = &self.roster.units[index];
        let base = self.catalog.template(&unit.template).map_or(0, |t| t.points);
        let refund = base.saturating_add(unit.extra_points());

        let removed = self.roster.units.remove(index);
        self.roster.points_used = self.roster.points_used.saturating_sub(refund);

        // Hand leadership to whoever is now first in line.
        if removed.is_leader {
            if let Some(first) = self.roster.units.first_mut() {
                first.is_leader = true;
            }
        }

        let len = self.roster.units.len();
        self.selected = match (self.selected, len) {
            (_, 0)       => None,
            (Some(s), _) => Some(s.min(len - 1)),
            (None, _)    => None,
        };

        log::debug!(
            "unit removed: id={id} refund={refund} points={}/{}",
            self.roster.points_used,
            self.roster.total_points
        );
        Ok(removed)
    }

    pub fn set_leader(&mut self, id: UnitId) -> RosterResult<()> {
        self.position(id)?;
        for unit in &mut self.roster.units {
            unit.is_leader = unit.id == id;
        }
        log::debug!("leader set: id={id}");
        Ok(())
    }

    /// Checkbox semantics: checking nominates the unit, unchecking the
    /// sole leader is refused because nobody would replace it.
    pub fn set_leader_flag(&mut self, id: UnitId, checked: bool) -> RosterResult<()> {
        if checked {
            return self.set_leader(id);
        }
        if self.unit(id)?.is_leader {
            return Err(RosterError::LeaderRequired);
        }
        Ok(())
    }

    pub fn rename_unit(&mut self, id: UnitId, name: impl Into<String>) -> RosterResult<()> {
        self.unit_mut(id)?.name = name.into();
        Ok(())
    }

    // ── Selection ──────────────────────────────────────────────

    pub fn select_unit(&mut self, index: Option<usize>) -> RosterResult<()> {
        if let Some(i) = index {
            let len = self.roster.units.len();
            if i >= len {
                return Err(RosterError::IndexOutOfRange { kind: EntityKind::Unit, index: i, len });
            }
        }
        self.selected = index;
        Ok(())
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_unit(&self) -> Option<&Unit> {
        self.selected.and_then(|i| self.roster.units.get(i))
    }

    // ── Weapons ────────────────────────────────────────────────

    /// Free hands count hand-occupying equipment as well as weapons, so a
    /// Buckler blocks a two-hander on units without the dual-wield exception.
    pub fn add_weapon(&mut self, id: UnitId, weapon_name: &str) -> RosterResult<()> {
        let weapon = self
            .catalog
            .weapon(weapon_name)
            .ok_or_else(|| not_found(EntityKind::Weapon, weapon_name))?
            .clone();
        let unit = self.unit(id)?;
        let template = self.template_of(unit)?;

        check_supply(unit, template, weapon.supply_cost)?;

        let capacity = self.catalog.rules.hand_capacity;
        let hands_used = unit.hands_used();
        let free = capacity.saturating_sub(hands_used);
        if weapon.hands > free {
            // A dual-wield template may still take a two-hander in one free hand.
            let one_handed_two_hander = self.catalog.rules.can_dual_wield(&unit.template)
                && weapon.hands == 2
                && hands_used < capacity;
            if !one_handed_two_hander {
                return Err(RosterError::InsufficientHands { needed: weapon.hands, free });
            }
        }

        let unit = self.unit_mut(id)?;
        unit.used_supply += weapon.supply_cost;
        log::debug!("unit {id}: +weapon '{}' supply={}", weapon.name, unit.used_supply);
        unit.weapons.push(weapon);
        Ok(())
    }

    pub fn remove_weapon(&mut self, id: UnitId, index: usize) -> RosterResult<WeaponEntry> {
        let unit = self.unit_mut(id)?;
        check_index(EntityKind::Weapon, index, unit.weapons.len())?;
        let weapon = unit.weapons.remove(index);
        unit.used_supply = unit.used_supply.saturating_sub(weapon.supply_cost);
        log::debug!("unit {id}: -weapon '{}' supply={}", weapon.name, unit.used_supply);
        Ok(weapon)
    }

    // ── Equipment ──────────────────────────────────────────────

    pub fn add_equipment(&mut self, id: UnitId, equipment_name: &str) -> RosterResult<()> {
        let item = self
            .catalog
            .equipment_item(equipment_name)
            .ok_or_else(|| not_found(EntityKind::Equipment, equipment_name))?
            .clone();
        let unit = self.unit(id)?;
        let template = self.template_of(unit)?;

        check_supply(unit, template, item.supply_cost)?;

        if item.unique_per_unit && unit.carries(&item.name) {
            return Err(RosterError::DuplicateUnique { name: item.name });
        }

        if item.occupies_hand {
            let free = self.catalog.rules.hand_capacity.saturating_sub(unit.hands_used());
            if free < 1 {
                return Err(RosterError::InsufficientHands { needed: 1, free });
            }
        }

        let unit = self.unit_mut(id)?;
        unit.used_supply += item.supply_cost;
        log::debug!("unit {id}: +equipment '{}' supply={}", item.name, unit.used_supply);
        unit.equipment.push(item);
        Ok(())
    }

    pub fn remove_equipment(&mut self, id: UnitId, index: usize) -> RosterResult<EquipmentEntry> {
        let unit = self.unit_mut(id)?;
        check_index(EntityKind::Equipment, index, unit.equipment.len())?;
        let item = unit.equipment.remove(index);
        unit.used_supply = unit.used_supply.saturating_sub(item.supply_cost);
        log::debug!("unit {id}: -equipment '{}' supply={}", item.name, unit.used_supply);
        Ok(item)
    }

    // ── Extras ─────────────────────────────────────────────────

    /// Extras draw on the roster-wide point budget, not unit supply.
    pub fn add_extra(&mut self, id: UnitId, extra_name: &str) -> RosterResult<()> {
        let extra = self
            .catalog
            .extra(extra_name)
            .ok_or_else(|| not_found(EntityKind::Extra, extra_name))?
            .clone();
        self.unit(id)?;

        let remaining = self.roster.points_remaining();
        if extra.point_cost > remaining {
            return Err(RosterError::InsufficientPoints { needed: extra.point_cost, remaining });
        }

        self.roster.points_used += extra.point_cost;
        log::debug!("unit {id}: +extra '{}' points={}", extra.name, self.roster.points_used);
        self.unit_mut(id)?.extras.push(extra);
        Ok(())
    }

    pub fn remove_extra(&mut self, id: UnitId, index: usize) -> RosterResult<ExtraEntry> {
        let unit = self.unit_mut(id)?;
        check_index(EntityKind::Extra, index, unit.extras.len())?;
        let extra = unit.extras.remove(index);
        self.roster.points_used = self.roster.points_used.saturating_sub(extra.point_cost);
        log::debug!("unit {id}: -extra '{}' points={}", extra.name, self.roster.points_used);
        Ok(extra)
    }

    // ── Export / import ────────────────────────────────────────

    /// Shared precondition of export and print. Reports every failure,
    /// in order; interactive callers usually show only the first.
    pub fn validate_for_export(&self) -> Result<(), Vec<RosterError>> {
        let mut errors = Vec::new();
        if self.roster.is_empty() {
            errors.push(RosterError::EmptyRoster);
        }
        if self.roster.shiver_name.is_empty() {
            errors.push(RosterError::MissingName);
        }
        if self.roster.leader().is_none() {
            errors.push(RosterError::NoLeader);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Like `validate_for_export`, stopping at the first failure.
    pub fn first_export_error(&self) -> RosterResult<()> {
        self.validate_for_export()
            .map_err(|mut errors| errors.swap_remove(0))
    }

    pub fn export_roster(&self) -> RosterResult<RosterSnapshot> {
        self.first_export_error()?;
        log::info!(
            "exporting '{}': {} units, {}/{} points",
            self.roster.shiver_name,
            self.roster.units.len(),
            self.roster.points_used,
            self.roster.total_points
        );
        Ok(RosterSnapshot::from(&self.roster))
    }

    /// Replace the roster with imported data. On failure the current
    /// roster is left untouched.
    pub fn import_roster(&mut self, raw: &serde_json::Value) -> RosterResult<&Roster> {
        let roster = snapshot::parse_import(raw, &self.catalog)?;

        // Imported ids are capped at MAX_UNIT_ID, so this cannot wrap.
        self.next_id = roster.units.iter().map(|u| u.id).max().map_or(1, |max| max + 1);
        self.selected = if roster.is_empty() { None } else { Some(0) };
        self.roster = roster;

        log::info!(
            "imported '{}': {} units, {}/{} points",
            self.roster.shiver_name,
            self.roster.units.len(),
            self.roster.points_used,
            self.roster.total_points
        );
        Ok(&self.roster)
    }

    pub fn import_json(&mut self, text: &str) -> RosterResult<&Roster> {
        let raw: serde_json::Value = serde_json::from_str(text).map_err(|e| {
            RosterError::MalformedImport { reason: format!("Invalid file format: {e}") }
        })?;
        self.import_roster(&raw)
    }

    // ── Commands ───────────────────────────────────────────────

    /// Dispatch a user intent to the matching operation.
    pub fn apply(&mut self, command: RosterCommand) -> RosterResult<CommandOutcome> {
        match command {
            RosterCommand::SetShiverName { name } => {
                self.set_shiver_name(name);
            }
            RosterCommand::AddUnit { template } => {
                let unit_id = self.add_unit(&template)?;
                return Ok(CommandOutcome::UnitAdded { unit_id });
            }
            RosterCommand::RemoveUnit { unit_id } => {
                self.remove_unit(unit_id)?;
            }
            RosterCommand::SetLeader { unit_id } => self.set_leader(unit_id)?,
            RosterCommand::SetLeaderFlag { unit_id, checked } => {
                self.set_leader_flag(unit_id, checked)?;
            }
            RosterCommand::RenameUnit { unit_id, name } => self.rename_unit(unit_id, name)?,
            RosterCommand::SelectUnit { index } => self.select_unit(index)?,
            RosterCommand::AddWeapon { unit_id, weapon } => self.add_weapon(unit_id, &weapon)?,
            RosterCommand::RemoveWeapon { unit_id, index } => {
                self.remove_weapon(unit_id, index)?;
            }
            RosterCommand::AddEquipment { unit_id, equipment } => {
                self.add_equipment(unit_id, &equipment)?;
            }
            RosterCommand::RemoveEquipment { unit_id, index } => {
                self.remove_equipment(unit_id, index)?;
            }
            RosterCommand::AddExtra { unit_id, extra } => self.add_extra(unit_id, &extra)?,
            RosterCommand::RemoveExtra { unit_id, index } => {
                self.remove_extra(unit_id, index)?;
            }
            RosterCommand::Import { data } => {
                self.import_roster(&data)?;
            }
            RosterCommand::Export => {
                let snapshot = self.export_roster()?;
                let file_name = snapshot::export_file_name(&snapshot.shiver_name);
                return Ok(CommandOutcome::Exported { file_name, snapshot });
            }
        }
        Ok(CommandOutcome::Done)
    }

    // ── Presentation queries ───────────────────────────────────

    pub fn points_remaining(&self) -> Points {
        self.roster.points_remaining()
    }

    pub fn supply_remaining(&self, id: UnitId) -> RosterResult<Supply> {
        let unit = self.unit(id)?;
        let template = self.template_of(unit)?;
        Ok(template.supply.saturating_sub(unit.used_supply))
    }

    /// Stat lookup for display. `None` for units imported with a
    /// template the catalog does not know.
    pub fn template_for(&self, id: UnitId) -> Option<&UnitTemplate> {
        let unit = self.roster.unit(id)?;
        self.catalog.template(&unit.template)
    }

    pub fn available_templates(&self) -> Vec<&UnitTemplate> {
        let remaining = self.points_remaining();
        self.catalog.templates.iter().filter(|t| t.points <= remaining).collect()
    }

    pub fn available_weapons(&self, id: UnitId) -> RosterResult<Vec<&WeaponEntry>> {
        let remaining = self.supply_remaining(id)?;
        Ok(self.catalog.weapons.iter().filter(|w| w.supply_cost <= remaining).collect())
    }

    pub fn available_equipment(&self, id: UnitId) -> RosterResult<Vec<&EquipmentEntry>> {
        let remaining = self.supply_remaining(id)?;
        Ok(self.catalog.equipment.iter().filter(|e| e.supply_cost <= remaining).collect())
    }

    pub fn available_extras(&self) -> Vec<&ExtraEntry> {
        let remaining = self.points_remaining();
        self.catalog.extras.iter().filter(|x| x.point_cost <= remaining).collect()
    }

    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        check_invariants(&self.roster, &self.catalog)
    }

    // ── Lookups ────────────────────────────────────────────────

    fn position(&self, id: UnitId) -> RosterResult<usize> {
        self.roster
            .position(id)
            .ok_or_else(|| not_found(EntityKind::Unit, &id.to_string()))
    }

    fn unit(&self, id: UnitId) -> RosterResult<&Unit> {
        self.roster
            .unit(id)
            .ok_or_else(|| not_found(EntityKind::Unit, &id.to_string()))
    }

    fn unit_mut(&mut self, id: UnitId) -> RosterResult<&mut Unit> {
        self.roster
            .unit_mut(id)
            .ok_or_else(|| not_found(EntityKind::Unit, &id.to_string()))
    }

    fn template_of(&self, unit: &Unit) -> RosterResult<&UnitTemplate> {
        self.catalog
            .template(&unit.template)
            .ok_or_else(|| not_found(EntityKind::Template, unit.template.as_str()))
    }
}

fn not_found(kind: EntityKind, key: &str) -> RosterError {
    RosterError::NotFound { kind, key: key.to_string() }
}

fn check_supply(unit: &Unit, template: &UnitTemplate, cost: Supply) -> RosterResult<()> {
    let remaining = template.supply.saturating_sub(unit.used_supply);
    if cost > remaining {
        return Err(RosterError::InsufficientSupply { needed: cost, remaining });
    }
    Ok(())
}

fn check_index(kind: EntityKind, index: usize, len: usize) -> RosterResult<()> {
    if index >= len {
        return Err(RosterError::IndexOutOfRange { kind, index, len });
    }
    Ok(())
}

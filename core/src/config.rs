//! Catalog reference data and roster rules.
//!
//! The catalog is immutable once loaded. The engine only reads it;
//! nothing in the core ever writes catalog data back.

use crate::types::{
    Hands, Points, Supply, TemplateKey, DEFAULT_TOTAL_POINTS, DUAL_WIELD_TEMPLATE, HAND_CAPACITY,
};
use anyhow::bail;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

// ── Catalog entries ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitTemplate {
    pub key: TemplateKey,
    pub name: String,
    pub points: Points,
    pub supply: Supply,
    pub health: u32,
    pub speed: u32,
    pub armor: u32,
    pub melee_attack: u32,
    pub range_attack: u32,
    pub actions: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponEntry {
    pub name: String,
    pub supply_cost: Supply,
    pub hands: Hands,
    pub range: String,
    pub attack_dice: u32,
    pub damage: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentEntry {
    pub name: String,
    pub supply_cost: Supply,
    #[serde(default)]
    pub special: String,
    /// Carrying this item takes up one hand.
    #[serde(default)]
    pub occupies_hand: bool,
    /// At most one copy per unit.
    #[serde(default)]
    pub unique_per_unit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraEntry {
    pub name: String,
    pub point_cost: Points,
    #[serde(default)]
    pub special: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialRule {
    pub name: String,
    pub description: String,
}

// ── Rules ──────────────────────────────────────────────────────────

/// What an import does with a unit whose template the catalog lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTemplatePolicy {
    /// Keep the unit, log it, and show it without stats.
    #[default]
    Accept,
    /// Fail the whole import.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterRules {
    pub total_points: Points,
    pub hand_capacity: Hands,
    /// Templates that may add a two-handed weapon while a hand is still free.
    pub dual_wield_templates: Vec<TemplateKey>,
    /// Ignore the payload's `pointsUsed` and recompute it from units and extras.
    pub recompute_points_on_import: bool,
    pub unknown_template_policy: UnknownTemplatePolicy,
}

impl Default for RosterRules {
    fn default() -> Self {
        Self {
            total_points: DEFAULT_TOTAL_POINTS,
            hand_capacity: HAND_CAPACITY,
            dual_wield_templates: vec![TemplateKey::from(DUAL_WIELD_TEMPLATE)],
            recompute_points_on_import: false,
            unknown_template_policy: UnknownTemplatePolicy::Accept,
        }
    }
}

impl RosterRules {
    pub fn can_dual_wield(&self, template: &TemplateKey) -> bool {
        self.dual_wield_templates.contains(template)
    }
}

// ── On-disk files ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TemplatesFile {
    templates: Vec<UnitTemplate>,
}

#[derive(Debug, Deserialize)]
struct WeaponsFile {
    weapons: Vec<WeaponEntry>,
}

#[derive(Debug, Deserialize)]
struct EquipmentFile {
    equipment: Vec<EquipmentEntry>,
}

#[derive(Debug, Deserialize)]
struct ExtrasFile {
    extras: Vec<ExtraEntry>,
}

#[derive(Debug, Deserialize)]
struct SpecialRulesFile {
    rules: Vec<SpecialRule>,
}

// ── Catalog ────────────────────────────────────────────────────────

/// Everything the engine needs to know about the game.
/// Entries keep file order, which is the order the builder lists them in.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub templates: Vec<UnitTemplate>,
    pub weapons: Vec<WeaponEntry>,
    pub equipment: Vec<EquipmentEntry>,
    pub extras: Vec<ExtraEntry>,
    pub special_rules: Vec<SpecialRule>,
    pub rules: RosterRules,
}

impl Catalog {
    /// Load from the data/ directory.
    /// In tests, use Catalog::default_test().
    pub fn load(data_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = data_dir.as_ref();

        let templates = read_json::<TemplatesFile>(&dir.join("templates.json"))?.templates;
        let weapons = read_json::<WeaponsFile>(&dir.join("weapons.json"))?.weapons;
        let equipment = read_json::<EquipmentFile>(&dir.join("equipment.json"))?.equipment;
        let extras = read_json::<ExtrasFile>(&dir.join("extras.json"))?.extras;
        let special_rules = read_json::<SpecialRulesFile>(&dir.join("special_rules.json"))?.rules;

        let rules_path = dir.join("rules.json");
        let rules = if rules_path.exists() {
            read_json::<RosterRules>(&rules_path)?
        } else {
            RosterRules::default()
        };

        check_unique("template", templates.iter().map(|t| t.key.as_str()))?;
        check_unique("weapon", weapons.iter().map(|w| w.name.as_str()))?;
        check_unique("equipment", equipment.iter().map(|e| e.name.as_str()))?;
        check_unique("extra", extras.iter().map(|x| x.name.as_str()))?;

        log::info!(
            "Catalog loaded from {}: {} templates, {} weapons, {} equipment, {} extras",
            dir.display(),
            templates.len(),
            weapons.len(),
            equipment.len(),
            extras.len()
        );

        Ok(Self { templates, weapons, equipment, extras, special_rules, rules })
    }

    pub fn template(&self, key: &TemplateKey) -> Option<&UnitTemplate> {
        self.templates.iter().find(|t| &t.key == key)
    }

    pub fn weapon(&self, name: &str) -> Option<&WeaponEntry> {
        self.weapons.iter().find(|w| w.name == name)
    }

    pub fn equipment_item(&self, name: &str) -> Option<&EquipmentEntry> {
        self.equipment.iter().find(|e| e.name == name)
    }

    pub fn extra(&self, name: &str) -> Option<&ExtraEntry> {
        self.extras.iter().find(|x| x.name == name)
    }

    /// Catalog with hardcoded entries for use in unit tests.
    pub fn default_test() -> Self {
        let templates = vec![
            UnitTemplate {
                key: "grunt".into(),
                name: "Grunt".into(),
                points: 15,
                supply: 4,
                health: 2,
                speed: 5,
                armor: 1,
                melee_attack: 2,
                range_attack: 1,
                actions: 2,
                special: None,
            },
            UnitTemplate {
                key: "hammerhead".into(),
                name: "Hammerhead".into(),
                points: 40,
                supply: 6,
                health: 4,
                speed: 5,
                armor: 2,
                melee_attack: 4,
                range_attack: 2,
                actions: 2,
                special: Some("Headbutt: melee attacks push the target 1\".".into()),
            },
            UnitTemplate {
                key: "great_white".into(),
                name: "Great White".into(),
                points: 70,
                supply: 8,
                health: 6,
                speed: 6,
                armor: 3,
                melee_attack: 5,
                range_attack: 2,
                actions: 3,
                special: Some("Frenzy".into()),
            },
            UnitTemplate {
                key: "mech".into(),
                name: "Mech".into(),
                points: 50,
                supply: 10,
                health: 5,
                speed: 4,
                armor: 4,
                melee_attack: 3,
                range_attack: 3,
                actions: 2,
                special: Some("Servo Arms: may wield a two-handed weapon in one hand.".into()),
            },
        ];

        let weapons = vec![
            WeaponEntry {
                name: "Harpoon Pistol".into(),
                supply_cost: 1,
                hands: 1,
                range: "8\"".into(),
                attack_dice: 1,
                damage: 1,
                special: None,
            },
            WeaponEntry {
                name: "Cutlass".into(),
                supply_cost: 2,
                hands: 1,
                range: "Melee".into(),
                attack_dice: 2,
                damage: 1,
                special: None,
            },
            WeaponEntry {
                name: "Trident".into(),
                supply_cost: 3,
                hands: 2,
                range: "Melee".into(),
                attack_dice: 3,
                damage: 2,
                special: Some("Reach".into()),
            },
            WeaponEntry {
                name: "Torpedo Launcher".into(),
                supply_cost: 4,
                hands: 2,
                range: "18\"".into(),
                attack_dice: 2,
                damage: 3,
                special: Some("Blast".into()),
            },
            WeaponEntry {
                name: "Jaws".into(),
                supply_cost: 0,
                hands: 0,
                range: "Melee".into(),
                attack_dice: 1,
                damage: 1,
                special: None,
            },
        ];

        let equipment = vec![
            EquipmentEntry {
                name: "Buckler".into(),
                supply_cost: 1,
                special: "+1 armor. Takes up 1 hand.".into(),
                occupies_hand: true,
                unique_per_unit: false,
            },
            EquipmentEntry {
                name: "Rebreather".into(),
                supply_cost: 1,
                special: "Ignores Suffocation. May only be taken once.".into(),
                occupies_hand: false,
                unique_per_unit: true,
            },
            EquipmentEntry {
                name: "Chum Bucket".into(),
                supply_cost: 2,
                special: "Once per game, Frenzy all allies within 3\".".into(),
                occupies_hand: false,
                unique_per_unit: false,
            },
        ];

        let extras = vec![
            ExtraEntry {
                name: "Veteran".into(),
                point_cost: 5,
                special: "Re-roll one die per turn.".into(),
            },
            ExtraEntry {
                name: "Battle Scars".into(),
                point_cost: 10,
                special: "+1 health.".into(),
            },
        ];

        let special_rules = vec![
            SpecialRule { name: "Reach".into(), description: "May attack models 2\" away.".into() },
            SpecialRule { name: "Blast".into(), description: "Hits every model within 2\" of the target.".into() },
            SpecialRule { name: "Frenzy".into(), description: "+1 melee attack die while wounded.".into() },
        ];

        Self {
            templates,
            weapons,
            equipment,
            extras,
            special_rules,
            rules: RosterRules::default(),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Cannot parse {}: {e}", path.display()))
}

fn check_unique<'a>(what: &str, keys: impl Iterator<Item = &'a str>) -> anyhow::Result<()> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            bail!("Duplicate {what} '{key}' in catalog");
        }
    }
    Ok(())
}

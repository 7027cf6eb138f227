use crate::{
    snapshot::RosterSnapshot,
    types::{TemplateKey, UnitId},
};
use serde::{Deserialize, Serialize};

/// Every intent the presentation layer can send to the engine.
/// Applied with `RosterEngine::apply`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum RosterCommand {
    // ── Shiver ────────────────────────────────────
    SetShiverName { name: String },

    // ── Units ─────────────────────────────────────
    AddUnit { template: TemplateKey },
    RemoveUnit { unit_id: UnitId },
    SetLeader { unit_id: UnitId },
    SetLeaderFlag { unit_id: UnitId, checked: bool },
    RenameUnit { unit_id: UnitId, name: String },
    SelectUnit { index: Option<usize> },

    // ── Loadout ───────────────────────────────────
    AddWeapon { unit_id: UnitId, weapon: String },
    RemoveWeapon { unit_id: UnitId, index: usize },
    AddEquipment { unit_id: UnitId, equipment: String },
    RemoveEquipment { unit_id: UnitId, index: usize },
    AddExtra { unit_id: UnitId, extra: String },
    RemoveExtra { unit_id: UnitId, index: usize },

    // ── Exchange ──────────────────────────────────
    Import { data: serde_json::Value },
    Export,
}

/// What a successfully applied command produced.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Done,
    UnitAdded { unit_id: UnitId },
    Exported { file_name: String, snapshot: RosterSnapshot },
}

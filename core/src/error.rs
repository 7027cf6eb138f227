use crate::types::{Hands, Points, Supply};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// What a failed lookup or index was pointing at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Unit,
    Template,
    Weapon,
    Equipment,
    Extra,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Unit      => "Sharkanoid",
            EntityKind::Template  => "template",
            EntityKind::Weapon    => "weapon",
            EntityKind::Equipment => "equipment",
            EntityKind::Extra     => "extra",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("Not enough points remaining! You need {needed} points but only have {remaining} remaining.")]
    InsufficientPoints { needed: Points, remaining: Points },

    #[error("Not enough supply available! You need {needed} supply but only have {remaining} remaining.")]
    InsufficientSupply { needed: Supply, remaining: Supply },

    #[error("Not enough hands available! Needs {needed} but only {free} free.")]
    InsufficientHands { needed: Hands, free: Hands },

    #[error("{name} can only be taken once!")]
    DuplicateUnique { name: String },

    #[error("Unknown {kind} '{key}'")]
    NotFound { kind: EntityKind, key: String },

    #[error("No {kind} at index {index} (have {len})")]
    IndexOutOfRange { kind: EntityKind, index: usize, len: usize },

    #[error("You need to create at least one Sharkanoid first!")]
    EmptyRoster,

    #[error("Please give your Shiver a name!")]
    MissingName,

    #[error("You must nominate a leader for your Shiver!")]
    NoLeader,

    #[error("Your Shiver must have a leader!")]
    LeaderRequired,

    #[error("Invalid Shiver data format: {reason}")]
    MalformedImport { reason: String },
}

impl From<serde_json::Error> for RosterError {
    fn from(e: serde_json::Error) -> Self {
        RosterError::MalformedImport { reason: e.to_string() }
    }
}

pub type RosterResult<T> = Result<T, RosterError>;

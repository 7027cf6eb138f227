//! Roster rules for Planet Shark Shiver building.
//!
//! `RosterEngine` owns one Shiver and enforces the point, supply, hand
//! and leader rules on every change. Catalog data is loaded once and
//! injected; import and export go through the `snapshot` exchange format.

pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod invariants;
pub mod roster;
pub mod snapshot;
pub mod summary;
pub mod types;

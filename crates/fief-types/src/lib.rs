//! Shared vocabulary for the Fief world simulation.
//!
//! This crate defines the types every other crate speaks: strongly-typed
//! identifiers, the closed enums of the game domain (building kinds,
//! resources, stances, treaty types and statuses, event kinds), the core
//! record structs (villages, factions, relations, treaties, events), and
//! the textual-instant helpers used at the serialization boundary.
//!
//! # Modules
//!
//! - [`ids`] -- Newtype identifier wrappers (`u64` for seed entities,
//!   time-ordered UUID v7 for records minted at runtime).
//! - [`enums`] -- Closed domain enums with their wire spellings.
//! - [`structs`] -- Record types held by the stores.
//! - [`time`] -- Textual instant parsing with the UTC-default rule.

pub mod enums;
pub mod ids;
pub mod structs;
pub mod time;

// Re-export the primary types at crate root.
pub use enums::{
    BuildingKind, EventKind, Resource, Stance, TreatyKind, TreatyStatus, UnknownBuildingKind,
    UnknownTreatyKind,
};
pub use ids::{EventId, FactionId, FactionPair, TreatyId, VillageId};
pub use structs::{
    DiplomacyEvent, Faction, PendingBuild, Relation, ResourceBundle, Treaty, Village,
};
pub use time::{InstantParseError, format_instant, hours_between, parse_instant};

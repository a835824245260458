//! Storage abstraction for the Fief world simulation.
//!
//! The engines consume two store traits: [`WorldStore`] for villages,
//! building levels, watermarks, and pending builds, and [`DiplomacyStore`]
//! for factions, relations, treaties, and the append-only event log.
//! [`GameStore`] is the union of both, which every backend implements.
//!
//! Backends are chosen by configuration at startup, never by type
//! inspection at call time:
//!
//! - [`MemoryStore`] -- volatile in-process maps, the default.
//! - [`FileStore`] -- a single JSON document rewritten after every
//!   mutation; survives restarts.
//!
//! All operations are synchronous single-step transitions. The stores
//! define no locking; callers serialize mutating access (in practice,
//! exclusive `&mut` access enforced by the borrow checker).
//!
//! # Modules
//!
//! - [`error`] -- [`StoreError`], including the invariant guards.
//! - [`world`] -- the [`WorldStore`] trait.
//! - [`diplomacy`] -- the [`DiplomacyStore`] trait.
//! - [`memory`] -- in-memory backend.
//! - [`file`] -- file-backed JSON backend.
//! - [`starting`] -- the default starting state used when a backend is
//!   empty.

pub mod diplomacy;
pub mod error;
pub mod file;
pub mod memory;
pub mod starting;
pub mod world;

pub use diplomacy::DiplomacyStore;
pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use starting::seed_starting_state;
pub use world::WorldStore;

/// The union of the two store facets. Every backend implements both, and
/// the engine facade owns one boxed `GameStore`.
pub trait GameStore: WorldStore + DiplomacyStore {}

impl<T: WorldStore + DiplomacyStore> GameStore for T {}

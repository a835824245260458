//! Error types for store operations.
//!
//! Store I/O failures and invariant violations are fatal: they propagate
//! to the caller as [`StoreError`]. Business-rule outcomes (a missing
//! village on lookup, an empty relation) are expressed as `Ok(None)` or
//! rejection values by the engines, never as these errors.

use fief_types::{BuildingKind, TreatyId, TreatyStatus, VillageId};

/// Errors that can occur in a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The storage file could not be read or written.
    #[error("storage I/O failure: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The storage document could not be encoded or decoded.
    #[error("storage document corrupt: {source}")]
    Document {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// A write referred to a village that does not exist.
    #[error("village not found: {0}")]
    VillageNotFound(VillageId),

    /// A pending build was set on a village whose single slot is occupied.
    #[error("build slot already occupied for village {0}")]
    BuildSlotOccupied(VillageId),

    /// A building level outside `[0, 20]` was written.
    #[error("building level {level} out of bounds for {building} in village {village}")]
    LevelOutOfBounds {
        /// The village being written.
        village: VillageId,
        /// The building being written.
        building: BuildingKind,
        /// The offending level.
        level: u8,
    },

    /// A status write referred to a treaty that does not exist.
    #[error("treaty not found: {0}")]
    TreatyNotFound(TreatyId),

    /// A status write attempted to leave a terminal treaty status.
    #[error("treaty {id} is {status} and cannot transition")]
    TreatyStatusTerminal {
        /// The treaty being written.
        id: TreatyId,
        /// Its current, terminal status.
        status: TreatyStatus,
    },
}

//! The world-store facet: villages, building levels, tick watermarks, and
//! pending builds.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use fief_types::{BuildingKind, PendingBuild, Village, VillageId};

use crate::error::StoreError;

/// Highest level any building can reach.
pub const MAX_BUILDING_LEVEL: u8 = 20;

/// Read/write access to the gameplay side of the world.
///
/// Relations between calls are the caller's concern; each method is a
/// single synchronous state transition.
pub trait WorldStore {
    /// All villages, in identifier order.
    fn list_villages(&self) -> Result<Vec<Village>, StoreError>;

    /// One village by identifier, or `None` if it does not exist.
    fn village(&self, id: VillageId) -> Result<Option<Village>, StoreError>;

    /// Insert or replace a village record.
    fn put_village(&mut self, village: Village) -> Result<(), StoreError>;

    /// The building levels of a village. Absent kinds are level 0
    /// (not yet built).
    fn building_levels(&self, id: VillageId) -> Result<BTreeMap<BuildingKind, u8>, StoreError>;

    /// Write one building level.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LevelOutOfBounds`] if `level` exceeds
    /// [`MAX_BUILDING_LEVEL`], and [`StoreError::VillageNotFound`] if the
    /// village does not exist.
    fn set_building_level(
        &mut self,
        id: VillageId,
        building: BuildingKind,
        level: u8,
    ) -> Result<(), StoreError>;

    /// The last-processed instant for a village, or `None` if the village
    /// has never been ticked.
    fn watermark(&self, id: VillageId) -> Result<Option<DateTime<Utc>>, StoreError>;

    /// Advance a village's watermark.
    fn set_watermark(&mut self, id: VillageId, at: DateTime<Utc>) -> Result<(), StoreError>;

    /// The pending build of a village, if any.
    fn pending_build(&self, id: VillageId) -> Result<Option<PendingBuild>, StoreError>;

    /// All pending builds, keyed by village.
    fn list_pending_builds(&self) -> Result<Vec<(VillageId, PendingBuild)>, StoreError>;

    /// Occupy a village's single build slot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BuildSlotOccupied`] if the slot is already
    /// taken; the single-slot invariant is enforced here, not only in the
    /// build system.
    fn set_pending_build(&mut self, id: VillageId, build: PendingBuild)
    -> Result<(), StoreError>;

    /// Clear a village's build slot. Clearing an empty slot is a no-op.
    fn clear_pending_build(&mut self, id: VillageId) -> Result<(), StoreError>;
}

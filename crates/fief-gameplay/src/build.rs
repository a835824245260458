//! Upgrade queueing and completion.
//!
//! Each village has exactly one build slot. Queueing validates the
//! request, deducts the cost up front, and records the pending build with
//! its completion instant; the tick-side [`apply`] completes every build
//! whose ETA has passed and clears the slot. Cost is always paid in wood,
//! whatever the building kind.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use fief_store::WorldStore;
use fief_store::world::MAX_BUILDING_LEVEL;
use fief_types::{BuildingKind, PendingBuild, Resource, VillageId};

use crate::delta::SnapshotDelta;
use crate::error::GameplayError;
use crate::production::floor_units;
use crate::rules::Rules;

/// Try to queue an upgrade of `building` for `village`.
///
/// Returns `Ok(false)` on any business rejection: unknown village, an
/// occupied build slot, a target level beyond the cap, or insufficient
/// wood. On acceptance the cost is deducted immediately and the pending
/// build recorded with `eta = now + duration`.
///
/// # Errors
///
/// Propagates store failures and overflow as [`GameplayError`].
pub fn queue_build(
    store: &mut (impl WorldStore + ?Sized),
    rules: &Rules,
    village_id: VillageId,
    building: BuildingKind,
    now: DateTime<Utc>,
) -> Result<bool, GameplayError> {
    let Some(mut village) = store.village(village_id)? else {
        debug!(village = %village_id, "queue rejected: village not found");
        return Ok(false);
    };

    if store.pending_build(village_id)?.is_some() {
        debug!(village = %village_id, "queue rejected: slot occupied");
        return Ok(false);
    }

    let current_level = store
        .building_levels(village_id)?
        .get(&building)
        .copied()
        .unwrap_or(0);
    let Some(target_level) = current_level.checked_add(1) else {
        return Ok(false);
    };
    if target_level > MAX_BUILDING_LEVEL {
        debug!(village = %village_id, %building, "queue rejected: level cap reached");
        return Ok(false);
    }

    let cost = floor_units(rules.cost(building, target_level)?);
    if village.resources.amount(Resource::Wood) < cost {
        debug!(
            village = %village_id,
            %building,
            cost,
            "queue rejected: insufficient wood"
        );
        return Ok(false);
    }

    // Pay up front; completion later costs nothing.
    village
        .resources
        .checked_debit(Resource::Wood, cost)
        .ok_or(GameplayError::ArithmeticOverflow {
            village: village_id,
        })?;
    store.put_village(village)?;

    let duration_s = rules.duration_s(building, target_level)?;
    let eta = completion_instant(now, duration_s).ok_or(GameplayError::ArithmeticOverflow {
        village: village_id,
    })?;
    store.set_pending_build(
        village_id,
        PendingBuild {
            building,
            target_level,
            eta,
        },
    )?;

    info!(
        village = %village_id,
        %building,
        target_level,
        cost,
        eta = %eta,
        "build queued"
    );
    Ok(true)
}

/// Complete every pending build whose ETA has passed.
///
/// Sets the building's level to its target, clears the slot, and reports
/// the completion. Builds still in flight are left untouched.
///
/// # Errors
///
/// Propagates store failures as [`GameplayError`].
pub fn apply(
    store: &mut (impl WorldStore + ?Sized),
    now: DateTime<Utc>,
) -> Result<SnapshotDelta, GameplayError> {
    let mut out = SnapshotDelta::default();

    for (village_id, build) in store.list_pending_builds()? {
        if build.eta > now {
            continue;
        }
        store.set_building_level(village_id, build.building, build.target_level)?;
        store.clear_pending_build(village_id)?;
        out.builds_completed.push((village_id, build.building));
        info!(
            village = %village_id,
            building = %build.building,
            level = build.target_level,
            "build completed"
        );
    }

    Ok(out)
}

/// `now + duration_s`, or `None` if the duration does not fit a timestamp.
fn completion_instant(now: DateTime<Utc>, duration_s: f64) -> Option<DateTime<Utc>> {
    let millis = i64::try_from(floor_units(duration_s * 1000.0)).ok()?;
    let offset = chrono::Duration::try_milliseconds(millis)?;
    now.checked_add_signed(offset)
}

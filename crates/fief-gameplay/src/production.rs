//! Resource accrual since the per-village watermark.
//!
//! For each village with a recorded watermark, production is
//! `floor(rate(building, level) * elapsed_hours)` per building at level
//! 1 or higher, credited to the resource that building produces. The
//! watermark then advances to `now`, even when every building's
//! production rounded to zero; otherwise sub-hour fractions would silently
//! accumulate across ticks. Villages whose watermark is at or after `now`
//! are skipped entirely, watermark included, which makes repeated and
//! backward-in-time invocations safe no-ops.

use chrono::{DateTime, Utc};
use tracing::debug;

use fief_store::WorldStore;
use fief_types::Resource;
use fief_types::time::hours_between;

use crate::delta::{ResourceDelta, SnapshotDelta};
use crate::error::GameplayError;
use crate::rules::Rules;

/// Upper bound used when clamping a floored f64 production amount.
const MAX_UNITS_F: f64 = 9_007_199_254_740_992.0; // 2^53

/// Accrue production for every village and advance watermarks.
///
/// Returns the set of non-empty per-village resource deltas.
///
/// # Errors
///
/// Propagates store failures and overflow as [`GameplayError`].
pub fn apply(
    store: &mut (impl WorldStore + ?Sized),
    rules: &Rules,
    now: DateTime<Utc>,
) -> Result<SnapshotDelta, GameplayError> {
    let mut out = SnapshotDelta::default();

    for village in store.list_villages()? {
        let Some(last_tick) = store.watermark(village.id)? else {
            // Never ticked; nothing to accrue from.
            continue;
        };

        let elapsed_h = hours_between(last_tick, now);
        if elapsed_h <= 0.0 {
            // No time passed, or time went backwards. Leave the watermark
            // untouched so the village is processed once "now" catches up.
            continue;
        }

        let levels = store.building_levels(village.id)?;
        let mut delta = ResourceDelta::default();
        for (building, level) in levels {
            if level == 0 {
                continue;
            }
            let rate_per_hour = rules.rate(building, level)?;
            let produced = floor_units(rate_per_hour * elapsed_h);
            delta
                .checked_add(building.produces(), produced)
                .ok_or(GameplayError::ArithmeticOverflow {
                    village: village.id,
                })?;
        }

        if !delta.is_empty() {
            let mut updated = village.clone();
            for resource in [Resource::Wood, Resource::Clay, Resource::Iron, Resource::Crop] {
                let gained = delta.amount(resource);
                if gained > 0 {
                    updated
                        .resources
                        .checked_credit(resource, gained)
                        .ok_or(GameplayError::ArithmeticOverflow {
                            village: village.id,
                        })?;
                }
            }
            store.put_village(updated)?;
            out.resources_changed.insert(village.id, delta);
        }

        // Advance the watermark even for an all-zero delta.
        store.set_watermark(village.id, now)?;
        debug!(village = %village.id, elapsed_h, "production applied");
    }

    Ok(out)
}

/// Floor a unit amount, clamping negatives to zero.
pub(crate) fn floor_units(amount: f64) -> u64 {
    if amount <= 0.0 {
        return 0;
    }
    let floored = amount.floor();
    if floored >= MAX_UNITS_F {
        return u64::MAX;
    }
    // In range and non-negative after the guards above.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        floored as u64
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};
    use fief_store::MemoryStore;
    use fief_types::{BuildingKind, Resource, ResourceBundle, Village, VillageId};

    use super::*;

    fn instant(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 23, hour, minute, 0).unwrap()
    }

    fn store_with_lumber_mill(level: u8) -> (MemoryStore, VillageId) {
        let mut store = MemoryStore::new();
        let id = VillageId::new(1);
        store
            .put_village(Village::new(id, "Meridian Keep", ResourceBundle::uniform(0)))
            .unwrap();
        store
            .set_building_level(id, BuildingKind::LumberMill, level)
            .unwrap();
        store.set_watermark(id, instant(12, 0)).unwrap();
        (store, id)
    }

    #[test]
    fn one_hour_at_level_one_yields_base_rate() {
        let (mut store, id) = store_with_lumber_mill(1);
        let delta = apply(&mut store, &Rules::default(), instant(13, 0)).unwrap();
        assert_eq!(delta.resources_changed.get(&id).unwrap().wood, 60);
        let village = store.village(id).unwrap().unwrap();
        assert_eq!(village.resources.amount(Resource::Wood), 60);
        assert_eq!(store.watermark(id).unwrap(), Some(instant(13, 0)));
    }

    #[test]
    fn half_hour_floors_to_half_rate() {
        let (mut store, id) = store_with_lumber_mill(1);
        let delta = apply(&mut store, &Rules::default(), instant(12, 30)).unwrap();
        assert_eq!(delta.resources_changed.get(&id).unwrap().wood, 30);
    }

    #[test]
    fn repeat_tick_at_same_instant_is_empty() {
        let (mut store, _id) = store_with_lumber_mill(1);
        let now = instant(13, 0);
        let first = apply(&mut store, &Rules::default(), now).unwrap();
        assert!(!first.is_empty());
        let second = apply(&mut store, &Rules::default(), now).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn backward_tick_leaves_watermark_alone() {
        let (mut store, id) = store_with_lumber_mill(1);
        let delta = apply(&mut store, &Rules::default(), instant(11, 0)).unwrap();
        assert!(delta.is_empty());
        assert_eq!(store.watermark(id).unwrap(), Some(instant(12, 0)));
    }

    #[test]
    fn zero_unit_delta_still_advances_watermark() {
        // Farm at level 1 produces 30/h; over 30 seconds that floors to 0.
        let mut store = MemoryStore::new();
        let id = VillageId::new(1);
        store
            .put_village(Village::new(id, "Northreach", ResourceBundle::uniform(0)))
            .unwrap();
        store.set_building_level(id, BuildingKind::Farm, 1).unwrap();
        store.set_watermark(id, instant(12, 0)).unwrap();

        let now = instant(12, 0) + Duration::seconds(30);
        let delta = apply(&mut store, &Rules::default(), now).unwrap();
        assert!(delta.is_empty());
        assert_eq!(store.watermark(id).unwrap(), Some(now));
    }

    #[test]
    fn level_zero_buildings_produce_nothing() {
        let mut store = MemoryStore::new();
        let id = VillageId::new(1);
        store
            .put_village(Village::new(id, "Northreach", ResourceBundle::uniform(0)))
            .unwrap();
        store.set_building_level(id, BuildingKind::IronMine, 0).unwrap();
        store.set_watermark(id, instant(12, 0)).unwrap();

        let delta = apply(&mut store, &Rules::default(), instant(14, 0)).unwrap();
        assert!(delta.is_empty());
    }

    #[test]
    fn villages_without_watermark_are_skipped() {
        let mut store = MemoryStore::new();
        let id = VillageId::new(1);
        store
            .put_village(Village::new(id, "Northreach", ResourceBundle::uniform(0)))
            .unwrap();
        store.set_building_level(id, BuildingKind::LumberMill, 1).unwrap();

        let delta = apply(&mut store, &Rules::default(), instant(14, 0)).unwrap();
        assert!(delta.is_empty());
        assert_eq!(store.watermark(id).unwrap(), None);
    }

    #[test]
    fn multiple_buildings_map_to_their_resources() {
        let mut store = MemoryStore::new();
        let id = VillageId::new(1);
        store
            .put_village(Village::new(id, "Meridian Keep", ResourceBundle::uniform(0)))
            .unwrap();
        for building in BuildingKind::ALL {
            store.set_building_level(id, building, 1).unwrap();
        }
        store.set_watermark(id, instant(12, 0)).unwrap();

        let delta = apply(&mut store, &Rules::default(), instant(13, 0)).unwrap();
        let gained = delta.resources_changed.get(&id).unwrap();
        assert_eq!(gained.wood, 60);
        assert_eq!(gained.clay, 60);
        assert_eq!(gained.iron, 60);
        assert_eq!(gained.crop, 30);
    }
}

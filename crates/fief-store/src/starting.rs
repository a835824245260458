//! The default starting state.
//!
//! Seeds a small playable world into an empty backend: two villages with
//! working production buildings, three factions (one player-controlled),
//! and a neutral relation for every faction pair, all watermarked at the
//! boot instant so the first tick accrues from "now" instead of from an
//! arbitrary past.

use chrono::{DateTime, Utc};
use tracing::info;

use fief_types::{
    BuildingKind, Faction, FactionId, FactionPair, Relation, ResourceBundle, Stance, Village,
    VillageId,
};

use crate::diplomacy::DiplomacyStore;
use crate::error::StoreError;
use crate::world::WorldStore;

/// Seed the default world into `store`.
///
/// Intended for an empty backend; existing records with the same
/// identifiers are overwritten.
///
/// # Errors
///
/// Propagates any [`StoreError`] from the backend.
pub fn seed_starting_state(
    store: &mut (impl WorldStore + DiplomacyStore + ?Sized),
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    // Villages.
    let capital = VillageId::new(1);
    store.put_village(Village::new(capital, "Meridian Keep", ResourceBundle::uniform(800)))?;
    for building in BuildingKind::ALL {
        store.set_building_level(capital, building, 1)?;
    }
    store.set_watermark(capital, now)?;

    let outpost = VillageId::new(2);
    store.put_village(Village::new(
        outpost,
        "Northreach",
        ResourceBundle {
            wood: 600,
            clay: 400,
            iron: 500,
            crop: 450,
        },
    ))?;
    // The outpost has no mine or pit yet; level-0 buildings produce nothing.
    store.set_building_level(outpost, BuildingKind::LumberMill, 1)?;
    store.set_building_level(outpost, BuildingKind::Farm, 1)?;
    store.set_watermark(outpost, now)?;

    // Factions.
    let factions = [
        Faction {
            id: FactionId::new(1),
            name: "The Crown".to_owned(),
            is_player: true,
        },
        Faction {
            id: FactionId::new(2),
            name: "Ironmarch".to_owned(),
            is_player: false,
        },
        Faction {
            id: FactionId::new(3),
            name: "Veilwood Compact".to_owned(),
            is_player: false,
        },
    ];
    for faction in &factions {
        store.put_faction(faction.clone())?;
    }

    // A neutral relation for every pair.
    for (index, first) in factions.iter().enumerate() {
        for second in factions.iter().skip(index.saturating_add(1)) {
            store.upsert_relation(Relation {
                pair: FactionPair::new(first.id, second.id),
                stance: Stance::Neutral,
                opinion: 0.0,
                last_updated: now,
            })?;
        }
    }

    info!(
        villages = 2,
        factions = factions.len(),
        "seeded starting state"
    );
    Ok(())
}

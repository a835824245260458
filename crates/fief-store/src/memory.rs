//! Volatile in-memory backend.
//!
//! The default backend: plain `BTreeMap`s, deterministic iteration order,
//! nothing survives the process. The file backend reuses this struct as
//! its working state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use fief_types::{
    BuildingKind, DiplomacyEvent, EventId, EventKind, Faction, FactionId, FactionPair,
    PendingBuild, Relation, Treaty, TreatyId, TreatyKind, TreatyStatus, Village, VillageId,
};

use crate::diplomacy::DiplomacyStore;
use crate::error::StoreError;
use crate::world::{MAX_BUILDING_LEVEL, WorldStore};

/// In-memory backend holding the complete world state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub(crate) villages: BTreeMap<VillageId, Village>,
    pub(crate) buildings: BTreeMap<VillageId, BTreeMap<BuildingKind, u8>>,
    pub(crate) watermarks: BTreeMap<VillageId, DateTime<Utc>>,
    pub(crate) pending: BTreeMap<VillageId, PendingBuild>,
    pub(crate) factions: BTreeMap<FactionId, Faction>,
    pub(crate) relations: BTreeMap<FactionPair, Relation>,
    pub(crate) treaties: BTreeMap<TreatyId, Treaty>,
    pub(crate) events: Vec<DiplomacyEvent>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the store holds no world data at all.
    pub fn is_empty(&self) -> bool {
        self.villages.is_empty() && self.factions.is_empty()
    }
}

impl WorldStore for MemoryStore {
    fn list_villages(&self) -> Result<Vec<Village>, StoreError> {
        Ok(self.villages.values().cloned().collect())
    }

    fn village(&self, id: VillageId) -> Result<Option<Village>, StoreError> {
        Ok(self.villages.get(&id).cloned())
    }

    fn put_village(&mut self, village: Village) -> Result<(), StoreError> {
        self.villages.insert(village.id, village);
        Ok(())
    }

    fn building_levels(&self, id: VillageId) -> Result<BTreeMap<BuildingKind, u8>, StoreError> {
        Ok(self.buildings.get(&id).cloned().unwrap_or_default())
    }

    fn set_building_level(
        &mut self,
        id: VillageId,
        building: BuildingKind,
        level: u8,
    ) -> Result<(), StoreError> {
        if level > MAX_BUILDING_LEVEL {
            return Err(StoreError::LevelOutOfBounds {
                village: id,
                building,
                level,
            });
        }
        if !self.villages.contains_key(&id) {
            return Err(StoreError::VillageNotFound(id));
        }
        self.buildings.entry(id).or_default().insert(building, level);
        Ok(())
    }

    fn watermark(&self, id: VillageId) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self.watermarks.get(&id).copied())
    }

    fn set_watermark(&mut self, id: VillageId, at: DateTime<Utc>) -> Result<(), StoreError> {
        if !self.villages.contains_key(&id) {
            return Err(StoreError::VillageNotFound(id));
        }
        self.watermarks.insert(id, at);
        Ok(())
    }

    fn pending_build(&self, id: VillageId) -> Result<Option<PendingBuild>, StoreError> {
        Ok(self.pending.get(&id).copied())
    }

    fn list_pending_builds(&self) -> Result<Vec<(VillageId, PendingBuild)>, StoreError> {
        Ok(self.pending.iter().map(|(id, build)| (*id, *build)).collect())
    }

    fn set_pending_build(
        &mut self,
        id: VillageId,
        build: PendingBuild,
    ) -> Result<(), StoreError> {
        if !self.villages.contains_key(&id) {
            return Err(StoreError::VillageNotFound(id));
        }
        if self.pending.contains_key(&id) {
            return Err(StoreError::BuildSlotOccupied(id));
        }
        self.pending.insert(id, build);
        Ok(())
    }

    fn clear_pending_build(&mut self, id: VillageId) -> Result<(), StoreError> {
        self.pending.remove(&id);
        Ok(())
    }
}

impl DiplomacyStore for MemoryStore {
    fn list_factions(&self) -> Result<Vec<Faction>, StoreError> {
        Ok(self.factions.values().cloned().collect())
    }

    fn faction(&self, id: FactionId) -> Result<Option<Faction>, StoreError> {
        Ok(self.factions.get(&id).cloned())
    }

    fn put_faction(&mut self, faction: Faction) -> Result<(), StoreError> {
        self.factions.insert(faction.id, faction);
        Ok(())
    }

    fn relation(&self, pair: FactionPair) -> Result<Option<Relation>, StoreError> {
        Ok(self.relations.get(&pair).cloned())
    }

    fn upsert_relation(&mut self, relation: Relation) -> Result<(), StoreError> {
        self.relations.insert(relation.pair, relation);
        Ok(())
    }

    fn list_relations(&self) -> Result<Vec<Relation>, StoreError> {
        Ok(self.relations.values().cloned().collect())
    }

    fn list_treaties(&self) -> Result<Vec<Treaty>, StoreError> {
        Ok(self.treaties.values().cloned().collect())
    }

    fn treaty(&self, id: TreatyId) -> Result<Option<Treaty>, StoreError> {
        Ok(self.treaties.get(&id).cloned())
    }

    fn open_treaty(
        &mut self,
        pair: FactionPair,
        kind: TreatyKind,
        started_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<TreatyId, StoreError> {
        let id = TreatyId::new();
        self.treaties.insert(
            id,
            Treaty {
                id,
                pair,
                kind,
                status: TreatyStatus::Active,
                started_at,
                expires_at,
            },
        );
        Ok(id)
    }

    fn set_treaty_status(&mut self, id: TreatyId, status: TreatyStatus) -> Result<(), StoreError> {
        let treaty = self
            .treaties
            .get_mut(&id)
            .ok_or(StoreError::TreatyNotFound(id))?;
        if treaty.status.is_terminal() && treaty.status != status {
            return Err(StoreError::TreatyStatusTerminal {
                id,
                status: treaty.status,
            });
        }
        treaty.status = status;
        Ok(())
    }

    fn log_event(
        &mut self,
        kind: EventKind,
        payload: Value,
        ts: DateTime<Utc>,
    ) -> Result<EventId, StoreError> {
        let id = EventId::new();
        self.events.push(DiplomacyEvent {
            id,
            kind,
            payload,
            ts,
        });
        Ok(id)
    }

    fn list_events(
        &self,
        since: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<DiplomacyEvent>, StoreError> {
        let filtered: Vec<DiplomacyEvent> = self
            .events
            .iter()
            .filter(|event| since.is_none_or(|cutoff| event.ts >= cutoff))
            .cloned()
            .collect();
        let kept = match limit {
            Some(n) if n < filtered.len() => {
                let skip = filtered.len().saturating_sub(n);
                filtered.into_iter().skip(skip).collect()
            }
            _ => filtered,
        };
        Ok(kept)
    }
}

//! File-backed JSON backend.
//!
//! The whole world lives in one JSON document. It is read once when the
//! store opens and rewritten after every mutation, so the on-disk state
//! always matches the last completed operation. A missing file is
//! initialized to an empty document; seeding is the driver's decision,
//! not the store's.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use fief_types::{
    BuildingKind, DiplomacyEvent, EventId, EventKind, Faction, FactionId, FactionPair,
    PendingBuild, Relation, Treaty, TreatyId, TreatyKind, TreatyStatus, Village, VillageId,
};

use crate::diplomacy::DiplomacyStore;
use crate::error::StoreError;
use crate::memory::MemoryStore;
use crate::world::WorldStore;

/// One building level in the document.
#[derive(Debug, Serialize, Deserialize)]
struct BuildingRow {
    village: VillageId,
    building: BuildingKind,
    level: u8,
}

/// One village watermark in the document.
#[derive(Debug, Serialize, Deserialize)]
struct WatermarkRow {
    village: VillageId,
    last_tick: DateTime<Utc>,
}

/// One occupied build slot in the document.
#[derive(Debug, Serialize, Deserialize)]
struct PendingRow {
    village: VillageId,
    #[serde(flatten)]
    build: PendingBuild,
}

/// The serialized shape of the whole world.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct WorldDocument {
    villages: Vec<Village>,
    buildings: Vec<BuildingRow>,
    watermarks: Vec<WatermarkRow>,
    pending_builds: Vec<PendingRow>,
    factions: Vec<Faction>,
    relations: Vec<Relation>,
    treaties: Vec<Treaty>,
    events: Vec<DiplomacyEvent>,
}

impl WorldDocument {
    /// Capture the current state of a memory store.
    fn from_store(store: &MemoryStore) -> Self {
        Self {
            villages: store.villages.values().cloned().collect(),
            buildings: store
                .buildings
                .iter()
                .flat_map(|(village, levels)| {
                    levels.iter().map(|(building, level)| BuildingRow {
                        village: *village,
                        building: *building,
                        level: *level,
                    })
                })
                .collect(),
            watermarks: store
                .watermarks
                .iter()
                .map(|(village, last_tick)| WatermarkRow {
                    village: *village,
                    last_tick: *last_tick,
                })
                .collect(),
            pending_builds: store
                .pending
                .iter()
                .map(|(village, build)| PendingRow {
                    village: *village,
                    build: *build,
                })
                .collect(),
            factions: store.factions.values().cloned().collect(),
            relations: store.relations.values().cloned().collect(),
            treaties: store.treaties.values().cloned().collect(),
            events: store.events.clone(),
        }
    }

    /// Rebuild a memory store from the document.
    fn into_store(self) -> MemoryStore {
        let mut store = MemoryStore::new();
        for village in self.villages {
            store.villages.insert(village.id, village);
        }
        for row in self.buildings {
            store
                .buildings
                .entry(row.village)
                .or_default()
                .insert(row.building, row.level);
        }
        for row in self.watermarks {
            store.watermarks.insert(row.village, row.last_tick);
        }
        for row in self.pending_builds {
            store.pending.insert(row.village, row.build);
        }
        for faction in self.factions {
            store.factions.insert(faction.id, faction);
        }
        for relation in self.relations {
            store.relations.insert(relation.pair, relation);
        }
        for treaty in self.treaties {
            store.treaties.insert(treaty.id, treaty);
        }
        store.events = self.events;
        store
    }
}

/// File-backed backend wrapping a [`MemoryStore`] working copy.
#[derive(Debug)]
pub struct FileStore {
    inner: MemoryStore,
    path: PathBuf,
}

impl FileStore {
    /// Open the store at `path`, creating an empty document (and parent
    /// directories) if none exists yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] on filesystem failures and
    /// [`StoreError::Document`] if the existing file is not a valid world
    /// document.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if !path.exists() {
            let empty = serde_json::to_string_pretty(&WorldDocument::default())?;
            std::fs::write(&path, empty)?;
            debug!(path = %path.display(), "initialized empty world document");
        }
        let raw = std::fs::read_to_string(&path)?;
        let document: WorldDocument = serde_json::from_str(&raw)?;
        Ok(Self {
            inner: document.into_store(),
            path,
        })
    }

    /// Whether the store holds no world data at all.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the backing document from the working copy.
    fn persist(&self) -> Result<(), StoreError> {
        let document = WorldDocument::from_store(&self.inner);
        let raw = serde_json::to_string_pretty(&document)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl WorldStore for FileStore {
    fn list_villages(&self) -> Result<Vec<Village>, StoreError> {
        self.inner.list_villages()
    }

    fn village(&self, id: VillageId) -> Result<Option<Village>, StoreError> {
        self.inner.village(id)
    }

    fn put_village(&mut self, village: Village) -> Result<(), StoreError> {
        self.inner.put_village(village)?;
        self.persist()
    }

    fn building_levels(
        &self,
        id: VillageId,
    ) -> Result<std::collections::BTreeMap<BuildingKind, u8>, StoreError> {
        self.inner.building_levels(id)
    }

    fn set_building_level(
        &mut self,
        id: VillageId,
        building: BuildingKind,
        level: u8,
    ) -> Result<(), StoreError> {
        self.inner.set_building_level(id, building, level)?;
        self.persist()
    }

    fn watermark(&self, id: VillageId) -> Result<Option<DateTime<Utc>>, StoreError> {
        self.inner.watermark(id)
    }

    fn set_watermark(&mut self, id: VillageId, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.inner.set_watermark(id, at)?;
        self.persist()
    }

    fn pending_build(&self, id: VillageId) -> Result<Option<PendingBuild>, StoreError> {
        self.inner.pending_build(id)
    }

    fn list_pending_builds(&self) -> Result<Vec<(VillageId, PendingBuild)>, StoreError> {
        self.inner.list_pending_builds()
    }

    fn set_pending_build(
        &mut self,
        id: VillageId,
        build: PendingBuild,
    ) -> Result<(), StoreError> {
        self.inner.set_pending_build(id, build)?;
        self.persist()
    }

    fn clear_pending_build(&mut self, id: VillageId) -> Result<(), StoreError> {
        self.inner.clear_pending_build(id)?;
        self.persist()
    }
}

impl DiplomacyStore for FileStore {
    fn list_factions(&self) -> Result<Vec<Faction>, StoreError> {
        self.inner.list_factions()
    }

    fn faction(&self, id: FactionId) -> Result<Option<Faction>, StoreError> {
        self.inner.faction(id)
    }

    fn put_faction(&mut self, faction: Faction) -> Result<(), StoreError> {
        self.inner.put_faction(faction)?;
        self.persist()
    }

    fn relation(&self, pair: FactionPair) -> Result<Option<Relation>, StoreError> {
        self.inner.relation(pair)
    }

    fn upsert_relation(&mut self, relation: Relation) -> Result<(), StoreError> {
        self.inner.upsert_relation(relation)?;
        self.persist()
    }

    fn list_relations(&self) -> Result<Vec<Relation>, StoreError> {
        self.inner.list_relations()
    }

    fn list_treaties(&self) -> Result<Vec<Treaty>, StoreError> {
        self.inner.list_treaties()
    }

    fn treaty(&self, id: TreatyId) -> Result<Option<Treaty>, StoreError> {
        self.inner.treaty(id)
    }

    fn open_treaty(
        &mut self,
        pair: FactionPair,
        kind: TreatyKind,
        started_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<TreatyId, StoreError> {
        let id = self.inner.open_treaty(pair, kind, started_at, expires_at)?;
        self.persist()?;
        Ok(id)
    }

    fn set_treaty_status(&mut self, id: TreatyId, status: TreatyStatus) -> Result<(), StoreError> {
        self.inner.set_treaty_status(id, status)?;
        self.persist()
    }

    fn log_event(
        &mut self,
        kind: EventKind,
        payload: Value,
        ts: DateTime<Utc>,
    ) -> Result<EventId, StoreError> {
        let id = self.inner.log_event(kind, payload, ts)?;
        self.persist()?;
        Ok(id)
    }

    fn list_events(
        &self,
        since: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<DiplomacyEvent>, StoreError> {
        self.inner.list_events(since, limit)
    }
}

//! The engine facade.
//!
//! [`GameEngine`] bundles a configured storage backend with the gameplay
//! and diplomacy rule sets and exposes the operations an outer layer
//! consumes: `tick`, `queue_build`, `diplomacy_tick`, `suggest`,
//! `propose`, and incident recording. Construction happens once at
//! startup, from explicit parts or from [`EngineConfig`]; there are no
//! process-wide singletons.
//!
//! Every mutating operation takes `&mut self`: exclusive access is the
//! caller's serialization discipline, enforced in-process by the borrow
//! checker. Callers sharing an engine across threads wrap it in a mutex.

use chrono::{DateTime, Utc};
use tracing::debug;

use fief_diplomacy::treaty::{ProposalOutcome, ProposalRejection};
use fief_diplomacy::{DiplomacyRules, Suggestion, TickReport, evaluator, incidents, proposer, treaty};
use fief_gameplay::{Rules, SnapshotDelta, build, service};
use fief_store::{FileStore, GameStore, MemoryStore, seed_starting_state};
use fief_types::{FactionId, Relation, Village, VillageId};

use crate::config::{BackendKind, EngineConfig};
use crate::error::EngineError;

/// The assembled simulation engine.
pub struct GameEngine {
    store: Box<dyn GameStore>,
    rules: Rules,
    diplomacy_rules: DiplomacyRules,
}

impl core::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GameEngine")
            .field("rules", &self.rules.version)
            .field("diplomacy_rules", &self.diplomacy_rules.version)
            .finish_non_exhaustive()
    }
}

impl GameEngine {
    /// Assemble an engine from explicit parts.
    pub fn new(store: Box<dyn GameStore>, rules: Rules, diplomacy_rules: DiplomacyRules) -> Self {
        Self {
            store,
            rules,
            diplomacy_rules,
        }
    }

    /// Construct the backend named by `config` and assemble an engine
    /// with the default rule sets.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the file backend cannot open its
    /// document.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let store: Box<dyn GameStore> = match config.storage.backend {
            BackendKind::Memory => Box::new(MemoryStore::new()),
            BackendKind::File => Box::new(FileStore::open(&config.storage.path)?),
        };
        Ok(Self::new(store, Rules::default(), DiplomacyRules::default()))
    }

    /// The active gameplay rule set.
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    /// The active diplomacy rule set.
    pub const fn diplomacy_rules(&self) -> &DiplomacyRules {
        &self.diplomacy_rules
    }

    /// Whether the backend holds no world data yet.
    pub fn is_empty(&self) -> Result<bool, EngineError> {
        Ok(self.store.list_villages()?.is_empty() && self.store.list_factions()?.is_empty())
    }

    /// Seed the starting state if the backend is empty. Returns whether
    /// seeding happened.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn seed_if_empty(&mut self, now: DateTime<Utc>) -> Result<bool, EngineError> {
        if !self.is_empty()? {
            return Ok(false);
        }
        seed_starting_state(&mut *self.store, now)?;
        Ok(true)
    }

    /// All villages.
    pub fn villages(&self) -> Result<Vec<Village>, EngineError> {
        Ok(self.store.list_villages()?)
    }

    /// All relations.
    pub fn relations(&self) -> Result<Vec<Relation>, EngineError> {
        Ok(self.store.list_relations()?)
    }

    /// Run one gameplay tick: production, then build completion.
    ///
    /// # Errors
    ///
    /// Propagates [`EngineError::Gameplay`].
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<SnapshotDelta, EngineError> {
        Ok(service::tick(&mut *self.store, &self.rules, now)?)
    }

    /// Queue a building upgrade. The building kind arrives in its wire
    /// spelling; an unrecognized name is a business rejection
    /// (`Ok(false)`), like every other queue rejection.
    ///
    /// # Errors
    ///
    /// Propagates [`EngineError::Gameplay`].
    pub fn queue_build(
        &mut self,
        village: VillageId,
        building: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, EngineError> {
        let Ok(kind) = building.parse() else {
            debug!(%village, building, "queue rejected: unknown building kind");
            return Ok(false);
        };
        Ok(build::queue_build(
            &mut *self.store,
            &self.rules,
            village,
            kind,
            now,
        )?)
    }

    /// Run one diplomacy tick: treaty expiry, opinion decay, stance
    /// recomputation.
    ///
    /// # Errors
    ///
    /// Propagates [`EngineError::Diplomacy`].
    pub fn diplomacy_tick(&mut self, now: DateTime<Utc>) -> Result<TickReport, EngineError> {
        Ok(evaluator::tick_update(
            &mut *self.store,
            &self.diplomacy_rules,
            now,
        )?)
    }

    /// Rank treaty suggestions for a faction pair.
    ///
    /// # Errors
    ///
    /// Propagates [`EngineError::Diplomacy`].
    pub fn suggest(
        &self,
        a: FactionId,
        b: FactionId,
        now: DateTime<Utc>,
        k: usize,
    ) -> Result<Vec<Suggestion>, EngineError> {
        Ok(proposer::top_suggestions(
            &*self.store,
            &self.diplomacy_rules,
            a,
            b,
            now,
            k,
        )?)
    }

    /// Propose a treaty. The type arrives in its wire spelling; an
    /// unknown name rejects with an `invalid_type` reason.
    ///
    /// # Errors
    ///
    /// Propagates [`EngineError::Diplomacy`].
    pub fn propose(
        &mut self,
        a: FactionId,
        b: FactionId,
        kind: &str,
        now: DateTime<Utc>,
        duration_h: Option<i64>,
    ) -> Result<ProposalOutcome, EngineError> {
        let Ok(kind) = kind.parse() else {
            debug!(kind, "proposal rejected: unknown treaty kind");
            return Ok(ProposalOutcome::Rejected {
                reason: ProposalRejection::InvalidKind(kind.to_owned()),
            });
        };
        Ok(treaty::propose(
            &mut *self.store,
            &self.diplomacy_rules,
            a,
            b,
            kind,
            now,
            duration_h,
        )?)
    }

    /// Record an aggression between two factions.
    ///
    /// # Errors
    ///
    /// Propagates [`EngineError::Diplomacy`].
    pub fn record_attack(
        &mut self,
        a: FactionId,
        b: FactionId,
        now: DateTime<Utc>,
    ) -> Result<Relation, EngineError> {
        Ok(incidents::record_attack(
            &mut *self.store,
            &self.diplomacy_rules,
            a,
            b,
            now,
        )?)
    }

    /// Record a completed trade between two factions.
    ///
    /// # Errors
    ///
    /// Propagates [`EngineError::Diplomacy`].
    pub fn record_trade(
        &mut self,
        a: FactionId,
        b: FactionId,
        now: DateTime<Utc>,
    ) -> Result<Relation, EngineError> {
        Ok(incidents::record_trade(
            &mut *self.store,
            &self.diplomacy_rules,
            a,
            b,
            now,
        )?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::unreachable)]
mod tests {
    use chrono::{Duration, TimeZone};
    use fief_types::Stance;

    use super::*;

    fn instant(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 23, hour, 0, 0).unwrap()
    }

    fn seeded_engine() -> GameEngine {
        let mut engine =
            GameEngine::from_config(&EngineConfig::default()).unwrap();
        assert!(engine.seed_if_empty(instant(12)).unwrap());
        engine
    }

    #[test]
    fn seed_runs_once() {
        let mut engine = seeded_engine();
        assert!(!engine.seed_if_empty(instant(13)).unwrap());
        assert_eq!(engine.villages().unwrap().len(), 2);
    }

    #[test]
    fn unknown_building_name_is_a_rejection_not_an_error() {
        let mut engine = seeded_engine();
        let accepted = engine
            .queue_build(VillageId::new(1), "barracks", instant(12))
            .unwrap();
        assert!(!accepted);
    }

    #[test]
    fn queue_then_tick_completes_the_upgrade() {
        let mut engine = seeded_engine();
        let accepted = engine
            .queue_build(VillageId::new(1), "lumber_mill", instant(12))
            .unwrap();
        assert!(accepted);

        let delta = engine.tick(instant(13)).unwrap();
        assert!(
            delta
                .builds_completed
                .iter()
                .any(|(village, _)| *village == VillageId::new(1))
        );
    }

    #[test]
    fn unknown_treaty_kind_rejects_with_invalid_type() {
        let mut engine = seeded_engine();
        let outcome = engine
            .propose(
                FactionId::new(1),
                FactionId::new(2),
                "VASSALAGE",
                instant(12),
                None,
            )
            .unwrap();
        let ProposalOutcome::Rejected { reason } = outcome else {
            unreachable!("unknown type must reject");
        };
        assert!(reason.to_string().contains("invalid_type"));
    }

    #[test]
    fn forced_stance_survives_the_next_evaluator_tick() {
        // An alliance forces ALLY outside a tick; the evaluator's
        // independent recomputation must land on the same locked value.
        let mut engine = seeded_engine();
        let outcome = engine
            .propose(
                FactionId::new(1),
                FactionId::new(2),
                "ALLIANCE",
                instant(12),
                None,
            )
            .unwrap();
        assert!(outcome.is_accepted());

        let report = engine.diplomacy_tick(instant(13)).unwrap();
        let change = report
            .updated_relations
            .iter()
            .find(|c| c.pair.contains(FactionId::new(1)) && c.pair.contains(FactionId::new(2)))
            .unwrap();
        assert_eq!(change.old_stance, Stance::Ally);
        assert_eq!(change.new_stance, Stance::Ally);
    }

    #[test]
    fn incidents_feed_suggestions() {
        let mut engine = seeded_engine();
        for _ in 0..3 {
            engine
                .record_attack(FactionId::new(1), FactionId::new(2), instant(12))
                .unwrap();
        }
        let suggestions = engine
            .suggest(FactionId::new(1), FactionId::new(2), instant(12), 3)
            .unwrap();
        assert_eq!(
            suggestions.first().map(|s| s.kind),
            Some(fief_types::TreatyKind::Ceasefire)
        );
    }

    #[test]
    fn file_backend_round_trips_through_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            storage: crate::config::StorageConfig {
                backend: BackendKind::File,
                path: dir.path().join("world.json"),
            },
            ..EngineConfig::default()
        };

        {
            let mut engine = GameEngine::from_config(&config).unwrap();
            engine.seed_if_empty(instant(12)).unwrap();
            engine.tick(instant(13)).unwrap();
        }

        let engine = GameEngine::from_config(&config).unwrap();
        assert!(!engine.is_empty().unwrap());
        let villages = engine.villages().unwrap();
        // An hour of level-1 production landed on the capital.
        let capital = villages
            .iter()
            .find(|v| v.id == VillageId::new(1))
            .unwrap();
        assert_eq!(capital.resources.wood, 860);
    }

    #[test]
    fn tick_cadences_are_independent() {
        let mut engine = seeded_engine();
        // Several diplomacy ticks without gameplay ticks, then one
        // gameplay tick far later; both behave from their own watermarks.
        engine.diplomacy_tick(instant(13)).unwrap();
        engine.diplomacy_tick(instant(14)).unwrap();
        let delta = engine.tick(instant(12) + Duration::hours(4)).unwrap();
        let capital_delta = delta.resources_changed.get(&VillageId::new(1)).unwrap();
        assert_eq!(capital_delta.wood, 240);
    }
}

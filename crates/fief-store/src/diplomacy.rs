//! The diplomacy-store facet: factions, pairwise relations, treaties, and
//! the append-only event log.

use chrono::{DateTime, Utc};
use serde_json::Value;

use fief_types::{
    DiplomacyEvent, EventId, EventKind, Faction, FactionId, FactionPair, Relation, Treaty,
    TreatyId, TreatyKind, TreatyStatus,
};

use crate::error::StoreError;

/// Read/write access to the diplomacy side of the world.
///
/// Relations and treaties are keyed by [`FactionPair`], which is
/// normalized at construction, so `(a, b)` and `(b, a)` always address the
/// same record.
pub trait DiplomacyStore {
    /// All factions, in identifier order.
    fn list_factions(&self) -> Result<Vec<Faction>, StoreError>;

    /// One faction by identifier, or `None` if it does not exist.
    fn faction(&self, id: FactionId) -> Result<Option<Faction>, StoreError>;

    /// Insert or replace a faction record. Factions are seed data; the
    /// core services never call this.
    fn put_faction(&mut self, faction: Faction) -> Result<(), StoreError>;

    /// The relation for a pair, or `None` if none has been created yet.
    fn relation(&self, pair: FactionPair) -> Result<Option<Relation>, StoreError>;

    /// Create or replace the relation for its pair (lazy creation).
    fn upsert_relation(&mut self, relation: Relation) -> Result<(), StoreError>;

    /// All relations.
    fn list_relations(&self) -> Result<Vec<Relation>, StoreError>;

    /// All treaties, regardless of status.
    fn list_treaties(&self) -> Result<Vec<Treaty>, StoreError>;

    /// One treaty by identifier, or `None` if it does not exist.
    fn treaty(&self, id: TreatyId) -> Result<Option<Treaty>, StoreError>;

    /// Open a new treaty as `ACTIVE` and return its identifier.
    fn open_treaty(
        &mut self,
        pair: FactionPair,
        kind: TreatyKind,
        started_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<TreatyId, StoreError>;

    /// Transition a treaty's status.
    ///
    /// Statuses are monotone: once a treaty is `EXPIRED` or `CANCELLED` it
    /// never changes again.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TreatyNotFound`] for an unknown identifier
    /// and [`StoreError::TreatyStatusTerminal`] when the current status is
    /// terminal.
    fn set_treaty_status(&mut self, id: TreatyId, status: TreatyStatus) -> Result<(), StoreError>;

    /// Append one event to the audit log and return its identifier.
    /// Events are never mutated or deleted.
    fn log_event(
        &mut self,
        kind: EventKind,
        payload: Value,
        ts: DateTime<Utc>,
    ) -> Result<EventId, StoreError>;

    /// List events in append order. `since` keeps events with `ts >=
    /// since`; `limit` keeps only the most recent `limit` entries after
    /// filtering.
    fn list_events(
        &self,
        since: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<DiplomacyEvent>, StoreError>;
}

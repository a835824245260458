//! Per-tick diplomacy evaluation.
//!
//! One [`tick_update`] pass, given an explicit "now":
//!
//! 1. Expire every active treaty whose expiry instant has passed, logging
//!    a `treaty_expire` event per expiry.
//! 2. Index the surviving stance locks per pair (alliance outranks
//!    ceasefire; trade treaties lock nothing).
//! 3. For each relation, decay opinion multiplicatively toward zero over
//!    the hours since its watermark, add the honor bonus for
//!    alliance-locked pairs, and recompute the stance. A relation is
//!    persisted and reported only when opinion moved beyond a small
//!    epsilon, the stance changed, or any time elapsed, which keeps
//!    zero-duration ticks fully idempotent.
//! 4. Log one aggregate `tick_update` event.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use fief_store::DiplomacyStore;
use fief_types::time::hours_between;
use fief_types::{EventKind, FactionPair, Relation, Stance, TreatyId, TreatyKind, TreatyStatus};

use crate::error::DiplomacyError;
use crate::rules::DiplomacyRules;

/// Opinion movement below this is treated as no change.
const OPINION_EPSILON: f64 = 1e-6;

/// One relation's before/after within a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationChange {
    /// The pair whose relation changed.
    pub pair: FactionPair,
    /// Opinion before the tick.
    pub old_opinion: f64,
    /// Stance before the tick.
    pub old_stance: Stance,
    /// Opinion after the tick.
    pub new_opinion: f64,
    /// Stance after the tick.
    pub new_stance: Stance,
}

/// A summary line for one event the tick logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    /// The event kind.
    pub kind: EventKind,
    /// The event timestamp.
    pub ts: DateTime<Utc>,
}

/// Everything one evaluator tick changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Relations whose opinion or stance moved (or whose watermark
    /// advanced).
    pub updated_relations: Vec<RelationChange>,
    /// Treaties that expired this tick.
    pub expired_treaties: Vec<TreatyId>,
    /// Summaries of the events this tick appended.
    pub events: Vec<EventSummary>,
}

impl TickReport {
    /// Whether the tick changed nothing.
    pub fn is_empty(&self) -> bool {
        self.updated_relations.is_empty() && self.expired_treaties.is_empty()
    }
}

/// Apply elapsed-time effects to the whole diplomacy state.
///
/// # Errors
///
/// Propagates store failures as [`DiplomacyError`].
pub fn tick_update(
    store: &mut (impl DiplomacyStore + ?Sized),
    rules: &DiplomacyRules,
    now: DateTime<Utc>,
) -> Result<TickReport, DiplomacyError> {
    let mut report = TickReport::default();

    // 1) Expire treaties that have reached their expiry instant.
    for treaty in store.list_treaties()? {
        let Some(expires_at) = treaty.expires_at else {
            continue;
        };
        if treaty.status == TreatyStatus::Active && expires_at <= now {
            store.set_treaty_status(treaty.id, TreatyStatus::Expired)?;
            store.log_event(
                EventKind::TreatyExpire,
                json!({
                    "id": treaty.id,
                    "a": treaty.pair.a().into_inner(),
                    "b": treaty.pair.b().into_inner(),
                    "type": treaty.kind,
                }),
                now,
            )?;
            report.expired_treaties.push(treaty.id);
            info!(treaty = %treaty.id, kind = %treaty.kind, "treaty expired");
        }
    }

    // 2) Index the stance locks that survive expiry.
    let locks = active_locks(store)?;

    // 3) Decay, honor, and stance recomputation per relation.
    for relation in store.list_relations()? {
        let old_opinion = relation.opinion;
        let old_stance = relation.stance;

        let elapsed_h = hours_between(relation.last_updated, now);
        let mut new_opinion = if elapsed_h > 0.0 {
            old_opinion * rules.cooldown_factor.powf(elapsed_h)
        } else {
            old_opinion
        };

        let lock = locks.get(&relation.pair).copied();
        if lock == Some(TreatyKind::Alliance) && elapsed_h > 0.0 {
            new_opinion += rules.honor_bonus_per_hour * elapsed_h;
        }

        let new_stance = match lock {
            Some(TreatyKind::Alliance) => Stance::Ally,
            Some(TreatyKind::Ceasefire) => {
                if new_opinion >= rules.ally_threshold {
                    Stance::Ally
                } else {
                    Stance::Neutral
                }
            }
            _ => rules.stance_for(new_opinion),
        };

        let opinion_moved = (new_opinion - old_opinion).abs() > OPINION_EPSILON;
        if opinion_moved || new_stance != old_stance || elapsed_h > 0.0 {
            store.upsert_relation(Relation {
                pair: relation.pair,
                stance: new_stance,
                opinion: new_opinion,
                last_updated: now,
            })?;
            report.updated_relations.push(RelationChange {
                pair: relation.pair,
                old_opinion,
                old_stance,
                new_opinion,
                new_stance,
            });
        }
    }

    // 4) One aggregate audit event per tick.
    store.log_event(
        EventKind::TickUpdate,
        json!({
            "updated_relations": report.updated_relations.len(),
            "expired_treaties": report.expired_treaties.len(),
        }),
        now,
    )?;
    report.events.push(EventSummary {
        kind: EventKind::TickUpdate,
        ts: now,
    });

    debug!(
        updated = report.updated_relations.len(),
        expired = report.expired_treaties.len(),
        "diplomacy tick"
    );
    Ok(report)
}

/// Collect the stance lock per pair from the active treaties.
///
/// Only ceasefires and alliances lock a stance; an alliance outranks a
/// ceasefire on the same pair. Trade treaties never lock.
fn active_locks(
    store: &(impl DiplomacyStore + ?Sized),
) -> Result<BTreeMap<FactionPair, TreatyKind>, DiplomacyError> {
    let mut locks: BTreeMap<FactionPair, TreatyKind> = BTreeMap::new();
    for treaty in store.list_treaties()? {
        if !treaty.is_active() {
            continue;
        }
        match treaty.kind {
            TreatyKind::Alliance => {
                locks.insert(treaty.pair, TreatyKind::Alliance);
            }
            TreatyKind::Ceasefire => {
                locks.entry(treaty.pair).or_insert(TreatyKind::Ceasefire);
            }
            TreatyKind::Trade => {}
        }
    }
    Ok(locks)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};
    use fief_store::MemoryStore;
    use fief_types::FactionId;

    use super::*;

    fn instant(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 23, hour, 0, 0).unwrap()
    }

    fn pair() -> FactionPair {
        FactionPair::new(FactionId::new(1), FactionId::new(2))
    }

    fn relation_at(opinion: f64, stance: Stance, at: DateTime<Utc>) -> Relation {
        Relation {
            pair: pair(),
            stance,
            opinion,
            last_updated: at,
        }
    }

    #[test]
    fn opinion_decays_by_cooldown_factor_per_hour() {
        let mut store = MemoryStore::new();
        store
            .upsert_relation(relation_at(50.0, Stance::Ally, instant(12)))
            .unwrap();

        let report = tick_update(&mut store, &DiplomacyRules::default(), instant(13)).unwrap();
        let change = report.updated_relations.first().unwrap();
        assert!((change.new_opinion - 49.0).abs() < 1e-6);
    }

    #[test]
    fn zero_duration_tick_is_idempotent() {
        let mut store = MemoryStore::new();
        store
            .upsert_relation(relation_at(50.0, Stance::Ally, instant(12)))
            .unwrap();

        let first = tick_update(&mut store, &DiplomacyRules::default(), instant(13)).unwrap();
        assert!(!first.is_empty());
        let second = tick_update(&mut store, &DiplomacyRules::default(), instant(13)).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn stance_thresholds_apply_without_locks() {
        let mut store = MemoryStore::new();
        let rules = DiplomacyRules::default();
        // Far above the ally threshold: one hour of decay keeps it ALLY.
        store
            .upsert_relation(relation_at(80.0, Stance::Neutral, instant(12)))
            .unwrap();
        let report = tick_update(&mut store, &rules, instant(13)).unwrap();
        assert_eq!(report.updated_relations.first().unwrap().new_stance, Stance::Ally);

        // Far below the hostile threshold.
        store
            .upsert_relation(relation_at(-80.0, Stance::Neutral, instant(13)))
            .unwrap();
        let report = tick_update(&mut store, &rules, instant(14)).unwrap();
        assert_eq!(
            report.updated_relations.first().unwrap().new_stance,
            Stance::Hostile
        );
    }

    #[test]
    fn treaty_expires_and_is_reported() {
        let mut store = MemoryStore::new();
        let id = store
            .open_treaty(
                pair(),
                TreatyKind::Ceasefire,
                instant(12),
                Some(instant(13)),
            )
            .unwrap();

        let report = tick_update(&mut store, &DiplomacyRules::default(), instant(14)).unwrap();
        assert_eq!(report.expired_treaties, vec![id]);
        let stored = store.treaty(id).unwrap().unwrap();
        assert_eq!(stored.status, TreatyStatus::Expired);

        let events = store.list_events(None, None).unwrap();
        assert!(events.iter().any(|e| e.kind == EventKind::TreatyExpire));
    }

    #[test]
    fn expiring_treaty_does_not_lock_this_tick() {
        let mut store = MemoryStore::new();
        // Hostile pair under a ceasefire that lapses before the tick.
        store
            .upsert_relation(relation_at(-45.0, Stance::Neutral, instant(12)))
            .unwrap();
        store
            .open_treaty(
                pair(),
                TreatyKind::Ceasefire,
                instant(12),
                Some(instant(13)),
            )
            .unwrap();

        let report = tick_update(&mut store, &DiplomacyRules::default(), instant(14)).unwrap();
        // Decay over 2h keeps the opinion below -40, so the stance falls
        // back to HOSTILE once the lock is gone.
        assert_eq!(
            report.updated_relations.first().unwrap().new_stance,
            Stance::Hostile
        );
    }

    #[test]
    fn ceasefire_lock_forces_neutral_floor() {
        let mut store = MemoryStore::new();
        store
            .upsert_relation(relation_at(-60.0, Stance::Hostile, instant(12)))
            .unwrap();
        store
            .open_treaty(
                pair(),
                TreatyKind::Ceasefire,
                instant(12),
                Some(instant(20)),
            )
            .unwrap();

        let report = tick_update(&mut store, &DiplomacyRules::default(), instant(13)).unwrap();
        assert_eq!(
            report.updated_relations.first().unwrap().new_stance,
            Stance::Neutral
        );
    }

    #[test]
    fn ceasefire_lock_still_allows_ally_on_high_opinion() {
        let mut store = MemoryStore::new();
        store
            .upsert_relation(relation_at(60.0, Stance::Neutral, instant(12)))
            .unwrap();
        store
            .open_treaty(
                pair(),
                TreatyKind::Ceasefire,
                instant(12),
                Some(instant(20)),
            )
            .unwrap();

        let report = tick_update(&mut store, &DiplomacyRules::default(), instant(13)).unwrap();
        assert_eq!(report.updated_relations.first().unwrap().new_stance, Stance::Ally);
    }

    #[test]
    fn alliance_lock_forces_ally_and_accrues_honor() {
        let mut store = MemoryStore::new();
        let rules = DiplomacyRules::default();
        store
            .upsert_relation(relation_at(10.0, Stance::Neutral, instant(12)))
            .unwrap();
        store
            .open_treaty(
                pair(),
                TreatyKind::Alliance,
                instant(12),
                Some(instant(12) + Duration::hours(72)),
            )
            .unwrap();

        let report = tick_update(&mut store, &rules, instant(14)).unwrap();
        let change = report.updated_relations.first().unwrap();
        assert_eq!(change.new_stance, Stance::Ally);
        // Two hours: decay 10 * 0.98^2, then +1.5/h honor.
        let expected = 10.0 * 0.98_f64.powi(2) + 3.0;
        assert!((change.new_opinion - expected).abs() < 1e-9);
    }

    #[test]
    fn alliance_outranks_ceasefire_on_same_pair() {
        let mut store = MemoryStore::new();
        store
            .upsert_relation(relation_at(0.0, Stance::Neutral, instant(12)))
            .unwrap();
        store
            .open_treaty(
                pair(),
                TreatyKind::Ceasefire,
                instant(12),
                Some(instant(20)),
            )
            .unwrap();
        store
            .open_treaty(
                pair(),
                TreatyKind::Alliance,
                instant(12),
                Some(instant(20)),
            )
            .unwrap();

        let report = tick_update(&mut store, &DiplomacyRules::default(), instant(13)).unwrap();
        assert_eq!(report.updated_relations.first().unwrap().new_stance, Stance::Ally);
    }

    #[test]
    fn aggregate_tick_event_is_logged() {
        let mut store = MemoryStore::new();
        let report = tick_update(&mut store, &DiplomacyRules::default(), instant(12)).unwrap();
        assert_eq!(report.events.len(), 1);
        let events = store.list_events(None, None).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events.first().unwrap().kind, EventKind::TickUpdate);
    }
}

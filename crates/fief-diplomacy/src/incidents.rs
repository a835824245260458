//! Attack and trade incident recording.
//!
//! Incidents are the external inputs to the opinion score: an aggression
//! subtracts the attack penalty, a completed trade adds the trade bonus.
//! Both lazily create a neutral relation for an unseen pair, recompute
//! the stance from the plain thresholds, and append the matching event so
//! the proposer's recent-event window sees it. Treaty locks are not
//! consulted here; the evaluator re-derives the locked stance on its next
//! tick.

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;

use fief_store::DiplomacyStore;
use fief_types::{EventKind, FactionId, FactionPair, Relation, Stance};

use crate::error::DiplomacyError;
use crate::rules::DiplomacyRules;

/// Record an aggression between `a` and `b` and return the updated
/// relation.
///
/// # Errors
///
/// Propagates store failures as [`DiplomacyError`].
pub fn record_attack(
    store: &mut (impl DiplomacyStore + ?Sized),
    rules: &DiplomacyRules,
    a: FactionId,
    b: FactionId,
    now: DateTime<Utc>,
) -> Result<Relation, DiplomacyError> {
    apply_incident(store, rules, a, b, now, EventKind::Attack, -rules.attack_penalty)
}

/// Record a completed trade between `a` and `b` and return the updated
/// relation.
///
/// # Errors
///
/// Propagates store failures as [`DiplomacyError`].
pub fn record_trade(
    store: &mut (impl DiplomacyStore + ?Sized),
    rules: &DiplomacyRules,
    a: FactionId,
    b: FactionId,
    now: DateTime<Utc>,
) -> Result<Relation, DiplomacyError> {
    apply_incident(store, rules, a, b, now, EventKind::Trade, rules.trade_bonus)
}

/// Shift the pair's opinion by `delta`, re-derive the stance, persist,
/// and log the event.
fn apply_incident(
    store: &mut (impl DiplomacyStore + ?Sized),
    rules: &DiplomacyRules,
    a: FactionId,
    b: FactionId,
    now: DateTime<Utc>,
    kind: EventKind,
    delta: f64,
) -> Result<Relation, DiplomacyError> {
    let pair = FactionPair::new(a, b);
    let current = store.relation(pair)?.unwrap_or(Relation {
        pair,
        stance: Stance::Neutral,
        opinion: 0.0,
        last_updated: now,
    });

    let opinion = current.opinion + delta;
    let updated = Relation {
        pair,
        stance: rules.stance_for(opinion),
        opinion,
        last_updated: now,
    };
    store.upsert_relation(updated.clone())?;
    store.log_event(
        kind,
        json!({"a": pair.a().into_inner(), "b": pair.b().into_inner()}),
        now,
    )?;

    info!(%pair, %kind, opinion, "incident recorded");
    Ok(updated)
}

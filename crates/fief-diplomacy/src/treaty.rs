//! Treaty proposal validation and opening.
//!
//! A proposal either opens an `ACTIVE` treaty with its immediate relation
//! effects applied, or comes back as a structured rejection. Proposing a
//! type that is already active for the pair rejects with
//! `already_active`, which makes retries idempotent. All preconditions
//! are checked before the treaty row is created, so a rejection never
//! leaves an orphan treaty behind.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use fief_store::DiplomacyStore;
use fief_types::time::format_instant;
use fief_types::{EventKind, FactionId, FactionPair, Relation, Stance, TreatyId, TreatyKind};

use crate::error::DiplomacyError;
use crate::rules::DiplomacyRules;

/// Opinion boost applied above the hostile threshold when a ceasefire
/// materializes peace.
const CEASEFIRE_OPINION_FLOOR_OFFSET: f64 = 2.0;

/// Why a proposal was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalRejection {
    /// An active treaty of the same type already exists for the pair.
    AlreadyActive,
    /// No relation record exists for the pair; the caller must satisfy
    /// this data-consistency precondition first.
    RelationNotFound,
    /// The request named no known treaty type.
    InvalidKind(String),
}

impl core::fmt::Display for ProposalRejection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AlreadyActive => f.write_str("already_active"),
            Self::RelationNotFound => f.write_str("relation_not_found"),
            Self::InvalidKind(raw) => write!(f, "invalid_type: {raw}"),
        }
    }
}

/// The outcome of a treaty proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalOutcome {
    /// The treaty was opened.
    Accepted {
        /// The new treaty's identifier.
        treaty_id: TreatyId,
        /// When it expires.
        expires_at: DateTime<Utc>,
    },
    /// The proposal was rejected.
    Rejected {
        /// The structured reason.
        reason: ProposalRejection,
    },
}

impl ProposalOutcome {
    /// Whether the proposal was accepted.
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Propose a treaty between `a` and `b`.
///
/// `duration_h` overrides the rule-set default duration for the type.
/// On acceptance the treaty opens as `ACTIVE` with
/// `expires_at = now + duration` and the immediate relation effects are
/// applied:
///
/// - ceasefire: a hostile stance is forced to neutral and opinion is
///   raised to just above the hostile threshold;
/// - trade: no immediate effect (benefits accrue via trade events);
/// - alliance: stance is forced to ally and opinion raised to at least
///   the ally threshold.
///
/// The stance forced here may disagree with a pure threshold derivation;
/// the evaluator's next tick re-derives the same value from the treaty
/// lock.
///
/// # Errors
///
/// Propagates store failures as [`DiplomacyError`]. Business rejections
/// are returned as [`ProposalOutcome::Rejected`].
pub fn propose(
    store: &mut (impl DiplomacyStore + ?Sized),
    rules: &DiplomacyRules,
    a: FactionId,
    b: FactionId,
    kind: TreatyKind,
    now: DateTime<Utc>,
    duration_h: Option<i64>,
) -> Result<ProposalOutcome, DiplomacyError> {
    let pair = FactionPair::new(a, b);

    // Idempotence against accidental retries: one active treaty per
    // (pair, type).
    let duplicate = store
        .list_treaties()?
        .into_iter()
        .any(|treaty| treaty.is_active() && treaty.pair == pair && treaty.kind == kind);
    if duplicate {
        store.log_event(
            EventKind::TreatyProposeDuplicate,
            json!({
                "a": pair.a().into_inner(),
                "b": pair.b().into_inner(),
                "type": kind,
            }),
            now,
        )?;
        debug!(%pair, %kind, "proposal rejected: already active");
        return Ok(ProposalOutcome::Rejected {
            reason: ProposalRejection::AlreadyActive,
        });
    }

    // Relation precondition before any write.
    let Some(relation) = store.relation(pair)? else {
        debug!(%pair, %kind, "proposal rejected: relation not found");
        return Ok(ProposalOutcome::Rejected {
            reason: ProposalRejection::RelationNotFound,
        });
    };

    let duration_h = duration_h.unwrap_or_else(|| rules.default_duration_h(kind));
    let offset = Duration::try_hours(duration_h)
        .ok_or(DiplomacyError::DurationOutOfRange { hours: duration_h })?;
    let expires_at = now
        .checked_add_signed(offset)
        .ok_or(DiplomacyError::DurationOutOfRange { hours: duration_h })?;

    let treaty_id = store.open_treaty(pair, kind, now, Some(expires_at))?;

    // Immediate relation effects.
    let mut stance = relation.stance;
    let mut opinion = relation.opinion;
    match kind {
        TreatyKind::Ceasefire => {
            if stance == Stance::Hostile {
                stance = Stance::Neutral;
                opinion = opinion.max(rules.hostile_threshold + CEASEFIRE_OPINION_FLOOR_OFFSET);
            }
        }
        TreatyKind::Trade => {}
        TreatyKind::Alliance => {
            stance = Stance::Ally;
            opinion = opinion.max(rules.ally_threshold);
        }
    }
    store.upsert_relation(Relation {
        pair,
        stance,
        opinion,
        last_updated: now,
    })?;

    store.log_event(
        EventKind::TreatyOpen,
        json!({
            "id": treaty_id,
            "a": pair.a().into_inner(),
            "b": pair.b().into_inner(),
            "type": kind,
            "expires_at": format_instant(expires_at),
        }),
        now,
    )?;

    info!(%pair, %kind, treaty = %treaty_id, expires_at = %expires_at, "treaty opened");
    Ok(ProposalOutcome::Accepted {
        treaty_id,
        expires_at,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::unreachable)]
mod tests {
    use chrono::TimeZone;
    use fief_store::MemoryStore;
    use fief_types::TreatyStatus;

    use super::*;

    fn instant(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 23, hour, 0, 0).unwrap()
    }

    fn store_with_relation(stance: Stance, opinion: f64) -> MemoryStore {
        let mut store = MemoryStore::new();
        store
            .upsert_relation(Relation {
                pair: FactionPair::new(FactionId::new(1), FactionId::new(2)),
                stance,
                opinion,
                last_updated: instant(12),
            })
            .unwrap();
        store
    }

    fn pair() -> FactionPair {
        FactionPair::new(FactionId::new(1), FactionId::new(2))
    }

    #[test]
    fn accepted_proposal_opens_active_treaty_with_default_duration() {
        let mut store = store_with_relation(Stance::Neutral, 5.0);
        let rules = DiplomacyRules::default();
        let outcome = propose(
            &mut store,
            &rules,
            FactionId::new(1),
            FactionId::new(2),
            TreatyKind::Trade,
            instant(12),
            None,
        )
        .unwrap();

        let ProposalOutcome::Accepted {
            treaty_id,
            expires_at,
        } = outcome
        else {
            unreachable!("proposal should be accepted");
        };
        assert_eq!(expires_at, instant(12) + Duration::hours(24));
        let treaty = store.treaty(treaty_id).unwrap().unwrap();
        assert_eq!(treaty.status, TreatyStatus::Active);
        assert_eq!(treaty.kind, TreatyKind::Trade);
    }

    #[test]
    fn duplicate_active_treaty_rejects_with_reason() {
        let mut store = store_with_relation(Stance::Neutral, 5.0);
        let rules = DiplomacyRules::default();
        let first = propose(
            &mut store,
            &rules,
            FactionId::new(1),
            FactionId::new(2),
            TreatyKind::Ceasefire,
            instant(12),
            None,
        )
        .unwrap();
        assert!(first.is_accepted());

        let second = propose(
            &mut store,
            &rules,
            FactionId::new(2),
            FactionId::new(1),
            TreatyKind::Ceasefire,
            instant(12),
            None,
        )
        .unwrap();
        let ProposalOutcome::Rejected { reason } = second else {
            unreachable!("duplicate should be rejected");
        };
        assert_eq!(reason, ProposalRejection::AlreadyActive);
        assert!(reason.to_string().contains("already_active"));

        // Exactly one treaty exists and the duplicate was logged.
        assert_eq!(store.list_treaties().unwrap().len(), 1);
        let events = store.list_events(None, None).unwrap();
        assert!(
            events
                .iter()
                .any(|e| e.kind == EventKind::TreatyProposeDuplicate)
        );
    }

    #[test]
    fn missing_relation_rejects_without_opening_a_treaty() {
        let mut store = MemoryStore::new();
        let outcome = propose(
            &mut store,
            &DiplomacyRules::default(),
            FactionId::new(1),
            FactionId::new(2),
            TreatyKind::Trade,
            instant(12),
            None,
        )
        .unwrap();
        assert_eq!(
            outcome,
            ProposalOutcome::Rejected {
                reason: ProposalRejection::RelationNotFound
            }
        );
        assert!(store.list_treaties().unwrap().is_empty());
    }

    #[test]
    fn ceasefire_forces_neutral_and_lifts_opinion() {
        let mut store = store_with_relation(Stance::Hostile, -60.0);
        let rules = DiplomacyRules::default();
        let outcome = propose(
            &mut store,
            &rules,
            FactionId::new(1),
            FactionId::new(2),
            TreatyKind::Ceasefire,
            instant(12),
            None,
        )
        .unwrap();
        assert!(outcome.is_accepted());

        let relation = store.relation(pair()).unwrap().unwrap();
        assert_eq!(relation.stance, Stance::Neutral);
        assert!((relation.opinion - (-38.0)).abs() < 1e-9);
    }

    #[test]
    fn ceasefire_leaves_non_hostile_relations_alone() {
        let mut store = store_with_relation(Stance::Neutral, 12.0);
        let rules = DiplomacyRules::default();
        propose(
            &mut store,
            &rules,
            FactionId::new(1),
            FactionId::new(2),
            TreatyKind::Ceasefire,
            instant(12),
            None,
        )
        .unwrap();

        let relation = store.relation(pair()).unwrap().unwrap();
        assert_eq!(relation.stance, Stance::Neutral);
        assert!((relation.opinion - 12.0).abs() < 1e-9);
    }

    #[test]
    fn alliance_forces_ally_and_raises_opinion_to_threshold() {
        let mut store = store_with_relation(Stance::Neutral, 25.0);
        let rules = DiplomacyRules::default();
        propose(
            &mut store,
            &rules,
            FactionId::new(1),
            FactionId::new(2),
            TreatyKind::Alliance,
            instant(12),
            None,
        )
        .unwrap();

        let relation = store.relation(pair()).unwrap().unwrap();
        assert_eq!(relation.stance, Stance::Ally);
        assert!((relation.opinion - 40.0).abs() < 1e-9);
    }

    #[test]
    fn alliance_does_not_lower_an_already_high_opinion() {
        let mut store = store_with_relation(Stance::Ally, 75.0);
        let rules = DiplomacyRules::default();
        propose(
            &mut store,
            &rules,
            FactionId::new(1),
            FactionId::new(2),
            TreatyKind::Alliance,
            instant(12),
            None,
        )
        .unwrap();

        let relation = store.relation(pair()).unwrap().unwrap();
        assert!((relation.opinion - 75.0).abs() < 1e-9);
    }

    #[test]
    fn trade_has_no_immediate_relation_effect() {
        let mut store = store_with_relation(Stance::Hostile, -50.0);
        let rules = DiplomacyRules::default();
        propose(
            &mut store,
            &rules,
            FactionId::new(1),
            FactionId::new(2),
            TreatyKind::Trade,
            instant(12),
            None,
        )
        .unwrap();

        let relation = store.relation(pair()).unwrap().unwrap();
        assert_eq!(relation.stance, Stance::Hostile);
        assert!((relation.opinion - (-50.0)).abs() < 1e-9);
    }

    #[test]
    fn explicit_duration_overrides_default() {
        let mut store = store_with_relation(Stance::Neutral, 0.0);
        let outcome = propose(
            &mut store,
            &DiplomacyRules::default(),
            FactionId::new(1),
            FactionId::new(2),
            TreatyKind::Ceasefire,
            instant(12),
            Some(1),
        )
        .unwrap();
        let ProposalOutcome::Accepted { expires_at, .. } = outcome else {
            unreachable!("proposal should be accepted");
        };
        assert_eq!(expires_at, instant(13));
    }

    #[test]
    fn expired_treaty_does_not_block_a_new_proposal() {
        let mut store = store_with_relation(Stance::Neutral, 0.0);
        let pair = FactionPair::new(FactionId::new(1), FactionId::new(2));
        let old = store
            .open_treaty(pair, TreatyKind::Trade, instant(10), Some(instant(11)))
            .unwrap();
        store
            .set_treaty_status(old, TreatyStatus::Expired)
            .unwrap();

        let outcome = propose(
            &mut store,
            &DiplomacyRules::default(),
            FactionId::new(1),
            FactionId::new(2),
            TreatyKind::Trade,
            instant(12),
            None,
        )
        .unwrap();
        assert!(outcome.is_accepted());
    }
}

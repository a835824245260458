//! Deterministic treaty suggestions for a faction pair.
//!
//! Scores are integers end to end so the ranking is identical on every
//! platform. Ties break by a fixed type precedence (ceasefire, then
//! trade, then alliance). The proposer only reads the store: same state,
//! same output.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use fief_store::DiplomacyStore;
use fief_types::{EventKind, FactionId, FactionPair, Stance, TreatyKind};

use crate::error::DiplomacyError;
use crate::rules::DiplomacyRules;

/// Sentinel score for a candidate that is structurally blocked.
const BLOCKED: i64 = -1_000_000_000;

/// Scores above this are considered viable for inclusion.
const VIABLE_FLOOR: i64 = -100_000_000;

/// Cap applied to recent-event and shared-enemy counts before weighting.
const COUNT_CAP: i64 = 5;

/// One ranked treaty suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// The suggested treaty type.
    pub kind: TreatyKind,
    /// Integer score; larger is better.
    pub score: i64,
    /// Human-readable scoring context.
    pub reason: String,
}

/// Rank candidate treaty types for the pair `(a, b)` and return the top
/// `k`.
///
/// Returns an empty list when no relation record exists for the pair: no
/// relation, no suggestions. A trade candidate whose treaty is already
/// active is still returned, carrying a large negative veto score, so
/// callers can see that it is suppressed; a blocked alliance is omitted
/// entirely.
///
/// # Errors
///
/// Propagates store failures as [`DiplomacyError`].
pub fn top_suggestions(
    store: &(impl DiplomacyStore + ?Sized),
    rules: &DiplomacyRules,
    a: FactionId,
    b: FactionId,
    now: DateTime<Utc>,
    k: usize,
) -> Result<Vec<Suggestion>, DiplomacyError> {
    let pair = FactionPair::new(a, b);
    let Some(relation) = store.relation(pair)? else {
        return Ok(Vec::new());
    };
    let opinion = relation.opinion;

    // Recent events involving exactly this pair, direction-agnostic.
    let since = now - Duration::hours(rules.recent_window_h);
    let mut attacks_recent: i64 = 0;
    let mut trades_recent: i64 = 0;
    for event in store.list_events(Some(since), None)? {
        if !event.involves_pair(pair) {
            continue;
        }
        match event.kind {
            EventKind::Attack => attacks_recent = attacks_recent.saturating_add(1),
            EventKind::Trade => trades_recent = trades_recent.saturating_add(1),
            _ => {}
        }
    }

    // Third factions hostile to both members.
    let mut shared_enemies: i64 = 0;
    for faction in store.list_factions()? {
        if pair.contains(faction.id) {
            continue;
        }
        let rel_a = store.relation(FactionPair::new(pair.a(), faction.id))?;
        let rel_b = store.relation(FactionPair::new(pair.b(), faction.id))?;
        let both_hostile = rel_a.is_some_and(|r| r.stance == Stance::Hostile)
            && rel_b.is_some_and(|r| r.stance == Stance::Hostile);
        if both_hostile {
            shared_enemies = shared_enemies.saturating_add(1);
        }
    }

    // Treaty types currently active for the pair.
    let mut has_trade = false;
    let mut has_alliance = false;
    for treaty in store.list_treaties()? {
        if treaty.is_active() && treaty.pair == pair {
            match treaty.kind {
                TreatyKind::Trade => has_trade = true,
                TreatyKind::Alliance => has_alliance = true,
                TreatyKind::Ceasefire => {}
            }
        }
    }

    // --- Scoring, integer arithmetic throughout ---

    let ceasefire = if has_alliance {
        Suggestion {
            kind: TreatyKind::Ceasefire,
            score: BLOCKED,
            reason: "alliance_active".to_owned(),
        }
    } else {
        let is_hostile = relation.stance == Stance::Hostile;
        let mut score: i64 = 0;
        if is_hostile {
            score = score.saturating_add(rules.ceasefire_hostile_bonus);
        }
        score = score.saturating_add(
            rules
                .ceasefire_attack_w
                .saturating_mul(attacks_recent.min(COUNT_CAP)),
        );
        // Points scale with how far opinion sits below the hostile
        // threshold.
        let below = round_non_negative(rules.hostile_threshold - opinion);
        score = score.saturating_add(rules.ceasefire_opinion_w.saturating_mul(below));
        Suggestion {
            kind: TreatyKind::Ceasefire,
            score,
            reason: format!("hostile={is_hostile} attacks={attacks_recent} op={opinion:.1}"),
        }
    };

    let trade = if has_trade {
        Suggestion {
            kind: TreatyKind::Trade,
            score: 0_i64.saturating_sub(rules.trade_block_if_active_penalty),
            reason: "trade_already_active".to_owned(),
        }
    } else {
        let mut score = rules
            .trade_recent_w
            .saturating_mul(trades_recent.min(COUNT_CAP));
        score = score.saturating_add(
            rules
                .trade_opinion_pos_w
                .saturating_mul(round_non_negative(opinion)),
        );
        Suggestion {
            kind: TreatyKind::Trade,
            score,
            reason: format!("trades={trades_recent} op={opinion:.1}"),
        }
    };

    let alliance = if opinion >= rules.alliance_min_opinion && !has_alliance {
        let mut score = rules
            .alliance_opinion_w
            .saturating_mul(round_non_negative(opinion - rules.alliance_min_opinion));
        score = score.saturating_add(
            rules
                .alliance_shared_enemy_w
                .saturating_mul(shared_enemies.min(COUNT_CAP)),
        );
        Suggestion {
            kind: TreatyKind::Alliance,
            score,
            reason: format!("op={opinion:.1} shared_enemies={shared_enemies}"),
        }
    } else {
        Suggestion {
            kind: TreatyKind::Alliance,
            score: BLOCKED,
            reason: String::new(),
        }
    };

    // Ceasefire and trade are always produced; alliance only when viable.
    let mut candidates = vec![ceasefire, trade];
    if alliance.score > VIABLE_FLOOR {
        candidates.push(alliance);
    }

    candidates.sort_by(|x, y| {
        y.score
            .cmp(&x.score)
            .then_with(|| x.kind.rank().cmp(&y.kind.rank()))
    });
    candidates.truncate(k);

    debug!(%pair, candidates = candidates.len(), "suggestions ranked");
    Ok(candidates)
}

/// Round to the nearest integer and clamp below at zero.
fn round_non_negative(value: f64) -> i64 {
    let rounded = value.round();
    if rounded <= 0.0 {
        return 0;
    }
    // Opinion-scale values are nowhere near i64 range.
    #[allow(clippy::cast_possible_truncation)]
    {
        rounded as i64
    }
}

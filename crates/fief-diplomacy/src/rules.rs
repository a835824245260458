//! The versioned diplomacy constant set.
//!
//! Everything the evaluator, proposer, and treaty service tune on lives
//! in one serializable struct, so an API layer can expose the active
//! rule set verbatim and tests can pin exact values. The `diplo_v1`
//! defaults are calibrated for short play sessions.

use serde::{Deserialize, Serialize};

use fief_types::{Stance, TreatyKind};

/// The versioned diplomacy rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiplomacyRules {
    /// Rule-set version tag.
    pub version: String,

    // Opinion dynamics.
    /// Multiplicative opinion decay per elapsed hour (toward zero).
    pub cooldown_factor: f64,
    /// Opinion penalty applied per recorded aggression.
    pub attack_penalty: f64,
    /// Opinion bonus applied per recorded trade transaction.
    pub trade_bonus: f64,
    /// Opinion accrual per hour spent under an active alliance.
    pub honor_bonus_per_hour: f64,

    // Stance thresholds.
    /// Opinion at or above this derives `ALLY`.
    pub ally_threshold: f64,
    /// Opinion at or below this derives `HOSTILE`.
    pub hostile_threshold: f64,

    // Proposer window and weights (integer scoring).
    /// Rolling window, in hours, for recent-event counting.
    pub recent_window_h: i64,
    /// Flat ceasefire bonus when the current stance is hostile.
    pub ceasefire_hostile_bonus: i64,
    /// Ceasefire points per recent attack (capped at 5 attacks).
    pub ceasefire_attack_w: i64,
    /// Ceasefire points per opinion point below the hostile threshold.
    pub ceasefire_opinion_w: i64,
    /// Trade points per recent trade (capped at 5 trades).
    pub trade_recent_w: i64,
    /// Trade points per positive opinion point.
    pub trade_opinion_pos_w: i64,
    /// Veto subtracted when a trade treaty is already active.
    pub trade_block_if_active_penalty: i64,
    /// Minimum opinion before an alliance is suggested at all.
    pub alliance_min_opinion: f64,
    /// Alliance points per opinion point above the minimum.
    pub alliance_opinion_w: i64,
    /// Alliance points per shared enemy (capped at 5).
    pub alliance_shared_enemy_w: i64,

    // Default treaty durations, in hours.
    /// Ceasefire duration when the proposal names none.
    pub ceasefire_duration_h: i64,
    /// Trade duration when the proposal names none.
    pub trade_duration_h: i64,
    /// Alliance duration when the proposal names none.
    pub alliance_duration_h: i64,
}

impl DiplomacyRules {
    /// The default duration, in hours, for a treaty of the given kind.
    pub const fn default_duration_h(&self, kind: TreatyKind) -> i64 {
        match kind {
            TreatyKind::Ceasefire => self.ceasefire_duration_h,
            TreatyKind::Trade => self.trade_duration_h,
            TreatyKind::Alliance => self.alliance_duration_h,
        }
    }

    /// Derive a stance from an opinion score using the plain thresholds,
    /// ignoring treaty locks.
    pub fn stance_for(&self, opinion: f64) -> Stance {
        if opinion >= self.ally_threshold {
            Stance::Ally
        } else if opinion <= self.hostile_threshold {
            Stance::Hostile
        } else {
            Stance::Neutral
        }
    }
}

impl Default for DiplomacyRules {
    /// The `diplo_v1` constant set.
    fn default() -> Self {
        Self {
            version: "diplo_v1".to_owned(),
            cooldown_factor: 0.98,
            attack_penalty: 20.0,
            trade_bonus: 8.0,
            honor_bonus_per_hour: 1.5,
            ally_threshold: 40.0,
            hostile_threshold: -40.0,
            recent_window_h: 24,
            ceasefire_hostile_bonus: 1200,
            ceasefire_attack_w: 35,
            ceasefire_opinion_w: 15,
            trade_recent_w: 25,
            trade_opinion_pos_w: 5,
            trade_block_if_active_penalty: 10_000,
            alliance_min_opinion: 20.0,
            alliance_opinion_w: 20,
            alliance_shared_enemy_w: 40,
            ceasefire_duration_h: 12,
            trade_duration_h: 24,
            alliance_duration_h: 72,
        }
    }
}

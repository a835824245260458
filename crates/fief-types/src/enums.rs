//! Closed enums of the game domain and their wire spellings.
//!
//! Building kinds and event kinds travel as `snake_case` strings; stances,
//! treaty kinds, and treaty statuses travel as upper-case strings. The
//! [`core::str::FromStr`] impls accept exactly the wire spelling, so an
//! unrecognized string surfaces as a typed error at the boundary instead of
//! a panic deeper in.

use serde::{Deserialize, Serialize};

/// A building kind recognized by the gameplay rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    /// Produces wood.
    LumberMill,
    /// Produces clay.
    ClayPit,
    /// Produces iron.
    IronMine,
    /// Produces crop.
    Farm,
}

impl BuildingKind {
    /// All building kinds, in canonical order.
    pub const ALL: [Self; 4] = [Self::LumberMill, Self::ClayPit, Self::IronMine, Self::Farm];

    /// The resource this building produces.
    pub const fn produces(self) -> Resource {
        match self {
            Self::LumberMill => Resource::Wood,
            Self::ClayPit => Resource::Clay,
            Self::IronMine => Resource::Iron,
            Self::Farm => Resource::Crop,
        }
    }

    /// The wire spelling of this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LumberMill => "lumber_mill",
            Self::ClayPit => "clay_pit",
            Self::IronMine => "iron_mine",
            Self::Farm => "farm",
        }
    }
}

impl core::fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known building kind.
#[derive(Debug, thiserror::Error)]
#[error("unknown building kind: {0}")]
pub struct UnknownBuildingKind(pub String);

impl core::str::FromStr for BuildingKind {
    type Err = UnknownBuildingKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lumber_mill" => Ok(Self::LumberMill),
            "clay_pit" => Ok(Self::ClayPit),
            "iron_mine" => Ok(Self::IronMine),
            "farm" => Ok(Self::Farm),
            other => Err(UnknownBuildingKind(other.to_owned())),
        }
    }
}

/// A stockpiled resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Wood, also the currency every upgrade is paid in.
    Wood,
    /// Clay.
    Clay,
    /// Iron.
    Iron,
    /// Crop.
    Crop,
}

/// The derived categorical relationship between two factions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stance {
    /// Opinion at or above the ally threshold, or locked by an alliance.
    Ally,
    /// The default stance.
    Neutral,
    /// Opinion at or below the hostile threshold.
    Hostile,
}

impl core::fmt::Display for Stance {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::Ally => "ALLY",
            Self::Neutral => "NEUTRAL",
            Self::Hostile => "HOSTILE",
        };
        f.write_str(s)
    }
}

/// A treaty type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TreatyKind {
    /// Time-bounded truce; forces at least a neutral stance.
    Ceasefire,
    /// Trade agreement; benefits accrue through trade events.
    Trade,
    /// Full alliance; locks the stance to ally while active.
    Alliance,
}

impl TreatyKind {
    /// All treaty kinds, in tie-break precedence order.
    pub const ALL: [Self; 3] = [Self::Ceasefire, Self::Trade, Self::Alliance];

    /// Fixed precedence used to break score ties deterministically
    /// (ceasefire before trade before alliance).
    pub const fn rank(self) -> u8 {
        match self {
            Self::Ceasefire => 0,
            Self::Trade => 1,
            Self::Alliance => 2,
        }
    }

    /// The wire spelling of this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ceasefire => "CEASEFIRE",
            Self::Trade => "TRADE",
            Self::Alliance => "ALLIANCE",
        }
    }
}

impl core::fmt::Display for TreatyKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known treaty kind.
#[derive(Debug, thiserror::Error)]
#[error("unknown treaty kind: {0}")]
pub struct UnknownTreatyKind(pub String);

impl core::str::FromStr for TreatyKind {
    type Err = UnknownTreatyKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CEASEFIRE" => Ok(Self::Ceasefire),
            "TRADE" => Ok(Self::Trade),
            "ALLIANCE" => Ok(Self::Alliance),
            other => Err(UnknownTreatyKind(other.to_owned())),
        }
    }
}

/// Lifecycle status of a treaty.
///
/// The only transition the core performs is `Active -> Expired`. `Cancelled`
/// exists for administrative tooling outside the core; both `Expired` and
/// `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TreatyStatus {
    /// The treaty is in force.
    Active,
    /// The treaty ran past its expiry instant.
    Expired,
    /// The treaty was revoked administratively.
    Cancelled,
}

impl TreatyStatus {
    /// Whether this status admits no further transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Expired | Self::Cancelled)
    }
}

impl core::fmt::Display for TreatyStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::Active => "ACTIVE",
            Self::Expired => "EXPIRED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// Kind of an entry in the append-only diplomacy event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// One faction attacked the other.
    Attack,
    /// A trade transaction completed between the pair.
    Trade,
    /// A treaty was opened.
    TreatyOpen,
    /// A treaty passed its expiry and was marked expired.
    TreatyExpire,
    /// A proposal duplicated an already-active treaty and was rejected.
    TreatyProposeDuplicate,
    /// Aggregate summary of one evaluator tick.
    TickUpdate,
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::Attack => "attack",
            Self::Trade => "trade",
            Self::TreatyOpen => "treaty_open",
            Self::TreatyExpire => "treaty_expire",
            Self::TreatyProposeDuplicate => "treaty_propose_duplicate",
            Self::TickUpdate => "tick_update",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use core::str::FromStr;

    use super::*;

    #[test]
    fn building_kind_wire_roundtrip() {
        for kind in BuildingKind::ALL {
            let parsed = BuildingKind::from_str(kind.as_str()).unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn building_kind_rejects_unknown() {
        assert!(BuildingKind::from_str("barracks").is_err());
    }

    #[test]
    fn building_resource_mapping() {
        assert_eq!(BuildingKind::LumberMill.produces(), Resource::Wood);
        assert_eq!(BuildingKind::ClayPit.produces(), Resource::Clay);
        assert_eq!(BuildingKind::IronMine.produces(), Resource::Iron);
        assert_eq!(BuildingKind::Farm.produces(), Resource::Crop);
    }

    #[test]
    fn treaty_kind_rank_is_fixed_precedence() {
        assert!(TreatyKind::Ceasefire.rank() < TreatyKind::Trade.rank());
        assert!(TreatyKind::Trade.rank() < TreatyKind::Alliance.rank());
    }

    #[test]
    fn treaty_kind_parses_wire_spelling_only() {
        assert_eq!(TreatyKind::from_str("ALLIANCE").unwrap(), TreatyKind::Alliance);
        assert!(TreatyKind::from_str("alliance").is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(!TreatyStatus::Active.is_terminal());
        assert!(TreatyStatus::Expired.is_terminal());
        assert!(TreatyStatus::Cancelled.is_terminal());
    }

    #[test]
    fn stance_serializes_upper_case() {
        let json = serde_json::to_string(&Stance::Hostile).unwrap();
        assert_eq!(json, "\"HOSTILE\"");
    }

    #[test]
    fn event_kind_serializes_snake_case() {
        let json = serde_json::to_string(&EventKind::TreatyExpire).unwrap();
        assert_eq!(json, "\"treaty_expire\"");
    }
}

//! Record types held by the world and diplomacy stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::{BuildingKind, EventKind, Resource, Stance, TreatyKind, TreatyStatus};
use crate::ids::{EventId, FactionId, FactionPair, TreatyId, VillageId};

/// A village's stockpile, one non-negative amount per resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBundle {
    /// Stockpiled wood.
    pub wood: u64,
    /// Stockpiled clay.
    pub clay: u64,
    /// Stockpiled iron.
    pub iron: u64,
    /// Stockpiled crop.
    pub crop: u64,
}

impl ResourceBundle {
    /// A bundle holding the same amount of every resource.
    pub const fn uniform(amount: u64) -> Self {
        Self {
            wood: amount,
            clay: amount,
            iron: amount,
            crop: amount,
        }
    }

    /// The stockpiled amount of one resource.
    pub const fn amount(&self, resource: Resource) -> u64 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Clay => self.clay,
            Resource::Iron => self.iron,
            Resource::Crop => self.crop,
        }
    }

    /// Mutable access to the slot for one resource.
    const fn slot(&mut self, resource: Resource) -> &mut u64 {
        match resource {
            Resource::Wood => &mut self.wood,
            Resource::Clay => &mut self.clay,
            Resource::Iron => &mut self.iron,
            Resource::Crop => &mut self.crop,
        }
    }

    /// Add to one resource with overflow checking. Returns the new amount,
    /// or `None` if the addition would overflow.
    pub fn checked_credit(&mut self, resource: Resource, amount: u64) -> Option<u64> {
        let slot = self.slot(resource);
        *slot = slot.checked_add(amount)?;
        Some(*slot)
    }

    /// Subtract from one resource with underflow checking. Returns the new
    /// amount, or `None` if the stockpile is insufficient.
    pub fn checked_debit(&mut self, resource: Resource, amount: u64) -> Option<u64> {
        let slot = self.slot(resource);
        *slot = slot.checked_sub(amount)?;
        Some(*slot)
    }
}

/// A village: the unit of gameplay simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Village {
    /// Village identifier.
    pub id: VillageId,
    /// Display name.
    pub name: String,
    /// Current stockpile.
    pub resources: ResourceBundle,
}

impl Village {
    /// Create a village with the given stockpile.
    pub fn new(id: VillageId, name: impl Into<String>, resources: ResourceBundle) -> Self {
        Self {
            id,
            name: name.into(),
            resources,
        }
    }
}

/// The single pending upgrade a village may hold.
///
/// Created when an upgrade is queued, destroyed when it completes. The
/// single-slot invariant is enforced by the world store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBuild {
    /// The building being upgraded.
    pub building: BuildingKind,
    /// The level the building will reach on completion.
    pub target_level: u8,
    /// The instant at which the upgrade becomes eligible for completion.
    pub eta: DateTime<Utc>,
}

/// A faction. Factions are seed data, immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faction {
    /// Faction identifier.
    pub id: FactionId,
    /// Display name.
    pub name: String,
    /// Whether this faction is controlled by the player.
    pub is_player: bool,
}

/// The pairwise diplomatic relation between two factions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// The normalized faction pair.
    pub pair: FactionPair,
    /// Derived categorical stance.
    pub stance: Stance,
    /// Continuous opinion score; decays toward zero over time.
    pub opinion: f64,
    /// Watermark: the instant this relation was last processed.
    pub last_updated: DateTime<Utc>,
}

/// A time-bounded agreement between two factions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treaty {
    /// Treaty identifier.
    pub id: TreatyId,
    /// The normalized faction pair.
    pub pair: FactionPair,
    /// Treaty type.
    pub kind: TreatyKind,
    /// Lifecycle status.
    pub status: TreatyStatus,
    /// The instant the treaty was opened.
    pub started_at: DateTime<Utc>,
    /// Optional expiry instant; `None` means open-ended.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Treaty {
    /// Whether the treaty is currently in force.
    pub fn is_active(&self) -> bool {
        self.status == TreatyStatus::Active
    }
}

/// An entry in the append-only diplomacy audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiplomacyEvent {
    /// Event identifier, time-ordered.
    pub id: EventId,
    /// What happened.
    pub kind: EventKind,
    /// Free-form payload. Events about a faction pair carry `a` and `b`
    /// fields holding the raw faction identifiers.
    pub payload: Value,
    /// When it happened.
    pub ts: DateTime<Utc>,
}

impl DiplomacyEvent {
    /// Whether this event's payload names exactly the given pair, in
    /// either order.
    pub fn involves_pair(&self, pair: FactionPair) -> bool {
        let Some(a) = self.payload.get("a").and_then(Value::as_u64) else {
            return false;
        };
        let Some(b) = self.payload.get("b").and_then(Value::as_u64) else {
            return false;
        };
        FactionPair::new(FactionId::new(a), FactionId::new(b)) == pair
    }
}

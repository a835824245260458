//! Type-safe identifier wrappers.
//!
//! Every entity has a strongly-typed ID to prevent accidental mixing of
//! identifiers at compile time. Seed entities (villages, factions) use
//! small integer identifiers assigned by world data; records minted at
//! runtime (treaties, diplomacy events) use UUID v7, which is time-ordered
//! and therefore sorts in creation order.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around `u64` for seed-data identifiers.
macro_rules! define_seed_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw identifier value.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Return the inner `u64` value.
            pub const fn into_inner(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Generates a newtype wrapper around [`Uuid`] for runtime-minted records.
macro_rules! define_record_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_seed_id! {
    /// Unique identifier for a village in the world store.
    VillageId
}

define_seed_id! {
    /// Unique identifier for a faction. Factions are seed data; the core
    /// never creates them.
    FactionId
}

define_record_id! {
    /// Unique identifier for a treaty, minted when the treaty is opened.
    TreatyId
}

define_record_id! {
    /// Unique identifier for an entry in the diplomacy event log.
    EventId
}

/// An unordered faction pair, normalized so the smaller identifier comes
/// first.
///
/// Relations and treaties are keyed by pair; normalization at construction
/// (and on deserialization) guarantees that `(a, b)` and `(b, a)` address
/// the same record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "RawPair")]
pub struct FactionPair {
    /// The smaller faction identifier.
    a: FactionId,
    /// The larger faction identifier.
    b: FactionId,
}

/// Unvalidated pair shape accepted from serialized data.
#[derive(Deserialize)]
struct RawPair {
    a: FactionId,
    b: FactionId,
}

impl From<RawPair> for FactionPair {
    fn from(raw: RawPair) -> Self {
        Self::new(raw.a, raw.b)
    }
}

impl FactionPair {
    /// Build a normalized pair from two faction identifiers, in any order.
    pub fn new(x: FactionId, y: FactionId) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    /// The smaller faction identifier.
    pub const fn a(self) -> FactionId {
        self.a
    }

    /// The larger faction identifier.
    pub const fn b(self) -> FactionId {
        self.b
    }

    /// Whether the given faction is one of the two members.
    pub fn contains(self, id: FactionId) -> bool {
        self.a == id || self.b == id
    }
}

impl core::fmt::Display for FactionPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}~{}", self.a, self.b)
    }
}

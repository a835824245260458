//! The change report one gameplay tick returns to its caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use fief_types::{BuildingKind, Resource, VillageId};

/// Per-village resource gains from one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDelta {
    /// Wood gained.
    pub wood: u64,
    /// Clay gained.
    pub clay: u64,
    /// Iron gained.
    pub iron: u64,
    /// Crop gained.
    pub crop: u64,
}

impl ResourceDelta {
    /// Whether every component is zero.
    pub const fn is_empty(&self) -> bool {
        self.wood == 0 && self.clay == 0 && self.iron == 0 && self.crop == 0
    }

    /// The gain for one resource.
    pub const fn amount(&self, resource: Resource) -> u64 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Clay => self.clay,
            Resource::Iron => self.iron,
            Resource::Crop => self.crop,
        }
    }

    /// Add to one component. Returns `None` on overflow.
    pub fn checked_add(&mut self, resource: Resource, amount: u64) -> Option<u64> {
        let slot = match resource {
            Resource::Wood => &mut self.wood,
            Resource::Clay => &mut self.clay,
            Resource::Iron => &mut self.iron,
            Resource::Crop => &mut self.crop,
        };
        *slot = slot.checked_add(amount)?;
        Some(*slot)
    }

    /// Component-wise sum. Returns `None` on overflow.
    pub fn checked_merge(&self, other: &Self) -> Option<Self> {
        Some(Self {
            wood: self.wood.checked_add(other.wood)?,
            clay: self.clay.checked_add(other.clay)?,
            iron: self.iron.checked_add(other.iron)?,
            crop: self.crop.checked_add(other.crop)?,
        })
    }
}

/// Everything one gameplay tick changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDelta {
    /// Non-empty resource gains, keyed by village.
    pub resources_changed: BTreeMap<VillageId, ResourceDelta>,
    /// Upgrades that completed this tick.
    pub builds_completed: Vec<(VillageId, BuildingKind)>,
}

impl SnapshotDelta {
    /// Whether the tick changed nothing.
    pub fn is_empty(&self) -> bool {
        self.resources_changed.is_empty() && self.builds_completed.is_empty()
    }

    /// Merge another delta into this one: resource gains sum
    /// component-wise per village, completion lists concatenate.
    /// Returns `None` on overflow.
    pub fn checked_merge(mut self, other: Self) -> Option<Self> {
        for (village, delta) in other.resources_changed {
            match self.resources_changed.get_mut(&village) {
                Some(existing) => *existing = existing.checked_merge(&delta)?,
                None => {
                    self.resources_changed.insert(village, delta);
                }
            }
        }
        self.builds_completed.extend(other.builds_completed);
        Some(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_delta_reports_empty() {
        assert!(SnapshotDelta::default().is_empty());
        assert!(ResourceDelta::default().is_empty());
    }

    #[test]
    fn merge_sums_per_village_and_concatenates_completions() {
        let village = VillageId::new(1);
        let mut first = SnapshotDelta::default();
        first.resources_changed.insert(
            village,
            ResourceDelta {
                wood: 10,
                ..ResourceDelta::default()
            },
        );
        first
            .builds_completed
            .push((village, BuildingKind::LumberMill));

        let mut second = SnapshotDelta::default();
        second.resources_changed.insert(
            village,
            ResourceDelta {
                wood: 5,
                crop: 3,
                ..ResourceDelta::default()
            },
        );
        second.builds_completed.push((village, BuildingKind::Farm));

        let merged = first.checked_merge(second).unwrap();
        let delta = merged.resources_changed.get(&village).unwrap();
        assert_eq!(delta.wood, 15);
        assert_eq!(delta.crop, 3);
        assert_eq!(merged.builds_completed.len(), 2);
    }

    #[test]
    fn merge_detects_overflow() {
        let village = VillageId::new(1);
        let mut first = SnapshotDelta::default();
        first.resources_changed.insert(
            village,
            ResourceDelta {
                wood: u64::MAX,
                ..ResourceDelta::default()
            },
        );
        let mut second = SnapshotDelta::default();
        second.resources_changed.insert(
            village,
            ResourceDelta {
                wood: 1,
                ..ResourceDelta::default()
            },
        );
        assert!(first.checked_merge(second).is_none());
    }
}

//! One full gameplay tick.
//!
//! Runs production, then build completion, in that fixed order, and merges
//! the two deltas. Ordering matters for the caller's view of a single
//! tick: production funds are realized before completions are observed
//! (upgrade cost itself is deducted at enqueue time, not here).

use chrono::{DateTime, Utc};
use tracing::debug;

use fief_store::WorldStore;

use crate::delta::SnapshotDelta;
use crate::error::GameplayError;
use crate::rules::Rules;
use crate::{build, production};

/// Execute one gameplay tick and return the merged delta.
///
/// Performs no side effects beyond what the two systems apply to the
/// store.
///
/// # Errors
///
/// Propagates [`GameplayError`] from either system or from delta merging.
pub fn tick(
    store: &mut (impl WorldStore + ?Sized),
    rules: &Rules,
    now: DateTime<Utc>,
) -> Result<SnapshotDelta, GameplayError> {
    let produced = production::apply(store, rules, now)?;
    let completed = build::apply(store, now)?;

    let merged = produced
        .checked_merge(completed)
        .ok_or(GameplayError::DeltaMergeOverflow)?;
    debug!(
        villages_changed = merged.resources_changed.len(),
        builds_completed = merged.builds_completed.len(),
        "gameplay tick"
    );
    Ok(merged)
}

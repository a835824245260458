//! Error types for the gameplay engine.
//!
//! Everything here is fatal. Business rejections (insufficient wood, an
//! occupied queue, an unknown village) are `Ok(false)` outcomes of
//! [`crate::build::queue_build`], not errors.

use fief_store::StoreError;
use fief_types::VillageId;

use crate::rules::RulesError;

/// Errors that can occur while running the gameplay systems.
#[derive(Debug, thiserror::Error)]
pub enum GameplayError {
    /// The store failed or an invariant guard fired.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },

    /// A rule lookup was out of range; an upstream validation broke.
    #[error("rules error: {source}")]
    Rules {
        /// The underlying rules error.
        #[from]
        source: RulesError,
    },

    /// A resource amount overflowed during accrual or merging.
    #[error("arithmetic overflow in resource accounting for village {village}")]
    ArithmeticOverflow {
        /// The village whose accounting overflowed.
        village: VillageId,
    },

    /// Component-wise delta merging overflowed.
    #[error("arithmetic overflow while merging tick deltas")]
    DeltaMergeOverflow,
}

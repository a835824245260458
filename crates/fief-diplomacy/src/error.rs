//! Error types for the diplomacy engine.
//!
//! Only fatal conditions live here. Proposal rejections are values
//! ([`crate::treaty::ProposalOutcome::Rejected`]), and an absent relation
//! in the proposer is an empty suggestion list, not an error.

use fief_store::StoreError;

/// Errors that can occur while running the diplomacy services.
#[derive(Debug, thiserror::Error)]
pub enum DiplomacyError {
    /// The store failed or an invariant guard fired.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },

    /// A treaty duration does not fit a timestamp offset.
    #[error("treaty duration out of range: {hours} hours")]
    DurationOutOfRange {
        /// The offending duration.
        hours: i64,
    },
}

//! The diplomacy engine: opinion dynamics, stance derivation, treaty
//! lifecycle, and deterministic AI proposal scoring.
//!
//! Like the gameplay engine, everything here is a deterministic,
//! idempotent time-stepper. The evaluator applies elapsed-time effects
//! given an explicit "now"; the proposer and treaty service are invoked
//! on demand, independent of the tick cadence.
//!
//! # Modules
//!
//! - [`rules`] -- the versioned constant set (decay factor, thresholds,
//!   scoring weights, default durations).
//! - [`evaluator`] -- per-tick treaty expiry, opinion decay, honor
//!   accrual, and stance recomputation.
//! - [`proposer`] -- integer-scored ranking of candidate treaty types for
//!   a faction pair.
//! - [`treaty`] -- proposal validation and treaty opening with immediate
//!   relation effects.
//! - [`incidents`] -- attack/trade recording feeding the opinion score
//!   and the event log.
//! - [`error`] -- [`DiplomacyError`].

pub mod error;
pub mod evaluator;
pub mod incidents;
pub mod proposer;
pub mod rules;
pub mod treaty;

pub use error::DiplomacyError;
pub use evaluator::{EventSummary, RelationChange, TickReport};
pub use proposer::Suggestion;
pub use rules::DiplomacyRules;
pub use treaty::{ProposalOutcome, ProposalRejection};

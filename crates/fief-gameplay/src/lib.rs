//! The gameplay engine: resource production and the single-slot build
//! queue.
//!
//! Both systems are deterministic, idempotent time-steppers. Given an
//! explicit "now" and the per-village watermark persisted in the world
//! store, they compute and apply a state delta; re-invoking with the same
//! or an earlier instant is a safe no-op. Nothing here reads a clock or
//! schedules itself.
//!
//! # Modules
//!
//! - [`rules`] -- pure production/cost/duration formulas per building kind
//!   and level.
//! - [`delta`] -- the per-tick change report returned to the caller.
//! - [`production`] -- resource accrual since the watermark.
//! - [`build`] -- upgrade queueing and completion.
//! - [`service`] -- one full gameplay tick: production then build, deltas
//!   merged.
//! - [`error`] -- [`GameplayError`].

pub mod build;
pub mod delta;
pub mod error;
pub mod production;
pub mod rules;
pub mod service;

pub use delta::{ResourceDelta, SnapshotDelta};
pub use error::GameplayError;
pub use rules::{Rules, RulesError};

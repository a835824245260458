//! The clock abstraction.
//!
//! Core operations take "now" as an explicit parameter; only the driver
//! holds a clock. [`SystemClock`] reads wall time, [`FixedClock`] is an
//! injectable instant for tests and replays.

use chrono::{DateTime, TimeDelta, Utc};

/// Supplies the current instant.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to an explicit instant, advanced manually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    current: DateTime<Utc>,
}

impl FixedClock {
    /// Create a clock pinned at `instant`.
    pub const fn new(instant: DateTime<Utc>) -> Self {
        Self { current: instant }
    }

    /// Move the clock forward (or backward) by `delta`.
    pub fn advance(&mut self, delta: TimeDelta) {
        self.current += delta;
    }

    /// Pin the clock to a new instant.
    pub const fn set(&mut self, instant: DateTime<Utc>) {
        self.current = instant;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.current
    }
}

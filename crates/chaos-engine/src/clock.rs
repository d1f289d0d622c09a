//! Clock handle for time-dependent operations.
//!
//! Every scoring path takes `now` from a [`Clock`] so request handling
//! stays deterministic under test.

use chrono::{DateTime, Utc};

/// Source of the current instant.
#[derive(Debug, Clone)]
pub enum Clock {
    /// Wall clock.
    System,
    /// Frozen instant, for tests.
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Creates a clock frozen at the given instant.
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Clock::Fixed(at)
    }

    /// Returns the current instant.
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::System
    }
}

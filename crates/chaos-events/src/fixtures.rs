//! Sample data fixtures for testing.
//!
//! Ready-made event constructors for other crates' tests. Enable the
//! `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // chaos-events = { path = "../chaos-events", features = ["test-fixtures"] }
//!
//! use chaos_events::fixtures;
//!
//! let burst = fixtures::chat_burst(fixtures::base_time(), 5);
//! ```

use crate::{Event, EventKind};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// A fixed reference instant: 2025-06-01 14:00:00 UTC (afternoon bucket).
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 14, 0, 0).unwrap()
}

/// Returns `count` chat messages spaced one second apart starting at `start`.
pub fn chat_burst(start: DateTime<Utc>, count: usize) -> Vec<Event> {
    (0..count)
        .map(|i| {
            Event::new(
                start + Duration::seconds(i as i64),
                EventKind::ChatMessage,
                1,
                format!("message {}", i),
            )
        })
        .collect()
}

/// Returns a door open/close pair at `at` and one second later.
pub fn door_cycle(at: DateTime<Utc>) -> Vec<Event> {
    vec![
        Event::new(at, EventKind::DoorOpen, 1, "front door"),
        Event::new(at + Duration::seconds(1), EventKind::DoorClose, 1, "front door"),
    ]
}

/// Returns a pizza mention event with the given count.
pub fn pizza(at: DateTime<Utc>, count: i64) -> Event {
    Event::new(at, EventKind::Pizza, count, "pizza detected")
}

//! External Metrics Source
//!
//! A read-only provider of authoritative activity counts computed
//! out-of-process (a chat indexer). The engine prefers these over its
//! own in-memory windows when they are fresh, and falls back otherwise.
//! Values arrive via a background refresher and are served from a
//! TTL-stamped slot so scoring never waits on the network.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Message counts reported by the external indexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalCounts {
    /// Messages in the last 5 minutes.
    pub five_min: u64,
    /// Messages in the last 10 minutes (door activity proxy).
    pub ten_min: u64,
    /// Messages in the last hour.
    pub hour: u64,
}

/// Read-only provider of authoritative counts.
///
/// Both methods return `None` when the source has no fresh data, which
/// tells the engine to fall back to its in-memory tracker.
pub trait MetricsSource: Send + Sync {
    /// Recent message counts, if fresh.
    fn counts(&self, now: DateTime<Utc>) -> Option<ExternalCounts>;

    /// Authoritative pizza mention count, if fresh.
    fn pizza_count(&self, now: DateTime<Utc>) -> Option<u64>;
}

/// A source with no external backing. Always falls back.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSource;

impl MetricsSource for NullSource {
    fn counts(&self, _now: DateTime<Utc>) -> Option<ExternalCounts> {
        None
    }

    fn pizza_count(&self, _now: DateTime<Utc>) -> Option<u64> {
        None
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot<T> {
    value: Option<T>,
    stamped: Option<DateTime<Utc>>,
}

impl<T: Copy> Slot<T> {
    fn empty() -> Self {
        Self {
            value: None,
            stamped: None,
        }
    }

    fn publish(&mut self, value: T, now: DateTime<Utc>) {
        self.value = Some(value);
        self.stamped = Some(now);
    }

    fn fresh(&self, now: DateTime<Utc>, ttl: Duration) -> Option<T> {
        match (self.value, self.stamped) {
            (Some(value), Some(stamped)) if now - stamped < ttl => Some(value),
            _ => None,
        }
    }
}

/// TTL-cached slot written by the refresher task and read by the engine.
///
/// Counts go stale quickly (they drive the live score); the pizza count
/// tolerates a longer TTL since the underlying query is heavier.
#[derive(Debug)]
pub struct SharedSource {
    counts_ttl: Duration,
    pizza_ttl: Duration,
    counts: Mutex<Slot<ExternalCounts>>,
    pizza: Mutex<Slot<u64>>,
}

impl SharedSource {
    pub fn new(counts_ttl: Duration, pizza_ttl: Duration) -> Self {
        Self {
            counts_ttl,
            pizza_ttl,
            counts: Mutex::new(Slot::empty()),
            pizza: Mutex::new(Slot::empty()),
        }
    }

    /// Stores a fresh counts reading.
    pub fn publish_counts(&self, counts: ExternalCounts, now: DateTime<Utc>) {
        self.counts.lock().unwrap().publish(counts, now);
    }

    /// Stores a fresh pizza count.
    pub fn publish_pizza(&self, count: u64, now: DateTime<Utc>) {
        self.pizza.lock().unwrap().publish(count, now);
    }
}

impl MetricsSource for SharedSource {
    fn counts(&self, now: DateTime<Utc>) -> Option<ExternalCounts> {
        self.counts.lock().unwrap().fresh(now, self.counts_ttl)
    }

    fn pizza_count(&self, now: DateTime<Utc>) -> Option<u64> {
        self.pizza.lock().unwrap().fresh(now, self.pizza_ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 14, 0, second).unwrap()
    }

    fn counts(five_min: u64) -> ExternalCounts {
        ExternalCounts {
            five_min,
            ten_min: five_min * 2,
            hour: five_min * 10,
        }
    }

    #[test]
    fn test_null_source_always_empty() {
        let source = NullSource;
        assert_eq!(source.counts(at(0)), None);
        assert_eq!(source.pizza_count(at(0)), None);
    }

    #[test]
    fn test_empty_shared_source_is_stale() {
        let source = SharedSource::new(Duration::seconds(5), Duration::seconds(30));
        assert_eq!(source.counts(at(0)), None);
        assert_eq!(source.pizza_count(at(0)), None);
    }

    #[test]
    fn test_published_counts_fresh_within_ttl() {
        let source = SharedSource::new(Duration::seconds(5), Duration::seconds(30));
        source.publish_counts(counts(12), at(0));

        assert_eq!(source.counts(at(4)), Some(counts(12)));
        // TTL boundary: 5 seconds old is no longer fresh.
        assert_eq!(source.counts(at(5)), None);
    }

    #[test]
    fn test_pizza_ttl_is_independent() {
        let source = SharedSource::new(Duration::seconds(5), Duration::seconds(30));
        source.publish_counts(counts(1), at(0));
        source.publish_pizza(400, at(0));

        // Counts expired, pizza still fresh.
        assert_eq!(source.counts(at(10)), None);
        assert_eq!(source.pizza_count(at(10)), Some(400));
        assert_eq!(source.pizza_count(at(30)), None);
    }

    #[test]
    fn test_republish_refreshes() {
        let source = SharedSource::new(Duration::seconds(5), Duration::seconds(30));
        source.publish_counts(counts(1), at(0));
        source.publish_counts(counts(2), at(8));

        assert_eq!(source.counts(at(10)), Some(counts(2)));
    }
}

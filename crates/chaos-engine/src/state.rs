//! Live metrics state.
//!
//! The mutable in-process counters behind the chaos score: rolling
//! activity windows plus the pizza accumulator. Constructed once by the
//! facade and shared by reference; there is no hidden global state.

use chaos_events::{Event, EventKind};
use chrono::{DateTime, Utc};

use crate::config::WindowConfig;
use crate::window::{RollingWindowTracker, WindowCategory};

/// Cap on how many door timestamps a single event may record.
pub const MAX_DOOR_EVENTS_PER_REQUEST: i64 = 100_000;

/// Non-negative pizza mention accumulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PizzaCounter(u64);

impl PizzaCounter {
    /// Adds an event value. Negative values clamp at zero.
    pub fn add(&mut self, value: i64) {
        self.0 = self.0.saturating_add_signed(value);
    }

    /// Resets the counter to zero.
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    pub fn count(&self) -> u64 {
        self.0
    }
}

/// Process-lifetime mutable state fed by the ingestion path.
#[derive(Debug, Clone)]
pub struct MetricsState {
    pub windows: RollingWindowTracker,
    pizza: PizzaCounter,
    /// Instant of the most recent recognized event.
    pub last_updated: Option<DateTime<Utc>>,
}

impl MetricsState {
    pub fn new(config: &WindowConfig) -> Self {
        Self {
            windows: RollingWindowTracker::new(config.chat_capacity, config.door_capacity),
            pizza: PizzaCounter::default(),
            last_updated: None,
        }
    }

    /// Applies one ingested event to the live counters.
    ///
    /// Unrecognized kinds are ignored here; the event log still keeps them.
    pub fn apply(&mut self, event: &Event) {
        match &event.kind {
            EventKind::ChatMessage => {
                self.windows.record(WindowCategory::Chat, event.timestamp);
            }
            EventKind::DoorOpen | EventKind::DoorClose => {
                // Mass door events honor the value, bounded per request.
                let repeats = event.value.clamp(0, MAX_DOOR_EVENTS_PER_REQUEST);
                for _ in 0..repeats {
                    self.windows.record(WindowCategory::Door, event.timestamp);
                }
            }
            EventKind::Pizza => self.pizza.add(event.value),
            EventKind::ResetPizza => self.pizza.reset(),
            EventKind::Other(_) => return,
        }
        self.last_updated = Some(event.timestamp);
    }

    pub fn pizza_count(&self) -> u64 {
        self.pizza.count()
    }
}

impl Default for MetricsState {
    fn default() -> Self {
        Self::new(&WindowConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaos_events::fixtures;
    use chrono::Duration;

    #[test]
    fn test_pizza_counter_accumulates() {
        let mut counter = PizzaCounter::default();
        counter.add(3);
        counter.add(2);
        assert_eq!(counter.count(), 5);
        counter.reset();
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn test_pizza_counter_clamps_at_zero() {
        let mut counter = PizzaCounter::default();
        counter.add(2);
        counter.add(-10);
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn test_apply_chat_message() {
        let mut state = MetricsState::default();
        let now = fixtures::base_time();
        for event in fixtures::chat_burst(now, 5) {
            state.apply(&event);
        }

        let query_at = now + Duration::minutes(1);
        assert_eq!(
            state.windows.count_since(WindowCategory::Chat, query_at, Duration::minutes(5)),
            5
        );
        assert_eq!(state.last_updated, Some(now + Duration::seconds(4)));
    }

    #[test]
    fn test_apply_door_events() {
        let mut state = MetricsState::default();
        let now = fixtures::base_time();
        for event in fixtures::door_cycle(now) {
            state.apply(&event);
        }

        let query_at = now + Duration::minutes(1);
        assert_eq!(
            state.windows.count_since(WindowCategory::Door, query_at, Duration::minutes(10)),
            2
        );
    }

    #[test]
    fn test_apply_door_honors_value() {
        let mut state = MetricsState::default();
        let now = fixtures::base_time();
        let event = chaos_events::Event::new(now, EventKind::DoorOpen, 7, "mass entry");
        state.apply(&event);

        // Capacity is 50, so 7 repeats all fit.
        assert_eq!(state.windows.len(WindowCategory::Door), 7);
    }

    #[test]
    fn test_apply_door_negative_value_records_nothing() {
        let mut state = MetricsState::default();
        let now = fixtures::base_time();
        let event = chaos_events::Event::new(now, EventKind::DoorClose, -5, "");
        state.apply(&event);
        assert_eq!(state.windows.len(WindowCategory::Door), 0);
    }

    #[test]
    fn test_apply_pizza_and_reset() {
        let mut state = MetricsState::default();
        let now = fixtures::base_time();
        state.apply(&fixtures::pizza(now, 15));
        assert_eq!(state.pizza_count(), 15);

        let reset = chaos_events::Event::new(now, EventKind::ResetPizza, 1, "");
        state.apply(&reset);
        assert_eq!(state.pizza_count(), 0);
    }

    #[test]
    fn test_apply_unrecognized_kind_is_inert() {
        let mut state = MetricsState::default();
        let now = fixtures::base_time();
        let event = chaos_events::Event::new(now, EventKind::Other("karaoke".into()), 9, "");
        state.apply(&event);

        assert_eq!(state.windows.len(WindowCategory::Chat), 0);
        assert_eq!(state.windows.len(WindowCategory::Door), 0);
        assert_eq!(state.pizza_count(), 0);
        assert_eq!(state.last_updated, None);
    }
}

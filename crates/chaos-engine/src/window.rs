//! Rolling Window Tracker
//!
//! Bounded, time-filtered counts of recent event timestamps per category.
//! Capacity eviction happens on write; horizon filtering happens on read.
//! Counts over long horizons undercount once arrivals outpace capacity,
//! which is an accepted bound on memory, not a bug.

use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

/// Default capacity of the chat activity window.
pub const DEFAULT_CHAT_CAPACITY: usize = 100;

/// Default capacity of the door activity window.
pub const DEFAULT_DOOR_CAPACITY: usize = 50;

/// Event categories tracked by the rolling windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowCategory {
    Chat,
    Door,
}

/// A bounded, time-ordered sequence of timestamps.
#[derive(Debug, Clone)]
struct BoundedWindow {
    capacity: usize,
    entries: VecDeque<DateTime<Utc>>,
}

impl BoundedWindow {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    fn record(&mut self, ts: DateTime<Utc>) {
        // A zero-capacity window retains nothing.
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ts);
    }

    fn count_since(&self, now: DateTime<Utc>, horizon: Duration) -> usize {
        let cutoff = now - horizon;
        self.entries.iter().filter(|ts| **ts > cutoff).count()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Sliding-window counters over recent event timestamps.
#[derive(Debug, Clone)]
pub struct RollingWindowTracker {
    chat: BoundedWindow,
    door: BoundedWindow,
}

impl RollingWindowTracker {
    /// Creates a tracker with explicit per-category capacities.
    pub fn new(chat_capacity: usize, door_capacity: usize) -> Self {
        Self {
            chat: BoundedWindow::new(chat_capacity),
            door: BoundedWindow::new(door_capacity),
        }
    }

    /// Appends a timestamp to a category, evicting the oldest entry at capacity.
    pub fn record(&mut self, category: WindowCategory, ts: DateTime<Utc>) {
        self.window_mut(category).record(ts);
    }

    /// Returns the count of retained timestamps newer than `now - horizon`.
    pub fn count_since(&self, category: WindowCategory, now: DateTime<Utc>, horizon: Duration) -> usize {
        self.window(category).count_since(now, horizon)
    }

    /// Returns the number of retained timestamps regardless of age.
    pub fn len(&self, category: WindowCategory) -> usize {
        self.window(category).len()
    }

    fn window(&self, category: WindowCategory) -> &BoundedWindow {
        match category {
            WindowCategory::Chat => &self.chat,
            WindowCategory::Door => &self.door,
        }
    }

    fn window_mut(&mut self, category: WindowCategory) -> &mut BoundedWindow {
        match category {
            WindowCategory::Chat => &mut self.chat,
            WindowCategory::Door => &mut self.door,
        }
    }
}

impl Default for RollingWindowTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CHAT_CAPACITY, DEFAULT_DOOR_CAPACITY)
    }
}

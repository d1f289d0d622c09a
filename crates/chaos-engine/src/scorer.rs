//! Chaos Score Engine
//!
//! Blends rolling-window activity, a time-of-day bias, and pizza
//! scaling into one deterministic score, then maps it to a status tier.
//! The score is unbounded: it is a loud vanity metric, not a
//! normalized percentage. Nothing here surfaces errors; every
//! unreachable dependency degrades to a fallback value.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::lock::{lock_status, LockStatus, LockStore};
use crate::source::MetricsSource;
use crate::state::MetricsState;
use crate::window::WindowCategory;

/// Score forced while the override lock is active.
pub const SENTINEL_SCORE: f64 = 42069.0;

/// Pizza count above which both pizzapocalypse effects engage.
pub const PIZZAPOCALYPSE_THRESHOLD: u64 = 10_000;

/// Weights applied to recent activity counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Per recent chat message
    pub message_weight: f64,
    /// Per recent door event
    pub door_weight: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            message_weight: 2.0,
            door_weight: 5.0,
        }
    }
}

/// Status tiers in ascending score order.
///
/// Bands are inclusive at their upper bound: a score of exactly 20.0 is
/// still calm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTier {
    Calm,
    Active,
    Chaotic,
    Demonic,
    Apocalypse,
    TrueApocalypse,
    CosmicHorror,
    MultiverseCollapse,
    HeatDeath,
    Fenthouse,
}

impl StatusTier {
    /// Maps a final score to its tier.
    pub fn for_score(score: f64) -> Self {
        if score <= 20.0 {
            StatusTier::Calm
        } else if score <= 40.0 {
            StatusTier::Active
        } else if score <= 60.0 {
            StatusTier::Chaotic
        } else if score <= 80.0 {
            StatusTier::Demonic
        } else if score <= 100.0 {
            StatusTier::Apocalypse
        } else if score <= 200.0 {
            StatusTier::TrueApocalypse
        } else if score <= 500.0 {
            StatusTier::CosmicHorror
        } else if score <= 1000.0 {
            StatusTier::MultiverseCollapse
        } else if score < SENTINEL_SCORE {
            StatusTier::HeatDeath
        } else {
            StatusTier::Fenthouse
        }
    }

    /// Human status line for this tier.
    pub fn label(&self) -> &'static str {
        match self {
            StatusTier::Calm => "😴 CALM - The house sleeps",
            StatusTier::Active => "⚡ ACTIVE - Normal operations",
            StatusTier::Chaotic => "🍕 CHAOTIC - Pizza's here",
            StatusTier::Demonic => "👿 DEMONIC - Something is brewing",
            StatusTier::Apocalypse => "☠️ APOCALYPSE - All hands on deck",
            StatusTier::TrueApocalypse => "🔥 TRUE APOCALYPSE - The house is no more",
            StatusTier::CosmicHorror => "🌌 COSMIC HORROR - Physics has left the building",
            StatusTier::MultiverseCollapse => "💀 MULTIVERSE COLLAPSE - All timelines converge to pizza",
            StatusTier::HeatDeath => "☠️🍕 HEAT DEATH OF UNIVERSE - Entropy is pizza now 🍕☠️",
            StatusTier::Fenthouse => "🌿 FENTHOUSE - Folding in the infinite 🌿",
        }
    }
}

/// Activity counts resolved for one scoring pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivityCounts {
    pub chat_5min: u64,
    pub chat_1hour: u64,
    pub door_10min: u64,
    /// True if the external source supplied these numbers.
    pub from_external: bool,
}

/// One complete scoring result.
#[derive(Debug, Clone, Serialize)]
pub struct ChaosReading {
    /// Final score, rounded to one decimal.
    pub chaos_score: f64,
    pub tier: StatusTier,
    pub status: String,
    pub counts: ActivityCounts,
    pub pizza_count: u64,
    pub lock: LockStatus,
}

/// Computes the chaos score from the live state, the external source,
/// and the override lock.
pub struct ChaosEngine {
    weights: ScoreWeights,
    state: Arc<Mutex<MetricsState>>,
    source: Arc<dyn MetricsSource>,
    lock: Arc<dyn LockStore>,
}

impl ChaosEngine {
    pub fn new(
        weights: ScoreWeights,
        state: Arc<Mutex<MetricsState>>,
        source: Arc<dyn MetricsSource>,
        lock: Arc<dyn LockStore>,
    ) -> Self {
        Self {
            weights,
            state,
            source,
            lock,
        }
    }

    /// Resolves recent activity, preferring fresh external counts.
    ///
    /// The external source has no door sensor feed, so its ten-minute
    /// message count halved stands in for door activity.
    pub fn resolve_counts(&self, now: DateTime<Utc>) -> ActivityCounts {
        if let Some(external) = self.source.counts(now) {
            return ActivityCounts {
                chat_5min: external.five_min,
                chat_1hour: external.hour,
                door_10min: external.ten_min / 2,
                from_external: true,
            };
        }

        let state = self.state.lock().unwrap();
        ActivityCounts {
            chat_5min: state
                .windows
                .count_since(WindowCategory::Chat, now, Duration::minutes(5)) as u64,
            chat_1hour: state.windows.len(WindowCategory::Chat) as u64,
            door_10min: state
                .windows
                .count_since(WindowCategory::Door, now, Duration::minutes(10)) as u64,
            from_external: false,
        }
    }

    /// Resolves the pizza count, preferring the external source.
    pub fn resolve_pizza(&self, now: DateTime<Utc>) -> u64 {
        match self.source.pizza_count(now) {
            Some(count) => count,
            None => self.state.lock().unwrap().pizza_count(),
        }
    }

    /// Computes the score without the presentation-time pizza doubling.
    ///
    /// This is what the ingestion response reports.
    pub fn raw_score(&self, now: DateTime<Utc>) -> f64 {
        if lock_status(self.lock.as_ref(), now).active {
            return SENTINEL_SCORE;
        }

        let counts = self.resolve_counts(now);
        let mut score = counts.chat_5min as f64 * self.weights.message_weight
            + counts.door_10min as f64 * self.weights.door_weight;

        score += time_of_day_bonus(now.hour());
        score += pizza_bonus(self.resolve_pizza(now));
        score
    }

    /// Produces the full reading: score, tier, status line, and the
    /// counts behind them.
    ///
    /// Above the pizzapocalypse threshold the final score doubles on top
    /// of the additive log bonus already inside [`raw_score`]. The two
    /// effects are independent.
    pub fn evaluate(&self, now: DateTime<Utc>) -> ChaosReading {
        let lock = lock_status(self.lock.as_ref(), now);
        let counts = self.resolve_counts(now);
        let pizza_count = self.resolve_pizza(now);

        if lock.active {
            let status = lock
                .status_message
                .clone()
                .unwrap_or_else(|| StatusTier::Fenthouse.label().to_string());
            return ChaosReading {
                chaos_score: SENTINEL_SCORE,
                tier: StatusTier::Fenthouse,
                status,
                counts,
                pizza_count,
                lock,
            };
        }

        let mut score = self.raw_score(now);
        if pizza_count > PIZZAPOCALYPSE_THRESHOLD {
            score *= 2.0;
        }

        let tier = StatusTier::for_score(score);
        ChaosReading {
            chaos_score: round1(score),
            tier,
            status: tier.label().to_string(),
            counts,
            pizza_count,
            lock,
        }
    }
}

/// Step bonus by hour of day. Night owls score highest.
pub fn time_of_day_bonus(hour: u32) -> f64 {
    match hour {
        0..=5 => 20.0,
        18..=23 => 15.0,
        12..=17 => 10.0,
        _ => 5.0,
    }
}

/// Additive pizza bonus: capped base, plus unbounded log scaling past
/// the pizzapocalypse threshold.
pub fn pizza_bonus(count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let mut bonus = (count as f64 * 2.0).min(10.0);
    if count > PIZZAPOCALYPSE_THRESHOLD {
        bonus += (count as f64).log10() * 50.0;
    }
    bonus
}

/// Rounds to one decimal place for presentation.
pub fn round1(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}

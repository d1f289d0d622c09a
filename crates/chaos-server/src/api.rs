//! API request and response payloads.

use chaos_engine::{ActivityCounts, ChaosReading, Countdown, HourlyStat};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/event`.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRequest {
    /// Wire name of the event kind (e.g. "chat_message").
    #[serde(rename = "type")]
    pub kind: String,
    /// Numeric payload; defaults to 1.
    #[serde(default)]
    pub value: Option<i64>,
    /// Free-text detail.
    #[serde(default)]
    pub details: Option<String>,
}

/// Response to `POST /api/event`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chaos_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EventResponse {
    pub fn ok(chaos_score: f64) -> Self {
        Self {
            success: true,
            chaos_score: Some(chaos_score),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            chaos_score: None,
            error: Some(message.into()),
        }
    }
}

/// Response to `GET /api/metrics`.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsResponse {
    pub chaos_score: f64,
    pub chat_velocity_5min: u64,
    pub chat_velocity_1hour: u64,
    pub door_events_10min: u64,
    pub pizza_count: u64,
    pub status: String,
    pub last_updated: String,
    pub fenthouse_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fenthouse_countdown: Option<Countdown>,
}

impl MetricsResponse {
    pub fn from_reading(reading: ChaosReading, last_updated: String) -> Self {
        let ChaosReading {
            chaos_score,
            status,
            counts:
                ActivityCounts {
                    chat_5min,
                    chat_1hour,
                    door_10min,
                    ..
                },
            pizza_count,
            lock,
            ..
        } = reading;

        Self {
            chaos_score,
            chat_velocity_5min: chat_5min,
            chat_velocity_1hour: chat_1hour,
            door_events_10min: door_10min,
            pizza_count,
            status,
            last_updated,
            fenthouse_active: lock.active,
            fenthouse_countdown: lock.countdown,
        }
    }
}

/// Query string of `GET /api/history`.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    /// Lookback window in hours; defaults to 24.
    pub hours: Option<i64>,
}

/// One row of `GET /api/history` and `GET /api/leaderboard`.
pub type HistoryRow = HourlyStat;

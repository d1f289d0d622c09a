//! Chaos score engine: rolling windows, overrides, and scoring.
//!
//! This crate holds everything between raw ingested events and the
//! single number the dashboard shows:
//!
//! ```text
//! ┌─────────┐   POST /api/event    ┌──────────────┐   GET /api/metrics
//! │ bridges │ ───────────────────▶ │ chaos-engine │ ───────────────────▶
//! └─────────┘                      └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`window`]: bounded rolling windows with read-time horizon filtering
//! - [`state`]: the live metrics state fed by ingestion
//! - [`lock`]: the operator override lock ("Fenthouse mode")
//! - [`source`]: external authoritative counts with TTL caching
//! - [`scorer`]: score computation and status tier mapping
//! - [`store`]: append-only JSONL event log
//! - [`rollup`]: hourly aggregates and their persistence
//! - [`config`]: TOML configuration
//! - [`clock`]: injectable time source

pub mod clock;
pub mod config;
pub mod lock;
pub mod rollup;
pub mod scorer;
pub mod source;
pub mod state;
pub mod store;
pub mod window;

// Re-export clock types
pub use clock::Clock;

// Re-export config types
pub use config::{
    default_config_toml, CacheConfig, ConfigError, EngineConfig, StorageConfig, WindowConfig,
};

// Re-export lock types
pub use lock::{
    lock_status, Countdown, FileLockStore, LockRecord, LockStatus, LockStore, NoLockStore,
    DEFAULT_LOCK_MESSAGE,
};

// Re-export rollup types
pub use rollup::{truncate_to_hour, HourlyStat, RollupError, RollupStore};

// Re-export scorer types
pub use scorer::{
    pizza_bonus, round1, time_of_day_bonus, ActivityCounts, ChaosEngine, ChaosReading,
    ScoreWeights, StatusTier, PIZZAPOCALYPSE_THRESHOLD, SENTINEL_SCORE,
};

// Re-export source types
pub use source::{ExternalCounts, MetricsSource, NullSource, SharedSource};

// Re-export state types
pub use state::{MetricsState, PizzaCounter, MAX_DOOR_EVENTS_PER_REQUEST};

// Re-export store types
pub use store::{EventLog, StoreError};

// Re-export window types
pub use window::{
    RollingWindowTracker, WindowCategory, DEFAULT_CHAT_CAPACITY, DEFAULT_DOOR_CAPACITY,
};

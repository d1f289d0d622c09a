//! Configuration loading for the engine.
//!
//! All tunables live in a TOML file; partial files fill missing sections
//! from defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::scorer::ScoreWeights;
use crate::window::{DEFAULT_CHAT_CAPACITY, DEFAULT_DOOR_CAPACITY};

/// Complete engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rolling window capacities
    pub windows: WindowConfig,
    /// Scoring weights
    pub weights: ScoreWeights,
    /// External source cache TTLs
    pub cache: CacheConfig,
    /// Persisted state locations
    pub storage: StorageConfig,
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Rolling window capacities per category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub chat_capacity: usize,
    pub door_capacity: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            chat_capacity: DEFAULT_CHAT_CAPACITY,
            door_capacity: DEFAULT_DOOR_CAPACITY,
        }
    }
}

/// TTLs for the external metrics source cache, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub counts_ttl_secs: u64,
    pub pizza_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            counts_ttl_secs: 5,
            pizza_ttl_secs: 30,
        }
    }
}

/// File locations for persisted state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Append-only event log (JSONL)
    pub event_log: PathBuf,
    /// Hourly rollup file (JSON)
    pub rollups: PathBuf,
    /// Override lock control file
    pub lock_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            event_log: PathBuf::from("data/events.jsonl"),
            rollups: PathBuf::from("data/hourly_stats.json"),
            lock_file: PathBuf::from("/tmp/chaosmeter_lock"),
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Chaosmeter Configuration

[windows]
chat_capacity = 100
door_capacity = 50

[weights]
message_weight = 2.0
door_weight = 5.0

[cache]
counts_ttl_secs = 5
pizza_ttl_secs = 30

[storage]
event_log = "data/events.jsonl"
rollups = "data/hourly_stats.json"
lock_file = "/tmp/chaosmeter_lock"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.windows.chat_capacity, 100);
        assert_eq!(config.windows.door_capacity, 50);
        assert_eq!(config.weights.message_weight, 2.0);
        assert_eq!(config.weights.door_weight, 5.0);
        assert_eq!(config.cache.counts_ttl_secs, 5);
        assert_eq!(config.cache.pizza_ttl_secs, 30);
    }

    #[test]
    fn test_parse_config_from_toml() {
        let toml = r#"
            [windows]
            chat_capacity = 200

            [weights]
            door_weight = 10.0
        "#;

        let config = EngineConfig::from_str(toml).unwrap();

        assert_eq!(config.windows.chat_capacity, 200);
        assert_eq!(config.weights.door_weight, 10.0);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
            [cache]
            counts_ttl_secs = 2
        "#;

        let config = EngineConfig::from_str(toml).unwrap();

        // Specified value
        assert_eq!(config.cache.counts_ttl_secs, 2);
        // Default values
        assert_eq!(config.cache.pizza_ttl_secs, 30);
        assert_eq!(config.windows.chat_capacity, 100);
        assert_eq!(config.storage.event_log, PathBuf::from("data/events.jsonl"));
    }

    #[test]
    fn test_default_config_toml_parses() {
        let toml = default_config_toml();
        let config = EngineConfig::from_str(&toml).unwrap();

        assert_eq!(config.windows.door_capacity, 50);
        assert_eq!(config.weights.message_weight, 2.0);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(EngineConfig::from_str("windows = \"nope\"").is_err());
    }
}

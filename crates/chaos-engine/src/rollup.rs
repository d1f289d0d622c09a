//! Hourly Rollups
//!
//! Periodic aggregates of activity per hour, persisted as a single JSON
//! file. The aggregator overwrites the current hour on each pass, so a
//! skipped or delayed run only costs freshness, never correctness of
//! past hours.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One aggregated hour of activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyStat {
    /// Start of the hour.
    pub hour: DateTime<Utc>,
    pub message_count: u64,
    pub door_opens: u64,
    pub chaos_score: f64,
}

/// Errors from rollup persistence.
#[derive(Debug, Error)]
pub enum RollupError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// In-memory hourly stats with JSON file persistence.
#[derive(Debug)]
pub struct RollupStore {
    path: Option<PathBuf>,
    stats: BTreeMap<DateTime<Utc>, HourlyStat>,
}

impl RollupStore {
    /// Loads rollups from `path`. A missing or corrupt file starts empty;
    /// history is nice to have, never load-bearing.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let stats = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<HourlyStat>>(&content) {
                Ok(rows) => rows.into_iter().map(|s| (s.hour, s)).collect(),
                Err(e) => {
                    tracing::warn!("Corrupt rollup file, starting empty: {}", e);
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Self {
            path: Some(path),
            stats,
        }
    }

    /// Creates a store with no file backing (for testing).
    pub fn in_memory() -> Self {
        Self {
            path: None,
            stats: BTreeMap::new(),
        }
    }

    /// Inserts or replaces the stat for its hour.
    pub fn upsert(&mut self, stat: HourlyStat) {
        self.stats.insert(stat.hour, stat);
    }

    /// Writes all stats to the backing file.
    pub fn persist(&self) -> Result<(), RollupError> {
        let path = match &self.path {
            Some(path) => path,
            None => return Ok(()),
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let rows: Vec<&HourlyStat> = self.stats.values().collect();
        let json = serde_json::to_string_pretty(&rows)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Returns stats within the last `hours` hours, newest first.
    pub fn recent(&self, now: DateTime<Utc>, hours: i64) -> Vec<HourlyStat> {
        let cutoff = now - Duration::hours(hours);
        self.stats
            .values()
            .rev()
            .filter(|s| s.hour > cutoff)
            .cloned()
            .collect()
    }

    /// Returns the top `limit` hours by chaos score, highest first.
    pub fn leaderboard(&self, limit: usize) -> Vec<HourlyStat> {
        let mut rows: Vec<HourlyStat> = self.stats.values().cloned().collect();
        rows.sort_by(|a, b| {
            b.chaos_score
                .partial_cmp(&a.chaos_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        rows.truncate(limit);
        rows
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

/// Truncates an instant to the start of its hour.
pub fn truncate_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hour(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, h, 0, 0).unwrap()
    }

    fn stat(h: u32, score: f64) -> HourlyStat {
        HourlyStat {
            hour: hour(h),
            message_count: 10,
            door_opens: 2,
            chaos_score: score,
        }
    }

    #[test]
    fn test_truncate_to_hour() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 14, 37, 22).unwrap();
        assert_eq!(truncate_to_hour(ts), hour(14));
        assert_eq!(truncate_to_hour(hour(14)), hour(14));
    }

    #[test]
    fn test_upsert_replaces_same_hour() {
        let mut store = RollupStore::in_memory();
        store.upsert(stat(10, 25.0));
        store.upsert(stat(10, 40.0));

        assert_eq!(store.len(), 1);
        let rows = store.recent(hour(11), 24);
        assert_eq!(rows[0].chaos_score, 40.0);
    }

    #[test]
    fn test_recent_newest_first_within_lookback() {
        let mut store = RollupStore::in_memory();
        store.upsert(stat(8, 10.0));
        store.upsert(stat(10, 20.0));
        store.upsert(stat(12, 30.0));

        let rows = store.recent(hour(13), 4);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].hour, hour(12));
        assert_eq!(rows[1].hour, hour(10));
    }

    #[test]
    fn test_leaderboard_ordered_by_score() {
        let mut store = RollupStore::in_memory();
        store.upsert(stat(8, 10.0));
        store.upsert(stat(9, 95.5));
        store.upsert(stat(10, 42.0));

        let rows = store.leaderboard(2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].chaos_score, 95.5);
        assert_eq!(rows[1].chaos_score, 42.0);
    }

    #[test]
    fn test_persist_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hourly_stats.json");

        let mut store = RollupStore::load(&path);
        assert!(store.is_empty());
        store.upsert(stat(8, 10.0));
        store.upsert(stat(9, 20.0));
        store.persist().unwrap();

        let reloaded = RollupStore::load(&path);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.recent(hour(10), 24).len(), 2);
    }

    #[test]
    fn test_load_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hourly_stats.json");
        std::fs::write(&path, "definitely not json").unwrap();

        let store = RollupStore::load(&path);
        assert!(store.is_empty());
    }
}

//! Override Lock ("Fenthouse mode")
//!
//! A persisted, time-bounded operator override. While active it forces
//! the chaos score to the sentinel value. Reads fail open: a missing,
//! malformed, or unreadable lock record is simply inactive. A corrupt
//! override must never take scoring down with it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Default status message when the control record omits one.
pub const DEFAULT_LOCK_MESSAGE: &str = "🌿 FENTHOUSE ACTIVE 🌿";

/// A parsed override lock record.
#[derive(Debug, Clone, PartialEq)]
pub struct LockRecord {
    /// Unix seconds when the lock was activated.
    pub activated_at: i64,
    /// Lock lifetime in seconds.
    pub duration_secs: i64,
    /// Status line shown while the lock holds.
    pub status_message: String,
}

impl LockRecord {
    /// Evaluates the record against the wall clock.
    pub fn status_at(&self, now: DateTime<Utc>) -> LockStatus {
        let expires_at = self.activated_at + self.duration_secs;
        let remaining = expires_at - now.timestamp();
        if remaining > 0 {
            LockStatus {
                active: true,
                status_message: Some(self.status_message.clone()),
                countdown: Some(Countdown::from_seconds(remaining)),
                expires_at: Some(expires_at),
            }
        } else {
            LockStatus::inactive()
        }
    }
}

/// Remaining lock time broken out for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub total_seconds: i64,
}

impl Countdown {
    fn from_seconds(total: i64) -> Self {
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
            total_seconds: total,
        }
    }
}

/// Result of an override lock check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LockStatus {
    pub active: bool,
    pub status_message: Option<String>,
    pub countdown: Option<Countdown>,
    pub expires_at: Option<i64>,
}

impl LockStatus {
    pub fn inactive() -> Self {
        Self {
            active: false,
            status_message: None,
            countdown: None,
            expires_at: None,
        }
    }
}

/// Pluggable storage for the override lock record.
///
/// Writing the lock is an out-of-band operator action, not part of this
/// interface.
pub trait LockStore: Send + Sync {
    /// Returns the current lock record, or None if absent or unreadable.
    fn read(&self) -> Option<LockRecord>;
}

/// Checks the lock against `now`, failing open on any read problem.
pub fn lock_status(store: &dyn LockStore, now: DateTime<Utc>) -> LockStatus {
    match store.read() {
        Some(record) => record.status_at(now),
        None => LockStatus::inactive(),
    }
}

/// Lock store backed by a small control file.
///
/// Format: `activated_at,duration_secs[,status message]` on one line.
#[derive(Debug, Clone)]
pub struct FileLockStore {
    path: PathBuf,
}

impl FileLockStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LockStore for FileLockStore {
    fn read(&self) -> Option<LockRecord> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return None,
        };
        parse_lock_record(&content)
    }
}

fn parse_lock_record(content: &str) -> Option<LockRecord> {
    let parts: Vec<&str> = content.trim().split(',').collect();
    if parts.len() < 2 {
        tracing::warn!("Malformed override lock record, treating as inactive");
        return None;
    }
    let activated_at = match parts[0].trim().parse::<i64>() {
        Ok(v) => v,
        Err(_) => {
            tracing::warn!("Unparseable lock activation time, treating as inactive");
            return None;
        }
    };
    let duration_secs = match parts[1].trim().parse::<i64>() {
        Ok(v) => v,
        Err(_) => {
            tracing::warn!("Unparseable lock duration, treating as inactive");
            return None;
        }
    };
    let status_message = parts
        .get(2)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_LOCK_MESSAGE.to_string());

    Some(LockRecord {
        activated_at,
        duration_secs,
        status_message,
    })
}

/// Lock store that never reports a lock. Used when no lock file is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLockStore;

impl LockStore for NoLockStore {
    fn read(&self) -> Option<LockRecord> {
        None
    }
}

//! Event Log
//!
//! Append-only JSONL storage for raw events. Appends are durable and
//! loud: a storage failure propagates to the ingestion caller instead of
//! silently dropping the event. Range queries exist for out-of-band
//! aggregation jobs and tolerate the occasional bad line.

use chaos_events::Event;
use chrono::{DateTime, Utc};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the event log.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Append-only event log backed by a JSONL file.
pub struct EventLog {
    writer: Option<BufWriter<File>>,
    path: Option<PathBuf>,
    event_count: u64,
}

impl EventLog {
    /// Opens the log at `path`, creating it if needed. Existing events
    /// are preserved.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            path: Some(path),
            event_count: 0,
        })
    }

    /// Creates a log that discards events (for testing).
    pub fn null() -> Self {
        Self {
            writer: None,
            path: None,
            event_count: 0,
        }
    }

    /// Number of events appended through this handle.
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Appends one event and flushes it to disk.
    pub fn append(&mut self, event: &Event) -> Result<(), StoreError> {
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(event)?;
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }
        self.event_count += 1;
        Ok(())
    }

    /// Returns events with `start <= timestamp < end`, ordered by
    /// timestamp ascending.
    ///
    /// Lines that fail to parse are skipped with a warning; a partially
    /// torn tail must not poison historical aggregation.
    pub fn query_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>, StoreError> {
        let path = match &self.path {
            Some(path) => path,
            None => return Ok(Vec::new()),
        };

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut events = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match Event::from_jsonl(&line) {
                Ok(event) => {
                    if event.timestamp >= start && event.timestamp < end {
                        events.push(event);
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping unparseable event log line: {}", e);
                }
            }
        }
        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaos_events::{fixtures, EventKind};
    use chrono::Duration;

    #[test]
    fn test_append_and_query() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let mut log = EventLog::open(&path).unwrap();

        let start = fixtures::base_time();
        for event in fixtures::chat_burst(start, 3) {
            log.append(&event).unwrap();
        }
        assert_eq!(log.event_count(), 3);

        let events = log.query_range(start, start + Duration::minutes(1)).unwrap();
        assert_eq!(events.len(), 3);
        assert!(events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_query_range_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let mut log = EventLog::open(&path).unwrap();

        let start = fixtures::base_time();
        for event in fixtures::chat_burst(start, 5) {
            log.append(&event).unwrap();
        }

        // Only seconds 1 and 2 fall inside [start+1s, start+3s).
        let events = log
            .query_range(start + Duration::seconds(1), start + Duration::seconds(3))
            .unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_log_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let start = fixtures::base_time();

        {
            let mut log = EventLog::open(&path).unwrap();
            log.append(&fixtures::pizza(start, 2)).unwrap();
        }

        let mut log = EventLog::open(&path).unwrap();
        log.append(&fixtures::pizza(start + Duration::seconds(1), 3)).unwrap();

        let events = log.query_range(start, start + Duration::minutes(1)).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].value, 2);
        assert_eq!(events[1].value, 3);
    }

    #[test]
    fn test_query_skips_corrupt_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let start = fixtures::base_time();

        let mut log = EventLog::open(&path).unwrap();
        log.append(&fixtures::pizza(start, 1)).unwrap();
        drop(log);

        // Simulate a torn write.
        use std::io::Write as _;
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{\"id\":\"evt_truncat").unwrap();
        drop(file);

        let log = EventLog::open(&path).unwrap();
        let events = log.query_range(start, start + Duration::minutes(1)).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_null_log_discards() {
        let mut log = EventLog::null();
        let event = chaos_events::Event::new(
            fixtures::base_time(),
            EventKind::ChatMessage,
            1,
            "",
        );
        log.append(&event).unwrap();
        assert_eq!(log.event_count(), 1);
        assert!(log
            .query_range(fixtures::base_time(), fixtures::base_time() + Duration::hours(1))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_unrecognized_kinds_are_stored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let start = fixtures::base_time();

        let mut log = EventLog::open(&path).unwrap();
        let event = chaos_events::Event::new(start, EventKind::Other("karaoke".into()), 1, "");
        log.append(&event).unwrap();

        let events = log.query_range(start, start + Duration::minutes(1)).unwrap();
        assert_eq!(events[0].kind, EventKind::Other("karaoke".to_string()));
    }
}

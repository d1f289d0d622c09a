//! Event Types
//!
//! The raw chaos event model shared by the ingestion facade, the event
//! log, and the scoring engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Categories of chaos events.
///
/// Kinds the engine does not recognize are preserved as [`EventKind::Other`]
/// so they can still be stored and queried; they just never move the live
/// counters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    ChatMessage,
    DoorOpen,
    DoorClose,
    Pizza,
    ResetPizza,
    Other(String),
}

impl EventKind {
    /// Returns true if this kind feeds the door activity window.
    pub fn is_door(&self) -> bool {
        matches!(self, EventKind::DoorOpen | EventKind::DoorClose)
    }

    /// Returns true if the live metrics state reacts to this kind.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, EventKind::Other(_))
    }

    /// Returns the recognized kind variants.
    pub fn all_recognized() -> &'static [EventKind] {
        &[
            EventKind::ChatMessage,
            EventKind::DoorOpen,
            EventKind::DoorClose,
            EventKind::Pizza,
            EventKind::ResetPizza,
        ]
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::ChatMessage => write!(f, "chat_message"),
            EventKind::DoorOpen => write!(f, "door_open"),
            EventKind::DoorClose => write!(f, "door_close"),
            EventKind::Pizza => write!(f, "pizza"),
            EventKind::ResetPizza => write!(f, "reset_pizza"),
            EventKind::Other(s) => write!(f, "{}", s),
        }
    }
}

impl FromStr for EventKind {
    type Err = std::convert::Infallible;

    /// Parses an event kind from its wire string. Never fails: unknown
    /// strings become [`EventKind::Other`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "chat_message" => EventKind::ChatMessage,
            "door_open" => EventKind::DoorOpen,
            "door_close" => EventKind::DoorClose,
            "pizza" => EventKind::Pizza,
            "reset_pizza" => EventKind::ResetPizza,
            other => EventKind::Other(other.to_string()),
        })
    }
}

// EventKind travels as a plain string on the wire and in the event log.
impl Serialize for EventKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let kind = s.parse().unwrap_or(EventKind::Other(s));
        Ok(kind)
    }
}

/// A single ingested chaos event.
///
/// Events are immutable facts: created once at ingestion, appended to the
/// event log, never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier (e.g., "evt_6dd3a1f2...")
    pub id: String,
    /// When the event was ingested
    pub timestamp: DateTime<Utc>,
    /// Event category
    pub kind: EventKind,
    /// Numeric payload; defaults to 1 (pizza increments, mass door events)
    #[serde(default = "default_value")]
    pub value: i64,
    /// Free-text detail from the bridge
    #[serde(default)]
    pub detail: String,
}

fn default_value() -> i64 {
    1
}

impl Event {
    /// Creates a new event with a fresh id.
    pub fn new(timestamp: DateTime<Utc>, kind: EventKind, value: i64, detail: impl Into<String>) -> Self {
        Self {
            id: generate_event_id(),
            timestamp,
            kind,
            value,
            detail: detail.into(),
        }
    }

    /// Serializes the event to a JSON line (for JSONL format).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an event from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Generates a fresh event id.
pub fn generate_event_id() -> String {
    format!("evt_{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 14, 30, 0).unwrap()
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(EventKind::ChatMessage.to_string(), "chat_message");
        assert_eq!(EventKind::DoorOpen.to_string(), "door_open");
        assert_eq!(EventKind::DoorClose.to_string(), "door_close");
        assert_eq!(EventKind::Pizza.to_string(), "pizza");
        assert_eq!(EventKind::ResetPizza.to_string(), "reset_pizza");
        assert_eq!(EventKind::Other("karaoke".into()).to_string(), "karaoke");
    }

    #[test]
    fn test_kind_parse_roundtrip() {
        for kind in EventKind::all_recognized() {
            let parsed: EventKind = kind.to_string().parse().unwrap();
            assert_eq!(&parsed, kind);
        }
    }

    #[test]
    fn test_kind_parse_unknown() {
        let kind: EventKind = "server_on_fire".parse().unwrap();
        assert_eq!(kind, EventKind::Other("server_on_fire".to_string()));
        assert!(!kind.is_recognized());
    }

    #[test]
    fn test_kind_serializes_as_string() {
        assert_eq!(
            serde_json::to_string(&EventKind::ChatMessage).unwrap(),
            r#""chat_message""#
        );
        assert_eq!(
            serde_json::to_string(&EventKind::Other("karaoke".into())).unwrap(),
            r#""karaoke""#
        );
    }

    #[test]
    fn test_kind_is_door() {
        assert!(EventKind::DoorOpen.is_door());
        assert!(EventKind::DoorClose.is_door());
        assert!(!EventKind::Pizza.is_door());
        assert!(!EventKind::ChatMessage.is_door());
    }

    #[test]
    fn test_event_jsonl_roundtrip() {
        let event = Event::new(ts(), EventKind::Pizza, 3, "three pies spotted");
        let line = event.to_jsonl().unwrap();
        assert!(!line.contains('\n'));

        let parsed = Event::from_jsonl(&line).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_event_value_defaults_to_one() {
        let json = format!(
            r#"{{"id":"evt_1","timestamp":"{}","kind":"chat_message"}}"#,
            ts().to_rfc3339()
        );
        let event = Event::from_jsonl(&json).unwrap();
        assert_eq!(event.value, 1);
        assert_eq!(event.detail, "");
    }

    #[test]
    fn test_event_preserves_unknown_kind() {
        let json = format!(
            r#"{{"id":"evt_1","timestamp":"{}","kind":"mystery","value":2,"detail":""}}"#,
            ts().to_rfc3339()
        );
        let event = Event::from_jsonl(&json).unwrap();
        assert_eq!(event.kind, EventKind::Other("mystery".to_string()));

        // Unknown kinds survive a write/read cycle unchanged
        let line = event.to_jsonl().unwrap();
        let reparsed = Event::from_jsonl(&line).unwrap();
        assert_eq!(reparsed.kind, EventKind::Other("mystery".to_string()));
    }

    #[test]
    fn test_generate_event_id_unique() {
        let a = generate_event_id();
        let b = generate_event_id();
        assert!(a.starts_with("evt_"));
        assert_ne!(a, b);
    }
}

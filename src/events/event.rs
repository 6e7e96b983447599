//! # Event record decoded from the daemon's stream.
//!
//! Each frame read from an open stream is one self-describing JSON record.
//! [`Event::decode`] is the only way an event enters this layer; the reader
//! loop drops frames that fail to decode and events whose `kind` is empty, so
//! downstream code can rely on a non-empty type tag.
//!
//! ## Example
//! ```rust
//! use eventmux::Event;
//!
//! let frame = br#"{"type":"instance-started","project":"default","metadata":{"name":"c1"}}"#;
//! let ev = Event::decode(frame).unwrap();
//!
//! assert_eq!(ev.kind, "instance-started");
//! assert_eq!(ev.project, "default");
//! ```

use serde::Deserialize;
use serde_json::Value;

/// One decoded, typed record from the daemon's event stream.
///
/// Immutable once decoded; the dispatcher shares a single decoded event across
/// all matching targets as an `Arc<Event>`.
#[derive(Clone, Debug, Deserialize)]
pub struct Event {
    /// Event type tag (e.g. `"instance-started"`, `"operation"`).
    ///
    /// Never empty once past the reader loop; target filters match on it.
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Project the event originated from.
    ///
    /// Empty when the daemon does not attach one (single-project servers).
    #[serde(default)]
    pub project: String,

    /// Wall-clock timestamp assigned by the daemon, as transmitted.
    #[serde(default)]
    pub timestamp: Option<String>,

    /// Cluster member that generated the event, when clustered.
    #[serde(default)]
    pub location: Option<String>,

    /// Opaque event payload; schema depends on `kind`.
    #[serde(default)]
    pub metadata: Value,
}

impl Event {
    /// Decodes one frame into an event.
    ///
    /// Returns an error for malformed payloads; the caller (the reader loop)
    /// recovers by skipping the frame. An empty `kind` is *not* an error here —
    /// the reader drops those separately so the distinction shows up in logs.
    pub fn decode(frame: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_record() {
        let frame = br#"{
            "type": "instance-started",
            "project": "default",
            "timestamp": "2024-11-02T10:41:00Z",
            "location": "node1",
            "metadata": {"name": "c1"}
        }"#;
        let ev = Event::decode(frame).unwrap();

        assert_eq!(ev.kind, "instance-started");
        assert_eq!(ev.project, "default");
        assert_eq!(ev.timestamp.as_deref(), Some("2024-11-02T10:41:00Z"));
        assert_eq!(ev.location.as_deref(), Some("node1"));
        assert_eq!(ev.metadata["name"], "c1");
    }

    #[test]
    fn missing_fields_default() {
        let ev = Event::decode(br#"{"type":"logging"}"#).unwrap();

        assert_eq!(ev.kind, "logging");
        assert_eq!(ev.project, "");
        assert!(ev.timestamp.is_none());
        assert!(ev.location.is_none());
        assert!(ev.metadata.is_null());
    }

    #[test]
    fn missing_type_decodes_empty() {
        // Decode succeeds; the reader loop is responsible for dropping these.
        let ev = Event::decode(br#"{"project":"p1"}"#).unwrap();
        assert!(ev.kind.is_empty());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(Event::decode(b"not json").is_err());
        assert!(Event::decode(b"").is_err());
        assert!(Event::decode(br#"["type"]"#).is_err());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let ev = Event::decode(br#"{"type":"x","unknown":1,"extra":{"a":2}}"#).unwrap();
        assert_eq!(ev.kind, "x");
    }
}

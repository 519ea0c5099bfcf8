//! Journal entry model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::export::ExportHandle;

/// A unique identifier for an entry.
///
/// Allocated by the store from a monotonic millisecond clock and serialized
/// as a bare integer, matching the `journalDatabase` wire layout.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct EntryId(i64);

impl EntryId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A journal entry.
///
/// `title` and `content` are stored trimmed and are never empty for a
/// persisted entry; the store enforces this before mutating anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique identifier, never reassigned
    pub id: EntryId,
    /// Entry title
    pub title: String,
    /// Entry body
    pub content: String,
    /// Last create/modify time, round-trips as ISO-8601 text
    pub timestamp: DateTime<Utc>,
    /// Optional embedded image as a data URL
    pub image: Option<String>,
    /// Destination of the last export, kept for overwrite-in-place.
    /// A weak reference: never serialized, never required to be valid.
    #[serde(skip)]
    pub export_handle: Option<ExportHandle>,
}

impl Entry {
    /// Create an entry stamped with the current time.
    ///
    /// Callers are expected to pass validated, trimmed title/content.
    #[must_use]
    pub fn new(
        id: EntryId,
        title: impl Into<String>,
        content: impl Into<String>,
        image: Option<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            timestamp: Utc::now(),
            image,
            export_handle: None,
        }
    }

    /// Refresh the last-modified timestamp.
    pub fn touch(&mut self) {
        self.timestamp = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportFormat;
    use pretty_assertions::assert_eq;

    #[test]
    fn entry_id_displays_raw_value() {
        assert_eq!(EntryId::new(1712000000000).to_string(), "1712000000000");
    }

    #[test]
    fn entry_serializes_to_wire_layout() {
        let mut entry = Entry::new(EntryId::new(42), "Day 1", "Hello", None);
        entry.export_handle = Some(ExportHandle::new("/tmp/day_1.pdf", ExportFormat::Document));

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], 42);
        assert_eq!(json["title"], "Day 1");
        assert_eq!(json["content"], "Hello");
        assert_eq!(json["image"], serde_json::Value::Null);
        // The export handle is a side channel and must never hit the wire.
        assert!(json.get("export_handle").is_none());
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn entry_round_trips_without_handle() {
        let mut entry = Entry::new(
            EntryId::new(7),
            "Trip",
            "Notes",
            Some("data:image/jpeg;base64,AAAA".to_string()),
        );
        entry.export_handle = Some(ExportHandle::new("/tmp/trip.pdf", ExportFormat::Document));

        let json = serde_json::to_string(&entry).unwrap();
        let restored: Entry = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.id, entry.id);
        assert_eq!(restored.title, entry.title);
        assert_eq!(restored.content, entry.content);
        assert_eq!(restored.timestamp, entry.timestamp);
        assert_eq!(restored.image, entry.image);
        assert_eq!(restored.export_handle, None);
    }

    #[test]
    fn touch_advances_timestamp() {
        let mut entry = Entry::new(EntryId::new(1), "t", "c", None);
        let before = entry.timestamp;
        entry.touch();
        assert!(entry.timestamp >= before);
    }
}

// ── Event helpers ──

use chrono::{DateTime, Utc};

use super::Event;

/// Convenience accessors on top of the raw event record.
pub trait EventExt {
    /// `created_date` parsed as RFC 3339, if it is well-formed.
    fn created_at(&self) -> Option<DateTime<Utc>>;

    /// A string field from the vendor payload.
    fn payload_str(&self, key: &str) -> Option<&str>;
}

impl EventExt for Event {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_date)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn payload_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(serde_json::Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::{Datelike, Timelike};
    use serde_json::json;

    use super::*;

    #[test]
    fn created_at_parses_portal_timestamps() {
        let event: Event = serde_json::from_value(json!({
            "id": "c71516a0",
            "event_type": 2,
            "created_date": "2020-01-04T22:01:36.000Z",
            "snapshot": "https://cdn.example/snap.jpg"
        }))
        .unwrap();

        let at = event.created_at().unwrap();
        assert_eq!((at.year(), at.month(), at.day()), (2020, 1, 4));
        assert_eq!(at.hour(), 22);
        assert_eq!(event.payload_str("snapshot"), Some("https://cdn.example/snap.jpg"));
    }

    #[test]
    fn created_at_tolerates_garbage() {
        let event: Event = serde_json::from_value(json!({ "event_type": 1 })).unwrap();
        assert!(event.created_at().is_none());
        assert!(event.payload_str("snapshot").is_none());
    }
}

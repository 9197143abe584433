// ── Filter predicates for event collections ──
//
// Used to slice cached events without re-querying the portal.

use crate::model::{Event, EventType};

/// Filter predicate for events.
pub enum EventFilter {
    All,
    ByType(EventType),
    /// Events created at or after the given ISO-8601 timestamp.
    Since(String),
    Custom(Box<dyn Fn(&Event) -> bool + Send + Sync>),
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Self::All => true,
            Self::ByType(kind) => event.event_type == *kind,
            Self::Since(ts) => event.created_date.as_str() >= ts.as_str(),
            Self::Custom(f) => f(event),
        }
    }
}

impl From<EventType> for EventFilter {
    fn from(kind: EventType) -> Self {
        Self::ByType(kind)
    }
}

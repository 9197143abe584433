//! Event command handler.

use serde::Serialize;
use tabled::Tabled;

use kodakhome_core::{Event, EventExt, EventFilter, EventType, SmartHomeSession};

use crate::cli::{EventKind, EventsArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Snapshot")]
    snapshot: String,
    #[tabled(rename = "Files")]
    files: usize,
    #[tabled(rename = "ID")]
    id: String,
}

/// An event tagged with the device it came from.
#[derive(Serialize)]
struct EventEntry<'a> {
    device_id: &'a str,
    #[serde(flatten)]
    event: &'a Event,
}

fn file_count(event: &Event) -> usize {
    event
        .extra
        .get("data")
        .and_then(serde_json::Value::as_array)
        .map_or(0, Vec::len)
}

fn to_row(entry: &EventEntry<'_>, color: bool) -> EventRow {
    EventRow {
        device: entry.device_id.to_owned(),
        kind: output::event_kind_label(entry.event.event_type, color),
        created: util::format_created(entry.event),
        snapshot: entry.event.payload_str("snapshot").unwrap_or("-").to_owned(),
        files: file_count(entry.event),
        id: entry.event.id.clone(),
    }
}

impl EventKind {
    fn event_type(self) -> Option<EventType> {
        match self {
            Self::All => None,
            Self::Motion => Some(EventType::Motion),
            Self::Sound => Some(EventType::Sound),
            Self::Battery => Some(EventType::Battery),
        }
    }
}

fn build_filter(kind: EventKind, since: Option<&str>) -> Result<EventFilter, CliError> {
    let since = since.map(util::parse_since).transpose()?;
    Ok(match (kind.event_type(), since) {
        (None, None) => EventFilter::All,
        (Some(kind), None) => EventFilter::ByType(kind),
        (None, Some(ts)) => EventFilter::Since(ts),
        (Some(kind), Some(ts)) => EventFilter::Custom(Box::new(move |e: &Event| {
            e.event_type == kind && e.created_date >= ts
        })),
    })
}

/// Merge per-device selections, oldest first, keeping the newest `limit`.
fn collect_entries<'a>(
    session: &'a SmartHomeSession,
    device_ids: &[&'a str],
    filter: &EventFilter,
    limit: Option<usize>,
) -> Result<Vec<EventEntry<'a>>, CliError> {
    let mut entries = Vec::new();
    for &device_id in device_ids {
        for event in session.select_events(Some(device_id), filter)? {
            entries.push(EventEntry { device_id, event });
        }
    }
    entries.sort_by(|a, b| a.event.created_date.cmp(&b.event.created_date));

    if let Some(limit) = limit {
        let skip = entries.len().saturating_sub(limit);
        entries.drain(..skip);
    }
    Ok(entries)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(
    session: &SmartHomeSession,
    args: &EventsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let filter = build_filter(args.kind, args.since.as_deref())?;

    let device_ids: Vec<&str> = match args.device.as_deref() {
        Some(id) => vec![util::find_device(session, id)?.device_id.as_str()],
        None => session
            .devices()?
            .iter()
            .map(|d| d.device_id.as_str())
            .collect(),
    };

    let entries = collect_entries(session, &device_ids, &filter, args.limit)?;
    tracing::debug!(count = entries.len(), "selected events");

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &entries,
        |e| to_row(e, color),
        |e| e.event.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn event(kind: EventType, created: &str) -> Event {
        Event {
            id: created.into(),
            event_type: kind,
            created_date: created.into(),
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn kind_and_since_combine() {
        let filter = build_filter(EventKind::Motion, Some("2020-01-02")).unwrap();
        assert!(filter.matches(&event(EventType::Motion, "2020-01-02T08:00:00.000Z")));
        assert!(!filter.matches(&event(EventType::Motion, "2020-01-01T23:59:59.000Z")));
        assert!(!filter.matches(&event(EventType::Sound, "2020-01-03T00:00:00.000Z")));
    }

    #[test]
    fn all_without_since_matches_everything() {
        let filter = build_filter(EventKind::All, None).unwrap();
        assert!(matches!(filter, EventFilter::All));
        assert!(filter.matches(&event(EventType::Other(3), "")));
    }

    #[test]
    fn bad_since_is_rejected() {
        let err = build_filter(EventKind::All, Some("yesterday")).err().unwrap();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "since"));
    }

    #[test]
    fn file_count_reads_data_array() {
        let mut e = event(EventType::Motion, "2020-01-01T00:00:00.000Z");
        assert_eq!(file_count(&e), 0);
        e.extra.insert(
            "data".into(),
            serde_json::json!([{ "file": "a.mp4" }, { "file": "a.jpg" }]),
        );
        assert_eq!(file_count(&e), 2);
    }

    #[test]
    fn entry_serializes_flat() {
        let e = event(EventType::Sound, "2020-01-01T00:00:00.000Z");
        let entry = EventEntry { device_id: "cam-1", event: &e };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["device_id"], "cam-1");
        assert_eq!(json["event_type"], 2);
    }
}

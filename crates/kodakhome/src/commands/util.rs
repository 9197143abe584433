//! Shared helpers for command handlers.

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};

use kodakhome_core::{Device, Event, EventExt, SmartHomeSession};

use crate::error::CliError;

/// Look up a device by its ID in the session snapshot.
pub fn find_device<'a>(
    session: &'a SmartHomeSession,
    device_id: &str,
) -> Result<&'a Device, CliError> {
    session
        .devices()?
        .iter()
        .find(|d| d.device_id == device_id)
        .ok_or_else(|| CliError::NotFound {
            resource_type: "device".into(),
            identifier: device_id.into(),
            list_command: "devices".into(),
        })
}

/// Event creation time in local time, or the raw string if unparseable.
pub fn format_created(event: &Event) -> String {
    event.created_at().map_or_else(
        || event.created_date.clone(),
        |at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// Normalize a `--since` value to the portal's timestamp layout.
///
/// Accepts RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC). The result
/// compares lexicographically against `created_date`.
pub fn parse_since(value: &str) -> Result<String, CliError> {
    let at: DateTime<Utc> = if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        dt.with_timezone(&Utc)
    } else if let Some(midnight) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        midnight.and_utc()
    } else {
        return Err(CliError::Validation {
            field: "since".into(),
            reason: format!("'{value}' is not an RFC 3339 timestamp or YYYY-MM-DD date"),
        });
    };
    Ok(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

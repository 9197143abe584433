// Portal response types
//
// Models for the Kodak Smart Home web API. Web endpoints wrap their payload
// in `{ "status": 200, "msg": "Success", "data": ... }`. Only the fields the
// client acts on are typed; everything else is kept verbatim in `extra`
// maps so consumers see the vendor records unchanged.

use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard web API response envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub msg: Option<String>,
    pub data: T,
}

// ── Token ────────────────────────────────────────────────────────────

/// Wire shape of the password grant response.
#[derive(Deserialize)]
pub(crate) struct RawToken {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    account_info: serde_json::Value,
    #[serde(default)]
    web_urls: serde_json::Value,
}

/// OAuth token plus the account metadata the token host returns with it.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub access_token: SecretString,
    pub token_type: Option<String>,
    pub refresh_token: Option<SecretString>,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
    /// Opaque account record.
    pub account_info: serde_json::Value,
    /// Opaque map of portal URLs for this account.
    pub web_urls: serde_json::Value,
}

impl From<RawToken> for TokenInfo {
    fn from(raw: RawToken) -> Self {
        Self {
            access_token: SecretString::from(raw.access_token),
            token_type: raw.token_type,
            refresh_token: raw.refresh_token.map(SecretString::from),
            expires_in: raw.expires_in,
            scope: raw.scope,
            account_info: raw.account_info,
            web_urls: raw.web_urls,
        }
    }
}

// ── User ─────────────────────────────────────────────────────────────

/// The `data` object of the authenticate response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Device ───────────────────────────────────────────────────────────

/// A device bound to the account.
///
/// Opaque beyond its identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub device_id: String,
    /// Catch-all for every other vendor field.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Device {
    /// A string-valued vendor field, if present.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(serde_json::Value::as_str)
    }
}

/// The `data` object of the device listing: devices plus plan fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceListing {
    #[serde(default)]
    pub devices: Vec<Device>,
    /// Subscription / plan fields of the account.
    #[serde(flatten)]
    pub account: serde_json::Map<String, serde_json::Value>,
}

// ── Event ────────────────────────────────────────────────────────────

/// Numeric event type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum EventType {
    /// Code 1.
    Motion,
    /// Code 2.
    Sound,
    /// Code 7.
    Battery,
    /// Any code the client does not interpret.
    Other(u32),
}

impl EventType {
    pub fn code(self) -> u32 {
        match self {
            Self::Motion => 1,
            Self::Sound => 2,
            Self::Battery => 7,
            Self::Other(code) => code,
        }
    }
}

impl From<u32> for EventType {
    fn from(code: u32) -> Self {
        match code {
            1 => Self::Motion,
            2 => Self::Sound,
            7 => Self::Battery,
            other => Self::Other(other),
        }
    }
}

impl From<EventType> for u32 {
    fn from(kind: EventType) -> Self {
        kind.code()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Motion => f.write_str("motion"),
            Self::Sound => f.write_str("sound"),
            Self::Battery => f.write_str("battery"),
            Self::Other(code) => write!(f, "type {code}"),
        }
    }
}

/// A device event.
///
/// Equality is structural over every field, including the preserved
/// vendor payload (snapshot URL, file list, ...). A missing `id` or
/// `created_date` reads as empty and is left out again on serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub event_type: EventType,
    /// ISO-8601 timestamp; lexicographic order is chronological order.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created_date: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The `data` object of one event page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPage {
    #[serde(default)]
    pub total_events: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;

    #[test]
    fn event_type_codes() {
        assert_eq!(EventType::from(1), EventType::Motion);
        assert_eq!(EventType::from(2), EventType::Sound);
        assert_eq!(EventType::from(7), EventType::Battery);
        assert_eq!(EventType::from(4), EventType::Other(4));
        assert_eq!(u32::from(EventType::Battery), 7);
        assert_eq!(EventType::Other(9).to_string(), "type 9");
    }

    #[test]
    fn event_keeps_vendor_payload() {
        let raw = json!({
            "id": "1095e3e0-2278-11ea-8790-3fdecad07f1c",
            "event_type": 1,
            "created_date": "2019-12-19T15:56:05.000Z",
            "snapshot": "http://snapshot_url",
            "data": [],
            "dv_data": null
        });

        let event: Event = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(event.event_type, EventType::Motion);
        assert_eq!(event.extra["snapshot"], "http://snapshot_url");
        assert_eq!(serde_json::to_value(&event).unwrap(), raw);
    }

    #[test]
    fn event_without_id_serializes_unchanged() {
        let raw = json!({ "event_type": 7, "battery": 12 });

        let event: Event = serde_json::from_value(raw.clone()).unwrap();
        assert!(event.id.is_empty());
        assert!(event.created_date.is_empty());
        assert_eq!(serde_json::to_value(&event).unwrap(), raw);
    }

    #[test]
    fn empty_event_page_defaults() {
        let page: EventPage =
            serde_json::from_value(json!({ "total_events": 0, "total_pages": 0 })).unwrap();
        assert!(page.events.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn device_listing_splits_devices_from_plan() {
        let listing: DeviceListing = serde_json::from_value(json!({
            "plan_id": "plan_01",
            "devices": [{ "id": 1000, "device_id": "FAKEDEVICEID", "plan_id": "plan_01" }]
        }))
        .unwrap();

        assert_eq!(listing.devices.len(), 1);
        assert_eq!(listing.devices[0].device_id, "FAKEDEVICEID");
        assert_eq!(listing.devices[0].field("plan_id"), Some("plan_01"));
        assert_eq!(listing.account["plan_id"], "plan_01");
    }
}

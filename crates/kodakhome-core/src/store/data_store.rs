// ── Cached portal data ──
//
// Devices, account plan fields and per-device event buckets from the
// last successful refresh. Owned by the session; no interior mutability.

use chrono::{DateTime, Utc};

use crate::filter::EventFilter;
use crate::model::{Device, DeviceEventBucket, Event};

/// Snapshot of everything the session fetched.
#[derive(Debug, Clone, Default)]
pub struct DataStore {
    pub(crate) devices: Vec<Device>,
    pub(crate) account: serde_json::Map<String, serde_json::Value>,
    pub(crate) buckets: Vec<DeviceEventBucket>,
    pub(crate) last_full_refresh: Option<DateTime<Utc>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Plan/subscription fields returned alongside the device list.
    pub fn account(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.account
    }

    pub fn buckets(&self) -> &[DeviceEventBucket] {
        &self.buckets
    }

    pub fn bucket(&self, device_id: &str) -> Option<&DeviceEventBucket> {
        self.buckets.iter().find(|b| b.device_id == device_id)
    }

    pub fn last_full_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_full_refresh
    }

    pub fn event_count(&self) -> usize {
        self.buckets.iter().map(DeviceEventBucket::len).sum()
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Events matching `filter`, oldest first.
    ///
    /// With `device_id` set, only that device's bucket is searched; an
    /// unknown device yields nothing. Events sharing a timestamp keep
    /// their collection order.
    pub fn select(&self, device_id: Option<&str>, filter: &EventFilter) -> Vec<&Event> {
        let mut selected: Vec<&Event> = self
            .buckets
            .iter()
            .filter(|b| device_id.is_none_or(|id| b.device_id == id))
            .flat_map(|b| b.events.iter())
            .filter(|e| filter.matches(e))
            .collect();
        selected.sort_by(|a, b| a.created_date.cmp(&b.created_date));
        selected
    }
}

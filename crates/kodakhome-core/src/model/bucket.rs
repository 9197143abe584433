// ── Per-device event bucket ──

use serde::Serialize;

use super::Event;

/// Every distinct event collected for one device.
///
/// Events keep the order in which pages delivered them; an event that
/// compares equal to one already held is dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceEventBucket {
    pub device_id: String,
    pub events: Vec<Event>,
}

impl DeviceEventBucket {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            events: Vec::new(),
        }
    }

    /// Append the events not already present. Returns how many were added.
    pub fn absorb(&mut self, events: impl IntoIterator<Item = Event>) -> usize {
        let before = self.events.len();
        for event in events {
            if !self.events.contains(&event) {
                self.events.push(event);
            }
        }
        self.events.len() - before
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

// ── Full refresh application logic ──

use chrono::Utc;

use super::DataStore;
use crate::model::{DeviceEventBucket, DeviceListing};

impl DataStore {
    /// Replace the whole snapshot.
    ///
    /// Buckets are rebuilt by the caller from scratch on every refresh, so
    /// nothing from the previous snapshot survives.
    pub(crate) fn apply_snapshot(
        &mut self,
        listing: DeviceListing,
        buckets: Vec<DeviceEventBucket>,
    ) {
        self.devices = listing.devices;
        self.account = listing.account;
        self.buckets = buckets;
        self.last_full_refresh = Some(Utc::now());
    }
}

// ── Portal session ──
//
// Lifecycle of one authenticated session against the Kodak Smart Home
// portal: login, device listing, paginated event collection, logout.
// Every request goes through `dispatch`, which owns the 401 policy.

use secrecy::SecretString;
use tracing::{debug, info, trace, warn};

use kodakhome_api::{
    Endpoints, EventPage, Region, SmartHomeClient, TlsMode, TransportConfig,
};

use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::filter::EventFilter;
use crate::model::{
    Device, DeviceEventBucket, DeviceListing, Event, EventType, TokenInfo, UserProfile,
};
use crate::store::DataStore;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

// ── SmartHomeSession ─────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Owns the HTTP client, the credentials, the session tokens and the
/// cached device/event snapshot. All operations are sequential and take
/// `&mut self`; share it behind a lock if you must.
pub struct SmartHomeSession {
    client: SmartHomeClient,
    username: String,
    password: SecretString,
    state: ConnectionState,
    token: Option<TokenInfo>,
    user: Option<UserProfile>,
    session_cookie: Option<SecretString>,
    store: DataStore,
}

impl SmartHomeSession {
    /// Build a session from configuration. Does NOT connect --
    /// call [`connect()`](Self::connect) to log in and fetch data.
    ///
    /// Fails with [`CoreError::UnsupportedRegion`] before any network
    /// traffic if the region code is unknown.
    pub fn new(config: SessionConfig) -> Result<Self, CoreError> {
        let region: Region = config.region.parse()?;
        let endpoints = match config.endpoints {
            Some(endpoints) => endpoints,
            None => region.endpoints()?,
        };

        let transport = TransportConfig {
            tls: TlsMode::from(&config.tls),
            timeout: config.timeout,
            cookie_jar: None,
        };
        let client = SmartHomeClient::new(endpoints, &transport)?;
        debug!(%region, username = %config.username, "session created");

        Ok(Self::with_client(client, config.username, config.password))
    }

    /// Build a session around an existing client.
    pub fn with_client(
        client: SmartHomeClient,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            client,
            username: username.into(),
            password,
            state: ConnectionState::Disconnected,
            token: None,
            user: None,
            session_cookie: None,
            store: DataStore::new(),
        }
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Log in and fetch devices plus their full event history.
    ///
    /// Runs probe, token grant and web authentication, then lists devices
    /// and walks every device's event pages. The session is Connected only
    /// if all of it succeeds.
    pub async fn connect(&mut self) -> Result<(), CoreError> {
        self.state = ConnectionState::Disconnected;

        if let Err(e) = self.login().await {
            warn!(error = %e, "login failed");
            return Err(e);
        }
        self.state = ConnectionState::Connected;

        if let Err(e) = self.full_refresh().await {
            warn!(error = %e, "initial refresh failed");
            self.state = ConnectionState::Disconnected;
            return Err(e);
        }

        info!(
            user_id = ?self.user_id(),
            devices = self.store.devices().len(),
            events = self.store.event_count(),
            "connected to Kodak Smart Home"
        );
        Ok(())
    }

    /// End the web session. Cached data stays readable only through
    /// [`store()`](Self::store); the gated accessors refuse until the
    /// next connect.
    pub async fn disconnect(&mut self) {
        if let Err(e) = self.client.logout().await {
            warn!(error = %e, "logout failed (non-fatal)");
        }
        self.state = ConnectionState::Disconnected;
        debug!("disconnected");
    }

    /// Re-fetch devices and events on a connected session.
    ///
    /// A dropped session is re-established once per request; a second
    /// drop on the same request yields [`CoreError::SessionExpired`].
    pub async fn update(&mut self) -> Result<(), CoreError> {
        self.ensure_connected()?;
        self.full_refresh().await
    }

    /// Connect, run `f` against the fresh session, disconnect.
    pub async fn oneshot<F, T>(config: SessionConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(&SmartHomeSession) -> Result<T, CoreError>,
    {
        let mut session = Self::new(config)?;
        session.connect().await?;
        let result = f(&session);
        session.disconnect().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn endpoints(&self) -> &Endpoints {
        self.client.endpoints()
    }

    /// Numeric account id from the authenticate response.
    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn token_info(&self) -> Option<&TokenInfo> {
        self.token.as_ref()
    }

    /// The JSESSIONID issued by the last successful login.
    pub fn session_cookie(&self) -> Option<&SecretString> {
        self.session_cookie.as_ref()
    }

    /// Raw snapshot, regardless of connection state.
    pub fn store(&self) -> &DataStore {
        &self.store
    }

    // ── Gated accessors ──────────────────────────────────────────

    pub fn devices(&self) -> Result<&[Device], CoreError> {
        self.ensure_connected()?;
        Ok(self.store.devices())
    }

    /// Plan/subscription fields returned with the device list.
    pub fn account(&self) -> Result<&serde_json::Map<String, serde_json::Value>, CoreError> {
        self.ensure_connected()?;
        Ok(self.store.account())
    }

    /// One bucket per device, in device-list order.
    pub fn events(&self) -> Result<&[DeviceEventBucket], CoreError> {
        self.ensure_connected()?;
        Ok(self.store.buckets())
    }

    /// The bucket of one device, `None` if the device is unknown.
    pub fn device_events(&self, device_id: &str) -> Result<Option<&DeviceEventBucket>, CoreError> {
        self.ensure_connected()?;
        Ok(self.store.bucket(device_id))
    }

    /// Events matching `filter`, oldest first, optionally restricted to one device.
    pub fn select_events(
        &self,
        device_id: Option<&str>,
        filter: &EventFilter,
    ) -> Result<Vec<&Event>, CoreError> {
        self.ensure_connected()?;
        Ok(self.store.select(device_id, filter))
    }

    pub fn events_by_type(
        &self,
        device_id: Option<&str>,
        kind: EventType,
    ) -> Result<Vec<&Event>, CoreError> {
        self.select_events(device_id, &EventFilter::ByType(kind))
    }

    pub fn motion_events(&self, device_id: Option<&str>) -> Result<Vec<&Event>, CoreError> {
        self.events_by_type(device_id, EventType::Motion)
    }

    pub fn sound_events(&self, device_id: Option<&str>) -> Result<Vec<&Event>, CoreError> {
        self.events_by_type(device_id, EventType::Sound)
    }

    pub fn battery_events(&self, device_id: Option<&str>) -> Result<Vec<&Event>, CoreError> {
        self.events_by_type(device_id, EventType::Battery)
    }

    // ── Internals ────────────────────────────────────────────────

    fn ensure_connected(&self) -> Result<(), CoreError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(CoreError::Disconnected)
        }
    }

    fn access_token(&self) -> Result<&SecretString, CoreError> {
        self.token
            .as_ref()
            .map(|t| &t.access_token)
            .ok_or(CoreError::Disconnected)
    }

    /// Probe, token grant, web authentication.
    async fn login(&mut self) -> Result<(), CoreError> {
        self.client.probe().await?;
        let token = self
            .client
            .request_token(&self.username, &self.password)
            .await?;
        let user = self.client.authenticate(&token.access_token).await?;

        self.session_cookie = self.client.session_cookie();
        if self.session_cookie.is_none() {
            warn!("authenticate response carried no session cookie");
        }
        debug!(user_id = user.id, "logged in");

        self.token = Some(token);
        self.user = Some(user);
        Ok(())
    }

    /// Log in again after the server dropped the session.
    async fn reauthenticate(&mut self) -> Result<(), CoreError> {
        info!("session dropped by the portal, logging in again");
        self.login().await?;
        self.state = ConnectionState::Connected;
        Ok(())
    }

    /// Apply the 401 policy to one response.
    ///
    /// `Ok(None)` means the portal dropped a live session and the state
    /// is now Disconnected; the caller decides whether to log in again.
    fn dispatch<T>(
        &mut self,
        result: Result<T, kodakhome_api::Error>,
    ) -> Result<Option<T>, CoreError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(kodakhome_api::Error::Unauthorized(failure))
                if failure.is_session_drop() && self.state == ConnectionState::Connected =>
            {
                warn!(%failure, "portal rejected the session");
                self.state = ConnectionState::Disconnected;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Devices, then every device's events. The snapshot is replaced only
    /// if everything succeeds.
    async fn full_refresh(&mut self) -> Result<(), CoreError> {
        let listing = self.fetch_devices().await?;

        let mut buckets = Vec::with_capacity(listing.devices.len());
        for device in &listing.devices {
            buckets.push(self.collect_events(&device.device_id).await?);
        }

        self.store.apply_snapshot(listing, buckets);
        debug!(
            devices = self.store.devices().len(),
            events = self.store.event_count(),
            "refresh complete"
        );
        Ok(())
    }

    async fn fetch_devices(&mut self) -> Result<DeviceListing, CoreError> {
        let mut reauthenticated = false;
        loop {
            let result = self.client.list_devices(self.access_token()?).await;
            match self.dispatch(result)? {
                Some(listing) => return Ok(listing),
                None if !reauthenticated => {
                    self.reauthenticate().await?;
                    reauthenticated = true;
                }
                None => return Err(CoreError::SessionExpired),
            }
        }
    }

    async fn fetch_event_page(
        &mut self,
        device_id: &str,
        page: u32,
    ) -> Result<EventPage, CoreError> {
        let mut reauthenticated = false;
        loop {
            let result = self
                .client
                .device_events(self.access_token()?, device_id, page)
                .await;
            match self.dispatch(result)? {
                Some(events) => return Ok(events),
                None if !reauthenticated => {
                    self.reauthenticate().await?;
                    reauthenticated = true;
                }
                None => return Err(CoreError::SessionExpired),
            }
        }
    }

    /// Walk every event page of one device into a fresh bucket.
    ///
    /// `total_pages` is re-read from each page. Pages reporting zero
    /// events contribute nothing but still advance the cursor.
    async fn collect_events(&mut self, device_id: &str) -> Result<DeviceEventBucket, CoreError> {
        let mut bucket = DeviceEventBucket::new(device_id);
        let mut page: u32 = 1;
        let mut total_pages: u32 = 1;

        while page <= total_pages {
            let events_page = self.fetch_event_page(device_id, page).await?;
            total_pages = events_page.total_pages;

            if events_page.total_events > 0 {
                let added = bucket.absorb(events_page.events);
                trace!(device_id, page, added, "absorbed event page");
            }
            page += 1;
        }

        debug!(device_id, events = bucket.len(), pages = total_pages, "device events collected");
        Ok(bucket)
    }
}

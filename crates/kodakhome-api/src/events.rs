// Device event endpoint
//
// Events are served one page at a time; each page reports the total page
// and event counts for the device. Walking the pages is the caller's job.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::SmartHomeClient;
use crate::error::Error;
use crate::models::{Envelope, EventPage};

impl SmartHomeClient {
    /// Fetch one page of a device's event history. Pages start at 1.
    ///
    /// `GET {web}/user/device/event?access_token=...&device_id=...&page=N`
    pub async fn device_events(
        &self,
        access_token: &SecretString,
        device_id: &str,
        page: u32,
    ) -> Result<EventPage, Error> {
        let url = self.endpoints().device_events()?;
        debug!(device_id, page, "fetching event page");

        let page_param = page.to_string();
        let builder = self.http().get(url).query(&[
            ("access_token", access_token.expose_secret()),
            ("device_id", device_id),
            ("page", page_param.as_str()),
        ]);
        let envelope: Envelope<EventPage> = self.send_json(builder).await?;

        debug!(
            device_id,
            page,
            total_pages = envelope.data.total_pages,
            total_events = envelope.data.total_events,
            "event page received"
        );
        Ok(envelope.data)
    }
}

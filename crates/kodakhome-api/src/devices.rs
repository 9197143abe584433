// Device listing endpoint

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::SmartHomeClient;
use crate::error::Error;
use crate::models::{DeviceListing, Envelope};

impl SmartHomeClient {
    /// List the devices bound to the account, with plan fields.
    ///
    /// `GET {web}/user/device?access_token=...`
    pub async fn list_devices(&self, access_token: &SecretString) -> Result<DeviceListing, Error> {
        let url = self.endpoints().devices()?;
        debug!("listing devices at {}", url);

        let builder = self
            .http()
            .get(url)
            .query(&[("access_token", access_token.expose_secret())]);
        let envelope: Envelope<DeviceListing> = self.send_json(builder).await?;

        debug!(count = envelope.data.devices.len(), "devices listed");
        Ok(envelope.data)
    }
}

// Portal authentication
//
// Capability probe, password grant, session authentication and logout.
// The authenticate endpoint sets the JSESSIONID cookie in the client's jar;
// later web requests carry the access token as a query parameter.

use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::auth::{CLIENT_AUTHORIZATION, CLIENT_MODEL};
use crate::client::SmartHomeClient;
use crate::error::Error;
use crate::models::{Envelope, RawToken, TokenInfo, UserProfile};

impl SmartHomeClient {
    /// Preflight the token endpoint.
    ///
    /// `OPTIONS {token}`. Any status other than 200 means the portal
    /// is not reachable in a usable state; no credentials are sent.
    pub async fn probe(&self) -> Result<(), Error> {
        let url = self.endpoints().token().clone();
        debug!("probing token endpoint at {}", url);

        let builder = self
            .http()
            .request(Method::OPTIONS, url)
            .header("Access-Control-Request-Method", "POST")
            .header("Access-Control-Request-Headers", "authorization");
        self.send_probe(builder).await
    }

    /// Exchange username/password for an access token.
    ///
    /// `POST {token}` with a `grant_type=password` form.
    pub async fn request_token(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<TokenInfo, Error> {
        let url = self.endpoints().token().clone();
        debug!("requesting token at {}", url);

        let form = [
            ("grant_type", "password"),
            ("username", username),
            ("password", password.expose_secret()),
            ("model", CLIENT_MODEL),
        ];
        let raw: RawToken = self.send_json(self.auth_request(url).form(&form)).await?;

        debug!("token granted");
        Ok(raw.into())
    }

    /// Trade the access token for a web session.
    ///
    /// `POST {web}/authenticate`. Returns the user record; the session
    /// cookie lands in the jar.
    pub async fn authenticate(&self, access_token: &SecretString) -> Result<UserProfile, Error> {
        let url = self.endpoints().authenticate()?;
        debug!("authenticating at {}", url);

        let form = [
            ("username", ""),
            ("password", access_token.expose_secret()),
            ("rememberme", "false"),
        ];
        let envelope: Envelope<UserProfile> =
            self.send_json(self.auth_request(url).form(&form)).await?;

        debug!(user_id = envelope.data.id, "session authenticated");
        Ok(envelope.data)
    }

    /// End the web session.
    ///
    /// `GET {web}/#/user/logout`. The response status is not inspected.
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.endpoints().logout()?;
        debug!("logging out at {}", url);

        let _resp = self.http().get(url).send().await?;

        debug!("logout complete");
        Ok(())
    }

    fn auth_request(&self, url: Url) -> reqwest::RequestBuilder {
        self.http()
            .post(url)
            .header(AUTHORIZATION, CLIENT_AUTHORIZATION)
    }
}

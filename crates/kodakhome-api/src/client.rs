// Portal HTTP client
//
// Wraps `reqwest::Client` with endpoint resolution, envelope unwrapping and
// the portal's status-code conventions. Endpoint groups (login, devices,
// events) are implemented as inherent methods in separate files to keep
// this module focused on transport mechanics.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::cookie::{CookieStore, Jar};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::auth::AuthFailure;
use crate::error::Error;
use crate::region::Endpoints;
use crate::transport::TransportConfig;

/// Name of the session cookie issued by the authenticate endpoint.
pub const SESSION_COOKIE: &str = "JSESSIONID";

const PREVIEW_CHARS: usize = 200;

/// Raw HTTP client for the Kodak Smart Home portal.
///
/// Stateless apart from the cookie jar: tokens are passed in by the caller
/// on every request. A 200 response is decoded, a 401 is classified into
/// an [`AuthFailure`], and any other status becomes [`Error::Http`].
pub struct SmartHomeClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    /// Cookie jar reference for reading back the session cookie.
    cookie_jar: Option<Arc<Jar>>,
}

impl SmartHomeClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (the authenticate step issues a session cookie).
    pub fn new(endpoints: Endpoints, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config.cookie_jar.clone();
        let http = config.build_client(&endpoints)?;
        Ok(Self {
            http,
            endpoints,
            cookie_jar,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// No cookie jar is attached, so [`session_cookie`](Self::session_cookie)
    /// always returns `None`.
    pub fn with_client(http: reqwest::Client, endpoints: Endpoints) -> Self {
        Self {
            http,
            endpoints,
            cookie_jar: None,
        }
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The resolved endpoint set.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// The `JSESSIONID` cookie currently held for the web application.
    pub fn session_cookie(&self) -> Option<SecretString> {
        let jar = self.cookie_jar.as_ref()?;
        let url = self.endpoints.authenticate().ok()?;
        let header = jar.cookies(&url)?;
        header
            .to_str()
            .ok()?
            .split(';')
            .map(str::trim)
            .find_map(|pair| pair.strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
            .map(|value| SecretString::from(value.to_owned()))
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a request and decode a 200 JSON body into `T`.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, Error> {
        let resp = builder.send().await?;
        let resp = check_status(resp).await?;
        let body = resp.text().await?;
        trace!(bytes = body.len(), "decoding response body");

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }

    /// Send a request whose only meaningful outcome is a 200 status.
    pub(crate) async fn send_probe(&self, builder: reqwest::RequestBuilder) -> Result<(), Error> {
        let resp = builder.send().await?;
        check_status(resp).await?;
        Ok(())
    }
}

/// Pass a 200 response through; turn anything else into an error.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status == StatusCode::OK {
        return Ok(resp);
    }

    let body = error_body(status, resp.text().await);

    if status == StatusCode::UNAUTHORIZED {
        let failure = AuthFailure::classify(&body);
        debug!(%failure, "request rejected with 401");
        return Err(Error::Unauthorized(failure));
    }

    debug!(status = status.as_u16(), "request failed");
    Err(Error::Http {
        status: status.as_u16(),
        body,
    })
}

/// Body of a rejected response; an unreadable body is logged and read as empty.
fn error_body<E: std::fmt::Display>(status: StatusCode, body: Result<String, E>) -> String {
    body.unwrap_or_else(|e| {
        debug!(status = status.as_u16(), error = %e, "failed to read error response body");
        String::new()
    })
}

fn preview(body: &str) -> String {
    body.chars().take(PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_error_body_reads_as_empty() {
        let body = error_body(StatusCode::UNAUTHORIZED, Err::<String, _>("connection reset"));
        assert!(body.is_empty());
        assert!(matches!(
            AuthFailure::classify(&body),
            AuthFailure::Unrecognized { .. }
        ));
    }

    #[test]
    fn readable_error_body_passes_through() {
        let body = error_body(
            StatusCode::UNAUTHORIZED,
            Ok::<_, String>(r#"{"msg":"Access Denied"}"#.to_owned()),
        );
        assert!(matches!(
            AuthFailure::classify(&body),
            AuthFailure::AccessDenied { .. }
        ));
    }
}

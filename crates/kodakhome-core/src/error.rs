// ── Core error types ──
//
// Session-level errors from kodakhome-core. Consumers never see raw
// reqwest or serde failures; the `From<kodakhome_api::Error>` impl folds
// transport-layer errors into the variants below.

use kodakhome_api::AuthFailure;
use kodakhome_api::region::UnsupportedRegion;
use kodakhome_api::Region;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to Kodak Smart Home at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Kodak Smart Home answered HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Authentication failed: {failure}")]
    AuthenticationFailed { failure: AuthFailure },

    #[error("Session expired -- re-authentication did not restore it")]
    SessionExpired,

    #[error("Kodak Smart Home session is not connected")]
    Disconnected,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("{region} is not a supported region (supported: {supported})")]
    UnsupportedRegion { region: String, supported: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` if new credentials (not a retry) are needed.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::SessionExpired
        )
    }
}

impl From<UnsupportedRegion> for CoreError {
    fn from(err: UnsupportedRegion) -> Self {
        let supported = Region::ALL
            .iter()
            .map(|r| r.code())
            .collect::<Vec<_>>()
            .join(", ");
        CoreError::UnsupportedRegion {
            region: err.0,
            supported,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<kodakhome_api::Error> for CoreError {
    fn from(err: kodakhome_api::Error) -> Self {
        match err {
            kodakhome_api::Error::Unauthorized(failure) => {
                CoreError::AuthenticationFailed { failure }
            }
            kodakhome_api::Error::Http { status, body } => CoreError::HttpStatus {
                status,
                message: body,
            },
            kodakhome_api::Error::Transport(ref e) => {
                let reason = if e.is_timeout() {
                    format!("request timed out: {e}")
                } else {
                    e.to_string()
                };
                CoreError::ConnectionFailed {
                    url: e
                        .url()
                        .map(|u| format!("{}{}", u.origin().ascii_serialization(), u.path()))
                        .unwrap_or_else(|| "<unknown>".into()),
                    reason,
                }
            }
            kodakhome_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            kodakhome_api::Error::InvalidHeader(e) => CoreError::Config {
                message: format!("Invalid header value: {e}"),
            },
            kodakhome_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            kodakhome_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

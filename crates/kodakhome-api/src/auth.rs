// 401 classification and fixed client credentials
//
// The portal answers 401 with several unrelated body shapes depending on
// which backend rejected the request. They are folded into one tagged
// variant here so callers never inspect raw JSON.

use serde_json::Value;
use thiserror::Error;

/// Browser model string the portal expects. Sent as the `User-Agent` on
/// every request and as the `model` field of the password grant.
pub const CLIENT_MODEL: &str = concat!(
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14_6) AppleWebKit/537.36 ",
    "(KHTML, like Gecko) Chrome/79.0.3945.79 Safari/537.36"
);

/// Fixed OAuth client credential of the web portal, sent with every
/// token and authenticate request.
pub const CLIENT_AUTHORIZATION: &str = concat!(
    "Basic MjFmOTk1M2VlZGE4N2I3MGRjMTE1ZTUyNDU2ODE1OWNjNmExNzI2MTNiOGUyMGMwMT",
    "UzMGZjNjg2ODc3Mzk2ZDo0ZDA5YmZlMWRhMjU0YmRjNzA4YjEzMGIxMzVmYzA2NjU4ODI2",
    "MWZjNTY2YWQzMWEyMGM1YjA5ZTY3NTFkNTgy"
);

const ACCESS_DENIED: &str = "Access Denied";

/// Why the portal answered 401.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// The password grant was rejected (`{"error": "invalid_grant"}`).
    /// Retrying with the same credentials cannot succeed.
    #[error("invalid grant")]
    InvalidGrant,

    /// The web backend dropped the session (`reason: "authError"`).
    #[error("auth error: {message}")]
    AuthError { message: String },

    /// Access to the resource was refused (`"Access Denied"`).
    #[error("access denied: {message}")]
    AccessDenied { message: String },

    /// A 401 body we do not know how to interpret.
    #[error("unrecognized 401 response: {body}")]
    Unrecognized { body: String },
}

impl AuthFailure {
    /// Classify a 401 response body.
    pub fn classify(body: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(body) else {
            if body.contains(ACCESS_DENIED) {
                return Self::AccessDenied {
                    message: body.trim().to_owned(),
                };
            }
            return Self::Unrecognized {
                body: body.to_owned(),
            };
        };

        if value.get("error").and_then(Value::as_str) == Some("invalid_grant") {
            return Self::InvalidGrant;
        }

        if value.get("reason").and_then(Value::as_str) == Some("authError")
            || value.get("authError").is_some()
        {
            return Self::AuthError {
                message: message_of(&value).unwrap_or_default(),
            };
        }

        if let Some(message) = message_of(&value) {
            if message.contains(ACCESS_DENIED) {
                return Self::AccessDenied { message };
            }
        }

        Self::Unrecognized {
            body: body.to_owned(),
        }
    }

    /// Whether the server dropped a session that re-authentication may restore.
    pub fn is_session_drop(&self) -> bool {
        matches!(self, Self::AuthError { .. } | Self::AccessDenied { .. })
    }
}

/// First human-readable message found in a 401 body.
fn message_of(value: &Value) -> Option<String> {
    ["message", "msg", "error_description"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_owned)
        .or_else(|| match value.get("authError")? {
            Value::String(s) => Some(s.clone()),
            Value::Object(inner) => inner
                .get("message")
                .or_else(|| inner.get("reason"))
                .and_then(Value::as_str)
                .map(str::to_owned),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_invalid_grant() {
        let body = r#"{"error":"invalid_grant","error_description":"Bad credentials"}"#;
        assert_eq!(AuthFailure::classify(body), AuthFailure::InvalidGrant);
    }

    #[test]
    fn classifies_auth_error_reason() {
        let body = r#"{"status":401,"reason":"authError","msg":"token expired"}"#;
        assert_eq!(
            AuthFailure::classify(body),
            AuthFailure::AuthError {
                message: "token expired".into()
            }
        );
    }

    #[test]
    fn classifies_auth_error_key() {
        let body = r#"{"authError":{"reason":"session timeout"}}"#;
        assert_eq!(
            AuthFailure::classify(body),
            AuthFailure::AuthError {
                message: "session timeout".into()
            }
        );
    }

    #[test]
    fn classifies_access_denied_json_and_text() {
        let json = r#"{"status":401,"msg":"Access Denied"}"#;
        assert!(matches!(
            AuthFailure::classify(json),
            AuthFailure::AccessDenied { .. }
        ));

        let text = "<html>Access Denied</html>";
        assert_eq!(
            AuthFailure::classify(text),
            AuthFailure::AccessDenied {
                message: text.into()
            }
        );
    }

    #[test]
    fn unknown_shapes_are_unrecognized() {
        let body = r#"{"status":401,"msg":"nope"}"#;
        assert_eq!(
            AuthFailure::classify(body),
            AuthFailure::Unrecognized { body: body.into() }
        );
        assert!(matches!(
            AuthFailure::classify(""),
            AuthFailure::Unrecognized { .. }
        ));
    }

    #[test]
    fn only_session_drops_are_recoverable() {
        assert!(!AuthFailure::InvalidGrant.is_session_drop());
        assert!(
            AuthFailure::AccessDenied {
                message: String::new()
            }
            .is_session_drop()
        );
        assert!(
            !AuthFailure::Unrecognized {
                body: String::new()
            }
            .is_session_drop()
        );
    }
}

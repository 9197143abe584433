//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use kodakhome_config::ConfigError;
use kodakhome_core::{AuthFailure, CoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to Kodak Smart Home at {url}")]
    #[diagnostic(
        code(kodakhome::connection_failed),
        help(
            "Check your network connection and that the portal is up.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(kodakhome::timeout),
        help("Increase timeout with --timeout or retry later.")
    )]
    Timeout,

    #[error("The portal answered HTTP {status}")]
    #[diagnostic(code(kodakhome::http_status), help("Response: {message}"))]
    HttpStatus { status: u16, message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {reason}")]
    #[diagnostic(
        code(kodakhome::auth_failed),
        help(
            "Verify the account e-mail and password.\n\
             Run: kodakhome config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String, reason: String },

    #[error("Session expired and could not be restored")]
    #[diagnostic(
        code(kodakhome::session_expired),
        help("The portal kept rejecting the session. Try again in a moment.")
    )]
    SessionExpired,

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(kodakhome::no_credentials),
        help(
            "Configure credentials with: kodakhome config init\n\
             Or set KODAKHOME_USERNAME and KODAKHOME_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(kodakhome::not_found),
        help("Run: kodakhome {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(kodakhome::validation))]
    Validation { field: String, reason: String },

    #[error("Region '{region}' is not supported")]
    #[diagnostic(
        code(kodakhome::unsupported_region),
        help("Supported regions: {supported}")
    )]
    UnsupportedRegion { region: String, supported: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(kodakhome::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: kodakhome config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(kodakhome::no_config),
        help(
            "Create one with: kodakhome config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(kodakhome::config))]
    Config(Box<ConfigError>),

    // ── Internal ─────────────────────────────────────────────────────

    #[error("Unexpected portal response: {message}")]
    #[diagnostic(code(kodakhome::internal))]
    Internal { message: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(kodakhome::render))]
    Render(String),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::SessionExpired | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::UnsupportedRegion { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

/// Attach the active profile name to an auth failure.
pub fn from_core(err: CoreError, profile: &str) -> CliError {
    match err {
        CoreError::AuthenticationFailed { failure } => CliError::AuthFailed {
            profile: profile.into(),
            reason: match failure {
                AuthFailure::InvalidGrant => "wrong e-mail or password".into(),
                other => other.to_string(),
            },
        },
        other => other.into(),
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => {
                if reason.starts_with("request timed out") {
                    CliError::Timeout
                } else {
                    CliError::ConnectionFailed { url, reason }
                }
            }

            CoreError::HttpStatus { status, message } => CliError::HttpStatus { status, message },

            CoreError::AuthenticationFailed { failure } => CliError::AuthFailed {
                profile: "default".into(),
                reason: failure.to_string(),
            },

            CoreError::SessionExpired => CliError::SessionExpired,

            CoreError::Disconnected => CliError::ConnectionFailed {
                url: "(disconnected)".into(),
                reason: "the session is not connected".into(),
            },

            CoreError::UnsupportedRegion { region, supported } => {
                CliError::UnsupportedRegion { region, supported }
            }

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (CoreError::SessionExpired, exit_code::AUTH),
            (CoreError::Disconnected, exit_code::CONNECTION),
            (
                CoreError::UnsupportedRegion {
                    region: "US".into(),
                    supported: "EU".into(),
                },
                exit_code::USAGE,
            ),
            (
                CoreError::HttpStatus {
                    status: 500,
                    message: "boom".into(),
                },
                exit_code::GENERAL,
            ),
            (
                CoreError::ConnectionFailed {
                    url: "https://app-eu.kodaksmarthome.com/web".into(),
                    reason: "request timed out: deadline".into(),
                },
                exit_code::TIMEOUT,
            ),
        ];

        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn invalid_grant_names_the_profile() {
        let err = from_core(
            CoreError::AuthenticationFailed {
                failure: AuthFailure::InvalidGrant,
            },
            "home",
        );
        assert_eq!(err.exit_code(), exit_code::AUTH);
        assert!(matches!(err, CliError::AuthFailed { ref profile, .. } if profile == "home"));
    }
}

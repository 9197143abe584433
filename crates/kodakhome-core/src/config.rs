// ── Runtime session configuration ──
//
// These types describe *how* to reach the Kodak Smart Home portal.
// They carry credentials and connection tuning, but never touch disk.
// The CLI constructs a `SessionConfig` and hands it in.

use std::time::Duration;

use kodakhome_api::{Endpoints, TlsMode};
use secrecy::SecretString;

/// Region used when none is given.
pub const DEFAULT_REGION: &str = "EU";

/// Request timeout used when none is given.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict). The portal uses public certificates.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification. Only useful behind an intercepting proxy.
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Configuration for one portal session.
///
/// Built by the CLI, passed to `SmartHomeSession` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Account e-mail / username.
    pub username: String,
    /// Account password.
    pub password: SecretString,
    /// Region code, validated when the session is built.
    pub region: String,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Explicit endpoints, overriding the region's built-in table.
    pub endpoints: Option<Endpoints>,
}

impl SessionConfig {
    /// Config for `username`/`password` in the default region.
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
            region: DEFAULT_REGION.into(),
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            endpoints: None,
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }
}

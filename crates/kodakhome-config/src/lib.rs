//! Configuration for the kodakhome CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `kodakhome_core::SessionConfig`. The CLI adds
//! `GlobalOpts`-aware overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use kodakhome_core::config::DEFAULT_REGION;
use kodakhome_core::{Endpoints, SessionConfig, TlsVerification};

/// Keyring service name; entries are keyed `<profile>/password`.
pub const KEYRING_SERVICE: &str = "kodakhome";

/// Environment variable consulted for the username when a profile has none.
pub const USERNAME_ENV: &str = "KODAKHOME_USERNAME";

/// Environment variable consulted for the password.
pub const PASSWORD_ENV: &str = "KODAKHOME_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Profile name to use when none is given on the command line.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named account profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Account e-mail.
    pub username: Option<String>,

    /// Password (plaintext -- prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Region code (only "EU" is served today).
    #[serde(default = "default_region")]
    pub region: String,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Portal web base, replacing the region's (proxies, test servers).
    pub web_url: Option<String>,

    /// OAuth token URL, replacing the region's.
    pub token_url: Option<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            password_env: None,
            region: default_region(),
            ca_cert: None,
            insecure: None,
            timeout: None,
            web_url: None,
            token_url: None,
        }
    }
}

fn default_region() -> String {
    DEFAULT_REGION.into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "kodakhome", "kodakhome").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("kodakhome");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from `path` + environment.
///
/// A missing file is not an error; defaults and `KODAKHOME_*` variables
/// still apply. Nested keys use a double underscore
/// (`KODAKHOME_DEFAULTS__OUTPUT=json`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("KODAKHOME_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parent dirs.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn keyring_lookup(profile_name: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
        .ok()?
        .get_password()
        .ok()
}

/// Resolve the account username: profile first, then `KODAKHOME_USERNAME`.
pub fn resolve_username(profile: &Profile, profile_name: &str) -> Result<String, ConfigError> {
    resolve_username_with(profile, profile_name, env_lookup)
}

fn resolve_username_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    profile
        .username
        .clone()
        .or_else(|| env(USERNAME_ENV))
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })
}

/// Resolve the account password.
///
/// Order: the profile's `password_env` variable, `KODAKHOME_PASSWORD`,
/// the system keyring, plaintext in the profile.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    resolve_password_with(profile, profile_name, env_lookup, keyring_lookup)
}

fn resolve_password_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(pw) = profile.password_env.as_deref().and_then(&env) {
        return Ok(SecretString::from(pw));
    }

    // 2. Well-known env var
    if let Some(pw) = env(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    // 3. System keyring
    if let Some(pw) = keyring(profile_name) {
        return Ok(SecretString::from(pw));
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))?;
    entry.set_password(password.expose_secret())?;
    Ok(())
}

/// Build a `SessionConfig` from a profile -- no CLI flag overrides.
pub fn profile_to_session_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<SessionConfig, ConfigError> {
    let username = resolve_username(profile, profile_name)?;
    let password = resolve_password(profile, profile_name)?;
    build_session_config(profile, username, password)
}

/// Endpoint override from `web_url` + `token_url`; both or neither.
pub fn profile_endpoints(profile: &Profile) -> Result<Option<Endpoints>, ConfigError> {
    match (&profile.web_url, &profile.token_url) {
        (None, None) => Ok(None),
        (Some(web), Some(token)) => Endpoints::new(web, token)
            .map(Some)
            .map_err(|e| ConfigError::Validation {
                field: "web_url".into(),
                reason: e.to_string(),
            }),
        _ => Err(ConfigError::Validation {
            field: "web_url".into(),
            reason: "web_url and token_url must be set together".into(),
        }),
    }
}

fn build_session_config(
    profile: &Profile,
    username: String,
    password: SecretString,
) -> Result<SessionConfig, ConfigError> {
    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = SessionConfig::new(username, password).with_region(profile.region.clone());
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or_else(default_timeout));
    config.endpoints = profile_endpoints(profile)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn profile() -> Profile {
        Profile {
            username: Some("my@email.com".into()),
            password: Some("plain".into()),
            region: default_region(),
            ..Profile::default()
        }
    }

    #[test]
    fn load_config_from_reads_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "home"

[defaults]
output = "json"

[profiles.home]
username = "my@email.com"
password_env = "HOME_PW"
timeout = 10
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();

        assert_eq!(cfg.active_profile_name(), "home");
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.timeout, 30);
        let home = &cfg.profiles["home"];
        assert_eq!(home.region, "EU");
        assert_eq!(home.password_env.as_deref(), Some("HOME_PW"));
        assert_eq!(home.timeout, Some(10));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.active_profile_name(), "default");
        assert_eq!(cfg.defaults.output, "table");
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert("default".into(), profile());
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(
            loaded.profiles["default"].username.as_deref(),
            Some("my@email.com")
        );
    }

    #[test]
    fn password_resolution_order() {
        let mut p = profile();
        p.password_env = Some("MY_PW".into());

        let env = |name: &str| match name {
            "MY_PW" => Some("from-profile-env".to_string()),
            PASSWORD_ENV => Some("from-global-env".to_string()),
            _ => None,
        };
        let keyring = |_: &str| Some("from-keyring".to_string());

        let pw = resolve_password_with(&p, "default", env, keyring).unwrap();
        assert_eq!(pw.expose_secret(), "from-profile-env");

        p.password_env = None;
        let pw = resolve_password_with(&p, "default", env, keyring).unwrap();
        assert_eq!(pw.expose_secret(), "from-global-env");

        let pw = resolve_password_with(&p, "default", no_env, keyring).unwrap();
        assert_eq!(pw.expose_secret(), "from-keyring");

        let pw = resolve_password_with(&p, "default", no_env, no_env).unwrap();
        assert_eq!(pw.expose_secret(), "plain");

        p.password = None;
        let err = resolve_password_with(&p, "default", no_env, no_env).unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { ref profile } if profile == "default"));
    }

    #[test]
    fn username_falls_back_to_env() {
        let mut p = profile();
        p.username = None;
        let env = |name: &str| (name == USERNAME_ENV).then(|| "env@email.com".to_string());

        assert_eq!(resolve_username_with(&p, "default", env).unwrap(), "env@email.com");
        assert!(resolve_username_with(&p, "default", no_env).is_err());
    }

    #[test]
    fn session_config_carries_profile_settings() {
        let mut p = profile();
        p.timeout = Some(5);
        p.ca_cert = Some(PathBuf::from("/etc/ssl/proxy.pem"));

        let cfg = build_session_config(&p, "my@email.com".into(), SecretString::from("pw".to_string()))
            .unwrap();

        assert_eq!(cfg.region, "EU");
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.tls, TlsVerification::CustomCa(PathBuf::from("/etc/ssl/proxy.pem")));
        assert!(cfg.endpoints.is_none());

        p.insecure = Some(true);
        let cfg = build_session_config(&p, "u".into(), SecretString::from("pw".to_string())).unwrap();
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn endpoint_override_needs_both_urls() {
        let mut p = profile();
        assert!(profile_endpoints(&p).unwrap().is_none());

        p.web_url = Some("http://127.0.0.1:8080/web/".into());
        assert!(matches!(
            profile_endpoints(&p),
            Err(ConfigError::Validation { .. })
        ));

        p.token_url = Some("http://127.0.0.1:8080/v1/oauth/token".into());
        let endpoints = profile_endpoints(&p).unwrap().unwrap();
        assert_eq!(endpoints.web().as_str(), "http://127.0.0.1:8080/web");
    }
}

//! CLI configuration -- thin wrapper around `kodakhome_config`.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--username, --region, --timeout, ...).

use std::path::PathBuf;

use kodakhome_core::SessionConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use kodakhome_config::{Config, Defaults, Profile};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Config file in effect: `--config` if given, else the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(kodakhome_config::config_path)
}

/// Load the config file in effect, falling back to defaults.
pub fn load_config_or_default(global: &GlobalOpts) -> Config {
    kodakhome_config::load_config_from(&config_path(global)).unwrap_or_default()
}

/// Write `cfg` to the config file in effect.
pub fn save_config(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    kodakhome_config::save_config_to(cfg, &config_path(global))?;
    Ok(())
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// Build the `SessionConfig` for a portal-bound command.
///
/// With no matching profile, a session can still be built from
/// `--username` plus a password from the environment or keyring.
pub fn resolve_session_config(global: &GlobalOpts) -> Result<(SessionConfig, String), CliError> {
    let cfg = load_config_or_default(global);
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        let session = resolve_profile(profile, &profile_name, &cfg.defaults, global)?;
        return Ok((session, profile_name));
    }

    if global.profile.is_some() {
        let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
        available.sort();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    }

    if global.username.is_none() {
        return Err(CliError::NoConfig {
            path: config_path(global).display().to_string(),
        });
    }

    let session = resolve_profile(&Profile::default(), &profile_name, &cfg.defaults, global)?;
    Ok((session, profile_name))
}

/// Translate a `Profile` + global flags into a `SessionConfig`.
///
/// CLI flag overrides take priority over profile values; the shared
/// crate then resolves credentials, TLS and endpoints.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<SessionConfig, CliError> {
    let mut effective = profile.clone();

    // 1. Username (flag > profile > env)
    if let Some(ref username) = global.username {
        effective.username = Some(username.clone());
    }

    // 2. Region (flag > profile)
    if let Some(ref region) = global.region {
        effective.region.clone_from(region);
    }

    // 3. TLS verification
    if global.insecure {
        effective.insecure = Some(true);
    }

    // 4. Timeout (flag > profile > defaults)
    effective.timeout = Some(
        global
            .timeout
            .or(profile.timeout)
            .unwrap_or(defaults.timeout),
    );

    Ok(kodakhome_config::profile_to_session_config(
        &effective,
        profile_name,
    )?)
}

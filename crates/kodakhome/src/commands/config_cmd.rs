//! Config subcommand handlers.

use dialoguer::{Input, Select};
use secrecy::{ExposeSecret, SecretString};

use kodakhome_core::Region;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const MASK: &str = "********";

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_password() -> Result<SecretString, CliError> {
    let pass = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
    if pass.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(SecretString::from(pass))
}

fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
    names.sort();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}

/// Replace every stored plaintext password with a mask.
fn redact(cfg: &mut Config) {
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(MASK.into());
        }
    }
}

fn detail(cfg: &Config) -> String {
    let mut lines = vec![format!("Default profile: {}", cfg.active_profile_name())];
    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        lines.push(String::new());
        lines.push(format!("[{name}]"));
        lines.push(format!("  username: {}", p.username.as_deref().unwrap_or("-")));
        lines.push(format!("  region:   {}", p.region));
        let password = match (&p.password, &p.password_env) {
            (Some(_), _) => MASK.to_owned(),
            (None, Some(var)) => format!("${var}"),
            (None, None) => "(keyring)".to_owned(),
        };
        lines.push(format!("  password: {password}"));
        if let Some(url) = &p.web_url {
            lines.push(format!("  web_url:  {url}"));
        }
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path(global);
            eprintln!("Kodak Smart Home: configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let mut cfg = config::load_config_or_default(global);

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default(config::active_profile_name(global, &cfg))
                .interact_text()
                .map_err(prompt_err)?;

            // 2. Account
            let username: String = Input::new()
                .with_prompt("Account e-mail")
                .interact_text()
                .map_err(prompt_err)?;
            if username.is_empty() {
                return Err(CliError::Validation {
                    field: "username".into(),
                    reason: "e-mail cannot be empty".into(),
                });
            }

            // 3. Region
            let regions: Vec<&str> = Region::ALL.iter().map(|r| r.code()).collect();
            let region_idx = Select::new()
                .with_prompt("Region")
                .items(&regions)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            // 4. Password and where it lives
            let password = prompt_password()?;
            let store_choices = &[
                "Store password in system keyring (recommended)",
                "Save to config file (plaintext)",
            ];
            let store_selection = Select::new()
                .with_prompt("Where to store the password?")
                .items(store_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let password_field = if store_selection == 0 {
                kodakhome_config::store_password(&profile_name, &password)?;
                eprintln!("   ✓ Password stored in system keyring");
                None
            } else {
                Some(password.expose_secret().to_owned())
            };

            let profile = Profile {
                username: Some(username),
                password: password_field,
                region: regions[region_idx].to_owned(),
                ..Profile::default()
            };
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());

            config::save_config(&cfg, global)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: kodakhome devices");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let mut cfg = config::load_config_or_default(global);
            redact(&mut cfg);
            let out = output::render_single(&global.output, &cfg, detail, |c| {
                c.active_profile_name().to_owned()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path(global).display().to_string(), false);
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword => {
            let cfg = config::load_config_or_default(global);
            let profile_name = config::active_profile_name(global, &cfg);

            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    available: available_profiles(&cfg),
                    name: profile_name,
                });
            }

            let password = prompt_password()?;
            kodakhome_config::store_password(&profile_name, &password)?;
            eprintln!("✓ Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_masks_plaintext_passwords_only() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                username: Some("me@example.com".into()),
                password: Some("hunter2".into()),
                ..Profile::default()
            },
        );
        cfg.profiles.insert("work".into(), Profile::default());

        redact(&mut cfg);

        assert_eq!(cfg.profiles["home"].password.as_deref(), Some(MASK));
        assert!(cfg.profiles["work"].password.is_none());
        let shown = detail(&cfg);
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("[home]"));
        assert!(shown.contains("(keyring)"));
    }

    #[test]
    fn available_profiles_lists_sorted_names() {
        let mut cfg = Config::default();
        assert_eq!(available_profiles(&cfg), "(none)");
        cfg.profiles.insert("b".into(), Profile::default());
        cfg.profiles.insert("a".into(), Profile::default());
        assert_eq!(available_profiles(&cfg), "a, b");
    }
}

//! Config subcommand handlers.

use std::collections::HashMap;
use std::fmt::Write;
use std::str::FromStr;

use dialoguer::Input;

use sensorfeed_core::{Channel, DEFAULT_API_URL};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Defaults, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config as TOML-like text for the table view.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "poll_interval_ms = {}", cfg.defaults.poll_interval_ms);
    let _ = writeln!(out, "notifications = {}", cfg.defaults.notifications);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_url = \"{}\"", p.api_url);
        let optional = [
            ("capacity", p.capacity.map(|v| v.to_string())),
            ("poll_limit", p.poll_limit.map(|v| v.to_string())),
            ("poll_interval_ms", p.poll_interval_ms.map(|v| v.to_string())),
            ("alert_limit", p.alert_limit.map(|v| v.to_string())),
            ("max_event_rate", p.max_event_rate.map(|v| v.to_string())),
            ("stale_after", p.stale_after.map(|v| v.to_string())),
            ("timeout", p.timeout.map(|v| v.to_string())),
            ("insecure", p.insecure.map(|v| v.to_string())),
            (
                "ca_cert",
                p.ca_cert.as_ref().map(|v| format!("\"{}\"", v.display())),
            ),
            ("notifications", p.notifications.map(|v| v.to_string())),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                let _ = writeln!(out, "{key} = {value}");
            }
        }
        let _ = writeln!(out, "[profiles.{name}.devices]");
        let _ = writeln!(out, "microphone = \"{}\"", p.devices.microphone);
        let _ = writeln!(out, "distance = \"{}\"", p.devices.distance);
        let _ = writeln!(out, "motion = \"{}\"", p.devices.motion);
    }

    out
}

/// Delegate to the shared config crate's save function.
fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn parse<T: FromStr>(key: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: format!("must be {expected}"),
    })
}

const VALID_KEYS: &str = "api_url, capacity, poll_limit, poll_interval_ms, alert_limit, \
     max_event_rate, stale_after, timeout, insecure, ca_cert, notifications, \
     devices.microphone, devices.distance, devices.motion";

/// Apply `key = value` to a profile.
fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "api_url" | "api-url" => {
            url::Url::parse(&value).map_err(|e| CliError::Validation {
                field: "api_url".into(),
                reason: format!("invalid URL: {e}"),
            })?;
            profile.api_url = value;
        }
        "capacity" => profile.capacity = Some(parse(key, &value, "a positive number")?),
        "poll_limit" | "poll-limit" => {
            profile.poll_limit = Some(parse(key, &value, "a positive number")?);
        }
        "poll_interval_ms" | "interval" => {
            profile.poll_interval_ms = Some(parse(key, &value, "a number (milliseconds)")?);
        }
        "alert_limit" | "alert-limit" => {
            profile.alert_limit = Some(parse(key, &value, "a positive number")?);
        }
        "max_event_rate" | "max-event-rate" => {
            profile.max_event_rate = Some(parse(key, &value, "a number (readings per second)")?);
        }
        "stale_after" | "stale-after" => {
            profile.stale_after = Some(parse(key, &value, "a number of failed polls")?);
        }
        "timeout" => profile.timeout = Some(parse(key, &value, "a number (seconds)")?),
        "insecure" => profile.insecure = Some(parse(key, &value, "'true' or 'false'")?),
        "notifications" => {
            profile.notifications = Some(parse(key, &value, "'true' or 'false'")?);
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        other => {
            let device = other
                .strip_prefix("devices.")
                .and_then(|c| Channel::from_str(c).ok());
            match device {
                Some(Channel::Microphone) => profile.devices.microphone = value,
                Some(Channel::Distance) => profile.devices.distance = value,
                Some(Channel::Motion) => profile.devices.motion = value,
                None => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!("unknown config key '{other}'. Valid keys: {VALID_KEYS}"),
                    });
                }
            }
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("sensorfeed configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let api_url: String = Input::new()
                .with_prompt("Sensor API URL")
                .default(DEFAULT_API_URL.into())
                .interact_text()
                .map_err(prompt_err)?;

            let mut profile = Profile::default();
            set_key(&mut profile, "api_url", api_url)?;

            for channel in Channel::ALL {
                let device: String = Input::new()
                    .with_prompt(format!("{channel} device id"))
                    .default(channel.default_device_id().into())
                    .interact_text()
                    .map_err(prompt_err)?;
                set_key(&mut profile, &format!("devices.{channel}"), device)?;
            }

            let interval: String = Input::new()
                .with_prompt("Poll interval (ms)")
                .default(Defaults::default().poll_interval_ms.to_string())
                .interact_text()
                .map_err(prompt_err)?;
            set_key(&mut profile, "poll_interval_ms", interval)?;

            let mut profiles = HashMap::new();
            profiles.insert(profile_name.clone(), profile);

            let cfg = Config {
                default_profile: Some(profile_name.clone()),
                defaults: Defaults::default(),
                profiles,
            };
            save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: sensorfeed status");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                config::config_path().display().to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), false);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_key(profile, &key, value)?;
            sensorfeed_config::profile_to_monitor_config(profile, &cfg.defaults)?;

            save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: sensorfeed config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_numeric_and_device_keys() {
        let mut p = Profile::default();
        set_key(&mut p, "capacity", "60".into()).unwrap();
        set_key(&mut p, "interval", "1500".into()).unwrap();
        set_key(&mut p, "devices.motion", "ESP_010".into()).unwrap();
        set_key(&mut p, "stale_after", "5".into()).unwrap();
        assert_eq!(p.stale_after, Some(5));
        assert_eq!(p.capacity, Some(60));
        assert_eq!(p.poll_interval_ms, Some(1500));
        assert_eq!(p.devices.motion, "ESP_010");
    }

    #[test]
    fn rejects_bad_values_and_keys() {
        let mut p = Profile::default();
        assert!(matches!(
            set_key(&mut p, "capacity", "lots".into()),
            Err(CliError::Validation { ref field, .. }) if field == "capacity"
        ));
        assert!(set_key(&mut p, "api_url", "not a url".into()).is_err());
        assert!(set_key(&mut p, "devices.thermometer", "x".into()).is_err());
        assert!(set_key(&mut p, "site", "x".into()).is_err());
    }

    #[test]
    fn formatted_config_lists_profiles_sorted() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "b".into(),
            Profile {
                capacity: Some(10),
                ..Profile::default()
            },
        );
        cfg.profiles.insert("a".into(), Profile::default());
        let text = format_config(&cfg);
        let a = text.find("[profiles.a]").unwrap();
        let b = text.find("[profiles.b]").unwrap();
        assert!(a < b);
        assert!(text.contains("capacity = 10"));
        assert!(text.contains("motion = \"ESP_004\""));
    }
}

//! Profile resolution: config file + CLI flag overrides into a
//! `MonitorConfig`.
//!
//! TOML types, loading and saving live in `sensorfeed-config`; this module
//! only applies what was given on the command line.

use sensorfeed_core::{MonitorConfig, TlsVerification};

pub use sensorfeed_config::{
    Config, Defaults, Profile, config_path, load_config, load_config_or_default, save_config,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names, or "(none)".
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    names.sort();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}

/// Load config and build the `MonitorConfig` for the active profile.
///
/// An explicitly requested profile must exist. Without one, a missing
/// default profile falls back to built-in settings so the CLI works with
/// no config file at all.
pub fn build_monitor_config(global: &GlobalOpts) -> Result<(MonitorConfig, bool), CliError> {
    let cfg = load_config()?;
    let name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&name) {
        Some(p) => p.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                available: available_profiles(&cfg),
                name,
            });
        }
        None => Profile::default(),
    };

    let notifications = sensorfeed_config::notifications_enabled(&profile, &cfg.defaults);
    let monitor = resolve_profile(&profile, &cfg.defaults, global)?;
    Ok((monitor, notifications))
}

/// Translate a profile + global flags into a `MonitorConfig`.
///
/// Flags win over the profile, which wins over `[defaults]`.
pub fn resolve_profile(
    profile: &Profile,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<MonitorConfig, CliError> {
    let mut profile = profile.clone();

    // 1. Endpoint (flag > env > profile)
    if let Some(ref url) = global.api_url {
        profile.api_url.clone_from(url);
    }

    // 2. Timing
    if let Some(ms) = global.interval {
        profile.poll_interval_ms = Some(ms);
    }
    if let Some(secs) = global.timeout {
        profile.timeout = Some(secs);
    }

    let mut monitor = sensorfeed_config::profile_to_monitor_config(&profile, defaults)?;

    // 3. TLS
    if global.insecure {
        monitor.tls = TlsVerification::DangerAcceptInvalid;
    }

    Ok(monitor)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["sensorfeed"];
        argv.extend_from_slice(args);
        argv.push("status");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn flag_profile_wins_over_default() {
        let cfg = Config {
            default_profile: Some("home".into()),
            ..Config::default()
        };
        assert_eq!(active_profile_name(&global(&[]), &cfg), "home");
        assert_eq!(active_profile_name(&global(&["-p", "lab"]), &cfg), "lab");
    }

    #[test]
    fn flags_override_profile() {
        let profile = Profile {
            api_url: "http://profile.local/api/sensormanager".into(),
            poll_interval_ms: Some(9000),
            timeout: Some(20),
            ..Profile::default()
        };
        let g = global(&[
            "--api-url",
            "http://flag.local/api/sensormanager",
            "--interval",
            "250",
            "--timeout",
            "3",
            "-k",
        ]);

        let cfg = resolve_profile(&profile, &Defaults::default(), &g).unwrap();
        assert_eq!(cfg.api_url.host_str(), Some("flag.local"));
        assert_eq!(cfg.poll_interval, Duration::from_millis(250));
        assert_eq!(cfg.timeout, Duration::from_secs(3));
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn bad_url_flag_is_a_validation_error() {
        let g = global(&["--api-url", "::nope::"]);
        let err = resolve_profile(&Profile::default(), &Defaults::default(), &g).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }), "got: {err:?}");
    }

    #[test]
    fn available_profiles_are_sorted() {
        let mut cfg = Config::default();
        assert_eq!(available_profiles(&cfg), "(none)");
        cfg.profiles.insert("zeta".into(), Profile::default());
        cfg.profiles.insert("alpha".into(), Profile::default());
        assert_eq!(available_profiles(&cfg), "alpha, zeta");
    }
}

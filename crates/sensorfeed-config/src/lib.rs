//! Shared configuration for sensorfeed front ends.
//!
//! TOML profiles with environment overrides, and translation to
//! `sensorfeed_core::MonitorConfig`. The CLI layers its flag overrides on
//! top of what this crate resolves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sensorfeed_core::{
    DEFAULT_ALERT_LIMIT, DEFAULT_API_URL, DEFAULT_POLL_LIMIT, DeviceIds, MAX_POINTS, MonitorConfig,
    TlsVerification,
};

/// Prefix for environment overrides, e.g. `SENSORFEED_DEFAULTS__TIMEOUT=5`.
pub const ENV_PREFIX: &str = "SENSORFEED_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

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

    /// Named deployment profiles.
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

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Delay between ticks in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Dispatch local notifications for new alerts.
    #[serde(default = "default_true")]
    pub notifications: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            poll_interval_ms: default_poll_interval_ms(),
            notifications: true,
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
    10
}
fn default_poll_interval_ms() -> u64 {
    5000
}
fn default_true() -> bool {
    true
}
fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}

/// Device id per channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Devices {
    #[serde(default = "default_microphone")]
    pub microphone: String,
    #[serde(default = "default_distance")]
    pub distance: String,
    #[serde(default = "default_motion")]
    pub motion: String,
}

impl Default for Devices {
    fn default() -> Self {
        let ids = DeviceIds::default();
        Self {
            microphone: ids.microphone,
            distance: ids.distance,
            motion: ids.motion,
        }
    }
}

fn default_microphone() -> String {
    Devices::default().microphone
}
fn default_distance() -> String {
    Devices::default().distance
}
fn default_motion() -> String {
    Devices::default().motion
}

/// A named deployment profile. Unset values fall back to `[defaults]`
/// and then to built-in defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// API root, e.g. "https://host/api/sensormanager".
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub devices: Devices,

    /// Readings kept per channel.
    pub capacity: Option<usize>,

    /// Readings requested per incremental poll.
    pub poll_limit: Option<u32>,

    /// Override the tick interval (milliseconds).
    pub poll_interval_ms: Option<u64>,

    /// Alerts requested per channel.
    pub alert_limit: Option<u32>,

    /// Expected peak readings per second per channel.
    pub max_event_rate: Option<f64>,

    /// Consecutive failed polls before a channel counts as stale (0 disables).
    pub stale_after: Option<u32>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override notification setting.
    pub notifications: Option<bool>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            devices: Devices::default(),
            capacity: None,
            poll_limit: None,
            poll_interval_ms: None,
            alert_limit: None,
            max_event_rate: None,
            stale_after: None,
            timeout: None,
            insecure: None,
            ca_cert: None,
            notifications: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "sensorfeed", "sensorfeed").map_or_else(
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
    p.push("sensorfeed");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from an explicit file, layered as defaults → file → env.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `MonitorConfig` from a profile and the global defaults.
///
/// The result is validated, so out-of-range polling parameters surface
/// here rather than when the monitor starts.
pub fn profile_to_monitor_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<MonitorConfig, ConfigError> {
    let api_url: url::Url = profile
        .api_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL: {}", profile.api_url),
        })?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut cfg = MonitorConfig::new(api_url);
    cfg.devices = DeviceIds {
        microphone: profile.devices.microphone.clone(),
        distance: profile.devices.distance.clone(),
        motion: profile.devices.motion.clone(),
    };
    cfg.capacity = profile.capacity.unwrap_or(MAX_POINTS);
    cfg.poll_limit = profile.poll_limit.unwrap_or(DEFAULT_POLL_LIMIT);
    cfg.poll_interval =
        Duration::from_millis(profile.poll_interval_ms.unwrap_or(defaults.poll_interval_ms));
    cfg.alert_limit = profile.alert_limit.unwrap_or(DEFAULT_ALERT_LIMIT);
    if let Some(rate) = profile.max_event_rate {
        cfg.max_event_rate = rate;
    }
    if let Some(stale_after) = profile.stale_after {
        cfg.stale_after = stale_after;
    }
    cfg.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    cfg.tls = tls;

    cfg.validate().map_err(|e| ConfigError::Validation {
        field: "profile".into(),
        reason: e.to_string(),
    })?;
    Ok(cfg)
}

/// Whether local notifications are enabled for a profile.
pub fn notifications_enabled(profile: &Profile, defaults: &Defaults) -> bool {
    profile.notifications.unwrap_or(defaults.notifications)
}

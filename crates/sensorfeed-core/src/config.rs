// ── Runtime monitor configuration ──
//
// Describes where to poll and how aggressively. Never touches disk: the
// CLI builds a `MonitorConfig` from its profile and hands it in.

use std::time::Duration;

use tracing::warn;
use url::Url;

use crate::error::CoreError;
use crate::model::Channel;

/// Default API root of the original deployment.
pub const DEFAULT_API_URL: &str = "https://api.iot.loiccapdeville.fr/api/sensormanager";

/// Maximum readings retained per channel.
pub const MAX_POINTS: usize = 120;

/// Readings requested by each incremental poll.
pub const DEFAULT_POLL_LIMIT: u32 = 5;

/// Alerts requested per channel on every refetch.
pub const DEFAULT_ALERT_LIMIT: u32 = 50;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed lab deployments).
    DangerAcceptInvalid,
}

/// Device id per channel. Identifiers are deployment configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIds {
    pub microphone: String,
    pub distance: String,
    pub motion: String,
}

impl DeviceIds {
    pub fn get(&self, channel: Channel) -> &str {
        match channel {
            Channel::Microphone => &self.microphone,
            Channel::Distance => &self.distance,
            Channel::Motion => &self.motion,
        }
    }
}

impl Default for DeviceIds {
    fn default() -> Self {
        Self {
            microphone: Channel::Microphone.default_device_id().into(),
            distance: Channel::Distance.default_device_id().into(),
            motion: Channel::Motion.default_device_id().into(),
        }
    }
}

/// Configuration for one monitor instance.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// API root, e.g. `https://host/api/sensormanager`.
    pub api_url: Url,
    pub devices: DeviceIds,
    /// Readings kept per channel.
    pub capacity: usize,
    /// Readings requested per incremental poll.
    pub poll_limit: u32,
    /// Delay between the end of one tick and the start of the next.
    pub poll_interval: Duration,
    /// Alerts requested per channel.
    pub alert_limit: u32,
    /// Highest expected reading rate per channel, in readings per second.
    /// Only used to warn about configurations that will skip readings.
    pub max_event_rate: f64,
    /// Fetch alerts during start and on every tick.
    pub alerts_enabled: bool,
    /// Consecutive poll failures before a channel is reported stale.
    pub stale_after: u32,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl MonitorConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            devices: DeviceIds::default(),
            capacity: MAX_POINTS,
            poll_limit: DEFAULT_POLL_LIMIT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            alert_limit: DEFAULT_ALERT_LIMIT,
            max_event_rate: 1.0,
            alerts_enabled: true,
            stale_after: 3,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Check the polling parameters.
    ///
    /// A poll can only ever add `poll_limit` readings, so when more than
    /// that arrive within one interval the surplus is skipped. That case is
    /// allowed but logged.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.capacity == 0 {
            return Err(config_error("capacity must be at least 1"));
        }
        if self.poll_limit == 0 {
            return Err(config_error("poll_limit must be at least 1"));
        }
        if usize::try_from(self.poll_limit).unwrap_or(usize::MAX) > self.capacity {
            return Err(config_error(format!(
                "poll_limit ({}) must not exceed capacity ({})",
                self.poll_limit, self.capacity
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(config_error("poll interval must be greater than zero"));
        }
        if self.alert_limit == 0 {
            return Err(config_error("alert_limit must be at least 1"));
        }

        let expected = self.poll_interval.as_secs_f64() * self.max_event_rate;
        if expected > f64::from(self.poll_limit) {
            warn!(
                poll_limit = self.poll_limit,
                interval_ms = self.poll_interval.as_millis(),
                max_event_rate = self.max_event_rate,
                "up to {expected:.1} readings may arrive per interval; readings beyond poll_limit will be skipped"
            );
        }
        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let api_url = Url::parse(DEFAULT_API_URL)
            .unwrap_or_else(|_| unreachable!("default API URL is a valid literal"));
        Self::new(api_url)
    }
}

fn config_error(message: impl Into<String>) -> CoreError {
    CoreError::Config {
        message: message.into(),
    }
}

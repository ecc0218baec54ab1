// ── Core error types ──
//
// Consumers never see raw HTTP status handling or JSON parse failures.
// `From<sensorfeed_api::Error>` translates transport-layer errors into
// domain variants.

use thiserror::Error;

use crate::model::{AlertStatus, Channel};

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach sensor API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to sensor API timed out")]
    Timeout,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Unexpected response from sensor API: {message}")]
    Decode { message: String },

    // ── Alert errors ─────────────────────────────────────────────────
    #[error("Alert {alert_id} cannot move from {from} to {to}")]
    InvalidTransition {
        alert_id: u64,
        from: AlertStatus,
        to: AlertStatus,
    },

    #[error("Alert {alert_id} not found on {channel} channel")]
    AlertNotFound { channel: Channel, alert_id: u64 },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Monitor is stopped")]
    MonitorStopped,

    #[error("Monitor is already running")]
    AlreadyRunning,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Errors worth retrying on the next tick.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ConnectionFailed { .. } | Self::Timeout => true,
            Self::Api { status, .. } => matches!(status, Some(s) if *s >= 500 || *s == 429),
            _ => false,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<sensorfeed_api::Error> for CoreError {
    fn from(err: sensorfeed_api::Error) -> Self {
        match err {
            sensorfeed_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            sensorfeed_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            sensorfeed_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            sensorfeed_api::Error::Http { status, message } => CoreError::Api {
                message: format!("HTTP {status}: {message}"),
                status: Some(status),
            },
            sensorfeed_api::Error::Deserialization { message, body: _ } => {
                CoreError::Decode { message }
            }
        }
    }
}

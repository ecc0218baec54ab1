//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use sensorfeed_config::ConfigError;
use sensorfeed_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the sensor API at {url}")]
    #[diagnostic(
        code(sensorfeed::connection_failed),
        help(
            "Check that the service is running and reachable.\n\
             Override the endpoint with --api-url or: sensorfeed config set api_url <url>"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(sensorfeed::timeout),
        help("Increase timeout with --timeout or check service responsiveness.")
    )]
    Timeout,

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(sensorfeed::not_found),
        help("Run: sensorfeed {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(
        code(sensorfeed::invalid_transition),
        help("Alerts only move forward: active -> acknowledged -> resolved.")
    )]
    Conflict { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(sensorfeed::api_error))]
    ApiError {
        status: Option<u16>,
        message: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(sensorfeed::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(sensorfeed::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: sensorfeed config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(
        code(sensorfeed::config),
        help("Inspect the file with: sensorfeed config show")
    )]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(sensorfeed::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("{0}")]
    #[diagnostic(code(sensorfeed::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotFound { .. }
            | Self::ProfileNotFound { .. }
            | Self::ApiError {
                status: Some(404), ..
            } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::Timeout => CliError::Timeout,

            CoreError::Api { message, status } => CliError::ApiError { status, message },

            CoreError::Decode { message } => CliError::ApiError {
                status: None,
                message: format!("unexpected response: {message}"),
            },

            e @ CoreError::InvalidTransition { .. } => CliError::Conflict {
                message: e.to_string(),
            },

            CoreError::AlertNotFound { channel, alert_id } => CliError::NotFound {
                resource_type: "alert".into(),
                identifier: format!("{channel}/{alert_id}"),
                list_command: format!("alerts list --channel {channel}"),
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            e @ (CoreError::MonitorStopped | CoreError::AlreadyRunning) => {
                CliError::Internal(e.to_string())
            }

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use sensorfeed_core::{AlertStatus, Channel};

    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (
                CoreError::ConnectionFailed {
                    url: "http://x".into(),
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (CoreError::Timeout, exit_code::TIMEOUT),
            (
                CoreError::AlertNotFound {
                    channel: Channel::Motion,
                    alert_id: 3,
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::InvalidTransition {
                    alert_id: 3,
                    from: AlertStatus::Resolved,
                    to: AlertStatus::Acknowledged,
                },
                exit_code::CONFLICT,
            ),
            (
                CoreError::Config {
                    message: "poll_limit must be at least 1".into(),
                },
                exit_code::USAGE,
            ),
            (
                CoreError::Api {
                    message: "HTTP 500: boom".into(),
                    status: Some(500),
                },
                exit_code::GENERAL,
            ),
        ];

        for (core, code) in cases {
            let label = core.to_string();
            assert_eq!(CliError::from(core).exit_code(), code, "{label}");
        }
    }

    #[test]
    fn not_found_points_at_list_command() {
        let err = CliError::from(CoreError::AlertNotFound {
            channel: Channel::Distance,
            alert_id: 12,
        });
        match err {
            CliError::NotFound {
                identifier,
                list_command,
                ..
            } => {
                assert_eq!(identifier, "distance/12");
                assert_eq!(list_command, "alerts list --channel distance");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{Channel, ReadingValue};

/// Server-side lifecycle of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
}

impl AlertStatus {
    /// Transitions only move forward: an alert is never reopened.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::Acknowledged | Self::Resolved)
                | (Self::Acknowledged, Self::Resolved)
        )
    }

    pub fn is_open(self) -> bool {
        !matches!(self, Self::Resolved)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Severity derived from the triggering value.
    pub fn for_value(channel: Channel, value: ReadingValue) -> Self {
        match (channel, value) {
            (Channel::Microphone, ReadingValue::Level(db)) if db >= 100.0 => Self::High,
            (Channel::Distance, ReadingValue::Level(cm)) if cm < 10.0 => Self::High,
            (Channel::Motion, _) => Self::High,
            _ => Self::Medium,
        }
    }
}

/// An alert raised by the service for one channel.
///
/// The client never creates or deletes alerts; it only reads them and
/// requests status transitions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: u64,
    pub channel: Channel,
    pub device_id: String,
    pub message: String,
    pub value: ReadingValue,
    pub status: AlertStatus,
    pub severity: Severity,
    pub created_at: Option<DateTime<Utc>>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Alert {
    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }
}

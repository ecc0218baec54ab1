// ── Filter predicates for snapshots ──
//
// Used by consumers to narrow snapshots without re-querying the API.

use crate::model::{Alert, AlertStatus, Channel, Reading, Severity};

/// Filter predicate for alert snapshots.
pub enum AlertFilter {
    All,
    ByStatus(AlertStatus),
    ByChannel(Channel),
    MinSeverity(Severity),
    /// Active or acknowledged.
    Open,
    Active,
    Custom(Box<dyn Fn(&Alert) -> bool + Send + Sync>),
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        match self {
            Self::All => true,
            Self::ByStatus(s) => alert.status == *s,
            Self::ByChannel(c) => alert.channel == *c,
            Self::MinSeverity(s) => alert.severity >= *s,
            Self::Open => alert.status.is_open(),
            Self::Active => alert.is_active(),
            Self::Custom(f) => f(alert),
        }
    }

    pub fn apply(&self, alerts: &[Alert]) -> Vec<Alert> {
        alerts.iter().filter(|a| self.matches(a)).cloned().collect()
    }
}

/// Filter predicate for reading snapshots.
pub enum ReadingFilter {
    All,
    /// Readings newer than the given id.
    After(u64),
    /// Readings that cross the channel's alert threshold.
    Alerting(Channel),
    Custom(Box<dyn Fn(&Reading) -> bool + Send + Sync>),
}

impl ReadingFilter {
    pub fn matches(&self, reading: &Reading) -> bool {
        match self {
            Self::All => true,
            Self::After(id) => reading.id > *id,
            Self::Alerting(channel) => crate::model::level::is_alerting(*channel, reading.value),
            Self::Custom(f) => f(reading),
        }
    }
}

// ── Local notifications ──
//
// Best-effort side channel for newly raised alerts. Dispatch never blocks
// polling and nothing waits for delivery.

use serde::Serialize;
use serde_json::json;
use strum::Display;
use tracing::info;

use crate::model::Alert;

/// A notification ready to hand to the platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Opaque payload routed back to the app when the user opens it.
    pub data: serde_json::Value,
}

impl Notification {
    pub fn for_alert(alert: &Alert) -> Self {
        let title = match alert.channel {
            crate::model::Channel::Microphone => "Noise alert",
            crate::model::Channel::Distance => "Proximity alert",
            crate::model::Channel::Motion => "Motion alert",
        };
        Self {
            title: title.to_owned(),
            body: alert.message.clone(),
            data: json!({
                "type": "alert",
                "alertId": alert.id,
                "sensorType": alert.channel,
                "severity": alert.severity,
            }),
        }
    }
}

/// What the platform did with a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum NotifyOutcome {
    Scheduled,
    PermissionDenied,
    Unsupported,
}

/// Platform notification facility.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> NotifyOutcome;
}

/// Emits each notification as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) -> NotifyOutcome {
        info!(
            title = %notification.title,
            data = %notification.data,
            "{}",
            notification.body
        );
        NotifyOutcome::Scheduled
    }
}

/// Drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotifier;

impl Notifier for DisabledNotifier {
    fn notify(&self, _notification: &Notification) -> NotifyOutcome {
        NotifyOutcome::Unsupported
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AlertStatus, Channel, ReadingValue, Severity};

    fn alert() -> Alert {
        Alert {
            id: 42,
            channel: Channel::Distance,
            device_id: "ESP_002".into(),
            message: "Distance too close: 8.0 cm".into(),
            value: ReadingValue::Level(8.0),
            status: AlertStatus::Active,
            severity: Severity::High,
            created_at: None,
            acknowledged_at: None,
            resolved_at: None,
        }
    }

    #[test]
    fn notification_carries_alert_routing_data() {
        let n = Notification::for_alert(&alert());
        assert_eq!(n.title, "Proximity alert");
        assert_eq!(n.body, "Distance too close: 8.0 cm");
        assert_eq!(n.data["alertId"], 42);
        assert_eq!(n.data["sensorType"], "distance");
        assert_eq!(n.data["severity"], "high");
    }

    #[test]
    fn shipped_notifiers() {
        let n = Notification::for_alert(&alert());
        assert_eq!(LogNotifier.notify(&n), NotifyOutcome::Scheduled);
        assert_eq!(DisabledNotifier.notify(&n), NotifyOutcome::Unsupported);
        assert_eq!(NotifyOutcome::PermissionDenied.to_string(), "permission-denied");
    }
}

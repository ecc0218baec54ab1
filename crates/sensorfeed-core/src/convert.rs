// ── Wire → domain conversions ──
//
// Every response shape variant is already normalized by `sensorfeed-api`.
// This module maps the normalized records onto the canonical model and
// fills in what the service leaves implicit (severity, message text).

use chrono::{DateTime, Utc};
use sensorfeed_api::{AlertRecord, HistoryRecord, RawValue, SensorKind};
use tracing::debug;

use crate::model::{Alert, AlertStatus, Channel, Reading, ReadingValue, Severity};

impl From<Channel> for SensorKind {
    fn from(channel: Channel) -> Self {
        match channel {
            Channel::Microphone => SensorKind::Microphone,
            Channel::Distance => SensorKind::Distance,
            Channel::Motion => SensorKind::Motion,
        }
    }
}

impl From<RawValue> for ReadingValue {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Number(n) => ReadingValue::Level(n),
            RawValue::Flag(f) => ReadingValue::Detected(f),
        }
    }
}

impl From<HistoryRecord> for Reading {
    fn from(r: HistoryRecord) -> Self {
        Reading {
            id: r.id,
            value: r.value.into(),
            recorded_at: r.recorded_at,
            device_id: r.device_id,
        }
    }
}

/// Parse a service timestamp. Accepts RFC 3339 and the zone-less
/// `YYYY-MM-DD HH:MM:SS` form, which is taken as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|n| n.and_utc())
        })
        .ok()
}

fn alert_value(channel: Channel, r: &AlertRecord) -> ReadingValue {
    let specific = match channel {
        Channel::Microphone => r.decibels.map(ReadingValue::Level),
        Channel::Distance => r.distance_cm.map(ReadingValue::Level),
        Channel::Motion => r.motion_detected.map(ReadingValue::Detected),
    };
    specific
        .or_else(|| r.value.map(ReadingValue::from))
        .unwrap_or(match channel {
            Channel::Motion => ReadingValue::Detected(true),
            Channel::Microphone | Channel::Distance => ReadingValue::Level(0.0),
        })
}

fn alert_message(channel: Channel, r: &AlertRecord, value: ReadingValue) -> String {
    if let Some(msg) = r.message.as_deref().or(r.alert_reason.as_deref()) {
        if !msg.is_empty() {
            return msg.to_owned();
        }
    }
    match (channel, value) {
        (Channel::Microphone, ReadingValue::Level(db)) => match r.threshold_exceeded {
            Some(limit) => format!("High sound level: {db:.1} dB (threshold {limit:.1} dB)"),
            None => format!("High sound level: {db:.1} dB"),
        },
        (Channel::Distance, ReadingValue::Level(cm)) => {
            let kind = r
                .threshold_type
                .as_deref()
                .map_or_else(|| "out of range".to_owned(), |t| t.replace('_', " "));
            match r.threshold_value {
                Some(limit) => format!("Distance {kind}: {cm:.1} cm (threshold {limit:.1} cm)"),
                None => format!("Distance {kind}: {cm:.1} cm"),
            }
        }
        _ => "Motion detected".to_owned(),
    }
}

/// Convert an alert record fetched from the given channel's endpoint.
///
/// An unknown status string is treated as `active` so that it stays
/// visible to the operator.
pub(crate) fn alert_from_record(channel: Channel, r: AlertRecord) -> Alert {
    let status = r.alert_status.parse().unwrap_or_else(|_| {
        debug!(id = r.id, status = %r.alert_status, "unknown alert status, treating as active");
        AlertStatus::Active
    });
    let value = alert_value(channel, &r);
    let message = alert_message(channel, &r, value);

    Alert {
        id: r.id,
        channel,
        severity: Severity::for_value(channel, value),
        message,
        value,
        status,
        created_at: parse_timestamp(&r.created_at),
        acknowledged_at: r.acknowledged_at.as_deref().and_then(parse_timestamp),
        resolved_at: r.resolved_at.as_deref().and_then(parse_timestamp),
        device_id: r.device_id,
    }
}

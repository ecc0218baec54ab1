// Wire types for the sensor manager API.
//
// The service has shipped several response shapes over time: bare arrays
// vs `{data: [...]}` wrappers, and `value` vs `decibels` / `decibelDb` /
// `distanceCm` / `motionDetected` for the sample field. Everything is
// normalized here so no other crate ever sees the variants.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sensor channel as addressed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Microphone,
    Distance,
    Motion,
}

impl SensorKind {
    pub const ALL: [Self; 3] = [Self::Microphone, Self::Distance, Self::Motion];

    /// Path segment used by every per-channel endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Microphone => "microphone",
            Self::Distance => "distance",
            Self::Motion => "motion",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sample value: numeric for microphone/distance, boolean for motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Flag(bool),
}

/// One history row, newest-first in every response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: u64,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(
        alias = "decibels",
        alias = "decibelDb",
        alias = "distanceCm",
        alias = "motionDetected"
    )]
    pub value: RawValue,
    #[serde(default)]
    pub recorded_at: String,
}

/// One alert row as returned by `alerts/{type}`.
///
/// The channel-specific fields are all optional; which ones are present
/// depends on the endpoint that produced the record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    pub id: u64,
    #[serde(default)]
    pub device_id: String,
    #[serde(alias = "status")]
    pub alert_status: String,
    #[serde(default)]
    pub created_at: String,
    pub acknowledged_at: Option<String>,
    pub resolved_at: Option<String>,
    pub message: Option<String>,
    pub value: Option<RawValue>,

    // microphone
    pub decibels: Option<f64>,
    pub threshold_exceeded: Option<f64>,

    // distance
    pub distance_cm: Option<f64>,
    pub threshold_type: Option<String>,
    pub threshold_value: Option<f64>,

    // motion
    pub motion_detected: Option<bool>,
    pub alert_reason: Option<String>,

    pub data_id: Option<u64>,
}

/// List payloads arrive either bare or wrapped in `{data: [...]}`.
/// Go backends also emit `null` for empty slices.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum ListEnvelope<T> {
    Bare(Vec<T>),
    Wrapped { data: Option<Vec<T>> },
}

impl<T> ListEnvelope<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) => items,
            Self::Wrapped { data } => data.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn records(value: serde_json::Value) -> Vec<HistoryRecord> {
        serde_json::from_value::<ListEnvelope<HistoryRecord>>(value)
            .unwrap()
            .into_vec()
    }

    #[test]
    fn bare_and_wrapped_envelopes_normalize_identically() {
        let row = json!({"id": 7, "value": 61.5, "recordedAt": "2025-01-01T00:00:00Z"});
        let bare = records(json!([row.clone()]));
        let wrapped = records(json!({"data": [row]}));
        assert_eq!(bare, wrapped);
        assert_eq!(bare[0].id, 7);
    }

    #[test]
    fn null_data_is_empty() {
        assert!(records(json!({"data": null})).is_empty());
        assert!(records(json!({})).is_empty());
    }

    #[test]
    fn legacy_value_field_names_are_accepted() {
        let mic = records(json!([{"id": 1, "decibels": 72.0, "recordedAt": "t"}]));
        let mic_v2 = records(json!([{"id": 2, "decibelDb": 73.0, "recordedAt": "t"}]));
        let dist = records(json!([{"id": 3, "distanceCm": 12.5, "recordedAt": "t"}]));
        let motion = records(json!([{"id": 4, "motionDetected": true, "recordedAt": "t"}]));

        assert_eq!(mic[0].value, RawValue::Number(72.0));
        assert_eq!(mic_v2[0].value, RawValue::Number(73.0));
        assert_eq!(dist[0].value, RawValue::Number(12.5));
        assert_eq!(motion[0].value, RawValue::Flag(true));
    }

    #[test]
    fn device_id_is_optional() {
        let rows = records(json!([{"id": 9, "value": 1, "recordedAt": "t", "deviceId": "ESP_001"}]));
        assert_eq!(rows[0].device_id.as_deref(), Some("ESP_001"));
        let rows = records(json!([{"id": 9, "value": 1}]));
        assert_eq!(rows[0].device_id, None);
        assert_eq!(rows[0].recorded_at, "");
    }

    #[test]
    fn alert_status_accepts_both_spellings() {
        let a: AlertRecord =
            serde_json::from_value(json!({"id": 1, "alertStatus": "active"})).unwrap();
        let b: AlertRecord = serde_json::from_value(json!({"id": 2, "status": "resolved"})).unwrap();
        assert_eq!(a.alert_status, "active");
        assert_eq!(b.alert_status, "resolved");
        assert_eq!(a.decibels, None);
    }
}

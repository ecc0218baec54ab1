use std::fmt;

use serde::{Deserialize, Serialize};

/// A sample value: a level (decibels, centimeters) or a detection flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadingValue {
    Level(f64),
    Detected(bool),
}

impl ReadingValue {
    pub fn as_level(self) -> Option<f64> {
        match self {
            Self::Level(v) => Some(v),
            Self::Detected(_) => None,
        }
    }

    pub fn as_detected(self) -> Option<bool> {
        match self {
            Self::Detected(d) => Some(d),
            Self::Level(_) => None,
        }
    }
}

impl fmt::Display for ReadingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level(v) => write!(f, "{v:.1}"),
            Self::Detected(true) => f.write_str("detected"),
            Self::Detected(false) => f.write_str("clear"),
        }
    }
}

/// One sample from one channel.
///
/// `id` is assigned by the service, strictly increasing per channel, and is
/// the only key used for ordering and deduplication. `recorded_at` is kept
/// verbatim for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub id: u64,
    pub value: ReadingValue,
    pub recorded_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl Reading {
    pub fn new(id: u64, value: ReadingValue, recorded_at: impl Into<String>) -> Self {
        Self {
            id,
            value,
            recorded_at: recorded_at.into(),
            device_id: None,
        }
    }
}

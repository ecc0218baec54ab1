// ── Reading classification ──
//
// Bands shown next to live values, plus the thresholds the service uses
// when it raises alerts.

use serde::Serialize;
use strum::Display;

use super::{Channel, ReadingValue};

/// Sound above this many decibels raises a microphone alert.
pub const SOUND_ALERT_DB: f64 = 80.0;

/// An obstacle closer than this many centimeters raises a distance alert.
pub const PROXIMITY_ALERT_CM: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum SoundLevel {
    #[strum(serialize = "quiet")]
    Quiet,
    #[strum(serialize = "normal")]
    Normal,
    #[strum(serialize = "loud")]
    Loud,
    #[strum(serialize = "very loud")]
    VeryLoud,
}

impl SoundLevel {
    pub fn from_db(db: f64) -> Self {
        if db < 60.0 {
            Self::Quiet
        } else if db < 80.0 {
            Self::Normal
        } else if db < 100.0 {
            Self::Loud
        } else {
            Self::VeryLoud
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum Proximity {
    #[strum(serialize = "clear")]
    Clear,
    #[strum(serialize = "approaching")]
    Approaching,
    #[strum(serialize = "close")]
    Close,
    #[strum(serialize = "very close")]
    VeryClose,
}

impl Proximity {
    pub fn from_cm(cm: f64) -> Self {
        if cm > 100.0 {
            Self::Clear
        } else if cm > 50.0 {
            Self::Approaching
        } else if cm > 20.0 {
            Self::Close
        } else {
            Self::VeryClose
        }
    }
}

/// Human label for a value on a channel, e.g. "loud" or "very close".
///
/// Returns `None` when the value kind does not fit the channel.
pub fn describe(channel: Channel, value: ReadingValue) -> Option<String> {
    match (channel, value) {
        (Channel::Microphone, ReadingValue::Level(db)) => Some(SoundLevel::from_db(db).to_string()),
        (Channel::Distance, ReadingValue::Level(cm)) => Some(Proximity::from_cm(cm).to_string()),
        (Channel::Motion, ReadingValue::Detected(d)) => {
            Some(if d { "motion" } else { "still" }.to_owned())
        }
        _ => None,
    }
}

/// Whether a value crosses the channel's alert threshold.
pub fn is_alerting(channel: Channel, value: ReadingValue) -> bool {
    match (channel, value) {
        (Channel::Microphone, ReadingValue::Level(db)) => db > SOUND_ALERT_DB,
        (Channel::Distance, ReadingValue::Level(cm)) => cm < PROXIMITY_ALERT_CM,
        (Channel::Motion, ReadingValue::Detected(d)) => d,
        _ => false,
    }
}

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// One physical sensor type and its data stream.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Channel {
    Microphone,
    Distance,
    Motion,
}

impl Channel {
    pub const ALL: [Self; 3] = [Self::Microphone, Self::Distance, Self::Motion];

    /// Display unit for numeric readings on this channel.
    pub fn unit(self) -> Option<&'static str> {
        match self {
            Self::Microphone => Some("dB"),
            Self::Distance => Some("cm"),
            Self::Motion => None,
        }
    }

    /// Device the original deployment wired to this channel.
    pub fn default_device_id(self) -> &'static str {
        match self {
            Self::Microphone => "ESP_001",
            Self::Distance => "ESP_002",
            Self::Motion => "ESP_004",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn parses_and_displays_lowercase() {
        for channel in Channel::iter() {
            let text = channel.to_string();
            assert_eq!(Channel::from_str(&text).unwrap(), channel);
        }
        assert_eq!(Channel::Microphone.to_string(), "microphone");
    }

    #[test]
    fn rejects_unknown_channel() {
        assert!(Channel::from_str("temperature").is_err());
    }

    #[test]
    fn all_matches_iteration_order() {
        let iterated: Vec<Channel> = Channel::iter().collect();
        assert_eq!(iterated, Channel::ALL.to_vec());
    }
}

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CoreError;

/// Polling health of one channel.
///
/// Failed polls never clear data, so without this a channel whose
/// requests keep failing looks identical to one that is quiet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedHealth {
    pub last_success: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
}

impl FeedHealth {
    pub(crate) fn record_success(&mut self, at: DateTime<Utc>) {
        self.last_success = Some(at);
        self.consecutive_failures = 0;
        self.last_error = None;
    }

    pub(crate) fn record_failure(&mut self, err: &CoreError) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.last_error = Some(err.to_string());
    }

    /// True once `threshold` polls in a row have failed. A threshold of
    /// zero disables the check.
    pub fn is_stale(&self, threshold: u32) -> bool {
        threshold > 0 && self.consecutive_failures >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_accumulate_until_success() {
        let mut health = FeedHealth::default();
        health.record_failure(&CoreError::Timeout);
        health.record_failure(&CoreError::Timeout);
        assert!(health.is_stale(2));
        assert!(!health.is_stale(3));
        assert!(!health.is_stale(0));

        health.record_success(Utc::now());
        assert_eq!(health.consecutive_failures, 0);
        assert_eq!(health.last_error, None);
        assert!(health.last_success.is_some());
    }
}

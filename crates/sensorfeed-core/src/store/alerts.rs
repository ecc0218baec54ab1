// ── Alert board ──
//
// Alerts are small and mutable on the server, so they are refetched in
// full every tick and replaced wholesale. The board also remembers which
// active alerts it has already reported.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::model::{Alert, Channel};

#[derive(Debug, Default)]
pub struct AlertBoard {
    alerts: Vec<Alert>,
    notified: HashSet<(Channel, u64)>,
    baseline_taken: bool,
}

impl AlertBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the board with a full refetch.
    ///
    /// Returns the alerts that are active and were not active in any
    /// earlier fetch. The first call only records a baseline and returns
    /// nothing, so alerts that predate the monitor are never reported.
    ///
    /// The seen-set only tracks alerts still inside the fetched window; an
    /// alert that has dropped out of the newest `alert_limit` never returns.
    pub fn apply(&mut self, mut fetched: Vec<Alert>) -> Vec<Alert> {
        sort_newest_first(&mut fetched);
        self.notified
            .retain(|key| fetched.iter().any(|a| (a.channel, a.id) == *key));

        let mut fresh = Vec::new();
        for alert in fetched.iter().filter(|a| a.is_active()) {
            let first_seen = self.notified.insert((alert.channel, alert.id));
            if first_seen && self.baseline_taken {
                fresh.push(alert.clone());
            }
        }
        self.baseline_taken = true;
        self.alerts = fetched;
        fresh
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    /// Number of alerts remembered as already reported.
    pub fn notified_len(&self) -> usize {
        self.notified.len()
    }

    pub fn find(&self, channel: Channel, id: u64) -> Option<&Alert> {
        self.alerts
            .iter()
            .find(|a| a.channel == channel && a.id == id)
    }
}

/// Newest `created_at` first, ties by id descending. Alerts without a
/// parseable timestamp go last.
pub(crate) fn sort_newest_first(alerts: &mut [Alert]) {
    alerts.sort_by(|a, b| match (a.created_at, b.created_at) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| b.id.cmp(&a.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.id.cmp(&a.id),
    });
}

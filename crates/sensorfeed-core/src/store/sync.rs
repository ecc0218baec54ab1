// ── Feed synchronizer ──
//
// Owns one channel's feed and keeps it fresh against the history endpoint.
// The feed mutex is held across fetch + merge, so at most one update per
// channel is ever in flight no matter who calls.

use std::sync::Arc;

use chrono::Utc;
use sensorfeed_api::SensorClient;
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::feed::{ChannelFeed, MergeOutcome};
use super::health::FeedHealth;
use crate::error::CoreError;
use crate::model::{Channel, Reading};

/// Result of one successful load or poll.
#[derive(Debug, Clone)]
pub struct FeedUpdate {
    pub channel: Channel,
    pub outcome: MergeOutcome,
    /// Feed contents after the update.
    pub readings: Arc<Vec<Reading>>,
}

/// Loads and incrementally polls one channel.
pub struct FeedSynchronizer {
    channel: Channel,
    device_id: String,
    poll_limit: u32,
    client: SensorClient,
    feed: Mutex<ChannelFeed>,
    snapshot: watch::Sender<Arc<Vec<Reading>>>,
    health: watch::Sender<FeedHealth>,
}

impl FeedSynchronizer {
    pub fn new(
        channel: Channel,
        device_id: impl Into<String>,
        capacity: usize,
        poll_limit: u32,
        client: SensorClient,
    ) -> Self {
        let feed = ChannelFeed::new(capacity);
        let (snapshot, _) = watch::channel(feed.snapshot());
        let (health, _) = watch::channel(FeedHealth::default());
        Self {
            channel,
            device_id: device_id.into(),
            poll_limit,
            client,
            feed: Mutex::new(feed),
            snapshot,
            health,
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Fetch up to `capacity` readings and replace the feed with them.
    ///
    /// On failure the previous contents are kept and the error returned.
    /// A response that arrives after `guard` was cancelled is discarded.
    pub async fn load_initial(&self, guard: &CancellationToken) -> Result<FeedUpdate, CoreError> {
        let mut feed = self.feed.lock().await;
        let limit = u32::try_from(feed.capacity()).unwrap_or(u32::MAX);
        let batch = self.fetch(limit).await?;
        if guard.is_cancelled() {
            debug!(channel = %self.channel, "discarding initial load after stop");
            return Err(CoreError::MonitorStopped);
        }

        let outcome = feed.replace(batch);
        self.publish(&feed, outcome);
        debug!(
            channel = %self.channel,
            count = outcome.added,
            watermark = outcome.watermark,
            "initial load"
        );
        Ok(self.update(&feed, outcome))
    }

    /// Fetch the `poll_limit` most recent readings and merge the new ones.
    ///
    /// Nothing new leaves the feed untouched and publishes nothing.
    pub async fn poll_incremental(
        &self,
        guard: &CancellationToken,
    ) -> Result<FeedUpdate, CoreError> {
        let mut feed = self.feed.lock().await;
        let batch = self.fetch(self.poll_limit).await?;
        if guard.is_cancelled() {
            debug!(channel = %self.channel, "discarding poll response after stop");
            return Err(CoreError::MonitorStopped);
        }

        let outcome = feed.merge(batch);
        self.publish(&feed, outcome);
        if outcome.added > 0 {
            trace!(
                channel = %self.channel,
                added = outcome.added,
                watermark = outcome.watermark,
                "merged new readings"
            );
        }
        Ok(self.update(&feed, outcome))
    }

    /// Initial load until one succeeds, incremental polls afterwards.
    ///
    /// A channel whose initial load failed would otherwise only ever see
    /// `poll_limit` readings.
    pub async fn refresh(&self, guard: &CancellationToken) -> Result<FeedUpdate, CoreError> {
        let loaded = self.health.borrow().last_success.is_some();
        if loaded {
            self.poll_incremental(guard).await
        } else {
            self.load_initial(guard).await
        }
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<Vec<Reading>> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Reading>>> {
        self.snapshot.subscribe()
    }

    pub fn health(&self) -> watch::Receiver<FeedHealth> {
        self.health.subscribe()
    }

    pub fn health_snapshot(&self) -> FeedHealth {
        self.health.borrow().clone()
    }

    /// Current watermark. Waits for any in-flight update to finish.
    pub async fn watermark(&self) -> u64 {
        self.feed.lock().await.watermark()
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn fetch(&self, limit: u32) -> Result<Vec<Reading>, CoreError> {
        let result = self
            .client
            .history(self.channel.into(), &self.device_id, limit)
            .await;
        match result {
            Ok(rows) => Ok(rows.into_iter().map(Reading::from).collect()),
            Err(e) => {
                let err = CoreError::from(e);
                self.health.send_modify(|h| h.record_failure(&err));
                Err(err)
            }
        }
    }

    fn publish(&self, feed: &ChannelFeed, outcome: MergeOutcome) {
        if !outcome.is_noop() {
            self.snapshot.send_replace(feed.snapshot());
        }
        self.health.send_modify(|h| h.record_success(Utc::now()));
    }

    fn update(&self, feed: &ChannelFeed, outcome: MergeOutcome) -> FeedUpdate {
        FeedUpdate {
            channel: self.channel,
            outcome,
            readings: feed.snapshot(),
        }
    }
}

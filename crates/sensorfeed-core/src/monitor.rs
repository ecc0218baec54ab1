// ── Monitor ──
//
// Lifecycle owner for one set of channel feeds: initial load, the
// fixed-interval tick loop, alert refetch and notification dispatch,
// and reactive access to everything it holds.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use sensorfeed_api::SensorClient;
use sensorfeed_api::{TlsMode, TransportConfig};
use strum::Display;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{MonitorConfig, TlsVerification};
use crate::convert::alert_from_record;
use crate::error::CoreError;
use crate::model::{Alert, AlertStatus, Channel, Reading};
use crate::notify::{LogNotifier, Notification, Notifier, NotifyOutcome};
use crate::store::{AlertBoard, FeedHealth, FeedSynchronizer, FeedUpdate, sort_newest_first};
use crate::stream::SnapshotStream;

// ── MonitorState ─────────────────────────────────────────────────

/// Lifecycle state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MonitorState {
    /// Built, never started.
    Idle,
    /// Initial loads in progress.
    Loading,
    /// Poll task running.
    Running,
    Stopped,
}

// ── TickReport ───────────────────────────────────────────────────

/// Outcome of one tick. Failures are reported, never raised.
#[derive(Debug, Default)]
pub struct TickReport {
    pub updates: Vec<FeedUpdate>,
    pub failures: Vec<(Channel, CoreError)>,
    /// Set when alerts were due and could not be refetched.
    pub alert_error: Option<CoreError>,
    /// Notifications the notifier accepted.
    pub notified: usize,
}

impl TickReport {
    /// Readings added across all channels.
    pub fn added(&self) -> usize {
        self.updates.iter().map(|u| u.outcome.added).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.alert_error.is_none()
    }
}

// ── Monitor ──────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<MonitorInner>`. Owns one
/// [`FeedSynchronizer`] per channel, the alert board, the notifier and the
/// background poll task.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    config: MonitorConfig,
    client: SensorClient,
    microphone: FeedSynchronizer,
    distance: FeedSynchronizer,
    motion: FeedSynchronizer,
    alerts: Mutex<AlertBoard>,
    alerts_tx: watch::Sender<Arc<Vec<Alert>>>,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<MonitorState>,
    cancel: CancellationToken,
    /// Child token for the current run: cancelled on stop, replaced on
    /// start.
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Monitor {
    /// Validate the configuration and build the HTTP client. Does NOT
    /// fetch anything: call [`start()`](Self::start) to begin polling.
    pub fn new(config: MonitorConfig) -> Result<Self, CoreError> {
        Self::with_notifier(config, Arc::new(LogNotifier))
    }

    /// Like [`new()`](Self::new) with a caller-chosen notifier.
    pub fn with_notifier(
        config: MonitorConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = SensorClient::new(config.api_url.clone(), &transport)?;
        Self::with_client(config, client, notifier)
    }

    /// Build a monitor around an existing client and notifier.
    pub fn with_client(
        config: MonitorConfig,
        client: SensorClient,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CoreError> {
        config.validate()?;

        let sync = |channel: Channel| {
            FeedSynchronizer::new(
                channel,
                config.devices.get(channel),
                config.capacity,
                config.poll_limit,
                client.clone(),
            )
        };
        let microphone = sync(Channel::Microphone);
        let distance = sync(Channel::Distance);
        let motion = sync(Channel::Motion);

        let (alerts_tx, _) = watch::channel(Arc::new(Vec::new()));
        let (state, _) = watch::channel(MonitorState::Idle);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Ok(Self {
            inner: Arc::new(MonitorInner {
                config,
                client,
                microphone,
                distance,
                motion,
                alerts: Mutex::new(AlertBoard::new()),
                alerts_tx,
                notifier,
                state,
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &SensorClient {
        &self.inner.client
    }

    /// The synchronizer that owns a channel's feed.
    pub fn synchronizer(&self, channel: Channel) -> &FeedSynchronizer {
        match channel {
            Channel::Microphone => &self.inner.microphone,
            Channel::Distance => &self.inner.distance,
            Channel::Motion => &self.inner.motion,
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Load every channel, fetch the alert baseline, then spawn the poll
    /// task.
    ///
    /// Per-channel load failures are logged and recorded in feed health;
    /// the channel is loaded again on the next tick.
    pub async fn start(&self) -> Result<(), CoreError> {
        // Claim and token install happen under the lock `stop()` cancels through.
        let child = {
            let mut current = self.inner.cancel_child.lock().await;
            let claimed = self.inner.state.send_if_modified(|state| {
                if matches!(state, MonitorState::Loading | MonitorState::Running) {
                    false
                } else {
                    *state = MonitorState::Loading;
                    true
                }
            });
            if !claimed {
                return Err(CoreError::AlreadyRunning);
            }
            let child = self.inner.cancel.child_token();
            *current = child.clone();
            child
        };

        for (channel, result) in self.load_all(&child).await {
            match result {
                Ok(update) => info!(
                    channel = %channel,
                    readings = update.readings.len(),
                    watermark = update.outcome.watermark,
                    "feed loaded"
                ),
                Err(e) => warn!(channel = %channel, error = %e, "initial load failed"),
            }
        }

        if self.inner.config.alerts_enabled {
            if let Err(e) = self.refresh_alerts_guarded(&child).await {
                warn!(error = %e, "initial alert fetch failed");
            }
        }

        let mut handles = self.inner.task_handles.lock().await;
        if child.is_cancelled() {
            self.inner.state.send_replace(MonitorState::Stopped);
            return Err(CoreError::MonitorStopped);
        }

        let monitor = self.clone();
        let period = self.inner.config.poll_interval;
        handles.push(tokio::spawn(poll_task(monitor, period, child)));
        self.inner.state.send_replace(MonitorState::Running);

        info!(
            interval_ms = period.as_millis(),
            capacity = self.inner.config.capacity,
            poll_limit = self.inner.config.poll_limit,
            "monitor started"
        );
        Ok(())
    }

    /// Cancel the poll task and wait for it to finish.
    ///
    /// A response still in flight is dropped with the task; any fetch that
    /// completes after this point is discarded instead of merged.
    pub async fn stop(&self) {
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        self.inner.state.send_replace(MonitorState::Stopped);
        debug!("monitor stopped");
    }

    /// One-shot: load once, run closure, stop.
    ///
    /// Fails only when no channel could be loaded at all.
    pub async fn oneshot<F, Fut, T>(config: MonitorConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Monitor) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let monitor = Monitor::new(config)?;
        let guard = monitor.current_token().await;

        let mut first_error = None;
        let mut loaded = 0_usize;
        for (channel, result) in monitor.load_all(&guard).await {
            match result {
                Ok(_) => loaded += 1,
                Err(e) => {
                    warn!(channel = %channel, error = %e, "load failed");
                    first_error.get_or_insert(e);
                }
            }
        }
        if loaded == 0 {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        if monitor.inner.config.alerts_enabled {
            if let Err(e) = monitor.refresh_alerts_guarded(&guard).await {
                warn!(error = %e, "alert fetch failed");
            }
        }

        let result = f(monitor.clone()).await;
        monitor.stop().await;
        result
    }

    // ── Feed operations ──────────────────────────────────────────

    /// Replace a channel's feed with its most recent `capacity` readings.
    pub async fn load_initial(&self, channel: Channel) -> Result<FeedUpdate, CoreError> {
        let guard = self.current_token().await;
        self.synchronizer(channel).load_initial(&guard).await
    }

    /// Merge readings newer than the channel's watermark.
    pub async fn poll_incremental(&self, channel: Channel) -> Result<FeedUpdate, CoreError> {
        let guard = self.current_token().await;
        self.synchronizer(channel).poll_incremental(&guard).await
    }

    /// Poll every channel concurrently, then refetch alerts.
    pub async fn tick(&self) -> TickReport {
        let guard = self.current_token().await;
        self.run_tick(&guard).await
    }

    async fn run_tick(&self, guard: &CancellationToken) -> TickReport {
        let (mic, dist, motion) = tokio::join!(
            self.inner.microphone.refresh(guard),
            self.inner.distance.refresh(guard),
            self.inner.motion.refresh(guard),
        );

        let mut report = TickReport::default();
        for (channel, result) in [
            (Channel::Microphone, mic),
            (Channel::Distance, dist),
            (Channel::Motion, motion),
        ] {
            match result {
                Ok(update) => report.updates.push(update),
                Err(e) => report.failures.push((channel, e)),
            }
        }

        if self.inner.config.alerts_enabled {
            match self.refresh_alerts_guarded(guard).await {
                Ok((_, notified)) => report.notified = notified,
                Err(e) => report.alert_error = Some(e),
            }
        }
        report
    }

    async fn load_all(
        &self,
        guard: &CancellationToken,
    ) -> Vec<(Channel, Result<FeedUpdate, CoreError>)> {
        let (mic, dist, motion) = tokio::join!(
            self.inner.microphone.load_initial(guard),
            self.inner.distance.load_initial(guard),
            self.inner.motion.load_initial(guard),
        );
        vec![
            (Channel::Microphone, mic),
            (Channel::Distance, dist),
            (Channel::Motion, motion),
        ]
    }

    // ── Alerts ───────────────────────────────────────────────────

    /// Fetch alerts for every channel, newest first, without touching the
    /// board. `status` narrows the query server-side.
    pub async fn fetch_alerts(&self, status: Option<AlertStatus>) -> Result<Vec<Alert>, CoreError> {
        let status = status.map(|s| s.to_string());
        let status = status.as_deref();
        let limit = self.inner.config.alert_limit;
        let client = &self.inner.client;
        let devices = &self.inner.config.devices;

        let results = join_all(Channel::ALL.map(|channel| async move {
            let rows = client
                .alerts(channel.into(), devices.get(channel), status, limit)
                .await?;
            Ok::<_, CoreError>(
                rows.into_iter()
                    .map(|r| alert_from_record(channel, r))
                    .collect::<Vec<_>>(),
            )
        }))
        .await;

        let mut merged = Vec::new();
        for result in results {
            merged.extend(result?);
        }
        sort_newest_first(&mut merged);
        Ok(merged)
    }

    /// Refetch all alerts into the board and notify about newly active
    /// ones. On failure the previous board is kept.
    pub async fn refresh_alerts(&self) -> Result<Arc<Vec<Alert>>, CoreError> {
        let guard = self.current_token().await;
        self.refresh_alerts_guarded(&guard)
            .await
            .map(|(alerts, _)| alerts)
    }

    async fn refresh_alerts_guarded(
        &self,
        guard: &CancellationToken,
    ) -> Result<(Arc<Vec<Alert>>, usize), CoreError> {
        let mut board = self.inner.alerts.lock().await;
        let fetched = self.fetch_alerts(None).await?;
        if guard.is_cancelled() {
            debug!("discarding alert refetch after stop");
            return Err(CoreError::MonitorStopped);
        }

        let fresh = board.apply(fetched);
        self.inner.alerts_tx.send_if_modified(|current| {
            if current.as_slice() == board.alerts() {
                false
            } else {
                *current = Arc::new(board.alerts().to_vec());
                true
            }
        });
        drop(board);

        let notified = self.dispatch(&fresh);
        Ok((self.alerts_snapshot(), notified))
    }

    /// Hand each alert to the notifier; returns how many were scheduled.
    fn dispatch(&self, alerts: &[Alert]) -> usize {
        let mut scheduled = 0;
        for alert in alerts {
            let outcome = self.inner.notifier.notify(&Notification::for_alert(alert));
            debug!(channel = %alert.channel, alert_id = alert.id, %outcome, "notification dispatched");
            if outcome == NotifyOutcome::Scheduled {
                scheduled += 1;
            }
        }
        scheduled
    }

    /// Move an active alert to `acknowledged`.
    pub async fn acknowledge(&self, channel: Channel, alert_id: u64) -> Result<(), CoreError> {
        self.transition(channel, alert_id, AlertStatus::Acknowledged)
            .await
    }

    /// Move an active or acknowledged alert to `resolved`.
    pub async fn resolve(&self, channel: Channel, alert_id: u64) -> Result<(), CoreError> {
        self.transition(channel, alert_id, AlertStatus::Resolved)
            .await
    }

    async fn transition(
        &self,
        channel: Channel,
        alert_id: u64,
        to: AlertStatus,
    ) -> Result<(), CoreError> {
        let current = self.find_alert(channel, alert_id).await?;
        if !current.status.can_transition_to(to) {
            return Err(CoreError::InvalidTransition {
                alert_id,
                from: current.status,
                to,
            });
        }

        self.inner
            .client
            .update_alert_status(channel.into(), alert_id, &to.to_string())
            .await?;
        info!(channel = %channel, alert_id, status = %to, "alert status updated");

        if let Err(e) = self.refresh_alerts().await {
            warn!(error = %e, "alert refetch after status update failed");
        }
        Ok(())
    }

    /// Look an alert up on the board, falling back to a direct fetch when
    /// the board has never seen it.
    async fn find_alert(&self, channel: Channel, alert_id: u64) -> Result<Alert, CoreError> {
        if let Some(alert) = self.inner.alerts.lock().await.find(channel, alert_id) {
            return Ok(alert.clone());
        }
        self.fetch_alerts(None)
            .await?
            .into_iter()
            .find(|a| a.channel == channel && a.id == alert_id)
            .ok_or(CoreError::AlertNotFound { channel, alert_id })
    }

    /// Alerts currently in `active` state on the board.
    pub fn active_count(&self) -> usize {
        self.inner
            .alerts_tx
            .borrow()
            .iter()
            .filter(|a| a.is_active())
            .count()
    }

    // ── Notifications ────────────────────────────────────────────

    /// Register a device push token with the service.
    pub async fn register_push_token(&self, token: &str, platform: &str) -> Result<(), CoreError> {
        self.inner
            .client
            .register_push_token(token, platform)
            .await?;
        info!(platform, "push token registered");
        Ok(())
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to lifecycle state changes.
    pub fn state(&self) -> watch::Receiver<MonitorState> {
        self.inner.state.subscribe()
    }

    pub fn current_state(&self) -> MonitorState {
        *self.inner.state.borrow()
    }

    pub fn feed(&self, channel: Channel) -> SnapshotStream<Reading> {
        SnapshotStream::new(self.synchronizer(channel).subscribe())
    }

    pub fn feed_snapshot(&self, channel: Channel) -> Arc<Vec<Reading>> {
        self.synchronizer(channel).snapshot()
    }

    pub fn alerts(&self) -> SnapshotStream<Alert> {
        SnapshotStream::new(self.inner.alerts_tx.subscribe())
    }

    pub fn alerts_snapshot(&self) -> Arc<Vec<Alert>> {
        self.inner.alerts_tx.borrow().clone()
    }

    pub fn health(&self, channel: Channel) -> watch::Receiver<FeedHealth> {
        self.synchronizer(channel).health()
    }

    pub fn health_snapshot(&self, channel: Channel) -> FeedHealth {
        self.synchronizer(channel).health_snapshot()
    }

    /// Whether the channel has failed `stale_after` polls in a row.
    pub fn is_stale(&self, channel: Channel) -> bool {
        self.health_snapshot(channel)
            .is_stale(self.inner.config.stale_after)
    }

    pub async fn watermark(&self, channel: Channel) -> u64 {
        self.synchronizer(channel).watermark().await
    }

    async fn current_token(&self) -> CancellationToken {
        self.inner.cancel_child.lock().await.clone()
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn build_transport(config: &MonitorConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Tick on a fixed interval until cancelled.
///
/// The interval only resumes once the whole tick has settled, so each
/// channel has at most one poll in flight.
async fn poll_task(monitor: Monitor, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let report = tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    report = monitor.run_tick(&cancel) => report,
                };
                log_report(&report);
            }
        }
    }
}

fn log_report(report: &TickReport) {
    for (channel, e) in &report.failures {
        if !matches!(e, CoreError::MonitorStopped) {
            warn!(channel = %channel, error = %e, "poll failed");
        }
    }
    if let Some(e) = &report.alert_error {
        if !matches!(e, CoreError::MonitorStopped) {
            warn!(error = %e, "alert refetch failed");
        }
    }
    debug!(
        added = report.added(),
        failures = report.failures.len(),
        notified = report.notified,
        "tick complete"
    );
}

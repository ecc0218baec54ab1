#![allow(clippy::unwrap_used)]
// Integration tests for `Monitor` lifecycle, ticks and alert handling.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sensorfeed_api::SensorClient;
use sensorfeed_core::{
    AlertStatus, Channel, CoreError, Monitor, MonitorConfig, MonitorState, Notification, Notifier,
    NotifyOutcome,
};

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> NotifyOutcome {
        self.seen.lock().unwrap().push(notification.clone());
        NotifyOutcome::Scheduled
    }
}

fn api_path(suffix: &str) -> String {
    format!("/api/sensormanager/{suffix}")
}

fn config(server: &MockServer) -> MonitorConfig {
    let url = Url::parse(&format!("{}/api/sensormanager", server.uri())).unwrap();
    let mut cfg = MonitorConfig::new(url);
    cfg.capacity = 5;
    cfg.poll_limit = 5;
    cfg.poll_interval = Duration::from_millis(50);
    cfg.stale_after = 2;
    cfg
}

/// Empty history and alert lists for anything not mocked explicitly.
async fn mount_fallbacks(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path_regex(r"/sensor/\w+/history$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .with_priority(10)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"/alerts/\w+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .with_priority(10)
        .mount(server)
        .await;
}

async fn setup() -> (MockServer, Monitor, Arc<RecordingNotifier>) {
    let server = MockServer::start().await;
    mount_fallbacks(&server).await;
    let cfg = config(&server);
    let client = SensorClient::with_client(reqwest::Client::new(), cfg.api_url.clone());
    let notifier = Arc::new(RecordingNotifier::default());
    let monitor = Monitor::with_client(cfg, client, notifier.clone()).unwrap();
    (server, monitor, notifier)
}

fn rows(ids: &[u64]) -> serde_json::Value {
    let rows: Vec<_> = ids
        .iter()
        .map(|id| json!({"id": id, "value": 42.0, "recordedAt": "2025-03-01T10:00:00Z"}))
        .collect();
    json!(rows)
}

async fn history(server: &MockServer, channel: &str, ids: &[u64], times: Option<u64>) {
    let mock = Mock::given(method("POST"))
        .and(path(api_path(&format!("sensor/{channel}/history"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows(ids)));
    match times {
        Some(n) => mock.up_to_n_times(n).mount(server).await,
        None => mock.mount(server).await,
    }
}

fn ids(monitor: &Monitor, channel: Channel) -> Vec<u64> {
    monitor.feed_snapshot(channel).iter().map(|r| r.id).collect()
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_start_stop_restart() {
    let (server, monitor, _) = setup().await;
    history(&server, "microphone", &[3, 2, 1], None).await;

    assert_eq!(monitor.current_state(), MonitorState::Idle);
    monitor.start().await.unwrap();
    assert_eq!(monitor.current_state(), MonitorState::Running);
    assert_eq!(ids(&monitor, Channel::Microphone), vec![3, 2, 1]);
    assert_eq!(monitor.watermark(Channel::Microphone).await, 3);

    let err = monitor.start().await.unwrap_err();
    assert!(matches!(err, CoreError::AlreadyRunning));

    monitor.stop().await;
    assert_eq!(monitor.current_state(), MonitorState::Stopped);

    // Responses after stop are never merged.
    let report = monitor.tick().await;
    assert_eq!(report.failures.len(), 3);
    assert!(
        report
            .failures
            .iter()
            .all(|(_, e)| matches!(e, CoreError::MonitorStopped))
    );

    monitor.start().await.unwrap();
    assert_eq!(monitor.current_state(), MonitorState::Running);
    monitor.stop().await;
}

#[tokio::test]
async fn test_poll_loop_delivers_new_readings() {
    let (server, monitor, _) = setup().await;
    history(&server, "distance", &[1], Some(1)).await;
    history(&server, "distance", &[2, 1], None).await;

    let mut feed = monitor.feed(Channel::Distance);
    assert!(feed.current().is_empty());
    monitor.start().await.unwrap();

    let newest = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snap = feed.changed().await.unwrap();
            if snap.first().map(|r| r.id) == Some(2) {
                break snap;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(newest.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 1]);

    monitor.stop().await;
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let server = MockServer::start().await;
    let mut cfg = config(&server);
    cfg.capacity = 3;
    cfg.poll_limit = 5;
    let client = SensorClient::with_client(reqwest::Client::new(), cfg.api_url.clone());

    let result = Monitor::with_client(cfg, client, Arc::new(RecordingNotifier::default()));
    assert!(matches!(result, Err(CoreError::Config { .. })));
}

// ── Ticks ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_tick_loads_then_polls_and_tracks_failures() {
    let (server, monitor, _) = setup().await;
    history(&server, "microphone", &[5, 4, 3], Some(1)).await;
    history(&server, "microphone", &[7, 6, 5], None).await;
    Mock::given(method("POST"))
        .and(path(api_path("sensor/motion/history")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let first = monitor.tick().await;
    assert_eq!(first.failures.len(), 1);
    assert_eq!(first.failures[0].0, Channel::Motion);

    let second = monitor.tick().await;
    assert_eq!(second.added(), 2);
    assert!(!second.is_clean());

    assert_eq!(ids(&monitor, Channel::Microphone), vec![7, 6, 5, 4, 3]);
    assert_eq!(monitor.health_snapshot(Channel::Motion).consecutive_failures, 2);
    assert!(monitor.is_stale(Channel::Motion));
    assert!(!monitor.is_stale(Channel::Microphone));
}

#[tokio::test]
async fn test_new_active_alerts_notify_once_after_baseline() {
    let (server, monitor, notifier) = setup().await;
    Mock::given(method("POST"))
        .and(path(api_path("alerts/motion")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "alertStatus": "active", "createdAt": "2025-03-01T10:00:00Z"}
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("alerts/motion")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 2, "alertStatus": "active", "createdAt": "2025-03-01T10:01:00Z"},
            {"id": 1, "alertStatus": "active", "createdAt": "2025-03-01T10:00:00Z"}
        ])))
        .mount(&server)
        .await;

    let baseline = monitor.refresh_alerts().await.unwrap();
    assert_eq!(baseline.len(), 1);
    assert!(notifier.seen.lock().unwrap().is_empty());

    let report = monitor.tick().await;
    assert_eq!(report.notified, 1);
    assert_eq!(monitor.active_count(), 2);
    assert_eq!(monitor.alerts_snapshot()[0].id, 2);

    monitor.tick().await;
    let seen = notifier.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].title, "Motion alert");
    assert_eq!(seen[0].data["alertId"], 2);
}

// ── Alert transitions ───────────────────────────────────────────────

#[tokio::test]
async fn test_acknowledge_active_alert() {
    let (server, monitor, _) = setup().await;
    Mock::given(method("POST"))
        .and(path(api_path("alerts/distance")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 9, "distanceCm": 12.0, "alertStatus": "active"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("alerts/distance/status")))
        .and(body_json(json!({"alertId": 9, "status": "acknowledged"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    monitor.acknowledge(Channel::Distance, 9).await.unwrap();
    assert_eq!(monitor.alerts_snapshot().len(), 1);
}

#[tokio::test]
async fn test_resolved_alert_cannot_be_acknowledged() {
    let (server, monitor, _) = setup().await;
    Mock::given(method("POST"))
        .and(path(api_path("alerts/motion")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 3, "alertStatus": "resolved"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("alerts/motion/status")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = monitor.acknowledge(Channel::Motion, 3).await.unwrap_err();
    match err {
        CoreError::InvalidTransition { alert_id, from, to } => {
            assert_eq!(alert_id, 3);
            assert_eq!(from, AlertStatus::Resolved);
            assert_eq!(to, AlertStatus::Acknowledged);
        }
        other => panic!("expected InvalidTransition, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_alert_is_not_found() {
    let (_server, monitor, _) = setup().await;
    let err = monitor.resolve(Channel::Microphone, 99).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::AlertNotFound { channel: Channel::Microphone, alert_id: 99 }
    ));
}

#[tokio::test]
async fn test_register_push_token() {
    let (server, monitor, _) = setup().await;
    Mock::given(method("POST"))
        .and(path(api_path("notifications/register")))
        .and(body_json(json!({"pushToken": "tok-1", "platform": "linux"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    monitor.register_push_token("tok-1", "linux").await.unwrap();
}

// ── One-shot ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_oneshot_loads_then_runs_closure() {
    let server = MockServer::start().await;
    mount_fallbacks(&server).await;
    history(&server, "microphone", &[3, 2, 1], None).await;

    let len = Monitor::oneshot(config(&server), |m| async move {
        Ok(m.feed_snapshot(Channel::Microphone).len())
    })
    .await
    .unwrap();
    assert_eq!(len, 3);
}

#[tokio::test]
async fn test_oneshot_fails_when_nothing_loads() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let result = Monitor::oneshot(config(&server), |_| async { Ok(()) }).await;
    assert!(matches!(result, Err(CoreError::Api { status: Some(502), .. })));
}

// ── Scheduling and stop ─────────────────────────────────────────────

async fn history_requests(server: &MockServer, suffix: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path().ends_with(suffix))
        .count()
}

/// Serve every channel's history after `delay`.
async fn slow_history(server: &MockServer, delay: Duration) {
    Mock::given(method("POST"))
        .and(path_regex(r"/sensor/\w+/history$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(rows(&[1]))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

fn monitor_for(cfg: MonitorConfig) -> Monitor {
    let client = SensorClient::with_client(reqwest::Client::new(), cfg.api_url.clone());
    Monitor::with_client(cfg, client, Arc::new(RecordingNotifier::default())).unwrap()
}

#[tokio::test]
async fn test_slow_ticks_never_overlap() {
    let server = MockServer::start().await;
    mount_fallbacks(&server).await;
    slow_history(&server, Duration::from_millis(300)).await;
    let mut cfg = config(&server);
    cfg.poll_interval = Duration::from_millis(20);
    let monitor = monitor_for(cfg);

    monitor.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(1000)).await;
    monitor.stop().await;

    // A 20 ms interval with overlapping ticks would issue ~150 requests.
    // Awaiting each 300 ms tick allows at most 4 ticks of 3 channels,
    // plus one cycle cut short by stop.
    let total = history_requests(&server, "/history").await;
    assert!((6..=18).contains(&total), "history requests: {total}");
    for channel in ["microphone", "distance", "motion"] {
        let per_channel = history_requests(&server, &format!("{channel}/history")).await;
        assert!(per_channel <= 6, "{channel}: {per_channel}");
    }
}

#[tokio::test]
async fn test_stop_drops_in_flight_poll() {
    let (server, monitor, _) = setup().await;
    history(&server, "microphone", &[3, 2, 1], Some(1)).await;
    Mock::given(method("POST"))
        .and(path(api_path("sensor/microphone/history")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(rows(&[5, 4, 3]))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;

    monitor.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(history_requests(&server, "microphone/history").await >= 2);

    monitor.stop().await;
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(monitor.current_state(), MonitorState::Stopped);
    assert_eq!(ids(&monitor, Channel::Microphone), vec![3, 2, 1]);
    assert_eq!(monitor.watermark(Channel::Microphone).await, 3);
}

#[tokio::test]
async fn test_response_landing_after_stop_is_discarded() {
    let server = MockServer::start().await;
    mount_fallbacks(&server).await;
    history(&server, "distance", &[3, 2, 1], Some(1)).await;
    Mock::given(method("POST"))
        .and(path(api_path("sensor/distance/history")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(rows(&[6, 5, 4]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    let mut cfg = config(&server);
    cfg.poll_interval = Duration::from_secs(60);
    let monitor = monitor_for(cfg);

    monitor.start().await.unwrap();
    let before = monitor.feed_snapshot(Channel::Distance);

    let poller = monitor.clone();
    let poll = tokio::spawn(async move { poller.poll_incremental(Channel::Distance).await });
    tokio::time::sleep(Duration::from_millis(100)).await;
    monitor.stop().await;

    let err = poll.await.unwrap().unwrap_err();
    assert!(matches!(err, CoreError::MonitorStopped));
    assert!(Arc::ptr_eq(&before, &monitor.feed_snapshot(Channel::Distance)));
    assert_eq!(ids(&monitor, Channel::Distance), vec![3, 2, 1]);
    assert_eq!(monitor.watermark(Channel::Distance).await, 3);
}

#[tokio::test]
async fn test_stop_during_start_leaves_monitor_stopped() {
    let server = MockServer::start().await;
    mount_fallbacks(&server).await;
    slow_history(&server, Duration::from_millis(300)).await;
    let monitor = monitor_for(config(&server));

    let starter = monitor.clone();
    let start = tokio::spawn(async move { starter.start().await });
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(monitor.current_state(), MonitorState::Loading);
    monitor.stop().await;

    let err = start.await.unwrap().unwrap_err();
    assert!(matches!(err, CoreError::MonitorStopped));
    assert_eq!(monitor.current_state(), MonitorState::Stopped);
    assert!(monitor.feed_snapshot(Channel::Microphone).is_empty());

    // No poll task survived the stop.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(history_requests(&server, "/history").await, 3);
    assert_eq!(monitor.current_state(), MonitorState::Stopped);
}

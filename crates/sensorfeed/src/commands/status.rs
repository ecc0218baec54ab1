//! Status command: one load of every channel, summarized.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

use sensorfeed_core::model::level;
use sensorfeed_core::{Channel, FeedHealth, Monitor, ReadingValue};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct ChannelStatus {
    channel: Channel,
    device_id: String,
    readings: usize,
    watermark: u64,
    latest: Option<ReadingValue>,
    health: FeedHealth,
    stale: bool,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    channels: Vec<ChannelStatus>,
    active_alerts: usize,
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Readings")]
    readings: usize,
    #[tabled(rename = "Watermark")]
    watermark: u64,
    #[tabled(rename = "Latest")]
    latest: String,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Health")]
    health: String,
}

fn health_label(status: &ChannelStatus) -> String {
    if status.stale {
        return format!("stale ({} failures)", status.health.consecutive_failures);
    }
    match (&status.health.last_error, status.health.last_success) {
        (Some(err), _) => format!("failing: {err}"),
        (None, Some(at)) => format!("ok {}", fmt_clock(at)),
        (None, None) => "not loaded".into(),
    }
}

fn fmt_clock(at: DateTime<Utc>) -> String {
    at.format("%H:%M:%S").to_string()
}

fn row(s: &ChannelStatus, color: bool) -> StatusRow {
    StatusRow {
        channel: s.channel.to_string(),
        device: s.device_id.clone(),
        readings: s.readings,
        watermark: s.watermark,
        latest: s
            .latest
            .map_or_else(|| "-".into(), |v| output::paint_value(s.channel, v, color)),
        level: s
            .latest
            .and_then(|v| level::describe(s.channel, v))
            .unwrap_or_else(|| "-".into()),
        health: health_label(s),
    }
}

fn detail(report: &StatusReport, color: bool) -> String {
    let rows: Vec<StatusRow> = report.channels.iter().map(|s| row(s, color)).collect();
    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    format!("{table}\nActive alerts: {}", report.active_alerts)
}

async fn collect(monitor: &Monitor) -> StatusReport {
    let stale_after = monitor.config().stale_after;
    let mut channels = Vec::with_capacity(Channel::ALL.len());
    for channel in Channel::ALL {
        let snapshot = monitor.feed_snapshot(channel);
        let health = monitor.health_snapshot(channel);
        channels.push(ChannelStatus {
            channel,
            device_id: monitor.config().devices.get(channel).to_owned(),
            readings: snapshot.len(),
            watermark: monitor.watermark(channel).await,
            latest: snapshot.first().map(|r| r.value),
            stale: health.is_stale(stale_after),
            health,
        });
    }
    StatusReport {
        channels,
        active_alerts: monitor.active_count(),
    }
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let (config, _) = crate::config::build_monitor_config(global)?;

    let report = Monitor::oneshot(config, |monitor| async move { Ok(collect(&monitor).await) })
        .await?;

    let out = output::render_single(
        &global.output,
        &report,
        |r| detail(r, color),
        |r| r.active_alerts.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

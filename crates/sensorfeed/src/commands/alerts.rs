//! Alert command handlers.

use chrono::{DateTime, Utc};
use tabled::Tabled;

use sensorfeed_core::{Alert, AlertFilter, AlertStatus, Channel, Monitor};

use crate::cli::{AlertsArgs, AlertsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Message")]
    message: String,
}

fn fmt_time(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string())
}

fn row(a: &Alert, color: bool) -> AlertRow {
    AlertRow {
        id: a.id,
        channel: a.channel.to_string(),
        device: a.device_id.clone(),
        severity: output::paint_severity(a.severity, color),
        status: output::paint_status(a.status, color),
        value: output::paint_value(a.channel, a.value, false),
        created: fmt_time(a.created_at),
        message: a.message.clone(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: AlertsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let (config, _) = crate::config::build_monitor_config(global)?;
    let monitor = util::monitor(config, false, color)?;

    match args.command {
        AlertsCommand::List { status, channel } => {
            let alerts = monitor.fetch_alerts(status.map(AlertStatus::from)).await?;
            let alerts = match channel {
                Some(c) => AlertFilter::ByChannel(Channel::from(c)).apply(&alerts),
                None => alerts,
            };
            let out = output::render_list(
                &global.output,
                &alerts,
                |a| row(a, color),
                |a| format!("{}/{}", a.channel, a.id),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlertsCommand::Count => {
            monitor.refresh_alerts().await?;
            output::print_output(&monitor.active_count().to_string(), global.quiet);
            Ok(())
        }

        AlertsCommand::Acknowledge { channel, id } => {
            let channel = Channel::from(channel);
            monitor.acknowledge(channel, id).await?;
            report(&monitor, channel, id, "Acknowledged", global);
            Ok(())
        }

        AlertsCommand::Resolve { channel, id } => {
            let channel = Channel::from(channel);
            if !util::confirm(
                &format!("Resolve {channel} alert {id}? Resolved alerts cannot be reopened."),
                "alerts resolve",
                global.yes,
            )? {
                return Ok(());
            }
            monitor.resolve(channel, id).await?;
            report(&monitor, channel, id, "Resolved", global);
            Ok(())
        }
    }
}

fn report(monitor: &Monitor, channel: Channel, id: u64, verb: &str, global: &GlobalOpts) {
    if !global.quiet {
        eprintln!("✓ {verb} {channel} alert {id}");
    }
    let snapshot = monitor.alerts_snapshot();
    if let Some(alert) = snapshot.iter().find(|a| a.channel == channel && a.id == id) {
        let out = output::render_single(
            &global.output,
            alert,
            |a| {
                format!(
                    "Status:   {}\nUpdated:  {}",
                    a.status,
                    fmt_time(a.resolved_at.or(a.acknowledged_at))
                )
            },
            |a| a.status.to_string(),
        );
        output::print_output(&out, global.quiet);
    }
}

#[cfg(test)]
mod tests {
    use sensorfeed_core::{ReadingValue, Severity};

    use super::*;

    #[test]
    fn row_renders_without_color() {
        let alert = Alert {
            id: 42,
            channel: Channel::Distance,
            device_id: "ESP_002".into(),
            message: "Distance too close: 8.5 cm (threshold 45.0 cm)".into(),
            value: ReadingValue::Level(8.5),
            status: AlertStatus::Acknowledged,
            severity: Severity::High,
            created_at: DateTime::parse_from_rfc3339("2025-03-01T10:00:00Z")
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            acknowledged_at: None,
            resolved_at: None,
        };
        let r = row(&alert, false);
        assert_eq!(r.channel, "distance");
        assert_eq!(r.severity, "high");
        assert_eq!(r.status, "acknowledged");
        assert_eq!(r.value, "8.5 cm");
        assert_eq!(r.created, "2025-03-01 10:00:00");
    }

    #[test]
    fn missing_time_is_dash() {
        assert_eq!(fmt_time(None), "-");
    }
}

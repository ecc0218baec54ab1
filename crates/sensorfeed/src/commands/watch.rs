//! Watch command: run the monitor and stream new readings to stdout.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use sensorfeed_core::model::level;
use sensorfeed_core::{Channel, Reading};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::util;

/// One printed line in JSON modes.
#[derive(Serialize)]
struct WatchEvent<'a> {
    channel: Channel,
    #[serde(flatten)]
    reading: &'a Reading,
}

/// Tracks the newest id printed per channel so each reading is printed
/// exactly once even when snapshots overlap.
struct Printer {
    channels: Vec<Channel>,
    last: HashMap<Channel, u64>,
    json: bool,
    color: bool,
    quiet: bool,
}

impl Printer {
    fn new(channels: Vec<Channel>, format: &OutputFormat, color: bool, quiet: bool) -> Self {
        Self {
            channels,
            last: HashMap::new(),
            json: !matches!(format, OutputFormat::Table | OutputFormat::Plain),
            color,
            quiet,
        }
    }

    /// Lines for readings newer than the last printed one, oldest first.
    fn lines(&mut self, channel: Channel, snapshot: &[Reading]) -> Vec<String> {
        if !self.channels.contains(&channel) {
            return Vec::new();
        }
        let last = self.last.get(&channel).copied().unwrap_or(0);
        let lines: Vec<String> = snapshot
            .iter()
            .take_while(|r| r.id > last)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .map(|r| self.format(channel, r))
            .collect();
        if let Some(head) = snapshot.first() {
            if head.id > last {
                self.last.insert(channel, head.id);
            }
        }
        lines
    }

    fn format(&self, channel: Channel, r: &Reading) -> String {
        if self.json {
            return serde_json::to_string(&WatchEvent {
                channel,
                reading: r,
            })
            .unwrap_or_default();
        }
        let label = level::describe(channel, r.value).unwrap_or_default();
        format!(
            "{:<10} #{:<8} {:>10}  {:<11} {}",
            channel.to_string(),
            r.id,
            output::paint_value(channel, r.value, self.color),
            label,
            r.recorded_at
        )
    }

    fn print(&mut self, channel: Channel, snapshot: &[Reading]) {
        for line in self.lines(channel, snapshot) {
            output::print_output(&line, self.quiet);
        }
    }
}

async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let (config, notifications) = crate::config::build_monitor_config(global)?;
    let monitor = util::monitor(config, notifications && !args.no_notify, color)?;

    let channels: Vec<Channel> = if args.channel.is_empty() {
        Channel::ALL.to_vec()
    } else {
        args.channel.iter().copied().map(Channel::from).collect()
    };
    let mut printer = Printer::new(channels, &global.output, color, global.quiet);

    let mut mic = monitor.feed(Channel::Microphone);
    let mut dist = monitor.feed(Channel::Distance);
    let mut motion = monitor.feed(Channel::Motion);

    monitor.start().await?;
    for channel in Channel::ALL {
        printer.print(channel, &monitor.feed_snapshot(channel));
    }

    let deadline = args.duration.map(|s| Instant::now() + Duration::from_secs(s));
    let stop_at = until(deadline);
    tokio::pin!(stop_at);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            biased;
            _ = &mut ctrl_c => break,
            () = &mut stop_at => break,
            snap = mic.changed() => match snap {
                Some(s) => printer.print(Channel::Microphone, &s),
                None => break,
            },
            snap = dist.changed() => match snap {
                Some(s) => printer.print(Channel::Distance, &s),
                None => break,
            },
            snap = motion.changed() => match snap {
                Some(s) => printer.print(Channel::Motion, &s),
                None => break,
            },
        }
    }

    monitor.stop().await;
    tracing::debug!("watch finished");
    Ok(())
}

//! Feed command handler.

use tabled::Tabled;

use sensorfeed_core::model::level;
use sensorfeed_core::{Channel, Reading, ReadingFilter};

use crate::cli::{FeedArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ReadingRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Recorded")]
    recorded_at: String,
}

fn row(channel: Channel, r: &Reading, color: bool) -> ReadingRow {
    ReadingRow {
        id: r.id,
        value: output::paint_value(channel, r.value, color),
        level: level::describe(channel, r.value).unwrap_or_else(|| "-".into()),
        recorded_at: r.recorded_at.clone(),
    }
}

/// Narrow a newest-first snapshot by the command's flags.
fn select(readings: &[Reading], channel: Channel, args: &FeedArgs) -> Vec<Reading> {
    let mut filters = Vec::new();
    if let Some(after) = args.after {
        filters.push(ReadingFilter::After(after));
    }
    if args.alerting {
        filters.push(ReadingFilter::Alerting(channel));
    }

    let matching = readings
        .iter()
        .filter(|r| filters.iter().all(|f| f.matches(r)))
        .cloned();
    match args.limit {
        Some(n) => matching.take(n).collect(),
        None => matching.collect(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: FeedArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let channel = Channel::from(args.channel);
    let color = output::should_color(&global.color);

    let (config, _) = crate::config::build_monitor_config(global)?;
    let monitor = util::monitor(config, false, color)?;

    let update = monitor.load_initial(channel).await?;
    tracing::debug!(
        channel = %channel,
        readings = update.readings.len(),
        watermark = update.outcome.watermark,
        "feed loaded"
    );

    let readings = select(&update.readings, channel, &args);
    let out = output::render_list(
        &global.output,
        &readings,
        |r| row(channel, r, color),
        |r| r.id.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use sensorfeed_core::ReadingValue;

    use super::*;
    use crate::cli::ChannelArg;

    fn args(limit: Option<usize>, after: Option<u64>, alerting: bool) -> FeedArgs {
        FeedArgs {
            channel: ChannelArg::Microphone,
            limit,
            after,
            alerting,
        }
    }

    fn readings() -> Vec<Reading> {
        [(5, 92.0), (4, 61.0), (3, 85.5), (2, 40.0)]
            .into_iter()
            .map(|(id, db)| Reading::new(id, ReadingValue::Level(db), "t"))
            .collect()
    }

    fn ids(rs: &[Reading]) -> Vec<u64> {
        rs.iter().map(|r| r.id).collect()
    }

    #[test]
    fn limit_keeps_newest() {
        let picked = select(&readings(), Channel::Microphone, &args(Some(2), None, false));
        assert_eq!(ids(&picked), vec![5, 4]);
    }

    #[test]
    fn filters_combine() {
        let picked = select(&readings(), Channel::Microphone, &args(None, Some(2), true));
        assert_eq!(ids(&picked), vec![5, 3]);
    }

    #[test]
    fn row_labels_level() {
        let r = Reading::new(9, ReadingValue::Level(72.0), "2025-03-01T10:00:00Z");
        let row = row(Channel::Microphone, &r, false);
        assert_eq!(row.value, "72.0 dB");
        assert_eq!(row.level, "normal");
    }
}

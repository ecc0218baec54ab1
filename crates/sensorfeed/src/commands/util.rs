//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::sync::Arc;

use owo_colors::OwoColorize;

use sensorfeed_core::{
    DisabledNotifier, Monitor, MonitorConfig, Notification, Notifier, NotifyOutcome,
};

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, the operation is refused rather than
/// assumed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Build a monitor whose notifications go to the terminal, or nowhere.
pub fn monitor(config: MonitorConfig, notifications: bool, color: bool) -> Result<Monitor, CliError> {
    let notifier: Arc<dyn Notifier> = if notifications {
        Arc::new(TerminalNotifier { color })
    } else {
        Arc::new(DisabledNotifier)
    };
    Ok(Monitor::with_notifier(config, notifier)?)
}

// ── Terminal notifier ────────────────────────────────────────────────

/// Prints alert notifications to stderr so they interleave with `watch`
/// output without polluting stdout.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    pub color: bool,
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: &Notification) -> NotifyOutcome {
        if self.color {
            eprintln!(
                "{} {}: {}",
                "!".red().bold(),
                notification.title.bold(),
                notification.body
            );
        } else {
            eprintln!("! {}: {}", notification.title, notification.body);
        }
        NotifyOutcome::Scheduled
    }
}

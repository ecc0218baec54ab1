//! Command dispatch: bridges CLI args -> monitor operations -> output formatting.

pub mod alerts;
pub mod config_cmd;
pub mod feed;
pub mod notify;
pub mod status;
pub mod util;
pub mod watch;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a network-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Feed(args) => feed::handle(args, global).await,
        Command::Watch(args) => watch::handle(args, global).await,
        Command::Status => status::handle(global).await,
        Command::Alerts(args) => alerts::handle(args, global).await,
        Command::Notify(args) => notify::handle(args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "local command reached network dispatch".into(),
        )),
    }
}

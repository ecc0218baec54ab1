//! Push notification command handlers.

use crate::cli::{GlobalOpts, NotifyArgs, NotifyCommand};
use crate::error::CliError;

use super::util;

pub async fn handle(args: NotifyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        NotifyCommand::Register { token, platform } => {
            if token.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "push token cannot be empty".into(),
                });
            }
            let (config, _) = crate::config::build_monitor_config(global)?;
            let monitor = util::monitor(config, false, false)?;
            monitor.register_push_token(&token, &platform).await?;
            if !global.quiet {
                eprintln!("✓ Registered push token for platform '{platform}'");
            }
            Ok(())
        }
    }
}

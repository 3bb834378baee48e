use crate::error::PluginError;
use crate::host::CommandSender;
use crate::plugin::StackLimit;
use thiserror::Error;

mod reload;

pub const COMMAND_NAME: &str = "stacklimit";
pub const USAGE: &str = "Usage: /stacklimit reload";

pub type CommandResult = Result<String, CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{}", USAGE)]
    Usage,

    #[error(transparent)]
    Plugin(#[from] PluginError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subcommand {
    Reload,
}

pub fn parse_args(args: &[&str]) -> Result<Subcommand, CommandError> {
    match args {
        [arg] if arg.eq_ignore_ascii_case("reload") => Ok(Subcommand::Reload),
        _ => Err(CommandError::Usage),
    }
}

/// Runs `/stacklimit ...`. Returns `false` only when `command` is not ours;
/// every form of our command is handled and answered.
pub fn on_command(plugin: &StackLimit, sender: &mut dyn CommandSender, command: &str, args: &[&str]) -> bool {
    if !command.eq_ignore_ascii_case(COMMAND_NAME) {
        return false;
    }

    let result = parse_args(args).and_then(|sub| match sub {
        Subcommand::Reload => reload::reload(plugin),
    });

    match result {
        Ok(reply) => sender.send_message(&reply),
        Err(CommandError::Usage) => sender.send_message(USAGE),
        Err(e) => {
            tracing::error!(sender = sender.name(), error = %e, "stacklimit command failed");
            sender.send_message(&format!("[StackLimit] reload failed: {e}"));
        }
    }
    true
}

/// Parses a raw console/chat line (leading `/` optional) and dispatches it
pub fn process_command(plugin: &StackLimit, sender: &mut dyn CommandSender, raw: &str) -> bool {
    let mut parts = raw.trim().trim_start_matches('/').split_whitespace();
    let Some(command) = parts.next() else {
        return false;
    };
    let args: Vec<&str> = parts.collect();
    on_command(plugin, sender, command, &args)
}

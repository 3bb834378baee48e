use crate::commands::CommandResult;
use crate::plugin::StackLimit;

pub const RELOADED: &str = "[StackLimit] config reloaded.";

pub fn reload(plugin: &StackLimit) -> CommandResult {
    plugin.reload()?;
    Ok(RELOADED.to_string())
}

//! Maintenance command implementation.

use crate::cli::args::MaintenanceArgs;
use crate::error::{PytheonError, Result};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// Toggles the maintenance page.
pub struct MaintenanceCommand {
    args: MaintenanceArgs,
}

impl MaintenanceCommand {
    pub fn new(args: MaintenanceArgs) -> Self {
        Self { args }
    }
}

impl Command for MaintenanceCommand {
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandResult> {
        ctx.project()?;

        let state = match (self.args.enable, self.args.disable) {
            (true, _) => "enabled",
            (_, true) => "disabled",
            _ => return Err(PytheonError::usage("Please choose --enable or --disable")),
        };

        ctx.ui.success(&format!("maintenance page is now {}", state));
        Ok(CommandResult::success())
    }
}

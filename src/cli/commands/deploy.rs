//! Deploy command implementation.

use crate::error::{PytheonError, Result};
use crate::vcs::Vcs;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// Pushes a clean working copy to the platform.
pub struct DeployCommand;

impl Command for DeployCommand {
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandResult> {
        let name = ctx.project()?.name()?.to_string();
        let vcs = Vcs::detect(&ctx.project_root)?;

        if vcs.is_dirty(&ctx.project_root)? {
            return Err(PytheonError::usage(
                "You have some uncommited changes. Deploy aborted.",
            ));
        }

        tracing::debug!("Deploying {} with {}", name, vcs.binary());
        vcs.push(&ctx.project_root)?;
        ctx.ui.success("Deploy success");
        Ok(CommandResult::success())
    }
}

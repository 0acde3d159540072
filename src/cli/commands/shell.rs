//! Shell command implementation.

use crate::error::Result;
use crate::vcs::{run, shell_target, RunOptions};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// Opens an ssh session on the project's host.
pub struct ShellCommand;

impl Command for ShellCommand {
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandResult> {
        let target = shell_target(ctx.project()?.name()?);
        run("ssh", &[target.as_str()], &RunOptions::inherited(&ctx.project_root))?;
        Ok(CommandResult::success())
    }
}

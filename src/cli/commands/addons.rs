//! Addons command implementation.
//!
//! The `pytheon addons` command lists the addons the platform offers and
//! manages the addons of the current project.

use crate::api::ApiRequest;
use crate::cli::args::AddonsArgs;
use crate::error::Result;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The addons command implementation.
pub struct AddonsCommand {
    args: AddonsArgs,
}

impl AddonsCommand {
    /// Create a new addons command.
    pub fn new(args: AddonsArgs) -> Self {
        Self { args }
    }

    /// Request for `project_name` matching the chosen action.
    fn request(&self, project_name: &str) -> ApiRequest {
        let path = format!("/v1/applications/{}/addons", project_name);

        if self.args.all {
            ApiRequest::get("/v1/addons")
        } else if let Some(add) = &self.args.add {
            ApiRequest::post(path)
                .param("id", add.id.as_str())
                .param("plan", add.plan.as_str())
        } else if let Some(upgrade) = &self.args.upgrade {
            ApiRequest::post(format!("{}/{}", path, upgrade.id))
                .param("plan", upgrade.plan.as_str())
        } else if let Some(id) = &self.args.delete {
            ApiRequest::delete(format!("{}/{}", path, id))
        } else {
            ApiRequest::get(path)
        }
    }
}

impl Command for AddonsCommand {
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandResult> {
        let req = self.request(ctx.project()?.name()?);
        let payload = ctx.request(&req)?;
        Ok(ctx.report(&payload))
    }
}

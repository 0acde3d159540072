//! Apps command implementation.

use crate::api::ApiRequest;
use crate::cli::args::AppsArgs;
use crate::error::Result;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// Lists or deletes the operator's applications.
pub struct AppsCommand {
    args: AppsArgs,
}

impl AppsCommand {
    pub fn new(args: AppsArgs) -> Self {
        Self { args }
    }

    fn request(&self) -> ApiRequest {
        match &self.args.delete {
            Some(app) => ApiRequest::delete(format!("/v1/applications/{}", app)),
            None => ApiRequest::get("/v1/applications"),
        }
    }
}

impl Command for AppsCommand {
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandResult> {
        let payload = ctx.request(&self.request())?;
        Ok(ctx.report(&payload))
    }
}

//! Register command implementation.
//!
//! The `pytheon register` command creates an account, confirms it with the
//! key sent by e-mail (setting a password), or asks for a password reset.

use crate::api::ApiRequest;
use crate::cli::args::RegisterArgs;
use crate::error::{PytheonError, Result};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The register command implementation.
pub struct RegisterCommand {
    args: RegisterArgs,
}

impl RegisterCommand {
    /// Create a new register command.
    pub fn new(args: RegisterArgs) -> Self {
        Self { args }
    }
}

impl Command for RegisterCommand {
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandResult> {
        if self.args.confirm_key.is_some() && self.args.reset_password {
            return Err(PytheonError::usage(
                "You can't reset a password with a confirmation key",
            ));
        }

        if let Some(email) = &self.args.email {
            let user = ctx.credentials.user_mut();
            user.username = Some(email.clone());
            user.save()?;
        }

        let username = ctx
            .credentials
            .user()
            .username
            .clone()
            .ok_or_else(|| PytheonError::usage("Please specify a valid email"))?;

        let req = if let Some(key) = &self.args.confirm_key {
            let password = ctx.credentials.prompt_password(&mut *ctx.ui)?;
            ApiRequest::post(format!("/v1/set_password/{}", key.trim_matches('/')))
                .param("password", password)
        } else if self.args.reset_password {
            ApiRequest::post("/v1/reset_password/").param("email", username)
        } else {
            ApiRequest::post("/v1/register").param("email", username)
        };

        let payload = ctx.request(&req.without_auth())?;
        Ok(ctx.report(&payload))
    }
}

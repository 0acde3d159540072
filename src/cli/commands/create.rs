//! Create command implementation.
//!
//! The `pytheon create` command turns the current git or hg working copy
//! into a pytheon project:
//! - user settings are created with the account name if missing
//! - the project settings file is written and committed
//! - a `pytheon` remote is added
//! - the application is registered with the API

use std::path::Path;

use crate::api::ApiRequest;
use crate::cli::args::CreateArgs;
use crate::config::{ProjectConfig, BUILDOUT_FILE};
use crate::error::{PytheonError, Result};
use crate::ui::Prompt;
use crate::vcs::{remote_url, Vcs};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The create command implementation.
pub struct CreateCommand {
    args: CreateArgs,
}

impl CreateCommand {
    /// Create a new create command.
    pub fn new(args: CreateArgs) -> Self {
        Self { args }
    }

    /// Make sure the user settings name an account.
    fn ensure_username(&self, ctx: &mut CommandContext<'_>) -> Result<String> {
        if let Some(username) = &ctx.credentials.user().username {
            return Ok(username.clone());
        }

        let username = match &self.args.email {
            Some(email) => email.clone(),
            None => ctx.ui.prompt(&Prompt::input("username", "Username"))?,
        };
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(PytheonError::usage("Please specify a valid email"));
        }

        let user = ctx.credentials.user_mut();
        user.username = Some(username.clone());
        user.save()?;
        Ok(username)
    }

    /// Load or start the project settings, applying `--project-name`.
    fn prepare_project(&self, ctx: &mut CommandContext<'_>) -> Result<ProjectConfig> {
        let root = ctx.project_root.clone();
        let path = if self.args.buildout {
            root.join(BUILDOUT_FILE)
        } else {
            ProjectConfig::locate(&root)
        };
        let default_name = directory_name(&root);

        let mut project = if path.is_file() {
            ProjectConfig::load(&path)?
        } else {
            let name = match &self.args.project_name {
                Some(name) => name.clone(),
                None => {
                    let prompt = Prompt::input("project_name", "Project name")
                        .with_default(default_name.clone());
                    ctx.ui.prompt(&prompt)?
                }
            };
            ProjectConfig::new_project(&path, name.trim())
        };

        if let Some(name) = &self.args.project_name {
            project.project_name = Some(name.clone());
        }
        if !project.is_valid() {
            project.project_name = Some(default_name);
        }

        project.save()?;
        Ok(project)
    }
}

impl Command for CreateCommand {
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandResult> {
        let vcs = Vcs::detect(&ctx.project_root)?;
        let username = self.ensure_username(ctx)?;
        let project = self.prepare_project(ctx)?;
        let name = project.name()?.to_string();

        let template = self
            .args
            .remote
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| vcs.default_remote_template().to_string());
        let remote = remote_url(&template, &name, &username);
        tracing::debug!("Remote for {}: {}", name, remote);

        vcs.add_remote(&ctx.project_root, &remote)?;
        vcs.commit_file(&ctx.project_root, project.path())?;
        ctx.project = Some(project);

        let payload = ctx.request(&ApiRequest::post("/v1/applications").param("name", name))?;
        Ok(ctx.report(&payload))
    }
}

fn directory_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

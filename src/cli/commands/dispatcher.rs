//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandContext`] carrying settings, credentials and the API client
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use clap::CommandFactory;
use std::path::PathBuf;

use crate::api::{ApiClient, ApiEndpoint, ApiRequest, Payload};
use crate::auth::{select_store, CredentialResolver};
use crate::cli::args::{Cli, Commands};
use crate::config::{resolve_api_host, ProjectConfig, UserConfig, CA_BUNDLE_ENV};
use crate::error::{PytheonError, Result};
use crate::ui::UserInterface;

use super::add_key::AddKeyCommand;
use super::addons::AddonsCommand;
use super::apps::AppsCommand;
use super::create::CreateCommand;
use super::deploy::DeployCommand;
use super::display;
use super::maintenance::MaintenanceCommand;
use super::register::RegisterCommand;
use super::shell::ShellCommand;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Settings, credentials, API client and user interface
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Everything a command handler works with.
pub struct CommandContext<'a> {
    /// Directory the command runs in.
    pub project_root: PathBuf,
    /// Operator's home directory, for default key files.
    pub home_dir: Option<PathBuf>,
    /// Project settings; always present for project commands.
    pub project: Option<ProjectConfig>,
    /// Credentials and the user settings they live in.
    pub credentials: CredentialResolver,
    pub api: ApiClient,
    pub ui: &'a mut dyn UserInterface,
}

impl CommandContext<'_> {
    /// Run an API request through the authenticated pipeline.
    pub fn request(&mut self, req: &ApiRequest) -> Result<Payload> {
        self.api.request(req, &mut self.credentials, &mut *self.ui)
    }

    /// Show a response and turn it into a result.
    pub fn report(&mut self, payload: &Payload) -> CommandResult {
        if display::report(&mut *self.ui, payload) {
            CommandResult::failure(1)
        } else {
            CommandResult::success()
        }
    }

    /// The validated project settings.
    pub fn project(&self) -> Result<&ProjectConfig> {
        self.project.as_ref().ok_or_else(|| PytheonError::NotAProject {
            path: self.project_root.clone(),
        })
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    user_config_path: PathBuf,
    home_dir: Option<PathBuf>,
    api_host: Option<String>,
    platform_store: bool,
    password_override: Option<String>,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root and user settings file.
    pub fn new(project_root: PathBuf, user_config_path: PathBuf) -> Self {
        Self {
            project_root,
            user_config_path,
            home_dir: dirs::home_dir(),
            api_host: None,
            platform_store: true,
            password_override: None,
        }
    }

    /// Override the API host from the settings file.
    pub fn with_api_host(mut self, api_host: Option<String>) -> Self {
        self.api_host = api_host;
        self
    }

    /// Whether to try the platform credential store.
    pub fn with_platform_store(mut self, enabled: bool) -> Self {
        self.platform_store = enabled;
        self
    }

    /// Password to use instead of prompting.
    pub fn with_password_override(mut self, password: Option<String>) -> Self {
        self.password_override = password;
        self
    }

    /// Home directory used to find default key files.
    pub fn with_home_dir(mut self, home_dir: Option<PathBuf>) -> Self {
        self.home_dir = home_dir;
        self
    }

    /// Dispatch a command and report any failure.
    ///
    /// Errors are shown through `ui`, followed by the command's help unless
    /// the error is about the network, the server, credentials or an
    /// interrupt.
    pub fn dispatch(&self, command: &Commands, ui: &mut dyn UserInterface) -> CommandResult {
        match self.try_dispatch(command, ui) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!("{} failed: {:?}", command.name(), e);
                ui.error(&e.to_string());
                if e.shows_help() {
                    if let Some(help) = command_help(command.name()) {
                        ui.message("");
                        ui.message(&help);
                    }
                }
                CommandResult::failure(i32::from(e.exit_code()))
            }
        }
    }

    /// Dispatch a command, returning its error unreported.
    ///
    /// Project commands are refused before any settings are read or any
    /// request is sent when the working directory is not a valid project.
    pub fn try_dispatch(
        &self,
        command: &Commands,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let project = if command.is_project_command() {
            Some(ProjectConfig::load_valid(&self.project_root)?)
        } else {
            None
        };

        let user = UserConfig::load_or_default(&self.user_config_path)?;
        let endpoint: ApiEndpoint = resolve_api_host(self.api_host.as_deref(), &user).parse()?;
        let ca_bundle = std::env::var_os(CA_BUNDLE_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| user.ca_bundle.clone());

        tracing::debug!("API endpoint: {}", endpoint);
        let store = select_store(&endpoint.host, self.platform_store);
        let api = ApiClient::new(endpoint, ca_bundle.as_deref())?;
        let credentials = CredentialResolver::new(user, store)
            .with_password_override(self.password_override.clone());

        let mut ctx = CommandContext {
            project_root: self.project_root.clone(),
            home_dir: self.home_dir.clone(),
            project,
            credentials,
            api,
            ui,
        };

        match command {
            Commands::Register(args) => RegisterCommand::new(args.clone()).execute(&mut ctx),
            Commands::Create(args) => CreateCommand::new(args.clone()).execute(&mut ctx),
            Commands::Apps(args) => AppsCommand::new(args.clone()).execute(&mut ctx),
            Commands::Addons(args) => AddonsCommand::new(args.clone()).execute(&mut ctx),
            Commands::Deploy => DeployCommand.execute(&mut ctx),
            Commands::Shell => ShellCommand.execute(&mut ctx),
            Commands::Maintenance(args) => MaintenanceCommand::new(args.clone()).execute(&mut ctx),
            Commands::AddKey(args) => AddKeyCommand::new(args.clone()).execute(&mut ctx),
        }
    }
}

/// Rendered help of a subcommand.
pub fn command_help(name: &str) -> Option<String> {
    let mut cli = Cli::command();
    cli.build();
    cli.find_subcommand_mut(name)
        .map(|sub| sub.render_help().to_string())
}

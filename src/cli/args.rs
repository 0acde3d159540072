//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{ArgGroup, Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::PytheonError;

/// Pytheon - deploy and manage applications on the Pytheon platform.
#[derive(Debug, Parser)]
#[command(name = "pytheon")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true, arg_required_else_help = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// API host as host:port (port 443 uses TLS)
    #[arg(long, global = true, env = "PYTHEON_API_HOST", value_name = "HOST:PORT")]
    pub api_host: Option<String>,

    /// Keep credentials in ~/.pytheonrc instead of the system keyring
    #[arg(long, global = true, env = "PYTHEON_NO_KEYRING")]
    pub no_keyring: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Register on pytheon, confirm a key or reset your password
    Register(RegisterArgs),

    /// Create your pytheon project
    Create(CreateArgs),

    /// Application related commands
    Apps(AppsArgs),

    /// Addon management
    Addons(AddonsArgs),

    /// Deploy current repository to pytheon
    Deploy,

    /// Open a ssh shell on pytheon
    Shell,

    /// Toggle the maintenance page
    Maintenance(MaintenanceArgs),

    /// Add a public key to your pytheon account
    #[command(name = "add_key", alias = "add-key")]
    AddKey(AddKeyArgs),
}

impl Commands {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Register(_) => "register",
            Self::Create(_) => "create",
            Self::Apps(_) => "apps",
            Self::Addons(_) => "addons",
            Self::Deploy => "deploy",
            Self::Shell => "shell",
            Self::Maintenance(_) => "maintenance",
            Self::AddKey(_) => "add_key",
        }
    }

    /// Whether the command must run inside a project directory.
    pub fn is_project_command(&self) -> bool {
        matches!(
            self,
            Self::Addons(_) | Self::Deploy | Self::Shell | Self::Maintenance(_)
        )
    }
}

/// Arguments for the `register` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RegisterArgs {
    /// E-mail (saved as your username)
    #[arg(short, long, value_name = "EMAIL")]
    pub email: Option<String>,

    /// Confirm key received by e-mail; asks for a new password
    #[arg(short = 'k', long, value_name = "KEY", conflicts_with = "reset_password")]
    pub confirm_key: Option<String>,

    /// Send a password reset request
    #[arg(short, long)]
    pub reset_password: bool,
}

/// Arguments for the `create` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CreateArgs {
    /// Use buildout.cfg file instead of deploy.ini
    #[arg(short, long)]
    pub buildout: bool,

    /// Application name (default: current directory name)
    #[arg(short = 'n', long, value_name = "NAME")]
    pub project_name: Option<String>,

    /// E-mail
    #[arg(short, long, value_name = "EMAIL")]
    pub email: Option<String>,

    /// Remote URL template with %(project_name)s and %(username)s
    #[arg(long, env = "PYTHEON_REMOTE", hide = true)]
    pub remote: Option<String>,
}

/// Arguments for the `apps` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct AppsArgs {
    /// List your applications
    #[arg(short, long)]
    pub list: bool,

    /// Delete application
    #[arg(long, value_name = "APP", conflicts_with = "list")]
    pub delete: Option<String>,
}

/// Arguments for the `addons` command.
#[derive(Debug, Clone, Default, clap::Args)]
#[command(group(ArgGroup::new("action").args(["list", "add", "upgrade", "delete", "all"])))]
pub struct AddonsArgs {
    /// List your application addons
    #[arg(short, long)]
    pub list: bool,

    /// Add application addon
    #[arg(long, value_name = "ADDON:PLAN")]
    pub add: Option<AddonPlan>,

    /// Upgrade application addon
    #[arg(long, value_name = "ADDON:PLAN")]
    pub upgrade: Option<AddonPlan>,

    /// Delete application addon
    #[arg(long, value_name = "ADDON")]
    pub delete: Option<String>,

    /// List all available addons
    #[arg(long)]
    pub all: bool,
}

/// An `addon:plan` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonPlan {
    pub id: String,
    pub plan: String,
}

impl FromStr for AddonPlan {
    type Err = PytheonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((id, plan)) if !id.is_empty() && !plan.is_empty() && !plan.contains(':') => {
                Ok(Self {
                    id: id.to_string(),
                    plan: plan.to_string(),
                })
            }
            _ => Err(PytheonError::usage("Please specify a addon:plan")),
        }
    }
}

impl fmt::Display for AddonPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.plan)
    }
}

/// Arguments for the `maintenance` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct MaintenanceArgs {
    /// Enable maintenance page
    #[arg(short, long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable maintenance page
    #[arg(short, long)]
    pub disable: bool,
}

/// Arguments for the `add_key` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct AddKeyArgs {
    /// Key name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Public key file (default: ~/.ssh/id_rsa.pub, then ~/.ssh/id_dsa.pub)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_register_email() {
        let cli = Cli::try_parse_from(["pytheon", "register", "-e", "user@example.com"]).unwrap();
        match cli.command {
            Commands::Register(args) => {
                assert_eq!(args.email.as_deref(), Some("user@example.com"));
                assert!(!args.reset_password);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn confirm_key_conflicts_with_reset() {
        let result = Cli::try_parse_from(["pytheon", "register", "-k", "abc", "-r"]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pytheon",
            "apps",
            "--verbose",
            "--api-host",
            "localhost:6543",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.api_host.as_deref(), Some("localhost:6543"));
    }

    #[test]
    fn add_key_has_both_spellings() {
        let cli = Cli::try_parse_from(["pytheon", "add_key", "-n", "laptop"]).unwrap();
        assert_eq!(cli.command.name(), "add_key");
        let cli = Cli::try_parse_from(["pytheon", "add-key", "key.pub"]).unwrap();
        match cli.command {
            Commands::AddKey(args) => assert_eq!(args.file, Some(PathBuf::from("key.pub"))),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn addon_plan_parses() {
        let cli = Cli::try_parse_from(["pytheon", "addons", "--add", "mysql:premium"]).unwrap();
        match cli.command {
            Commands::Addons(args) => assert_eq!(
                args.add,
                Some(AddonPlan {
                    id: "mysql".to_string(),
                    plan: "premium".to_string()
                })
            ),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn malformed_addon_plan_is_rejected() {
        assert!("mysql".parse::<AddonPlan>().is_err());
        assert!(":premium".parse::<AddonPlan>().is_err());
        assert!("a:b:c".parse::<AddonPlan>().is_err());
        assert!(Cli::try_parse_from(["pytheon", "addons", "--add", "mysql"]).is_err());
    }

    #[test]
    fn addon_actions_are_exclusive() {
        let result = Cli::try_parse_from(["pytheon", "addons", "--all", "--delete", "mysql"]);
        assert!(result.is_err());
    }

    #[test]
    fn project_commands() {
        let cli = Cli::try_parse_from(["pytheon", "deploy"]).unwrap();
        assert!(cli.command.is_project_command());
        let cli = Cli::try_parse_from(["pytheon", "create"]).unwrap();
        assert!(!cli.command.is_project_command());
    }

    #[test]
    fn no_command_is_an_error() {
        assert!(Cli::try_parse_from(["pytheon"]).is_err());
    }
}

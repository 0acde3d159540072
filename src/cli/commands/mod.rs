//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. This allows:
//! - Project commands to be refused outside a project before any request
//! - Settings, credentials and the API client to be built once per run
//! - Errors to be reported the same way for every command

pub mod add_key;
pub mod addons;
pub mod apps;
pub mod create;
pub mod deploy;
pub mod dispatcher;
pub mod display;
pub mod maintenance;
pub mod register;
pub mod shell;

pub use dispatcher::{command_help, Command, CommandContext, CommandDispatcher, CommandResult};

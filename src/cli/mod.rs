//! Command-line interface for Pytheon.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    AddKeyArgs, AddonPlan, AddonsArgs, AppsArgs, Cli, Commands, CreateArgs, MaintenanceArgs,
    RegisterArgs,
};
pub use commands::{Command, CommandContext, CommandDispatcher, CommandResult};

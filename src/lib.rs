//! Pytheon - command-line client for the Pytheon hosting platform.
//!
//! Pytheon registers accounts, creates and deploys projects, manages addons
//! and SSH keys by talking to the Pytheon API and by pushing code with the
//! operator's own git or hg.
//!
//! # Modules
//!
//! - [`api`] - Authenticated HTTP request pipeline
//! - [`auth`] - Sessions, credential stores and credential resolution
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - User and project settings files
//! - [`error`] - Error types and result aliases
//! - [`ui`] - Interactive prompts, spinners, and terminal output
//! - [`vcs`] - git/hg and external program helpers
//!
//! # Example
//!
//! ```
//! use pytheon::api::{ApiRequest, Method};
//!
//! let req = ApiRequest::get("/v1/applications").param("name", "www");
//! assert_eq!(req.effective_method(), Method::Post);
//! ```

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod ui;
pub mod vcs;

pub use error::{PytheonError, Result};

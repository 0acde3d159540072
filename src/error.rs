//! Error types for Pytheon operations.
//!
//! This module defines [`PytheonError`], the primary error type used throughout
//! the client, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every failure surfaces to the command dispatcher, which decides whether
//!   to show the command's help text and which exit code to use
//! - Use `anyhow::Error` (via `PytheonError::Other`) for unexpected errors
//! - Messages are written for the operator, not for the developer

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Pytheon operations.
#[derive(Debug, Error)]
pub enum PytheonError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse a configuration file.
    #[error("Failed to parse config at {path} (line {line}): {message}")]
    ConfigParseError {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Bad flags or arguments for a command.
    #[error("{message}")]
    Usage { message: String },

    /// A project command ran outside a directory holding a valid project config.
    #[error("It looks like you are not in a valid pytheon project: {path}")]
    NotAProject { path: PathBuf },

    /// No cached credential and no way to prompt for one.
    #[error("No stored credentials and no terminal available to ask for them")]
    CredentialsUnavailable,

    /// The API rejected the credentials after the single re-authentication.
    #[error("Authentication failed for {path}: invalid password or expired session")]
    AuthenticationFailed { path: String },

    /// Certificate chain or hostname validation failed.
    #[error("TLS validation failed for {host}: {message}")]
    TlsValidation { host: String, message: String },

    /// Transport-level failure talking to the API.
    #[error("Unable to contact {host}: {message}")]
    Network { host: String, message: String },

    /// The API answered with a 5xx status.
    #[error("Server error {status} - {reason}")]
    Server { status: u16, reason: String },

    /// An external program (git, hg, ssh) failed.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// The file offered as an SSH public key is unusable.
    #[error("{}: {message}", .path.display())]
    InvalidKey { path: PathBuf, message: String },

    /// The platform credential store refused an operation.
    #[error("Credential store error: {message}")]
    SecretStore { message: String },

    /// The operator interrupted a prompt.
    #[error("Interrupted")]
    Interrupted,

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PytheonError {
    /// Build a usage error from a message.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Whether this error stems from how the command was invoked.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage { .. } | Self::NotAProject { .. })
    }

    /// Whether the dispatcher should print the command's help after the error.
    pub fn shows_help(&self) -> bool {
        !matches!(
            self,
            Self::Interrupted
                | Self::CredentialsUnavailable
                | Self::AuthenticationFailed { .. }
                | Self::TlsValidation { .. }
                | Self::Network { .. }
                | Self::Server { .. }
        )
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage { .. } | Self::NotAProject { .. } => 2,
            Self::Interrupted => 130,
            _ => 1,
        }
    }
}

impl From<dialoguer::Error> for PytheonError {
    fn from(e: dialoguer::Error) -> Self {
        let err: io::Error = e.into();
        if err.kind() == io::ErrorKind::Interrupted {
            Self::Interrupted
        } else {
            Self::Io(err)
        }
    }
}

/// Result type alias for Pytheon operations.
pub type Result<T> = std::result::Result<T, PytheonError>;

//! Add key command implementation.
//!
//! The `pytheon add_key` command uploads an SSH public key to the account.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::api::ApiRequest;
use crate::cli::args::AddKeyArgs;
use crate::error::{PytheonError, Result};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// Upper bound on the bytes read from a key file.
pub const MAX_KEY_BYTES: u64 = 30000;

/// Key files tried, in order, when none is given.
const DEFAULT_KEYS: [&str; 2] = ["id_rsa.pub", "id_dsa.pub"];

/// The add_key command implementation.
pub struct AddKeyCommand {
    args: AddKeyArgs,
}

impl AddKeyCommand {
    /// Create a new add_key command.
    pub fn new(args: AddKeyArgs) -> Self {
        Self { args }
    }

    /// Resolve the key file to upload.
    fn key_path(&self, home: Option<&Path>) -> Result<PathBuf> {
        if let Some(file) = &self.args.file {
            let path = expand_home(file, home);
            if !path.is_file() {
                return Err(PytheonError::usage(format!(
                    "File {} not found.",
                    path.display()
                )));
            }
            return Ok(path);
        }

        home.map(|h| h.join(".ssh"))
            .and_then(|ssh| {
                DEFAULT_KEYS
                    .iter()
                    .map(|name| ssh.join(name))
                    .find(|p| p.is_file())
            })
            .ok_or_else(|| {
                PytheonError::usage(
                    "Default key files ~/.ssh/id_rsa.pub and ~/.ssh/id_dsa.pub were not found. \
                     Please specify key filename",
                )
            })
    }
}

impl Command for AddKeyCommand {
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandResult> {
        let path = self.key_path(ctx.home_dir.as_deref())?;
        let raw_data = read_public_key(&path)?;

        let mut req = ApiRequest::post("/v1/account/keys").param("raw_data", raw_data);
        if let Some(name) = &self.args.name {
            req = req.param("name", name.as_str());
        }

        let payload = ctx.request(&req)?;
        Ok(ctx.report(&payload))
    }
}

/// Read at most [`MAX_KEY_BYTES`] of a public key, refusing anything that
/// doesn't look like one.
pub fn read_public_key(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Could not open {}", path.display()))?;
    let mut bytes = Vec::new();
    file.take(MAX_KEY_BYTES)
        .read_to_end(&mut bytes)
        .with_context(|| format!("Could not read {}", path.display()))?;
    let raw = String::from_utf8_lossy(&bytes).to_string();

    if raw.is_empty() {
        return Err(PytheonError::InvalidKey {
            path: path.to_path_buf(),
            message: "Could not read file. Please check file permissions".to_string(),
        });
    }
    if !raw.starts_with("ssh-") {
        return Err(PytheonError::InvalidKey {
            path: path.to_path_buf(),
            message: "does not seem to be a public key. Please make sure it is not your private key"
                .to_string(),
        });
    }
    Ok(raw)
}

fn expand_home(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

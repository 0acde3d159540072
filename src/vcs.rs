//! Version control and external program helpers.
//!
//! Projects are pushed to the platform with the operator's own `git` or `hg`
//! binary, through a remote named `pytheon`.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::IniDocument;
use crate::error::{PytheonError, Result};

/// Name of the remote the platform is pushed to.
pub const REMOTE_NAME: &str = "pytheon";

/// Environment variable overriding the remote URL template.
pub const REMOTE_ENV: &str = "PYTHEON_REMOTE";

/// Host serving project shells.
pub const SHELL_HOST: &str = "pytheon.net";

/// Options for running an external program.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Capture stdout/stderr (if false, inherits from parent).
    pub capture: bool,
}

impl RunOptions {
    /// Captured output, run in `cwd`.
    pub fn captured(cwd: &Path) -> Self {
        Self {
            cwd: Some(cwd.to_path_buf()),
            capture: true,
        }
    }

    /// Inherited terminal, run in `cwd`.
    pub fn inherited(cwd: &Path) -> Self {
        Self {
            cwd: Some(cwd.to_path_buf()),
            capture: false,
        }
    }
}

/// Run `program` with `args`, failing with `CommandFailed` unless it exits 0.
///
/// Returns the captured stdout, or an empty string when the terminal is
/// inherited.
pub fn run(program: &str, args: &[&str], options: &RunOptions) -> Result<String> {
    let command_line = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");
    tracing::debug!("Running: {}", command_line);

    let mut cmd = Command::new(program);
    cmd.args(args);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    if options.capture {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    } else {
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
    }

    let output = cmd.output().map_err(|e| {
        tracing::debug!("Failed to start {}: {}", program, e);
        PytheonError::CommandFailed {
            command: command_line.clone(),
            code: None,
        }
    })?;

    if !output.status.success() {
        tracing::debug!(
            "{} failed: {}",
            program,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Err(PytheonError::CommandFailed {
            command: command_line,
            code: output.status.code(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Supported version control systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vcs {
    Git,
    Hg,
}

impl Vcs {
    /// Detect the working copy kind of `root`.
    pub fn detect(root: &Path) -> Result<Self> {
        if root.join(".git").is_dir() {
            Ok(Self::Git)
        } else if root.join(".hg").is_dir() {
            Ok(Self::Hg)
        } else {
            Err(PytheonError::usage(
                "Not a VCS directory. Please run \"git init\" or \"hg init\"",
            ))
        }
    }

    pub fn binary(&self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Hg => "hg",
        }
    }

    /// Remote URL template used when `PYTHEON_REMOTE` is unset.
    pub fn default_remote_template(&self) -> &'static str {
        match self {
            Self::Git => "git@git.pytheon.net:%(project_name)s.git",
            Self::Hg => "hg@hg.pytheon.net/%(project_name)s",
        }
    }

    /// Whether the working copy has uncommitted changes.
    pub fn is_dirty(&self, root: &Path) -> Result<bool> {
        let args: &[&str] = match self {
            Self::Git => &["status", "-s"],
            Self::Hg => &["status"],
        };
        let status = run(self.binary(), args, &RunOptions::captured(root))?;
        Ok(!status.trim().is_empty())
    }

    /// Point the `pytheon` remote at `url`.
    ///
    /// git keeps an existing remote as is; hg has its `[paths]` entry
    /// rewritten.
    pub fn add_remote(&self, root: &Path, url: &str) -> Result<()> {
        match self {
            Self::Git => {
                if let Err(e) = run(
                    "git",
                    &["remote", "add", REMOTE_NAME, url],
                    &RunOptions::captured(root),
                ) {
                    tracing::debug!("Remote not added: {}", e);
                }
                Ok(())
            }
            Self::Hg => {
                let hgrc = root.join(".hg").join("hgrc");
                let mut doc = IniDocument::load_optional(&hgrc)?;
                doc.set("paths", REMOTE_NAME, url);
                doc.write(&hgrc)
            }
        }
    }

    /// Stage and commit a single file. Nothing to commit is not an error.
    pub fn commit_file(&self, root: &Path, file: &Path) -> Result<()> {
        let file = file
            .strip_prefix(root)
            .unwrap_or(file)
            .to_string_lossy()
            .to_string();
        let message = format!("[pytheon] auto update {}", file);
        let options = RunOptions::captured(root);

        if let Err(e) = run(self.binary(), &["add", file.as_str()], &options) {
            tracing::debug!("{}", e);
        }
        let commit = ["commit", file.as_str(), "-m", message.as_str()];
        if let Err(e) = run(self.binary(), &commit, &options) {
            tracing::debug!("{}", e);
        }
        Ok(())
    }

    /// Push the working copy to the platform.
    pub fn push(&self, root: &Path) -> Result<()> {
        let args: &[&str] = match self {
            Self::Git => &["push", REMOTE_NAME, "master"],
            Self::Hg => &["push", REMOTE_NAME],
        };
        run(self.binary(), args, &RunOptions::inherited(root)).map(|_| ())
    }
}

/// Expand a remote template. Trailing slashes are dropped.
pub fn remote_url(template: &str, project_name: &str, username: &str) -> String {
    template
        .trim_end_matches('/')
        .replace("%(project_name)s", project_name)
        .replace("%(username)s", username)
}

/// `ssh` destination for a project's shell.
pub fn shell_target(project_name: &str) -> String {
    format!("{}@{}", project_name, SHELL_HOST)
}

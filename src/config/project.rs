//! Per-project settings (`deploy.ini` or `buildout.cfg`).

use std::path::{Path, PathBuf};

use super::ini::{section_from, IniDocument};
use crate::error::{PytheonError, Result};

/// Section holding the deployment settings.
pub const DEPLOY_SECTION: &str = "deploy";

/// Buildout-based projects keep their settings here.
pub const BUILDOUT_FILE: &str = "buildout.cfg";

/// Default project settings file.
pub const DEPLOY_FILE: &str = "deploy.ini";

/// Deployment profile written for new projects.
pub const DEFAULT_PROFILE: &str = "gunicorn";

/// Typed view of a project settings file.
#[derive(Debug, Clone, Default)]
pub struct ProjectConfig {
    /// Application name on the platform.
    pub project_name: Option<String>,
    /// Deployment profile (`use` key).
    pub profile: Option<String>,
    /// Settings format version.
    pub version: Option<String>,
    path: PathBuf,
    rest: IniDocument,
}

impl ProjectConfig {
    /// Find the settings file in `root`: `buildout.cfg` wins when present,
    /// otherwise `deploy.ini` (which may not exist yet).
    pub fn locate(root: &Path) -> PathBuf {
        let buildout = root.join(BUILDOUT_FILE);
        if buildout.is_file() {
            buildout
        } else {
            root.join(DEPLOY_FILE)
        }
    }

    /// Load the settings file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let mut doc = IniDocument::load(path)?;
        let mut take = |key: &str| doc.remove(DEPLOY_SECTION, key).filter(|v| !v.is_empty());
        let version = take("version");
        let profile = take("use");
        let project_name = take("project_name");

        Ok(Self {
            project_name,
            profile,
            version,
            path: path.to_path_buf(),
            rest: doc,
        })
    }

    /// Load the project settings of `root`, requiring a valid project.
    ///
    /// Fails with [`PytheonError::NotAProject`] when there is no settings
    /// file or it names no project.
    pub fn load_valid(root: &Path) -> Result<Self> {
        let path = Self::locate(root);
        let config = match Self::load(&path) {
            Ok(config) => config,
            Err(PytheonError::ConfigNotFound { .. }) => {
                return Err(PytheonError::NotAProject {
                    path: root.to_path_buf(),
                })
            }
            Err(e) => return Err(e),
        };

        if !config.is_valid() {
            return Err(PytheonError::NotAProject {
                path: root.to_path_buf(),
            });
        }
        Ok(config)
    }

    /// Settings for a brand new project.
    pub fn new_project(path: &Path, project_name: &str) -> Self {
        Self {
            project_name: Some(project_name.to_string()),
            profile: Some(DEFAULT_PROFILE.to_string()),
            version: Some("1".to_string()),
            path: path.to_path_buf(),
            rest: IniDocument::new(),
        }
    }

    /// A project is valid once it has a non-empty name.
    pub fn is_valid(&self) -> bool {
        self.project_name.as_deref().is_some_and(|n| !n.is_empty())
    }

    /// The project name, or `NotAProject` if unset.
    pub fn name(&self) -> Result<&str> {
        self.project_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| PytheonError::NotAProject {
                path: self.path.clone(),
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the settings back. An existing `[deploy]` section keeps its place.
    pub fn save(&self) -> Result<()> {
        let section = section_from(
            DEPLOY_SECTION,
            [
                ("version", self.version.as_deref()),
                ("use", self.profile.as_deref()),
                ("project_name", self.project_name.as_deref()),
            ],
        );
        let mut doc = self.rest.clone();
        doc.merge_section(section);
        doc.write(&self.path)
    }
}

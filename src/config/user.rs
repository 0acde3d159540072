//! Operator settings stored in `~/.pytheonrc`.

use std::path::{Path, PathBuf};

use super::ini::{section_from, IniDocument};
use crate::error::{PytheonError, Result};

/// Section holding every key the client reads or writes.
pub const USER_SECTION: &str = "pytheon";

/// Typed view of the user settings file.
///
/// Keys the client does not know about, and any other sections, are kept
/// aside and written back untouched.
#[derive(Debug, Clone, Default)]
pub struct UserConfig {
    /// Account e-mail used as the login name.
    pub username: Option<String>,
    /// Cached `auth_tkt` session cookie (only used without a platform store).
    pub auth_cookie: Option<String>,
    /// `host:port` override for the API.
    pub api_host: Option<String>,
    /// Extra PEM bundle trusted for the API certificate.
    pub ca_bundle: Option<PathBuf>,
    path: PathBuf,
    rest: IniDocument,
}

impl UserConfig {
    /// Load the settings file, failing with `ConfigNotFound` when it is absent.
    pub fn load(path: &Path) -> Result<Self> {
        let doc = IniDocument::load(path)?;
        Ok(Self::from_document(path, doc))
    }

    /// Load the settings file, or start from empty settings on first run.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(PytheonError::ConfigNotFound { .. }) => {
                tracing::debug!("No user config at {}, starting fresh", path.display());
                Ok(Self::empty(path))
            }
            other => other,
        }
    }

    /// Empty settings bound to `path`.
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            ..Default::default()
        }
    }

    fn from_document(path: &Path, mut doc: IniDocument) -> Self {
        let mut take = |key: &str| doc.remove(USER_SECTION, key).filter(|v| !v.is_empty());
        let username = take("username");
        let auth_cookie = take("auth_cookie");
        let api_host = take("api_host");
        let ca_bundle = take("ca_bundle").map(PathBuf::from);

        Self {
            username,
            auth_cookie,
            api_host,
            ca_bundle,
            path: path.to_path_buf(),
            rest: doc,
        }
    }

    /// Render the settings, known keys first.
    pub fn to_document(&self) -> IniDocument {
        let ca_bundle = self.ca_bundle.as_ref().map(|p| p.to_string_lossy());
        let section = section_from(
            USER_SECTION,
            [
                ("username", self.username.as_deref()),
                ("auth_cookie", self.auth_cookie.as_deref()),
                ("api_host", self.api_host.as_deref()),
                ("ca_bundle", ca_bundle.as_deref()),
            ],
        );
        let mut doc = self.rest.clone();
        doc.merge_section(section);
        doc
    }

    /// Write the settings back to their file.
    pub fn save(&self) -> Result<()> {
        self.to_document().write(&self.path)
    }

    /// Path of the settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

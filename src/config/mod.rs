//! Configuration loading and persistence.
//!
//! This module handles:
//! - Parsing the sectioned key/value files the client uses ([`IniDocument`])
//! - The operator's settings in `~/.pytheonrc` ([`UserConfig`])
//! - Per-project settings in `deploy.ini` / `buildout.cfg` ([`ProjectConfig`])
//!
//! # Configuration Locations
//!
//! - User: `$PYTHEON_CONFIG`, or `~/.pytheonrc`
//! - Project: `buildout.cfg` if present, else `deploy.ini`, in the working directory

pub mod ini;
pub mod project;
pub mod user;

pub use ini::{IniDocument, Section, SyntaxError};
pub use project::{ProjectConfig, BUILDOUT_FILE, DEFAULT_PROFILE, DEPLOY_FILE};
pub use user::UserConfig;

use std::path::PathBuf;

use crate::error::{PytheonError, Result};

/// API host used when nothing overrides it.
pub const DEFAULT_API_HOST: &str = "api.pytheon.net:443";

/// Environment variable pointing at an alternate user settings file.
pub const CONFIG_ENV: &str = "PYTHEON_CONFIG";

/// Environment variable pointing at an extra CA bundle.
pub const CA_BUNDLE_ENV: &str = "PYTHEON_CA_BUNDLE";

/// Path of the user settings file.
pub fn user_config_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    dirs::home_dir()
        .map(|home| home.join(".pytheonrc"))
        .ok_or_else(|| PytheonError::usage("Cannot determine your home directory"))
}

/// Pick the API host: explicit override, then user settings, then the default.
pub fn resolve_api_host(override_host: Option<&str>, user: &UserConfig) -> String {
    override_host
        .filter(|h| !h.is_empty())
        .or(user.api_host.as_deref())
        .unwrap_or(DEFAULT_API_HOST)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn api_host_defaults() {
        let user = UserConfig::empty(Path::new("/tmp/.pytheonrc"));
        assert_eq!(resolve_api_host(None, &user), DEFAULT_API_HOST);
    }

    #[test]
    fn api_host_from_user_config() {
        let mut user = UserConfig::empty(Path::new("/tmp/.pytheonrc"));
        user.api_host = Some("localhost:6543".to_string());
        assert_eq!(resolve_api_host(None, &user), "localhost:6543");
    }

    #[test]
    fn api_host_override_wins() {
        let mut user = UserConfig::empty(Path::new("/tmp/.pytheonrc"));
        user.api_host = Some("localhost:6543".to_string());
        assert_eq!(
            resolve_api_host(Some("127.0.0.1:8080"), &user),
            "127.0.0.1:8080"
        );
        assert_eq!(resolve_api_host(Some(""), &user), "localhost:6543");
    }
}

//! Where session cookies and passwords are kept between runs.
//!
//! Two backends exist: [`ConfigFileStore`] keeps the cookie in the user
//! settings file and never stores passwords, and `PlatformStore` (behind the
//! `keyring` feature) uses the operating system's credential store. One is
//! chosen at startup with [`select_store`].

use crate::config::UserConfig;
use crate::error::Result;

/// Capability to read and write cached credentials.
pub trait SecretStore {
    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Cached session cookie, if any.
    fn cookie(&self, user: &UserConfig) -> Result<Option<String>>;

    /// Remember a session cookie.
    fn save_cookie(&mut self, user: &mut UserConfig, cookie: &str) -> Result<()>;

    /// Drop the cached session cookie.
    fn forget_cookie(&mut self, user: &mut UserConfig) -> Result<()>;

    /// Cached password for `username`, if the backend keeps passwords.
    fn password(&self, username: &str) -> Result<Option<String>>;

    /// Remember a password. Backends that don't keep passwords ignore it.
    fn save_password(&mut self, username: &str, password: &str) -> Result<()>;

    /// Drop a cached password the API refused.
    fn forget_password(&mut self, username: &str) -> Result<()>;
}

/// Cookie in `~/.pytheonrc`, no password caching.
#[derive(Debug, Default)]
pub struct ConfigFileStore;

impl SecretStore for ConfigFileStore {
    fn name(&self) -> &'static str {
        "config file"
    }

    fn cookie(&self, user: &UserConfig) -> Result<Option<String>> {
        Ok(user.auth_cookie.clone())
    }

    fn save_cookie(&mut self, user: &mut UserConfig, cookie: &str) -> Result<()> {
        if user.auth_cookie.as_deref() == Some(cookie) {
            return Ok(());
        }
        user.auth_cookie = Some(cookie.to_string());
        user.save()
    }

    fn forget_cookie(&mut self, user: &mut UserConfig) -> Result<()> {
        if user.auth_cookie.take().is_some() {
            user.save()?;
        }
        Ok(())
    }

    fn password(&self, _username: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn save_password(&mut self, _username: &str, _password: &str) -> Result<()> {
        Ok(())
    }

    fn forget_password(&mut self, _username: &str) -> Result<()> {
        Ok(())
    }
}

#[cfg(feature = "keyring")]
pub use platform::PlatformStore;

#[cfg(feature = "keyring")]
mod platform {
    use keyring::Entry;

    use super::SecretStore;
    use crate::config::UserConfig;
    use crate::error::{PytheonError, Result};

    /// Operating system credential store.
    ///
    /// Entries live under the services `cookie:<host>` and `basic:<host>`,
    /// keyed by the account name.
    #[derive(Debug)]
    pub struct PlatformStore {
        host: String,
    }

    impl PlatformStore {
        /// Open the store for `host`, checking that the backend answers.
        pub fn open(host: &str) -> Result<Self> {
            let store = Self {
                host: host.to_string(),
            };
            store.read(&store.service("cookie"), "")?;
            Ok(store)
        }

        fn service(&self, kind: &str) -> String {
            format!("{}:{}", kind, self.host)
        }

        fn entry(service: &str, account: &str) -> Result<Entry> {
            Entry::new(service, account).map_err(store_error)
        }

        fn read(&self, service: &str, account: &str) -> Result<Option<String>> {
            match Self::entry(service, account)?.get_password() {
                Ok(secret) => Ok(Some(secret)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(store_error(e)),
            }
        }

        fn write(&self, service: &str, account: &str, secret: &str) -> Result<()> {
            Self::entry(service, account)?
                .set_password(secret)
                .map_err(store_error)
        }

        fn delete(&self, service: &str, account: &str) -> Result<()> {
            match Self::entry(service, account)?.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(store_error(e)),
            }
        }
    }

    fn account(user: &UserConfig) -> &str {
        user.username.as_deref().unwrap_or_default()
    }

    fn store_error(e: keyring::Error) -> PytheonError {
        PytheonError::SecretStore {
            message: e.to_string(),
        }
    }

    impl SecretStore for PlatformStore {
        fn name(&self) -> &'static str {
            "platform keyring"
        }

        fn cookie(&self, user: &UserConfig) -> Result<Option<String>> {
            self.read(&self.service("cookie"), account(user))
        }

        fn save_cookie(&mut self, user: &mut UserConfig, cookie: &str) -> Result<()> {
            self.write(&self.service("cookie"), account(user), cookie)
        }

        fn forget_cookie(&mut self, user: &mut UserConfig) -> Result<()> {
            self.delete(&self.service("cookie"), account(user))
        }

        fn password(&self, username: &str) -> Result<Option<String>> {
            self.read(&self.service("basic"), username)
        }

        fn save_password(&mut self, username: &str, password: &str) -> Result<()> {
            self.write(&self.service("basic"), username, password)
        }

        fn forget_password(&mut self, username: &str) -> Result<()> {
            self.delete(&self.service("basic"), username)
        }
    }
}

/// Pick the credential store once at startup.
///
/// The platform store is used when compiled in, wanted, and reachable;
/// otherwise cookies go to the user settings file.
#[cfg_attr(not(feature = "keyring"), allow(unused_variables))]
pub fn select_store(host: &str, prefer_platform: bool) -> Box<dyn SecretStore> {
    #[cfg(feature = "keyring")]
    if prefer_platform {
        match PlatformStore::open(host) {
            Ok(store) => {
                tracing::debug!("Using platform keyring for {}", host);
                return Box::new(store);
            }
            Err(e) => tracing::debug!("Platform keyring unavailable ({}), using config file", e),
        }
    }

    Box::new(ConfigFileStore)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_file_store_reads_cookie_from_settings() {
        let temp = TempDir::new().unwrap();
        let mut user = UserConfig::empty(&temp.path().join(".pytheonrc"));
        user.auth_cookie = Some("abc".to_string());

        let store = ConfigFileStore;
        assert_eq!(store.cookie(&user).unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn config_file_store_persists_cookie() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".pytheonrc");
        let mut user = UserConfig::empty(&path);

        let mut store = ConfigFileStore;
        store.save_cookie(&mut user, "fresh").unwrap();

        let reloaded = UserConfig::load(&path).unwrap();
        assert_eq!(reloaded.auth_cookie.as_deref(), Some("fresh"));
    }

    #[test]
    fn config_file_store_forgets_cookie() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".pytheonrc");
        let mut user = UserConfig::empty(&path);
        user.username = Some("me@example.com".to_string());
        user.auth_cookie = Some("stale".to_string());
        user.save().unwrap();

        let mut store = ConfigFileStore;
        store.forget_cookie(&mut user).unwrap();

        let reloaded = UserConfig::load(&path).unwrap();
        assert_eq!(reloaded.auth_cookie, None);
        assert_eq!(reloaded.username.as_deref(), Some("me@example.com"));
    }

    #[test]
    fn config_file_store_never_keeps_passwords() {
        let mut store = ConfigFileStore;
        store.save_password("me@example.com", "secret").unwrap();
        assert_eq!(store.password("me@example.com").unwrap(), None);
    }

    #[test]
    fn select_store_without_platform_uses_config_file() {
        let store = select_store("api.pytheon.net", false);
        assert_eq!(store.name(), "config file");
    }
}

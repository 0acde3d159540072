//! Turns cached or prompted credentials into a [`Session`].

use super::{SecretStore, Session};
use crate::config::UserConfig;
use crate::error::{PytheonError, Result};
use crate::ui::{Prompt, UserInterface};

/// Environment variable that supplies the password without a prompt.
pub const PASSWORD_ENV: &str = "PYTHEON_PASSWORD";

/// Resolves credentials for authenticated requests.
///
/// Owns the user settings for the duration of a command so that cookie
/// updates land in the same document that is written back.
pub struct CredentialResolver {
    user: UserConfig,
    store: Box<dyn SecretStore>,
    password_override: Option<String>,
}

impl CredentialResolver {
    pub fn new(user: UserConfig, store: Box<dyn SecretStore>) -> Self {
        Self {
            user,
            store,
            password_override: None,
        }
    }

    /// Use this password instead of prompting (automation).
    pub fn with_password_override(mut self, password: Option<String>) -> Self {
        self.password_override = password.filter(|p| !p.is_empty());
        self
    }

    /// Cached cookie if there is one, otherwise basic credentials.
    pub fn resolve_session(&mut self, ui: &mut dyn UserInterface) -> Result<Session> {
        if let Some(cookie) = self.store.cookie(&self.user)? {
            tracing::debug!("Using cached session cookie from {}", self.store.name());
            return Ok(Session::Cookie(cookie));
        }
        self.resolve_basic(ui, false)
    }

    /// Basic credentials. With `force_prompt` any cached password is
    /// ignored and the operator is asked again.
    pub fn resolve_basic(
        &mut self,
        ui: &mut dyn UserInterface,
        force_prompt: bool,
    ) -> Result<Session> {
        let username = self.username(ui)?;

        let password = if let Some(password) = &self.password_override {
            tracing::debug!("Using password from {}", PASSWORD_ENV);
            password.clone()
        } else {
            let cached = if force_prompt {
                None
            } else {
                self.store.password(&username)?
            };
            match cached {
                Some(password) => {
                    tracing::debug!("Using cached password from {}", self.store.name());
                    password
                }
                None => {
                    let password = self.prompt_password(ui)?;
                    if let Err(e) = self.store.save_password(&username, &password) {
                        tracing::debug!("Could not cache password: {}", e);
                    }
                    password
                }
            }
        };

        Ok(Session::Basic { username, password })
    }

    /// Configured username, or ask for one.
    pub fn username(&mut self, ui: &mut dyn UserInterface) -> Result<String> {
        if let Some(username) = &self.user.username {
            return Ok(username.clone());
        }

        let answer = ui
            .prompt(&Prompt::input("username", "Username"))
            .map_err(unavailable_if_usage)?;
        let answer = answer.trim().to_string();
        if answer.is_empty() {
            return Err(PytheonError::CredentialsUnavailable);
        }
        Ok(answer)
    }

    /// Masked password prompt (the override is honoured here too).
    pub fn prompt_password(&self, ui: &mut dyn UserInterface) -> Result<String> {
        if let Some(password) = &self.password_override {
            return Ok(password.clone());
        }
        ui.prompt(&Prompt::password("password", "Password"))
            .map_err(unavailable_if_usage)
    }

    /// Remember a cookie the API handed out.
    pub fn persist_cookie(&mut self, cookie: &str) -> Result<()> {
        tracing::debug!(
            "Saving session cookie {} to {}",
            super::redact(cookie),
            self.store.name()
        );
        self.store.save_cookie(&mut self.user, cookie)
    }

    /// Drop the cached cookie after the API rejected it.
    pub fn discard_cookie(&mut self) -> Result<()> {
        self.store.forget_cookie(&mut self.user)
    }

    /// Drop the cached password of `username` after the API rejected it.
    pub fn discard_password(&mut self, username: &str) -> Result<()> {
        tracing::debug!("Forgetting refused password in {}", self.store.name());
        self.store.forget_password(username)
    }

    pub fn user(&self) -> &UserConfig {
        &self.user
    }

    pub fn user_mut(&mut self) -> &mut UserConfig {
        &mut self.user
    }
}

fn unavailable_if_usage(e: PytheonError) -> PytheonError {
    if e.is_usage() {
        PytheonError::CredentialsUnavailable
    } else {
        e
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::collections::HashMap;
    use std::path::Path;

    /// In-memory store that keeps both cookies and passwords.
    #[derive(Debug, Default)]
    pub(crate) struct MemoryStore {
        pub cookie: Option<String>,
        pub passwords: HashMap<String, String>,
    }

    impl SecretStore for MemoryStore {
        fn name(&self) -> &'static str {
            "memory"
        }

        fn cookie(&self, _user: &UserConfig) -> Result<Option<String>> {
            Ok(self.cookie.clone())
        }

        fn save_cookie(&mut self, _user: &mut UserConfig, cookie: &str) -> Result<()> {
            self.cookie = Some(cookie.to_string());
            Ok(())
        }

        fn forget_cookie(&mut self, _user: &mut UserConfig) -> Result<()> {
            self.cookie = None;
            Ok(())
        }

        fn password(&self, username: &str) -> Result<Option<String>> {
            Ok(self.passwords.get(username).cloned())
        }

        fn save_password(&mut self, username: &str, password: &str) -> Result<()> {
            self.passwords
                .insert(username.to_string(), password.to_string());
            Ok(())
        }

        fn forget_password(&mut self, username: &str) -> Result<()> {
            self.passwords.remove(username);
            Ok(())
        }
    }

    fn user(username: Option<&str>) -> UserConfig {
        let mut user = UserConfig::empty(Path::new("/nonexistent/.pytheonrc"));
        user.username = username.map(String::from);
        user
    }

    fn resolver(username: Option<&str>, store: MemoryStore) -> CredentialResolver {
        CredentialResolver::new(user(username), Box::new(store))
    }

    #[test]
    fn cached_cookie_wins_over_basic() {
        let store = MemoryStore {
            cookie: Some("tkt".to_string()),
            ..Default::default()
        };
        let mut resolver = resolver(Some("me@example.com"), store);
        let mut ui = MockUI::new();

        let session = resolver.resolve_session(&mut ui).unwrap();
        assert_eq!(session, Session::Cookie("tkt".to_string()));
        assert!(ui.prompts_shown().is_empty());
    }

    #[test]
    fn no_cookie_prompts_for_password() {
        let mut resolver = resolver(Some("me@example.com"), MemoryStore::default());
        let mut ui = MockUI::new();
        ui.set_prompt_response("password", "secret");

        let session = resolver.resolve_session(&mut ui).unwrap();
        assert_eq!(
            session,
            Session::Basic {
                username: "me@example.com".to_string(),
                password: "secret".to_string(),
            }
        );
        assert_eq!(ui.prompts_shown(), &["password"]);
    }

    #[test]
    fn missing_username_is_prompted() {
        let mut resolver = resolver(None, MemoryStore::default());
        let mut ui = MockUI::new();
        ui.set_prompt_response("username", "  me@example.com ");
        ui.set_prompt_response("password", "secret");

        let session = resolver.resolve_session(&mut ui).unwrap();
        assert!(matches!(session, Session::Basic { ref username, .. } if username == "me@example.com"));
        assert_eq!(ui.prompts_shown(), &["username", "password"]);
    }

    #[test]
    fn cached_password_is_reused_unless_forced() {
        let mut store = MemoryStore::default();
        store
            .passwords
            .insert("me@example.com".to_string(), "cached".to_string());
        let mut resolver = resolver(Some("me@example.com"), store);
        let mut ui = MockUI::new();
        ui.set_prompt_response("password", "typed");

        let session = resolver.resolve_basic(&mut ui, false).unwrap();
        assert!(matches!(session, Session::Basic { ref password, .. } if password == "cached"));
        assert!(ui.prompts_shown().is_empty());

        let session = resolver.resolve_basic(&mut ui, true).unwrap();
        assert!(matches!(session, Session::Basic { ref password, .. } if password == "typed"));
        assert_eq!(ui.prompts_shown(), &["password"]);
    }

    #[test]
    fn password_override_skips_prompt() {
        let mut resolver = resolver(Some("me@example.com"), MemoryStore::default())
            .with_password_override(Some("from-env".to_string()));
        let mut ui = MockUI::new();

        let session = resolver.resolve_basic(&mut ui, true).unwrap();
        assert!(matches!(session, Session::Basic { ref password, .. } if password == "from-env"));
        assert!(ui.prompts_shown().is_empty());
    }

    #[test]
    fn empty_password_override_is_ignored() {
        let resolver = resolver(Some("me@example.com"), MemoryStore::default())
            .with_password_override(Some(String::new()));
        assert!(resolver.password_override.is_none());
    }

    #[test]
    fn nothing_cached_and_no_terminal_is_unavailable() {
        let mut resolver = resolver(None, MemoryStore::default());
        let mut ui = crate::ui::NonInteractiveUI::with_overrides(
            crate::ui::OutputMode::Normal,
            HashMap::new(),
        );

        let err = resolver.resolve_session(&mut ui).unwrap_err();
        assert!(matches!(err, PytheonError::CredentialsUnavailable));
    }

    #[test]
    fn persisted_cookie_is_used_next() {
        let mut resolver = resolver(Some("me@example.com"), MemoryStore::default());
        let mut ui = MockUI::new();

        resolver.persist_cookie("new-ticket").unwrap();
        let session = resolver.resolve_session(&mut ui).unwrap();
        assert_eq!(session, Session::Cookie("new-ticket".to_string()));

        resolver.discard_cookie().unwrap();
        ui.set_prompt_response("password", "secret");
        assert!(!resolver.resolve_session(&mut ui).unwrap().is_cookie());
    }
}

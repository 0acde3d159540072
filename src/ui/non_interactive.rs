//! Non-interactive UI for pipes, CI and scripts.

use std::collections::HashMap;

use crate::error::{PytheonError, Result};

use super::{OutputMode, ProgressSpinner, Prompt, PromptType, SpinnerHandle, UserInterface};

/// Prefix of environment variables that answer prompts.
pub const PROMPT_ENV_PREFIX: &str = "PYTHEON_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Prompts are answered from `PYTHEON_PROMPT_<KEY>` variables or the
/// prompt's default. Password prompts are never answered this way.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn result(&mut self, msg: &str) {
        println!("{}", msg);
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<String> {
        if prompt.prompt_type == PromptType::Password {
            return Err(PytheonError::CredentialsUnavailable);
        }

        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase());
        if let Some(value) = self.env_overrides.get(&env_key) {
            return Ok(value.clone());
        }

        if let Some(default) = &prompt.default {
            return Ok(default.clone());
        }

        Err(PytheonError::usage(format!(
            "Cannot ask for '{}' in non-interactive mode (set {})",
            prompt.key, env_key
        )))
    }

    fn start_spinner(&mut self, _message: &str) -> Box<dyn SpinnerHandle> {
        Box::new(ProgressSpinner::hidden())
    }
}

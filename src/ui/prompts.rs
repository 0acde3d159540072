//! Interactive prompts.

use console::Term;
use dialoguer::{Input, Password};

use crate::error::Result;

use super::{Prompt, PromptType};

/// Prompt the user for input.
///
/// Empty answers are refused and asked again unless the prompt has a default.
pub fn prompt_user(prompt: &Prompt, term: &Term) -> Result<String> {
    match prompt.prompt_type {
        PromptType::Input => prompt_input(prompt, term),
        PromptType::Password => prompt_password(prompt, term),
    }
}

fn prompt_input(prompt: &Prompt, term: &Term) -> Result<String> {
    let input = Input::<String>::new().with_prompt(&prompt.question);

    let result = if let Some(default) = &prompt.default {
        input.default(default.clone()).interact_text_on(term)?
    } else {
        input.interact_text_on(term)?
    };

    Ok(result)
}

fn prompt_password(prompt: &Prompt, term: &Term) -> Result<String> {
    // Password rejects empty input by default, so it re-prompts on its own.
    let result = Password::new()
        .with_prompt(&prompt.question)
        .interact_on(term)?;
    Ok(result)
}

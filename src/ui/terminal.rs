//! Interactive terminal UI.

use console::Term;
use std::io::{IsTerminal, Write};

use crate::error::Result;

use super::{
    prompt_user, should_use_colors, NonInteractiveUI, OutputMode, ProgressSpinner, Prompt,
    PytheonTheme, SpinnerHandle, UserInterface,
};

/// Interactive terminal UI implementation.
pub struct TerminalUI {
    term: Term,
    err: Term,
    theme: PytheonTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            PytheonTheme::new()
        } else {
            PytheonTheme::plain()
        };

        Self {
            term: Term::stdout(),
            err: Term::stderr(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn result(&mut self, msg: &str) {
        writeln!(self.term, "{}", msg).ok();
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.err, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<String> {
        // Prompts go to stderr so piped stdout only carries output.
        prompt_user(prompt, &self.err)
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            Box::new(ProgressSpinner::new(message))
        } else {
            Box::new(ProgressSpinner::hidden())
        }
    }
}

/// Create the appropriate UI based on context.
///
/// Prompts need a terminal on stdin and stderr; stdout may be piped.
pub fn create_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    let stdin_tty = std::io::stdin().is_terminal();
    let stderr_tty = Term::stderr().is_term();
    if wants_terminal(interactive, stdin_tty, stderr_tty) {
        Box::new(TerminalUI::new(mode))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}

fn wants_terminal(interactive: bool, stdin_tty: bool, stderr_tty: bool) -> bool {
    interactive && stdin_tty && stderr_tty
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_needs_stdin_and_stderr() {
        assert!(wants_terminal(true, true, true));
        assert!(!wants_terminal(true, false, true));
        assert!(!wants_terminal(true, true, false));
    }

    #[test]
    fn ci_never_gets_terminal() {
        assert!(!wants_terminal(false, true, true));
    }
}

//! Rendering API responses.
//!
//! The API answers in plain text, one statement per line. Lines starting
//! with [`ERROR_SENTINEL`] are failures.

use crate::api::Payload;
use crate::ui::UserInterface;

/// Prefix marking an error line in a response.
pub const ERROR_SENTINEL: &str = "! ";

/// Show a response line by line. Returns `true` when any line was an error.
pub fn report(ui: &mut dyn UserInterface, payload: &Payload) -> bool {
    let text = payload.to_display_string();
    let mut failed = false;

    for line in text.trim().lines() {
        let line = line.trim();
        if let Some(msg) = line.strip_prefix(ERROR_SENTINEL) {
            ui.error(msg);
            failed = true;
        } else {
            ui.result(line);
        }
    }

    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use serde_json::json;

    #[test]
    fn plain_lines_are_messages() {
        let mut ui = MockUI::new();
        let text = "Application www created\n  Remote: git@git.pytheon.net:www.git\n";
        let failed = report(&mut ui, &Payload::Text(text.into()));

        assert!(!failed);
        assert_eq!(
            ui.messages(),
            &["Application www created", "Remote: git@git.pytheon.net:www.git"]
        );
    }

    #[test]
    fn sentinel_lines_are_errors() {
        let mut ui = MockUI::new();
        let failed = report(
            &mut ui,
            &Payload::Text("! You cannot access this resource\nBye".into()),
        );

        assert!(failed);
        assert_eq!(ui.errors(), &["You cannot access this resource"]);
        assert_eq!(ui.messages(), &["Bye"]);
    }

    #[test]
    fn empty_body_shows_nothing() {
        let mut ui = MockUI::new();
        assert!(!report(&mut ui, &Payload::Text(String::new())));
        assert!(ui.messages().is_empty());
    }

    #[test]
    fn json_is_pretty_printed() {
        let mut ui = MockUI::new();
        report(&mut ui, &Payload::Json(json!({"name": "www"})));
        assert_eq!(ui.messages(), &["{", "\"name\": \"www\"", "}"]);
    }
}

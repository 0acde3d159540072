//! Decoded response bodies.

use serde_json::Value;
use std::fmt;

use crate::auth::COOKIE_NAME;

/// Body of an API response.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// `application/json` body.
    Json(Value),
    /// Anything else, as text.
    Text(String),
}

impl Payload {
    /// Decode a body according to its `Content-Type`.
    ///
    /// A JSON content type whose body doesn't parse falls back to text.
    pub fn decode(content_type: Option<&str>, body: String) -> Self {
        let is_json = content_type
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"));

        if is_json {
            match serde_json::from_str(&body) {
                Ok(value) => return Self::Json(value),
                Err(e) => tracing::debug!("Response claimed JSON but did not parse: {}", e),
            }
        }
        Self::Text(body)
    }

    /// Text to show the operator.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Self::Text(text) => text.clone(),
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

/// Find the session cookie among `Set-Cookie` header values.
pub fn session_cookie<'a>(set_cookies: impl IntoIterator<Item = &'a str>) -> Option<String> {
    set_cookies.into_iter().find_map(|header| {
        header.split(';').find_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            if name.trim() != COOKIE_NAME {
                return None;
            }
            let value = value.trim().trim_matches('"');
            (!value.is_empty()).then(|| value.to_string())
        })
    })
}

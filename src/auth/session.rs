//! Authentication material attached to a single request attempt.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt;

/// Name of the session cookie issued by the API.
pub const COOKIE_NAME: &str = "auth_tkt";

/// How a request authenticates. One form per attempt, never both.
#[derive(Clone, PartialEq, Eq)]
pub enum Session {
    /// Cached `auth_tkt` cookie.
    Cookie(String),
    /// Username and password sent as HTTP basic auth.
    Basic { username: String, password: String },
}

impl Session {
    /// Header name and value carrying this session.
    pub fn header(&self) -> (&'static str, String) {
        match self {
            Self::Cookie(token) => ("Cookie", format!("{}={}", COOKIE_NAME, token)),
            Self::Basic { username, password } => (
                "Authorization",
                format!("Basic {}", basic_token(username, password)),
            ),
        }
    }

    pub fn is_cookie(&self) -> bool {
        matches!(self, Self::Cookie(_))
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Cookie(_) => "cookie",
            Self::Basic { .. } => "basic",
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cookie(token) => f.debug_tuple("Cookie").field(&redact(token)).finish(),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"****")
                .finish(),
        }
    }
}

/// `base64(user:password)` as used in the `Authorization: Basic` header.
pub fn basic_token(username: &str, password: &str) -> String {
    STANDARD.encode(format!("{}:{}", username, password))
}

/// Keep the first few characters of a secret for log lines.
pub fn redact(secret: &str) -> String {
    let shown: String = secret.chars().take(4).collect();
    if shown.len() == secret.len() {
        "****".to_string()
    } else {
        format!("{}****", shown)
    }
}

//! Request descriptions.

use std::fmt;

/// HTTP method of an API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which representation to ask the API for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    Json,
    #[default]
    Text,
}

impl ResponseFormat {
    /// Value of the `Accept` header.
    pub fn accept(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Text => "text/plain",
        }
    }
}

/// A single API call: path, method, auth requirement and form parameters.
///
/// # Example
///
/// ```
/// use pytheon::api::{ApiRequest, Method};
///
/// let req = ApiRequest::get("/v1/register")
///     .param("email", "user@example.com")
///     .without_auth();
///
/// assert_eq!(req.effective_method(), Method::Post);
/// assert_eq!(req.form_body().as_deref(), Some("email=user%40example.com"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    path: String,
    method: Method,
    auth: bool,
    format: ResponseFormat,
    params: Vec<(String, String)>,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            auth: true,
            format: ResponseFormat::default(),
            params: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Add a form parameter.
    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.push((key.to_string(), value.into()));
        self
    }

    /// Send without credentials.
    pub fn without_auth(mut self) -> Self {
        self.auth = false;
        self
    }

    /// Ask for a JSON body.
    pub fn json(mut self) -> Self {
        self.format = ResponseFormat::Json;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn requires_auth(&self) -> bool {
        self.auth
    }

    pub fn format(&self) -> ResponseFormat {
        self.format
    }

    /// The method actually sent: any parameters force a POST.
    pub fn effective_method(&self) -> Method {
        if self.params.is_empty() {
            self.method
        } else {
            Method::Post
        }
    }

    /// URL-encoded form body, if there are parameters.
    pub fn form_body(&self) -> Option<String> {
        if self.params.is_empty() {
            return None;
        }
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.params {
            serializer.append_pair(key, value);
        }
        Some(serializer.finish())
    }
}

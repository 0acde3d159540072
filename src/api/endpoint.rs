//! Where the API lives.

use std::fmt;
use std::str::FromStr;

use crate::error::PytheonError;

/// Port that selects HTTPS.
pub const TLS_PORT: u16 = 443;

/// API `host:port`. Port 443 means validated TLS, anything else plain HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    pub host: String,
    pub port: u16,
}

impl ApiEndpoint {
    pub fn secure(&self) -> bool {
        self.port == TLS_PORT
    }

    /// `https://host` or `http://host:port`.
    pub fn base_url(&self) -> String {
        if self.secure() {
            format!("https://{}", self.host)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url(), path)
        } else {
            format!("{}/{}", self.base_url(), path)
        }
    }
}

impl FromStr for ApiEndpoint {
    type Err = PytheonError;

    /// Parse `host[:port]`; a missing port means 443.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (host, port) = match s.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    PytheonError::usage(format!("Invalid API port in '{}'", s))
                })?;
                (host, port)
            }
            None => (s, TLS_PORT),
        };

        if host.is_empty() {
            return Err(PytheonError::usage(format!("Invalid API host '{}'", s)));
        }

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for ApiEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

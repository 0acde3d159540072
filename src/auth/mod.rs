//! Credentials for the API.
//!
//! - [`Session`]: the cookie or basic credentials sent with one request
//! - [`SecretStore`]: where cookies (and, with the platform store,
//!   passwords) survive between runs
//! - [`CredentialResolver`]: picks cached credentials or asks for them

pub mod resolver;
pub mod session;
pub mod store;

pub use resolver::{CredentialResolver, PASSWORD_ENV};
pub use session::{basic_token, redact, Session, COOKIE_NAME};
#[cfg(feature = "keyring")]
pub use store::PlatformStore;
pub use store::{select_store, ConfigFileStore, SecretStore};

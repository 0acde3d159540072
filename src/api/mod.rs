//! HTTP access to the Pytheon API.
//!
//! [`ApiRequest`] describes a call, [`ApiClient::request`] runs it through
//! authentication, the single re-authentication retry, cookie persistence
//! and body decoding, and hands back a [`Payload`].

pub mod client;
pub mod endpoint;
pub mod request;
pub mod response;

pub use client::{classify_transport_error, ApiClient};
pub use endpoint::{ApiEndpoint, TLS_PORT};
pub use request::{ApiRequest, Method, ResponseFormat};
pub use response::{session_cookie, Payload};

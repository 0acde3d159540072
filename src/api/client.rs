//! The authenticated request pipeline.

use anyhow::{anyhow, Context};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, SET_COOKIE};
use reqwest::Certificate;
use std::error::Error as StdError;
use std::path::Path;

use super::{session_cookie, ApiEndpoint, ApiRequest, Method, Payload};
use crate::auth::{CredentialResolver, Session};
use crate::error::{PytheonError, Result};
use crate::ui::UserInterface;

/// Fragments of transport errors that mean the certificate was rejected.
const TLS_MARKERS: &[&str] = &[
    "certificate",
    "invalid peer",
    "unknownissuer",
    "notvalidforname",
];

/// Raw outcome of one HTTP exchange.
#[derive(Debug)]
struct Reply {
    status: u16,
    reason: String,
    content_type: Option<String>,
    set_cookies: Vec<String>,
    body: String,
}

/// Client for the Pytheon API.
pub struct ApiClient {
    http: Client,
    endpoint: ApiEndpoint,
}

impl ApiClient {
    /// Build a client for `endpoint`, trusting the certificates in
    /// `ca_bundle` in addition to the built-in roots.
    pub fn new(endpoint: ApiEndpoint, ca_bundle: Option<&Path>) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("pytheon/", env!("CARGO_PKG_VERSION")));

        if let Some(path) = ca_bundle {
            let pem = std::fs::read(path)
                .with_context(|| format!("Failed to read CA bundle {}", path.display()))?;
            let certs = Certificate::from_pem_bundle(&pem)
                .map_err(|e| anyhow!("Invalid CA bundle {}: {}", path.display(), e))?;
            tracing::debug!("Trusting {} extra certificate(s)", certs.len());
            for cert in certs {
                builder = builder.add_root_certificate(cert);
            }
        }

        let http = builder.build().context("Failed to build HTTP client")?;
        Ok(Self { http, endpoint })
    }

    /// Send `req`, re-authenticating once if a cached cookie is rejected.
    ///
    /// 5xx answers come back as [`PytheonError::Server`]. Other non-2xx
    /// answers are reported as a warning and their body is still decoded.
    pub fn request(
        &self,
        req: &ApiRequest,
        credentials: &mut CredentialResolver,
        ui: &mut dyn UserInterface,
    ) -> Result<Payload> {
        let session = if req.requires_auth() {
            Some(credentials.resolve_session(ui)?)
        } else {
            None
        };

        let mut reply = self.send(req, session.as_ref(), ui)?;

        if reply.status == 401 {
            match &session {
                Some(Session::Cookie(_)) => {
                    tracing::info!("Invalid password or session is expired");
                    if let Err(e) = credentials.discard_cookie() {
                        tracing::debug!("Could not discard session cookie: {}", e);
                    }
                    let basic = credentials.resolve_basic(ui, true)?;
                    reply = self.send(req, Some(&basic), ui)?;
                    if reply.status == 401 {
                        return Err(self.reject_basic(req, &basic, credentials));
                    }
                }
                Some(basic) => return Err(self.reject_basic(req, basic, credentials)),
                None => {}
            }
        }

        if reply.status >= 500 {
            return Err(PytheonError::Server {
                status: reply.status,
                reason: reply.reason,
            });
        }

        if !(200..300).contains(&reply.status) {
            ui.warning(&format!("{} - {}", reply.status, reply.reason));
        }

        if let Some(cookie) = session_cookie(reply.set_cookies.iter().map(String::as_str)) {
            credentials.persist_cookie(&cookie)?;
        }

        Ok(Payload::decode(reply.content_type.as_deref(), reply.body))
    }

    fn send(
        &self,
        req: &ApiRequest,
        session: Option<&Session>,
        ui: &mut dyn UserInterface,
    ) -> Result<Reply> {
        let method = req.effective_method();
        let label = format!("{} {}", method, req.path());
        match session {
            Some(s) => tracing::debug!("{} ({} auth)", label, s.kind()),
            None => tracing::debug!("{} (no auth)", label),
        }

        let mut spinner = ui.start_spinner(&label);
        let result = self.exchange(req, method, session);
        match &result {
            Ok(reply) if reply.status < 400 => {
                spinner.finish_success(&format!("{} {}", reply.status, reply.reason))
            }
            Ok(reply) => spinner.finish_error(&format!("{} {}", reply.status, reply.reason)),
            Err(_) => spinner.finish_error(&format!("{} failed", label)),
        }
        result
    }

    fn exchange(&self, req: &ApiRequest, method: Method, session: Option<&Session>) -> Result<Reply> {
        let method = match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .http
            .request(method, self.endpoint.url(req.path()))
            .header(ACCEPT, req.format().accept());

        if let Some(session) = session {
            let (name, value) = session.header();
            builder = builder.header(name, value);
        }

        if let Some(body) = req.form_body() {
            builder = builder
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(body);
        }

        let response = builder
            .send()
            .map_err(|e| classify_transport_error(&self.endpoint.host, &e))?;

        let status = response.status();
        let headers = response.headers();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let set_cookies = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(String::from)
            .collect();

        let body = response
            .text()
            .map_err(|e| classify_transport_error(&self.endpoint.host, &e))?;

        Ok(Reply {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            content_type,
            set_cookies,
            body,
        })
    }

    /// Forget a password the API refused, then report the failure.
    fn reject_basic(
        &self,
        req: &ApiRequest,
        session: &Session,
        credentials: &mut CredentialResolver,
    ) -> PytheonError {
        if let Session::Basic { username, .. } = session {
            if let Err(e) = credentials.discard_password(username) {
                tracing::debug!("Could not discard cached password: {}", e);
            }
        }
        self.auth_failed(req)
    }

    fn auth_failed(&self, req: &ApiRequest) -> PytheonError {
        PytheonError::AuthenticationFailed {
            path: req.path().to_string(),
        }
    }
}

/// Map a transport failure to `TlsValidation` or `Network`.
///
/// The whole source chain is inspected since the TLS cause is usually
/// several layers below the top-level error.
pub fn classify_transport_error(host: &str, err: &(dyn StdError + 'static)) -> PytheonError {
    let mut messages = Vec::new();
    let mut current = Some(err);
    while let Some(e) = current {
        messages.push(e.to_string());
        current = e.source();
    }
    let message = messages.join(": ");
    let lower = message.to_lowercase();

    if TLS_MARKERS.iter().any(|marker| lower.contains(marker)) {
        PytheonError::TlsValidation {
            host: host.to_string(),
            message,
        }
    } else {
        PytheonError::Network {
            host: host.to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::basic_token;
    use crate::auth::resolver::tests::MemoryStore;
    use crate::config::UserConfig;
    use crate::ui::MockUI;
    use httpmock::prelude::*;
    use std::fmt;
    use tempfile::TempDir;

    fn client_for(server: &MockServer) -> ApiClient {
        let endpoint = ApiEndpoint {
            host: "127.0.0.1".to_string(),
            port: server.port(),
        };
        ApiClient::new(endpoint, None).unwrap()
    }

    fn resolver_with_cookie(cookie: Option<&str>) -> CredentialResolver {
        let mut user = UserConfig::empty(std::path::Path::new("/nonexistent/.pytheonrc"));
        user.username = Some("me@example.com".to_string());
        let store = MemoryStore {
            cookie: cookie.map(String::from),
            ..Default::default()
        };
        CredentialResolver::new(user, Box::new(store))
    }

    fn basic_header(password: &str) -> String {
        format!("Basic {}", basic_token("me@example.com", password))
    }

    #[test]
    fn params_are_posted_as_form() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/register")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .header("Accept", "text/plain")
                .body("email=user%40example.com");
            then.status(200)
                .header("Content-Type", "text/plain")
                .body("Please check your mailbox");
        });

        let client = client_for(&server);
        let mut credentials = resolver_with_cookie(None);
        let mut ui = MockUI::new();
        let req = ApiRequest::get("/v1/register")
            .param("email", "user@example.com")
            .without_auth();

        let payload = client.request(&req, &mut credentials, &mut ui).unwrap();

        mock.assert_calls(1);
        assert_eq!(payload, Payload::Text("Please check your mailbox".to_string()));
        assert!(ui.prompts_shown().is_empty());
    }

    #[test]
    fn unauthenticated_request_sends_no_credentials() {
        let server = MockServer::start();
        let with_cookie = server.mock(|when, then| {
            when.path("/v1/reset_password/").header_exists("Cookie");
            then.status(200);
        });
        let plain = server.mock(|when, then| {
            when.path("/v1/reset_password/").header_missing("Cookie");
            then.status(200).body("ok");
        });

        let client = client_for(&server);
        let mut credentials = resolver_with_cookie(Some("tkt"));
        let mut ui = MockUI::new();
        let req = ApiRequest::get("/v1/reset_password/")
            .param("email", "me@example.com")
            .without_auth();

        client.request(&req, &mut credentials, &mut ui).unwrap();

        with_cookie.assert_calls(0);
        plain.assert_calls(1);
    }

    #[test]
    fn cached_cookie_is_sent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/applications")
                .header("Cookie", "auth_tkt=tkt");
            then.status(200).body("www");
        });

        let client = client_for(&server);
        let mut credentials = resolver_with_cookie(Some("tkt"));
        let mut ui = MockUI::new();

        let payload = client
            .request(&ApiRequest::get("/v1/applications"), &mut credentials, &mut ui)
            .unwrap();

        mock.assert_calls(1);
        assert_eq!(payload, Payload::Text("www".to_string()));
        assert_eq!(ui.spinners(), &["GET /v1/applications"]);
    }

    #[test]
    fn rejected_cookie_retries_once_with_basic_auth() {
        let server = MockServer::start();
        let cookie_mock = server.mock(|when, then| {
            when.path("/v1/applications").header("Cookie", "auth_tkt=stale");
            then.status(401);
        });
        let basic_mock = server.mock(|when, then| {
            when.path("/v1/applications")
                .header("Authorization", basic_header("secret"));
            then.status(200)
                .header("Set-Cookie", "auth_tkt=fresh; Path=/")
                .body("www");
        });

        let client = client_for(&server);
        let mut credentials = resolver_with_cookie(Some("stale"));
        let mut ui = MockUI::new();
        ui.set_prompt_response("password", "secret");

        let payload = client
            .request(&ApiRequest::get("/v1/applications"), &mut credentials, &mut ui)
            .unwrap();

        cookie_mock.assert_calls(1);
        basic_mock.assert_calls(1);
        assert_eq!(payload, Payload::Text("www".to_string()));
        assert_eq!(ui.prompts_shown(), &["password"]);

        // The fresh cookie is used next time.
        let session = credentials.resolve_session(&mut ui).unwrap();
        assert_eq!(session, Session::Cookie("fresh".to_string()));
    }

    #[test]
    fn second_401_is_authentication_failure() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.path("/v1/applications");
            then.status(401);
        });

        let client = client_for(&server);
        let mut credentials = resolver_with_cookie(Some("stale"));
        let mut ui = MockUI::new();
        ui.set_prompt_response("password", "wrong");

        let err = client
            .request(&ApiRequest::get("/v1/applications"), &mut credentials, &mut ui)
            .unwrap_err();

        mock.assert_calls(2);
        assert!(matches!(err, PytheonError::AuthenticationFailed { .. }));
    }

    #[test]
    fn basic_401_is_not_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.path("/v1/applications");
            then.status(401);
        });

        let client = client_for(&server);
        let mut credentials = resolver_with_cookie(None);
        let mut ui = MockUI::new();
        ui.set_prompt_response("password", "wrong");

        let err = client
            .request(&ApiRequest::get("/v1/applications"), &mut credentials, &mut ui)
            .unwrap_err();

        mock.assert_calls(1);
        assert!(matches!(err, PytheonError::AuthenticationFailed { .. }));
    }

    #[test]
    fn refused_cached_password_is_forgotten() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.path("/v1/applications");
            then.status(401);
        });

        let client = client_for(&server);
        let mut user = UserConfig::empty(std::path::Path::new("/nonexistent/.pytheonrc"));
        user.username = Some("me@example.com".to_string());
        let mut store = MemoryStore::default();
        store
            .passwords
            .insert("me@example.com".to_string(), "typo".to_string());
        let mut credentials = CredentialResolver::new(user, Box::new(store));
        let mut ui = MockUI::new();
        ui.set_prompt_response("password", "right");

        let err = client
            .request(&ApiRequest::get("/v1/applications"), &mut credentials, &mut ui)
            .unwrap_err();
        assert!(matches!(err, PytheonError::AuthenticationFailed { .. }));
        assert!(ui.prompts_shown().is_empty());

        let session = credentials.resolve_basic(&mut ui, false).unwrap();
        assert!(matches!(session, Session::Basic { ref password, .. } if password == "right"));
        assert_eq!(ui.prompts_shown(), &["password"]);
        mock.assert_calls(1);
    }

    #[test]
    fn refused_retry_password_is_forgotten() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.path("/v1/applications");
            then.status(401);
        });

        let client = client_for(&server);
        let mut credentials = resolver_with_cookie(Some("stale"));
        let mut ui = MockUI::new();
        ui.set_prompt_response("password", "wrong");

        client
            .request(&ApiRequest::get("/v1/applications"), &mut credentials, &mut ui)
            .unwrap_err();
        credentials.resolve_basic(&mut ui, false).unwrap();

        assert_eq!(ui.prompts_shown(), &["password", "password"]);
    }

    #[test]
    fn server_error_is_returned() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.path("/v1/addons");
            then.status(500).body("boom");
        });

        let client = client_for(&server);
        let mut credentials = resolver_with_cookie(Some("tkt"));
        let mut ui = MockUI::new();

        let err = client
            .request(&ApiRequest::get("/v1/addons"), &mut credentials, &mut ui)
            .unwrap_err();

        assert!(matches!(err, PytheonError::Server { status: 500, .. }));
    }

    #[test]
    fn client_errors_warn_and_decode() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.path("/v1/applications/nope");
            then.status(403).body("! You cannot access this resource");
        });

        let client = client_for(&server);
        let mut credentials = resolver_with_cookie(Some("tkt"));
        let mut ui = MockUI::new();

        let payload = client
            .request(
                &ApiRequest::delete("/v1/applications/nope"),
                &mut credentials,
                &mut ui,
            )
            .unwrap();

        assert!(ui.has_warning("403 - Forbidden"));
        assert_eq!(
            payload,
            Payload::Text("! You cannot access this resource".to_string())
        );
    }

    #[test]
    fn json_body_is_decoded() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.path("/v1/addons").header("Accept", "application/json");
            then.status(200)
                .header("Content-Type", "application/json")
                .body(r#"[{"id": "mysql"}]"#);
        });

        let client = client_for(&server);
        let mut credentials = resolver_with_cookie(Some("tkt"));
        let mut ui = MockUI::new();

        let payload = client
            .request(&ApiRequest::get("/v1/addons").json(), &mut credentials, &mut ui)
            .unwrap();

        assert_eq!(payload, Payload::Json(serde_json::json!([{"id": "mysql"}])));
    }

    #[test]
    fn cookie_is_saved_to_config_file_store() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".pytheonrc");
        let server = MockServer::start();
        server.mock(|when, then| {
            when.path("/v1/applications");
            then.status(200)
                .header("Set-Cookie", "auth_tkt=\"fresh\"; Path=/")
                .body("");
        });

        let mut user = UserConfig::empty(&path);
        user.username = Some("me@example.com".to_string());
        let mut credentials =
            CredentialResolver::new(user, Box::new(crate::auth::ConfigFileStore))
                .with_password_override(Some("secret".to_string()));
        let mut ui = MockUI::new();

        client_for(&server)
            .request(&ApiRequest::get("/v1/applications"), &mut credentials, &mut ui)
            .unwrap();

        let reloaded = UserConfig::load(&path).unwrap();
        assert_eq!(reloaded.auth_cookie.as_deref(), Some("fresh"));
    }

    #[test]
    fn connection_refused_is_network_error() {
        // Bind and drop a listener to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let endpoint = ApiEndpoint {
            host: "127.0.0.1".to_string(),
            port,
        };
        let client = ApiClient::new(endpoint, None).unwrap();
        let mut credentials = resolver_with_cookie(None);
        let mut ui = MockUI::new();

        let err = client
            .request(
                &ApiRequest::get("/v1/register").without_auth(),
                &mut credentials,
                &mut ui,
            )
            .unwrap_err();

        assert!(matches!(err, PytheonError::Network { .. }));
    }

    #[test]
    fn missing_ca_bundle_fails_to_build() {
        let endpoint: ApiEndpoint = "api.pytheon.net:443".parse().unwrap();
        let result = ApiClient::new(endpoint, Some(Path::new("/nonexistent/ca.pem")));
        assert!(result.is_err());
    }

    #[derive(Debug)]
    struct Layer(&'static str, Option<Box<Layer>>);

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.1.as_deref().map(|l| l as &(dyn StdError + 'static))
        }
    }

    #[test]
    fn certificate_failure_deep_in_chain_is_tls() {
        let err = Layer(
            "error sending request",
            Some(Box::new(Layer(
                "client error (Connect)",
                Some(Box::new(Layer("invalid peer certificate: UnknownIssuer", None))),
            ))),
        );

        let classified = classify_transport_error("api.pytheon.net", &err);
        match classified {
            PytheonError::TlsValidation { host, message } => {
                assert_eq!(host, "api.pytheon.net");
                assert!(message.contains("UnknownIssuer"));
            }
            other => panic!("expected TLS error, got {:?}", other),
        }
    }

    #[test]
    fn other_transport_failures_are_network() {
        let err = Layer("error sending request", Some(Box::new(Layer("Connection refused", None))));
        assert!(matches!(
            classify_transport_error("localhost", &err),
            PytheonError::Network { .. }
        ));
    }
}

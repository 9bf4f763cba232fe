//! Read-only view of an incoming request.
//!
//! The engine never touches a web framework directly. Adapters implement
//! [`CredentialSource`] over their own request type; [`RequestParts`] is an
//! owned implementation for tests and simple embeddings.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashMap;

/// The request channels a credential can travel on.
pub trait CredentialSource {
    /// The `Host` of the request, including a non-default port.
    fn host(&self) -> &str;

    /// A query-string parameter.
    fn query(&self, key: &str) -> Option<&str>;

    /// A body or form field.
    fn input(&self, key: &str) -> Option<&str>;

    /// A header, looked up case-insensitively.
    fn header(&self, name: &str) -> Option<&str>;

    /// A server variable such as `HTTP_AUTHORIZATION`.
    fn server_var(&self, name: &str) -> Option<&str>;

    /// A cookie value.
    fn cookie(&self, name: &str) -> Option<&str>;

    /// The password half of an `Authorization: Basic` header.
    fn basic_password(&self) -> Option<String> {
        let value = self.header("authorization")?.trim();
        let (scheme, encoded) = value.split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (_, password) = decoded.split_once(':')?;
        Some(password.to_owned())
    }
}

/// Owned request snapshot.
#[derive(Debug, Clone, Default)]
pub struct RequestParts {
    host: String,
    query: HashMap<String, String>,
    input: HashMap<String, String>,
    headers: HashMap<String, String>,
    server: HashMap<String, String>,
    cookies: HashMap<String, String>,
}

impl RequestParts {
    /// An empty request addressed to `host`.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Add a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a body field.
    #[must_use]
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.input.insert(key.into(), value.into());
        self
    }

    /// Add a header. Names are case-insensitive.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Add a server variable.
    #[must_use]
    pub fn with_server_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.server.insert(name.into(), value.into());
        self
    }

    /// Add a cookie.
    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Set an `Authorization: Basic` header for `user:password`.
    #[must_use]
    pub fn with_basic_auth(self, user: &str, password: &str) -> Self {
        let encoded = STANDARD.encode(format!("{user}:{password}"));
        self.with_header("Authorization", format!("Basic {encoded}"))
    }
}

impl CredentialSource for RequestParts {
    fn host(&self) -> &str {
        &self.host
    }

    fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    fn input(&self, key: &str) -> Option<&str> {
        self.input.get(key).map(String::as_str)
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn server_var(&self, name: &str) -> Option<&str> {
        self.server.get(name).map(String::as_str)
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

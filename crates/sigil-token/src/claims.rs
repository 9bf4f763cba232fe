//! Claim set and per-request validation context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::request::CredentialSource;

/// Principal attributes embedded in a token.
pub type Subject = Map<String, Value>;

/// The signed claim set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Host that issued the token.
    pub iss: String,
    /// Host the token is intended for.
    pub aud: String,
    /// Issue time, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds. The token is valid while `now <= exp`.
    pub exp: i64,
    /// Principal attributes.
    pub sub: Subject,
}

impl Claims {
    /// Expiry as a timestamp.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Issue time as a timestamp.
    #[must_use]
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }
}

/// Hosts a token is created for and checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenContext {
    host: String,
    issuer: Option<String>,
}

impl TokenContext {
    /// Context for a request served by `host`.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            issuer: None,
        }
    }

    /// Expect tokens issued by `server` instead of the serving host.
    ///
    /// The value is normalized with [`host_of`]; an empty or unparsable
    /// server leaves the serving host as the expected issuer.
    #[must_use]
    pub fn with_issuer(mut self, server: &str) -> Self {
        let issuer = host_of(server);
        self.issuer = (!issuer.is_empty()).then_some(issuer);
        self
    }

    /// Context for `request`, honoring an optional issuing server.
    #[must_use]
    pub fn from_request<R: CredentialSource + ?Sized>(
        request: &R,
        flow_server: Option<&str>,
    ) -> Self {
        let ctx = Self::new(request.host());
        match flow_server {
            Some(server) => ctx.with_issuer(server),
            None => ctx,
        }
    }

    /// The serving host; used as issuer and audience on creation.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The issuer a parsed token must name.
    #[must_use]
    pub fn expected_issuer(&self) -> &str {
        self.issuer.as_deref().unwrap_or(&self.host)
    }
}

/// Reduce a URL or bare host to `host[:port]`.
///
/// A scheme is assumed when missing. Returns an empty string for input
/// without a host.
#[must_use]
pub fn host_of(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        return String::new();
    }

    let with_scheme = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_owned()
    } else {
        format!("http://{url}")
    };

    let Ok(parsed) = url::Url::parse(&with_scheme) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };

    match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    }
}

//! Configuration struct definitions.
//!
//! Every section derives `Default` with the same values as the embedded
//! `defaults.toml`, so a partially specified file still deserializes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Signing secret and alphabet seed.
    pub signing: SigningSection,
    /// Where credentials are looked up on a request.
    pub token: TokenSection,
    /// Token lifetimes.
    pub lifetimes: LifetimesSection,
    /// Cross-host flow settings.
    pub flow: FlowSection,
    /// Logging settings.
    pub logging: LoggingSection,
}

/// Process-wide signing material.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningSection {
    /// Secret the signing key is derived from. Never serialized.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Optional seed permuting the token alphabet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
}

impl fmt::Debug for SigningSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = if self.secret.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("SigningSection")
            .field("secret", &secret)
            .field("seed", &self.seed.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Credential lookup keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenSection {
    /// Query parameter, body field and header name.
    pub key: String,
    /// Header value prefix, matched case-insensitively.
    pub prefix: String,
    /// Cookie name.
    pub cookie: String,
}

impl Default for TokenSection {
    fn default() -> Self {
        Self {
            key: "Authorization".to_owned(),
            prefix: "bearer".to_owned(),
            cookie: "Authorization".to_owned(),
        }
    }
}

/// Token lifetimes in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifetimesSection {
    /// Default session lifetime.
    pub session_secs: u64,
    /// Lifetime used when the caller asks to be remembered.
    pub remember_secs: u64,
}

impl Default for LifetimesSection {
    fn default() -> Self {
        Self {
            session_secs: 7200,
            remember_secs: 157_680_000,
        }
    }
}

/// Cross-host flow settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowSection {
    /// Host that issues tokens, when it differs from the serving host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Level or `EnvFilter` directive.
    pub level: String,
    /// One of `pretty`, `compact`, `json`, `full`.
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "pretty".to_owned(),
        }
    }
}

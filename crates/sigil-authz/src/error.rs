//! Authorization error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::response::GateResponse;

/// Message used when a denial carries none.
pub const DEFAULT_DENIAL_MESSAGE: &str = "This action is unauthorized.";

/// A gate decision evaluated to deny.
///
/// Carries the response so call sites can surface its message and code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.message().unwrap_or(DEFAULT_DENIAL_MESSAGE))]
pub struct AuthorizationDenied(GateResponse);

impl AuthorizationDenied {
    pub(crate) fn new(response: GateResponse) -> Self {
        Self(response)
    }

    /// The denial response.
    #[must_use]
    pub fn response(&self) -> &GateResponse {
        &self.0
    }

    /// Take the denial response.
    #[must_use]
    pub fn into_response(self) -> GateResponse {
        self.0
    }
}

/// Result type for explicit authorization calls.
pub type AuthorizationResult<T> = Result<T, AuthorizationDenied>;

/// An ad-hoc policy failed to reach a decision.
#[derive(Debug, Clone, Error)]
#[error("policy failed: {0}")]
pub struct PolicyError(String);

impl PolicyError {
    /// Error with a description.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors reading or writing the ability cache artifact.
#[derive(Debug, Error)]
pub enum AbilityCacheError {
    /// The artifact could not be read or written.
    #[error("ability cache at {path}: {source}")]
    Io {
        /// Artifact path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The artifact is not a JSON list of strings.
    #[error("ability cache at {path} is malformed: {source}")]
    Malformed {
        /// Artifact path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for ability cache operations.
pub type AbilityCacheResult<T> = Result<T, AbilityCacheError>;

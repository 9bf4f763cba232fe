//! Authorization decisions.

use serde::{Deserialize, Serialize};

use crate::error::{AuthorizationDenied, AuthorizationResult};

/// The outcome of an authorization decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateResponse {
    allowed: bool,
    message: Option<String>,
    code: Option<String>,
}

impl GateResponse {
    /// A response with every field given.
    #[must_use]
    pub fn new(allowed: bool, message: Option<&str>, code: Option<&str>) -> Self {
        Self {
            allowed,
            message: message.map(str::to_owned),
            code: code.map(str::to_owned),
        }
    }

    /// A bare allow.
    #[must_use]
    pub fn allow() -> Self {
        Self::new(true, None, None)
    }

    /// A bare deny.
    #[must_use]
    pub fn deny() -> Self {
        Self::new(false, None, None)
    }

    /// A deny carrying a message and code.
    #[must_use]
    pub fn deny_with(message: Option<&str>, code: Option<&str>) -> Self {
        Self::new(false, message, code)
    }

    /// Whether access is granted.
    #[must_use]
    pub fn allowed(&self) -> bool {
        self.allowed
    }

    /// Whether access is refused.
    #[must_use]
    pub fn denied(&self) -> bool {
        !self.allowed
    }

    /// Message for display.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Machine-readable code.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Pass an allow through; turn a deny into an error carrying it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationDenied`] when the response is a deny.
    pub fn authorize(self) -> AuthorizationResult<Self> {
        if self.allowed {
            Ok(self)
        } else {
            Err(AuthorizationDenied::new(self))
        }
    }
}

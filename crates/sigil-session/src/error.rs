//! Session error types.

use sigil_token::TokenError;
use thiserror::Error;

/// Errors surfaced by session operations.
///
/// Token failures while resolving the current principal never appear here;
/// they resolve to a guest instead.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No principal could be resolved for an operation that requires one.
    #[error("unauthenticated")]
    Unauthenticated,

    /// A token could not be issued.
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_error_is_transparent() {
        let err = SessionError::from(TokenError::InvalidLifetime);
        assert_eq!(err.to_string(), TokenError::InvalidLifetime.to_string());
    }
}

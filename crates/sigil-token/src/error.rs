//! Token error types.

use sigil_crypto::CryptoError;
use thiserror::Error;

/// Errors raised while creating or parsing tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Malformed encoding or signature mismatch.
    #[error("token is invalid")]
    Invalid,

    /// The issuer or audience claim names a different host.
    #[error("token issued for {actual}, expected {expected}")]
    AudienceMismatch {
        /// Host the token had to name.
        expected: String,
        /// Host the token actually named.
        actual: String,
    },

    /// The token decoded but is past its expiry.
    #[error("token expired at {expires_at}")]
    Expired {
        /// Expiry as unix seconds.
        expires_at: i64,
    },

    /// A token must expire strictly after it is issued.
    #[error("token lifetime must be greater than zero seconds")]
    InvalidLifetime,

    /// The subject could not be serialized.
    #[error("failed to serialize claims: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Signing material could not be built.
    #[error("signing setup failed: {0}")]
    Crypto(#[from] CryptoError),
}

/// Result type for token operations.
pub type TokenResult<T> = Result<T, TokenError>;

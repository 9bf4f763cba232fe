//! Prelude module - commonly used types for convenient import.
//!
//! Use `use sigil_token::prelude::*;` to import all essential types.

// Errors
pub use crate::{TokenError, TokenResult};

// Request access
pub use crate::{CredentialSource, RequestParts, TokenLocator};

// Tokens
pub use crate::{Claims, Subject, TokenCodec, TokenContext};

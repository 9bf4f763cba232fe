//! The authenticated entity a gate decides for.

use serde_json::{Map, Value};

use crate::nested::Nested;

/// What the engine needs to know about a principal.
///
/// Implemented by the user records of the embedding application.
pub trait Principal {
    /// Unique identifier.
    fn id(&self) -> String;

    /// Stored credential hash, if the principal has one.
    fn password_hash(&self) -> Option<&str>;

    /// Raw role claims.
    fn roles(&self) -> Nested<String>;

    /// Raw ability claims.
    fn permissions(&self) -> Nested<String>;

    /// Attributes embedded into issued tokens.
    fn attributes(&self) -> Map<String, Value>;
}

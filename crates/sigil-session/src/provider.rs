//! Principal lookup.

use serde_json::{Map, Value};
use sigil_token::Subject;

/// Login input, e.g. `{"email": ..., "password": ...}`.
pub type Credentials = Map<String, Value>;

/// Looks up principals for a session.
///
/// Implemented by the embedding application over its user storage.
pub trait UserProvider<P>: Send + Sync {
    /// The principal with identifier `id`.
    fn retrieve_by_id(&self, id: &str) -> Option<P>;

    /// The principal matching the non-secret fields of `credentials`.
    fn retrieve_by_credentials(&self, credentials: &Credentials) -> Option<P>;

    /// Whether `credentials` prove the identity of `user`.
    fn validate_credentials(&self, user: &P, credentials: &Credentials) -> bool;

    /// Rebuild a principal from the subject of a verified token.
    fn from_subject(&self, subject: &Subject) -> Option<P>;
}

//! Prelude module - commonly used types for convenient import.
//!
//! Use `use sigil_session::prelude::*;` to import all essential types.

// Errors
pub use crate::{SessionError, SessionResult};

// Sessions
pub use crate::{Credentials, IssuedToken, StatelessSession, UserProvider};

// Storage and events
pub use crate::{AuthEvent, AuthListener, MemorySessionStore, SessionStore};

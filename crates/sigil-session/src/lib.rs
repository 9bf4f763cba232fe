//! Sigil Session - stateless login on top of signed tokens.
//!
//! This crate provides:
//! - [`StatelessSession`], the per-request authentication guard
//! - [`UserProvider`], the lookup contract for the application's users
//! - [`SessionStore`] and [`MemorySessionStore`] for keeping issued tokens
//! - [`AuthListener`] hooks fired at each lifecycle point
//!
//! Resolving the current principal never fails: a missing, tampered or
//! expired token simply leaves the session as a guest.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod events;
mod provider;
mod session;
mod store;

pub use error::{SessionError, SessionResult};
pub use events::{AuthEvent, AuthListener};
pub use provider::{Credentials, UserProvider};
pub use session::{IssuedToken, LoginCheck, StatelessSession};
pub use store::{MemorySessionStore, SessionStore};

//! Sigil Test - shared test utilities for the sigil crates.
//!
//! This crate provides mock collaborators and fixtures that can be used
//! across multiple sigil crates as a dev-dependency.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! sigil-test.workspace = true
//! ```
//!
//! Then use in your tests:
//!
//! ```rust,ignore
//! use sigil_test::{InMemoryUserProvider, TestUser, credentials, test_request, test_session};
//!
//! #[test]
//! fn test_login() {
//!     let users = InMemoryUserProvider::new()
//!         .with_user(TestUser::new(1, "ada@example.com", "secret"));
//!     let mut session = test_session(&test_request(), users.into_shared());
//!
//!     let token = session
//!         .attempt(&credentials("ada@example.com", "secret"), false)
//!         .unwrap();
//!     assert!(token.is_some());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;

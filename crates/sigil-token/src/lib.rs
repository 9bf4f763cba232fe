//! Sigil Token - stateless, signed credentials.
//!
//! This crate provides:
//! - [`CredentialSource`], a read-only view over any request type
//! - [`TokenLocator`], which finds the raw credential on a request
//! - [`TokenCodec`], which creates and validates signed tokens
//!
//! A token carries its principal in the `sub` claim, so no server-side
//! session storage is needed. Validation runs signature first, then
//! issuer and audience, then expiry.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use sigil_token::{RequestParts, TokenCodec, TokenContext, TokenLocator};
//!
//! let codec = TokenCodec::from_secret(b"app-secret", None).unwrap();
//! let ctx = TokenContext::new("app.test");
//! let subject = json!({"id": 1}).as_object().unwrap().clone();
//!
//! let token = codec.create(&subject, 7200, &ctx).unwrap();
//!
//! let request = RequestParts::new("app.test")
//!     .with_header("Authorization", format!("Bearer {token}"));
//! let raw = TokenLocator::default().locate(&request);
//!
//! assert_eq!(codec.parse(&raw, &ctx).unwrap(), subject);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod claims;
mod codec;
mod error;
mod locator;
mod request;

pub use claims::{Claims, Subject, TokenContext, host_of};
pub use codec::TokenCodec;
pub use error::{TokenError, TokenResult};
pub use locator::TokenLocator;
pub use request::{CredentialSource, RequestParts};

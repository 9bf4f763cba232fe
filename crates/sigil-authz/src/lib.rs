//! Sigil Authz - ability-based authorization.
//!
//! This crate provides:
//! - [`Ability`], the canonical `group.action` identifier and its derivation
//!   from routing metadata
//! - [`AuthorizationRepository`], a principal's grants compiled for lookup
//! - [`Gate`], the per-request decision engine with ad-hoc [`Policy`]
//!   callbacks
//! - [`AbilityCache`], the precomputed list of route abilities
//!
//! # Example
//!
//! ```
//! use serde_json::{Map, Value};
//! use sigil_authz::{Gate, Nested, Principal};
//!
//! struct Editor;
//!
//! impl Principal for Editor {
//!     fn id(&self) -> String { "7".to_owned() }
//!     fn password_hash(&self) -> Option<&str> { None }
//!     fn roles(&self) -> Nested<String> { "editor".into() }
//!     fn permissions(&self) -> Nested<String> { vec!["posts.read", "posts.write"].into() }
//!     fn attributes(&self) -> Map<String, Value> { Map::new() }
//! }
//!
//! let gate = Gate::with_principal(Some(Editor));
//!
//! assert!(gate.allows("Posts:Write", &[]));
//! assert!(gate.allows("editor", &[]));
//! assert!(gate.denies("posts.delete", &[]));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod ability;
mod cache;
mod error;
mod gate;
mod inflect;
mod nested;
mod policy;
mod principal;
mod repository;
mod response;

pub use ability::{Ability, RouteMetadata, WILDCARD};
pub use cache::AbilityCache;
pub use error::{
    AbilityCacheError, AbilityCacheResult, AuthorizationDenied, AuthorizationResult,
    DEFAULT_DENIAL_MESSAGE, PolicyError,
};
pub use gate::Gate;
pub use nested::Nested;
pub use policy::{Check, Condition, GuestAccess, Policy, Verdict};
pub use principal::Principal;
pub use repository::AuthorizationRepository;
pub use response::GateResponse;

//! Prelude module - commonly used types for convenient import.
//!
//! Use `use sigil_authz::prelude::*;` to import all essential types.

// Errors
pub use crate::{AuthorizationDenied, AuthorizationResult, PolicyError};

// Abilities
pub use crate::{Ability, AbilityCache, Nested, RouteMetadata};

// Decisions
pub use crate::{AuthorizationRepository, Gate, GateResponse, Principal};

// Policies
pub use crate::{Check, Condition, GuestAccess, Policy, Verdict};

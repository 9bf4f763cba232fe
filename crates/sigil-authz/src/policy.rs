//! Ad-hoc authorization callbacks.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::PolicyError;
use crate::nested::Nested;
use crate::response::GateResponse;

/// What a policy callback returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// A plain decision, turned into a response by the gate.
    Bool(bool),
    /// A finished response, used as is.
    Response(GateResponse),
}

impl From<bool> for Verdict {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<GateResponse> for Verdict {
    fn from(response: GateResponse) -> Self {
        Self::Response(response)
    }
}

/// Whether a policy may run without an authenticated principal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GuestAccess {
    /// Guests are denied without running the callback.
    #[default]
    Deny,
    /// The callback runs with no principal.
    Allow,
}

type PolicyFn<P> = dyn Fn(Option<&P>, &[Value]) -> Result<Verdict, PolicyError> + Send + Sync;

/// A callback deciding an authorization question.
pub struct Policy<P> {
    callback: Arc<PolicyFn<P>>,
    guests: GuestAccess,
}

impl<P> Policy<P> {
    /// A policy that only runs for an authenticated principal.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(Option<&P>, &[Value]) -> Result<Verdict, PolicyError> + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
            guests: GuestAccess::Deny,
        }
    }

    /// A policy that also runs when no principal is resolved.
    pub fn allow_guests<F>(callback: F) -> Self
    where
        F: Fn(Option<&P>, &[Value]) -> Result<Verdict, PolicyError> + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
            guests: GuestAccess::Allow,
        }
    }

    /// A principal-only policy from an infallible predicate.
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        Self::new(move |principal, _| Ok(Verdict::Bool(principal.is_some_and(&predicate))))
    }

    /// Guest access marker.
    #[must_use]
    pub fn guest_access(&self) -> GuestAccess {
        self.guests
    }

    /// Whether the callback may run for `principal`.
    #[must_use]
    pub fn can_run_for(&self, principal: Option<&P>) -> bool {
        principal.is_some() || self.guests == GuestAccess::Allow
    }

    pub(crate) fn call(&self, principal: Option<&P>, args: &[Value]) -> Result<Verdict, PolicyError> {
        (self.callback)(principal, args)
    }
}

impl<P> Clone for Policy<P> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
            guests: self.guests,
        }
    }
}

impl<P> fmt::Debug for Policy<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy")
            .field("guests", &self.guests)
            .finish_non_exhaustive()
    }
}

/// A condition for `allow_if` and `deny_if`.
#[derive(Debug, Clone)]
pub enum Condition<P> {
    /// A decided value.
    Bool(bool),
    /// A finished response.
    Response(GateResponse),
    /// A callback evaluated against the principal.
    Policy(Policy<P>),
}

impl<P> From<bool> for Condition<P> {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<P> From<GateResponse> for Condition<P> {
    fn from(response: GateResponse) -> Self {
        Self::Response(response)
    }
}

impl<P> From<Policy<P>> for Condition<P> {
    fn from(policy: Policy<P>) -> Self {
        Self::Policy(policy)
    }
}

/// One item of a gate query: ability identifiers or a policy.
#[derive(Debug, Clone)]
pub enum Check<P> {
    /// Identifiers checked against the repository; a list must hold entirely.
    Abilities(Nested<String>),
    /// A callback, evaluated as by `allow_if`.
    Policy(Policy<P>),
}

impl<P> From<&str> for Check<P> {
    fn from(ability: &str) -> Self {
        Self::Abilities(ability.into())
    }
}

impl<P> From<String> for Check<P> {
    fn from(ability: String) -> Self {
        Self::Abilities(ability.into())
    }
}

impl<P> From<&String> for Check<P> {
    fn from(ability: &String) -> Self {
        Self::Abilities(ability.as_str().into())
    }
}

impl<P> From<Vec<&str>> for Check<P> {
    fn from(abilities: Vec<&str>) -> Self {
        Self::Abilities(abilities.into())
    }
}

impl<P> From<Nested<String>> for Check<P> {
    fn from(abilities: Nested<String>) -> Self {
        Self::Abilities(abilities)
    }
}

impl<P> From<Policy<P>> for Check<P> {
    fn from(policy: Policy<P>) -> Self {
        Self::Policy(policy)
    }
}

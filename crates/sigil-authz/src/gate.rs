//! The authorization decision engine.
//!
//! A [`Gate`] lives for one request. It resolves its principal at most once,
//! compiles that principal's grants at most once, and answers every query
//! from the compiled [`AuthorizationRepository`].
//!
//! Only [`Gate::authorize`], [`Gate::allow_if`] and [`Gate::deny_if`] return
//! errors; every other query reports a plain decision.

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use std::fmt;
use std::sync::OnceLock;
use tracing::debug;

use crate::ability::RouteMetadata;
use crate::error::AuthorizationResult;
use crate::policy::{Check, Condition, Verdict};
use crate::principal::Principal;
use crate::repository::AuthorizationRepository;
use crate::response::GateResponse;

/// Route-name prefixes that do not take part in ability names.
const ROUTE_PREFIXES: [&str; 2] = ["api.", "web."];

type Resolver<P> = Box<dyn Fn() -> Option<P> + Send + Sync>;

/// Decides ability and policy queries for one principal.
pub struct Gate<P> {
    resolver: Resolver<P>,
    principal: OnceLock<Option<P>>,
    repository: OnceLock<AuthorizationRepository>,
    default_denial: Option<GateResponse>,
}

impl<P: Principal> Gate<P> {
    /// Gate resolving its principal lazily through `resolver`.
    pub fn new<F>(resolver: F) -> Self
    where
        F: Fn() -> Option<P> + Send + Sync + 'static,
    {
        Self {
            resolver: Box::new(resolver),
            principal: OnceLock::new(),
            repository: OnceLock::new(),
            default_denial: None,
        }
    }

    /// Gate bound to a known principal, or to a guest.
    #[must_use]
    pub fn with_principal(principal: Option<P>) -> Self {
        Self {
            resolver: Box::new(|| None),
            principal: OnceLock::from(principal),
            repository: OnceLock::new(),
            default_denial: None,
        }
    }

    /// A fresh gate for `user`, sharing nothing with this one.
    #[must_use]
    pub fn for_user(&self, user: P) -> Self {
        Self::with_principal(Some(user))
    }

    /// The principal, resolved on first use.
    pub fn principal(&self) -> Option<&P> {
        self.principal.get_or_init(|| (self.resolver)()).as_ref()
    }

    /// The compiled grants, built on first use.
    pub fn repository(&self) -> &AuthorizationRepository {
        self.repository.get_or_init(|| match self.principal() {
            Some(principal) => AuthorizationRepository::from_principal(principal),
            None => AuthorizationRepository::default(),
        })
    }

    /// Response used instead of a bare deny.
    pub fn set_default_denial_response(&mut self, response: GateResponse) -> &mut Self {
        self.default_denial = Some(response);
        self
    }

    /// Builder form of [`Gate::set_default_denial_response`].
    #[must_use]
    pub fn with_default_denial_response(mut self, response: GateResponse) -> Self {
        self.default_denial = Some(response);
        self
    }

    /// Whether every item is allowed. An empty query is denied.
    pub fn check<I>(&self, abilities: I, args: &[Value]) -> bool
    where
        I: IntoIterator,
        I::Item: Into<Check<P>>,
    {
        let mut any = false;
        for ability in abilities {
            any = true;
            if !self.inspect(ability, args).allowed() {
                return false;
            }
        }
        any
    }

    /// Whether one item is allowed. A list of identifiers must hold entirely.
    pub fn allows(&self, ability: impl Into<Check<P>>, args: &[Value]) -> bool {
        self.inspect(ability, args).allowed()
    }

    /// Negation of [`Gate::allows`].
    pub fn denies(&self, ability: impl Into<Check<P>>, args: &[Value]) -> bool {
        !self.allows(ability, args)
    }

    /// Whether at least one item is allowed.
    ///
    /// Each item is checked on its own, so an item that is itself a list of
    /// identifiers still has to hold entirely.
    pub fn any<I>(&self, abilities: I, args: &[Value]) -> bool
    where
        I: IntoIterator,
        I::Item: Into<Check<P>>,
    {
        abilities
            .into_iter()
            .any(|ability| self.inspect(ability, args).allowed())
    }

    /// Negation of [`Gate::any`].
    pub fn none<I>(&self, abilities: I, args: &[Value]) -> bool
    where
        I: IntoIterator,
        I::Item: Into<Check<P>>,
    {
        !self.any(abilities, args)
    }

    /// The response for one item. Never fails; a denial raised while
    /// evaluating is returned as its response.
    pub fn inspect(&self, ability: impl Into<Check<P>>, args: &[Value]) -> GateResponse {
        match self.raw(ability, args) {
            Ok(Verdict::Response(response)) => response,
            Ok(Verdict::Bool(true)) => GateResponse::allow(),
            Ok(Verdict::Bool(false)) => self
                .default_denial
                .clone()
                .unwrap_or_else(GateResponse::deny),
            Err(denied) => denied.into_response(),
        }
    }

    /// The undecorated result for one item.
    ///
    /// Identifiers are looked up in the repository; a policy is evaluated as
    /// by [`Gate::allow_if`] with `args` passed through.
    ///
    /// # Errors
    ///
    /// Returns the denial raised by a policy.
    pub fn raw(&self, ability: impl Into<Check<P>>, args: &[Value]) -> AuthorizationResult<Verdict> {
        match ability.into() {
            Check::Abilities(abilities) => Ok(Verdict::Bool(self.repository().has(&abilities))),
            Check::Policy(policy) => self
                .authorize_on_demand(Condition::Policy(policy), None, None, true, args)
                .map(Verdict::Response),
        }
    }

    /// Inspect and fail on a denial.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationDenied`](crate::AuthorizationDenied) carrying
    /// the denial response.
    pub fn authorize(
        &self,
        ability: impl Into<Check<P>>,
        args: &[Value],
    ) -> AuthorizationResult<GateResponse> {
        self.inspect(ability, args).authorize()
    }

    /// Allow when `condition` holds.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationDenied`](crate::AuthorizationDenied) unless the
    /// condition holds.
    pub fn allow_if(
        &self,
        condition: impl Into<Condition<P>>,
        message: Option<&str>,
        code: Option<&str>,
    ) -> AuthorizationResult<GateResponse> {
        self.authorize_on_demand(condition.into(), message, code, true, &[])
    }

    /// Deny when `condition` holds.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizationDenied`](crate::AuthorizationDenied) when the
    /// condition holds or cannot be evaluated.
    pub fn deny_if(
        &self,
        condition: impl Into<Condition<P>>,
        message: Option<&str>,
        code: Option<&str>,
    ) -> AuthorizationResult<GateResponse> {
        self.authorize_on_demand(condition.into(), message, code, false, &[])
    }

    fn authorize_on_demand(
        &self,
        condition: Condition<P>,
        message: Option<&str>,
        code: Option<&str>,
        allow_when: bool,
        args: &[Value],
    ) -> AuthorizationResult<GateResponse> {
        let response = match condition {
            Condition::Bool(value) => GateResponse::new(value == allow_when, message, code),
            Condition::Response(response) => response,
            Condition::Policy(policy) => {
                let principal = self.principal();
                if policy.can_run_for(principal) {
                    match policy.call(principal, args) {
                        Ok(Verdict::Response(response)) => response,
                        Ok(Verdict::Bool(value)) => {
                            GateResponse::new(value == allow_when, message, code)
                        },
                        Err(e) => {
                            debug!(error = %e, "policy failed; denying");
                            GateResponse::deny_with(message, code)
                        },
                    }
                } else {
                    GateResponse::deny_with(message, code)
                }
            },
        };

        response.authorize()
    }

    /// Whether the ability a route maps to is allowed.
    ///
    /// A leading `api.` or `web.` is dropped first. A route without an
    /// ability, or a request without a principal, is denied.
    pub fn allows_route(&self, route: &RouteMetadata) -> bool {
        let ability = route.ability();
        if ability.is_empty() || self.principal().is_none() {
            return false;
        }

        let ability = ROUTE_PREFIXES
            .iter()
            .find_map(|prefix| ability.strip_prefix(prefix))
            .unwrap_or(&ability);

        self.allows(ability, &[])
    }

    /// Grouped abilities of the principal.
    pub fn abilities(&self) -> &IndexMap<String, IndexSet<String>> {
        self.repository().abilities()
    }

    /// Bare abilities of the principal.
    pub fn bare_abilities(&self) -> &IndexSet<String> {
        self.repository().bare_abilities()
    }

    /// Roles of the principal.
    pub fn roles(&self) -> &IndexSet<String> {
        self.repository().roles()
    }
}

impl<P> fmt::Debug for Gate<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("resolved", &self.principal.get().is_some())
            .field("compiled", &self.repository.get().is_some())
            .field("default_denial", &self.default_denial)
            .finish_non_exhaustive()
    }
}

//! Token-backed login state for one request.
//!
//! A [`StatelessSession`] never writes server-side session data. The current
//! principal is whatever a valid token on the request (or in the
//! [`SessionStore`]) says it is, and logging in means issuing a new token.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sigil_authz::{Gate, Principal};
use sigil_config::{Config, LifetimesSection};
use sigil_token::{CredentialSource, TokenCodec, TokenContext, TokenError, TokenLocator};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, trace};

use crate::error::{SessionError, SessionResult};
use crate::events::{AuthEvent, AuthListener};
use crate::provider::{Credentials, UserProvider};
use crate::store::SessionStore;

/// Extra check run against a validated principal by
/// [`StatelessSession::attempt_when`].
pub type LoginCheck<'a, P> = &'a dyn Fn(&P) -> bool;

/// A token handed out by a login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    /// The token string.
    pub access: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
    /// Lifetime in seconds.
    pub lifetime: u64,
}

/// Stateless authentication guard.
pub struct StatelessSession<P> {
    codec: Arc<TokenCodec>,
    locator: TokenLocator,
    context: TokenContext,
    credential: String,
    provider: Arc<dyn UserProvider<P>>,
    store: Arc<dyn SessionStore>,
    listeners: Vec<Arc<dyn AuthListener<P>>>,
    lifetimes: LifetimesSection,
    user: Option<Option<P>>,
    last_attempted: Option<P>,
}

impl<P: Principal + Clone + Send + Sync + 'static> StatelessSession<P> {
    /// Session for `request` with the default token channels and lifetimes.
    pub fn new<R: CredentialSource + ?Sized>(
        request: &R,
        codec: Arc<TokenCodec>,
        provider: Arc<dyn UserProvider<P>>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let locator = TokenLocator::default();
        Self {
            codec,
            credential: locator.locate(request),
            locator,
            context: TokenContext::new(request.host()),
            provider,
            store,
            listeners: Vec::new(),
            lifetimes: LifetimesSection::default(),
            user: None,
            last_attempted: None,
        }
    }

    /// Session for `request` using the token, lifetime and flow settings of
    /// `config`.
    pub fn from_config<R: CredentialSource + ?Sized>(
        config: &Config,
        request: &R,
        codec: Arc<TokenCodec>,
        provider: Arc<dyn UserProvider<P>>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let locator = TokenLocator::from_config(&config.token);
        Self {
            codec,
            credential: locator.locate(request),
            locator,
            context: TokenContext::from_request(request, config.flow.server.as_deref()),
            provider,
            store,
            listeners: Vec::new(),
            lifetimes: config.lifetimes,
            user: None,
            last_attempted: None,
        }
    }

    /// Register a listener. Listeners run in registration order.
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn AuthListener<P>>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Validation context derived from the request.
    #[must_use]
    pub fn context(&self) -> &TokenContext {
        &self.context
    }

    /// Token lifetimes in effect.
    #[must_use]
    pub fn lifetimes(&self) -> LifetimesSection {
        self.lifetimes
    }

    /// The current principal, resolved from the token at most once.
    ///
    /// A missing, invalid or expired token yields `None`.
    pub fn user(&mut self) -> Option<&P> {
        if self.user.is_none() {
            let resolved = self.resolve();
            self.user = Some(resolved);
        }
        self.user.as_ref().and_then(Option::as_ref)
    }

    /// The current principal, or [`SessionError::Unauthenticated`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Unauthenticated`] when no principal resolves.
    pub fn user_or_fail(&mut self) -> SessionResult<&P> {
        self.user().ok_or(SessionError::Unauthenticated)
    }

    /// Identifier of the current principal.
    pub fn id(&mut self) -> Option<String> {
        self.user().map(Principal::id)
    }

    /// Whether a principal is resolved.
    pub fn check(&mut self) -> bool {
        self.user().is_some()
    }

    /// Whether no principal is resolved.
    pub fn guest(&mut self) -> bool {
        !self.check()
    }

    /// Look up the principal for `credentials` and check them.
    ///
    /// The looked-up principal is kept as [`Self::last_attempted`] even when
    /// the check fails.
    pub fn validate(&mut self, credentials: &Credentials) -> bool {
        self.last_attempted = self.provider.retrieve_by_credentials(credentials);

        let valid = self
            .last_attempted
            .as_ref()
            .is_some_and(|user| self.provider.validate_credentials(user, credentials));

        if valid && let Some(user) = &self.last_attempted {
            self.fire(&AuthEvent::Validated { user });
        }
        valid
    }

    /// Validate `credentials` and log the principal in.
    ///
    /// Returns `Ok(None)` when the credentials do not authenticate anyone.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Token`] if the token cannot be issued.
    pub fn attempt(
        &mut self,
        credentials: &Credentials,
        remember: bool,
    ) -> SessionResult<Option<IssuedToken>> {
        self.attempt_when(credentials, &[], remember)
    }

    /// Like [`Self::attempt`], but every check in `checks` must also accept
    /// the validated principal.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Token`] if the token cannot be issued.
    pub fn attempt_when(
        &mut self,
        credentials: &Credentials,
        checks: &[LoginCheck<'_, P>],
        remember: bool,
    ) -> SessionResult<Option<IssuedToken>> {
        self.fire(&AuthEvent::Attempting {
            credentials,
            remember,
        });

        if self.validate(credentials)
            && let Some(user) = self.last_attempted.clone()
            && checks.iter().all(|check| check(&user))
        {
            return self.login(user, remember).map(Some);
        }

        self.fail(credentials);
        Ok(None)
    }

    /// Authenticate for this session only, without issuing a token.
    pub fn once(&mut self, credentials: &Credentials) -> bool {
        self.fire(&AuthEvent::Attempting {
            credentials,
            remember: false,
        });

        if self.validate(credentials)
            && let Some(user) = self.last_attempted.clone()
        {
            self.set_user(user);
            return true;
        }

        self.fail(credentials);
        false
    }

    /// Make the principal with `id` current for this session only.
    pub fn once_using_id(&mut self, id: &str) -> Option<&P> {
        let user = self.provider.retrieve_by_id(id)?;
        self.set_user(user);
        self.user.as_ref().and_then(Option::as_ref)
    }

    /// Log in the principal with `id`.
    ///
    /// Returns `Ok(None)` when no such principal exists.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Token`] if the token cannot be issued.
    pub fn login_using_id(
        &mut self,
        id: &str,
        remember: bool,
    ) -> SessionResult<Option<IssuedToken>> {
        match self.provider.retrieve_by_id(id) {
            Some(user) => self.login(user, remember).map(Some),
            None => Ok(None),
        }
    }

    /// Issue a token for `user`, store it and make `user` current.
    ///
    /// The token lives for the remember lifetime when `remember` is set and
    /// for the session lifetime otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Token`] if the token cannot be issued.
    pub fn login(&mut self, user: P, remember: bool) -> SessionResult<IssuedToken> {
        self.login_at(user, remember, Utc::now().timestamp())
    }

    /// [`Self::login`] as if the current time were `now` (unix seconds).
    ///
    /// # Errors
    ///
    /// See [`Self::login`].
    pub fn login_at(&mut self, user: P, remember: bool, now: i64) -> SessionResult<IssuedToken> {
        let lifetime = if remember {
            self.lifetimes.remember_secs
        } else {
            self.lifetimes.session_secs
        };

        let (access, claims) = self
            .codec
            .issue_at(&user.attributes(), lifetime, &self.context, now)?;
        let expires_at = claims.expires_at().ok_or(TokenError::InvalidLifetime)?;

        self.store.set(self.locator.cookie_name(), &access, lifetime);
        self.fire(&AuthEvent::Login {
            user: &user,
            remember,
        });
        info!(user_id = %user.id(), remember, expires_at = %expires_at, "Logged in");
        self.set_user(user);

        Ok(IssuedToken {
            access,
            expires_at,
            lifetime,
        })
    }

    /// Forget the stored token and clear the current principal.
    pub fn logout(&mut self) {
        self.store.forget(self.locator.cookie_name());

        if let Some(user) = self.user().cloned() {
            self.fire(&AuthEvent::Logout { user: &user });
            info!(user_id = %user.id(), "Logged out");
        }
        self.user = Some(None);
    }

    /// Make `user` the current principal.
    pub fn set_user(&mut self, user: P) -> &mut Self {
        self.fire(&AuthEvent::Authenticated { user: &user });
        self.user = Some(Some(user));
        self
    }

    /// The principal looked up by the last credential check.
    #[must_use]
    pub fn last_attempted(&self) -> Option<&P> {
        self.last_attempted.as_ref()
    }

    /// Change the remember lifetime. Zero is ignored.
    pub fn set_remember_duration(&mut self, secs: u64) -> &mut Self {
        if secs > 0 {
            self.lifetimes.remember_secs = secs;
        }
        self
    }

    /// An authorization gate bound to the current principal.
    pub fn gate(&mut self) -> Gate<P> {
        Gate::with_principal(self.user().cloned())
    }

    fn resolve(&self) -> Option<P> {
        let raw = if self.credential.is_empty() {
            self.store.get(self.locator.cookie_name()).unwrap_or_default()
        } else {
            self.credential.clone()
        };

        if raw.is_empty() {
            trace!("no credential on request");
            return None;
        }

        match self.codec.parse(&raw, &self.context) {
            Ok(subject) => self.provider.from_subject(&subject),
            Err(e) => {
                debug!(error = %e, "treating request as guest");
                None
            },
        }
    }

    fn fail(&self, credentials: &Credentials) {
        self.fire(&AuthEvent::Failed {
            user: self.last_attempted.as_ref(),
            credentials,
        });
    }

    fn fire(&self, event: &AuthEvent<'_, P>) {
        trace!(
            event = event.name(),
            listeners = self.listeners.len(),
            "Dispatching auth event"
        );
        for listener in &self.listeners {
            listener.on_event(event);
        }
    }
}

impl<P> fmt::Debug for StatelessSession<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatelessSession")
            .field("context", &self.context)
            .field("lifetimes", &self.lifetimes)
            .field("listeners", &self.listeners.len())
            .field("resolved", &self.user.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySessionStore;
    use serde_json::{Map, Value, json};
    use sigil_authz::Nested;
    use sigil_token::{RequestParts, Subject};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const HOST: &str = "app.test";

    #[derive(Debug, Clone, PartialEq)]
    struct User {
        id: u64,
        email: String,
        password: String,
        abilities: Vec<String>,
    }

    impl Principal for User {
        fn id(&self) -> String {
            self.id.to_string()
        }

        fn password_hash(&self) -> Option<&str> {
            Some(&self.password)
        }

        fn roles(&self) -> Nested<String> {
            Nested::empty()
        }

        fn permissions(&self) -> Nested<String> {
            self.abilities.clone().into()
        }

        fn attributes(&self) -> Map<String, Value> {
            json!({"id": self.id}).as_object().cloned().unwrap_or_default()
        }
    }

    struct Users(Vec<User>);

    impl UserProvider<User> for Users {
        fn retrieve_by_id(&self, id: &str) -> Option<User> {
            self.0.iter().find(|u| u.id.to_string() == id).cloned()
        }

        fn retrieve_by_credentials(&self, credentials: &Credentials) -> Option<User> {
            let email = credentials.get("email")?.as_str()?;
            self.0.iter().find(|u| u.email == email).cloned()
        }

        fn validate_credentials(&self, user: &User, credentials: &Credentials) -> bool {
            credentials.get("password").and_then(Value::as_str) == Some(user.password.as_str())
        }

        fn from_subject(&self, subject: &Subject) -> Option<User> {
            let id = subject.get("id")?.as_u64()?;
            self.retrieve_by_id(&id.to_string())
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<&'static str>>);

    impl AuthListener<User> for Recorder {
        fn on_event(&self, event: &AuthEvent<'_, User>) {
            self.0.lock().unwrap().push(event.name());
        }
    }

    impl Recorder {
        fn events(&self) -> Vec<&'static str> {
            self.0.lock().unwrap().clone()
        }
    }

    struct Fixture {
        codec: Arc<TokenCodec>,
        provider: Arc<Users>,
        store: Arc<MemorySessionStore>,
        recorder: Arc<Recorder>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                codec: Arc::new(TokenCodec::from_secret(b"session-secret", None).unwrap()),
                provider: Arc::new(Users(vec![User {
                    id: 1,
                    email: "ada@example.com".into(),
                    password: "pw".into(),
                    abilities: vec!["posts.read".into()],
                }])),
                store: Arc::new(MemorySessionStore::new()),
                recorder: Arc::new(Recorder::default()),
            }
        }

        fn session(&self, request: &RequestParts) -> StatelessSession<User> {
            StatelessSession::<User>::new(
                request,
                Arc::clone(&self.codec),
                self.provider.clone(),
                self.store.clone(),
            )
            .with_listener(self.recorder.clone())
        }

        fn bare(&self) -> StatelessSession<User> {
            self.session(&RequestParts::new(HOST))
        }
    }

    fn creds(email: &str, password: &str) -> Credentials {
        json!({"email": email, "password": password})
            .as_object()
            .unwrap()
            .clone()
    }

    #[test]
    fn test_guest_without_token() {
        let fx = Fixture::new();
        let mut session = fx.bare();

        assert!(session.guest());
        assert_eq!(session.id(), None);
        assert!(matches!(
            session.user_or_fail(),
            Err(SessionError::Unauthenticated)
        ));
    }

    #[test]
    fn test_attempt_issues_token() {
        let fx = Fixture::new();
        let mut session = fx.bare();

        let token = session
            .attempt(&creds("ada@example.com", "pw"), false)
            .unwrap()
            .unwrap();

        assert_eq!(token.lifetime, 7200);
        assert_eq!(session.id().as_deref(), Some("1"));
        assert_eq!(fx.store.get("Authorization").as_deref(), Some(token.access.as_str()));
        assert_eq!(
            fx.recorder.events(),
            vec!["attempting", "validated", "login", "authenticated"]
        );
    }

    #[test]
    fn test_attempt_with_wrong_password() {
        let fx = Fixture::new();
        let mut session = fx.bare();

        let result = session.attempt(&creds("ada@example.com", "nope"), false).unwrap();

        assert!(result.is_none());
        assert!(session.guest());
        assert_eq!(session.last_attempted().map(|u| u.id), Some(1));
        assert_eq!(fx.recorder.events(), vec!["attempting", "failed"]);
        assert!(fx.store.is_empty());
    }

    #[test]
    fn test_attempt_unknown_user() {
        let fx = Fixture::new();
        let mut session = fx.bare();

        assert!(session.attempt(&creds("bob@example.com", "pw"), false).unwrap().is_none());
        assert!(session.last_attempted().is_none());
    }

    #[test]
    fn test_attempt_when_checks_must_pass() {
        let fx = Fixture::new();
        let mut session = fx.bare();
        let is_two: LoginCheck<'_, User> = &|u: &User| u.id == 2;
        let is_one: LoginCheck<'_, User> = &|u: &User| u.id == 1;

        let denied = session
            .attempt_when(&creds("ada@example.com", "pw"), &[is_one, is_two], false)
            .unwrap();
        assert!(denied.is_none());

        let granted = session
            .attempt_when(&creds("ada@example.com", "pw"), &[is_one], true)
            .unwrap()
            .unwrap();
        assert_eq!(granted.lifetime, 157_680_000);
    }

    #[test]
    fn test_token_round_trips_through_request() {
        let fx = Fixture::new();
        let token = fx
            .bare()
            .login(fx.provider.0[0].clone(), false)
            .unwrap();

        let request = RequestParts::new(HOST)
            .with_header("Authorization", format!("Bearer {}", token.access));
        let mut session = fx.session(&request);

        assert_eq!(session.user().map(|u| u.id), Some(1));
    }

    #[test]
    fn test_falls_back_to_store() {
        let fx = Fixture::new();
        fx.bare().login(fx.provider.0[0].clone(), false).unwrap();

        let mut session = fx.bare();
        assert!(session.check());
    }

    #[test]
    fn test_token_for_other_host_is_guest() {
        let fx = Fixture::new();
        let token = fx
            .bare()
            .login(fx.provider.0[0].clone(), false)
            .unwrap();

        let request = RequestParts::new("evil.test").with_query("Authorization", &token.access);
        let mut session = fx.session(&request);

        assert!(session.guest());
    }

    #[test]
    fn test_expired_token_is_guest() {
        let fx = Fixture::new();
        let token = fx
            .bare()
            .login_at(fx.provider.0[0].clone(), false, 1_000)
            .unwrap();

        let request = RequestParts::new(HOST).with_query("Authorization", &token.access);
        assert!(fx.session(&request).guest());
    }

    #[test]
    fn test_once_does_not_issue() {
        let fx = Fixture::new();
        let mut session = fx.bare();

        assert!(session.once(&creds("ada@example.com", "pw")));
        assert!(session.check());
        assert!(fx.store.is_empty());
        assert_eq!(
            fx.recorder.events(),
            vec!["attempting", "validated", "authenticated"]
        );

        assert!(!fx.bare().once(&creds("ada@example.com", "bad")));
    }

    #[test]
    fn test_using_id() {
        let fx = Fixture::new();
        let mut session = fx.bare();

        assert!(session.once_using_id("9").is_none());
        assert_eq!(session.once_using_id("1").map(|u| u.id), Some(1));

        let mut session = fx.bare();
        assert!(session.login_using_id("9", false).unwrap().is_none());
        assert!(session.login_using_id("1", false).unwrap().is_some());
    }

    #[test]
    fn test_logout() {
        let fx = Fixture::new();
        let mut session = fx.bare();
        session.login(fx.provider.0[0].clone(), false).unwrap();

        session.logout();

        assert!(session.guest());
        assert!(fx.store.is_empty());
        assert_eq!(fx.recorder.events().last(), Some(&"logout"));
    }

    #[test]
    fn test_logout_as_guest_fires_nothing() {
        let fx = Fixture::new();
        let mut session = fx.bare();

        session.logout();
        assert!(fx.recorder.events().is_empty());
    }

    #[test]
    fn test_remember_duration() {
        let fx = Fixture::new();
        let mut session = fx.bare();

        session.set_remember_duration(0);
        assert_eq!(session.lifetimes().remember_secs, 157_680_000);

        session.set_remember_duration(600);
        let token = session.login(fx.provider.0[0].clone(), true).unwrap();
        assert_eq!(token.lifetime, 600);
    }

    #[test]
    fn test_expiry_matches_lifetime() {
        let fx = Fixture::new();
        let token = fx
            .bare()
            .login_at(fx.provider.0[0].clone(), false, 1_000)
            .unwrap();

        assert_eq!(token.expires_at.timestamp(), 8_200);
    }

    #[test]
    fn test_gate_uses_current_principal() {
        let fx = Fixture::new();
        let mut session = fx.bare();

        assert!(!session.gate().allows("posts.read", &[]));

        session.once_using_id("1");
        let gate = session.gate();
        assert!(gate.allows("posts.read", &[]));
        assert!(gate.denies("posts.delete", &[]));
    }

    #[test]
    fn test_from_config_uses_flow_server() {
        let fx = Fixture::new();
        let token = fx.bare().login(fx.provider.0[0].clone(), false).unwrap();

        let mut config = Config::default();
        config.flow.server = Some("https://auth.test".into());
        config.lifetimes.session_secs = 60;

        let request = RequestParts::new(HOST).with_query("Authorization", &token.access);
        let mut session = StatelessSession::<User>::from_config(
            &config,
            &request,
            Arc::clone(&fx.codec),
            fx.provider.clone(),
            fx.store.clone(),
        );

        assert_eq!(session.lifetimes().session_secs, 60);
        assert_eq!(session.context().expected_issuer(), "auth.test");
        assert!(session.guest());
    }

    struct CountingUsers {
        inner: Users,
        lookups: AtomicUsize,
    }

    impl UserProvider<User> for CountingUsers {
        fn retrieve_by_id(&self, id: &str) -> Option<User> {
            self.inner.retrieve_by_id(id)
        }

        fn retrieve_by_credentials(&self, credentials: &Credentials) -> Option<User> {
            self.inner.retrieve_by_credentials(credentials)
        }

        fn validate_credentials(&self, user: &User, credentials: &Credentials) -> bool {
            self.inner.validate_credentials(user, credentials)
        }

        fn from_subject(&self, subject: &Subject) -> Option<User> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.from_subject(subject)
        }
    }

    fn counting_session(
        fx: &Fixture,
        request: &RequestParts,
    ) -> (StatelessSession<User>, Arc<CountingUsers>) {
        let provider = Arc::new(CountingUsers {
            inner: Users(fx.provider.0.clone()),
            lookups: AtomicUsize::new(0),
        });
        let session = StatelessSession::<User>::new(
            request,
            Arc::clone(&fx.codec),
            provider.clone(),
            Arc::new(MemorySessionStore::new()),
        );
        (session, provider)
    }

    #[test]
    fn test_principal_resolved_once() {
        let fx = Fixture::new();
        let token = fx.bare().login(fx.provider.0[0].clone(), false).unwrap();
        let request = RequestParts::new(HOST)
            .with_header("Authorization", format!("Bearer {}", token.access));
        let (mut session, provider) = counting_session(&fx, &request);

        assert!(session.check());
        assert_eq!(session.id().as_deref(), Some("1"));
        assert!(session.user_or_fail().is_ok());
        assert!(session.gate().allows("posts.read", &[]));
        assert!(!session.guest());

        assert_eq!(provider.lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_resolution_not_retried() {
        let fx = Fixture::new();
        let request = RequestParts::new(HOST).with_header("Authorization", "Bearer not.a-token");
        let (mut session, provider) = counting_session(&fx, &request);

        assert!(!session.check());
        assert_eq!(session.id(), None);
        assert!(session.user_or_fail().is_err());
        assert!(!session.gate().allows("posts.read", &[]));
        assert_eq!(provider.lookups.load(Ordering::SeqCst), 0);

        // A valid subject for an unknown user is also cached as guest.
        let mut attributes = Map::new();
        attributes.insert("id".into(), json!(42));
        let (stray, _) = fx
            .codec
            .issue_at(&attributes, 3600, &TokenContext::new(HOST), Utc::now().timestamp())
            .unwrap();
        let request = RequestParts::new(HOST).with_query("Authorization", &stray);
        let (mut session, provider) = counting_session(&fx, &request);

        assert!(session.guest());
        assert!(session.user().is_none());
        assert!(session.user_or_fail().is_err());
        assert_eq!(session.id(), None);
        assert_eq!(provider.lookups.load(Ordering::SeqCst), 1);
    }
}

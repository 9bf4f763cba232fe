//! Mock implementations for testing.

use std::sync::{Arc, Mutex, RwLock};

use serde_json::{Map, Value, json};
use sigil_authz::{Nested, Principal};
use sigil_crypto::ContentHash;
use sigil_session::{AuthEvent, AuthListener, Credentials, UserProvider};
use sigil_token::Subject;

const PASSWORD_DOMAIN: &str = "sigil-test 2024 password digest";

/// Digest `password` the way [`TestUser`] stores it.
#[must_use]
pub fn hash_password(password: &str) -> ContentHash {
    ContentHash::hash_with_domain(PASSWORD_DOMAIN, password.as_bytes())
}

/// A user record implementing [`Principal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestUser {
    /// Identifier.
    pub id: u64,
    /// Login name.
    pub email: String,
    /// Hex digest of the password.
    pub password_hash: String,
    /// Role claims.
    pub roles: Vec<String>,
    /// Ability claims.
    pub permissions: Vec<String>,
}

impl TestUser {
    /// Create a user with no roles or abilities.
    #[must_use]
    pub fn new(id: u64, email: impl Into<String>, password: &str) -> Self {
        Self {
            id,
            email: email.into(),
            password_hash: hash_password(password).to_hex(),
            roles: Vec::new(),
            permissions: Vec::new(),
        }
    }

    /// Grant roles.
    #[must_use]
    pub fn with_roles(mut self, roles: &[&str]) -> Self {
        self.roles.extend(roles.iter().map(ToString::to_string));
        self
    }

    /// Grant abilities.
    #[must_use]
    pub fn with_permissions(mut self, permissions: &[&str]) -> Self {
        self.permissions
            .extend(permissions.iter().map(ToString::to_string));
        self
    }
}

impl Principal for TestUser {
    fn id(&self) -> String {
        self.id.to_string()
    }

    fn password_hash(&self) -> Option<&str> {
        Some(&self.password_hash)
    }

    fn roles(&self) -> Nested<String> {
        self.roles.clone().into()
    }

    fn permissions(&self) -> Nested<String> {
        self.permissions.clone().into()
    }

    fn attributes(&self) -> Map<String, Value> {
        let mut attributes = Map::new();
        attributes.insert("id".into(), json!(self.id));
        attributes.insert("email".into(), json!(self.email));
        attributes
    }
}

/// [`UserProvider`] over a list of [`TestUser`]s.
///
/// Credentials are looked up by `email` and checked against the stored
/// password digest.
#[derive(Debug, Default)]
pub struct InMemoryUserProvider {
    users: RwLock<Vec<TestUser>>,
}

impl InMemoryUserProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user.
    #[must_use]
    pub fn with_user(self, user: TestUser) -> Self {
        self.insert(user);
        self
    }

    /// Add or replace a user.
    pub fn insert(&self, user: TestUser) {
        if let Ok(mut users) = self.users.write() {
            users.retain(|u| u.id != user.id);
            users.push(user);
        }
    }

    /// Remove the user with `id`.
    pub fn remove(&self, id: u64) {
        if let Ok(mut users) = self.users.write() {
            users.retain(|u| u.id != id);
        }
    }

    /// Wrap in an `Arc` for handing to a session.
    #[must_use]
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn find(&self, predicate: impl Fn(&TestUser) -> bool) -> Option<TestUser> {
        self.users
            .read()
            .ok()?
            .iter()
            .find(|u| predicate(u))
            .cloned()
    }
}

impl UserProvider<TestUser> for InMemoryUserProvider {
    fn retrieve_by_id(&self, id: &str) -> Option<TestUser> {
        let id: u64 = id.parse().ok()?;
        self.find(|u| u.id == id)
    }

    fn retrieve_by_credentials(&self, credentials: &Credentials) -> Option<TestUser> {
        let email = credentials.get("email")?.as_str()?;
        self.find(|u| u.email == email)
    }

    fn validate_credentials(&self, user: &TestUser, credentials: &Credentials) -> bool {
        let Some(password) = credentials.get("password").and_then(Value::as_str) else {
            return false;
        };
        ContentHash::from_hex(&user.password_hash)
            .is_ok_and(|stored| stored.matches(&hash_password(password)))
    }

    fn from_subject(&self, subject: &Subject) -> Option<TestUser> {
        match subject.get("id")? {
            Value::Number(n) => self.retrieve_by_id(&n.to_string()),
            Value::String(s) => self.retrieve_by_id(s),
            _ => None,
        }
    }
}

/// One event seen by a [`RecordingListener`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    /// Event name.
    pub name: &'static str,
    /// Identifier of the principal involved, if any.
    pub user_id: Option<String>,
}

/// Listener that records every event it receives.
#[derive(Debug, Default)]
pub struct RecordingListener {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingListener {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Names of the recorded events, oldest first.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.events().into_iter().map(|e| e.name).collect()
    }

    /// Drop everything recorded so far.
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl<P: Principal> AuthListener<P> for RecordingListener {
    fn on_event(&self, event: &AuthEvent<'_, P>) {
        if let Ok(mut events) = self.events.lock() {
            events.push(RecordedEvent {
                name: event.name(),
                user_id: event.user().map(Principal::id),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(email: &str, password: &str) -> Credentials {
        json!({"email": email, "password": password})
            .as_object()
            .cloned()
            .unwrap_or_default()
    }

    #[test]
    fn test_provider_validates_password() {
        let provider =
            InMemoryUserProvider::new().with_user(TestUser::new(1, "ada@example.com", "pw"));

        let user = provider
            .retrieve_by_credentials(&creds("ada@example.com", "pw"))
            .unwrap();
        assert!(provider.validate_credentials(&user, &creds("ada@example.com", "pw")));
        assert!(!provider.validate_credentials(&user, &creds("ada@example.com", "PW")));
        assert!(!provider.validate_credentials(&user, &Credentials::new()));
    }

    #[test]
    fn test_provider_from_subject() {
        let provider = InMemoryUserProvider::new().with_user(TestUser::new(7, "x@y.z", "pw"));
        let user = provider.retrieve_by_id("7").unwrap();

        assert_eq!(provider.from_subject(&user.attributes()), Some(user));
        assert_eq!(provider.from_subject(&Subject::new()), None);
    }

    #[test]
    fn test_insert_replaces() {
        let provider = InMemoryUserProvider::new().with_user(TestUser::new(1, "old@x.y", "pw"));
        provider.insert(TestUser::new(1, "new@x.y", "pw"));

        assert_eq!(provider.retrieve_by_id("1").unwrap().email, "new@x.y");

        provider.remove(1);
        assert!(provider.retrieve_by_id("1").is_none());
    }

    #[test]
    fn test_recording_listener() {
        let listener = RecordingListener::new();
        let user = TestUser::new(3, "a@b.c", "pw");

        AuthListener::<TestUser>::on_event(&listener, &AuthEvent::Authenticated { user: &user });

        assert_eq!(
            listener.events(),
            vec![RecordedEvent {
                name: "authenticated",
                user_id: Some("3".into()),
            }]
        );
        listener.clear();
        assert!(listener.names().is_empty());
    }
}

//! Shared harness for integration tests.

use std::sync::Arc;

use sigil_session::{MemorySessionStore, StatelessSession};
use sigil_test::{InMemoryUserProvider, RecordingListener, TestUser, test_codec};
use sigil_token::{RequestParts, TokenCodec};

/// One application seen from a single client: codec and users shared by
/// every request, plus that client's cookie jar and an event recorder.
#[allow(dead_code)]
pub struct App {
    /// Process-wide codec.
    pub codec: Arc<TokenCodec>,
    /// User storage.
    pub users: Arc<InMemoryUserProvider>,
    /// Cookie jar of the one client these tests play.
    pub store: Arc<MemorySessionStore>,
    /// Every auth event fired by any session.
    pub events: Arc<RecordingListener>,
}

#[allow(dead_code)]
impl App {
    /// App with an editor (`ada`) and an admin (`grace`).
    pub fn new() -> Self {
        let users = InMemoryUserProvider::new()
            .with_user(
                TestUser::new(1, "ada@example.com", "analytical")
                    .with_permissions(&["posts.read", "posts.write", "comments.*"]),
            )
            .with_user(
                TestUser::new(2, "grace@example.com", "compiler")
                    .with_roles(&["Admin"])
                    .with_permissions(&["users.*"]),
            );

        Self {
            codec: Arc::new(test_codec()),
            users: users.into_shared(),
            store: Arc::new(MemorySessionStore::new()),
            events: Arc::new(RecordingListener::new()),
        }
    }

    /// A session for `request`.
    pub fn session(&self, request: &RequestParts) -> StatelessSession<TestUser> {
        StatelessSession::<TestUser>::new(
            request,
            Arc::clone(&self.codec),
            self.users.clone(),
            self.store.clone(),
        )
        .with_listener(self.events.clone())
    }
}

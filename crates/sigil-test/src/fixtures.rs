//! Test fixtures for common types.

use std::sync::Arc;

use serde_json::json;
use sigil_config::Config;
use sigil_session::{Credentials, MemorySessionStore, StatelessSession, UserProvider};
use sigil_token::{RequestParts, TokenCodec, TokenContext};

use crate::mocks::TestUser;

/// Signing secret used by the fixtures.
pub const TEST_SECRET: &str = "sigil-test-secret";

/// Host the fixture requests are served from.
pub const TEST_HOST: &str = "app.test";

/// Initialize a `tracing` subscriber that writes through the test harness.
///
/// Filtered by `RUST_LOG`; safe to call from every test.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Codec keyed by [`TEST_SECRET`] with the standard alphabet.
///
/// # Panics
///
/// Never; the standard alphabet always builds.
#[must_use]
pub fn test_codec() -> TokenCodec {
    TokenCodec::from_secret(TEST_SECRET.as_bytes(), None)
        .unwrap_or_else(|e| panic!("test codec: {e}"))
}

/// Default configuration with [`TEST_SECRET`] filled in.
#[must_use]
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.signing.secret = TEST_SECRET.to_owned();
    config
}

/// Validation context for [`TEST_HOST`].
#[must_use]
pub fn test_context() -> TokenContext {
    TokenContext::new(TEST_HOST)
}

/// A request to [`TEST_HOST`] carrying no credential.
#[must_use]
pub fn test_request() -> RequestParts {
    RequestParts::new(TEST_HOST)
}

/// A request to [`TEST_HOST`] with `token` as a bearer credential.
#[must_use]
pub fn bearer_request(token: &str) -> RequestParts {
    test_request().with_header("Authorization", format!("Bearer {token}"))
}

/// Email/password login input.
#[must_use]
pub fn credentials(email: &str, password: &str) -> Credentials {
    let mut creds = Credentials::new();
    creds.insert("email".into(), json!(email));
    creds.insert("password".into(), json!(password));
    creds
}

/// Session for `request` with [`test_codec`] and a fresh in-memory store.
#[must_use]
pub fn test_session(
    request: &RequestParts,
    provider: Arc<dyn UserProvider<TestUser>>,
) -> StatelessSession<TestUser> {
    StatelessSession::<TestUser>::new(
        request,
        Arc::new(test_codec()),
        provider,
        Arc::new(MemorySessionStore::new()),
    )
}

//! Prelude module - commonly used test helpers.
//!
//! Use `use sigil_test::prelude::*;` to import all helpers.

// Mocks
pub use crate::{InMemoryUserProvider, RecordedEvent, RecordingListener, TestUser};

// Fixtures
pub use crate::{
    TEST_HOST, TEST_SECRET, bearer_request, credentials, init_test_logging, test_codec,
    test_config, test_context, test_request, test_session,
};

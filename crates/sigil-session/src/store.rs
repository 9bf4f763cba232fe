//! Storage for issued tokens.
//!
//! Tokens carry all session state, so a store only has to keep the raw
//! string around for clients that cannot send it back themselves (cookies).

use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::trace;

/// Persistence collaborator for issued tokens.
pub trait SessionStore: Send + Sync {
    /// Keep `token` under `name` for `ttl_secs` seconds.
    fn set(&self, name: &str, token: &str, ttl_secs: u64);

    /// The token stored under `name`, if still live.
    fn get(&self, name: &str) -> Option<String>;

    /// Drop the token stored under `name`.
    fn forget(&self, name: &str);
}

#[derive(Debug, Clone)]
struct Entry {
    token: String,
    expires_at: i64,
}

/// In-process [`SessionStore`].
///
/// One store stands in for a single client's cookie jar: entries are keyed
/// by cookie name only, so build one per client rather than sharing it
/// across requests from different clients. Expired entries are dropped on
/// lookup.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemorySessionStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, live or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or_default()
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_at(&self, name: &str, now: i64) -> Option<String> {
        {
            let entries = self.entries.read().ok()?;
            let entry = entries.get(name)?;
            if now <= entry.expires_at {
                return Some(entry.token.clone());
            }
        }

        if let Ok(mut entries) = self.entries.write()
            && entries.get(name).is_some_and(|entry| now > entry.expires_at)
        {
            entries.remove(name);
            trace!(name, "evicted expired token");
        }
        None
    }
}

impl SessionStore for MemorySessionStore {
    fn set(&self, name: &str, token: &str, ttl_secs: u64) {
        let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
        let expires_at = Utc::now().timestamp().saturating_add(ttl);
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                name.to_owned(),
                Entry {
                    token: token.to_owned(),
                    expires_at,
                },
            );
            trace!(name, ttl_secs, "stored token");
        }
    }

    fn get(&self, name: &str) -> Option<String> {
        self.get_at(name, Utc::now().timestamp())
    }

    fn forget(&self, name: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(name);
        }
    }
}

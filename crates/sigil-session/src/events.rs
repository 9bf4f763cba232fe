//! Authentication lifecycle events.

use std::fmt;

use crate::provider::Credentials;

/// A lifecycle point reached by a session.
pub enum AuthEvent<'a, P> {
    /// Credentials are about to be checked.
    Attempting {
        /// Submitted credentials.
        credentials: &'a Credentials,
        /// Whether a long-lived token was requested.
        remember: bool,
    },
    /// Credentials matched a principal.
    Validated {
        /// The matched principal.
        user: &'a P,
    },
    /// A token is being issued.
    Login {
        /// The principal logging in.
        user: &'a P,
        /// Whether the long lifetime applies.
        remember: bool,
    },
    /// A principal became the session's current principal.
    Authenticated {
        /// The current principal.
        user: &'a P,
    },
    /// The current principal logged out.
    Logout {
        /// The principal that left.
        user: &'a P,
    },
    /// Credentials did not authenticate anyone.
    Failed {
        /// The principal the credentials pointed at, if any.
        user: Option<&'a P>,
        /// Submitted credentials.
        credentials: &'a Credentials,
    },
}

impl<P> AuthEvent<'_, P> {
    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Attempting { .. } => "attempting",
            Self::Validated { .. } => "validated",
            Self::Login { .. } => "login",
            Self::Authenticated { .. } => "authenticated",
            Self::Logout { .. } => "logout",
            Self::Failed { .. } => "failed",
        }
    }

    /// The principal the event concerns.
    #[must_use]
    pub fn user(&self) -> Option<&P> {
        match self {
            Self::Attempting { .. } => None,
            Self::Validated { user }
            | Self::Login { user, .. }
            | Self::Authenticated { user }
            | Self::Logout { user } => Some(user),
            Self::Failed { user, .. } => *user,
        }
    }
}

// Credentials may hold a password; only the event name is shown.
impl<P> fmt::Debug for AuthEvent<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AuthEvent").field(&self.name()).finish()
    }
}

/// Observer of session lifecycle events.
///
/// Listeners run synchronously, in registration order, on the thread that
/// drives the session.
pub trait AuthListener<P>: Send + Sync {
    /// Called once per event.
    fn on_event(&self, event: &AuthEvent<'_, P>);
}

impl<P, F> AuthListener<P> for F
where
    F: Fn(&AuthEvent<'_, P>) + Send + Sync,
{
    fn on_event(&self, event: &AuthEvent<'_, P>) {
        self(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_names_and_users() {
        let creds = json!({"email": "a@b.c", "password": "secret"})
            .as_object()
            .unwrap()
            .clone();
        let user = 7_u32;

        let attempting: AuthEvent<'_, u32> = AuthEvent::Attempting {
            credentials: &creds,
            remember: false,
        };
        assert_eq!(attempting.name(), "attempting");
        assert_eq!(attempting.user(), None);

        let login = AuthEvent::Login {
            user: &user,
            remember: true,
        };
        assert_eq!(login.name(), "login");
        assert_eq!(login.user(), Some(&7));

        let failed = AuthEvent::Failed {
            user: Some(&user),
            credentials: &creds,
        };
        assert_eq!(failed.user(), Some(&7));
    }

    #[test]
    fn test_debug_hides_credentials() {
        let creds = json!({"password": "hunter2"}).as_object().unwrap().clone();
        let event: AuthEvent<'_, ()> = AuthEvent::Failed {
            user: None,
            credentials: &creds,
        };

        assert!(!format!("{event:?}").contains("hunter2"));
    }

    #[test]
    fn test_fn_listener() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        static CALLS: AtomicUsize = AtomicUsize::new(0);
        fn count(_: &AuthEvent<'_, u32>) {
            CALLS.fetch_add(1, Ordering::SeqCst);
        }

        let listener: &dyn AuthListener<u32> = &count;
        listener.on_event(&AuthEvent::Logout { user: &1 });
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }
}

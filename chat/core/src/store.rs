//! Session Store
//!
//! Holds the signed-in user for a surface. The auth service writes it on
//! sign-in and clears it on sign-out; surfaces only read it.

use parking_lot::RwLock;

use crate::auth::{AuthSession, User};

/// Storage for the current sign-in
pub trait SessionStore: Send + Sync {
    /// Replace the current sign-in
    fn init(&self, session: AuthSession);

    /// The current sign-in, if any
    fn current(&self) -> Option<AuthSession>;

    /// Forget the current sign-in
    fn clear(&self);

    /// The signed-in user, if any
    fn current_user(&self) -> Option<User> {
        self.current().map(|s| s.user)
    }

    /// Check if someone is signed in
    fn is_signed_in(&self) -> bool {
        self.current().is_some()
    }
}

/// Process-local session store
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    session: RwLock<Option<AuthSession>>,
}

impl InMemorySessionStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn init(&self, session: AuthSession) {
        tracing::debug!(user = %session.user.email, demo = session.user.is_demo, "session stored");
        *self.session.write() = Some(session);
    }

    fn current(&self) -> Option<AuthSession> {
        self.session.read().clone()
    }

    fn clear(&self) {
        if self.session.write().take().is_some() {
            tracing::debug!("session cleared");
        }
    }
}

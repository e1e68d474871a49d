//! Mock Identity
//!
//! In-memory user directory and the sign-in / sign-up / demo flows that go
//! with it. Passwords are compared in plain text and tokens are fabricated;
//! none of this is meant to protect anything.
//!
//! # Design Philosophy
//!
//! No global state. The directory and the session store are injected into
//! [`AuthService`], so every surface (and every test) gets its own.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::messages::now_ms;
use crate::store::SessionStore;

/// Id of the demo user
pub const DEMO_USER_ID: &str = "demo";

/// Token handed out for demo sessions
pub const DEMO_TOKEN: &str = "demo-token";

/// Password shared by the seeded accounts
pub const SEED_PASSWORD: &str = "password123";

/// Auth failures, with the messages shown to the user
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Sign-in without email or password
    #[error("Email and password are required")]
    MissingCredentials,

    /// No account for the email
    #[error("User not found")]
    UserNotFound,

    /// Password does not match
    #[error("Invalid password")]
    InvalidPassword,

    /// Sign-up without name, email or password
    #[error("All fields are required")]
    MissingFields,

    /// Sign-up for an email that already has an account
    #[error("User already exists")]
    UserExists,
}

impl AuthError {
    /// HTTP status an endpoint would answer with
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UserNotFound | Self::InvalidPassword => 401,
            Self::MissingCredentials | Self::MissingFields | Self::UserExists => 400,
        }
    }
}

/// A user as seen by surfaces (no password)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User id
    pub id: String,
    /// Display name
    pub name: String,
    /// Email, unique per directory
    pub email: String,
    /// Whether this is the demo account
    #[serde(default)]
    pub is_demo: bool,
}

impl User {
    /// The built-in demo user
    #[must_use]
    pub fn demo() -> Self {
        Self {
            id: DEMO_USER_ID.to_string(),
            name: "Demo User".to_string(),
            email: "demo@alphaai.com".to_string(),
            is_demo: true,
        }
    }
}

/// A signed-in user and their token
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Opaque session token
    pub token: String,
    /// The signed-in user
    pub user: User,
}

#[derive(Clone, Debug)]
struct Account {
    user: User,
    password: String,
}

/// Accounts keyed by email
#[derive(Debug, Default)]
pub struct UserDirectory {
    accounts: DashMap<String, Account>,
}

impl UserDirectory {
    /// Create an empty directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory with the two sample accounts
    #[must_use]
    pub fn with_seed_users() -> Self {
        let directory = Self::new();
        for (id, name, email) in [
            ("1", "John Doe", "john@example.com"),
            ("2", "Jane Smith", "jane@example.com"),
        ] {
            directory.accounts.insert(
                email.to_string(),
                Account {
                    user: User {
                        id: id.to_string(),
                        name: name.to_string(),
                        email: email.to_string(),
                        is_demo: false,
                    },
                    password: SEED_PASSWORD.to_string(),
                },
            );
        }
        directory
    }

    /// Number of accounts
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Check if there are no accounts
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Look up a user by email
    #[must_use]
    pub fn find(&self, email: &str) -> Option<User> {
        self.accounts.get(email).map(|a| a.user.clone())
    }

    fn check_password(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let account = self.accounts.get(email).ok_or(AuthError::UserNotFound)?;
        if account.password == password {
            Ok(account.user.clone())
        } else {
            Err(AuthError::InvalidPassword)
        }
    }

    fn insert_new(&self, user: User, password: &str) -> Result<(), AuthError> {
        use dashmap::mapref::entry::Entry;

        match self.accounts.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(AuthError::UserExists),
            Entry::Vacant(slot) => {
                slot.insert(Account {
                    user,
                    password: password.to_string(),
                });
                Ok(())
            }
        }
    }
}

/// Sign-in, sign-up and demo flows
pub struct AuthService {
    directory: Arc<UserDirectory>,
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("accounts", &self.directory.len())
            .field("signed_in", &self.store.is_signed_in())
            .finish()
    }
}

impl AuthService {
    /// Create a service over a directory and a store
    pub fn new(directory: Arc<UserDirectory>, store: Arc<dyn SessionStore>) -> Self {
        Self { directory, store }
    }

    /// The session store
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Sign in with email and password
    ///
    /// # Errors
    ///
    /// [`AuthError::MissingCredentials`], [`AuthError::UserNotFound`] or
    /// [`AuthError::InvalidPassword`].
    pub fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        tracing::info!(%email, "login attempt");

        let user = self
            .directory
            .check_password(email, password)
            .inspect_err(|e| tracing::info!(%email, error = %e, "login rejected"))?;

        let session = AuthSession {
            token: format!("token_{}_{}", user.id, now_ms()),
            user,
        };
        self.store.init(session.clone());
        tracing::info!(%email, "login successful");
        Ok(session)
    }

    /// Create an account
    ///
    /// Does not sign the new user in.
    ///
    /// # Errors
    ///
    /// [`AuthError::MissingFields`] or [`AuthError::UserExists`].
    pub fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let user = User {
            id: next_user_id(),
            name: name.to_string(),
            email: email.to_string(),
            is_demo: false,
        };
        self.directory.insert_new(user.clone(), password)?;
        tracing::info!(%email, id = %user.id, "user created");
        Ok(user)
    }

    /// Sign in as the demo user
    pub fn demo(&self) -> AuthSession {
        let session = AuthSession {
            token: DEMO_TOKEN.to_string(),
            user: User::demo(),
        };
        self.store.init(session.clone());
        tracing::info!("demo session started");
        session
    }

    /// Forget the current sign-in
    pub fn sign_out(&self) {
        self.store.clear();
    }
}

/// Millisecond timestamp, bumped when two sign-ups land in the same millisecond
fn next_user_id() -> String {
    static LAST: AtomicU64 = AtomicU64::new(0);
    let now = now_ms();
    let mut prev = LAST.load(Ordering::SeqCst);
    loop {
        let next = now.max(prev + 1);
        match LAST.compare_exchange(prev, next, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return next.to_string(),
            Err(actual) => prev = actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemorySessionStore;
    use pretty_assertions::assert_eq;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(UserDirectory::with_seed_users()),
            Arc::new(InMemorySessionStore::new()),
        )
    }

    #[test]
    fn test_sign_in_success() {
        let auth = service();
        let session = auth.sign_in("john@example.com", "password123").unwrap();

        assert_eq!(session.user.name, "John Doe");
        assert!(session.token.starts_with("token_1_"));
        assert_eq!(auth.store().current(), Some(session));
    }

    #[test]
    fn test_sign_in_errors() {
        let auth = service();
        assert_eq!(
            auth.sign_in("", "password123"),
            Err(AuthError::MissingCredentials)
        );
        assert_eq!(
            auth.sign_in("john@example.com", ""),
            Err(AuthError::MissingCredentials)
        );
        assert_eq!(
            auth.sign_in("nobody@example.com", "password123"),
            Err(AuthError::UserNotFound)
        );
        assert_eq!(
            auth.sign_in("jane@example.com", "wrong"),
            Err(AuthError::InvalidPassword)
        );
        assert!(!auth.store().is_signed_in());
    }

    #[test]
    fn test_error_messages_and_status() {
        assert_eq!(
            AuthError::MissingCredentials.to_string(),
            "Email and password are required"
        );
        assert_eq!(AuthError::UserNotFound.status_code(), 401);
        assert_eq!(AuthError::InvalidPassword.status_code(), 401);
        assert_eq!(AuthError::UserExists.status_code(), 400);
        assert_eq!(AuthError::MissingFields.to_string(), "All fields are required");
    }

    #[test]
    fn test_sign_up_then_sign_in() {
        let auth = service();
        let user = auth.sign_up("Ada", "ada@example.com", "secret").unwrap();
        assert!(!user.is_demo);
        assert!(user.id.parse::<u64>().is_ok());
        // Sign-up does not sign in
        assert!(!auth.store().is_signed_in());

        let session = auth.sign_in("ada@example.com", "secret").unwrap();
        assert_eq!(session.user, user);
    }

    #[test]
    fn test_sign_up_errors() {
        let auth = service();
        assert_eq!(
            auth.sign_up("", "x@example.com", "pw"),
            Err(AuthError::MissingFields)
        );
        assert_eq!(
            auth.sign_up("John", "john@example.com", "pw"),
            Err(AuthError::UserExists)
        );
    }

    #[test]
    fn test_user_ids_are_unique() {
        let auth = AuthService::new(
            Arc::new(UserDirectory::new()),
            Arc::new(InMemorySessionStore::new()),
        );
        let a = auth.sign_up("A", "a@example.com", "pw").unwrap();
        let b = auth.sign_up("B", "b@example.com", "pw").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_demo_and_sign_out() {
        let auth = service();
        let session = auth.demo();

        assert_eq!(session.token, "demo-token");
        assert_eq!(session.user.email, "demo@alphaai.com");
        assert!(session.user.is_demo);
        assert!(auth.store().is_signed_in());

        auth.sign_out();
        assert!(!auth.store().is_signed_in());
    }

    #[test]
    fn test_user_json_uses_camel_case() {
        let json = serde_json::to_value(User::demo()).unwrap();
        assert_eq!(json["isDemo"], serde_json::json!(true));
    }
}

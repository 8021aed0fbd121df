//! Accounts and sessions
//!
//! - `credentials`: register / authenticate against the users table
//! - `password`: argon2 hash and verify
//! - `session`: per-visitor session state keyed by a signed cookie token

pub mod credentials;
pub mod password;
pub mod session;

pub use credentials::{authenticate, register, CredentialFailure};
pub use session::{AuthRequired, Session, SessionStore, FLASH_COOKIE, SESSION_COOKIE};

use crate::db::DbError;

/// Errors from the credential store
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("email '{email}' is already registered")]
    DuplicateEmail { email: String },

    #[error("invalid credentials: {0}")]
    InvalidCredentials(CredentialFailure),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Database(#[from] DbError),
}

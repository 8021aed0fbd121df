//! Credential store: account registration and password checks

use std::fmt;

use sqlx::SqlitePool;

use crate::db::{DbError, User, UserRepo};
use crate::models::EmailAddress;

use super::password::{hash_password, verify_password};
use super::AuthError;

/// Why an authentication attempt failed.
///
/// Both are the same error kind; only the message shown to the visitor differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFailure {
    EmailNotFound,
    IncorrectPassword,
}

impl CredentialFailure {
    /// Inline message for the login page.
    pub fn message(&self) -> &'static str {
        match self {
            Self::EmailNotFound => "This email does not exist. Please try again.",
            Self::IncorrectPassword => "Incorrect password. Please try again.",
        }
    }
}

impl fmt::Display for CredentialFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmailNotFound => f.write_str("email not found"),
            Self::IncorrectPassword => f.write_str("incorrect password"),
        }
    }
}

/// Create an account with a salted password hash.
///
/// Fails with `DuplicateEmail` when the email is taken, whatever the password.
pub async fn register(
    pool: &SqlitePool,
    email: &EmailAddress,
    raw_password: &str,
    name: &str,
) -> Result<User, AuthError> {
    let password_hash = hash_password(raw_password)?;

    let user = UserRepo::new(pool)
        .insert(email.as_str(), &password_hash, name)
        .await
        .map_err(|e| match e {
            DbError::Conflict { value, .. } => AuthError::DuplicateEmail { email: value },
            other => AuthError::Database(other),
        })?;

    tracing::info!(user_id = user.id, "registered user");
    Ok(user)
}

/// Look up a user by email and check the password.
pub async fn authenticate(
    pool: &SqlitePool,
    email: &str,
    raw_password: &str,
) -> Result<User, AuthError> {
    let Some(user) = UserRepo::new(pool).find_by_email(email.trim()).await? else {
        return Err(AuthError::InvalidCredentials(CredentialFailure::EmailNotFound));
    };

    if !verify_password(raw_password, &user.password_hash) {
        tracing::debug!(user_id = user.id, "password mismatch");
        return Err(AuthError::InvalidCredentials(
            CredentialFailure::IncorrectPassword,
        ));
    }

    Ok(user)
}

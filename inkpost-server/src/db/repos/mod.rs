//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Borrowed pool, constructed per call site
//! - Uniqueness enforced by the schema and surfaced as `DbError::Conflict`
//! - Ordering by primary key, which is insertion order

pub mod comments;
pub mod posts;
pub mod users;

pub use comments::{Comment, CommentRepo};
pub use posts::{Post, PostRepo};
pub use users::{User, UserRepo};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {resource} with {field} '{value}' already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
        value: String,
    },
}

impl DbError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Sqlx`.
    pub(crate) fn from_insert(
        err: sqlx::Error,
        resource: &'static str,
        field: &'static str,
        value: &str,
    ) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict {
                resource,
                field,
                value: value.to_owned(),
            },
            _ => Self::Sqlx(err),
        }
    }
}

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    let pool = crate::db::create_memory_pool()
        .await
        .expect("pool creation failed");
    crate::db::migrations::run(&pool)
        .await
        .expect("migrations failed");
    pool
}

//! Startup and configuration errors for inkpost-server
//!
//! Request-time failures are `http::ApiError`.

use thiserror::Error;

use crate::db::DbError;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("database error: {0}")]
    Database(#[from] DbError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for ServerError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(DbError::Sqlx(e))
    }
}

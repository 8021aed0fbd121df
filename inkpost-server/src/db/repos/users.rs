//! User repository

use sqlx::{FromRow, SqlitePool};

use super::DbError;

/// User record from database
#[derive(Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    /// argon2 PHC string
    #[sqlx(rename = "password")]
    pub password_hash: String,
    pub name: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a user. A taken email surfaces as `DbError::Conflict`.
    pub async fn insert(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<User, DbError> {
        sqlx::query_as(
            r#"
            INSERT INTO users (email, password, name)
            VALUES (?, ?, ?)
            RETURNING id, email, password, name
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::from_insert(e, "user", "email", email))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as("SELECT id, email, password, name FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    pub async fn get(&self, id: i64) -> Result<User, DbError> {
        sqlx::query_as("SELECT id, email, password, name FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound {
                resource: "user",
                id: id.to_string(),
            })
    }

    pub async fn count(&self) -> Result<i64, DbError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}

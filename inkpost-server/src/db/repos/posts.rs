//! Blog post repository
//!
//! Posts are always read joined with their author's display name.

use sqlx::{FromRow, SqlitePool};

use crate::models::PostFields;

use super::DbError;

const SELECT_POST: &str = r#"
    SELECT p.id, p.author_id, u.name AS author_name, p.title, p.subtitle,
           p.body, p.img_url, p.date
    FROM blog_posts p
    JOIN users u ON u.id = p.author_id
"#;

/// Post record with author name
#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub img_url: String,
    /// Display date, e.g. `October 19, 2026`
    pub date: String,
}

/// Post repository
pub struct PostRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PostRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All posts in insertion order.
    pub async fn list(&self) -> Result<Vec<Post>, DbError> {
        let posts = sqlx::query_as(&format!("{SELECT_POST} ORDER BY p.id ASC"))
            .fetch_all(self.pool)
            .await?;

        Ok(posts)
    }

    /// Posts written by one user, in insertion order.
    pub async fn by_author(&self, author_id: i64) -> Result<Vec<Post>, DbError> {
        let posts = sqlx::query_as(&format!(
            "{SELECT_POST} WHERE p.author_id = ? ORDER BY p.id ASC"
        ))
        .bind(author_id)
        .fetch_all(self.pool)
        .await?;

        Ok(posts)
    }

    pub async fn get(&self, id: i64) -> Result<Post, DbError> {
        sqlx::query_as(&format!("{SELECT_POST} WHERE p.id = ?"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound {
                resource: "post",
                id: id.to_string(),
            })
    }

    /// Insert a post. A taken title surfaces as `DbError::Conflict`.
    pub async fn create(
        &self,
        fields: &PostFields,
        author_id: i64,
        date: &str,
    ) -> Result<Post, DbError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO blog_posts (author_id, title, subtitle, body, img_url, date)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(author_id)
        .bind(&fields.title)
        .bind(&fields.subtitle)
        .bind(&fields.body)
        .bind(&fields.img_url)
        .bind(date)
        .fetch_one(self.pool)
        .await
        .map_err(|e| DbError::from_insert(e, "post", "title", &fields.title))?;

        self.get(id).await
    }

    /// Replace the editable fields in place. Author and date are untouched.
    pub async fn update(&self, id: i64, fields: &PostFields) -> Result<Post, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE blog_posts
            SET title = ?, subtitle = ?, body = ?, img_url = ?
            WHERE id = ?
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.subtitle)
        .bind(&fields.body)
        .bind(&fields.img_url)
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| DbError::from_insert(e, "post", "title", &fields.title))?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "post",
                id: id.to_string(),
            });
        }

        self.get(id).await
    }

    /// Delete a post and, by cascade, its comments.
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound {
                resource: "post",
                id: id.to_string(),
            });
        }

        Ok(())
    }
}

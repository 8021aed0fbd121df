//! Comment repository

use sqlx::{FromRow, SqlitePool};

use super::DbError;

/// Comment record with its author's name and email
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub author_email: String,
    pub text: String,
    /// Display date, e.g. `19th/October/2026`
    pub date: String,
}

/// Comment repository
pub struct CommentRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CommentRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a comment to a post.
    pub async fn add(
        &self,
        post_id: i64,
        author_id: i64,
        text: &str,
        date: &str,
    ) -> Result<Comment, DbError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO comments (author_id, blog_id, comment_text, date)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(author_id)
        .bind(post_id)
        .bind(text)
        .bind(date)
        .fetch_one(self.pool)
        .await?;

        sqlx::query_as(
            r#"
            SELECT c.id, c.blog_id AS post_id, c.author_id, u.name AS author_name,
                   u.email AS author_email, c.comment_text AS text, c.date
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.id = ?
            "#,
        )
        .bind(id)
        .fetch_one(self.pool)
        .await
        .map_err(DbError::from)
    }

    /// Comments on a post in the order they were written.
    pub async fn for_post(&self, post_id: i64) -> Result<Vec<Comment>, DbError> {
        let comments = sqlx::query_as(
            r#"
            SELECT c.id, c.blog_id AS post_id, c.author_id, u.name AS author_name,
                   u.email AS author_email, c.comment_text AS text, c.date
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.blog_id = ?
            ORDER BY c.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(self.pool)
        .await?;

        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::{test_pool, PostRepo, UserRepo};
    use crate::models::PostFields;

    #[tokio::test]
    async fn comments_append_in_order() {
        let pool = test_pool().await;
        let users = UserRepo::new(&pool);
        let ada = users.insert("a@x.io", "h", "Ada").await.unwrap();
        let bob = users.insert("b@x.io", "h", "Bob").await.unwrap();
        let fields = PostFields::new("T", "S", "https://x.io/i.png", "B").unwrap();
        let post = PostRepo::new(&pool).create(&fields, ada.id, "d").await.unwrap();
        let repo = CommentRepo::new(&pool);

        repo.add(post.id, ada.id, "first", "1st/May/2026").await.unwrap();
        let second = repo.add(post.id, bob.id, "second", "2nd/May/2026").await.unwrap();

        assert_eq!(second.author_name, "Bob");
        assert_eq!(second.author_email, "b@x.io");

        let texts: Vec<_> = repo
            .for_post(post.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| (c.author_name, c.text))
            .collect();
        assert_eq!(
            texts,
            [("Ada".to_string(), "first".to_string()), ("Bob".to_string(), "second".to_string())]
        );
    }

    #[tokio::test]
    async fn deleting_post_removes_comments() {
        let pool = test_pool().await;
        let ada = UserRepo::new(&pool).insert("a@x.io", "h", "Ada").await.unwrap();
        let fields = PostFields::new("T", "S", "https://x.io/i.png", "B").unwrap();
        let posts = PostRepo::new(&pool);
        let post = posts.create(&fields, ada.id, "d").await.unwrap();
        let repo = CommentRepo::new(&pool);
        repo.add(post.id, ada.id, "hi", "d").await.unwrap();

        posts.delete(post.id).await.unwrap();

        let (left,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(left, 0);
    }

    #[tokio::test]
    async fn comment_on_missing_post_fails() {
        let pool = test_pool().await;
        let ada = UserRepo::new(&pool).insert("a@x.io", "h", "Ada").await.unwrap();

        let err = CommentRepo::new(&pool).add(99, ada.id, "hi", "d").await;
        assert!(matches!(err, Err(DbError::Sqlx(_))));
    }
}

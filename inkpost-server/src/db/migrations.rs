//! Schema for users, posts and comments

use sqlx::SqlitePool;

use super::repos::DbError;

/// Create all tables and indexes (idempotent).
pub async fn run(pool: &SqlitePool) -> Result<(), DbError> {
    tracing::info!("Running migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blog_posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            author_id INTEGER NOT NULL REFERENCES users(id),
            title TEXT NOT NULL UNIQUE,
            subtitle TEXT NOT NULL,
            body TEXT NOT NULL,
            img_url TEXT NOT NULL,
            date TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            author_id INTEGER NOT NULL REFERENCES users(id),
            blog_id INTEGER NOT NULL REFERENCES blog_posts(id) ON DELETE CASCADE,
            comment_text TEXT NOT NULL,
            date TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_blog_posts_author ON blog_posts(author_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_comments_blog ON comments(blog_id)")
        .execute(pool)
        .await?;

    tracing::info!("Migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = create_memory_pool().await.unwrap();
        run(&pool).await.unwrap();
        run(&pool).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        let names: Vec<_> = tables.into_iter().map(|(n,)| n).collect();
        assert_eq!(names, ["blog_posts", "comments", "users"]);
    }
}

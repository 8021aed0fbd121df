//! SQLite connection pool management

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Default maximum connections for the pool.
/// Kept low for a single-author site.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Open (creating if missing) the SQLite database file at `path`.
///
/// Foreign keys are enforced on every connection.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(Path::new("posts.db")).await?;
/// ```
pub async fn create_pool(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    create_pool_with_options(path, DEFAULT_MAX_CONNECTIONS).await
}

/// Open the SQLite database file with a custom connection limit.
pub async fn create_pool_with_options(
    path: &Path,
    max_connections: u32,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// In-memory database for tests.
///
/// Every SQLite connection to `:memory:` is its own database, so the pool is
/// pinned to one connection that is never recycled.
pub async fn create_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_pool_executes_queries() {
        let pool = create_memory_pool().await.expect("pool creation failed");

        let result: (i32,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("query failed");

        assert_eq!(result.0, 1);
    }

    #[tokio::test]
    async fn file_pool_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.db");

        let pool = create_pool(&path).await.expect("pool creation failed");
        sqlx::query("CREATE TABLE t (x INTEGER)")
            .execute(&pool)
            .await
            .unwrap();

        assert!(path.exists());
    }

    #[tokio::test]
    async fn concurrent_pool_access() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_pool(&dir.path().join("posts.db")).await.unwrap();

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let pool = pool.clone();
                tokio::spawn(async move {
                    let result: (i64,) = sqlx::query_as("SELECT ?")
                        .bind(i as i64)
                        .fetch_one(&pool)
                        .await
                        .expect("concurrent query failed");
                    result.0
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let result = handle.await.expect("task panicked");
            assert_eq!(result, i as i64);
        }
    }
}

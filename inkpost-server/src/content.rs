//! Content store: the feed, posts and comments
//!
//! Posts are addressed by their *position* in the feed (index into
//! `list_posts()` at the time of the request), not by id. Links rendered from
//! one feed snapshot can therefore land on a different post if the feed
//! changed in between; callers that need a stable handle use `Post::id`.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::db::{Comment, CommentRepo, DbError, Post, PostRepo, User};
use crate::models::{comment_date, post_date, CommentText, PostFields};

/// Errors from the content store
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("a post titled '{title}' already exists")]
    DuplicateTitle { title: String },

    #[error("no post at feed position {position}")]
    PostNotFound { position: usize },

    #[error(transparent)]
    Database(DbError),
}

impl From<DbError> for ContentError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Conflict {
                resource: "post",
                value,
                ..
            } => Self::DuplicateTitle { title: value },
            other => Self::Database(other),
        }
    }
}

/// The feed: every post in insertion order.
pub async fn list_posts(pool: &SqlitePool) -> Result<Vec<Post>, ContentError> {
    Ok(PostRepo::new(pool).list().await?)
}

/// Post at `position` in the current feed.
pub async fn post_at(pool: &SqlitePool, position: usize) -> Result<Post, ContentError> {
    list_posts(pool)
        .await?
        .into_iter()
        .nth(position)
        .ok_or(ContentError::PostNotFound { position })
}

/// Create a post owned by `author`, dated `today`.
pub async fn create_post(
    pool: &SqlitePool,
    fields: &PostFields,
    author: &User,
    today: NaiveDate,
) -> Result<Post, ContentError> {
    let post = PostRepo::new(pool)
        .create(fields, author.id, &post_date(today))
        .await?;

    tracing::info!(post_id = post.id, author_id = author.id, "created post");
    Ok(post)
}

/// Replace a post's editable fields.
///
/// Any authenticated caller may edit any post; there is no ownership check.
pub async fn update_post(
    pool: &SqlitePool,
    id: i64,
    fields: &PostFields,
) -> Result<Post, ContentError> {
    let post = PostRepo::new(pool).update(id, fields).await?;

    tracing::info!(post_id = post.id, "updated post");
    Ok(post)
}

/// Update the post currently at `position` in the feed.
pub async fn update_post_at(
    pool: &SqlitePool,
    position: usize,
    fields: &PostFields,
) -> Result<Post, ContentError> {
    let post = post_at(pool, position).await?;
    update_post(pool, post.id, fields).await
}

/// Delete the post currently at `position` in the feed, with its comments.
pub async fn delete_post(pool: &SqlitePool, position: usize) -> Result<Post, ContentError> {
    let post = post_at(pool, position).await?;
    PostRepo::new(pool).delete(post.id).await?;

    tracing::info!(post_id = post.id, position, "deleted post");
    Ok(post)
}

/// Append a comment by `author` to post `post_id`, dated `today`.
pub async fn add_comment(
    pool: &SqlitePool,
    post_id: i64,
    author: &User,
    text: &CommentText,
    today: NaiveDate,
) -> Result<Comment, ContentError> {
    let comment = CommentRepo::new(pool)
        .add(post_id, author.id, text.as_str(), &comment_date(today))
        .await?;

    tracing::info!(comment_id = comment.id, post_id, author_id = author.id, "added comment");
    Ok(comment)
}

pub async fn comments_for_post(
    pool: &SqlitePool,
    post_id: i64,
) -> Result<Vec<Comment>, ContentError> {
    Ok(CommentRepo::new(pool).for_post(post_id).await?)
}

pub async fn posts_by_author(pool: &SqlitePool, author_id: i64) -> Result<Vec<Post>, ContentError> {
    Ok(PostRepo::new(pool).by_author(author_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::test_pool;
    use crate::db::UserRepo;

    fn fields(title: &str) -> PostFields {
        PostFields::new(title, "Sub", "https://example.com/i.png", "Body").unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    async fn user(pool: &SqlitePool, email: &str, name: &str) -> User {
        UserRepo::new(pool).insert(email, "h", name).await.unwrap()
    }

    fn titles(posts: Vec<Post>) -> Vec<String> {
        posts.into_iter().map(|p| p.title).collect()
    }

    #[tokio::test]
    async fn create_appends_to_feed() {
        let pool = test_pool().await;
        let ada = user(&pool, "a@x.io", "Ada").await;

        let post = create_post(&pool, &fields("X"), &ada, day(19)).await.unwrap();

        assert_eq!(post.date, "October 19, 2026");
        assert_eq!(post_at(&pool, 0).await.unwrap().title, "X");
    }

    #[tokio::test]
    async fn duplicate_title() {
        let pool = test_pool().await;
        let ada = user(&pool, "a@x.io", "Ada").await;

        create_post(&pool, &fields("X"), &ada, day(1)).await.unwrap();
        let err = create_post(&pool, &fields("X"), &ada, day(2)).await.unwrap_err();

        assert!(matches!(err, ContentError::DuplicateTitle { ref title } if title == "X"));
        assert_eq!(list_posts(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn any_user_can_edit_any_post() {
        let pool = test_pool().await;
        let ada = user(&pool, "a@x.io", "Ada").await;
        let _bob = user(&pool, "b@x.io", "Bob").await;

        create_post(&pool, &fields("Ada's"), &ada, day(1)).await.unwrap();
        // Caller identity is not consulted.
        let edited = update_post_at(&pool, 0, &fields("Edited by Bob")).await.unwrap();

        assert_eq!(edited.title, "Edited by Bob");
        assert_eq!(edited.author_id, ada.id);
    }

    #[tokio::test]
    async fn delete_is_positional() {
        let pool = test_pool().await;
        let ada = user(&pool, "a@x.io", "Ada").await;

        create_post(&pool, &fields("A"), &ada, day(1)).await.unwrap();
        create_post(&pool, &fields("B"), &ada, day(1)).await.unwrap();
        create_post(&pool, &fields("C"), &ada, day(1)).await.unwrap();

        let deleted = delete_post(&pool, 1).await.unwrap();
        assert_eq!(deleted.title, "B");
        assert_eq!(titles(list_posts(&pool).await.unwrap()), ["A", "C"]);

        // Position 1 now names a different post.
        let deleted = delete_post(&pool, 1).await.unwrap();
        assert_eq!(deleted.title, "C");
        assert_eq!(titles(list_posts(&pool).await.unwrap()), ["A"]);
    }

    #[tokio::test]
    async fn out_of_range_position() {
        let pool = test_pool().await;

        assert!(matches!(
            delete_post(&pool, 0).await.unwrap_err(),
            ContentError::PostNotFound { position: 0 }
        ));
        assert!(matches!(
            update_post_at(&pool, 3, &fields("Z")).await.unwrap_err(),
            ContentError::PostNotFound { position: 3 }
        ));
    }

    #[tokio::test]
    async fn comments_append_with_author() {
        let pool = test_pool().await;
        let ada = user(&pool, "a@x.io", "Ada").await;
        let bob = user(&pool, "b@x.io", "Bob").await;
        let post = create_post(&pool, &fields("P"), &ada, day(1)).await.unwrap();

        add_comment(&pool, post.id, &ada, &CommentText::new("first").unwrap(), day(11))
            .await
            .unwrap();
        let comment = add_comment(&pool, post.id, &bob, &CommentText::new("second").unwrap(), day(22))
            .await
            .unwrap();

        assert_eq!(comment.author_id, bob.id);
        assert_eq!(comment.date, "22nd/October/2026");

        let comments = comments_for_post(&pool, post.id).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].date, "11st/October/2026");
        let last = comments.last().unwrap();
        assert_eq!((last.author_id, last.text.as_str()), (bob.id, "second"));
    }

    #[tokio::test]
    async fn posts_by_author_lookup() {
        let pool = test_pool().await;
        let ada = user(&pool, "a@x.io", "Ada").await;
        let bob = user(&pool, "b@x.io", "Bob").await;

        create_post(&pool, &fields("A1"), &ada, day(1)).await.unwrap();
        create_post(&pool, &fields("B1"), &bob, day(1)).await.unwrap();

        assert_eq!(titles(posts_by_author(&pool, bob.id).await.unwrap()), ["B1"]);
    }
}

//! Feed and about pages

use axum::{extract::State, routing::get, Json, Router};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Serialize;

use crate::content;
use crate::db::Post;
use crate::http::error::ApiError;
use crate::http::extractors::CurrentSession;
use crate::state::AppState;

use super::{page_context, PageContext};

/// A feed entry. `index` is the post's position, used in its links.
#[derive(Debug, Serialize)]
pub struct PostSummary {
    pub index: usize,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: String,
}

impl PostSummary {
    fn new(index: usize, post: Post) -> Self {
        Self {
            index,
            title: post.title,
            subtitle: post.subtitle,
            author: post.author_name,
            date: post.date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedView {
    pub page: &'static str,
    #[serde(flatten)]
    pub context: PageContext,
    pub posts: Vec<PostSummary>,
}

#[derive(Debug, Serialize)]
pub struct AboutView {
    pub page: &'static str,
    #[serde(flatten)]
    pub context: PageContext,
}

/// GET / - the feed, oldest first
async fn index(
    State(state): State<AppState>,
    current: CurrentSession,
) -> Result<(SignedCookieJar, Json<FeedView>), ApiError> {
    let posts = content::list_posts(state.pool()).await?;
    let (jar, context) = page_context(&state, current);

    Ok((
        jar,
        Json(FeedView {
            page: "index",
            context,
            posts: posts
                .into_iter()
                .enumerate()
                .map(|(index, post)| PostSummary::new(index, post))
                .collect(),
        }),
    ))
}

/// GET /about
async fn about(
    State(state): State<AppState>,
    current: CurrentSession,
) -> (SignedCookieJar, Json<AboutView>) {
    let (jar, context) = page_context(&state, current);
    (
        jar,
        Json(AboutView {
            page: "about",
            context,
        }),
    )
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/about", get(about))
}

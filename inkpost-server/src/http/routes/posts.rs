//! Post pages: view, comment, create, edit, delete
//!
//! `{position}` is an index into the current feed, not a post id.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::{Deserialize, Serialize};

use crate::content::{self, ContentError};
use crate::db::{Comment, Post};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentSession, RequireUser};
use crate::models::{CommentText, PostFields};
use crate::state::AppState;

use super::{page_context, today, PageContext};

pub const LOGIN_TO_COMMENT: &str = "Please Login to post a comment.";
pub const DUPLICATE_TITLE: &str = "A post with that title already exists.";

/// Gravatar image for a commenter
pub fn avatar_url(email: &str) -> String {
    let digest = md5::compute(email.trim().to_lowercase().as_bytes());
    format!("http://www.gravatar.com/avatar/{digest:x}?s=50&d=retro&r=g")
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub subtitle: String,
    pub img_url: String,
    pub body: String,
}

impl PostForm {
    fn validate(&self) -> Result<PostFields, ApiError> {
        Ok(PostFields::new(
            &self.title,
            &self.subtitle,
            &self.img_url,
            &self.body,
        )?)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct PostView {
    pub index: usize,
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub img_url: String,
    pub author: String,
    pub date: String,
}

impl PostView {
    fn new(index: usize, post: Post) -> Self {
        Self {
            index,
            title: post.title,
            subtitle: post.subtitle,
            body: post.body,
            img_url: post.img_url,
            author: post.author_name,
            date: post.date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub author: String,
    pub avatar_url: String,
    pub text: String,
    pub date: String,
}

impl From<Comment> for CommentView {
    fn from(c: Comment) -> Self {
        Self {
            avatar_url: avatar_url(&c.author_email),
            author: c.author_name,
            text: c.text,
            date: c.date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShowPostView {
    pub page: &'static str,
    #[serde(flatten)]
    pub context: PageContext,
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Serialize)]
pub struct EditorView {
    pub page: &'static str,
    #[serde(flatten)]
    pub context: PageContext,
    pub is_edit: bool,
    /// Current values when editing
    pub post: Option<PostView>,
}

/// GET /post/{position}
async fn show_post(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(position): Path<usize>,
) -> Result<(SignedCookieJar, Json<ShowPostView>), ApiError> {
    let post = content::post_at(state.pool(), position).await?;
    let comments = content::comments_for_post(state.pool(), post.id).await?;
    let (jar, context) = page_context(&state, current);

    Ok((
        jar,
        Json(ShowPostView {
            page: "post",
            context,
            post: PostView::new(position, post),
            comments: comments.into_iter().map(CommentView::from).collect(),
        }),
    ))
}

/// POST /post/{position} - add a comment
async fn add_comment(
    State(state): State<AppState>,
    current: CurrentSession,
    Path(position): Path<usize>,
    Form(form): Form<CommentForm>,
) -> Result<Response, ApiError> {
    let Some(user) = current.session.user else {
        let jar = state.sessions().set_flash(current.jar, LOGIN_TO_COMMENT);
        return Ok((jar, Redirect::to("/login")).into_response());
    };

    let text = CommentText::new(&form.comment)?;
    let post = content::post_at(state.pool(), position).await?;
    content::add_comment(state.pool(), post.id, &user, &text, today()).await?;

    Ok(Redirect::to(&format!("/post/{position}")).into_response())
}

/// GET /new-post
async fn new_post_page(
    State(state): State<AppState>,
    auth: RequireUser,
) -> (SignedCookieJar, Json<EditorView>) {
    let (jar, context) = page_context(&state, auth.into());
    (
        jar,
        Json(EditorView {
            page: "make-post",
            context,
            is_edit: false,
            post: None,
        }),
    )
}

/// POST /new-post
async fn create_post(
    State(state): State<AppState>,
    RequireUser { user, jar }: RequireUser,
    Form(form): Form<PostForm>,
) -> Result<Response, ApiError> {
    let fields = form.validate()?;

    match content::create_post(state.pool(), &fields, &user, today()).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(ContentError::DuplicateTitle { title }) => {
            tracing::info!(%title, "duplicate post title");
            let jar = state.sessions().set_flash(jar, DUPLICATE_TITLE);
            Ok((jar, Redirect::to("/new-post")).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /edit-post/{position}
async fn edit_post_page(
    State(state): State<AppState>,
    auth: RequireUser,
    Path(position): Path<usize>,
) -> Result<(SignedCookieJar, Json<EditorView>), ApiError> {
    let post = content::post_at(state.pool(), position).await?;
    let (jar, context) = page_context(&state, auth.into());

    Ok((
        jar,
        Json(EditorView {
            page: "make-post",
            context,
            is_edit: true,
            post: Some(PostView::new(position, post)),
        }),
    ))
}

/// POST /edit-post/{position}
///
/// Any logged-in user may edit any post.
async fn edit_post(
    State(state): State<AppState>,
    RequireUser { jar, .. }: RequireUser,
    Path(position): Path<usize>,
    Form(form): Form<PostForm>,
) -> Result<Response, ApiError> {
    let fields = form.validate()?;

    match content::update_post_at(state.pool(), position, &fields).await {
        Ok(_) => Ok(Redirect::to(&format!("/post/{position}")).into_response()),
        Err(ContentError::DuplicateTitle { .. }) => {
            let jar = state.sessions().set_flash(jar, DUPLICATE_TITLE);
            Ok((jar, Redirect::to(&format!("/edit-post/{position}"))).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /delete-blogpost/{position}
async fn delete_post(
    State(state): State<AppState>,
    _auth: RequireUser,
    Path(position): Path<usize>,
) -> Result<Redirect, ApiError> {
    content::delete_post(state.pool(), position).await?;
    Ok(Redirect::to("/"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/post/{position}", get(show_post).post(add_comment))
        .route("/new-post", get(new_post_page).post(create_post))
        .route("/edit-post/{position}", get(edit_post_page).post(edit_post))
        .route("/delete-blogpost/{position}", get(delete_post))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avatar_hashes_normalized_email() {
        assert_eq!(
            avatar_url("  MyEmailAddress@example.com "),
            "http://www.gravatar.com/avatar/0bc83cb571cd1c50ba6f3e8a78ef1346?s=50&d=retro&r=g"
        );
    }
}

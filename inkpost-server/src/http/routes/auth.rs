//! Login, logout and registration

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::{Deserialize, Serialize};

use crate::auth::{self, AuthError};
use crate::content;
use crate::db::UserRepo;
use crate::http::error::ApiError;
use crate::http::extractors::CurrentSession;
use crate::models::validation::required;
use crate::models::{EmailAddress, ValidationError};
use crate::state::AppState;

use super::{page_context, PageContext};

pub const DUPLICATE_EMAIL: &str = "Sorry that email has already been registered. Login Instead";

const MAX_NAME_LEN: usize = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct FormView {
    pub page: &'static str,
    #[serde(flatten)]
    pub context: PageContext,
}

/// GET /login
async fn login_page(
    State(state): State<AppState>,
    current: CurrentSession,
) -> (SignedCookieJar, Json<FormView>) {
    form_page(&state, current, "login")
}

fn form_page(
    state: &AppState,
    current: CurrentSession,
    page: &'static str,
) -> (SignedCookieJar, Json<FormView>) {
    let (jar, context) = page_context(state, current);
    (jar, Json(FormView { page, context }))
}

/// POST /login
async fn login(
    State(state): State<AppState>,
    current: CurrentSession,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let sessions = state.sessions();

    match auth::authenticate(state.pool(), &form.email, &form.password).await {
        Ok(user) => {
            tracing::info!(user_id = user.id, "user logged in");
            let jar = sessions.login(current.jar, user.id).await;
            Ok((jar, Redirect::to("/")).into_response())
        }
        Err(AuthError::InvalidCredentials(failure)) => {
            tracing::info!(reason = %failure, "login rejected");
            let jar = sessions.set_flash(current.jar, failure.message());
            Ok((jar, Redirect::to("/login")).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /logout
async fn logout(State(state): State<AppState>, current: CurrentSession) -> Response {
    let jar = state.sessions().logout(current.jar).await;
    (jar, Redirect::to("/")).into_response()
}

/// GET /register
async fn register_page(
    State(state): State<AppState>,
    current: CurrentSession,
) -> (SignedCookieJar, Json<FormView>) {
    form_page(&state, current, "register")
}

/// POST /register
///
/// The very first account, created while the feed is still empty, lands on the
/// new-post page; everyone else goes home.
async fn register(
    State(state): State<AppState>,
    current: CurrentSession,
    Form(form): Form<RegisterForm>,
) -> Result<Response, ApiError> {
    let name = required("name", &form.name, MAX_NAME_LEN)?;
    let email = EmailAddress::new(&form.email)?;
    if form.password.is_empty() {
        return Err(ValidationError::Empty { field: "password" }.into());
    }

    let sessions = state.sessions();
    let user = match auth::register(state.pool(), &email, &form.password, &name).await {
        Ok(user) => user,
        Err(AuthError::DuplicateEmail { .. }) => {
            let jar = sessions.set_flash(current.jar, DUPLICATE_EMAIL);
            return Ok((jar, Redirect::to("/login")).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let jar = sessions.login(current.jar, user.id).await;

    let first_user = UserRepo::new(state.pool()).count().await? == 1
        && content::list_posts(state.pool()).await?.is_empty();
    let target = if first_user { "/new-post" } else { "/" };

    Ok((jar, Redirect::to(target)).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .route("/register", get(register_page).post(register))
}

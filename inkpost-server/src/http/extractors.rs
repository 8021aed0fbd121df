//! Session extractors

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::SignedCookieJar;

use crate::auth::Session;
use crate::db::{DbError, User, UserRepo};
use crate::state::AppState;

use super::error::ApiError;

/// Flash shown when a protected page bounces an anonymous visitor
pub const LOGIN_REQUIRED: &str = "Please login to continue.";

/// The visitor's session, resolved to a user when logged in.
///
/// Carries the cookie jar so handlers can hand it back with their response.
pub struct CurrentSession {
    pub session: Session,
    pub jar: SignedCookieJar,
}

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, FromRef::from_ref(state));

        let session = match state.sessions().user_id(&jar).await {
            Some(user_id) => match UserRepo::new(state.pool()).get(user_id).await {
                Ok(user) => Session::authenticated(user),
                // Account gone since login; treat as anonymous.
                Err(DbError::NotFound { .. }) => Session::anonymous(),
                Err(e) => return Err(e.into()),
            },
            None => Session::anonymous(),
        };

        Ok(Self { session, jar })
    }
}

/// A logged-in user. Anonymous visitors are redirected to `/login` with a flash.
pub struct RequireUser {
    pub user: User,
    pub jar: SignedCookieJar,
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentSession { session, jar } = CurrentSession::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match session.user {
            Some(user) => Ok(Self { user, jar }),
            None => {
                tracing::debug!(path = %parts.uri.path(), "anonymous visitor sent to login");
                let jar = state.sessions().set_flash(jar, LOGIN_REQUIRED);
                Err((jar, Redirect::to("/login")).into_response())
            }
        }
    }
}

impl From<RequireUser> for CurrentSession {
    fn from(auth: RequireUser) -> Self {
        Self {
            session: Session::authenticated(auth.user),
            jar: auth.jar,
        }
    }
}

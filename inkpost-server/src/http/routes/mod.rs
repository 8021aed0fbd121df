//! Route handlers organized by page

pub mod auth;
pub mod contact;
pub mod health;
pub mod pages;
pub mod posts;

use axum_extra::extract::cookie::SignedCookieJar;
use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::state::AppState;

use super::extractors::CurrentSession;

/// Fields every page view carries
#[derive(Debug, Serialize)]
pub struct PageContext {
    pub logged_in: bool,
    pub current_user: Option<UserView>,
    /// One-shot message queued by the previous request
    pub flash: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: i64,
    pub name: String,
}

/// Build the page context, consuming any pending flash.
///
/// The returned jar expires the flash cookie and must go out with the response.
pub(crate) fn page_context(
    state: &AppState,
    current: CurrentSession,
) -> (SignedCookieJar, PageContext) {
    let (jar, flash) = state.sessions().take_flash(current.jar);
    let current_user = current.session.user.map(|u| UserView {
        id: u.id,
        name: u.name,
    });

    let context = PageContext {
        logged_in: current_user.is_some(),
        current_user,
        flash,
    };
    (jar, context)
}

/// Server-local calendar date, used to stamp posts and comments.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

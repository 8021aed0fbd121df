//! Contact form, delivered to the site owner by email

use axum::{extract::State, routing::get, Form, Json, Router};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::{Deserialize, Serialize};

use crate::config::CONTACT_SUBJECT;
use crate::http::error::ApiError;
use crate::http::extractors::CurrentSession;
use crate::models::validation::required;
use crate::models::EmailAddress;
use crate::state::AppState;

use super::{page_context, PageContext};

pub const SENT_MESSAGE: &str = "Successfully, sent your message.";

const MAX_FIELD_LEN: usize = 250;
const MAX_MESSAGE_LEN: usize = 5_000;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Message")]
    pub message: String,
}

impl ContactForm {
    /// Plain-text body sent to the owner.
    fn compose(&self) -> Result<String, ApiError> {
        let name = required("Name", &self.name, MAX_FIELD_LEN)?;
        let email = EmailAddress::new(&self.email)?;
        let message = required("Message", &self.message, MAX_MESSAGE_LEN)?;
        let phone = self.phone.trim();

        Ok(format!(
            "Name: {name}\nEmail: {}\nPhone Number: {phone}\nMessage: {message}",
            email.as_str()
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct ContactView {
    pub page: &'static str,
    #[serde(flatten)]
    pub context: PageContext,
    pub msg_sent: bool,
    pub message: Option<&'static str>,
}

/// GET /contact
async fn contact_page(
    State(state): State<AppState>,
    current: CurrentSession,
) -> (SignedCookieJar, Json<ContactView>) {
    let (jar, context) = page_context(&state, current);
    (
        jar,
        Json(ContactView {
            page: "contact",
            context,
            msg_sent: false,
            message: None,
        }),
    )
}

/// POST /contact - one delivery attempt; failure renders the generic failure page
async fn send_contact(
    State(state): State<AppState>,
    current: CurrentSession,
    Form(form): Form<ContactForm>,
) -> Result<(SignedCookieJar, Json<ContactView>), ApiError> {
    let body = form.compose()?;

    state
        .dispatcher()
        .notify(&body, state.contact_recipient(), CONTACT_SUBJECT)
        .await?;

    let (jar, context) = page_context(&state, current);
    Ok((
        jar,
        Json(ContactView {
            page: "contact",
            context,
            msg_sent: true,
            message: Some(SENT_MESSAGE),
        }),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/contact", get(contact_page).post(send_contact))
}

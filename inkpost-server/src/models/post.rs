//! Post and comment field validation

use super::validation::{required, ValidationError};

/// Column width of the short post columns and `comments.comment_text`
const MAX_SHORT_LEN: usize = 250;

/// Upper bound for a post body
const MAX_BODY_LEN: usize = 100_000;

/// Validated editable fields of a blog post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFields {
    pub title: String,
    pub subtitle: String,
    pub img_url: String,
    pub body: String,
}

impl PostFields {
    /// Validate the four editable post fields.
    ///
    /// All fields are required. Title, subtitle and image URL are capped at
    /// 250 characters; the image URL must be http(s).
    pub fn new(
        title: &str,
        subtitle: &str,
        img_url: &str,
        body: &str,
    ) -> Result<Self, ValidationError> {
        let title = required("title", title, MAX_SHORT_LEN)?;
        let subtitle = required("subtitle", subtitle, MAX_SHORT_LEN)?;
        let img_url = required("img_url", img_url, MAX_SHORT_LEN)?;
        let body = required("body", body, MAX_BODY_LEN)?;

        if !(img_url.starts_with("http://") || img_url.starts_with("https://")) {
            return Err(ValidationError::InvalidFormat {
                field: "img_url",
                reason: "must be an http or https URL",
            });
        }

        Ok(Self {
            title,
            subtitle,
            img_url,
            body,
        })
    }
}

/// Validated comment text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentText(String);

impl CommentText {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        required("comment", s, MAX_SHORT_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

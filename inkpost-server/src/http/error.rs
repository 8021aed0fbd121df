//! Request-time errors with IntoResponse
//!
//! Expected outcomes (bad password, duplicate title) are handled in the routes
//! as flash + redirect. What reaches this type becomes a JSON error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::auth::AuthError;
use crate::content::ContentError;
use crate::db::DbError;
use crate::models::ValidationError;
use crate::notify::DeliveryFailed;

/// Handler error with HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Form input rejected (400)
    Validation(ValidationError),

    /// Nothing at that address (404)
    NotFound { resource: &'static str, id: String },

    /// Notification not handed off (502, generic failure page)
    Delivery(DeliveryFailed),

    /// Database error (500, logged)
    Database(DbError),

    /// Anything else (500, logged)
    Internal { message: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(e) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "validation_error",
                    "message": e.to_string()
                }),
            ),
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "not_found",
                    "message": format!("{resource} '{id}' not found")
                }),
            ),
            Self::Delivery(e) => {
                tracing::error!(error = %e, "contact message not delivered");
                (
                    StatusCode::BAD_GATEWAY,
                    json!({
                        "page": "failure",
                        "error": "delivery_failed",
                        "message": "Sorry, something went wrong sending your message. Please try again later."
                    }),
                )
            }
            Self::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            _ => Self::Database(e),
        }
    }
}

impl From<ContentError> for ApiError {
    fn from(e: ContentError) -> Self {
        match e {
            ContentError::PostNotFound { position } => Self::NotFound {
                resource: "post",
                id: position.to_string(),
            },
            ContentError::Database(e) => e.into(),
            e @ ContentError::DuplicateTitle { .. } => Self::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Database(e) => e.into(),
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}

impl From<DeliveryFailed> for ApiError {
    fn from(e: DeliveryFailed) -> Self {
        Self::Delivery(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Channel;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn validation_error_is_400() {
        let err = ApiError::Validation(ValidationError::Empty { field: "title" });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_post_is_404() {
        let err: ApiError = ContentError::PostNotFound { position: 9 }.into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delivery_failure_is_generic_502() {
        let err: ApiError = DeliveryFailed::transport(Channel::Email, "535 auth failed").into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("\"page\":\"failure\""));
        assert!(!body.contains("535"));
    }

    #[tokio::test]
    async fn database_details_stay_in_the_log() {
        let err: ApiError = DbError::Sqlx(sqlx::Error::PoolTimedOut).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(!String::from_utf8_lossy(&body).contains("pool"));
    }
}

//! Liveness and database reachability for load balancers and uptime checks
//!
//! Answers 200 while the database accepts queries, 503 once it does not.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthView {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

/// GET /health
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthView>) {
    let database_up = sqlx::query("SELECT 1")
        .execute(state.pool())
        .await
        .map_err(|e| tracing::warn!(error = %e, "health check: database unreachable"))
        .is_ok();

    let (code, status, database) = if database_up {
        (StatusCode::OK, "ok", "up")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "down")
    };

    (
        code,
        Json(HealthView {
            status,
            database,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlogConfig;
    use crate::db::repos::test_pool;

    async fn state() -> AppState {
        AppState::new(test_pool().await, &BlogConfig::for_tests()).unwrap()
    }

    #[tokio::test]
    async fn reports_database_up() {
        let (code, Json(view)) = health(State(state().await)).await;

        assert_eq!(code, StatusCode::OK);
        assert_eq!(view.database, "up");
        assert_eq!(view.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn closed_pool_is_unavailable() {
        let state = state().await;
        state.pool().close().await;

        let (code, Json(view)) = health(State(state)).await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(view.status, "degraded");
    }
}

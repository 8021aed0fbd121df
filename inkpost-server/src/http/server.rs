//! Axum server setup
//!
//! - Request tracing
//! - Per-request timeout
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::auth::SessionStore;
use crate::config::BlogConfig;
use crate::db::migrations;
use crate::error::ServerResult;
use crate::state::AppState;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Listener configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:5000)
    pub bind_addr: SocketAddr,

    /// Upper bound for a whole request, notification included
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Build the router with every page mounted.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::pages::router())
        .merge(routes::contact::router())
        .merge(routes::auth::router())
        .merge(routes::posts::router())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(config.request_timeout))
        .with_state(state)
}

/// Migrate the database and serve until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(Path::new("posts.db")).await?;
/// run_server(pool, &blog_config, ServerConfig::default()).await?;
/// ```
pub async fn run_server(
    pool: SqlitePool,
    blog_config: &BlogConfig,
    config: ServerConfig,
) -> ServerResult<()> {
    migrations::run(&pool).await?;

    let state = AppState::new(pool, blog_config)?;
    let sweeper = spawn_session_sweeper(state.sessions().clone());
    let app = build_router(state, &config);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Periodically drop idle logins so abandoned sessions don't accumulate.
fn spawn_session_sweeper(sessions: SessionStore) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sessions.sweep().await;
        }
    })
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

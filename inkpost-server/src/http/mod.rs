//! HTTP layer
//!
//! Axum router with request tracing, a request timeout and graceful shutdown.
//! Pages are JSON view models; form posts answer with `303 See Other`.

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, ServerConfig};

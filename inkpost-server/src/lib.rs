//! inkpost-server: a small personal blog
//!
//! Visitors read posts and comments, registered users write them, and the
//! contact form forwards messages to the site owner by email.

pub mod auth;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod notify;
pub mod state;

pub use config::BlogConfig;
pub use error::{ServerError, ServerResult};
pub use http::{build_router, run_server, ServerConfig};
pub use state::AppState;

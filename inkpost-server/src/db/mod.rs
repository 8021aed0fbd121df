//! Database layer - connection pool, schema and repositories
//!
//! - Relationships are explicit foreign keys, looked up through repo methods
//! - Rely on DB constraints, handle conflicts - no check-then-insert

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{create_memory_pool, create_pool};
pub use repos::*;

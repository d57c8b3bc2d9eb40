//! Database Layer
//!
//! This module handles all database interactions using libsql:
//!
//! - Database initialization and schema management
//! - Connection configuration (WAL mode, busy timeout, foreign keys)
//! - The `MindmapStore` abstraction the services depend on
//!
//! # Architecture
//!
//! Mindmapper uses an embedded SQLite database through libsql. SQLite was
//! chosen for:
//!
//! - Single-file deployment (no external database server)
//! - Foreign key cascades that match the user -> map -> node ownership chain
//! - Transactional subtree deletion
//! - WAL mode for concurrent readers during writes

mod database;
mod error;
mod store;
mod turso_store;

pub use database::{DatabaseService, DbCreateNodeParams, DbUpdateNodeParams};
pub use error::DatabaseError;
pub use store::MindmapStore;
pub use turso_store::TursoStore;

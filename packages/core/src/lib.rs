//! Mindmapper Core Business Logic Layer
//!
//! This crate provides the data model, persistence, and service
//! orchestration for the Mindmapper backend.
//!
//! # Architecture
//!
//! - **libsql**: Embedded SQLite database, single file, no server
//! - **Fixed schema**: users, sessions, maps, nodes; created idempotently
//! - **Rebuilt hierarchy**: the children index is derived from `parent_id`
//!   pointers on load, never persisted
//!
//! # Modules
//!
//! - [`models`] - Data structures (User, Session, MindMap, Node)
//! - [`tree`] - In-memory hierarchy index over a map's nodes
//! - [`services`] - Business services (AuthService, NodeService, etc.)
//! - [`db`] - Database layer with libsql integration

pub mod db;
pub mod models;
pub mod services;
pub mod tree;

// Re-export commonly used types
pub use models::*;
pub use services::*;
pub use tree::MapTree;

//! Business Services
//!
//! This module contains the core business logic services:
//!
//! - `AuthService` - registration, login, and session management
//! - `UserService` - account creation, lookup, updates, and deletion
//! - `MapService` - map CRUD and automatic layout
//! - `NodeService` - node CRUD and hierarchy operations
//!
//! Services coordinate between the database layer and application logic,
//! implementing business rules and orchestrating complex operations. They
//! all talk to persistence through the `MindmapStore` trait.

pub mod auth_service;
pub mod error;
pub mod map_service;
pub mod node_service;
pub mod user_service;

pub use auth_service::{AuthService, AuthSession};
pub use error::ServiceError;
pub use map_service::MapService;
pub use node_service::NodeService;
pub use user_service::UserService;

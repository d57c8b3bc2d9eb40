//! Service Layer Error Types
//!
//! This module defines error types for service-layer operations, providing
//! detailed error handling for business logic failures.

use crate::models::ValidationError;
use mindmapper_layout::LayoutError;
use thiserror::Error;

/// Service operation errors
///
/// High-level error types for all service operations. The HTTP layer maps
/// these onto status codes, so variants are grouped by outcome: not-found,
/// validation, conflict, auth, and internal failures.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// User not found by ID
    #[error("User not found: {id}")]
    UserNotFound { id: String },

    /// Map not found by ID
    #[error("Map not found: {id}")]
    MapNotFound { id: String },

    /// Node not found by ID
    #[error("Node not found: {id}")]
    NodeNotFound { id: String },

    /// Validation failed for input data
    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Email already registered
    #[error("User with this email already exists")]
    DuplicateEmail,

    /// Username already taken
    #[error("User with this username already exists")]
    DuplicateUsername,

    /// Parent node does not exist
    #[error("Invalid parent node: {parent_id}")]
    InvalidParent { parent_id: String },

    /// Parent node belongs to a different map
    #[error("Parent node {parent_id} belongs to a different map")]
    CrossMapParent { parent_id: String },

    /// Reparenting would create a cycle
    #[error("Circular reference detected: {context}")]
    CircularReference { context: String },

    /// Login failed. Deliberately does not say whether the email or the
    /// password was wrong.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Refresh token missing, expired, or of the wrong kind
    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    /// Access token missing, expired, or of the wrong kind
    #[error("Invalid or expired token")]
    Unauthorized,

    /// Password hashing or verification failed
    #[error("Password hashing failed: {0}")]
    PasswordHashFailed(String),

    /// Automatic layout failed
    #[error("Layout failed: {0}")]
    LayoutFailed(#[from] LayoutError),

    /// Invalid update operation
    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    /// Query execution error
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

impl ServiceError {
    /// Create a user not found error
    pub fn user_not_found(id: impl Into<String>) -> Self {
        Self::UserNotFound { id: id.into() }
    }

    /// Create a map not found error
    pub fn map_not_found(id: impl Into<String>) -> Self {
        Self::MapNotFound { id: id.into() }
    }

    /// Create a node not found error
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    /// Create an invalid parent error
    pub fn invalid_parent(parent_id: impl Into<String>) -> Self {
        Self::InvalidParent {
            parent_id: parent_id.into(),
        }
    }

    /// Create a cross-map parent error
    pub fn cross_map_parent(parent_id: impl Into<String>) -> Self {
        Self::CrossMapParent {
            parent_id: parent_id.into(),
        }
    }

    /// Create a circular reference error
    pub fn circular_reference(context: impl Into<String>) -> Self {
        Self::CircularReference {
            context: context.into(),
        }
    }

    /// Create a password hashing error
    pub fn password_hash_failed(msg: impl Into<String>) -> Self {
        Self::PasswordHashFailed(msg.into())
    }

    /// Create an invalid update error
    pub fn invalid_update(msg: impl Into<String>) -> Self {
        Self::InvalidUpdate(msg.into())
    }

    /// Create a query failed error
    pub fn query_failed(msg: impl Into<String>) -> Self {
        Self::QueryFailed(msg.into())
    }
}

//! Data Models
//!
//! Core data structures shared across the crate:
//!
//! - `User` / `UserProfile` / `Session` - accounts and auth sessions
//! - `MindMap` - map documents
//! - `Node` - the nodes inside a map, with their style enums
//!
//! All JSON serialization is camelCase to match the frontend payloads.

mod map;
mod node;
mod user;
mod validation;

pub use map::{CreateMap, MapUpdate, MapWithNodes, MindMap, DEFAULT_MAP_TITLE};
pub use node::{
    CreateNode, Node, NodeUpdate, StyleColor, StyleShape, StyleType, TextRotation,
    DEFAULT_NODE_LABEL,
};
pub use user::{
    validate_new_user, CreateUser, Credentials, Session, TokenKind, User, UserProfile,
    UserUpdate, UserWithMaps, ACCESS_TOKEN_TTL_DAYS, REFRESH_TOKEN_TTL_DAYS,
};
pub use validation::{
    validate_email, validate_label, validate_password, validate_position, validate_title,
    validate_username, ValidationError,
};

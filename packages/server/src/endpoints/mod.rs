//! REST endpoint modules
//!
//! One module per resource. Each exposes `routes(state) -> Router`, and the
//! main router in `lib.rs` merges them all.
//!
//! The small response types shared by several resources live here; anything
//! resource-specific stays in its module.

use serde::Serialize;

pub mod auth;
pub mod maps;
pub mod nodes;
pub mod users;

/// Row-count response for update endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedCount {
    pub affected_count: u64,
}

/// Acknowledgement for delete endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deleted {
    pub success: bool,
    pub message: String,
}

impl Deleted {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

//! HTTP error handling for the REST API
//!
//! Every failed request is answered with the same envelope:
//!
//! ```json
//! { "success": false, "error": { "message": "...", "status": 404 } }
//! ```
//!
//! Handlers return `Result<_, HttpError>` and usually rely on the
//! `From<ServiceError>` conversion, so status-code policy lives in one place.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use mindmapper_core::services::ServiceError;

/// HTTP error carrying a user-facing message and a machine-readable code
///
/// The code decides the status line; `details` never reaches the client and
/// only shows up in server logs.
#[derive(Debug)]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    /// Optional detailed error information for debugging
    pub details: Option<String>,
}

impl HttpError {
    /// Create a new HTTP error
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Create a new HTTP error with details
    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: Some(details.into()),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = match self.code.as_str() {
            "USER_NOT_FOUND" | "MAP_NOT_FOUND" | "NODE_NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" | "INVALID_INPUT" => StatusCode::BAD_REQUEST,
            "DUPLICATE_EMAIL" | "DUPLICATE_USERNAME" => StatusCode::CONFLICT,
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(
                "❌ {}: {}",
                self.code,
                self.details.as_deref().unwrap_or(&self.message)
            );
        } else if let Some(details) = &self.details {
            tracing::debug!("{}: {}", self.code, details);
        }

        let body = serde_json::json!({
            "success": false,
            "error": {
                "message": self.message,
                "status": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            // Not-found messages stay generic; the offending id goes into
            // details so it still reaches the logs.
            ServiceError::UserNotFound { .. } => {
                HttpError::with_details("User not found", "USER_NOT_FOUND", err.to_string())
            }
            ServiceError::MapNotFound { .. } => {
                HttpError::with_details("Map not found", "MAP_NOT_FOUND", err.to_string())
            }
            ServiceError::NodeNotFound { .. } => {
                HttpError::with_details("Node not found", "NODE_NOT_FOUND", err.to_string())
            }
            // The "Validation failed:" prefix is service-internal; clients
            // get the bare field message.
            ServiceError::ValidationFailed(inner) => {
                HttpError::new(inner.to_string(), "VALIDATION_ERROR")
            }
            ServiceError::DuplicateEmail => HttpError::new(err.to_string(), "DUPLICATE_EMAIL"),
            ServiceError::DuplicateUsername => {
                HttpError::new(err.to_string(), "DUPLICATE_USERNAME")
            }
            ServiceError::InvalidParent { .. }
            | ServiceError::CrossMapParent { .. }
            | ServiceError::CircularReference { .. }
            | ServiceError::LayoutFailed(_)
            | ServiceError::InvalidUpdate(_) => {
                HttpError::new(err.to_string(), "VALIDATION_ERROR")
            }
            ServiceError::InvalidCredentials
            | ServiceError::InvalidRefreshToken
            | ServiceError::Unauthorized => HttpError::new(err.to_string(), "UNAUTHORIZED"),
            ServiceError::PasswordHashFailed(_) | ServiceError::QueryFailed(_) => {
                HttpError::with_details("Internal server error", "INTERNAL_ERROR", err.to_string())
            }
        }
    }
}

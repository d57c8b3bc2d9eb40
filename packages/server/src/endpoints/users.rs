//! User Endpoints
//!
//! Account CRUD. Responses always carry profiles; password hashes never
//! leave the service layer.
//!
//! # Endpoints
//!
//! - `GET /api/users` - List all users
//! - `GET /api/users/:id` - Get one user
//! - `GET /api/users/:id/maps` - User profile plus their maps
//! - `POST /api/users` - Create a user (no session issued)
//! - `PUT /api/users/:id` - Update username and/or email
//! - `DELETE /api/users/:id` - Delete a user and everything they own

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};

use crate::endpoints::{AffectedCount, Deleted};
use crate::{AppState, HttpError};
use mindmapper_core::models::{CreateUser, UserProfile, UserUpdate, UserWithMaps};

/// List all users ordered by creation time
async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserProfile>>, HttpError> {
    let users = state.users.list_users().await?;

    Ok(Json(users.iter().map(|u| u.profile()).collect()))
}

/// Get a user by ID
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>, HttpError> {
    let user = state.users.get_user(&id).await?;

    Ok(Json(user.profile()))
}

/// Get a user together with all their maps
async fn get_user_maps(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserWithMaps>, HttpError> {
    Ok(Json(state.users.get_user_with_maps(&id).await?))
}

/// Create a user account without logging them in
///
/// # Request Body
///
/// `{ "username": "...", "email": "...", "password": "..." }`
async fn create_user(
    State(state): State<AppState>,
    Json(params): Json<CreateUser>,
) -> Result<(StatusCode, Json<UserProfile>), HttpError> {
    let user = state.users.create_user(params).await?;

    Ok((StatusCode::CREATED, Json(user.profile())))
}

/// Update a user's username and/or email
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<AffectedCount>, HttpError> {
    let affected_count = state.users.update_user(&id, update).await?;

    Ok(Json(AffectedCount { affected_count }))
}

/// Delete a user, cascading to their sessions, maps, and nodes
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, HttpError> {
    state.users.delete_user(&id).await?;

    Ok(Json(Deleted::new("User deleted successfully")))
}

/// Create router with all user endpoints
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users", post(create_user))
        .route("/api/users/:id", get(get_user))
        .route("/api/users/:id", put(update_user))
        .route("/api/users/:id", delete(delete_user))
        .route("/api/users/:id/maps", get(get_user_maps))
        .with_state(state)
}

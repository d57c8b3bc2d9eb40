//! Authentication Endpoints
//!
//! Registration, login, token refresh, and logout, plus the bearer-token
//! extractor used by the authenticated routes.
//!
//! # Endpoints
//!
//! - `POST /api/auth/register` - Create an account, returns user + tokens
//! - `POST /api/auth/login` - Exchange credentials for tokens
//! - `POST /api/auth/refresh` - Exchange a refresh token for a new access token
//! - `GET /api/auth/me` - Profile of the authenticated user
//! - `POST /api/auth/logout` - Revoke the presented access token
//!
//! Tokens are opaque; clients send them back verbatim in
//! `Authorization: Bearer <token>`.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, HttpError};
use mindmapper_core::models::{CreateUser, Credentials, User, UserProfile};
use mindmapper_core::services::{AuthSession, ServiceError};

/// Authenticated caller, resolved from the `Authorization: Bearer` header
///
/// A missing header, a malformed value, an expired or revoked token, and a
/// deleted account all reject with the same 401, so callers cannot probe
/// which part failed.
pub struct AuthUser {
    pub user: User,
    /// The raw token, kept so logout can revoke exactly this session
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = HttpError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| HttpError::new("Invalid or expired token", "UNAUTHORIZED"))?;

        let user = state.auth.authenticate(token).await?;

        Ok(AuthUser {
            user,
            token: token.to_string(),
        })
    }
}

/// Response for successful registration and login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserProfile,
    pub token: String,
    pub refresh_token: String,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.user.profile(),
            token: session.access.token,
            refresh_token: session.refresh.token,
        }
    }
}

/// Request body for the refresh endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    refresh_token: String,
}

/// Response carrying a freshly issued access token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    token: String,
}

/// Register a new account
///
/// # Request Body
///
/// `{ "username": "...", "email": "...", "password": "..." }`
///
/// Returns 201 with the profile and an access/refresh token pair. A taken
/// email or username answers 409.
async fn register(
    State(state): State<AppState>,
    Json(params): Json<CreateUser>,
) -> Result<(StatusCode, Json<AuthResponse>), HttpError> {
    let session = state.auth.register(params).await?;

    tracing::debug!("✅ Registered user {}", session.user.username);

    Ok((StatusCode::CREATED, Json(session.into())))
}

/// Log in with email and password
///
/// Unknown email and wrong password both answer 401 with the same message.
async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<AuthResponse>, HttpError> {
    let session = state.auth.login(credentials).await?;

    tracing::debug!("✅ Logged in user {}", session.user.username);

    Ok(Json(session.into()))
}

/// Exchange a refresh token for a new access token
///
/// The refresh token itself stays valid until its own expiry.
async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, HttpError> {
    if body.refresh_token.is_empty() {
        return Err(HttpError::new(
            "Refresh token is required",
            "VALIDATION_ERROR",
        ));
    }

    let session = state
        .auth
        .refresh(&body.refresh_token)
        .await
        .map_err(|err| match err {
            // A token whose account vanished is an auth failure on this
            // route, not a 404.
            ServiceError::UserNotFound { .. } => HttpError::new("User not found", "UNAUTHORIZED"),
            other => other.into(),
        })?;

    Ok(Json(RefreshResponse {
        token: session.token,
    }))
}

/// Profile of the authenticated user
async fn me(auth: AuthUser) -> Json<UserProfile> {
    Json(auth.user.profile())
}

/// Revoke the presented access token
///
/// The refresh token, if any, is untouched; clients drop it themselves.
async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, HttpError> {
    state.auth.logout(&auth.token).await?;

    tracing::debug!("✅ Logged out user {}", auth.user.username);

    Ok(Json(serde_json::json!({ "success": true })))
}

/// Create router with all auth endpoints
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/me", get(me))
        .route("/api/auth/logout", post(logout))
        .with_state(state)
}

//! Mindmapper REST API Server
//!
//! Axum router over the `mindmapper-core` services. The API is organized
//! into modular endpoint modules, one per resource:
//!
//! - `endpoints::auth` - registration, login, token refresh, logout
//! - `endpoints::users` - account CRUD
//! - `endpoints::maps` - map CRUD and automatic layout
//! - `endpoints::nodes` - node CRUD and hierarchy operations
//!
//! All routes live under `/api` and speak JSON. Resource routes are
//! unauthenticated; only `/api/auth/me` and `/api/auth/logout` require a
//! bearer token.

use axum::{
    http::{header, Method},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use mindmapper_core::db::MindmapStore;
use mindmapper_core::services::{AuthService, MapService, NodeService, UserService};

pub mod endpoints;

// Shared HTTP error handling
mod http_error;

// Re-export HttpError for use by endpoint modules
pub use http_error::HttpError;

/// Application state shared across all endpoints
///
/// Each service is a thin `Clone`-able handle; they all talk to the same
/// `Arc<dyn MindmapStore>` underneath, so cloning the state per request is
/// cheap.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub users: UserService,
    pub maps: MapService,
    pub nodes: NodeService,
}

impl AppState {
    /// Build the full service stack on top of one shared store
    pub fn new(store: Arc<dyn MindmapStore>) -> Self {
        Self {
            auth: AuthService::new(store.clone()),
            users: UserService::new(store.clone()),
            maps: MapService::new(store.clone()),
            nodes: NodeService::new(store),
        }
    }
}

/// Create the main application router with all endpoint modules
///
/// Each resource module contributes its routes via `.merge()`, so modules
/// stay independent and the full route table is assembled here.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(endpoints::auth::routes(state.clone()))
        .merge(endpoints::users::routes(state.clone()))
        .merge(endpoints::maps::routes(state.clone()))
        .merge(endpoints::nodes::routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

/// Create the CORS layer
///
/// Permissive by default so any local frontend can talk to the API.
/// Set CORS_ALLOW_ORIGIN to pin responses to a single deployed origin:
///
/// ```bash
/// CORS_ALLOW_ORIGIN="https://app.example.com" mindmapper-server
/// ```
fn cors_layer() -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any)
        .allow_credentials(false);

    match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(origin) => match origin.parse::<header::HeaderValue>() {
            Ok(value) => layer.allow_origin(value),
            Err(_) => {
                tracing::warn!("⚠️  Ignoring unparsable CORS_ALLOW_ORIGIN: {}", origin);
                layer.allow_origin(Any)
            }
        },
        Err(_) => layer.allow_origin(Any),
    }
}

/// Start the HTTP API server
///
/// Binds `0.0.0.0:{port}` and serves until ctrl-c, then drains in-flight
/// requests before returning.
///
/// # Errors
///
/// Returns an error if the listener fails to bind or the server loop dies.
pub async fn start_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("🚀 Mindmapper API listening on http://{}", addr);
    tracing::info!("📡 Routes mounted under /api");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("✅ Server stopped cleanly");
    Ok(())
}

/// Resolve once ctrl-c arrives, letting axum drain open connections
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("🔄 Shutdown signal received, draining connections");
}

//! Map Endpoints
//!
//! Map CRUD plus the automatic-layout trigger.
//!
//! # Endpoints
//!
//! - `GET /api/maps` - List all maps
//! - `GET /api/maps/:id` - Get one map
//! - `GET /api/maps/:id/nodes` - Map together with all its nodes
//! - `GET /api/maps/user/:userId` - Maps owned by a user
//! - `POST /api/maps` - Create a map
//! - `PUT /api/maps/:id` - Rename a map
//! - `DELETE /api/maps/:id` - Delete a map and its nodes
//! - `POST /api/maps/:id/layout` - Recompute and persist node positions

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;

use crate::endpoints::{AffectedCount, Deleted};
use crate::{AppState, HttpError};
use mindmapper_core::models::{CreateMap, MapUpdate, MapWithNodes, MindMap};
use mindmapper_layout::{LayoutDirection, LayoutOptions, LayoutPreset};

/// Layout request: an optional preset plus explicit overrides
///
/// Overrides beat the preset, which beats the defaults, so
/// `{"preset": "compact", "rankSep": 40}` does what it reads like.
/// An absent or empty body runs the default vertical layout.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutRequest {
    pub preset: Option<LayoutPreset>,
    pub direction: Option<LayoutDirection>,
    pub node_width: Option<f64>,
    pub node_height: Option<f64>,
    pub rank_sep: Option<f64>,
    pub node_sep: Option<f64>,
}

impl LayoutRequest {
    /// Resolve to concrete options
    fn into_options(self) -> LayoutOptions {
        let mut options = self.preset.map(LayoutPreset::options).unwrap_or_default();

        if let Some(direction) = self.direction {
            options.direction = direction;
        }
        if let Some(node_width) = self.node_width {
            options.node_width = node_width;
        }
        if let Some(node_height) = self.node_height {
            options.node_height = node_height;
        }
        if let Some(rank_sep) = self.rank_sep {
            options.rank_sep = rank_sep;
        }
        if let Some(node_sep) = self.node_sep {
            options.node_sep = node_sep;
        }

        options
    }
}

/// List all maps ordered by creation time
async fn list_maps(State(state): State<AppState>) -> Result<Json<Vec<MindMap>>, HttpError> {
    Ok(Json(state.maps.list_maps().await?))
}

/// Get a map by ID
async fn get_map(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MindMap>, HttpError> {
    Ok(Json(state.maps.get_map(&id).await?))
}

/// Get a map together with all its nodes
async fn get_map_nodes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MapWithNodes>, HttpError> {
    Ok(Json(state.maps.map_with_nodes(&id).await?))
}

/// List the maps owned by a user
async fn get_maps_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<MindMap>>, HttpError> {
    Ok(Json(state.maps.list_maps_by_user(&user_id).await?))
}

/// Create a map
///
/// # Request Body
///
/// `{ "userId": "...", "title": "..." }` - title defaults to
/// "Untitled Mindmap" when omitted.
async fn create_map(
    State(state): State<AppState>,
    Json(params): Json<CreateMap>,
) -> Result<(StatusCode, Json<MindMap>), HttpError> {
    let map = state.maps.create_map(params).await?;

    Ok((StatusCode::CREATED, Json(map)))
}

/// Rename a map
async fn update_map(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<MapUpdate>,
) -> Result<Json<AffectedCount>, HttpError> {
    let affected_count = state.maps.update_map(&id, update).await?;

    Ok(Json(AffectedCount { affected_count }))
}

/// Delete a map and every node in it
async fn delete_map(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, HttpError> {
    state.maps.delete_map(&id).await?;

    Ok(Json(Deleted::new("Map deleted successfully")))
}

/// Run the layout engine over a map and persist the result
///
/// Returns the map with its nodes at their new positions. A cycle in the
/// stored parent links answers 400 rather than hanging.
async fn layout_map(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<LayoutRequest>>,
) -> Result<Json<MapWithNodes>, HttpError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let map = state.maps.layout_map(&id, request.into_options()).await?;

    tracing::debug!("✅ Laid out map {} ({} nodes)", map.map.id, map.nodes.len());

    Ok(Json(map))
}

/// Create router with all map endpoints
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/maps", get(list_maps))
        .route("/api/maps", post(create_map))
        .route("/api/maps/:id", get(get_map))
        .route("/api/maps/:id", put(update_map))
        .route("/api/maps/:id", delete(delete_map))
        .route("/api/maps/:id/nodes", get(get_map_nodes))
        .route("/api/maps/:id/layout", post(layout_map))
        .route("/api/maps/user/:userId", get(get_maps_by_user))
        .with_state(state)
}

//! Node Endpoints
//!
//! Node CRUD and the hierarchy operations: reparenting and subtree
//! deletion.
//!
//! # Endpoints
//!
//! - `GET /api/nodes` - List all nodes
//! - `GET /api/nodes/:id` - Get one node
//! - `GET /api/nodes/map/:mapId` - Nodes belonging to a map
//! - `POST /api/nodes` - Create a node
//! - `PUT /api/nodes/:id` - Partial update
//! - `PATCH /api/nodes/:id/position` - Set coordinates
//! - `PATCH /api/nodes/:id/label` - Set the label
//! - `PATCH /api/nodes/:id/move` - Reparent (or detach to root)
//! - `DELETE /api/nodes/:id` - Delete the node and its whole subtree

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, patch, post, put},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::endpoints::AffectedCount;
use crate::{AppState, HttpError};
use mindmapper_core::models::{CreateNode, Node, NodeUpdate};

/// Request body for PATCH /nodes/:id/position
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRequest {
    #[serde(default)]
    pub pos_x: Option<f64>,
    #[serde(default)]
    pub pos_y: Option<f64>,
}

/// Request body for PATCH /nodes/:id/label
#[derive(Debug, Deserialize)]
pub struct LabelRequest {
    #[serde(default)]
    pub label: Option<String>,
}

/// Request body for PATCH /nodes/:id/move
///
/// An absent or null `parentId` moves the node to the root; anything else
/// must name a node in the same map that is not in the moved node's own
/// subtree.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    #[serde(default)]
    pub parent_id: Option<String>,
}

/// Acknowledgement for subtree deletion
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDeleted {
    pub success: bool,
    pub message: String,
    pub deleted_count: u64,
}

/// List all nodes across all maps
async fn list_nodes(State(state): State<AppState>) -> Result<Json<Vec<Node>>, HttpError> {
    Ok(Json(state.nodes.list_nodes().await?))
}

/// Get a node by ID
async fn get_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Node>, HttpError> {
    Ok(Json(state.nodes.get_node(&id).await?))
}

/// List the nodes of one map in `(created_at, id)` order
async fn get_nodes_by_map(
    State(state): State<AppState>,
    Path(map_id): Path<String>,
) -> Result<Json<Vec<Node>>, HttpError> {
    Ok(Json(state.nodes.nodes_by_map(&map_id).await?))
}

/// Create a node
///
/// # Request Body
///
/// `{ "mapId": "...", "label": "...", "parentId": ..., "posX": ..., ... }`
///
/// Only `mapId` is required; the label defaults to "New Node" and the
/// position to the origin.
async fn create_node(
    State(state): State<AppState>,
    Json(params): Json<CreateNode>,
) -> Result<(StatusCode, Json<Node>), HttpError> {
    let node = state.nodes.create_node(params).await?;

    tracing::debug!("✅ Created node {} in map {}", node.id, node.map_id);

    Ok((StatusCode::CREATED, Json(node)))
}

/// Apply a partial update to a node
///
/// `parentId` is tri-state here: absent leaves the parent alone, null
/// detaches to root, and a node id reparents with the usual checks.
async fn update_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<NodeUpdate>,
) -> Result<Json<AffectedCount>, HttpError> {
    let affected_count = state.nodes.update_node(&id, update).await?;

    Ok(Json(AffectedCount { affected_count }))
}

/// Set a node's position
async fn set_position(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PositionRequest>,
) -> Result<Json<AffectedCount>, HttpError> {
    let (pos_x, pos_y) = match (body.pos_x, body.pos_y) {
        (Some(x), Some(y)) => (x, y),
        _ => {
            return Err(HttpError::new(
                "Missing required fields: posX, posY",
                "VALIDATION_ERROR",
            ))
        }
    };

    let affected_count = state.nodes.set_position(&id, pos_x, pos_y).await?;

    Ok(Json(AffectedCount { affected_count }))
}

/// Set a node's label
async fn set_label(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<LabelRequest>,
) -> Result<Json<AffectedCount>, HttpError> {
    let label = body.label.ok_or_else(|| {
        HttpError::new("Missing required field: label", "VALIDATION_ERROR")
    })?;

    let affected_count = state.nodes.set_label(&id, &label).await?;

    Ok(Json(AffectedCount { affected_count }))
}

/// Move a node under a new parent, or to the root
///
/// Rejects parents from other maps and any move that would create a cycle.
async fn move_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<MoveRequest>,
) -> Result<Json<AffectedCount>, HttpError> {
    let affected_count = state.nodes.move_node(&id, body.parent_id).await?;

    Ok(Json(AffectedCount { affected_count }))
}

/// Delete a node and every descendant under it
async fn delete_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<NodeDeleted>, HttpError> {
    let deleted_count = state.nodes.delete_subtree(&id).await?;

    Ok(Json(NodeDeleted {
        success: true,
        message: "Node deleted successfully".to_string(),
        deleted_count,
    }))
}

/// Create router with all node endpoints
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/nodes", get(list_nodes))
        .route("/api/nodes", post(create_node))
        .route("/api/nodes/:id", get(get_node))
        .route("/api/nodes/:id", put(update_node))
        .route("/api/nodes/:id", delete(delete_node))
        .route("/api/nodes/:id/position", patch(set_position))
        .route("/api/nodes/:id/label", patch(set_label))
        .route("/api/nodes/:id/move", patch(move_node))
        .route("/api/nodes/map/:mapId", get(get_nodes_by_map))
        .with_state(state)
}

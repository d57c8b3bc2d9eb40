//! Map Service - Mindmap CRUD and Automatic Layout
//!
//! Business logic for maps: CRUD, the combined map-with-nodes read used by
//! map viewers, and the automatic layout operation that computes new node
//! positions from the hierarchy and persists them in one transaction.

use crate::db::MindmapStore;
use crate::models::{
    validate_title, CreateMap, MapUpdate, MapWithNodes, MindMap, ValidationError,
};
use crate::services::error::ServiceError;
use mindmapper_layout::{self as layout, LayoutEdge, LayoutNode, LayoutOptions};
use std::collections::HashSet;
use std::sync::Arc;

/// Core service for map operations
#[derive(Clone)]
pub struct MapService {
    /// Store for all persistence operations
    store: Arc<dyn MindmapStore>,
}

impl MapService {
    /// Create a new MapService backed by the given store
    pub fn new(store: Arc<dyn MindmapStore>) -> Self {
        Self { store }
    }

    /// Create a map for a user
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if `user_id` is missing or the title is invalid
    /// - `UserNotFound` if the owner does not exist
    pub async fn create_map(&self, params: CreateMap) -> Result<MindMap, ServiceError> {
        if params.user_id.is_empty() {
            return Err(ValidationError::MissingField("userId".to_string()).into());
        }

        let owner = self
            .store
            .get_user(&params.user_id)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?;
        if owner.is_none() {
            return Err(ServiceError::user_not_found(&params.user_id));
        }

        let map = MindMap::new(params.title, params.user_id);
        map.validate()?;

        self.store
            .create_map(map)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))
    }

    /// Get a map by ID
    ///
    /// # Errors
    ///
    /// `MapNotFound` if no such map exists
    pub async fn get_map(&self, id: &str) -> Result<MindMap, ServiceError> {
        self.store
            .get_map(id)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?
            .ok_or_else(|| ServiceError::map_not_found(id))
    }

    /// List all maps ordered by creation time
    pub async fn list_maps(&self) -> Result<Vec<MindMap>, ServiceError> {
        self.store
            .list_maps()
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))
    }

    /// List a user's maps ordered by creation time
    ///
    /// # Errors
    ///
    /// `UserNotFound` if the user does not exist
    pub async fn list_maps_by_user(&self, user_id: &str) -> Result<Vec<MindMap>, ServiceError> {
        let owner = self
            .store
            .get_user(user_id)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?;
        if owner.is_none() {
            return Err(ServiceError::user_not_found(user_id));
        }

        self.store
            .list_maps_by_user(user_id)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))
    }

    /// Get a map together with all its nodes in `(created_at, id)` order
    pub async fn map_with_nodes(&self, id: &str) -> Result<MapWithNodes, ServiceError> {
        let map = self.get_map(id).await?;
        let nodes = self
            .store
            .list_nodes_by_map(id)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?;

        Ok(MapWithNodes { map, nodes })
    }

    /// Apply a partial update to a map, returning the number of rows
    /// affected
    ///
    /// # Errors
    ///
    /// - `InvalidUpdate` if no fields are provided
    /// - `MapNotFound` if no such map exists
    /// - `ValidationFailed` for an invalid title
    pub async fn update_map(&self, id: &str, update: MapUpdate) -> Result<u64, ServiceError> {
        let title = match update.title {
            Some(title) => title,
            None => {
                return Err(ServiceError::invalid_update(
                    "No fields provided for update",
                ))
            }
        };

        // 404 before 400: a missing map wins over a bad title
        self.get_map(id).await?;
        validate_title(&title)?;

        self.store
            .update_map(id, &title)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))
    }

    /// Delete a map and all its nodes
    ///
    /// # Errors
    ///
    /// `MapNotFound` if no such map exists
    pub async fn delete_map(&self, id: &str) -> Result<u64, ServiceError> {
        let deleted = self
            .store
            .delete_map(id)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?;

        if deleted == 0 {
            return Err(ServiceError::map_not_found(id));
        }

        tracing::info!("Deleted map {}", id);
        Ok(deleted)
    }

    /// Recompute node positions from the hierarchy and persist them
    ///
    /// Parent links become layout edges; links that dangle (parent outside
    /// the map or a node pointing at itself) are ignored, matching how the
    /// hierarchy is read elsewhere. All positions are written in a single
    /// transaction and the freshly positioned map is returned.
    ///
    /// # Errors
    ///
    /// - `MapNotFound` if no such map exists
    /// - `LayoutFailed` if the stored parent pointers contain a cycle
    pub async fn layout_map(
        &self,
        id: &str,
        options: LayoutOptions,
    ) -> Result<MapWithNodes, ServiceError> {
        let map = self.get_map(id).await?;
        let nodes = self
            .store
            .list_nodes_by_map(id)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?;

        if nodes.is_empty() {
            return Ok(MapWithNodes { map, nodes });
        }

        let known_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

        let layout_nodes: Vec<LayoutNode> = nodes
            .iter()
            .map(|n| LayoutNode::new(n.id.clone()))
            .collect();

        let edges: Vec<LayoutEdge> = nodes
            .iter()
            .filter_map(|n| {
                n.parent_id
                    .as_deref()
                    .filter(|p| *p != n.id && known_ids.contains(*p))
                    .map(|p| LayoutEdge::new(p.to_string(), n.id.clone()))
            })
            .collect();

        let positioned = layout::layout(&layout_nodes, &edges, &options)?;

        let positions: Vec<(String, f64, f64)> = positioned
            .iter()
            .map(|p| (p.id.clone(), p.x, p.y))
            .collect();

        let updated = self
            .store
            .update_node_positions(&positions)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?;

        tracing::info!("Laid out map {}: repositioned {} nodes", id, updated);

        let nodes = self
            .store
            .list_nodes_by_map(id)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?;

        Ok(MapWithNodes { map, nodes })
    }
}

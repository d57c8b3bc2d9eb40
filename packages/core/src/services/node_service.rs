//! Node Service - Core CRUD and Hierarchy Operations
//!
//! The main business logic layer for nodes:
//!
//! - CRUD operations (create, read, update, delete)
//! - Hierarchy management (reparenting with cycle prevention, subtree
//!   deletion)
//! - Position and label updates for canvas interactions
//!
//! # Hierarchy rules
//!
//! A node's parent must exist and belong to the same map, and a node can
//! never be moved under itself or one of its own descendants. The checks
//! run in a fixed order so clients get stable errors: missing node, then
//! missing parent, then cross-map parent, then cycle.
//!
//! Deleting a node always deletes its whole subtree. The descendant set is
//! collected from the in-memory [`MapTree`] and removed in one transaction,
//! so readers never observe a half-deleted branch.

use crate::db::MindmapStore;
use crate::models::{
    validate_label, validate_position, CreateNode, Node, NodeUpdate, ValidationError,
};
use crate::services::error::ServiceError;
use crate::tree::MapTree;
use std::sync::Arc;

/// Core service for node CRUD and hierarchy operations
///
/// # Examples
///
/// ```no_run
/// use mindmapper_core::db::{DatabaseService, TursoStore};
/// use mindmapper_core::models::CreateNode;
/// use mindmapper_core::services::NodeService;
/// use std::path::PathBuf;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let db = Arc::new(DatabaseService::new(PathBuf::from("./data/test.db")).await?);
///     let service = NodeService::new(Arc::new(TursoStore::new(db)));
///
///     let node = service
///         .create_node(CreateNode {
///             map_id: "map-123".to_string(),
///             label: Some("Central idea".to_string()),
///             ..Default::default()
///         })
///         .await?;
///     println!("Created node: {}", node.id);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct NodeService {
    /// Store for all persistence operations
    store: Arc<dyn MindmapStore>,
}

impl NodeService {
    /// Create a new NodeService backed by the given store
    pub fn new(store: Arc<dyn MindmapStore>) -> Self {
        Self { store }
    }

    /// Create a node in a map
    ///
    /// Defaults are applied for everything the caller leaves out: label
    /// "New Node", position (0, 0), neutral rounded solid styling.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if `map_id` is missing or a field is invalid
    /// - `MapNotFound` if the map does not exist
    /// - `InvalidParent` if a parent was given but does not exist
    /// - `CrossMapParent` if the parent lives in another map
    pub async fn create_node(&self, params: CreateNode) -> Result<Node, ServiceError> {
        if params.map_id.is_empty() {
            return Err(ValidationError::MissingField("mapId".to_string()).into());
        }

        let map = self
            .store
            .get_map(&params.map_id)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?;
        if map.is_none() {
            return Err(ServiceError::map_not_found(&params.map_id));
        }

        if let Some(parent_id) = params.parent_id.as_deref() {
            let parent = self
                .store
                .get_node(parent_id)
                .await
                .map_err(|e| ServiceError::query_failed(e.to_string()))?
                .ok_or_else(|| ServiceError::invalid_parent(parent_id))?;

            if parent.map_id != params.map_id {
                return Err(ServiceError::cross_map_parent(parent_id));
            }
        }

        let node = Node::new(params);
        node.validate()?;

        self.store
            .create_node(node)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))
    }

    /// Get a node by ID
    ///
    /// # Errors
    ///
    /// `NodeNotFound` if no such node exists
    pub async fn get_node(&self, id: &str) -> Result<Node, ServiceError> {
        self.store
            .get_node(id)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?
            .ok_or_else(|| ServiceError::node_not_found(id))
    }

    /// List all nodes ordered by creation time
    pub async fn list_nodes(&self) -> Result<Vec<Node>, ServiceError> {
        self.store
            .list_nodes()
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))
    }

    /// List a map's nodes in `(created_at, id)` order
    ///
    /// # Errors
    ///
    /// `MapNotFound` if the map does not exist
    pub async fn nodes_by_map(&self, map_id: &str) -> Result<Vec<Node>, ServiceError> {
        let map = self
            .store
            .get_map(map_id)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?;
        if map.is_none() {
            return Err(ServiceError::map_not_found(map_id));
        }

        self.store
            .list_nodes_by_map(map_id)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))
    }

    /// Apply a partial update to a node, returning the number of rows
    /// affected
    ///
    /// `parent_id` distinguishes "leave alone" (field absent) from "make
    /// root" (explicit null) from "reparent" (a value); reparenting goes
    /// through the same checks as [`move_node`](Self::move_node). `icon`
    /// follows the same three states to set or clear the icon.
    ///
    /// # Errors
    ///
    /// - `InvalidUpdate` if no fields are provided
    /// - `NodeNotFound` if no such node exists
    /// - `InvalidParent` / `CrossMapParent` / `CircularReference` for bad
    ///   reparent targets
    /// - `ValidationFailed` if the merged node is invalid
    pub async fn update_node(&self, id: &str, update: NodeUpdate) -> Result<u64, ServiceError> {
        if update.is_empty() {
            return Err(ServiceError::invalid_update(
                "No fields provided for update",
            ));
        }

        let mut node = self.get_node(id).await?;

        if let Some(parent_update) = update.parent_id {
            match parent_update {
                Some(new_parent) => {
                    self.validate_parent(&node, &new_parent).await?;
                    node.parent_id = Some(new_parent);
                }
                None => node.parent_id = None,
            }
        }

        if let Some(label) = update.label {
            node.label = label;
        }
        if let Some(pos_x) = update.pos_x {
            node.pos_x = pos_x;
        }
        if let Some(pos_y) = update.pos_y {
            node.pos_y = pos_y;
        }
        if let Some(style_color) = update.style_color {
            node.style_color = style_color;
        }
        if let Some(style_shape) = update.style_shape {
            node.style_shape = style_shape;
        }
        if let Some(style_type) = update.style_type {
            node.style_type = style_type;
        }
        if let Some(text_rotation) = update.text_rotation {
            node.text_rotation = text_rotation;
        }
        if let Some(icon) = update.icon {
            node.icon = icon;
        }

        node.validate()?;

        self.store
            .update_node(&node)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))
    }

    /// Update a node's canvas position, returning the number of rows
    /// affected
    pub async fn set_position(&self, id: &str, pos_x: f64, pos_y: f64) -> Result<u64, ServiceError> {
        validate_position(pos_x, pos_y)?;

        let mut node = self.get_node(id).await?;
        node.set_position(pos_x, pos_y);

        self.store
            .update_node(&node)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))
    }

    /// Update a node's label, returning the number of rows affected
    pub async fn set_label(&self, id: &str, label: &str) -> Result<u64, ServiceError> {
        validate_label(label)?;

        let mut node = self.get_node(id).await?;
        node.set_label(label.to_string());

        self.store
            .update_node(&node)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))
    }

    /// Move a node to a new parent, or to the root when `new_parent_id` is
    /// `None`. Returns the number of rows affected.
    ///
    /// # Errors
    ///
    /// Checked in order: `NodeNotFound`, then `InvalidParent`, then
    /// `CrossMapParent`, then `CircularReference`.
    pub async fn move_node(
        &self,
        id: &str,
        new_parent_id: Option<String>,
    ) -> Result<u64, ServiceError> {
        let mut node = self.get_node(id).await?;

        if let Some(parent_id) = new_parent_id.as_deref() {
            self.validate_parent(&node, parent_id).await?;
        }

        node.parent_id = new_parent_id;

        self.store
            .update_node(&node)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))
    }

    /// Delete a node and its entire subtree, returning how many nodes were
    /// removed
    ///
    /// The subtree is collected from the in-memory hierarchy (worklist
    /// traversal, so depth is unbounded) and deleted in one transaction.
    ///
    /// # Errors
    ///
    /// `NodeNotFound` if the node does not exist
    pub async fn delete_subtree(&self, id: &str) -> Result<u64, ServiceError> {
        let node = self.get_node(id).await?;

        let tree = self.map_tree(&node.map_id).await?;
        let subtree = tree.subtree_ids(id);

        let deleted = self
            .store
            .delete_nodes(&subtree)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?;

        tracing::info!(
            "Deleted subtree rooted at {}: {} of {} nodes removed",
            id,
            deleted,
            subtree.len()
        );

        Ok(deleted)
    }

    /// Validate a reparent target for `node`
    ///
    /// The parent must exist, live in the same map, and not sit inside the
    /// node's own subtree.
    async fn validate_parent(&self, node: &Node, parent_id: &str) -> Result<(), ServiceError> {
        let parent = self
            .store
            .get_node(parent_id)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?
            .ok_or_else(|| ServiceError::invalid_parent(parent_id))?;

        if parent.map_id != node.map_id {
            return Err(ServiceError::cross_map_parent(parent_id));
        }

        let tree = self.map_tree(&node.map_id).await?;
        if tree.would_create_cycle(&node.id, parent_id) {
            return Err(ServiceError::circular_reference(format!(
                "Cannot move node {} under its own descendant {}",
                node.id, parent_id
            )));
        }

        Ok(())
    }

    /// Build the hierarchy index for a map from its current rows
    async fn map_tree(&self, map_id: &str) -> Result<MapTree, ServiceError> {
        let nodes = self
            .store
            .list_nodes_by_map(map_id)
            .await
            .map_err(|e| ServiceError::query_failed(e.to_string()))?;

        Ok(MapTree::build(&nodes))
    }
}

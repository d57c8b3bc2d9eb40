//! TursoStore - MindmapStore Implementation for the libsql Backend
//!
//! Implements the `MindmapStore` trait on top of `DatabaseService`. The
//! store is a thin delegation layer: SQL lives in the `db_*` methods, row
//! conversion lives here, business rules live in the services.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mindmapper_core::db::{DatabaseService, MindmapStore, TursoStore};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(DatabaseService::new(PathBuf::from("./data/test.db")).await?);
//!     let store: Arc<dyn MindmapStore> = Arc::new(TursoStore::new(db));
//!
//!     let node = store.get_node("node-123").await?;
//!
//!     Ok(())
//! }
//! ```

use crate::db::store::MindmapStore;
use crate::db::{DatabaseService, DbCreateNodeParams, DbUpdateNodeParams};
use crate::models::{MindMap, Node, Session, TokenKind, User};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use libsql::Row;
use std::sync::Arc;

/// Timestamps are stored in SQLite's CURRENT_TIMESTAMP format so that
/// `expires_at <= datetime('now')` compares correctly.
const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// MindmapStore implementation backed by libsql
///
/// A thin wrapper around DatabaseService: delegates every operation to the
/// extracted `db_*` methods and converts rows into models.
pub struct TursoStore {
    /// Underlying database service (extracted SQL operations)
    db: Arc<DatabaseService>,
}

impl TursoStore {
    /// Create a new TursoStore wrapper
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use mindmapper_core::db::{TursoStore, DatabaseService};
    /// # use std::sync::Arc;
    /// # use std::path::PathBuf;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let db = Arc::new(DatabaseService::new(PathBuf::from("./test.db")).await?);
    /// let store = TursoStore::new(db);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    /// Parse timestamp from database - handles both SQLite and RFC3339 formats
    ///
    /// SQLite CURRENT_TIMESTAMP returns: "YYYY-MM-DD HH:MM:SS"
    /// Imported data might use RFC3339: "YYYY-MM-DDTHH:MM:SSZ"
    fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, SQLITE_TIMESTAMP_FORMAT) {
            return Ok(naive.and_utc());
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }

        Err(anyhow::anyhow!(
            "Unable to parse timestamp '{}' as SQLite or RFC3339 format",
            s
        ))
    }

    /// Convert libsql::Row to User model
    ///
    /// Expected columns (in order): id, username, email, password_hash,
    /// created_at, modified_at
    fn row_to_user(row: &Row) -> Result<User> {
        let id: String = row.get(0).context("Failed to get id")?;
        let username: String = row.get(1).context("Failed to get username")?;
        let email: String = row.get(2).context("Failed to get email")?;
        let password_hash: String = row.get(3).context("Failed to get password_hash")?;
        let created_at_str: String = row.get(4).context("Failed to get created_at")?;
        let modified_at_str: String = row.get(5).context("Failed to get modified_at")?;

        let created_at =
            Self::parse_timestamp(&created_at_str).context("Failed to parse created_at")?;
        let modified_at =
            Self::parse_timestamp(&modified_at_str).context("Failed to parse modified_at")?;

        Ok(User {
            id,
            username,
            email,
            password_hash,
            created_at,
            modified_at,
        })
    }

    /// Convert libsql::Row to Session model
    ///
    /// Expected columns (in order): token, user_id, kind, expires_at,
    /// created_at
    fn row_to_session(row: &Row) -> Result<Session> {
        let token: String = row.get(0).context("Failed to get token")?;
        let user_id: String = row.get(1).context("Failed to get user_id")?;
        let kind_str: String = row.get(2).context("Failed to get kind")?;
        let expires_at_str: String = row.get(3).context("Failed to get expires_at")?;
        let created_at_str: String = row.get(4).context("Failed to get created_at")?;

        let kind: TokenKind = kind_str.parse().context("Failed to parse session kind")?;
        let expires_at =
            Self::parse_timestamp(&expires_at_str).context("Failed to parse expires_at")?;
        let created_at =
            Self::parse_timestamp(&created_at_str).context("Failed to parse created_at")?;

        Ok(Session {
            token,
            user_id,
            kind,
            expires_at,
            created_at,
        })
    }

    /// Convert libsql::Row to MindMap model
    ///
    /// Expected columns (in order): id, title, user_id, created_at,
    /// modified_at
    fn row_to_map(row: &Row) -> Result<MindMap> {
        let id: String = row.get(0).context("Failed to get id")?;
        let title: String = row.get(1).context("Failed to get title")?;
        let user_id: String = row.get(2).context("Failed to get user_id")?;
        let created_at_str: String = row.get(3).context("Failed to get created_at")?;
        let modified_at_str: String = row.get(4).context("Failed to get modified_at")?;

        let created_at =
            Self::parse_timestamp(&created_at_str).context("Failed to parse created_at")?;
        let modified_at =
            Self::parse_timestamp(&modified_at_str).context("Failed to parse modified_at")?;

        Ok(MindMap {
            id,
            title,
            user_id,
            created_at,
            modified_at,
        })
    }

    /// Convert libsql::Row to Node model
    ///
    /// This is the central conversion point for all node queries.
    ///
    /// Expected columns (in order): id, map_id, parent_id, label, pos_x,
    /// pos_y, style_color, style_shape, style_type, text_rotation, icon,
    /// created_at, modified_at
    fn row_to_node(row: &Row) -> Result<Node> {
        let id: String = row.get(0).context("Failed to get id")?;
        let map_id: String = row.get(1).context("Failed to get map_id")?;
        let parent_id: Option<String> = row.get(2).context("Failed to get parent_id")?;
        let label: String = row.get(3).context("Failed to get label")?;
        let pos_x: f64 = row.get(4).context("Failed to get pos_x")?;
        let pos_y: f64 = row.get(5).context("Failed to get pos_y")?;
        let style_color_str: String = row.get(6).context("Failed to get style_color")?;
        let style_shape_str: String = row.get(7).context("Failed to get style_shape")?;
        let style_type_str: String = row.get(8).context("Failed to get style_type")?;
        let text_rotation_str: String = row.get(9).context("Failed to get text_rotation")?;
        let icon: Option<String> = row.get(10).context("Failed to get icon")?;
        let created_at_str: String = row.get(11).context("Failed to get created_at")?;
        let modified_at_str: String = row.get(12).context("Failed to get modified_at")?;

        let created_at =
            Self::parse_timestamp(&created_at_str).context("Failed to parse created_at")?;
        let modified_at =
            Self::parse_timestamp(&modified_at_str).context("Failed to parse modified_at")?;

        Ok(Node {
            id,
            map_id,
            parent_id,
            label,
            pos_x,
            pos_y,
            style_color: style_color_str
                .parse()
                .context("Failed to parse style_color")?,
            style_shape: style_shape_str
                .parse()
                .context("Failed to parse style_shape")?,
            style_type: style_type_str
                .parse()
                .context("Failed to parse style_type")?,
            text_rotation: text_rotation_str
                .parse()
                .context("Failed to parse text_rotation")?,
            icon,
            created_at,
            modified_at,
        })
    }
}

#[async_trait]
impl MindmapStore for TursoStore {
    //
    // USER OPERATIONS
    //

    async fn create_user(&self, user: User) -> Result<User> {
        self.db
            .db_create_user(&user.id, &user.username, &user.email, &user.password_hash)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create user: {}", e))?;

        // Fetch and return the created user (timestamps are database-filled)
        self.get_user(&user.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found after creation"))
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        match self
            .db
            .db_get_user(id)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get user: {}", e))?
        {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        match self
            .db
            .db_get_user_by_email(email)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get user by email: {}", e))?
        {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        match self
            .db
            .db_get_user_by_username(username)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get user by username: {}", e))?
        {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut rows = self
            .db
            .db_list_users()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to list users: {}", e))?;

        let mut users = Vec::new();
        while let Some(row) = rows.next().await? {
            users.push(Self::row_to_user(&row)?);
        }

        Ok(users)
    }

    async fn update_user(&self, id: &str, username: &str, email: &str) -> Result<u64> {
        self.db
            .db_update_user(id, username, email)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to update user: {}", e))
    }

    async fn delete_user(&self, id: &str) -> Result<u64> {
        self.db
            .db_delete_user(id)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to delete user: {}", e))
    }

    //
    // SESSION OPERATIONS
    //

    async fn create_session(&self, session: Session) -> Result<Session> {
        // Stored pre-formatted so the expiry sweep can compare it against
        // datetime('now') lexicographically.
        let expires_at = session
            .expires_at
            .format(SQLITE_TIMESTAMP_FORMAT)
            .to_string();

        self.db
            .db_create_session(
                &session.token,
                &session.user_id,
                session.kind.as_str(),
                &expires_at,
            )
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create session: {}", e))?;

        self.get_session(&session.token)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Session not found after creation"))
    }

    async fn get_session(&self, token: &str) -> Result<Option<Session>> {
        match self
            .db
            .db_get_session(token)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get session: {}", e))?
        {
            Some(row) => Ok(Some(Self::row_to_session(&row)?)),
            None => Ok(None),
        }
    }

    async fn delete_session(&self, token: &str) -> Result<u64> {
        self.db
            .db_delete_session(token)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to delete session: {}", e))
    }

    async fn purge_expired_sessions(&self) -> Result<u64> {
        self.db
            .db_purge_expired_sessions()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to purge expired sessions: {}", e))
    }

    //
    // MAP OPERATIONS
    //

    async fn create_map(&self, map: MindMap) -> Result<MindMap> {
        self.db
            .db_create_map(&map.id, &map.title, &map.user_id)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create map: {}", e))?;

        self.get_map(&map.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Map not found after creation"))
    }

    async fn get_map(&self, id: &str) -> Result<Option<MindMap>> {
        match self
            .db
            .db_get_map(id)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get map: {}", e))?
        {
            Some(row) => Ok(Some(Self::row_to_map(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_maps(&self) -> Result<Vec<MindMap>> {
        let mut rows = self
            .db
            .db_list_maps()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to list maps: {}", e))?;

        let mut maps = Vec::new();
        while let Some(row) = rows.next().await? {
            maps.push(Self::row_to_map(&row)?);
        }

        Ok(maps)
    }

    async fn list_maps_by_user(&self, user_id: &str) -> Result<Vec<MindMap>> {
        let mut rows = self
            .db
            .db_list_maps_by_user(user_id)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to list maps by user: {}", e))?;

        let mut maps = Vec::new();
        while let Some(row) = rows.next().await? {
            maps.push(Self::row_to_map(&row)?);
        }

        Ok(maps)
    }

    async fn update_map(&self, id: &str, title: &str) -> Result<u64> {
        self.db
            .db_update_map(id, title)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to update map: {}", e))
    }

    async fn delete_map(&self, id: &str) -> Result<u64> {
        self.db
            .db_delete_map(id)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to delete map: {}", e))
    }

    //
    // NODE OPERATIONS
    //

    async fn create_node(&self, node: Node) -> Result<Node> {
        let params = DbCreateNodeParams {
            id: &node.id,
            map_id: &node.map_id,
            parent_id: node.parent_id.as_deref(),
            label: &node.label,
            pos_x: node.pos_x,
            pos_y: node.pos_y,
            style_color: node.style_color.as_str(),
            style_shape: node.style_shape.as_str(),
            style_type: node.style_type.as_str(),
            text_rotation: node.text_rotation.as_str(),
            icon: node.icon.as_deref(),
        };

        self.db
            .db_create_node(params)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create node: {}", e))?;

        self.get_node(&node.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Node not found after creation"))
    }

    async fn get_node(&self, id: &str) -> Result<Option<Node>> {
        match self
            .db
            .db_get_node(id)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get node: {}", e))?
        {
            Some(row) => Ok(Some(Self::row_to_node(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_nodes(&self) -> Result<Vec<Node>> {
        let mut rows = self
            .db
            .db_list_nodes()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to list nodes: {}", e))?;

        let mut nodes = Vec::new();
        while let Some(row) = rows.next().await? {
            nodes.push(Self::row_to_node(&row)?);
        }

        Ok(nodes)
    }

    async fn list_nodes_by_map(&self, map_id: &str) -> Result<Vec<Node>> {
        let mut rows = self
            .db
            .db_list_nodes_by_map(map_id)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to list nodes by map: {}", e))?;

        let mut nodes = Vec::new();
        while let Some(row) = rows.next().await? {
            nodes.push(Self::row_to_node(&row)?);
        }

        Ok(nodes)
    }

    async fn update_node(&self, node: &Node) -> Result<u64> {
        let params = DbUpdateNodeParams {
            id: &node.id,
            parent_id: node.parent_id.as_deref(),
            label: &node.label,
            pos_x: node.pos_x,
            pos_y: node.pos_y,
            style_color: node.style_color.as_str(),
            style_shape: node.style_shape.as_str(),
            style_type: node.style_type.as_str(),
            text_rotation: node.text_rotation.as_str(),
            icon: node.icon.as_deref(),
        };

        self.db
            .db_update_node(params)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to update node: {}", e))
    }

    async fn delete_nodes(&self, ids: &[String]) -> Result<u64> {
        self.db
            .db_delete_nodes(ids)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to delete nodes: {}", e))
    }

    async fn update_node_positions(&self, positions: &[(String, f64, f64)]) -> Result<u64> {
        self.db
            .db_update_node_positions(positions)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to update node positions: {}", e))
    }
}

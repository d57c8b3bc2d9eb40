//! MindmapStore Trait - Database Abstraction Layer
//!
//! Defines the `MindmapStore` trait that abstracts persistence for users,
//! sessions, maps and nodes. Services depend on the trait, not on a concrete
//! backend, so the libsql implementation can be swapped out (or faked in
//! tests) without touching business logic.
//!
//! All methods are async and implementations must be `Send + Sync` so the
//! store can be shared behind an `Arc` across Tokio tasks.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mindmapper_core::db::{DatabaseService, MindmapStore, TursoStore};
//! use mindmapper_core::models::{CreateUser, User};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(DatabaseService::new(PathBuf::from(":memory:")).await?);
//!     let store: Arc<dyn MindmapStore> = Arc::new(TursoStore::new(db));
//!
//!     let user = User::new(
//!         "alice".to_string(),
//!         "alice@example.com".to_string(),
//!         "argon2-hash".to_string(),
//!     );
//!     let created = store.create_user(user).await?;
//!     println!("Created user: {}", created.id);
//!     Ok(())
//! }
//! ```

use crate::models::{MindMap, Node, Session, User};
use anyhow::Result;
use async_trait::async_trait;

/// Abstraction layer for mindmap persistence operations
///
/// # Method Categories
///
/// - **Users**: 7 methods (CRUD plus email/username lookup)
/// - **Sessions**: 4 methods (issue, resolve, revoke, expiry sweep)
/// - **Maps**: 6 methods (CRUD plus per-user listing)
/// - **Nodes**: 7 methods (CRUD plus per-map listing and batch writes)
///
/// Update and delete methods return the number of rows affected, mirroring
/// what the HTTP layer reports to clients. Create methods take ownership of
/// the value and return the stored row with database-generated fields
/// (timestamps) filled in.
#[async_trait]
pub trait MindmapStore: Send + Sync {
    //
    // USER OPERATIONS
    //

    /// Create a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the email or username is already taken (UNIQUE
    /// constraint violation) or the database write fails. Callers that need
    /// a friendly duplicate error should check with `get_user_by_email` /
    /// `get_user_by_username` first.
    async fn create_user(&self, user: User) -> Result<User>;

    /// Get user by ID
    ///
    /// Returns `Ok(None)` if the user does not exist (not an error).
    async fn get_user(&self, id: &str) -> Result<Option<User>>;

    /// Get user by email. Emails are stored lowercase, so callers should
    /// lowercase before lookup.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Get user by username
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// List all users ordered by creation time
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Update username and email, returning the number of rows affected
    /// (0 when the user does not exist)
    async fn update_user(&self, id: &str, username: &str, email: &str) -> Result<u64>;

    /// Delete a user, returning the number of rows affected. Sessions, maps
    /// and nodes owned by the user cascade.
    async fn delete_user(&self, id: &str) -> Result<u64>;

    //
    // SESSION OPERATIONS
    //

    /// Persist a session token
    ///
    /// The returned session reflects what was stored; expiry is truncated to
    /// whole seconds by the storage format.
    async fn create_session(&self, session: Session) -> Result<Session>;

    /// Resolve a session by token
    ///
    /// Returns the session even if expired; callers decide how to treat
    /// expiry (`Session::is_expired`).
    async fn get_session(&self, token: &str) -> Result<Option<Session>>;

    /// Delete a session by token, returning the number of rows affected
    async fn delete_session(&self, token: &str) -> Result<u64>;

    /// Delete all expired sessions, returning the number removed
    async fn purge_expired_sessions(&self) -> Result<u64>;

    //
    // MAP OPERATIONS
    //

    /// Create a new map
    async fn create_map(&self, map: MindMap) -> Result<MindMap>;

    /// Get map by ID
    async fn get_map(&self, id: &str) -> Result<Option<MindMap>>;

    /// List all maps ordered by creation time
    async fn list_maps(&self) -> Result<Vec<MindMap>>;

    /// List maps owned by a user, ordered by creation time
    async fn list_maps_by_user(&self, user_id: &str) -> Result<Vec<MindMap>>;

    /// Update a map title, returning the number of rows affected
    async fn update_map(&self, id: &str, title: &str) -> Result<u64>;

    /// Delete a map, returning the number of rows affected. Its nodes
    /// cascade.
    async fn delete_map(&self, id: &str) -> Result<u64>;

    //
    // NODE OPERATIONS
    //

    /// Create a new node
    ///
    /// # Errors
    ///
    /// Returns an error if the map or parent does not exist (foreign key
    /// violation). Parent/map consistency checks beyond that (same-map
    /// parent, cycle prevention) live in the service layer.
    async fn create_node(&self, node: Node) -> Result<Node>;

    /// Get node by ID
    async fn get_node(&self, id: &str) -> Result<Option<Node>>;

    /// List all nodes ordered by creation time
    async fn list_nodes(&self) -> Result<Vec<Node>>;

    /// List every node of a map, ordered by `(created_at, id)`
    ///
    /// This is the read feeding hierarchy traversal and layout, so the
    /// ordering must stay deterministic.
    async fn list_nodes_by_map(&self, map_id: &str) -> Result<Vec<Node>>;

    /// Persist a full node row, returning the number of rows affected.
    /// Partial-update merging is the caller's job.
    async fn update_node(&self, node: &Node) -> Result<u64>;

    /// Delete a set of nodes atomically
    ///
    /// All rows are removed in a single transaction; a failure rolls the
    /// whole batch back. Used for subtree deletion, where the caller has
    /// already collected the descendant IDs.
    ///
    /// # Returns
    ///
    /// Number of rows actually deleted
    async fn delete_nodes(&self, ids: &[String]) -> Result<u64>;

    /// Apply `(id, pos_x, pos_y)` position updates atomically
    ///
    /// Used when persisting layout results so a map never ends up
    /// half-moved.
    async fn update_node_positions(&self, positions: &[(String, f64, f64)]) -> Result<u64>;
}

//! Database Connection Management
//!
//! Core database connection and schema initialization using libsql. The
//! schema is fixed (users, sessions, maps, nodes) and created with
//! `CREATE TABLE IF NOT EXISTS`, so opening a database is idempotent and no
//! migration step exists.
//!
//! # Database Connection Patterns
//!
//! **ALWAYS use `connect_with_timeout()` in async functions.** It configures
//! a 5-second busy timeout (concurrent writers wait and retry instead of
//! failing with `SQLITE_BUSY` when the Tokio runtime moves futures between
//! threads) and re-enables `foreign_keys` - SQLite scopes that pragma per
//! connection, and the cascade rules below depend on it.
//!
//! ```no_run
//! # use mindmapper_core::db::DatabaseService;
//! # use std::path::PathBuf;
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let db_service = DatabaseService::new(PathBuf::from(":memory:")).await?;
//! let conn = db_service.connect_with_timeout().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Use `connect()` only in single-threaded, synchronous contexts where the
//! connection will not be used across await points.

use crate::db::error::DatabaseError;
use libsql::{Builder, Database};
use std::path::PathBuf;
use std::sync::Arc;

// Column lists shared by the queries here and the row converters in
// TursoStore. Order matters: row_to_* reads columns by index.
const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, modified_at";
const SESSION_COLUMNS: &str = "token, user_id, kind, expires_at, created_at";
const MAP_COLUMNS: &str = "id, title, user_id, created_at, modified_at";
const NODE_COLUMNS: &str = "id, map_id, parent_id, label, pos_x, pos_y, \
     style_color, style_shape, style_type, text_rotation, icon, created_at, modified_at";

// SQLite's default host-parameter limit is 999; stay well under it when
// expanding IN (...) lists.
const SQL_VARIABLE_CHUNK: usize = 500;

/// Database service for managing the libsql connection and schema
///
/// # Examples
///
/// ```no_run
/// use mindmapper_core::db::DatabaseService;
/// use std::path::PathBuf;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let db_path = PathBuf::from("./data/mindmapper.db");
///     let db_service = DatabaseService::new(db_path).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseService {
    /// libsql database connection (wrapped in Arc for sharing)
    pub db: Arc<Database>,

    /// Path to the database file
    pub db_path: PathBuf,
}

/// Parameters for node insertion (avoids too-many-arguments lint)
pub struct DbCreateNodeParams<'a> {
    pub id: &'a str,
    pub map_id: &'a str,
    pub parent_id: Option<&'a str>,
    pub label: &'a str,
    pub pos_x: f64,
    pub pos_y: f64,
    pub style_color: &'a str,
    pub style_shape: &'a str,
    pub style_type: &'a str,
    pub text_rotation: &'a str,
    pub icon: Option<&'a str>,
}

/// Parameters for node update (avoids too-many-arguments lint)
pub struct DbUpdateNodeParams<'a> {
    pub id: &'a str,
    pub parent_id: Option<&'a str>,
    pub label: &'a str,
    pub pos_x: f64,
    pub pos_y: f64,
    pub style_color: &'a str,
    pub style_shape: &'a str,
    pub style_type: &'a str,
    pub text_rotation: &'a str,
    pub icon: Option<&'a str>,
}

impl DatabaseService {
    /// Create a new DatabaseService with the specified database path
    ///
    /// This will:
    /// 1. Ensure the parent directory exists (create if needed)
    /// 2. Open/create the database file
    /// 3. Initialize the schema (CREATE TABLE IF NOT EXISTS)
    /// 4. Enable SQLite features (WAL mode, foreign keys, busy timeout)
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if:
    /// - The parent directory cannot be created (permissions)
    /// - The database connection fails
    /// - Schema initialization fails
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        // Fresh files get one WAL checkpoint after schema creation, so rapid
        // open/query sequences in tests never observe a half-written schema.
        let is_new_database = !db_path.exists();

        if let Some(parent) = db_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::PermissionDenied {
                        DatabaseError::permission_denied(db_path.clone())
                    } else {
                        DatabaseError::DirectoryCreationFailed(e)
                    }
                })?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
        };

        service.initialize_schema(is_new_database).await?;

        Ok(service)
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements return rows, so we must use query() instead of
    /// execute(). This helper encapsulates that pattern.
    async fn execute_pragma(
        &self,
        conn: &libsql::Connection,
        pragma: &str,
    ) -> Result<(), DatabaseError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Initialize database schema and configuration
    ///
    /// Creates the four tables and their indexes with CREATE TABLE IF NOT
    /// EXISTS, so it is safe to call on every open.
    ///
    /// Cascade rules:
    /// - deleting a user removes their sessions and maps (and so their nodes)
    /// - deleting a map removes its nodes
    /// - deleting a node nulls the `parent_id` of surviving children; subtree
    ///   deletion removes the children in the same transaction, so SET NULL
    ///   only matters for rows outside the deleted set
    async fn initialize_schema(&self, is_new_database: bool) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        // WAL mode for better concurrency
        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id            TEXT PRIMARY KEY,
                username      TEXT NOT NULL UNIQUE,
                email         TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at    DATETIME DEFAULT CURRENT_TIMESTAMP,
                modified_at   DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to create users table: {}", e))
        })?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS sessions (
                token      TEXT PRIMARY KEY,
                user_id    TEXT NOT NULL,
                kind       TEXT NOT NULL,
                expires_at DATETIME NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to create sessions table: {}", e))
        })?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS maps (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL DEFAULT 'Untitled Mindmap',
                user_id     TEXT NOT NULL,
                created_at  DATETIME DEFAULT CURRENT_TIMESTAMP,
                modified_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )",
            (),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to create maps table: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS nodes (
                id            TEXT PRIMARY KEY,
                map_id        TEXT NOT NULL,
                parent_id     TEXT,
                label         TEXT NOT NULL DEFAULT 'New Node',
                pos_x         REAL NOT NULL DEFAULT 0,
                pos_y         REAL NOT NULL DEFAULT 0,
                style_color   TEXT NOT NULL DEFAULT 'neutral',
                style_shape   TEXT NOT NULL DEFAULT 'rounded',
                style_type    TEXT NOT NULL DEFAULT 'solid',
                text_rotation TEXT NOT NULL DEFAULT 'horizontal',
                icon          TEXT,
                created_at    DATETIME DEFAULT CURRENT_TIMESTAMP,
                modified_at   DATETIME DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (map_id) REFERENCES maps(id) ON DELETE CASCADE,
                FOREIGN KEY (parent_id) REFERENCES nodes(id) ON DELETE SET NULL
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to create nodes table: {}", e))
        })?;

        self.create_core_indexes(&conn).await?;

        if is_new_database {
            self.execute_pragma(&conn, "PRAGMA wal_checkpoint(TRUNCATE)")
                .await?;
        }

        Ok(())
    }

    /// Create core indexes
    ///
    /// Uniqueness of `users.email` / `users.username` is already indexed by
    /// their UNIQUE constraints; these cover foreign key lookups and list
    /// queries.
    async fn create_core_indexes(&self, conn: &libsql::Connection) -> Result<(), DatabaseError> {
        // Session lookups by owner, and the lazy expiry sweep
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id)",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!(
                "Failed to create index 'idx_sessions_user': {}",
                e
            ))
        })?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at)",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!(
                "Failed to create index 'idx_sessions_expires': {}",
                e
            ))
        })?;

        // Maps listed per user
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_maps_user ON maps(user_id)",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to create index 'idx_maps_user': {}", e))
        })?;

        // Nodes listed per map (the hot path for layout and rendering)
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_nodes_map ON nodes(map_id)",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to create index 'idx_nodes_map': {}", e))
        })?;

        // Hierarchy queries by parent
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_nodes_parent ON nodes(parent_id)",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!(
                "Failed to create index 'idx_nodes_parent': {}",
                e
            ))
        })?;

        // Sibling ordering is (created_at, id)
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_nodes_created ON nodes(created_at)",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!(
                "Failed to create index 'idx_nodes_created': {}",
                e
            ))
        })?;

        Ok(())
    }

    /// Get a synchronous connection to the database
    ///
    /// Only use in synchronous, single-threaded contexts. Async code must go
    /// through `connect_with_timeout()` so the busy timeout and
    /// per-connection pragmas are configured.
    pub fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        self.db.connect().map_err(DatabaseError::LibsqlError)
    }

    /// Get an async connection with busy timeout and foreign keys configured
    ///
    /// The 5-second busy timeout makes concurrent operations wait and retry
    /// instead of failing immediately when the database is locked.
    /// `foreign_keys` is re-enabled here because SQLite resets it on every
    /// new connection and the cascade deletes depend on it.
    pub async fn connect_with_timeout(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.connect()?;

        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;
        self.execute_pragma(&conn, "PRAGMA foreign_keys = ON").await?;

        Ok(conn)
    }

    //
    // USER OPERATIONS
    //

    /// Insert a user row. Timestamps are filled in by the database.
    pub async fn db_create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        conn.execute(
            "INSERT INTO users (id, username, email, password_hash) VALUES (?, ?, ?, ?)",
            (id, username, email, password_hash),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert user: {}", e)))?;

        Ok(())
    }

    /// Retrieve a single user by ID
    pub async fn db_get_user(&self, id: &str) -> Result<Option<libsql::Row>, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to prepare get_user query: {}", e))
            })?;

        let mut rows = stmt.query([id]).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute get_user query: {}", e))
        })?;

        rows.next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))
    }

    /// Retrieve a single user by email (emails are stored lowercase)
    pub async fn db_get_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<libsql::Row>, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM users WHERE email = ?",
                USER_COLUMNS
            ))
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!(
                    "Failed to prepare get_user_by_email query: {}",
                    e
                ))
            })?;

        let mut rows = stmt.query([email]).await.map_err(|e| {
            DatabaseError::sql_execution(format!(
                "Failed to execute get_user_by_email query: {}",
                e
            ))
        })?;

        rows.next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))
    }

    /// Retrieve a single user by username
    pub async fn db_get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<libsql::Row>, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM users WHERE username = ?",
                USER_COLUMNS
            ))
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!(
                    "Failed to prepare get_user_by_username query: {}",
                    e
                ))
            })?;

        let mut rows = stmt.query([username]).await.map_err(|e| {
            DatabaseError::sql_execution(format!(
                "Failed to execute get_user_by_username query: {}",
                e
            ))
        })?;

        rows.next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))
    }

    /// List all users ordered by creation time
    pub async fn db_list_users(&self) -> Result<libsql::Rows, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM users ORDER BY created_at ASC, id ASC",
                USER_COLUMNS
            ))
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to prepare list_users query: {}", e))
            })?;

        stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute list_users query: {}", e))
        })
    }

    /// Update username and email, returning the number of rows affected
    pub async fn db_update_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
    ) -> Result<u64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let rows_affected = conn
            .execute(
                "UPDATE users SET username = ?, email = ?, modified_at = CURRENT_TIMESTAMP \
                 WHERE id = ?",
                (username, email, id),
            )
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to update user: {}", e)))?;

        Ok(rows_affected)
    }

    /// Delete a user. Sessions and maps (and their nodes) cascade.
    pub async fn db_delete_user(&self, id: &str) -> Result<u64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let rows_affected = conn
            .execute("DELETE FROM users WHERE id = ?", [id])
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to delete user: {}", e)))?;

        Ok(rows_affected)
    }

    //
    // SESSION OPERATIONS
    //

    /// Insert a session row. `expires_at` must already be formatted as
    /// `YYYY-MM-DD HH:MM:SS` (UTC) so it compares correctly against
    /// `datetime('now')` in the expiry sweep.
    pub async fn db_create_session(
        &self,
        token: &str,
        user_id: &str,
        kind: &str,
        expires_at: &str,
    ) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        conn.execute(
            "INSERT INTO sessions (token, user_id, kind, expires_at) VALUES (?, ?, ?, ?)",
            (token, user_id, kind, expires_at),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert session: {}", e)))?;

        Ok(())
    }

    /// Retrieve a session by token
    pub async fn db_get_session(&self, token: &str) -> Result<Option<libsql::Row>, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM sessions WHERE token = ?",
                SESSION_COLUMNS
            ))
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to prepare get_session query: {}", e))
            })?;

        let mut rows = stmt.query([token]).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute get_session query: {}", e))
        })?;

        rows.next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))
    }

    /// Delete a session by token, returning the number of rows affected
    pub async fn db_delete_session(&self, token: &str) -> Result<u64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let rows_affected = conn
            .execute("DELETE FROM sessions WHERE token = ?", [token])
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to delete session: {}", e)))?;

        Ok(rows_affected)
    }

    /// Delete every expired session, returning the number removed
    pub async fn db_purge_expired_sessions(&self) -> Result<u64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let rows_affected = conn
            .execute(
                "DELETE FROM sessions WHERE expires_at <= datetime('now')",
                (),
            )
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to purge expired sessions: {}", e))
            })?;

        Ok(rows_affected)
    }

    //
    // MAP OPERATIONS
    //

    /// Insert a map row. Timestamps are filled in by the database.
    pub async fn db_create_map(
        &self,
        id: &str,
        title: &str,
        user_id: &str,
    ) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        conn.execute(
            "INSERT INTO maps (id, title, user_id) VALUES (?, ?, ?)",
            (id, title, user_id),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert map: {}", e)))?;

        Ok(())
    }

    /// Retrieve a single map by ID
    pub async fn db_get_map(&self, id: &str) -> Result<Option<libsql::Row>, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM maps WHERE id = ?", MAP_COLUMNS))
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to prepare get_map query: {}", e))
            })?;

        let mut rows = stmt.query([id]).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute get_map query: {}", e))
        })?;

        rows.next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))
    }

    /// List all maps ordered by creation time
    pub async fn db_list_maps(&self) -> Result<libsql::Rows, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM maps ORDER BY created_at ASC, id ASC",
                MAP_COLUMNS
            ))
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to prepare list_maps query: {}", e))
            })?;

        stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute list_maps query: {}", e))
        })
    }

    /// List maps owned by a user, ordered by creation time
    pub async fn db_list_maps_by_user(&self, user_id: &str) -> Result<libsql::Rows, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM maps WHERE user_id = ? ORDER BY created_at ASC, id ASC",
                MAP_COLUMNS
            ))
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!(
                    "Failed to prepare list_maps_by_user query: {}",
                    e
                ))
            })?;

        stmt.query([user_id]).await.map_err(|e| {
            DatabaseError::sql_execution(format!(
                "Failed to execute list_maps_by_user query: {}",
                e
            ))
        })
    }

    /// Update a map title, returning the number of rows affected
    pub async fn db_update_map(&self, id: &str, title: &str) -> Result<u64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let rows_affected = conn
            .execute(
                "UPDATE maps SET title = ?, modified_at = CURRENT_TIMESTAMP WHERE id = ?",
                (title, id),
            )
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to update map: {}", e)))?;

        Ok(rows_affected)
    }

    /// Delete a map. Its nodes cascade.
    pub async fn db_delete_map(&self, id: &str) -> Result<u64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let rows_affected = conn
            .execute("DELETE FROM maps WHERE id = ?", [id])
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to delete map: {}", e)))?;

        Ok(rows_affected)
    }

    //
    // NODE OPERATIONS
    //

    /// Insert a node row. Timestamps are filled in by the database.
    pub async fn db_create_node(&self, params: DbCreateNodeParams<'_>) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        conn.execute(
            "INSERT INTO nodes (id, map_id, parent_id, label, pos_x, pos_y, \
             style_color, style_shape, style_type, text_rotation, icon) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                params.id,
                params.map_id,
                params.parent_id,
                params.label,
                params.pos_x,
                params.pos_y,
                params.style_color,
                params.style_shape,
                params.style_type,
                params.text_rotation,
                params.icon,
            ),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert node: {}", e)))?;

        Ok(())
    }

    /// Retrieve a single node by ID
    pub async fn db_get_node(&self, id: &str) -> Result<Option<libsql::Row>, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn
            .prepare(&format!("SELECT {} FROM nodes WHERE id = ?", NODE_COLUMNS))
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to prepare get_node query: {}", e))
            })?;

        let mut rows = stmt.query([id]).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute get_node query: {}", e))
        })?;

        rows.next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))
    }

    /// List all nodes ordered by creation time
    pub async fn db_list_nodes(&self) -> Result<libsql::Rows, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM nodes ORDER BY created_at ASC, id ASC",
                NODE_COLUMNS
            ))
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to prepare list_nodes query: {}", e))
            })?;

        stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute list_nodes query: {}", e))
        })
    }

    /// List every node of a map
    ///
    /// Ordered by `(created_at, id)`: creation order with a stable tie-break,
    /// which keeps sibling order and layout output deterministic.
    pub async fn db_list_nodes_by_map(&self, map_id: &str) -> Result<libsql::Rows, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM nodes WHERE map_id = ? ORDER BY created_at ASC, id ASC",
                NODE_COLUMNS
            ))
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!(
                    "Failed to prepare list_nodes_by_map query: {}",
                    e
                ))
            })?;

        stmt.query([map_id]).await.map_err(|e| {
            DatabaseError::sql_execution(format!(
                "Failed to execute list_nodes_by_map query: {}",
                e
            ))
        })
    }

    /// Update a node row in full, returning the number of rows affected.
    /// Partial-update merging happens in the service layer.
    pub async fn db_update_node(&self, params: DbUpdateNodeParams<'_>) -> Result<u64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let rows_affected = conn
            .execute(
                "UPDATE nodes SET parent_id = ?, label = ?, pos_x = ?, pos_y = ?, \
                 style_color = ?, style_shape = ?, style_type = ?, text_rotation = ?, \
                 icon = ?, modified_at = CURRENT_TIMESTAMP WHERE id = ?",
                (
                    params.parent_id,
                    params.label,
                    params.pos_x,
                    params.pos_y,
                    params.style_color,
                    params.style_shape,
                    params.style_type,
                    params.text_rotation,
                    params.icon,
                    params.id,
                ),
            )
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to update node: {}", e)))?;

        Ok(rows_affected)
    }

    /// Delete a set of nodes in one transaction
    ///
    /// This is the write half of subtree deletion: the caller collects the
    /// subtree IDs, this method removes them atomically. Readers never see a
    /// partially deleted subtree, and a failed delete leaves the map
    /// unchanged.
    ///
    /// # Returns
    ///
    /// Number of rows actually deleted (already-gone IDs count as 0)
    pub async fn db_delete_nodes(&self, ids: &[String]) -> Result<u64, DatabaseError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let conn = self.connect_with_timeout().await?;

        conn.execute("BEGIN TRANSACTION", ()).await.map_err(|e| {
            DatabaseError::transaction_failed(format!("Failed to begin transaction: {}", e))
        })?;

        let mut deleted = 0u64;

        for chunk in ids.chunks(SQL_VARIABLE_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!("DELETE FROM nodes WHERE id IN ({})", placeholders);

            let id_refs: Vec<&str> = chunk.iter().map(String::as_str).collect();
            let result = conn
                .execute(&sql, libsql::params_from_iter(id_refs))
                .await;

            match result {
                Ok(rows_affected) => deleted += rows_affected,
                Err(e) => {
                    let _rollback = conn.execute("ROLLBACK", ()).await;
                    return Err(DatabaseError::transaction_failed(format!(
                        "Failed to delete nodes: {}",
                        e
                    )));
                }
            }
        }

        conn.execute("COMMIT", ()).await.map_err(|e| {
            DatabaseError::transaction_failed(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(deleted)
    }

    /// Apply a batch of `(id, pos_x, pos_y)` position updates in one
    /// transaction. Used when persisting layout results so a map never ends
    /// up half-moved.
    pub async fn db_update_node_positions(
        &self,
        positions: &[(String, f64, f64)],
    ) -> Result<u64, DatabaseError> {
        if positions.is_empty() {
            return Ok(0);
        }

        let conn = self.connect_with_timeout().await?;

        conn.execute("BEGIN TRANSACTION", ()).await.map_err(|e| {
            DatabaseError::transaction_failed(format!("Failed to begin transaction: {}", e))
        })?;

        let mut updated = 0u64;

        for (id, pos_x, pos_y) in positions {
            let result = conn
                .execute(
                    "UPDATE nodes SET pos_x = ?, pos_y = ?, modified_at = CURRENT_TIMESTAMP \
                     WHERE id = ?",
                    (*pos_x, *pos_y, id.as_str()),
                )
                .await;

            match result {
                Ok(rows_affected) => updated += rows_affected,
                Err(e) => {
                    let _rollback = conn.execute("ROLLBACK", ()).await;
                    return Err(DatabaseError::transaction_failed(format!(
                        "Failed to update position of node {}: {}",
                        id, e
                    )));
                }
            }
        }

        conn.execute("COMMIT", ()).await.map_err(|e| {
            DatabaseError::transaction_failed(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(updated)
    }
}

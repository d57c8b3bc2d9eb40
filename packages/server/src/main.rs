//! Mindmapper API Server Binary
//!
//! Starts the REST API over an embedded SQLite database. The schema is
//! created on first open, so pointing at a fresh path just works.
//!
//! # Usage
//!
//! ```bash
//! # Default settings (port 3000, ./data/mindmapper.db)
//! cargo run --bin mindmapper-server
//!
//! # Custom port and database location
//! PORT=8080 DATABASE_PATH=/var/lib/mindmapper/app.db cargo run --bin mindmapper-server
//! ```
//!
//! # Environment Variables
//!
//! - `PORT`: Server port (default: 3000)
//! - `DATABASE_PATH`: SQLite file (default: ./data/mindmapper.db)
//! - `CORS_ALLOW_ORIGIN`: Pin CORS to a single origin (default: any)
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use mindmapper_core::db::{DatabaseService, TursoStore};
use mindmapper_server::{start_server, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🚀 Mindmapper API Server");
    tracing::info!("==================================");

    // Get server port from environment or use default
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);

    tracing::info!("📡 Port: {}", port);

    let db_path = env::var("DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./data/mindmapper.db"));

    // Ensure the database directory exists (a bare filename has an empty
    // parent, which create_dir_all rejects)
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    tracing::info!("📦 Database: {}", db_path.display());

    // Initialize services
    tracing::info!("🔧 Initializing services...");

    let db = Arc::new(DatabaseService::new(db_path).await?);
    let store = Arc::new(TursoStore::new(db));
    let state = AppState::new(store);

    tracing::info!("✅ Services initialized");

    // Start HTTP server
    start_server(state, port).await?;

    Ok(())
}

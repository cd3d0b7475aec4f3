//! # Backbar Server
//!
//! REST API for the retail back-office SPA.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tracing init ──► config (env) ──► SQLite pool + migrations             │
//! │       │                                                                 │
//! │       ├── bootstrap admin user (empty users table only)                 │
//! │       │                                                                 │
//! │       └── axum router (CORS + request tracing) ──► serve                │
//! │                                 │                                       │
//! │                                 └── graceful shutdown on SIGINT/SIGTERM │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod auth;
mod config;
mod error;
mod excel;
mod routes;
mod state;

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::state::AppState;
use backbar_core::UserRole;
use backbar_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing; RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Backbar server...");

    // Load configuration
    let config = ServerConfig::load()?;
    info!(
        port = config.http_port,
        database = %config.database_path,
        "Configuration loaded"
    );

    // Connect to database (runs migrations)
    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Connected to SQLite");

    bootstrap_admin(&db, &config).await?;

    let state = AppState::new(db, config.clone());

    // The SPA is served from a separate origin during development.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!(%addr, "Starting HTTP server");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Creates the bootstrap admin login when the users table is empty, so a
/// fresh install can reach the user-management screen at all.
async fn bootstrap_admin(
    db: &Database,
    config: &ServerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if !db.users().list().await?.is_empty() {
        return Ok(());
    }

    let hash = auth::hash_password(&config.admin_password)
        .map_err(|e| format!("failed to hash bootstrap password: {}", e))?;
    db.users().insert("admin", &hash, UserRole::Admin).await?;

    warn!("Created bootstrap 'admin' user - change its password before going live");
    Ok(())
}

/// Resolves when the process receives SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

//! WasteGraph HTTP server
//!
//! Serves the waste-collection road network over JSON: node, edge and
//! constraint CRUD, constraint-aware shortest paths with a replayable
//! history log, greedy coloring and smart node deletion.

#![warn(missing_docs)]

pub mod config;
pub mod dto;
pub mod handlers;
pub mod service;

use config::ServerConfig;
use handlers::{create_router, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wastegraph_store::{SqliteStore, StoreError};

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Database could not be opened
    #[error("Failed to open database: {0}")]
    Store(#[from] StoreError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Start the HTTP server
///
/// Opens the database, builds the router and serves until the process ends.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    init_tracing(&config);

    info!("Starting WasteGraph server");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path);
    info!("History page size: {}", config.history_limit);

    let store = SqliteStore::new(&config.database_path)?;
    let state = AppState::new(store, config.history_limit);

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}

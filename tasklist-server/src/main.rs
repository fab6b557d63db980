//! tasklist server -- REST service over a single task collection.
//!
//! # Usage
//!
//! ```bash
//! # SQLite file ./tasklist.db on 0.0.0.0:3000
//! cargo run --bin tasklist-server
//!
//! # Another database on a custom port
//! cargo run --bin tasklist-server -- --port 8080 \
//!     --database-url sqlite:///var/lib/tasklist/tasks.db
//!
//! # Or via environment variables
//! PORT=8080 DATABASE_URL=memory:// cargo run --bin tasklist-server
//! ```

use std::sync::Arc;

use clap::Parser;
use tasklist_server::api::ApiState;
use tasklist_server::config::{ServerCliArgs, ServerConfig};
use tasklist_server::server;
use tasklist_server::store::DocumentStore;

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(addr = %config.bind_addr(), "starting tasklist server");

    // A store that cannot be opened is fatal.
    let store = match DocumentStore::open(&config.database_url, config.max_connections).await {
        Ok(store) => {
            tracing::info!(backend = store.kind(), "task store connected");
            store
        }
        Err(e) => {
            tracing::error!(error = %e, url = %config.database_url, "startup error");
            std::process::exit(1);
        }
    };

    let state = Arc::new(ApiState::new(store));

    match server::start_server_with_state(&config.bind_addr(), state, &config.allowed_origins)
        .await
    {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, origins = ?config.allowed_origins, "task server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "task server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start task server");
            std::process::exit(1);
        }
    }
}

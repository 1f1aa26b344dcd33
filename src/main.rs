//! statesync - shared state server
//!
//! Serves one JSON document over HTTP and pushes every accepted write to
//! all connected WebSocket clients.

use statesync::config::Config;
use statesync::database::Database;
use statesync::server::{self, state::AppState};
use statesync::store::StateService;
use std::sync::Arc;
use tokio::sync::Notify;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("statesync=info")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(?config, "Configuration loaded");

    let db = Database::open(&config.db_path)?;
    let state = Arc::new(AppState::new(StateService::new(db)));

    // Ctrl+C triggers graceful shutdown
    let shutdown = Arc::new(Notify::new());
    let shutdown_ctrlc = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        tracing::info!("Shutdown signal received");
        shutdown_ctrlc.notify_one();
    })?;

    let addr = config.socket_addr();
    println!("statesync listening on http://{}", addr);
    println!("   • GET  /state  - Current shared state");
    println!("   • POST /state  - Replace shared state");
    println!("   • GET  /health - Health check");
    println!("   • WS   /       - Real-time state pushes");

    server::serve(state, addr, async move { shutdown.notified().await }).await?;

    tracing::info!("statesync has exited");
    Ok(())
}

//! SplitLedger API Server
//!
//! Main entry point for the SplitLedger backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use splitledger_api::{AppState, create_router};
use splitledger_core::ledger::LedgerStore;
use splitledger_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "splitledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Create the ledger store
    let store = LedgerStore::new(&config.ledger);
    info!(
        lock_timeout_ms = config.ledger.lock_timeout_ms,
        append_retries = config.ledger.append_retries,
        "Ledger store configured"
    );

    // Create application state
    let state = AppState {
        store: Arc::new(store),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

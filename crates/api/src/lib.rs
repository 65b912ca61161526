//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes over the ledger core
//! - Request/response types (amounts cross as integer minor units)
//! - Error-to-HTTP mapping

pub mod routes;

use axum::Router;
use splitledger_core::ledger::LedgerStore;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The ledger store, the sole source of truth.
    pub store: Arc<LedgerStore>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

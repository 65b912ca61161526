//! API route definitions.

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use splitledger_core::ledger::LedgerError;
use splitledger_shared::AppError;

use crate::AppState;

pub mod groups;
pub mod health;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(health::routes()).merge(groups::routes())
}

/// Fallback for unmatched routes, so 404s are JSON like everything else.
pub(crate) async fn not_found() -> Response {
    app_error_response(&AppError::NotFound("no such route".to_string()))
}

/// Maps a coarse application error to an HTTP response.
pub(crate) fn app_error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string(),
        })),
    )
        .into_response()
}

/// Maps a ledger error to an HTTP response.
///
/// Invariant violations are logged as internal faults; validation and
/// lookup errors are reported to the caller with enough detail to
/// correct the request.
pub(crate) fn ledger_error_response(err: &LedgerError) -> Response {
    if err.is_internal() {
        error!(error = %err, code = err.error_code(), "Internal invariant violated");
    }

    let status = StatusCode::from_u16(err.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string(),
        })),
    )
        .into_response()
}

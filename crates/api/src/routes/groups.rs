//! Group, expense, settlement, and balance routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use splitledger_core::ledger::{ExpenseInput, SettlementInput};
use splitledger_shared::types::{Amount, GroupId, PageRequest, PageResponse, UserId};

use crate::AppState;

use super::ledger_error_response;

/// Creates the group routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups", post(create_group))
        .route("/groups/{group_id}", get(get_group))
        .route("/groups/{group_id}/members", post(add_member))
        .route("/groups/{group_id}/expenses", post(record_expense))
        .route("/groups/{group_id}/settlements", post(record_settlement))
        .route("/groups/{group_id}/balances", get(get_balances))
        .route(
            "/groups/{group_id}/settle-suggestions",
            get(get_settle_suggestions),
        )
        .route("/groups/{group_id}/ledger", get(get_ledger))
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for creating a group.
#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    /// Group name.
    pub name: String,
    /// The creating user, who becomes the sole initial member.
    pub creator_id: UserId,
}

/// Request body for adding a member.
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// The user to add.
    pub user_id: UserId,
}

/// Request body for recording an expense.
///
/// The amount is an integer in minor currency units; decimal formatting
/// is a presentation-layer concern.
#[derive(Debug, Deserialize)]
pub struct RecordExpenseRequest {
    /// The member who paid.
    pub payer_id: UserId,
    /// Amount in minor units (must be positive).
    pub amount: Amount,
    /// What the expense was for.
    pub description: String,
    /// The members to split between.
    pub split_between: Vec<UserId>,
}

/// Request body for recording a settlement.
#[derive(Debug, Deserialize)]
pub struct RecordSettlementRequest {
    /// The member who paid.
    pub payer_id: UserId,
    /// The member who was paid.
    pub payee_id: UserId,
    /// Amount in minor units (must be positive).
    pub amount: Amount,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/groups` - Create a new group.
async fn create_group(
    State(state): State<AppState>,
    Json(payload): Json<CreateGroupRequest>,
) -> impl IntoResponse {
    match state.store.create_group(&payload.name, payload.creator_id) {
        Ok(group) => {
            info!(group_id = %group.id, name = %group.name, "Group created");
            (StatusCode::CREATED, Json(json!({ "group": group }))).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/groups/{group_id}` - Group details.
async fn get_group(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
) -> impl IntoResponse {
    match state.store.group(group_id).await {
        Ok(group) => (StatusCode::OK, Json(json!({ "group": group }))).into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/groups/{group_id}/members` - Add a member to a group.
async fn add_member(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
    Json(payload): Json<AddMemberRequest>,
) -> impl IntoResponse {
    match state.store.add_member(group_id, payload.user_id).await {
        Ok(group) => {
            info!(group_id = %group_id, user_id = %payload.user_id, "Member added");
            (StatusCode::OK, Json(json!({ "group": group }))).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/groups/{group_id}/expenses` - Record a shared expense.
async fn record_expense(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
    Json(payload): Json<RecordExpenseRequest>,
) -> impl IntoResponse {
    let input = ExpenseInput {
        payer: payload.payer_id,
        amount: payload.amount,
        description: payload.description,
        split_between: payload.split_between.into_iter().collect(),
    };

    match state.store.append_expense(group_id, input).await {
        Ok(expense) => {
            info!(
                group_id = %group_id,
                expense_id = %expense.id,
                amount = %expense.amount,
                "Expense recorded"
            );
            (StatusCode::CREATED, Json(json!({ "expense": expense }))).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/groups/{group_id}/settlements` - Record a settlement payment.
async fn record_settlement(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
    Json(payload): Json<RecordSettlementRequest>,
) -> impl IntoResponse {
    let input = SettlementInput {
        payer: payload.payer_id,
        payee: payload.payee_id,
        amount: payload.amount,
    };

    match state.store.append_settlement(group_id, input).await {
        Ok(settlement) => {
            info!(
                group_id = %group_id,
                settlement_id = %settlement.id,
                amount = %settlement.amount,
                "Settlement recorded"
            );
            (
                StatusCode::CREATED,
                Json(json!({ "settlement": settlement })),
            )
                .into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/groups/{group_id}/balances` - Net balance per member.
async fn get_balances(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
) -> impl IntoResponse {
    match state.store.balances(group_id).await {
        Ok(balances) => (StatusCode::OK, Json(json!({ "balances": balances }))).into_response(),
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/groups/{group_id}/settle-suggestions` - Suggested settlements.
async fn get_settle_suggestions(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
) -> impl IntoResponse {
    match state.store.settle_suggestions(group_id).await {
        Ok(suggestions) => {
            (StatusCode::OK, Json(json!({ "suggestions": suggestions }))).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/groups/{group_id}/ledger` - Paginated activity feed, insertion order.
async fn get_ledger(
    State(state): State<AppState>,
    Path(group_id): Path<GroupId>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    match state.store.entries(group_id).await {
        Ok(entries) => {
            let total = entries.len() as u64;
            let data: Vec<_> = entries
                .into_iter()
                .skip(page.offset())
                .take(page.limit())
                .collect();

            let response = PageResponse::new(data, page.page, page.per_page, total);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

//! Returns API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use validator::Validate;

use crate::api::convert::{TransactionView, transaction_views};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::OrderStatus;
use crate::db::repository::{TransactionRepository, record_id};
use crate::orders::BulkOutcome;
use crate::utils::{AppResponse, AppResult, ok};

const MODULE: &str = "returns";

#[derive(Debug, Deserialize, Validate)]
pub struct ApproveRequest {
    #[validate(length(min = 1, message = "at least one transaction id"))]
    pub ids: Vec<String>,
}

/// Pending returns for the caller's branch
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<TransactionView>>>> {
    let branch = record_id("branch", &user.branch_id)?;
    let rows = TransactionRepository::new(state.db.clone())
        .list_by_branch_status(&branch, OrderStatus::PendingReturn)
        .await?;
    Ok(ok(transaction_views(rows)))
}

/// Approve pending returns. Stock stays out; returned goods re-enter
/// inventory through a manual adjustment if at all.
pub async fn approve(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ApproveRequest>,
) -> AppResult<Json<AppResponse<BulkOutcome>>> {
    payload.validate()?;
    let outcome = state.lifecycle().approve_returns(&payload.ids).await?;
    state.audit.record(
        &user.user_id,
        &user.branch_id,
        MODULE,
        "approve",
        &format!("Approved {} of {} returns", outcome.updated, payload.ids.len()),
    );
    Ok(ok(outcome))
}

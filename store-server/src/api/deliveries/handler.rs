//! Deliveries API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;
use validator::Validate;

use crate::api::convert::{TransactionView, transaction_views};
use crate::auth::{CurrentUser, DRIVER_ROLE};
use crate::core::ServerState;
use crate::db::models::OrderStatus;
use crate::db::repository::{TransactionRepository, record_id};
use crate::orders::BulkOutcome;
use crate::utils::{AppResponse, AppResult, ok};

const MODULE: &str = "deliveries";

#[derive(Debug, Deserialize, Validate)]
pub struct BulkIdsRequest {
    #[validate(length(min = 1, message = "at least one transaction id"))]
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CancelRequest {
    #[validate(length(min = 1, message = "at least one transaction id"))]
    pub ids: Vec<String>,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AssignDriverRequest {
    #[validate(length(min = 1, message = "at least one transaction id"))]
    pub ids: Vec<String>,
    #[validate(length(min = 1, message = "driver is required"))]
    pub driver: String,
}

/// Active deliveries for the caller's branch. A driver only sees the
/// deliveries assigned to them.
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<Vec<TransactionView>>>> {
    let branch = record_id("branch", &user.branch_id)?;
    let repo = TransactionRepository::new(state.db.clone());
    let mut rows = repo
        .list_by_branch_status(&branch, OrderStatus::ForDelivery)
        .await?;

    if user.role_id == DRIVER_ROLE {
        let driver = record_id("user", &user.user_id)?;
        rows.retain(|tx| tx.driver.as_ref() == Some(&driver));
    }

    Ok(ok(transaction_views(rows)))
}

/// Mark deliveries completed
pub async fn complete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<BulkIdsRequest>,
) -> AppResult<Json<AppResponse<BulkOutcome>>> {
    payload.validate()?;
    let outcome = state.lifecycle().complete_deliveries(&payload.ids).await?;
    state.audit.record(
        &user.user_id,
        &user.branch_id,
        MODULE,
        "complete",
        &format!("Completed {} of {} deliveries", outcome.updated, payload.ids.len()),
    );
    Ok(ok(outcome))
}

/// Cancel deliveries, restoring their reserved stock
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CancelRequest>,
) -> AppResult<Json<AppResponse<BulkOutcome>>> {
    payload.validate()?;
    let outcome = state
        .lifecycle()
        .cancel_deliveries(&payload.ids, &payload.reason)
        .await?;
    state.audit.record(
        &user.user_id,
        &user.branch_id,
        MODULE,
        "cancel",
        &format!("Cancelled {} of {} deliveries", outcome.updated, payload.ids.len()),
    );
    Ok(ok(outcome))
}

/// Assign a driver to deliveries still underway
pub async fn assign_driver(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<AssignDriverRequest>,
) -> AppResult<Json<AppResponse<BulkOutcome>>> {
    payload.validate()?;
    let outcome = state
        .lifecycle()
        .assign_driver(&payload.ids, &payload.driver)
        .await?;
    state.audit.record(
        &user.user_id,
        &user.branch_id,
        MODULE,
        "assign_driver",
        &format!(
            "Assigned driver {} to {} deliveries",
            payload.driver, outcome.updated
        ),
    );
    Ok(ok(outcome))
}

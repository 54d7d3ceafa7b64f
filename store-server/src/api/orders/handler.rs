//! Orders API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::api::convert::{TransactionView, transaction_views};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::OrderStatus;
use crate::db::repository::{TransactionRepository, record_id};
use crate::orders::{CancelOrReturnRequest, OnsiteOrderRequest, RateOrderRequest};
use crate::utils::{AppResponse, AppResult, ok};

const MODULE: &str = "orders";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
}

/// Staff view: every order of the caller's branch, newest first
pub async fn list_branch(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<AppResponse<Vec<TransactionView>>>> {
    let branch = record_id("branch", &user.branch_id)?;
    let repo = TransactionRepository::new(state.db.clone());
    let rows = match query.status {
        Some(status) => repo.list_by_branch_status(&branch, status).await?,
        None => repo.list_by_branch(&branch).await?,
    };
    Ok(ok(transaction_views(rows)))
}

/// List the caller's own orders, optionally filtered by status
pub async fn list_own(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<AppResponse<Vec<TransactionView>>>> {
    let customer = record_id("customer", &user.user_id)?;
    let repo = TransactionRepository::new(state.db.clone());
    let rows = match query.status {
        Some(status) => repo.list_by_customer_status(&customer, status).await?,
        None => repo.list_by_customer(&customer).await?,
    };
    Ok(ok(transaction_views(rows)))
}

/// Record a walk-in sale against the staff member's branch
pub async fn create_onsite(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OnsiteOrderRequest>,
) -> AppResult<Json<AppResponse<TransactionView>>> {
    let tx = state
        .checkout()
        .checkout_onsite(&user.branch_id, payload)
        .await?;
    state.audit.record(
        &user.user_id,
        &user.branch_id,
        MODULE,
        "onsite_sale",
        &format!("Recorded onsite sale {:?}", tx.id),
    );
    Ok(ok(TransactionView::from(tx)))
}

/// Cancel an order or request its return
pub async fn cancel_or_return(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<CancelOrReturnRequest>,
) -> AppResult<Json<AppResponse<TransactionView>>> {
    let target = payload.status;
    let tx = state.lifecycle().cancel_or_return(&id, payload).await?;
    state.audit.record(
        &user.user_id,
        &user.branch_id,
        MODULE,
        "cancel_or_return",
        &format!("Order {id} moved to {target}"),
    );
    Ok(ok(TransactionView::from(tx)))
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    /// Recomputed product average after this rating
    pub average: f64,
}

/// Rate the product behind one of the caller's orders
pub async fn rate(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<RateOrderRequest>,
) -> AppResult<Json<AppResponse<RateResponse>>> {
    let average = state.rating().rate_order(&user.user_id, &id, payload).await?;
    Ok(ok(RateResponse { average }))
}

//! Checkout API Handlers

use axum::{Json, extract::State};

use crate::api::convert::{TransactionView, transaction_views};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::gateway::CreatedInvoice;
use crate::orders::{CodCheckoutRequest, GatewayCheckoutRequest, ReconcileOutcome};
use crate::utils::{AppResponse, AppResult, ok, ok_with_message};

/// Cash-on-delivery checkout
pub async fn checkout_cod(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CodCheckoutRequest>,
) -> AppResult<Json<AppResponse<Vec<TransactionView>>>> {
    let created = state.checkout().checkout_cod(&user.user_id, payload).await?;
    let count = created.len();
    Ok(ok_with_message(
        transaction_views(created),
        format!("Created {count} orders"),
    ))
}

/// GCash checkout: returns the invoice the customer pays at
pub async fn checkout_gcash(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<GatewayCheckoutRequest>,
) -> AppResult<Json<AppResponse<CreatedInvoice>>> {
    let invoice = state
        .checkout()
        .checkout_gateway(&user.user_id, payload)
        .await?;
    Ok(ok(invoice))
}

/// Reconcile the caller's unpaid orders against the payment provider
pub async fn reconcile(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<AppResponse<ReconcileOutcome>>> {
    let outcome = state.reconcile().reconcile_customer(&user.user_id).await?;
    Ok(ok(outcome))
}

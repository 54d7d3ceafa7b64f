//! Checkout API Module
//!
//! Customer-facing checkout plus on-demand payment reconciliation.

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// Checkout router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/checkout", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/cod", post(handler::checkout_cod))
        .route("/gcash", post(handler::checkout_gcash))
        .route("/reconcile", post(handler::reconcile))
}

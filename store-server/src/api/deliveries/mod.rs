//! Deliveries API Module
//!
//! Staff delivery board for the caller's branch. Drivers see only their own
//! assignments.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Deliveries router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/deliveries", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/complete", post(handler::complete))
        .route("/cancel", post(handler::cancel))
        .route("/driver", post(handler::assign_driver))
}

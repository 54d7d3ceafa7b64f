//! Orders API Module
//!
//! Customer order history and per-order actions, plus the staff-side
//! onsite (walk-in) sale.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Orders router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_branch))
        .route("/mine", get(handler::list_own))
        .route("/onsite", post(handler::create_onsite))
        .route("/{id}/cancel-or-return", post(handler::cancel_or_return))
        .route("/{id}/rate", post(handler::rate))
}

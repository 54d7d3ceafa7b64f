//! Returns API Module
//!
//! Staff approval queue for pending returns.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Returns router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/returns", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/approve", post(handler::approve))
}

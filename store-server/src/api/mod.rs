//! API Routes
//!
//! - [`health`] - health checks (public)
//! - [`checkout`] - customer checkout and payment reconciliation
//! - [`orders`] - branch order board, customer history, onsite sales,
//!   cancel/return, rating
//! - [`deliveries`] - staff delivery board (complete, cancel, assign driver)
//! - [`returns`] - staff return approvals
//!
//! Everything except `/health` requires a bearer token; handlers take
//! [`crate::auth::CurrentUser`] and trust its `{user, branch, role}` claims.

pub mod convert;

pub mod checkout;
pub mod deliveries;
pub mod health;
pub mod orders;
pub mod returns;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// Assemble the full application router
pub fn create_router(state: ServerState) -> Router {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(checkout::router())
        .merge(orders::router())
        .merge(deliveries::router())
        .merge(returns::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

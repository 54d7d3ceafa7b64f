//! Order Workflow Domain
//!
//! The order lifecycle and its stock-reconciliation invariant:
//!
//! - [`inventory`] - the inventory ledger, sole mutation path for stock
//! - [`checkout`] - converts cart lines into transactions (COD/gateway/onsite)
//! - [`lifecycle`] - staff and customer status transitions
//! - [`reconcile`] - pull-based sync with the external payment gateway
//! - [`rating`] - per-product average rating recomputation
//!
//! Stock is decremented when an order is created (optimistic reservation)
//! and restored exactly once on cancellation or expiry. Every transition is
//! a guarded conditional update, so replays are no-ops.

pub mod checkout;
pub mod inventory;
pub mod lifecycle;
pub mod rating;
pub mod reconcile;

pub use checkout::{
    CheckoutLine, CheckoutService, CodCheckoutRequest, GatewayCheckoutRequest, OnsiteOrderRequest,
};
pub use inventory::{InventoryLedger, StockDirection};
pub use lifecycle::{BulkOutcome, CancelOrReturnRequest, LifecycleService};
pub use rating::{RateOrderRequest, RatingService};
pub use reconcile::{ReconcileOutcome, ReconcileService};

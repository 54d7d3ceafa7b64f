//! Order Lifecycle
//!
//! Staff bulk operations (complete, cancel, approve returns, assign driver)
//! and the customer-facing cancel-or-return request. Each item in a bulk
//! batch is handled independently; a transaction that is missing or already
//! past the required state is skipped, never an error for the batch.
//!
//! Inventory effects are asymmetric on purpose: a cancellation restores the
//! reserved stock, an approved return does not.

use serde::{Deserialize, Serialize};
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

use super::inventory::{InventoryLedger, StockDirection};
use crate::db::models::{OrderStatus, Transaction};
use crate::db::repository::{TransactionRepository, TransitionFields, record_id};
use crate::utils::{AppError, AppResult};

/// Result of a bulk transition
///
/// `skipped` counts ids that were unknown, malformed, or not in a state the
/// transition leaves from. `failed` counts items whose status moved but whose
/// stock restoration errored; the log carries the detail.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkOutcome {
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelOrReturnRequest {
    /// Target state: `CANCELLED` or `PENDING_RETURN`
    pub status: OrderStatus,
    pub cancel_reason: Option<String>,
    pub return_reason: Option<String>,
}

#[derive(Clone)]
pub struct LifecycleService {
    transactions: TransactionRepository,
    ledger: InventoryLedger,
}

impl LifecycleService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            transactions: TransactionRepository::new(db.clone()),
            ledger: InventoryLedger::new(db),
        }
    }

    /// Restore the stock a transaction reserved at creation
    async fn restore_stock(&self, tx: &Transaction) -> AppResult<()> {
        let variant_id = tx.variant.as_ref().map(|v| v.id.as_str());
        self.ledger
            .apply(&tx.product, variant_id, tx.quantity, StockDirection::Increment)
            .await?;
        Ok(())
    }

    /// Mark deliveries as completed, stamping the delivery date
    pub async fn complete_deliveries(&self, ids: &[String]) -> AppResult<BulkOutcome> {
        let now = crate::utils::now_millis();
        let mut outcome = BulkOutcome::default();
        for raw in ids {
            let Ok(id) = self.transactions.parse_id(raw) else {
                tracing::warn!(id = %raw, "Skipping malformed transaction id");
                outcome.skipped += 1;
                continue;
            };
            let updated = self
                .transactions
                .transition(
                    &id,
                    &[OrderStatus::ForDelivery],
                    OrderStatus::Completed,
                    TransitionFields {
                        delivery_date: Some(now),
                        ..Default::default()
                    },
                )
                .await?;
            match updated {
                Some(_) => outcome.updated += 1,
                None => outcome.skipped += 1,
            }
        }
        Ok(outcome)
    }

    /// Cancel deliveries and restore their reserved stock
    pub async fn cancel_deliveries(&self, ids: &[String], reason: &str) -> AppResult<BulkOutcome> {
        let mut outcome = BulkOutcome::default();
        for raw in ids {
            let Ok(id) = self.transactions.parse_id(raw) else {
                tracing::warn!(id = %raw, "Skipping malformed transaction id");
                outcome.skipped += 1;
                continue;
            };
            let updated = self
                .transactions
                .transition(
                    &id,
                    &[OrderStatus::ForDelivery],
                    OrderStatus::Cancelled,
                    TransitionFields {
                        cancel_reason: Some(reason.to_string()),
                        ..Default::default()
                    },
                )
                .await?;
            match updated {
                Some(tx) => match self.restore_stock(&tx).await {
                    Ok(()) => outcome.updated += 1,
                    Err(e) => {
                        tracing::error!(
                            transaction = %id,
                            error = %e,
                            "Cancelled but stock restoration failed"
                        );
                        outcome.failed += 1;
                    }
                },
                None => outcome.skipped += 1,
            }
        }
        Ok(outcome)
    }

    /// Approve pending returns. No stock movement.
    pub async fn approve_returns(&self, ids: &[String]) -> AppResult<BulkOutcome> {
        let mut outcome = BulkOutcome::default();
        for raw in ids {
            let Ok(id) = self.transactions.parse_id(raw) else {
                tracing::warn!(id = %raw, "Skipping malformed transaction id");
                outcome.skipped += 1;
                continue;
            };
            let updated = self
                .transactions
                .transition(
                    &id,
                    &[OrderStatus::PendingReturn],
                    OrderStatus::Returned,
                    TransitionFields::default(),
                )
                .await?;
            match updated {
                Some(_) => outcome.updated += 1,
                None => outcome.skipped += 1,
            }
        }
        Ok(outcome)
    }

    /// Assign a driver to deliveries still underway
    pub async fn assign_driver(&self, ids: &[String], driver: &str) -> AppResult<BulkOutcome> {
        let driver = record_id("user", driver)?;
        let mut outcome = BulkOutcome::default();
        for raw in ids {
            let Ok(id) = self.transactions.parse_id(raw) else {
                tracing::warn!(id = %raw, "Skipping malformed transaction id");
                outcome.skipped += 1;
                continue;
            };
            match self.transactions.assign_driver(&id, &driver).await? {
                Some(_) => outcome.updated += 1,
                None => outcome.skipped += 1,
            }
        }
        Ok(outcome)
    }

    /// Customer-initiated cancellation or return request on a single order.
    ///
    /// Cancellation is allowed from `TO_PAY`/`FOR_DELIVERY` and restores
    /// stock; a return request is allowed from `FOR_DELIVERY`/`COMPLETED`
    /// and moves to `PENDING_RETURN` awaiting staff approval. A replay (or a
    /// request from any other state) is rejected without side effects.
    pub async fn cancel_or_return(
        &self,
        transaction_id: &str,
        request: CancelOrReturnRequest,
    ) -> AppResult<Transaction> {
        let id = self.transactions.parse_id(transaction_id)?;

        match request.status {
            OrderStatus::Cancelled => {
                let updated = self
                    .transactions
                    .transition(
                        &id,
                        OrderStatus::CANCELLABLE,
                        OrderStatus::Cancelled,
                        TransitionFields {
                            cancel_reason: request.cancel_reason,
                            ..Default::default()
                        },
                    )
                    .await?
                    .ok_or_else(|| {
                        AppError::business_rule(format!(
                            "Transaction {id} cannot be cancelled in its current state"
                        ))
                    })?;
                self.restore_stock(&updated).await?;
                Ok(updated)
            }
            OrderStatus::PendingReturn => self
                .transactions
                .transition(
                    &id,
                    OrderStatus::RETURNABLE,
                    OrderStatus::PendingReturn,
                    TransitionFields {
                        return_reason: request.return_reason,
                        ..Default::default()
                    },
                )
                .await?
                .ok_or_else(|| {
                    AppError::business_rule(format!(
                        "Transaction {id} cannot be returned in its current state"
                    ))
                }),
            other => Err(AppError::validation(format!(
                "Unsupported target status {other}, expected CANCELLED or PENDING_RETURN"
            ))),
        }
    }
}

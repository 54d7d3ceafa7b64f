//! Payment Reconciliation
//!
//! Pull-based sync of a customer's gateway-paid orders. There is no webhook:
//! every `TO_PAY` transaction is checked against the provider on demand, and
//! the outcome is folded into the local state machine.
//!
//! A paid invoice releases the order for delivery with no inventory change
//! (stock was already reserved at checkout). An expired invoice cancels the
//! order and restores the reserved stock. Provider errors skip the affected
//! order and leave it for the next pass.

use std::sync::Arc;

use serde::Serialize;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

use super::inventory::{InventoryLedger, StockDirection};
use crate::db::models::{OrderStatus, Transaction};
use crate::db::repository::{
    PaymentRepository, TransactionRepository, TransitionFields, record_id,
};
use crate::gateway::{InvoiceStatus, PaymentGateway};
use crate::utils::AppResult;

const EXPIRED_REASON: &str = "Payment invoice expired";

/// Summary of one reconciliation pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileOutcome {
    /// Moved to `FOR_DELIVERY` because the invoice was paid or settled
    pub settled: usize,
    /// Cancelled with stock restored because the invoice expired
    pub expired: usize,
    /// Invoice still pending, left as is
    pub pending: usize,
    /// Missing payment record, provider error, or concurrent transition
    pub skipped: usize,
}

#[derive(Clone)]
pub struct ReconcileService {
    gateway: Arc<dyn PaymentGateway>,
    transactions: TransactionRepository,
    payments: PaymentRepository,
    ledger: InventoryLedger,
}

impl ReconcileService {
    pub fn new(db: Surreal<Db>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            gateway,
            transactions: TransactionRepository::new(db.clone()),
            payments: PaymentRepository::new(db.clone()),
            ledger: InventoryLedger::new(db),
        }
    }

    /// Reconcile all of a customer's `TO_PAY` orders against the provider.
    ///
    /// Safe to call any number of times: transitions are guarded, so an
    /// order settled by an earlier pass (or a concurrent one) just stops
    /// matching the `TO_PAY` filter.
    pub async fn reconcile_customer(&self, customer: &str) -> AppResult<ReconcileOutcome> {
        let customer = record_id("customer", customer)?;
        let open = self
            .transactions
            .list_by_customer_status(&customer, OrderStatus::ToPay)
            .await?;

        let mut outcome = ReconcileOutcome::default();
        for tx in open {
            self.reconcile_one(&tx, &mut outcome).await?;
        }

        tracing::info!(
            customer = %customer,
            settled = outcome.settled,
            expired = outcome.expired,
            pending = outcome.pending,
            skipped = outcome.skipped,
            "Reconciliation pass finished"
        );
        Ok(outcome)
    }

    async fn reconcile_one(
        &self,
        tx: &Transaction,
        outcome: &mut ReconcileOutcome,
    ) -> AppResult<()> {
        let Some(id) = tx.id.as_ref() else {
            outcome.skipped += 1;
            return Ok(());
        };

        let Some(payment) = self.payments.latest_for_transaction(id).await? else {
            tracing::warn!(transaction = %id, "TO_PAY order has no payment record");
            outcome.skipped += 1;
            return Ok(());
        };

        let status = match self.gateway.invoice_status(&payment.invoice_id).await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(
                    transaction = %id,
                    invoice = %payment.invoice_id,
                    error = %e,
                    "Invoice poll failed, leaving order for the next pass"
                );
                outcome.skipped += 1;
                return Ok(());
            }
        };

        if status.is_paid() {
            let updated = self
                .transactions
                .transition(
                    id,
                    &[OrderStatus::ToPay],
                    OrderStatus::ForDelivery,
                    TransitionFields::default(),
                )
                .await?;
            match updated {
                Some(_) => outcome.settled += 1,
                None => outcome.skipped += 1,
            }
            return Ok(());
        }

        match status {
            InvoiceStatus::Expired => {
                let updated = self
                    .transactions
                    .transition(
                        id,
                        &[OrderStatus::ToPay],
                        OrderStatus::Cancelled,
                        TransitionFields {
                            cancel_reason: Some(EXPIRED_REASON.to_string()),
                            ..Default::default()
                        },
                    )
                    .await?;
                match updated {
                    Some(cancelled) => {
                        let variant_id = cancelled.variant.as_ref().map(|v| v.id.as_str());
                        self.ledger
                            .apply(
                                &cancelled.product,
                                variant_id,
                                cancelled.quantity,
                                StockDirection::Increment,
                            )
                            .await?;
                        outcome.expired += 1;
                    }
                    None => outcome.skipped += 1,
                }
            }
            InvoiceStatus::Pending => outcome.pending += 1,
            other => {
                tracing::warn!(
                    transaction = %id,
                    invoice = %payment.invoice_id,
                    status = ?other,
                    "Unhandled invoice status, leaving order as is"
                );
                outcome.pending += 1;
            }
        }
        Ok(())
    }
}

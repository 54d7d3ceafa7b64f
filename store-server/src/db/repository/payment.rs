//! Gateway Payment Repository
//!
//! Append-only linkage between transactions and external invoices. A retried
//! checkout appends fresh records; `latest_for_transaction` picks the newest.

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::GatewayPayment;
use crate::utils::now_millis;

const PAYMENT_TABLE: &str = "gateway_payment";

#[derive(Clone)]
pub struct PaymentRepository {
    base: BaseRepository,
}

impl PaymentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(
        &self,
        transaction: &RecordId,
        invoice_id: &str,
    ) -> RepoResult<GatewayPayment> {
        let record = GatewayPayment {
            id: None,
            transaction: transaction.clone(),
            invoice_id: invoice_id.to_string(),
            created_at: now_millis(),
        };
        let created: Option<GatewayPayment> = self
            .base
            .db()
            .create(PAYMENT_TABLE)
            .content(record)
            .await?;
        created.ok_or_else(|| RepoError::Database("Payment create returned no record".into()))
    }

    /// Newest payment record for a transaction, if any
    pub async fn latest_for_transaction(
        &self,
        transaction: &RecordId,
    ) -> RepoResult<Option<GatewayPayment>> {
        let rows: Vec<GatewayPayment> = self
            .base
            .db()
            .query(
                "SELECT * FROM gateway_payment \
                 WHERE transaction = $transaction \
                 ORDER BY created_at DESC LIMIT 1",
            )
            .bind(("transaction", transaction.clone()))
            .await?
            .take(0)?;
        Ok(rows.into_iter().next())
    }
}

//! Transaction Repository
//!
//! All status mutations are guarded conditional updates: the status write
//! carries `WHERE status IN <allowed-from>`, so a transition from an invalid
//! or already-advanced state matches no row and returns `None`. This is what
//! makes cancellation and reconciliation replays no-ops.

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{OrderStatus, Transaction, TransactionCreate};
use crate::utils::now_millis;

const TRANSACTION_TABLE: &str = "transaction";

/// Optional field writes applied together with a status transition
#[derive(Debug, Clone, Default)]
pub struct TransitionFields {
    pub cancel_reason: Option<String>,
    pub return_reason: Option<String>,
    pub delivery_date: Option<i64>,
}

#[derive(Clone)]
pub struct TransactionRepository {
    base: BaseRepository,
}

impl TransactionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub fn parse_id(&self, id: &str) -> RepoResult<RecordId> {
        record_id(TRANSACTION_TABLE, id)
    }

    pub async fn create(&self, data: TransactionCreate) -> RepoResult<Transaction> {
        let tx = Transaction::new(data, now_millis());
        let created: Option<Transaction> = self
            .base
            .db()
            .create(TRANSACTION_TABLE)
            .content(tx)
            .await?;
        created.ok_or_else(|| RepoError::Database("Transaction create returned no record".into()))
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Transaction>> {
        let tx: Option<Transaction> = self.base.db().select(id.clone()).await?;
        Ok(tx)
    }

    /// Fetch a transaction or fail with a descriptive not-found error
    pub async fn get(&self, id: &RecordId) -> RepoResult<Transaction> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Transaction {} not found", id)))
    }

    pub async fn list_by_branch(&self, branch: &RecordId) -> RepoResult<Vec<Transaction>> {
        let rows: Vec<Transaction> = self
            .base
            .db()
            .query("SELECT * FROM transaction WHERE branch = $branch ORDER BY created_at DESC")
            .bind(("branch", branch.clone()))
            .await?
            .take(0)?;
        Ok(rows)
    }

    pub async fn list_by_branch_status(
        &self,
        branch: &RecordId,
        status: OrderStatus,
    ) -> RepoResult<Vec<Transaction>> {
        let rows: Vec<Transaction> = self
            .base
            .db()
            .query(
                "SELECT * FROM transaction \
                 WHERE branch = $branch AND status = $status \
                 ORDER BY created_at DESC",
            )
            .bind(("branch", branch.clone()))
            .bind(("status", status))
            .await?
            .take(0)?;
        Ok(rows)
    }

    pub async fn list_by_customer(&self, customer: &RecordId) -> RepoResult<Vec<Transaction>> {
        let rows: Vec<Transaction> = self
            .base
            .db()
            .query("SELECT * FROM transaction WHERE customer = $customer ORDER BY created_at DESC")
            .bind(("customer", customer.clone()))
            .await?
            .take(0)?;
        Ok(rows)
    }

    pub async fn list_by_customer_status(
        &self,
        customer: &RecordId,
        status: OrderStatus,
    ) -> RepoResult<Vec<Transaction>> {
        let rows: Vec<Transaction> = self
            .base
            .db()
            .query(
                "SELECT * FROM transaction \
                 WHERE customer = $customer AND status = $status \
                 ORDER BY created_at DESC",
            )
            .bind(("customer", customer.clone()))
            .bind(("status", status))
            .await?
            .take(0)?;
        Ok(rows)
    }

    /// Guarded status transition.
    ///
    /// Returns the updated row when the transaction was in one of
    /// `allowed_from`, `None` otherwise (already transitioned, invalid state,
    /// or unknown id). Extra fields are only written when set.
    pub async fn transition(
        &self,
        id: &RecordId,
        allowed_from: &[OrderStatus],
        to: OrderStatus,
        fields: TransitionFields,
    ) -> RepoResult<Option<Transaction>> {
        let mut query = String::from("UPDATE transaction SET status = $to, updated_at = $now");
        if fields.cancel_reason.is_some() {
            query.push_str(", cancel_reason = $cancel_reason");
        }
        if fields.return_reason.is_some() {
            query.push_str(", return_reason = $return_reason");
        }
        if fields.delivery_date.is_some() {
            query.push_str(", delivery_date = $delivery_date");
        }
        query.push_str(" WHERE id = $id AND status IN $from RETURN AFTER");

        let mut resp = self
            .base
            .db()
            .query(query)
            .bind(("id", id.clone()))
            .bind(("to", to))
            .bind(("from", allowed_from.to_vec()))
            .bind(("now", now_millis()))
            .bind(("cancel_reason", fields.cancel_reason))
            .bind(("return_reason", fields.return_reason))
            .bind(("delivery_date", fields.delivery_date))
            .await?;
        let rows: Vec<Transaction> = resp.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Assign a driver to a transaction still out for delivery
    pub async fn assign_driver(
        &self,
        id: &RecordId,
        driver: &RecordId,
    ) -> RepoResult<Option<Transaction>> {
        let mut resp = self
            .base
            .db()
            .query(
                "UPDATE transaction SET driver = $driver, updated_at = $now \
                 WHERE id = $id AND status = $status \
                 RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("driver", driver.clone()))
            .bind(("status", OrderStatus::ForDelivery))
            .bind(("now", now_millis()))
            .await?;
        let rows: Vec<Transaction> = resp.take(0)?;
        Ok(rows.into_iter().next())
    }
}

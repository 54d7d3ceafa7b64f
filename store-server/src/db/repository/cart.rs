//! Cart Repository
//!
//! The order workflow only needs two things from the cart: lines to convert
//! at checkout, and deleting the consumed ones afterwards.

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::CartLine;
use crate::utils::now_millis;

const CART_TABLE: &str = "cart";

#[derive(Clone)]
pub struct CartRepository {
    base: BaseRepository,
}

impl CartRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(
        &self,
        customer: &RecordId,
        product: &RecordId,
        quantity: i64,
        variant_id: Option<String>,
    ) -> RepoResult<CartLine> {
        let now = now_millis();
        let line = CartLine {
            id: None,
            customer: customer.clone(),
            product: product.clone(),
            quantity,
            variant_id,
            created_at: now,
            updated_at: now,
        };
        let created: Option<CartLine> = self.base.db().create(CART_TABLE).content(line).await?;
        created.ok_or_else(|| RepoError::Database("Cart create returned no record".into()))
    }

    pub async fn list_by_customer(&self, customer: &RecordId) -> RepoResult<Vec<CartLine>> {
        let rows: Vec<CartLine> = self
            .base
            .db()
            .query("SELECT * FROM cart WHERE customer = $customer ORDER BY created_at ASC")
            .bind(("customer", customer.clone()))
            .await?
            .take(0)?;
        Ok(rows)
    }

    /// Delete the cart lines consumed by a checkout. Unknown ids are ignored.
    pub async fn delete_many(&self, ids: &[String]) -> RepoResult<()> {
        let mut record_ids = Vec::with_capacity(ids.len());
        for id in ids {
            record_ids.push(record_id(CART_TABLE, id)?);
        }
        self.base
            .db()
            .query("DELETE cart WHERE id IN $ids")
            .bind(("ids", record_ids))
            .await?;
        Ok(())
    }
}

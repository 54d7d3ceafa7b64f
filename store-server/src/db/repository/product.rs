//! Product Repository
//!
//! Reads plus the two stock-bearing writes: the compare-and-swap stock
//! update used by the inventory ledger, and the derived-rating write.

use std::collections::BTreeMap;

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{Product, ProductCreate, Variant};
use crate::utils::now_millis;

const PRODUCT_TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub fn parse_id(&self, id: &str) -> RepoResult<RecordId> {
        record_id(PRODUCT_TABLE, id)
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Product>> {
        let product: Option<Product> = self.base.db().select(id.clone()).await?;
        Ok(product)
    }

    /// Fetch a product or fail with a descriptive not-found error
    pub async fn get(&self, id: &RecordId) -> RepoResult<Product> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let product = Product::new(data, now_millis());
        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;
        created.ok_or_else(|| RepoError::Database("Product create returned no record".into()))
    }

    /// Conditionally write a stock adjustment.
    ///
    /// The write only lands if the aggregate `stocks` still equals the value
    /// observed by the caller's read (`observed`); a concurrent adjustment in
    /// between leaves the row untouched and returns `None` so the caller can
    /// re-read and retry. `stocks_after` accumulates the signed delta
    /// server-side - it is a running counter, not a copy of `stocks`.
    pub async fn try_stock_write(
        &self,
        id: &RecordId,
        observed: i64,
        new_stocks: i64,
        delta: i64,
        variations: BTreeMap<String, Variant>,
    ) -> RepoResult<Option<Product>> {
        let mut resp = self
            .base
            .db()
            .query(
                "UPDATE product SET \
                    stocks_before = $observed, \
                    stocks = $stocks, \
                    stocks_after = stocks_after + $delta, \
                    variations = $variations, \
                    updated_at = $now \
                 WHERE id = $id AND stocks = $observed \
                 RETURN AFTER",
            )
            .bind(("id", id.clone()))
            .bind(("observed", observed))
            .bind(("stocks", new_stocks))
            .bind(("delta", delta))
            .bind(("variations", variations))
            .bind(("now", now_millis()))
            .await?;
        let rows: Vec<Product> = resp.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Persist a recomputed average rating
    pub async fn set_rating(&self, id: &RecordId, rating: f64) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE product SET rating = $rating, updated_at = $now WHERE id = $id")
            .bind(("id", id.clone()))
            .bind(("rating", rating))
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }
}

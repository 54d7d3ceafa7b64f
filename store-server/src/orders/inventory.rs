//! Inventory Ledger
//!
//! The only code path allowed to touch product stock counters. Every
//! adjustment is read-modify-conditional-write: the write carries the
//! observed aggregate count and only lands if it still holds, so two
//! concurrent checkouts of the same product can never both apply against
//! the same snapshot. A lost race re-reads and retries.
//!
//! Counts may go negative; there is deliberately no lower bound. Oversell
//! shows up in reporting instead of rejecting checkouts.

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use crate::db::models::{Product, Variant};
use crate::db::repository::{ProductRepository, RepoError, RepoResult};

/// A lost race means another writer landed between read and write; under
/// realistic checkout contention a handful of retries always converges.
const MAX_RETRIES: usize = 32;

/// Direction of a stock adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDirection {
    /// Reserve stock at order creation
    Decrement,
    /// Restore stock on cancellation or invoice expiry
    Increment,
}

impl StockDirection {
    fn signed(&self, quantity: i64) -> i64 {
        match self {
            StockDirection::Decrement => -quantity,
            StockDirection::Increment => quantity,
        }
    }
}

#[derive(Clone)]
pub struct InventoryLedger {
    products: ProductRepository,
}

impl InventoryLedger {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            products: ProductRepository::new(db),
        }
    }

    /// Apply a signed stock adjustment to a product and, when given, the
    /// chosen variant.
    ///
    /// Both counters move by the same quantity: the aggregate `stocks` and
    /// the variant's own count. The variant map is rewritten whole with the
    /// one entry replaced, which keeps the write inside the same conditional
    /// update as the aggregate.
    pub async fn apply(
        &self,
        product_id: &RecordId,
        variant_id: Option<&str>,
        quantity: i64,
        direction: StockDirection,
    ) -> RepoResult<Product> {
        let delta = direction.signed(quantity);

        for attempt in 0..MAX_RETRIES {
            let product = self.products.get(product_id).await?;
            let observed = product.stocks;

            let mut variations = product.variations.clone();
            if let Some(vid) = variant_id {
                let current = variations.get(vid).ok_or_else(|| {
                    RepoError::NotFound(format!(
                        "Variant {vid} not found on product {product_id}"
                    ))
                })?;
                let updated = Variant {
                    id: current.id.clone(),
                    name: current.name.clone(),
                    add_ons_price: current.add_ons_price,
                    stocks: current.stocks + delta,
                };
                variations.insert(vid.to_string(), updated);
            }

            if let Some(written) = self
                .products
                .try_stock_write(product_id, observed, observed + delta, delta, variations)
                .await?
            {
                return Ok(written);
            }

            tracing::debug!(
                product = %product_id,
                attempt,
                "Stock write lost a race, retrying"
            );
            tokio::task::yield_now().await;
        }

        Err(RepoError::Database(format!(
            "Stock adjustment for {product_id} exhausted retries under contention"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::testing::{mem_db, seed_product};

    #[tokio::test]
    async fn decrement_moves_aggregate_and_variant() {
        let db = mem_db().await;
        let product = seed_product(&db, 10, &[("v1", 6), ("v2", 4)]).await;
        let id = product.id.clone().unwrap();

        let ledger = InventoryLedger::new(db);
        let after = ledger
            .apply(&id, Some("v1"), 3, StockDirection::Decrement)
            .await
            .unwrap();

        assert_eq!(after.stocks, 7);
        assert_eq!(after.stocks_before, 10);
        assert_eq!(after.variations["v1"].stocks, 3);
        assert_eq!(after.variations["v2"].stocks, 4);
    }

    #[tokio::test]
    async fn stocks_after_accumulates_signed_deltas() {
        let db = mem_db().await;
        let product = seed_product(&db, 10, &[]).await;
        let id = product.id.clone().unwrap();

        let ledger = InventoryLedger::new(db);
        ledger
            .apply(&id, None, 4, StockDirection::Decrement)
            .await
            .unwrap();
        let after = ledger
            .apply(&id, None, 1, StockDirection::Increment)
            .await
            .unwrap();

        assert_eq!(after.stocks, 7);
        // running counter of deltas, never reset to the aggregate
        assert_eq!(after.stocks_after, -3);
    }

    #[tokio::test]
    async fn counts_may_go_negative() {
        let db = mem_db().await;
        let product = seed_product(&db, 2, &[]).await;
        let id = product.id.clone().unwrap();

        let ledger = InventoryLedger::new(db);
        let after = ledger
            .apply(&id, None, 5, StockDirection::Decrement)
            .await
            .unwrap();

        assert_eq!(after.stocks, -3);
    }

    #[tokio::test]
    async fn unknown_variant_is_not_found() {
        let db = mem_db().await;
        let product = seed_product(&db, 10, &[("v1", 10)]).await;
        let id = product.id.clone().unwrap();

        let ledger = InventoryLedger::new(db);
        let err = ledger
            .apply(&id, Some("nope"), 1, StockDirection::Decrement)
            .await
            .unwrap_err();

        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_decrements_all_land() {
        let db = mem_db().await;
        let product = seed_product(&db, 100, &[]).await;
        let id = product.id.clone().unwrap();

        let ledger = InventoryLedger::new(db.clone());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = ledger.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                ledger.apply(&id, None, 1, StockDirection::Decrement).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let after = ProductRepository::new(db).get(&id).await.unwrap();
        assert_eq!(after.stocks, 92);
        assert_eq!(after.stocks_after, -8);
    }
}

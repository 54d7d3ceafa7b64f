//! Product Ratings
//!
//! A customer rates the product behind one of their orders. One rating per
//! (customer, product) pair; rating the same product again overwrites the
//! previous score. Every write recomputes the product's stored average.

use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;
use validator::Validate;

use crate::db::repository::{
    ProductRepository, RatingRepository, TransactionRepository, record_id,
};
use crate::utils::AppResult;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RateOrderRequest {
    #[validate(range(min = 1, max = 5, message = "score must be 1-5"))]
    pub score: i64,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub comment: String,
}

#[derive(Clone)]
pub struct RatingService {
    transactions: TransactionRepository,
    ratings: RatingRepository,
    products: ProductRepository,
}

impl RatingService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            transactions: TransactionRepository::new(db.clone()),
            ratings: RatingRepository::new(db.clone()),
            products: ProductRepository::new(db),
        }
    }

    /// Rate the product behind a transaction and return the recomputed
    /// average. The transaction resolves which product is being rated; its
    /// status is not checked, matching the storefront's own gating.
    pub async fn rate_order(
        &self,
        customer: &str,
        transaction_id: &str,
        request: RateOrderRequest,
    ) -> AppResult<f64> {
        request.validate()?;
        let customer = record_id("customer", customer)?;
        let id = self.transactions.parse_id(transaction_id)?;
        let tx = self.transactions.get(&id).await?;

        self.ratings
            .upsert(&customer, &tx.product, request.score, &request.comment)
            .await?;

        let all = self.ratings.list_for_product(&tx.product).await?;
        let average = if all.is_empty() {
            0.0
        } else {
            all.iter().map(|r| r.score as f64).sum::<f64>() / all.len() as f64
        };
        self.products.set_rating(&tx.product, average).await?;

        tracing::debug!(product = %tx.product, average, "Product rating recomputed");
        Ok(average)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::gateway::MockGateway;
    use crate::orders::checkout::{CheckoutLine, CheckoutService, OnsiteOrderRequest};
    use crate::orders::testing::{mem_db, seed_product};
    use crate::utils::AppError;

    async fn onsite_order(
        db: &Surreal<Db>,
        customer: &str,
        product: &crate::db::models::Product,
    ) -> String {
        let svc = CheckoutService::new(db.clone(), Arc::new(MockGateway::new()));
        let tx = svc
            .checkout_onsite(
                "main",
                OnsiteOrderRequest {
                    customer: customer.to_string(),
                    order: CheckoutLine {
                        branch: "branch:main".to_string(),
                        product: product.id.as_ref().unwrap().to_string(),
                        variant_id: None,
                        quantity: 1,
                        unit_price: product.price,
                        discount: 0.0,
                        total: product.price,
                        contact: "0917 000 0000".to_string(),
                        address: "1 Test St".to_string(),
                    },
                },
            )
            .await
            .unwrap();
        tx.id.unwrap().to_string()
    }

    fn req(score: i64) -> RateOrderRequest {
        RateOrderRequest {
            score,
            comment: String::new(),
        }
    }

    #[tokio::test]
    async fn average_tracks_all_customers() {
        let db = mem_db().await;
        let product = seed_product(&db, 10, &[]).await;
        let alice_tx = onsite_order(&db, "alice", &product).await;
        let bob_tx = onsite_order(&db, "bob", &product).await;

        let svc = RatingService::new(db.clone());
        let first = svc.rate_order("alice", &alice_tx, req(5)).await.unwrap();
        assert_eq!(first, 5.0);

        let second = svc.rate_order("bob", &bob_tx, req(2)).await.unwrap();
        assert_eq!(second, 3.5);

        let stored = ProductRepository::new(db)
            .get(product.id.as_ref().unwrap())
            .await
            .unwrap();
        assert_eq!(stored.rating, 3.5);
    }

    #[tokio::test]
    async fn average_shifts_when_one_score_changes() {
        let db = mem_db().await;
        let product = seed_product(&db, 10, &[]).await;
        let alice_tx = onsite_order(&db, "alice", &product).await;
        let bob_tx = onsite_order(&db, "bob", &product).await;
        let carol_tx = onsite_order(&db, "carol", &product).await;

        let svc = RatingService::new(db);
        svc.rate_order("alice", &alice_tx, req(5)).await.unwrap();
        svc.rate_order("bob", &bob_tx, req(3)).await.unwrap();
        let mean = svc.rate_order("carol", &carol_tx, req(4)).await.unwrap();
        assert_eq!(mean, 4.0);

        let shifted = svc.rate_order("bob", &bob_tx, req(5)).await.unwrap();
        assert_eq!(shifted, 14.0 / 3.0);
    }

    #[tokio::test]
    async fn re_rating_overwrites_instead_of_stacking() {
        let db = mem_db().await;
        let product = seed_product(&db, 10, &[]).await;
        let tx = onsite_order(&db, "alice", &product).await;

        let svc = RatingService::new(db.clone());
        svc.rate_order("alice", &tx, req(2)).await.unwrap();
        let updated = svc.rate_order("alice", &tx, req(5)).await.unwrap();
        assert_eq!(updated, 5.0);

        let ratings = RatingRepository::new(db)
            .list_for_product(product.id.as_ref().unwrap())
            .await
            .unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].score, 5);
    }

    #[tokio::test]
    async fn score_outside_range_is_rejected() {
        let db = mem_db().await;
        let product = seed_product(&db, 10, &[]).await;
        let tx = onsite_order(&db, "alice", &product).await;

        let svc = RatingService::new(db);
        let err = svc.rate_order("alice", &tx, req(6)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_transaction_is_not_found() {
        let db = mem_db().await;
        let svc = RatingService::new(db);
        let err = svc
            .rate_order("alice", "transaction:missing", req(4))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}

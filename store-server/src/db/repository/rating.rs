//! Rating Repository
//!
//! Upsert keyed on (customer, product); the UNIQUE index defined by
//! [`crate::db::DbService`] backs the invariant against races.

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Rating;
use crate::utils::now_millis;

const RATING_TABLE: &str = "rating";

#[derive(Clone)]
pub struct RatingRepository {
    base: BaseRepository,
}

impl RatingRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_customer_product(
        &self,
        customer: &RecordId,
        product: &RecordId,
    ) -> RepoResult<Option<Rating>> {
        let rows: Vec<Rating> = self
            .base
            .db()
            .query("SELECT * FROM rating WHERE customer = $customer AND product = $product")
            .bind(("customer", customer.clone()))
            .bind(("product", product.clone()))
            .await?
            .take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Insert or update the one rating a customer holds for a product
    pub async fn upsert(
        &self,
        customer: &RecordId,
        product: &RecordId,
        score: i64,
        comment: &str,
    ) -> RepoResult<Rating> {
        let now = now_millis();
        if let Some(existing) = self.find_by_customer_product(customer, product).await? {
            let id = existing
                .id
                .clone()
                .ok_or_else(|| RepoError::Database("Rating row missing id".into()))?;
            let mut resp = self
                .base
                .db()
                .query(
                    "UPDATE rating SET score = $score, comment = $comment, updated_at = $now \
                     WHERE id = $id RETURN AFTER",
                )
                .bind(("id", id))
                .bind(("score", score))
                .bind(("comment", comment.to_string()))
                .bind(("now", now))
                .await?;
            let rows: Vec<Rating> = resp.take(0)?;
            rows.into_iter()
                .next()
                .ok_or_else(|| RepoError::Database("Rating update returned no record".into()))
        } else {
            let rating = Rating {
                id: None,
                customer: customer.clone(),
                product: product.clone(),
                score,
                comment: comment.to_string(),
                created_at: now,
                updated_at: now,
            };
            let created: Option<Rating> = self
                .base
                .db()
                .create(RATING_TABLE)
                .content(rating)
                .await
                .map_err(|e| {
                    let msg = e.to_string();
                    if msg.to_lowercase().contains("index") {
                        RepoError::Duplicate(format!(
                            "Rating already exists for this customer and product: {msg}"
                        ))
                    } else {
                        RepoError::Database(msg)
                    }
                })?;
            created.ok_or_else(|| RepoError::Database("Rating create returned no record".into()))
        }
    }

    pub async fn list_for_product(&self, product: &RecordId) -> RepoResult<Vec<Rating>> {
        let rows: Vec<Rating> = self
            .base
            .db()
            .query("SELECT * FROM rating WHERE product = $product")
            .bind(("product", product.clone()))
            .await?
            .take(0)?;
        Ok(rows)
    }
}

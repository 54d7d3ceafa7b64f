//! Product Model
//!
//! A product belongs to one branch and owns the only shared mutable resource
//! in the order workflow: its stock counters. Variants are kept as a keyed
//! map (variant id -> record) so stock updates are direct keyed writes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type ProductId = RecordId;

/// A sub-SKU of a product with its own stock count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    pub name: String,
    pub add_ons_price: f64,
    pub stocks: i64,
}

/// Product model
///
/// `stocks_before` snapshots the aggregate count before the last adjustment.
/// `stocks_after` is a running cumulative counter of signed deltas - it is
/// never reset to `stocks` (source parity, see DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub branch: RecordId,
    pub sku_code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    /// Variant records keyed by variant id
    #[serde(default)]
    pub variations: BTreeMap<String, Variant>,
    #[serde(default)]
    pub stocks: i64,
    #[serde(default)]
    pub stocks_before: i64,
    #[serde(default)]
    pub stocks_after: i64,
    /// Derived average rating (1-5), recomputed on every rating upsert
    #[serde(default)]
    pub rating: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub branch: RecordId,
    pub sku_code: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub variations: Option<BTreeMap<String, Variant>>,
    pub stocks: Option<i64>,
}

impl Product {
    pub fn new(data: ProductCreate, now: i64) -> Self {
        Self {
            id: None,
            branch: data.branch,
            sku_code: data.sku_code,
            name: data.name,
            description: data.description.unwrap_or_default(),
            price: data.price,
            variations: data.variations.unwrap_or_default(),
            stocks: data.stocks.unwrap_or(0),
            stocks_before: 0,
            stocks_after: 0,
            rating: 0.0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Look up a variant by id
    pub fn variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variations.get(variant_id)
    }
}

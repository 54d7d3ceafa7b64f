//! Rating Model
//!
//! At most one rating per (customer, product) pair - enforced by a UNIQUE
//! index plus the upsert in the repository. Re-rating updates in place.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub customer: RecordId,
    pub product: RecordId,
    /// Score 1-5
    pub score: i64,
    pub comment: String,
    pub created_at: i64,
    pub updated_at: i64,
}

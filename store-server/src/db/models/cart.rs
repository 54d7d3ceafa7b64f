//! Cart Line Model
//!
//! Upstream data source of checkout: each line turns into one transaction.
//! Cart management itself is plain CRUD; the order workflow only consumes
//! and deletes lines.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub customer: RecordId,
    pub product: RecordId,
    pub quantity: i64,
    pub variant_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

//! Gateway Payment Model
//!
//! Links a transaction to an external gateway invoice. One invoice covers a
//! whole checkout batch, so several records may share `invoice_id`. Records
//! are never mutated; a retried checkout writes fresh ones and the newest
//! record wins during reconciliation.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayPayment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub transaction: RecordId,
    pub invoice_id: String,
    pub created_at: i64,
}

//! Audit service
//!
//! Cloneable sending half of the audit pipeline. Submission is non-blocking
//! (`try_send`) so a slow or stopped worker can never stall a request.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use tokio::sync::mpsc;

use crate::utils::now_millis;

/// One audit trail entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub actor: String,
    pub branch: String,
    pub module: String,
    pub action: String,
    pub message: String,
    pub created_at: i64,
}

#[derive(Clone, Debug)]
pub struct AuditService {
    tx: mpsc::Sender<AuditEntry>,
}

impl AuditService {
    /// Create the service and the receiving half for the worker
    pub fn new(buffer_size: usize) -> (Self, mpsc::Receiver<AuditEntry>) {
        let (tx, rx) = mpsc::channel(buffer_size);
        (Self { tx }, rx)
    }

    /// Submit an entry, best effort
    pub fn record(&self, actor: &str, branch: &str, module: &str, action: &str, message: &str) {
        let entry = AuditEntry {
            id: None,
            actor: actor.to_string(),
            branch: branch.to_string(),
            module: module.to_string(),
            action: action.to_string(),
            message: message.to_string(),
            created_at: now_millis(),
        };
        if let Err(e) = self.tx.try_send(entry) {
            tracing::warn!(error = %e, "Audit channel full or closed, entry dropped");
        }
    }
}

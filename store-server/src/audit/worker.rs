//! Audit background worker
//!
//! Consumes [`AuditEntry`] items from the mpsc channel and writes `audit`
//! rows. Exits when the channel closes.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::service::AuditEntry;

const AUDIT_TABLE: &str = "audit";

pub struct AuditWorker {
    db: Surreal<Db>,
}

impl AuditWorker {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// Run the worker (blocks until the channel closes)
    pub async fn run(self, mut rx: tokio::sync::mpsc::Receiver<AuditEntry>) {
        tracing::info!("Audit worker started");

        while let Some(entry) = rx.recv().await {
            let result: Result<Option<AuditEntry>, surrealdb::Error> = self
                .db
                .create(AUDIT_TABLE)
                .content(entry.clone())
                .await;

            match result {
                Ok(_) => {
                    tracing::debug!(
                        module = %entry.module,
                        action = %entry.action,
                        "Audit entry recorded"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to write audit entry");
                }
            }
        }

        tracing::info!("Audit channel closed, worker stopping");
    }
}

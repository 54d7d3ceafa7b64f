//! Repository Module
//!
//! CRUD and guarded-update operations on SurrealDB tables.

pub mod cart;
pub mod payment;
pub mod product;
pub mod rating;
pub mod transaction;

// Re-exports
pub use cart::CartRepository;
pub use payment::PaymentRepository;
pub use product::ProductRepository;
pub use rating::RatingRepository;
pub use transaction::{TransactionRepository, TransitionFields};

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: "table:key" strings at the API boundary, RecordId inside
// =============================================================================

/// Parse an API-supplied id ("table:key" or bare key) into a [`RecordId`].
///
/// Rejects ids that name a different table. Angle-bracket escapes produced by
/// the SurrealDB display form are stripped.
pub fn record_id(table: &str, id: &str) -> RepoResult<RecordId> {
    if let Some((tb, key)) = id.split_once(':') {
        if tb != table {
            return Err(RepoError::Validation(format!(
                "Expected a {table} id, got: {id}"
            )));
        }
        let key = key.trim_start_matches('⟨').trim_end_matches('⟩');
        Ok(RecordId::from_table_key(table, key))
    } else {
        Ok(RecordId::from_table_key(table, id))
    }
}

/// Render a [`RecordId`] as the canonical "table:key" string used by the API
pub fn id_string(id: &RecordId) -> String {
    let key = id.key().to_string();
    let key = key.trim_start_matches('⟨').trim_end_matches('⟩');
    format!("{}:{}", id.table(), key)
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

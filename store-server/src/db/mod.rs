//! Database Module
//!
//! Embedded SurrealDB: RocksDB-backed in production, in-memory for tests.

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "store";
const DATABASE: &str = "backoffice";

/// Database service - opens the embedded engine and applies schema
#[derive(Clone)]
pub struct DbService;

impl DbService {
    /// Open the RocksDB-backed database under `work_dir`
    pub async fn connect(work_dir: &str) -> Result<Surreal<Db>, AppError> {
        let path = format!("{work_dir}/data");
        let db = Surreal::new::<RocksDb>(path.as_str())
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        Self::prepare(&db).await?;
        tracing::info!(path = %path, "Database connection established (RocksDB)");
        Ok(db)
    }

    /// Open an in-memory database (tests)
    pub async fn connect_memory() -> Result<Surreal<Db>, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        Self::prepare(&db).await?;
        Ok(db)
    }

    async fn prepare(db: &Surreal<Db>) -> Result<(), AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;
        Self::define_schema(db).await?;
        Ok(())
    }

    /// Idempotent schema definitions
    pub(crate) async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
        db.query(
            "DEFINE INDEX IF NOT EXISTS uniq_rating_customer_product \
                ON TABLE rating COLUMNS customer, product UNIQUE;",
        )
        .query(
            "DEFINE INDEX IF NOT EXISTS idx_transaction_customer_status \
                ON TABLE transaction COLUMNS customer, status;",
        )
        .query(
            "DEFINE INDEX IF NOT EXISTS idx_transaction_branch_status \
                ON TABLE transaction COLUMNS branch, status;",
        )
        .query(
            "DEFINE INDEX IF NOT EXISTS idx_payment_transaction \
                ON TABLE gateway_payment COLUMNS transaction;",
        )
        .await
        .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;
        Ok(())
    }
}

//! Server State
//!
//! One `ServerState` is built at boot and cloned into every request. All
//! fields are shallow handles (`Arc` or internally shared), so the clone is
//! cheap.

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::audit::{AuditService, AuditWorker};
use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::gateway::{MockGateway, PaymentGateway, XenditGateway};
use crate::orders::{CheckoutService, LifecycleService, RatingService, ReconcileService};
use crate::utils::AppResult;

/// Shared handles every request sees
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    /// Embedded database (SurrealDB)
    pub db: Surreal<Db>,
    /// Payment provider adapter; mock when no provider key is configured
    pub gateway: Arc<dyn PaymentGateway>,
    pub jwt_service: Arc<JwtService>,
    /// Fire-and-forget audit channel
    pub audit: AuditService,
}

impl ServerState {
    /// Build the full state: open the database, pick the gateway, and start
    /// the audit worker.
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        let db = DbService::connect(&config.work_dir).await?;

        let gateway: Arc<dyn PaymentGateway> = match &config.xendit_secret_key {
            Some(key) => Arc::new(XenditGateway::new(&config.xendit_base_url, key)),
            None => {
                tracing::warn!("No provider key configured, using the in-process mock gateway");
                Arc::new(MockGateway::new())
            }
        };

        Ok(Self::with_parts(config.clone(), db, gateway))
    }

    /// Assemble state around existing handles; tests pass an in-memory
    /// database and a mock gateway here.
    pub fn with_parts(config: Config, db: Surreal<Db>, gateway: Arc<dyn PaymentGateway>) -> Self {
        let (audit, rx) = AuditService::new(config.audit_buffer);
        tokio::spawn(AuditWorker::new(db.clone()).run(rx));

        Self {
            config: config.clone(),
            db,
            gateway,
            jwt_service: Arc::new(JwtService::with_config(config.jwt)),
            audit,
        }
    }

    // Domain services are stateless bundles of repository handles; building
    // them per call keeps ServerState free of circular setup.

    pub fn checkout(&self) -> CheckoutService {
        CheckoutService::new(self.db.clone(), self.gateway.clone())
    }

    pub fn lifecycle(&self) -> LifecycleService {
        LifecycleService::new(self.db.clone())
    }

    pub fn reconcile(&self) -> ReconcileService {
        ReconcileService::new(self.db.clone(), self.gateway.clone())
    }

    pub fn rating(&self) -> RatingService {
        RatingService::new(self.db.clone())
    }
}

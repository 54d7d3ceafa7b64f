//! Store Server - multi-branch order lifecycle and stock back office
//!
//! # Architecture
//!
//! - **Database** (`db`): embedded SurrealDB storage, models and repositories
//! - **Auth** (`auth`): JWT validation and the authenticated request context
//! - **Orders** (`orders`): checkout, lifecycle transitions, payment
//!   reconciliation, inventory ledger, ratings
//! - **Gateway** (`gateway`): payment provider adapter (Xendit or mock)
//! - **Audit** (`audit`): fire-and-forget audit trail
//! - **HTTP API** (`api`): RESTful routes and handlers
//!
//! # Module layout
//!
//! ```text
//! store-server/src/
//! ├── core/          # configuration, state, server
//! ├── auth/          # JWT auth, request context
//! ├── db/            # database layer
//! ├── orders/        # order workflow domain
//! ├── gateway/       # payment provider adapter
//! ├── audit/         # audit trail
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # errors, responses, logging, time
//! ```

pub mod api;
pub mod audit;
pub mod auth;
pub mod core;
pub mod db;
pub mod gateway;
pub mod orders;
pub mod utils;

// Re-export common types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Prepare the process environment: load `.env`, ensure the working
/// directory exists, and initialize logging.
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();

    let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/store/server".into());
    std::fs::create_dir_all(&work_dir)?;

    let log_dir = format!("{work_dir}/logs");
    std::fs::create_dir_all(&log_dir)?;
    init_logger_with_file(std::env::var("RUST_LOG").ok().as_deref(), Some(&log_dir));

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   _____ __
  / ___// /_____  ________
  \__ \/ __/ __ \/ ___/ _ \
 ___/ / /_/ /_/ / /  /  __/
/____/\__/\____/_/   \___/
   _____
  / ___/___  ______   _____  _____
  \__ \/ _ \/ ___/ | / / _ \/ ___/
 ___/ /  __/ /   | |/ /  __/ /
/____/\___/_/    |___/\___/_/
    "#
    );
}

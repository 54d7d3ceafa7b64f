//! Utility Module
//!
//! Shared infrastructure used across the server:
//! - [`AppError`] / [`AppResponse`] - unified error and response types
//! - [`AppResult`] - handler result alias
//! - [`logger`] - tracing setup
//! - [`time`] - epoch-millis helpers

pub mod error;
pub mod logger;
pub mod result;
pub mod time;

pub use error::{AppError, AppResponse, ok, ok_with_message};
pub use result::AppResult;
pub use time::now_millis;

//! Authentication Module
//!
//! Session issuance and permission checking live in the upstream auth
//! service; this module only validates bearer tokens and exposes the
//! `{user, branch, role}` context every authenticated operation trusts.
//!
//! - [`JwtService`] - token validation (and generation, used by tests/tools)
//! - [`CurrentUser`] - extracted request context

pub mod extractor;
pub mod jwt;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};

/// Role id the delivery-rider narrowing in the deliveries list keys on
pub const DRIVER_ROLE: &str = "driver";

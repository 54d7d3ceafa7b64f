//! Audit Module
//!
//! Fire-and-forget audit trail for staff lifecycle actions. Handlers submit
//! entries onto an mpsc channel after the business write commits; a
//! background worker persists them. A full channel or a write failure is
//! logged and never affects the business outcome.

pub mod service;
pub mod worker;

pub use service::{AuditEntry, AuditService};
pub use worker::AuditWorker;

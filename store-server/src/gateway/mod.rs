//! Payment Gateway Adapter
//!
//! Abstracts the external invoice-based payment provider behind two
//! operations: create an invoice for a checkout batch, and poll its status.
//! Invoice creation has no local side effects; the caller persists the
//! payment records. Reconciliation is pull-based - nothing here pushes.

pub mod mock;
pub mod xendit;

pub use mock::MockGateway;
pub use xendit::XenditGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// External invoice status as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Settled,
    Expired,
    /// Any provider status this system does not act on
    Other(String),
}

impl InvoiceStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "PENDING" => InvoiceStatus::Pending,
            "PAID" => InvoiceStatus::Paid,
            "SETTLED" => InvoiceStatus::Settled,
            "EXPIRED" => InvoiceStatus::Expired,
            other => InvoiceStatus::Other(other.to_string()),
        }
    }

    /// PAID and SETTLED both confirm payment
    pub fn is_paid(&self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Settled)
    }
}

/// Invoice creation request covering one checkout batch
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceRequest {
    pub external_id: String,
    pub amount: f64,
    pub payer_email: String,
    pub description: String,
    pub success_redirect_url: String,
    pub failure_redirect_url: String,
    /// Invoice validity window in seconds; expiry is observed on poll only
    pub duration_secs: u64,
    pub payment_methods: Vec<String>,
}

/// Created invoice handle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedInvoice {
    pub invoice_id: String,
    pub invoice_url: String,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Request(String),

    #[error("Gateway rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),
}

/// Seam to the external payment provider
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an invoice for a batch total. No local side effects.
    async fn create_invoice(&self, request: InvoiceRequest)
    -> Result<CreatedInvoice, GatewayError>;

    /// Poll the current status of an invoice. Pure external read.
    async fn invoice_status(&self, invoice_id: &str) -> Result<InvoiceStatus, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_statuses() {
        assert_eq!(InvoiceStatus::parse("PAID"), InvoiceStatus::Paid);
        assert_eq!(InvoiceStatus::parse("SETTLED"), InvoiceStatus::Settled);
        assert_eq!(InvoiceStatus::parse("EXPIRED"), InvoiceStatus::Expired);
        assert_eq!(InvoiceStatus::parse("PENDING"), InvoiceStatus::Pending);
        assert_eq!(
            InvoiceStatus::parse("REFUNDED"),
            InvoiceStatus::Other("REFUNDED".to_string())
        );
    }

    #[test]
    fn paid_and_settled_confirm_payment() {
        assert!(InvoiceStatus::Paid.is_paid());
        assert!(InvoiceStatus::Settled.is_paid());
        assert!(!InvoiceStatus::Pending.is_paid());
        assert!(!InvoiceStatus::Expired.is_paid());
    }
}

//! In-process gateway double
//!
//! Records created invoices and serves whatever status the test (or demo
//! environment) has staged for them. Used wherever a real provider account
//! is unavailable.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{CreatedInvoice, GatewayError, InvoiceRequest, InvoiceStatus, PaymentGateway};

#[derive(Default)]
pub struct MockGateway {
    invoices: DashMap<String, InvoiceStatus>,
    requests: DashMap<String, InvoiceRequest>,
    counter: AtomicU64,
    fail_next: AtomicBool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage the status the next poll of `invoice_id` will report
    pub fn set_status(&self, invoice_id: &str, status: InvoiceStatus) {
        self.invoices.insert(invoice_id.to_string(), status);
    }

    /// The creation request captured for an invoice
    pub fn request_for(&self, invoice_id: &str) -> Option<InvoiceRequest> {
        self.requests.get(invoice_id).map(|r| r.clone())
    }

    pub fn created_count(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Make the next `create_invoice` call fail
    pub fn fail_next_create(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Drop an invoice so later polls report it unknown
    pub fn forget(&self, invoice_id: &str) {
        self.invoices.remove(invoice_id);
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_invoice(
        &self,
        request: InvoiceRequest,
    ) -> Result<CreatedInvoice, GatewayError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(GatewayError::Rejected {
                status: 503,
                body: "staged failure".to_string(),
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let invoice_id = format!("inv_{n}");
        self.invoices
            .insert(invoice_id.clone(), InvoiceStatus::Pending);
        self.requests.insert(invoice_id.clone(), request);
        Ok(CreatedInvoice {
            invoice_url: format!("https://invoices.test/{invoice_id}"),
            invoice_id,
        })
    }

    async fn invoice_status(&self, invoice_id: &str) -> Result<InvoiceStatus, GatewayError> {
        self.invoices
            .get(invoice_id)
            .map(|s| s.clone())
            .ok_or_else(|| GatewayError::InvoiceNotFound(invoice_id.to_string()))
    }
}

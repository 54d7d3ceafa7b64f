//! Xendit invoice client
//!
//! Thin reqwest wrapper over the Xendit invoice API. The secret key is sent
//! as HTTP basic-auth username with an empty password.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{CreatedInvoice, GatewayError, InvoiceRequest, InvoiceStatus, PaymentGateway};

pub const DEFAULT_BASE_URL: &str = "https://api.xendit.co";

pub struct XenditGateway {
    client: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl XenditGateway {
    pub fn new(base_url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            secret_key: secret_key.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct InvoiceResponse {
    id: String,
    #[serde(default)]
    invoice_url: String,
    #[serde(default)]
    status: String,
}

#[async_trait]
impl PaymentGateway for XenditGateway {
    async fn create_invoice(
        &self,
        request: InvoiceRequest,
    ) -> Result<CreatedInvoice, GatewayError> {
        let payload = json!({
            "external_id": request.external_id,
            "amount": request.amount,
            "payer_email": request.payer_email,
            "description": request.description,
            "invoice_duration": request.duration_secs,
            "success_redirect_url": request.success_redirect_url,
            "failure_redirect_url": request.failure_redirect_url,
            "currency": "PHP",
            "payment_methods": request.payment_methods,
        });

        let resp = self
            .client
            .post(format!("{}/v2/invoices", self.base_url))
            .basic_auth(&self.secret_key, Some(""))
            .json(&payload)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected { status, body });
        }

        let invoice: InvoiceResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::Request(format!("Malformed invoice response: {e}")))?;

        Ok(CreatedInvoice {
            invoice_id: invoice.id,
            invoice_url: invoice.invoice_url,
        })
    }

    async fn invoice_status(&self, invoice_id: &str) -> Result<InvoiceStatus, GatewayError> {
        let resp = self
            .client
            .get(format!("{}/v2/invoices/{}", self.base_url, invoice_id))
            .basic_auth(&self.secret_key, Some(""))
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        if resp.status().as_u16() == 404 {
            return Err(GatewayError::InvoiceNotFound(invoice_id.to_string()));
        }
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected { status, body });
        }

        let invoice: InvoiceResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::Request(format!("Malformed invoice response: {e}")))?;

        Ok(InvoiceStatus::parse(&invoice.status))
    }
}

//! Type conversion module
//!
//! Maps database rows (`db::models`) to API response shapes. Record ids are
//! rendered as plain `"table:key"` strings.

use serde::Serialize;

use crate::db::models::{OrderStatus, PaymentMethod, Transaction, Variant};
use crate::db::repository::id_string;

pub fn record_to_string(id: &surrealdb::RecordId) -> String {
    id_string(id)
}

pub fn option_record_to_string(id: &Option<surrealdb::RecordId>) -> Option<String> {
    id.as_ref().map(record_to_string)
}

/// Transaction as returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    pub id: Option<String>,
    pub branch: String,
    pub customer: String,
    pub driver: Option<String>,
    pub product: String,
    pub variant: Option<Variant>,
    pub quantity: i64,
    pub unit_price: f64,
    pub discount: f64,
    pub total: f64,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub cancel_reason: String,
    pub return_reason: String,
    pub contact: String,
    pub address: String,
    pub delivery_date: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Transaction> for TransactionView {
    fn from(t: Transaction) -> Self {
        Self {
            id: option_record_to_string(&t.id),
            branch: record_to_string(&t.branch),
            customer: record_to_string(&t.customer),
            driver: option_record_to_string(&t.driver),
            product: record_to_string(&t.product),
            variant: t.variant,
            quantity: t.quantity,
            unit_price: t.unit_price,
            discount: t.discount,
            total: t.total,
            payment_method: t.payment_method,
            status: t.status,
            cancel_reason: t.cancel_reason,
            return_reason: t.return_reason,
            contact: t.contact,
            address: t.address,
            delivery_date: t.delivery_date,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

pub fn transaction_views(rows: Vec<Transaction>) -> Vec<TransactionView> {
    rows.into_iter().map(TransactionView::from).collect()
}

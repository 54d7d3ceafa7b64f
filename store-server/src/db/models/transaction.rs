//! Transaction (Order) Model
//!
//! One transaction per checkout line. The `status` field drives the order
//! lifecycle; every mutation goes through a guarded transition in
//! [`crate::db::repository::TransactionRepository`].

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::product::Variant;

/// Order lifecycle states
///
/// `TO_PAY -> FOR_DELIVERY -> COMPLETED`, branching to `CANCELLED` (from
/// `TO_PAY`/`FOR_DELIVERY`) and `PENDING_RETURN -> RETURNED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    ToPay,
    ForDelivery,
    Completed,
    PendingReturn,
    Returned,
    Cancelled,
}

impl OrderStatus {
    /// States a customer cancellation may leave from
    pub const CANCELLABLE: &'static [OrderStatus] =
        &[OrderStatus::ToPay, OrderStatus::ForDelivery];

    /// States a return request may leave from
    pub const RETURNABLE: &'static [OrderStatus] =
        &[OrderStatus::ForDelivery, OrderStatus::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::ToPay => "TO_PAY",
            OrderStatus::ForDelivery => "FOR_DELIVERY",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::PendingReturn => "PENDING_RETURN",
            OrderStatus::Returned => "RETURNED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Terminal states admit no further transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Returned | OrderStatus::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported payment methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    CashOnDelivery,
    Gcash,
    Onsite,
}

impl PaymentMethod {
    /// Initial lifecycle state for an order paid with this method.
    ///
    /// Gateway-paid orders wait in `TO_PAY` until the invoice settles;
    /// everything else goes straight to `FOR_DELIVERY`. Stock is decremented
    /// at creation in both cases (optimistic reservation).
    pub fn initial_status(&self) -> OrderStatus {
        match self {
            PaymentMethod::Gcash => OrderStatus::ToPay,
            PaymentMethod::CashOnDelivery | PaymentMethod::Onsite => OrderStatus::ForDelivery,
        }
    }
}

/// Transaction model
///
/// `variant` is a denormalized snapshot of the variant chosen at order time,
/// not a live reference - later variant edits never change historical orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub branch: RecordId,
    pub customer: RecordId,
    pub driver: Option<RecordId>,
    pub product: RecordId,
    pub variant: Option<Variant>,
    pub quantity: i64,
    pub unit_price: f64,
    pub discount: f64,
    pub total: f64,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    #[serde(default)]
    pub cancel_reason: String,
    #[serde(default)]
    pub return_reason: String,
    pub contact: String,
    pub address: String,
    pub delivery_date: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct TransactionCreate {
    pub branch: RecordId,
    pub customer: RecordId,
    pub product: RecordId,
    pub variant: Option<Variant>,
    pub quantity: i64,
    pub unit_price: f64,
    pub discount: f64,
    pub total: f64,
    pub payment_method: PaymentMethod,
    pub contact: String,
    pub address: String,
}

impl Transaction {
    pub fn new(data: TransactionCreate, now: i64) -> Self {
        let status = data.payment_method.initial_status();
        Self {
            id: None,
            branch: data.branch,
            customer: data.customer,
            driver: None,
            product: data.product,
            variant: data.variant,
            quantity: data.quantity,
            unit_price: data.unit_price,
            discount: data.discount,
            total: data.total,
            payment_method: data.payment_method,
            status,
            cancel_reason: String::new(),
            return_reason: String::new(),
            contact: data.contact,
            address: data.address,
            delivery_date: None,
            created_at: now,
            updated_at: now,
        }
    }
}

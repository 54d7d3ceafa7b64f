//! Database Models
//!
//! Row types persisted in SurrealDB. IDs follow the `"table:key"`
//! [`surrealdb::RecordId`] convention throughout the stack.

pub mod cart;
pub mod payment;
pub mod product;
pub mod rating;
pub mod transaction;

pub use cart::CartLine;
pub use payment::GatewayPayment;
pub use product::{Product, ProductCreate, Variant};
pub use rating::Rating;
pub use transaction::{OrderStatus, PaymentMethod, Transaction, TransactionCreate};

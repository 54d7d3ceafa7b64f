//! Checkout
//!
//! Converts validated checkout lines into one transaction per line. Three
//! entry points share the pipeline and differ only in payment method:
//!
//! - cash on delivery: transactions start in `FOR_DELIVERY`
//! - gateway (GCash): one invoice covers the batch, transactions start in
//!   `TO_PAY` and carry a payment record linking them to the invoice
//! - onsite: staff-submitted single line, starts in `FOR_DELIVERY`
//!
//! For gateway checkouts the invoice is created before any local write; a
//! provider failure leaves the database untouched. Stock is reserved at
//! creation for every method.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use uuid::Uuid;
use validator::Validate;

use super::inventory::{InventoryLedger, StockDirection};
use crate::db::models::{PaymentMethod, Transaction, TransactionCreate, Variant};
use crate::db::repository::{
    CartRepository, PaymentRepository, ProductRepository, TransactionRepository, record_id,
};
use crate::gateway::{CreatedInvoice, InvoiceRequest, PaymentGateway};
use crate::utils::{AppError, AppResult};

/// Invoice validity window handed to the provider (24h)
const INVOICE_DURATION_SECS: u64 = 86_400;

/// One line of a checkout, as submitted by the storefront
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckoutLine {
    #[validate(length(min = 1, message = "branch is required"))]
    pub branch: String,
    #[validate(length(min = 1, message = "product is required"))]
    pub product: String,
    pub variant_id: Option<String>,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i64,
    #[validate(range(min = 0.0))]
    pub unit_price: f64,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub discount: f64,
    #[validate(range(min = 0.0))]
    pub total: f64,
    #[validate(length(min = 1, message = "contact is required"))]
    pub contact: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CodCheckoutRequest {
    #[validate(length(min = 1, message = "at least one order line"), nested)]
    pub orders: Vec<CheckoutLine>,
    /// Cart lines consumed by this checkout, deleted on success
    #[serde(default)]
    pub cart_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GatewayCheckoutRequest {
    #[validate(length(min = 1, message = "at least one order line"), nested)]
    pub orders: Vec<CheckoutLine>,
    #[serde(default)]
    pub cart_ids: Vec<String>,
    #[validate(email)]
    pub payer_email: String,
    #[validate(url)]
    pub success_redirect_url: String,
    #[validate(url)]
    pub failure_redirect_url: String,
}

/// Staff-side walk-in sale: the staff's own branch overrides the line's
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OnsiteOrderRequest {
    #[validate(length(min = 1, message = "customer is required"))]
    pub customer: String,
    #[validate(nested)]
    pub order: CheckoutLine,
}

/// A line with its references resolved and the variant snapshot taken
struct ResolvedLine {
    create: TransactionCreate,
    product_id: RecordId,
    variant_id: Option<String>,
}

#[derive(Clone)]
pub struct CheckoutService {
    gateway: Arc<dyn PaymentGateway>,
    products: ProductRepository,
    transactions: TransactionRepository,
    payments: PaymentRepository,
    carts: CartRepository,
    ledger: InventoryLedger,
}

impl CheckoutService {
    pub fn new(db: Surreal<Db>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            gateway,
            products: ProductRepository::new(db.clone()),
            transactions: TransactionRepository::new(db.clone()),
            payments: PaymentRepository::new(db.clone()),
            carts: CartRepository::new(db.clone()),
            ledger: InventoryLedger::new(db),
        }
    }

    /// Resolve every line before any write: parse ids, load products, and
    /// snapshot the chosen variants. A bad line rejects the whole batch.
    async fn resolve_lines(
        &self,
        customer: &RecordId,
        method: PaymentMethod,
        lines: &[CheckoutLine],
    ) -> AppResult<Vec<ResolvedLine>> {
        let mut resolved = Vec::with_capacity(lines.len());
        for line in lines {
            let branch = record_id("branch", &line.branch)?;
            let product_id = self.products.parse_id(&line.product)?;
            let product = self.products.get(&product_id).await?;

            let variant: Option<Variant> = match &line.variant_id {
                Some(vid) => Some(
                    product
                        .variant(vid)
                        .cloned()
                        .ok_or_else(|| {
                            AppError::not_found(format!(
                                "Variant {vid} not found on product {product_id}"
                            ))
                        })?,
                ),
                None => None,
            };

            resolved.push(ResolvedLine {
                create: TransactionCreate {
                    branch,
                    customer: customer.clone(),
                    product: product_id.clone(),
                    variant,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    discount: line.discount,
                    total: line.total,
                    payment_method: method,
                    contact: line.contact.clone(),
                    address: line.address.clone(),
                },
                product_id,
                variant_id: line.variant_id.clone(),
            });
        }
        Ok(resolved)
    }

    /// Persist the resolved lines and reserve their stock
    async fn commit_lines(&self, resolved: Vec<ResolvedLine>) -> AppResult<Vec<Transaction>> {
        let mut created = Vec::with_capacity(resolved.len());
        for line in resolved {
            let tx = self.transactions.create(line.create).await?;
            self.ledger
                .apply(
                    &line.product_id,
                    line.variant_id.as_deref(),
                    tx.quantity,
                    StockDirection::Decrement,
                )
                .await?;
            created.push(tx);
        }
        Ok(created)
    }

    async fn consume_cart(&self, cart_ids: &[String]) -> AppResult<()> {
        if !cart_ids.is_empty() {
            self.carts.delete_many(cart_ids).await?;
        }
        Ok(())
    }

    /// Cash-on-delivery checkout: straight to `FOR_DELIVERY`
    pub async fn checkout_cod(
        &self,
        customer: &str,
        request: CodCheckoutRequest,
    ) -> AppResult<Vec<Transaction>> {
        request.validate()?;
        let customer = record_id("customer", customer)?;

        let resolved = self
            .resolve_lines(&customer, PaymentMethod::CashOnDelivery, &request.orders)
            .await?;
        let created = self.commit_lines(resolved).await?;
        self.consume_cart(&request.cart_ids).await?;

        tracing::info!(customer = %customer, lines = created.len(), "COD checkout completed");
        Ok(created)
    }

    /// Gateway checkout: invoice first, local writes only after the provider
    /// accepted it.
    pub async fn checkout_gateway(
        &self,
        customer: &str,
        request: GatewayCheckoutRequest,
    ) -> AppResult<CreatedInvoice> {
        request.validate()?;
        let customer = record_id("customer", customer)?;

        let resolved = self
            .resolve_lines(&customer, PaymentMethod::Gcash, &request.orders)
            .await?;
        let amount: f64 = request.orders.iter().map(|l| l.total).sum();

        let invoice = self
            .gateway
            .create_invoice(InvoiceRequest {
                external_id: format!("store-{}", Uuid::new_v4()),
                amount,
                payer_email: request.payer_email.clone(),
                description: format!("Store order payment ({} items)", request.orders.len()),
                success_redirect_url: request.success_redirect_url.clone(),
                failure_redirect_url: request.failure_redirect_url.clone(),
                duration_secs: INVOICE_DURATION_SECS,
                payment_methods: vec!["GCASH".to_string()],
            })
            .await
            .map_err(|e| AppError::gateway(e.to_string()))?;

        let created = self.commit_lines(resolved).await?;
        for tx in &created {
            let id = tx
                .id
                .as_ref()
                .ok_or_else(|| AppError::internal("Transaction row missing id"))?;
            self.payments.create(id, &invoice.invoice_id).await?;
        }
        self.consume_cart(&request.cart_ids).await?;

        tracing::info!(
            customer = %customer,
            invoice = %invoice.invoice_id,
            lines = created.len(),
            "Gateway checkout completed"
        );
        Ok(invoice)
    }

    /// Walk-in sale recorded by branch staff on behalf of a customer
    pub async fn checkout_onsite(
        &self,
        staff_branch: &str,
        request: OnsiteOrderRequest,
    ) -> AppResult<Transaction> {
        request.validate()?;
        let customer = record_id("customer", &request.customer)?;

        let mut line = request.order;
        line.branch = staff_branch.to_string();

        let resolved = self
            .resolve_lines(&customer, PaymentMethod::Onsite, std::slice::from_ref(&line))
            .await?;
        let mut created = self.commit_lines(resolved).await?;

        created
            .pop()
            .ok_or_else(|| AppError::internal("Onsite checkout produced no transaction"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::OrderStatus;
    use crate::gateway::{InvoiceStatus, MockGateway};
    use crate::orders::testing::{customer, mem_db, seed_product};

    fn line_for(product: &crate::db::models::Product, quantity: i64) -> CheckoutLine {
        CheckoutLine {
            branch: "branch:main".to_string(),
            product: product.id.as_ref().unwrap().to_string(),
            variant_id: None,
            quantity,
            unit_price: product.price,
            discount: 0.0,
            total: product.price * quantity as f64,
            contact: "0917 000 0000".to_string(),
            address: "1 Test St".to_string(),
        }
    }

    fn service(db: &Surreal<Db>, gateway: Arc<MockGateway>) -> CheckoutService {
        CheckoutService::new(db.clone(), gateway)
    }

    #[tokio::test]
    async fn cod_checkout_reserves_stock_and_starts_for_delivery() {
        let db = mem_db().await;
        let product = seed_product(&db, 10, &[]).await;
        let svc = service(&db, Arc::new(MockGateway::new()));

        let created = svc
            .checkout_cod(
                "alice",
                CodCheckoutRequest {
                    orders: vec![line_for(&product, 3)],
                    cart_ids: vec![],
                },
            )
            .await
            .unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].status, OrderStatus::ForDelivery);
        assert_eq!(created[0].payment_method, PaymentMethod::CashOnDelivery);

        let after = ProductRepository::new(db)
            .get(product.id.as_ref().unwrap())
            .await
            .unwrap();
        assert_eq!(after.stocks, 7);
    }

    #[tokio::test]
    async fn gateway_checkout_invoices_batch_total_and_links_payments() {
        let db = mem_db().await;
        let product = seed_product(&db, 10, &[]).await;
        let gateway = Arc::new(MockGateway::new());
        let svc = service(&db, gateway.clone());

        let invoice = svc
            .checkout_gateway(
                "alice",
                GatewayCheckoutRequest {
                    orders: vec![line_for(&product, 2), line_for(&product, 1)],
                    cart_ids: vec![],
                    payer_email: "alice@example.com".to_string(),
                    success_redirect_url: "https://shop.test/paid".to_string(),
                    failure_redirect_url: "https://shop.test/failed".to_string(),
                },
            )
            .await
            .unwrap();

        let request = gateway.request_for(&invoice.invoice_id).unwrap();
        assert_eq!(request.amount, 300.0);
        assert_eq!(
            gateway.invoice_status(&invoice.invoice_id).await.unwrap(),
            InvoiceStatus::Pending
        );

        let txs = TransactionRepository::new(db.clone())
            .list_by_customer(&customer())
            .await
            .unwrap();
        assert_eq!(txs.len(), 2);
        let payments = PaymentRepository::new(db);
        for tx in &txs {
            assert_eq!(tx.status, OrderStatus::ToPay);
            let payment = payments
                .latest_for_transaction(tx.id.as_ref().unwrap())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(payment.invoice_id, invoice.invoice_id);
        }
    }

    #[tokio::test]
    async fn gateway_failure_leaves_no_local_writes() {
        let db = mem_db().await;
        let product = seed_product(&db, 10, &[]).await;
        let gateway = Arc::new(MockGateway::new());
        gateway.fail_next_create();
        let svc = service(&db, gateway);

        let err = svc
            .checkout_gateway(
                "alice",
                GatewayCheckoutRequest {
                    orders: vec![line_for(&product, 2)],
                    cart_ids: vec![],
                    payer_email: "alice@example.com".to_string(),
                    success_redirect_url: "https://shop.test/paid".to_string(),
                    failure_redirect_url: "https://shop.test/failed".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Gateway(_)));

        let txs = TransactionRepository::new(db.clone())
            .list_by_customer(&customer())
            .await
            .unwrap();
        assert!(txs.is_empty());
        let after = ProductRepository::new(db)
            .get(product.id.as_ref().unwrap())
            .await
            .unwrap();
        assert_eq!(after.stocks, 10);
    }

    #[tokio::test]
    async fn variant_choice_is_snapshotted() {
        let db = mem_db().await;
        let product = seed_product(&db, 10, &[("v1", 6)]).await;
        let svc = service(&db, Arc::new(MockGateway::new()));

        let mut line = line_for(&product, 2);
        line.variant_id = Some("v1".to_string());
        let created = svc
            .checkout_cod(
                "alice",
                CodCheckoutRequest {
                    orders: vec![line],
                    cart_ids: vec![],
                },
            )
            .await
            .unwrap();

        let snapshot = created[0].variant.as_ref().unwrap();
        assert_eq!(snapshot.id, "v1");
        assert_eq!(snapshot.stocks, 6);

        let after = ProductRepository::new(db)
            .get(product.id.as_ref().unwrap())
            .await
            .unwrap();
        assert_eq!(after.variations["v1"].stocks, 4);
        assert_eq!(after.stocks, 8);
    }

    #[tokio::test]
    async fn unknown_variant_rejects_whole_batch() {
        let db = mem_db().await;
        let product = seed_product(&db, 10, &[("v1", 6)]).await;
        let svc = service(&db, Arc::new(MockGateway::new()));

        let mut bad = line_for(&product, 1);
        bad.variant_id = Some("missing".to_string());
        let err = svc
            .checkout_cod(
                "alice",
                CodCheckoutRequest {
                    orders: vec![line_for(&product, 1), bad],
                    cart_ids: vec![],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn consumed_cart_lines_are_deleted() {
        let db = mem_db().await;
        let product = seed_product(&db, 10, &[]).await;
        let carts = CartRepository::new(db.clone());
        let kept = carts
            .create(&customer(), product.id.as_ref().unwrap(), 1, None)
            .await
            .unwrap();
        let consumed = carts
            .create(&customer(), product.id.as_ref().unwrap(), 3, None)
            .await
            .unwrap();

        let svc = service(&db, Arc::new(MockGateway::new()));
        svc.checkout_cod(
            "alice",
            CodCheckoutRequest {
                orders: vec![line_for(&product, 3)],
                cart_ids: vec![consumed.id.as_ref().unwrap().to_string()],
            },
        )
        .await
        .unwrap();

        let remaining = carts.list_by_customer(&customer()).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, kept.id);
    }

    #[tokio::test]
    async fn onsite_checkout_uses_staff_branch() {
        let db = mem_db().await;
        let product = seed_product(&db, 10, &[]).await;
        let svc = service(&db, Arc::new(MockGateway::new()));

        let mut line = line_for(&product, 1);
        line.branch = "branch:other".to_string();
        let tx = svc
            .checkout_onsite(
                "main",
                OnsiteOrderRequest {
                    customer: "alice".to_string(),
                    order: line,
                },
            )
            .await
            .unwrap();

        assert_eq!(tx.status, OrderStatus::ForDelivery);
        assert_eq!(tx.payment_method, PaymentMethod::Onsite);
        assert_eq!(tx.branch, record_id("branch", "main").unwrap());
    }

    #[tokio::test]
    async fn empty_batch_fails_validation() {
        let db = mem_db().await;
        let svc = service(&db, Arc::new(MockGateway::new()));
        let err = svc
            .checkout_cod(
                "alice",
                CodCheckoutRequest {
                    orders: vec![],
                    cart_ids: vec![],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}

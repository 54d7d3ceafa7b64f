//! HTTP surface tests: the assembled router driven through `oneshot`,
//! with real JWTs and the mock payment gateway.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use store_server::api::create_router;
use store_server::core::{Config, ServerState};
use store_server::db::DbService;
use store_server::db::models::{Product, ProductCreate};
use store_server::db::repository::{ProductRepository, record_id};
use store_server::gateway::{InvoiceStatus, MockGateway};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: ServerState,
    gateway: Arc<MockGateway>,
}

async fn spawn_app() -> TestApp {
    let db = DbService::connect_memory().await.unwrap();
    let gateway = Arc::new(MockGateway::new());
    let state = ServerState::with_parts(Config::from_env(), db, gateway.clone());
    TestApp {
        router: create_router(state.clone()),
        state,
        gateway,
    }
}

impl TestApp {
    fn token(&self, user: &str, branch: &str, role: &str) -> String {
        self.state
            .jwt_service
            .generate_token(user, branch, role)
            .unwrap()
    }

    async fn seed_product(&self, stocks: i64) -> Product {
        ProductRepository::new(self.state.db.clone())
            .create(ProductCreate {
                branch: record_id("branch", "main").unwrap(),
                sku_code: "SKU-API".to_string(),
                name: "Api Product".to_string(),
                description: None,
                price: 25.0,
                variations: None,
                stocks: Some(stocks),
            })
            .await
            .unwrap()
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

fn cod_body(product: &Product, quantity: i64) -> Value {
    json!({
        "orders": [{
            "branch": "branch:main",
            "product": product.id.as_ref().unwrap().to_string(),
            "quantity": quantity,
            "unit_price": product.price,
            "total": product.price * quantity as f64,
            "contact": "0917 000 0000",
            "address": "1 Api St"
        }],
        "cart_ids": []
    })
}

#[tokio::test]
async fn health_is_public() {
    let app = spawn_app().await;
    let (status, body) = app.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = spawn_app().await;
    let (status, body) = app.send("GET", "/api/orders/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3001");

    let (status, body) = app
        .send("GET", "/api/orders/", Some("not-a-real-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E3002");
}

#[tokio::test]
async fn cod_checkout_then_history() {
    let app = spawn_app().await;
    let product = app.seed_product(10).await;
    let token = app.token("alice", "main", "customer");

    let (status, body) = app
        .send(
            "POST",
            "/api/checkout/cod",
            Some(&token),
            Some(cod_body(&product, 2)),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "E0000");
    assert_eq!(body["data"][0]["status"], "FOR_DELIVERY");

    let (status, body) = app.send("GET", "/api/orders/mine", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["payment_method"], "CASH_ON_DELIVERY");

    // the staff branch board sees the same order
    let staff = app.token("staff1", "main", "manager");
    let (_, board) = app.send("GET", "/api/orders/", Some(&staff), None).await;
    assert_eq!(board["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn gcash_checkout_and_reconcile_roundtrip() {
    let app = spawn_app().await;
    let product = app.seed_product(10).await;
    let token = app.token("alice", "main", "customer");

    let mut body = cod_body(&product, 3);
    body["payer_email"] = json!("alice@example.com");
    body["success_redirect_url"] = json!("https://shop.test/paid");
    body["failure_redirect_url"] = json!("https://shop.test/failed");
    let (status, created) = app
        .send("POST", "/api/checkout/gcash", Some(&token), Some(body))
        .await;
    assert_eq!(status, StatusCode::OK);
    let invoice_id = created["data"]["invoice_id"].as_str().unwrap().to_string();
    assert!(created["data"]["invoice_url"].as_str().unwrap().contains(&invoice_id));

    app.gateway.set_status(&invoice_id, InvoiceStatus::Paid);
    let (status, outcome) = app
        .send("POST", "/api/checkout/reconcile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["data"]["settled"], 1);

    let (_, history) = app
        .send("GET", "/api/orders/mine?status=FOR_DELIVERY", Some(&token), None)
        .await;
    assert_eq!(history["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn delivery_board_narrows_for_drivers() {
    let app = spawn_app().await;
    let product = app.seed_product(10).await;
    let customer = app.token("alice", "main", "customer");
    let staff = app.token("staff1", "main", "manager");

    let (status, created) = app
        .send(
            "POST",
            "/api/checkout/cod",
            Some(&customer),
            Some(cod_body(&product, 1)),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let tx_id = created["data"][0]["id"].as_str().unwrap().to_string();

    // staff sees the branch board
    let (_, board) = app.send("GET", "/api/deliveries/", Some(&staff), None).await;
    assert_eq!(board["data"].as_array().unwrap().len(), 1);

    // unassigned driver sees nothing
    let bob = app.token("bob", "main", "driver");
    let (_, empty) = app.send("GET", "/api/deliveries/", Some(&bob), None).await;
    assert_eq!(empty["data"].as_array().unwrap().len(), 0);

    // after assignment the delivery shows up for that driver only
    let (status, _) = app
        .send(
            "POST",
            "/api/deliveries/driver",
            Some(&staff),
            Some(json!({ "ids": [tx_id], "driver": "bob" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, mine) = app.send("GET", "/api/deliveries/", Some(&bob), None).await;
    assert_eq!(mine["data"].as_array().unwrap().len(), 1);

    let carol = app.token("carol", "main", "driver");
    let (_, others) = app.send("GET", "/api/deliveries/", Some(&carol), None).await;
    assert_eq!(others["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn staff_complete_and_return_approval_flow() {
    let app = spawn_app().await;
    let product = app.seed_product(10).await;
    let customer = app.token("alice", "main", "customer");
    let staff = app.token("staff1", "main", "manager");

    let (_, created) = app
        .send(
            "POST",
            "/api/checkout/cod",
            Some(&customer),
            Some(cod_body(&product, 2)),
        )
        .await;
    let tx_id = created["data"][0]["id"].as_str().unwrap().to_string();

    let (status, done) = app
        .send(
            "POST",
            "/api/deliveries/complete",
            Some(&staff),
            Some(json!({ "ids": [tx_id.clone()] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["data"]["updated"], 1);

    let (status, requested) = app
        .send(
            "POST",
            &format!("/api/orders/{tx_id}/cancel-or-return"),
            Some(&customer),
            Some(json!({ "status": "PENDING_RETURN", "return_reason": "scratched" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(requested["data"]["status"], "PENDING_RETURN");

    let (_, queue) = app.send("GET", "/api/returns/", Some(&staff), None).await;
    assert_eq!(queue["data"].as_array().unwrap().len(), 1);

    let (status, approved) = app
        .send(
            "POST",
            "/api/returns/approve",
            Some(&staff),
            Some(json!({ "ids": [tx_id] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["data"]["updated"], 1);
}

#[tokio::test]
async fn onsite_sale_uses_staff_branch_and_rating_validates() {
    let app = spawn_app().await;
    let product = app.seed_product(10).await;
    let staff = app.token("staff1", "main", "manager");

    let (status, sale) = app
        .send(
            "POST",
            "/api/orders/onsite",
            Some(&staff),
            Some(json!({
                "customer": "walkin1",
                "order": {
                    "branch": "branch:ignored",
                    "product": product.id.as_ref().unwrap().to_string(),
                    "quantity": 1,
                    "unit_price": product.price,
                    "total": product.price,
                    "contact": "at the counter",
                    "address": "in store"
                }
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sale["data"]["branch"], "branch:main");
    assert_eq!(sale["data"]["payment_method"], "ONSITE");
    let tx_id = sale["data"]["id"].as_str().unwrap().to_string();

    let walkin = app.token("walkin1", "main", "customer");
    let (status, body) = app
        .send(
            "POST",
            &format!("/api/orders/{tx_id}/rate"),
            Some(&walkin),
            Some(json!({ "score": 9 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "E0002");

    let (status, rated) = app
        .send(
            "POST",
            &format!("/api/orders/{tx_id}/rate"),
            Some(&walkin),
            Some(json!({ "score": 5, "comment": "quick" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rated["data"]["average"], 5.0);
}

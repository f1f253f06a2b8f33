//! End-to-end HTTP tests against the in-memory store and simulated gateway.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use scanpos_api::{build_app, AppConfig, AppState};
use scanpos_db::MemoryStore;
use scanpos_gateway::{NotificationDispatcher, SimulatedGateway, SimulatedGatewayConfig};

struct TestApp {
    router: Router,
    gateway: Arc<SimulatedGateway>,
}

impl TestApp {
    fn new() -> Self {
        let gateway = Arc::new(SimulatedGateway::new(SimulatedGatewayConfig::default()));
        let state = AppState::new(
            AppConfig::default(),
            Arc::new(MemoryStore::new()),
            gateway.clone(),
            Arc::new(NotificationDispatcher::logging("Corner Store", "₹")),
        );
        TestApp {
            router: build_app(state),
            gateway,
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    /// Creates a product and returns its id.
    async fn product(&self, name: &str, price: i64, gst: u32) -> String {
        let (status, body) = self
            .post(
                "/inventory",
                json!({ "name": name, "price": price, "gst": gst, "stock": 25 }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }

    /// Generates the two-line sample invoice and returns the response body.
    async fn sample_invoice(&self) -> Value {
        let shirt = self.product("Shirt", 100_000, 18).await;
        let jeans = self.product("Jeans", 55_000, 18).await;

        let (status, body) = self
            .post(
                "/invoice/generate",
                json!({
                    "customerName": "Asha",
                    "customerPhone": "9876543210",
                    "customerEmail": "asha@example.com",
                    "items": [
                        { "productId": shirt, "quantity": 1 },
                        { "productId": jeans, "quantity": 2 }
                    ],
                    "total": 247_800
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body
    }

    fn proof_for(&self, generated: &Value) -> Value {
        let order_id = generated["paymentOrder"]["id"].as_str().unwrap();
        let payment_id = "pay_TEST0000000001";
        json!({
            "paymentId": payment_id,
            "orderId": order_id,
            "signature": self.gateway.sign(order_id, payment_id).unwrap(),
            "invoiceNumber": generated["invoice"]["invoiceNumber"],
        })
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn test_checkout_flow() {
    let app = TestApp::new();
    let generated = app.sample_invoice().await;

    let invoice = &generated["invoice"];
    assert_eq!(invoice["subtotal"], 210_000);
    assert_eq!(invoice["taxTotal"], 37_800);
    assert_eq!(invoice["grandTotal"], 247_800);
    assert_eq!(invoice["status"], "pending");
    assert_eq!(generated["success"], true);

    let qr = generated["paymentOrder"]["qrPayload"].as_str().unwrap();
    assert!(qr.starts_with("upi://pay?"));
    assert!(qr.contains("am=2478.00"));

    let (status, confirmed) = app
        .post("/invoice/verify-payment", app.proof_for(&generated))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", confirmed);
    assert_eq!(confirmed["success"], true);
    assert_eq!(confirmed["invoice"]["status"], "paid");
    assert_eq!(confirmed["customer"]["totalSpentCents"], 247_800);
    assert_eq!(confirmed["notifications"].as_array().unwrap().len(), 2);

    let number = invoice["invoiceNumber"].as_str().unwrap();
    let (status, fetched) = app.get(&format!("/invoices/{}", number)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["status"], "paid");

    let (status, stats) = app.get("/dashboard/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalSales"], 247_800);
    assert_eq!(stats["totalInvoices"], 1);
    assert_eq!(stats["pendingPayments"], 0);
    assert_eq!(stats["activeCustomers"], 1);
}

#[tokio::test]
async fn test_second_verification_conflicts() {
    let app = TestApp::new();
    let generated = app.sample_invoice().await;
    let proof = app.proof_for(&generated);

    let (status, _) = app.post("/invoice/verify-payment", proof.clone()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.post("/invoice/verify-payment", proof).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (_, customers) = app.get("/customers").await;
    assert_eq!(customers[0]["totalSpentCents"], 247_800);
}

#[tokio::test]
async fn test_bad_signature_is_payment_failure() {
    let app = TestApp::new();
    let generated = app.sample_invoice().await;
    let mut proof = app.proof_for(&generated);
    proof["signature"] = json!("ab".repeat(32));

    let (status, body) = app.post("/invoice/verify-payment", proof.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "payment_verification_failed");
    assert_eq!(body["invoice"]["status"], "pending");

    proof["finalAttempt"] = json!(true);
    let (status, body) = app.post("/invoice/verify-payment", proof).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["invoice"]["status"], "cancelled");

    let (_, customers) = app.get("/customers").await;
    assert!(customers.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_verify_unknown_invoice() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/invoice/verify-payment",
            json!({
                "paymentId": "pay_x",
                "orderId": "order_x",
                "signature": "00",
                "invoiceNumber": "INV-0"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_generate_validation() {
    let app = TestApp::new();
    let shirt = app.product("Shirt", 100_000, 18).await;

    let (status, body) = app
        .post(
            "/invoice/generate",
            json!({ "customerName": "Asha", "customerPhone": "9876543210", "items": [] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = app
        .post(
            "/invoice/generate",
            json!({
                "customerName": "Asha",
                "customerPhone": "9876543210",
                "items": [{ "productId": "missing", "quantity": 1 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(
            "/invoice/generate",
            json!({
                "customerName": "Asha",
                "customerPhone": "9876543210",
                "items": [{ "productId": shirt, "quantity": 1 }],
                "total": 1
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(Method::POST, "/invoice/generate", Some(json!("not an object")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_cancel_and_list() {
    let app = TestApp::new();
    let generated = app.sample_invoice().await;
    let number = generated["invoice"]["invoiceNumber"].clone();

    let (status, body) = app
        .post("/invoice/cancel", json!({ "invoiceNumber": number }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invoice"]["status"], "cancelled");

    let (status, _) = app
        .post("/invoice/cancel", json!({ "invoiceNumber": number }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, cancelled) = app.get("/invoices?status=cancelled").await;
    assert_eq!(cancelled.as_array().unwrap().len(), 1);
    let (_, paid) = app.get("/invoices?status=paid").await;
    assert!(paid.as_array().unwrap().is_empty());

    let (status, _) = app.get("/invoices?status=refunded").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inventory_routes() {
    let app = TestApp::new();
    let id = app.product("Basmati Rice 5kg", 62_500, 5).await;

    let (status, product) = app.get(&format!("/inventory/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["taxRateBps"], 500);
    assert_eq!(product["stockStatus"], "in_stock");

    let barcode = product["barcode"].as_str().unwrap().to_string();
    let (status, scanned) = app.get(&format!("/inventory/barcode/{}", barcode)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(scanned["id"], id.as_str());

    let (status, body) = app
        .post(
            "/inventory",
            json!({ "name": "Copy", "price": 100, "gst": 0, "barcode": barcode }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (status, updated) = app
        .send(
            Method::PUT,
            &format!("/inventory/{}", id),
            Some(json!({ "name": "Basmati Rice 5kg", "price": 64_000, "gst": 5, "stock": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["priceCents"], 64_000);
    assert_eq!(updated["stockStatus"], "low_stock");

    let (status, _) = app.send(Method::DELETE, &format!("/inventory/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&format!("/inventory/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_customer_routes() {
    let app = TestApp::new();

    let (status, created) = app
        .post(
            "/customers",
            json!({ "name": "Ravi", "phone": "9123456780" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(
            "/customers",
            json!({ "name": "Other", "phone": "9123456780" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = app
        .send(
            Method::PUT,
            &format!("/customers/{}", id),
            Some(json!({ "name": "Ravi K", "phone": "9123456780", "status": "inactive" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "inactive");
    assert_eq!(updated["totalSpentCents"], 0);

    let (status, _) = app.get("/customers/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_and_login() {
    let app = TestApp::new();
    let credentials = json!({ "email": "owner@shop.in", "password": "counter-42" });

    let (status, registered) = app
        .post(
            "/auth/register",
            json!({
                "name": "Owner",
                "email": "owner@shop.in",
                "password": "counter-42",
                "businessName": "Corner Store"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(registered["user"]["role"], "user");
    assert!(registered["user"].get("passwordHash").is_none());

    let (status, logged_in) = app.post("/auth/login", credentials).await;
    assert_eq!(status, StatusCode::OK);
    assert!(logged_in["token"].as_str().unwrap().split('.').count() == 3);

    let (status, body) = app
        .post(
            "/auth/login",
            json!({ "email": "owner@shop.in", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

mod common;

use axum::http::{Method, StatusCode};
use common::{decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

async fn paid_order(app: &TestApp) -> (String, Value) {
    let item = app.seed_product("Panjabi", dec!(1800), 10).await;
    let order = app.place_order(&app.customer, &[(item, 1)]).await;
    let order_id = order["order"]["id"].as_str().unwrap().to_string();

    let (status, payment) = app
        .post(
            "/api/v1/payments",
            json!({ "order_id": order_id, "payment_method": "bkash" }),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{payment}");
    (order_id, payment["data"].clone())
}

async fn complete(app: &TestApp, payment_id: &str) -> Value {
    let (status, body) = app
        .put(
            &format!("/api/v1/payments/{}/status", payment_id),
            json!({ "status": "completed", "message": "Gateway confirmed" }),
            &app.admin,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"].clone()
}

#[tokio::test]
async fn payment_methods_are_public_and_admin_managed() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post(
            "/api/v1/payment-methods",
            json!({ "name": "Nagad", "code": "nagad", "min_amount": "10", "max_amount": "25000" }),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .post(
            "/api/v1/payment-methods",
            json!({ "name": "Nagad", "code": "Nagad", "min_amount": "10", "max_amount": "25000" }),
            &app.admin,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["code"], "nagad");

    let (status, _) = app
        .post(
            "/api/v1/payment-methods",
            json!({ "name": "Nagad again", "code": "nagad", "min_amount": "1", "max_amount": "2" }),
            &app.admin,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .call(Method::GET, "/api/v1/payment-methods", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn customer_pays_for_own_order_with_default_amount() {
    let app = TestApp::new().await;
    app.seed_payment_method("bkash", dec!(10), dec!(25000)).await;

    let (order_id, payment) = paid_order(&app).await;
    assert_eq!(payment["payment"]["status"], "pending");
    assert_eq!(decimal(&payment["payment"]["amount"]), dec!(1800));
    let txn_id = payment["payment"]["transaction_id"].as_str().unwrap();
    assert!(txn_id.starts_with("TXN") && txn_id.len() == 15, "{txn_id}");
    assert_eq!(payment["transactions"][0]["action"], "initiated");

    let other = app.extra_customer("intruder", "01766666666").await;
    let (status, _) = app
        .post(
            "/api/v1/payments",
            json!({ "order_id": order_id, "payment_method": "bkash" }),
            &other,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let payment_id = payment["payment"]["id"].as_str().unwrap();
    let (status, _) = app
        .get(&format!("/api/v1/payments/{}", payment_id), &other)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, mine) = app.get("/api/v1/payments", &app.customer).await;
    assert_eq!(mine["data"]["total"], 1);
    let (_, theirs) = app.get("/api/v1/payments", &other).await;
    assert_eq!(theirs["data"]["total"], 0);

    app.wait_for_notification(&app.customer, "Payment initiated").await;
}

#[tokio::test]
async fn payment_amount_must_fit_method_limits() {
    let app = TestApp::new().await;
    app.seed_payment_method("bkash", dec!(10), dec!(1000)).await;
    let item = app.seed_product("Television", dec!(45000), 2).await;
    let order = app.place_order(&app.customer, &[(item, 1)]).await;
    let order_id = order["order"]["id"].as_str().unwrap();

    let (status, _) = app
        .post(
            "/api/v1/payments",
            json!({ "order_id": order_id, "payment_method": "bkash" }),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/payments",
            json!({ "order_id": order_id, "payment_method": "paypal" }),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post(
            "/api/v1/payments",
            json!({ "order_id": order_id, "payment_method": "bkash", "amount": "500" }),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "partial payment within limits: {body}");
}

#[tokio::test]
async fn completing_a_payment_sets_paid_at_and_logs_transaction() {
    let app = TestApp::new().await;
    app.seed_payment_method("bkash", dec!(10), dec!(25000)).await;
    let (_, payment) = paid_order(&app).await;

    let detail = complete(&app, payment["payment"]["id"].as_str().unwrap()).await;
    assert_eq!(detail["payment"]["status"], "completed");
    assert!(!detail["payment"]["paid_at"].is_null());
    assert_eq!(detail["transactions"].as_array().unwrap().len(), 2);
    assert_eq!(decimal(&detail["refundable_amount"]), dec!(1800));

    let (status, _) = app
        .put(
            &format!("/api/v1/payments/{}/status", payment["payment"]["id"].as_str().unwrap()),
            json!({ "status": "failed" }),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn refunds_are_bounded_by_the_refundable_balance() {
    let app = TestApp::new().await;
    app.seed_payment_method("bkash", dec!(10), dec!(25000)).await;
    let (_, payment) = paid_order(&app).await;
    let payment_id = payment["payment"]["id"].as_str().unwrap().to_string();
    let refund_uri = format!("/api/v1/payments/{}/refunds", payment_id);

    let (status, _) = app
        .post(&refund_uri, json!({ "amount": "100", "reason": "Too early" }), &app.customer)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "pending payments cannot be refunded");

    complete(&app, &payment_id).await;

    let (status, first) = app
        .post(&refund_uri, json!({ "amount": "1000", "reason": "Wrong size" }), &app.customer)
        .await;
    assert_eq!(status, StatusCode::CREATED, "{first}");
    assert_eq!(first["data"]["status"], "pending");

    let (status, _) = app
        .post(&refund_uri, json!({ "amount": "800.01", "reason": "More" }), &app.customer)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(&refund_uri, json!({ "amount": "0", "reason": "Nothing" }), &app.customer)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, second) = app
        .post(&refund_uri, json!({ "amount": "800", "reason": "Rest" }), &app.customer)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Approving both covers the full amount
    for refund in [&first, &second] {
        let (status, processed) = app
            .post(
                &format!("/api/v1/refunds/{}/process", refund["data"]["id"].as_str().unwrap()),
                json!({ "approve": true, "reference": "RF-1" }),
                &app.admin,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{processed}");
        assert_eq!(processed["data"]["status"], "completed");
        assert_eq!(processed["data"]["processed_by"], json!(app.admin.id));
    }

    let (_, detail) = app
        .get(&format!("/api/v1/payments/{}", payment_id), &app.customer)
        .await;
    assert_eq!(detail["data"]["payment"]["status"], "refunded");
    assert_eq!(decimal(&detail["data"]["refundable_amount"]), dec!(0));

    app.wait_for_notification(&app.customer, "Refund approved").await;
}

#[tokio::test]
async fn rejected_refund_cannot_be_processed_twice() {
    let app = TestApp::new().await;
    app.seed_payment_method("bkash", dec!(10), dec!(25000)).await;
    let (_, payment) = paid_order(&app).await;
    let payment_id = payment["payment"]["id"].as_str().unwrap().to_string();
    complete(&app, &payment_id).await;

    let (_, refund) = app
        .post(
            &format!("/api/v1/payments/{}/refunds", payment_id),
            json!({ "amount": "200", "reason": "Late" }),
            &app.customer,
        )
        .await;
    let process_uri = format!("/api/v1/refunds/{}/process", refund["data"]["id"].as_str().unwrap());

    let (status, _) = app.post(&process_uri, json!({ "approve": true }), &app.customer).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, rejected) = app.post(&process_uri, json!({ "approve": false }), &app.admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rejected["data"]["status"], "cancelled");

    let (status, _) = app.post(&process_uri, json!({ "approve": true }), &app.admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A rejected refund frees the balance again
    let (_, detail) = app
        .get(&format!("/api/v1/payments/{}", payment_id), &app.customer)
        .await;
    assert_eq!(decimal(&detail["data"]["refundable_amount"]), dec!(1800));
    assert_eq!(detail["data"]["payment"]["status"], "completed");

    let (_, mine) = app.get("/api/v1/refunds", &app.customer).await;
    assert_eq!(mine["data"]["total"], 1);
    let (_, pending) = app.get("/api/v1/refunds?status=pending", &app.admin).await;
    assert_eq!(pending["data"]["total"], 0);
}

#[tokio::test]
async fn concurrent_refund_requests_never_exceed_the_payment() {
    let app = TestApp::new().await;
    app.seed_payment_method("bkash", dec!(10), dec!(25000)).await;
    let (_, payment) = paid_order(&app).await;
    let payment_id = payment["payment"]["id"].as_str().unwrap().to_string();
    complete(&app, &payment_id).await;

    let refund_uri = format!("/api/v1/payments/{}/refunds", payment_id);
    let body = json!({ "amount": "1800", "reason": "Wrong size" });
    let (first, second) = tokio::join!(
        app.post(&refund_uri, body.clone(), &app.customer),
        app.post(&refund_uri, body.clone(), &app.customer),
    );
    let created = [first.0, second.0]
        .iter()
        .filter(|s| **s == StatusCode::CREATED)
        .count();
    assert!(created <= 1, "{:?} / {:?}", first, second);

    let (_, refunds) = app.get("/api/v1/refunds", &app.admin).await;
    let committed: rust_decimal::Decimal = refunds["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| decimal(&r["amount"]))
        .sum();
    assert!(committed <= dec!(1800), "over-committed: {committed}");
}

mod common;

use axum::http::StatusCode;
use common::{decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

fn cancel_body(preference: &str, confirm: bool) -> Value {
    json!({
        "reason": "changed_mind",
        "additional_notes": "Ordered twice by mistake",
        "refund_preference": preference,
        "confirm_cancellation": confirm
    })
}

#[tokio::test]
async fn cancellation_needs_explicit_confirmation() {
    let app = TestApp::new().await;
    let item = app.seed_product("Ghee 1kg", dec!(1250), 5).await;
    let order = app.place_order(&app.customer, &[(item, 1)]).await;
    let id = order["order"]["id"].as_str().unwrap();

    let (status, info) = app
        .get(&format!("/api/v1/orders/{}/cancellation", id), &app.customer)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["data"]["can_be_cancelled"], true);
    assert!(!info["data"]["deadline"].is_null());

    let (status, _) = app
        .post(
            &format!("/api/v1/orders/{}/cancel", id),
            cancel_body("refund_to_payment_method", false),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.stock_of(item).await, 4);
}

#[tokio::test]
async fn customer_cancellation_restores_stock_and_refunds_completed_payment() {
    let app = TestApp::new().await;
    app.seed_payment_method("bkash", dec!(10), dec!(25000)).await;
    let item = app.seed_product("Saree", dec!(3200), 3).await;
    let order = app.place_order(&app.customer, &[(item, 2)]).await;
    let id = order["order"]["id"].as_str().unwrap().to_string();
    assert_eq!(app.stock_of(item).await, 1);

    let (_, payment) = app
        .post(
            "/api/v1/payments",
            json!({ "order_id": id, "payment_method": "bkash" }),
            &app.customer,
        )
        .await;
    let payment_id = payment["data"]["payment"]["id"].as_str().unwrap();
    let (status, _) = app
        .put(
            &format!("/api/v1/payments/{}/status", payment_id),
            json!({ "status": "completed" }),
            &app.admin,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            &format!("/api/v1/orders/{}/cancel", id),
            cancel_body("refund_to_payment_method", true),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["order"]["status"], "cancelled");
    assert_eq!(body["data"]["order"]["cancellation_reason"], "changed_mind");
    let refunds = body["data"]["refunds"].as_array().unwrap();
    assert_eq!(refunds.len(), 1);
    assert_eq!(decimal(&refunds[0]["amount"]), dec!(6400));
    assert_eq!(refunds[0]["status"], "pending");

    assert_eq!(app.stock_of(item).await, 3);

    let (_, history) = app
        .get(&format!("/api/v1/orders/{}/history", id), &app.customer)
        .await;
    let notes: Vec<&str> = history["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|h| h["notes"].as_str())
        .collect();
    assert!(notes.contains(&"Order cancelled by rahim. Reason: changed_mind"), "{notes:?}");

    let (status, _) = app
        .post(
            &format!("/api/v1/orders/{}/cancel", id),
            cancel_body("refund_to_payment_method", true),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "already cancelled");
    assert_eq!(app.stock_of(item).await, 3, "stock is restored once");

    app.wait_for_notification(&app.customer, "Order cancelled").await;
    app.wait_for_notification(&app.admin, "Refund awaiting review").await;
}

#[tokio::test]
async fn no_refund_preference_skips_refunds() {
    let app = TestApp::new().await;
    app.seed_payment_method("bkash", dec!(10), dec!(25000)).await;
    let item = app.seed_product("Umbrella", dec!(450), 10).await;
    let order = app.place_order(&app.customer, &[(item, 1)]).await;
    let id = order["order"]["id"].as_str().unwrap().to_string();

    let (_, payment) = app
        .post(
            "/api/v1/payments",
            json!({ "order_id": id, "payment_method": "bkash" }),
            &app.customer,
        )
        .await;
    app.put(
        &format!(
            "/api/v1/payments/{}/status",
            payment["data"]["payment"]["id"].as_str().unwrap()
        ),
        json!({ "status": "completed" }),
        &app.admin,
    )
    .await;

    let (status, body) = app
        .post(
            &format!("/api/v1/orders/{}/cancel", id),
            cancel_body("no_refund_needed", true),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["refunds"].as_array().unwrap().is_empty());

    let (_, refunds) = app.get("/api/v1/refunds", &app.customer).await;
    assert_eq!(refunds["data"]["total"], 0);
}

#[tokio::test]
async fn dispatched_orders_and_strangers_cannot_cancel() {
    let app = TestApp::new().await;
    let item = app.seed_product("Fan", dec!(2900), 4).await;
    let order = app.place_order(&app.customer, &[(item, 1)]).await;
    let id = order["order"]["id"].as_str().unwrap().to_string();
    let other = app.extra_customer("tanvir", "01777777777").await;

    let (status, _) = app
        .post(
            &format!("/api/v1/orders/{}/cancel", id),
            cancel_body("refund_to_wallet", true),
            &other,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for next in ["confirmed", "processing", "dispatched"] {
        app.set_order_status(&id, next).await;
    }

    let (_, info) = app
        .get(&format!("/api/v1/orders/{}/cancellation", id), &app.customer)
        .await;
    assert_eq!(info["data"]["can_be_cancelled"], false);
    assert!(info["data"]["deadline"].is_null());

    let (status, _) = app
        .post(
            &format!("/api/v1/orders/{}/cancel", id),
            cancel_body("refund_to_wallet", true),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.stock_of(item).await, 3);
}

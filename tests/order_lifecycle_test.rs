mod common;

use axum::http::StatusCode;
use common::{decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

fn history_notes(order: &Value) -> Vec<String> {
    order["history"]
        .as_array()
        .expect("history array")
        .iter()
        .map(|h| h["notes"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn checkout_creates_order_items_and_decrements_stock() {
    let app = TestApp::new().await;
    let rice = app.seed_product("Miniket Rice 5kg", dec!(420), 10).await;
    let oil = app.seed_product("Soybean Oil 2L", dec!(360.50), 5).await;

    let order = app.place_order(&app.customer, &[(rice, 2), (oil, 1)]).await;

    let number = order["order"]["order_number"].as_str().unwrap();
    assert!(number.starts_with("ORD") && number.len() == 11, "{number}");
    assert_eq!(order["order"]["status"], "pending");
    assert_eq!(order["order"]["delivery_city"], "ঢাকা");
    assert_eq!(decimal(&order["order"]["total_amount"]), dec!(1200.50));
    assert_eq!(order["items"].as_array().unwrap().len(), 2);
    for item in order["items"].as_array().unwrap() {
        let unit = decimal(&item["unit_price"]);
        let quantity = item["quantity"].as_i64().unwrap();
        assert_eq!(decimal(&item["total_price"]), unit * rust_decimal::Decimal::from(quantity));
    }
    assert_eq!(history_notes(&order), vec!["Order created".to_string()]);
    assert_eq!(order["cancellation"]["can_be_cancelled"], true);

    assert_eq!(app.stock_of(rice).await, 8);
    assert_eq!(app.stock_of(oil).await, 4);

    app.wait_for_notification(&app.customer, "Order placed").await;
    app.wait_for_notification(&app.admin, "New order").await;
}

#[tokio::test]
async fn out_of_stock_cart_is_rejected_without_side_effects() {
    let app = TestApp::new().await;
    let rice = app.seed_product("Rice", dec!(100), 10).await;
    let gas = app.seed_product("LPG Cylinder", dec!(1450), 1).await;

    let (status, body) = app
        .post(
            "/api/v1/orders",
            json!({
                "delivery_address": "Road 1",
                "cart_items": [
                    { "id": rice, "quantity": 2 },
                    { "id": gas, "quantity": 3 }
                ]
            }),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let shortages = body["details"]["out_of_stock"].as_array().unwrap();
    assert_eq!(shortages.len(), 1);
    assert_eq!(shortages[0]["product_id"], json!(gas));
    assert_eq!(shortages[0]["requested"], 3);
    assert_eq!(shortages[0]["available"], 1);

    assert_eq!(app.stock_of(rice).await, 10);
    assert_eq!(app.stock_of(gas).await, 1);

    let (_, orders) = app.get("/api/v1/orders", &app.customer).await;
    assert_eq!(orders["data"]["total"], 0);
}

#[tokio::test]
async fn repeated_orders_never_drive_stock_negative() {
    let app = TestApp::new().await;
    let item = app.seed_product("Last Units", dec!(50), 3).await;

    app.place_order(&app.customer, &[(item, 2)]).await;
    let (status, _) = app
        .post(
            "/api/v1/orders",
            json!({ "delivery_address": "Road 1", "cart_items": [{ "id": item, "quantity": 2 }] }),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    app.place_order(&app.customer, &[(item, 1)]).await;

    assert_eq!(app.stock_of(item).await, 0);
}

#[tokio::test]
async fn empty_cart_and_unknown_product_are_rejected() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post(
            "/api/v1/orders",
            json!({ "delivery_address": "Road 1", "cart_items": [] }),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/orders",
            json!({
                "delivery_address": "Road 1",
                "cart_items": [{ "id": uuid::Uuid::new_v4(), "quantity": 1 }]
            }),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delivery_area_fee_is_added_to_amount_due() {
    let app = TestApp::new().await;
    let item = app.seed_product("Books", dec!(500), 5).await;

    let (status, area) = app
        .post(
            "/api/v1/delivery/areas",
            json!({ "name": "Gulshan", "delivery_fee": "80", "estimated_delivery_time": 60 }),
            &app.admin,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post(
            "/api/v1/orders",
            json!({
                "delivery_address": "Road 90, Gulshan 2",
                "delivery_area_id": area["data"]["id"],
                "cart_items": [{ "id": item, "quantity": 2 }]
            }),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(decimal(&body["data"]["order"]["delivery_fee"]), dec!(80));
    assert_eq!(decimal(&body["data"]["amount_due"]), dec!(1080));
}

#[tokio::test]
async fn orders_are_visible_to_owner_and_admin_only() {
    let app = TestApp::new().await;
    let item = app.seed_product("Tea", dec!(90), 20).await;
    let order = app.place_order(&app.customer, &[(item, 1)]).await;
    let number = order["order"]["order_number"].as_str().unwrap().to_string();
    let other = app.extra_customer("salma", "01755555555").await;

    let (status, body) = app
        .get(&format!("/api/v1/orders/{}", number.to_lowercase()), &app.customer)
        .await;
    assert_eq!(status, StatusCode::OK, "lookup by order number: {body}");

    let (status, _) = app.get(&format!("/api/v1/orders/{}", number), &other).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get(&format!("/api/v1/orders/{}", number), &app.agent).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, invoice) = app
        .get(&format!("/api/v1/orders/{}/invoice", number), &app.admin)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invoice["data"]["customer"]["phone_number"], "01710000002");
    assert_eq!(decimal(&invoice["data"]["total_due"]), dec!(90));

    let (status, items) = app
        .get(&format!("/api/v1/orders/{}/items", number), &app.customer)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items["data"][0]["product_name"], "Tea");

    let (_, own) = app.get("/api/v1/orders", &other).await;
    assert_eq!(own["data"]["total"], 0);
    let (_, all) = app.get("/api/v1/orders", &app.admin).await;
    assert_eq!(all["data"]["total"], 1);
    let (_, searched) = app
        .get(&format!("/api/v1/orders?search={}", &number[3..7]), &app.admin)
        .await;
    assert_eq!(searched["data"]["total"], 1);
}

#[tokio::test]
async fn admin_status_changes_follow_the_transition_graph() {
    let app = TestApp::new().await;
    let item = app.seed_product("Medicine", dec!(12), 100).await;
    let order = app.place_order(&app.customer, &[(item, 3)]).await;
    let id = order["order"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/orders/{}/status", id);

    let (status, _) = app.put(&uri, json!({ "status": "delivered" }), &app.admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "pending cannot jump to delivered");

    let (status, _) = app.put(&uri, json!({ "status": "pending" }), &app.admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "same status is rejected");

    let (status, _) = app.put(&uri, json!({ "status": "confirmed" }), &app.customer).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for next in ["confirmed", "processing", "dispatched", "delivered"] {
        app.set_order_status(&id, next).await;
    }

    let (status, _) = app.put(&uri, json!({ "status": "cancelled" }), &app.admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .put(&uri, json!({ "status": "returned", "notes": "Damaged box" }), &app.admin)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["order"]["status"], "returned");
    let notes = history_notes(&body["data"]);
    assert!(notes
        .iter()
        .any(|n| n == "Status changed from delivered to returned by admin. Damaged box"));
    assert_eq!(notes.len(), 6);

    let (status, _) = app.put(&uri, json!({ "status": "delivered" }), &app.admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "returned is terminal");

    let (status, history) = app
        .get(&format!("/api/v1/orders/{}/history", id), &app.customer)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["data"].as_array().unwrap().len(), 6);

    app.wait_for_notification(&app.customer, "Order status updated").await;
}

#[tokio::test]
async fn admin_cancellation_restores_stock() {
    let app = TestApp::new().await;
    let item = app.seed_product("Gas", dec!(1450), 5).await;
    let order = app.place_order(&app.customer, &[(item, 2)]).await;
    let id = order["order"]["id"].as_str().unwrap();
    assert_eq!(app.stock_of(item).await, 3);

    app.set_order_status(id, "confirmed").await;
    app.set_order_status(id, "cancelled").await;

    assert_eq!(app.stock_of(item).await, 5);
}

#[tokio::test]
async fn status_filter_narrows_order_list() {
    let app = TestApp::new().await;
    let item = app.seed_product("Bread", dec!(60), 50).await;
    let first = app.place_order(&app.customer, &[(item, 1)]).await;
    app.place_order(&app.customer, &[(item, 1)]).await;
    app.set_order_status(first["order"]["id"].as_str().unwrap(), "confirmed")
        .await;

    let (_, pending) = app.get("/api/v1/orders?status=pending", &app.customer).await;
    assert_eq!(pending["data"]["total"], 1);
    let (_, confirmed) = app.get("/api/v1/orders?status=confirmed", &app.admin).await;
    assert_eq!(confirmed["data"]["total"], 1);
}

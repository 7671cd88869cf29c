mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn home_stats_are_public() {
    let app = TestApp::new().await;
    let item = app.seed_product("Dates 1kg", dec!(700), 10).await;
    let hidden = app.seed_product("Flour 2kg", dec!(140), 5).await;
    app.put(
        &format!("/api/v1/products/{}", hidden),
        json!({ "is_available": false }),
        &app.admin,
    )
    .await;
    let order = app.place_order(&app.customer, &[(item, 1)]).await;
    let id = order["order"]["id"].as_str().unwrap();
    for next in ["confirmed", "processing", "dispatched", "delivered"] {
        app.set_order_status(id, next).await;
    }

    let (status, body) = app
        .call(Method::GET, "/api/v1/dashboard/home", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_customers"], 1);
    assert_eq!(body["data"]["delivered_orders"], 1);
    assert_eq!(body["data"]["available_products"], 1, "hidden items are not counted");
}

#[tokio::test]
async fn admin_dashboard_counts_orders_revenue_and_top_products() {
    let app = TestApp::new().await;
    app.seed_payment_method("bkash", dec!(10), dec!(25000)).await;
    let popular = app.seed_product("Eggs 12pcs", dec!(150), 50).await;
    let other = app.seed_product("Butter", dec!(320), 50).await;

    let first = app.place_order(&app.customer, &[(popular, 1), (other, 1)]).await;
    app.place_order(&app.customer, &[(popular, 2)]).await;
    let third = app.place_order(&app.customer, &[(popular, 1)]).await;
    app.set_order_status(third["order"]["id"].as_str().unwrap(), "cancelled")
        .await;

    let (_, payment) = app
        .post(
            "/api/v1/payments",
            json!({ "order_id": first["order"]["id"], "payment_method": "bkash" }),
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

    let (status, _) = app.get("/api/v1/dashboard/admin", &app.customer).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/api/v1/dashboard/admin", &app.admin).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let data = &body["data"];
    assert_eq!(data["orders"]["total"], 3);
    assert_eq!(data["orders"]["pending"], 2);
    assert_eq!(data["orders"]["cancelled"], 1);
    assert_eq!(decimal(&data["revenue"]["total"]), dec!(470));
    assert_eq!(decimal(&data["revenue"]["last_7_days"]), dec!(470));
    assert_eq!(data["total_customers"], 1);
    assert_eq!(data["new_customers_7_days"], 1);
    assert_eq!(data["total_products"], 2);
    assert_eq!(data["recent_orders"].as_array().unwrap().len(), 3);
    assert_eq!(data["recent_payments"].as_array().unwrap().len(), 1);
    assert_eq!(data["top_products"][0]["name"], "Eggs 12pcs");
    assert_eq!(data["top_products"][0]["order_count"], 3);
    assert_eq!(data["top_products"][1]["order_count"], 1);
}

#[tokio::test]
async fn user_dashboard_is_scoped_to_the_caller() {
    let app = TestApp::new().await;
    let item = app.seed_product("Pickles", dec!(220), 10).await;
    app.place_order(&app.customer, &[(item, 1)]).await;
    let other = app.extra_customer("rumana", "01715151515").await;

    let (status, mine) = app.get("/api/v1/dashboard/me", &app.customer).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["data"]["orders"]["total"], 1);
    assert_eq!(decimal(&mine["data"]["total_spent"]), dec!(0));

    let (_, theirs) = app.get("/api/v1/dashboard/me", &other).await;
    assert_eq!(theirs["data"]["orders"]["total"], 0);
    assert!(theirs["data"]["recent_orders"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn order_report_covers_requested_range() {
    let app = TestApp::new().await;
    let item = app.seed_product("Biscuits", dec!(40), 100).await;
    app.place_order(&app.customer, &[(item, 5)]).await;
    let order = app.place_order(&app.customer, &[(item, 1)]).await;
    app.set_order_status(order["order"]["id"].as_str().unwrap(), "confirmed")
        .await;

    let today = Utc::now().date_naive();
    let (status, body) = app
        .get(
            &format!(
                "/api/v1/dashboard/reports/orders?start_date={}&end_date={}",
                today - Duration::days(1),
                today
            ),
            &app.admin,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["total_orders"], 2);
    assert_eq!(decimal(&body["data"]["total_amount"]), dec!(240));
    assert_eq!(body["data"]["by_status"]["pending"], 1);
    assert_eq!(body["data"]["by_status"]["confirmed"], 1);

    let (status, _) = app
        .get(
            &format!(
                "/api/v1/dashboard/reports/orders?start_date={}&end_date={}",
                today,
                today - Duration::days(3)
            ),
            &app.admin,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/v1/dashboard/reports/orders", &app.customer).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn analytics_snapshot_upserts_one_row_per_metric() {
    let app = TestApp::new().await;
    let item = app.seed_product("Honey", dec!(550), 10).await;
    app.place_order(&app.customer, &[(item, 1)]).await;

    for _ in 0..2 {
        let (status, body) = app
            .post("/api/v1/dashboard/analytics/snapshot", json!({}), &app.admin)
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let metrics = body["data"]["metrics"].as_array().unwrap();
        assert_eq!(metrics.len(), 6);
        let orders = metrics
            .iter()
            .find(|m| m["metric_type"] == "orders")
            .expect("orders metric");
        assert_eq!(decimal(&orders["value"]), dec!(1));
    }

    let (status, body) = app.get("/api/v1/dashboard/analytics", &app.admin).await;
    assert_eq!(status, StatusCode::OK);
    let total: u64 = body["data"]["orders_per_day"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["count"].as_u64().unwrap())
        .sum();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn notifications_can_be_read_individually_or_all_at_once() {
    let app = TestApp::new().await;
    let item = app.seed_product("Soap", dec!(45), 30).await;
    let order = app.place_order(&app.customer, &[(item, 1)]).await;
    app.set_order_status(order["order"]["id"].as_str().unwrap(), "confirmed")
        .await;

    let placed = app.wait_for_notification(&app.customer, "Order placed").await;
    app.wait_for_notification(&app.customer, "Order status updated")
        .await;

    let (_, count) = app.get("/api/v1/notifications/unread-count", &app.customer).await;
    assert_eq!(count["data"]["unread"], 2);

    let read_uri = format!("/api/v1/notifications/{}/read", placed["id"].as_str().unwrap());
    let (status, _) = app.post(&read_uri, json!({}), &app.admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "other users' notifications are invisible");

    let (status, body) = app.post(&read_uri, json!({}), &app.customer).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_read"], true);

    let (_, unread) = app
        .get("/api/v1/notifications?unread_only=true", &app.customer)
        .await;
    assert_eq!(unread["data"]["total"], 1);

    let (_, marked) = app
        .post("/api/v1/notifications/read-all", json!({}), &app.customer)
        .await;
    assert_eq!(marked["data"]["updated"], 1);
    let (_, count) = app.get("/api/v1/notifications/unread-count", &app.customer).await;
    assert_eq!(count["data"]["unread"], 0);
}

#[tokio::test]
async fn system_log_records_events_for_admins() {
    let app = TestApp::new().await;
    let item = app.seed_product("Candles", dec!(80), 10).await;
    app.place_order(&app.customer, &[(item, 1)]).await;
    app.wait_for_notification(&app.admin, "New order").await;

    // The audit row lands after the notifications
    let mut found = false;
    for _ in 0..50 {
        let (status, logs) = app.get("/api/v1/system-logs", &app.admin).await;
        assert_eq!(status, StatusCode::OK);
        found = logs["data"]["items"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|l| l["message"].as_str())
            .any(|m| m.starts_with("Order ") && m.ends_with(" created"));
        if found {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    assert!(found, "order creation was not audited");

    let (status, _) = app.get("/api/v1/system-logs", &app.customer).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn revenue_report_sums_completed_payments_in_range() {
    let app = TestApp::new().await;
    app.seed_payment_method("bkash", dec!(10), dec!(25000)).await;
    let item = app.seed_product("Mustard Oil 1L", dec!(235), 20).await;

    let mut payment_ids = Vec::new();
    for _ in 0..2 {
        let order = app.place_order(&app.customer, &[(item, 2)]).await;
        let (status, body) = app
            .post(
                "/api/v1/payments",
                json!({ "order_id": order["order"]["id"], "payment_method": "bkash" }),
                &app.customer,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        payment_ids.push(body["data"]["payment"]["id"].as_str().unwrap().to_string());
    }
    app.put(
        &format!("/api/v1/payments/{}/status", payment_ids[0]),
        json!({ "status": "completed" }),
        &app.admin,
    )
    .await;

    let (status, body) = app.get("/api/v1/dashboard/reports/revenue", &app.admin).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["payment_count"], 1, "pending payments are left out");
    assert_eq!(decimal(&body["data"]["total_revenue"]), dec!(470));
    assert_eq!(body["data"]["payments"][0]["id"], payment_ids[0].as_str());
    assert_eq!(
        body["data"]["end_date"],
        Utc::now().date_naive().to_string()
    );

    let yesterday = Utc::now().date_naive() - Duration::days(1);
    let (_, body) = app
        .get(
            &format!(
                "/api/v1/dashboard/reports/revenue?start_date={}&end_date={}",
                yesterday - Duration::days(5),
                yesterday
            ),
            &app.admin,
        )
        .await;
    assert_eq!(body["data"]["payment_count"], 0);
    assert_eq!(decimal(&body["data"]["total_revenue"]), dec!(0));

    let (status, _) = app.get("/api/v1/dashboard/reports/revenue", &app.customer).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn delivery_report_counts_assignments_and_completions() {
    let app = TestApp::new().await;
    let item = app.seed_product("Ceiling Fan", dec!(3200), 5).await;

    let mut assignment_ids = Vec::new();
    for _ in 0..2 {
        let order = app.place_order(&app.customer, &[(item, 1)]).await;
        let order_id = order["order"]["id"].as_str().unwrap().to_string();
        app.set_order_status(&order_id, "confirmed").await;
        let (status, body) = app
            .post(
                "/api/v1/delivery/assignments",
                json!({ "order_id": order_id, "delivery_agent_id": app.agent.id }),
                &app.admin,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assignment_ids.push(body["data"]["assignment"]["id"].as_str().unwrap().to_string());
    }
    let (status, body) = app
        .post(
            &format!("/api/v1/delivery/assignments/{}/status", assignment_ids[0]),
            json!({ "status": "delivered", "location": "Mirpur 10" }),
            &app.agent,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let today = Utc::now().date_naive();
    let (status, body) = app
        .get(
            &format!(
                "/api/v1/dashboard/reports/deliveries?start_date={}&end_date={}",
                today, today
            ),
            &app.admin,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["total_deliveries"], 2);
    assert_eq!(body["data"]["completed_deliveries"], 1);
    assert_eq!(body["data"]["assignments"].as_array().unwrap().len(), 2);

    let (status, _) = app
        .get(
            &format!(
                "/api/v1/dashboard/reports/deliveries?start_date={}&end_date={}",
                today,
                today - Duration::days(1)
            ),
            &app.admin,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .get("/api/v1/dashboard/reports/deliveries", &app.agent)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

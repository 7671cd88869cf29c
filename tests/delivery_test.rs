mod common;

use axum::http::StatusCode;
use common::{decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

/// Places and confirms an order, then assigns the seeded agent to it.
async fn assigned_order(app: &TestApp) -> (String, String) {
    let item = app.seed_product("Rice Cooker", dec!(2600), 5).await;
    let order = app.place_order(&app.customer, &[(item, 1)]).await;
    let order_id = order["order"]["id"].as_str().unwrap().to_string();
    app.set_order_status(&order_id, "confirmed").await;

    let (status, body) = app
        .post(
            "/api/v1/delivery/assignments",
            json!({
                "order_id": order_id,
                "delivery_agent_id": app.agent.id,
                "delivery_notes": "Call before arriving"
            }),
            &app.admin,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let assignment_id = body["data"]["assignment"]["id"].as_str().unwrap().to_string();
    (order_id, assignment_id)
}

async fn advance(app: &TestApp, assignment_id: &str, stage: &str) -> (StatusCode, Value) {
    app.post(
        &format!("/api/v1/delivery/assignments/{}/status", assignment_id),
        json!({ "status": stage, "location": "Farmgate", "notes": format!("now {stage}") }),
        &app.agent,
    )
    .await
}

#[tokio::test]
async fn admin_assigns_available_agent_once() {
    let app = TestApp::new().await;
    let (order_id, assignment_id) = assigned_order(&app).await;

    let (status, detail) = app
        .get(&format!("/api/v1/delivery/assignments/{}", assignment_id), &app.customer)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["data"]["current_status"], "assigned");
    assert_eq!(detail["data"]["timeline"].as_array().unwrap().len(), 1);
    assert_eq!(detail["data"]["order_status"], "confirmed");

    let (status, _) = app
        .post(
            "/api/v1/delivery/assignments",
            json!({ "order_id": order_id, "delivery_agent_id": app.agent.id }),
            &app.admin,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    app.wait_for_notification(&app.agent, "New delivery assigned").await;
    app.wait_for_notification(&app.customer, "Delivery agent assigned").await;
}

#[tokio::test]
async fn assignment_requires_an_available_agent_and_open_order() {
    let app = TestApp::new().await;
    let item = app.seed_product("Kettle", dec!(900), 5).await;
    let order = app.place_order(&app.customer, &[(item, 1)]).await;
    let order_id = order["order"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(
            "/api/v1/delivery/assignments",
            json!({ "order_id": order_id, "delivery_agent_id": app.customer.id }),
            &app.admin,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "customers are not agents");

    let (status, _) = app
        .post(
            "/api/v1/delivery/assignments",
            json!({ "order_id": order_id, "delivery_agent_id": app.agent.id }),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Agent goes offline
    let (status, _) = app
        .post(
            &format!("/api/v1/users/agents/{}/availability", app.agent.id),
            json!({}),
            &app.agent,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .post(
            "/api/v1/delivery/assignments",
            json!({ "order_id": order_id, "delivery_agent_id": app.agent.id }),
            &app.admin,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.set_order_status(&order_id, "cancelled").await;
    app.post(
        &format!("/api/v1/users/agents/{}/availability", app.agent.id),
        json!({}),
        &app.agent,
    )
    .await;
    let (status, _) = app
        .post(
            "/api/v1/delivery/assignments",
            json!({ "order_id": order_id, "delivery_agent_id": app.agent.id }),
            &app.admin,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "cancelled orders cannot be assigned");
}

#[tokio::test]
async fn tracking_stages_move_the_order_along() {
    let app = TestApp::new().await;
    let (order_id, assignment_id) = assigned_order(&app).await;

    let (status, detail) = advance(&app, &assignment_id, "picked_up").await;
    assert_eq!(status, StatusCode::OK, "{detail}");
    assert_eq!(detail["data"]["order_status"], "dispatched");

    let (status, detail) = advance(&app, &assignment_id, "in_transit").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["data"]["order_status"], "dispatched");
    assert_eq!(detail["data"]["current_status"], "in_transit");

    let (status, detail) = advance(&app, &assignment_id, "delivered").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["data"]["order_status"], "delivered");
    assert!(!detail["data"]["assignment"]["actual_delivery_time"].is_null());
    assert_eq!(detail["data"]["timeline"].as_array().unwrap().len(), 4);

    let (status, _) = advance(&app, &assignment_id, "in_transit").await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "delivered is final");

    let (_, order) = app
        .get(&format!("/api/v1/orders/{}", order_id), &app.customer)
        .await;
    assert_eq!(order["data"]["order"]["status"], "delivered");

    let (_, agents) = app.get("/api/v1/users/agents", &app.admin).await;
    assert_eq!(agents["data"]["items"][0]["profile"]["total_deliveries"], 1);

    app.wait_for_notification(&app.customer, "Delivery update").await;
}

#[tokio::test]
async fn only_the_assigned_agent_updates_tracking() {
    let app = TestApp::new().await;
    let (order_id, assignment_id) = assigned_order(&app).await;

    let (status, _) = app
        .post(
            &format!("/api/v1/delivery/assignments/{}/status", assignment_id),
            json!({ "status": "picked_up" }),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, other_agent) = app
        .call(
            axum::http::Method::POST,
            "/api/v1/users/register/agent",
            Some(json!({
                "username": "jamal",
                "email": "jamal@example.com",
                "password": common::PASSWORD,
                "phone_number": "01788888888",
                "license_number": "LIC-0099",
                "vehicle_type": "car",
                "vehicle_number": "DHA-9"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{other_agent}");
    let other_id = other_agent["data"]["user"]["id"].as_str().unwrap().parse().unwrap();
    let token = app.token_for(other_id).await;

    let (status, _) = app
        .call(
            axum::http::Method::POST,
            &format!("/api/v1/delivery/assignments/{}/status", assignment_id),
            Some(json!({ "status": "picked_up" })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(
            axum::http::Method::GET,
            &format!("/api/v1/delivery/assignments/{}", assignment_id),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, mine) = app.get("/api/v1/delivery/assignments", &app.agent).await;
    assert_eq!(mine["data"]["total"], 1);
    let (_, theirs) = app
        .call(
            axum::http::Method::GET,
            "/api/v1/delivery/assignments",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(theirs["data"]["total"], 0);

    // The assigned agent may now see the order
    let (status, _) = app
        .get(&format!("/api/v1/orders/{}", order_id), &app.agent)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn cash_on_delivery_is_settled_when_delivered() {
    let app = TestApp::new().await;
    app.seed_payment_method("cash_on_delivery", dec!(0), dec!(50000)).await;
    let (order_id, assignment_id) = assigned_order(&app).await;

    let (status, payment) = app
        .post(
            "/api/v1/payments",
            json!({ "order_id": order_id, "payment_method": "cash_on_delivery" }),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let payment_id = payment["data"]["payment"]["id"].as_str().unwrap().to_string();

    advance(&app, &assignment_id, "picked_up").await;
    let (status, _) = advance(&app, &assignment_id, "delivered").await;
    assert_eq!(status, StatusCode::OK);

    let (_, detail) = app
        .get(&format!("/api/v1/payments/{}", payment_id), &app.customer)
        .await;
    assert_eq!(detail["data"]["payment"]["status"], "completed");
    assert!(!detail["data"]["payment"]["paid_at"].is_null());
    let actions: Vec<&str> = detail["data"]["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["action"].as_str())
        .collect();
    assert_eq!(actions, vec!["initiated", "collected"]);
}

#[tokio::test]
async fn customer_rates_delivered_order_once() {
    let app = TestApp::new().await;
    let (_, assignment_id) = assigned_order(&app).await;
    let rating_uri = format!("/api/v1/delivery/assignments/{}/rating", assignment_id);

    let (status, _) = app
        .post(&rating_uri, json!({ "rating": 5 }), &app.customer)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "not delivered yet");

    advance(&app, &assignment_id, "picked_up").await;
    advance(&app, &assignment_id, "delivered").await;

    let (status, _) = app
        .post(&rating_uri, json!({ "rating": 6 }), &app.customer)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, rated) = app
        .post(&rating_uri, json!({ "rating": 4, "comment": "Polite rider" }), &app.customer)
        .await;
    assert_eq!(status, StatusCode::CREATED, "{rated}");

    let (status, _) = app
        .post(&rating_uri, json!({ "rating": 1 }), &app.customer)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, agents) = app.get("/api/v1/users/agents", &app.admin).await;
    assert_eq!(decimal(&agents["data"]["items"][0]["profile"]["rating"]), dec!(4));

    let (status, ratings) = app.get("/api/v1/delivery/ratings", &app.agent).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ratings["data"]["total"], 1);

    let (status, _) = app.get("/api/v1/delivery/ratings", &app.customer).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, detail) = app
        .get(&format!("/api/v1/delivery/assignments/{}", assignment_id), &app.customer)
        .await;
    assert_eq!(detail["data"]["rating"]["rating"], 4);
}

#[tokio::test]
async fn agents_report_locations_within_range() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post(
            "/api/v1/delivery/location",
            json!({ "latitude": "91.0", "longitude": "90.4" }),
            &app.agent,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/api/v1/delivery/location",
            json!({ "latitude": "23.8103", "longitude": "90.4125", "address": "Dhaka" }),
            &app.agent,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (_, history) = app.get("/api/v1/delivery/location", &app.agent).await;
    assert_eq!(history["data"]["total"], 1);
    assert_eq!(decimal(&history["data"]["items"][0]["latitude"]), dec!(23.8103));

    let (status, _) = app
        .post(
            "/api/v1/delivery/location",
            json!({ "latitude": "23.8", "longitude": "90.4" }),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn cancelled_order_cannot_be_marked_delivered() {
    let app = TestApp::new().await;
    app.seed_payment_method("cash_on_delivery", dec!(0), dec!(50000)).await;
    let (order_id, assignment_id) = assigned_order(&app).await;

    let (_, payment) = app
        .post(
            "/api/v1/payments",
            json!({ "order_id": order_id, "payment_method": "cash_on_delivery" }),
            &app.customer,
        )
        .await;
    let payment_id = payment["data"]["payment"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post(
            &format!("/api/v1/orders/{}/cancel", order_id),
            json!({
                "reason": "changed_mind",
                "refund_preference": "no_refund_needed",
                "confirm_cancellation": true
            }),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, _) = advance(&app, &assignment_id, "delivered").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = advance(&app, &assignment_id, "failed").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, detail) = app
        .get(&format!("/api/v1/delivery/assignments/{}", assignment_id), &app.admin)
        .await;
    assert_eq!(detail["data"]["order_status"], "cancelled");
    assert!(detail["data"]["assignment"]["actual_delivery_time"].is_null());
    assert_eq!(detail["data"]["timeline"].as_array().unwrap().len(), 1);

    let (_, payment) = app
        .get(&format!("/api/v1/payments/{}", payment_id), &app.admin)
        .await;
    assert_eq!(payment["data"]["payment"]["status"], "pending");

    let (_, agents) = app.get("/api/v1/users/agents", &app.admin).await;
    assert_eq!(agents["data"]["items"][0]["profile"]["total_deliveries"], 0);

    let (status, _) = app
        .post(
            &format!("/api/v1/delivery/assignments/{}/rating", assignment_id),
            json!({ "rating": 5 }),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delivering_a_confirmed_order_steps_through_dispatched() {
    let app = TestApp::new().await;
    let (order_id, assignment_id) = assigned_order(&app).await;

    let (status, detail) = advance(&app, &assignment_id, "delivered").await;
    assert_eq!(status, StatusCode::OK, "{detail}");
    assert_eq!(detail["data"]["order_status"], "delivered");

    let (_, history) = app
        .get(&format!("/api/v1/orders/{}/history", order_id), &app.customer)
        .await;
    let mut statuses: Vec<&str> = history["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|h| h["status"].as_str())
        .collect();
    statuses.sort_unstable();
    assert_eq!(statuses, vec!["confirmed", "delivered", "dispatched", "pending"]);
}

#[tokio::test]
async fn pickup_is_rejected_once_the_order_is_delivered() {
    let app = TestApp::new().await;
    let (order_id, assignment_id) = assigned_order(&app).await;
    for next in ["processing", "dispatched", "delivered"] {
        app.set_order_status(&order_id, next).await;
    }

    let (status, _) = advance(&app, &assignment_id, "picked_up").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The agent may still close the delivery out
    let (status, detail) = advance(&app, &assignment_id, "delivered").await;
    assert_eq!(status, StatusCode::OK, "{detail}");
    assert!(!detail["data"]["assignment"]["actual_delivery_time"].is_null());
}

mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, PASSWORD};
use serde_json::json;

#[tokio::test]
async fn customer_registers_logs_in_and_reads_profile() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/users/register",
            Some(json!({
                "username": "nusrat",
                "email": "Nusrat@Example.com",
                "password": "a-long-password",
                "first_name": "Nusrat",
                "last_name": "Jahan",
                "phone_number": "+8801812345678",
                "delivery_instructions": "Leave with the guard"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["user"]["user_type"], "customer");
    assert_eq!(body["data"]["user"]["city"], "Dhaka");
    assert_eq!(body["data"]["customer_profile"]["preferred_language"], "bn");

    let (status, login) = app
        .call(
            Method::POST,
            "/auth/login",
            Some(json!({ "username_or_email": "nusrat@example.com", "password": "a-long-password" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{login}");
    let token = login["access_token"].as_str().expect("access token").to_string();
    assert_eq!(login["user"]["username"], "nusrat");

    let (status, me) = app
        .call(Method::GET, "/api/v1/users/me", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["user"]["email"], "nusrat@example.com");
    assert!(me["data"]["agent_profile"].is_null());
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = TestApp::new().await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/users/register",
            Some(json!({
                "username": "rahim",
                "email": "someone-else@example.com",
                "password": "a-long-password",
                "phone_number": "01899999999"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/users/register",
            Some(json!({
                "username": "fresh_name",
                "email": "fresh@example.com",
                "password": "a-long-password",
                "phone_number": "01710000002"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "phone numbers are unique");
}

#[tokio::test]
async fn registration_validates_password_and_phone() {
    let app = TestApp::new().await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/users/register",
            Some(json!({
                "username": "shorty",
                "email": "shorty@example.com",
                "password": "short",
                "phone_number": "01811111111"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/users/register",
            Some(json!({
                "username": "badphone",
                "email": "badphone@example.com",
                "password": "a-long-password",
                "phone_number": "12-34"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn agent_registration_creates_vehicle_profile() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/users/register/agent",
            Some(json!({
                "username": "rider2",
                "email": "rider2@example.com",
                "password": "a-long-password",
                "phone_number": "01922222222",
                "license_number": "LIC-0002",
                "vehicle_type": "cycle",
                "vehicle_number": "CYC-9"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["user"]["user_type"], "delivery_agent");
    assert_eq!(body["data"]["agent_profile"]["is_available"], true);
    assert_eq!(body["data"]["agent_profile"]["total_deliveries"], 0);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/v1/users/register/agent",
            Some(json!({
                "username": "rider3",
                "email": "rider3@example.com",
                "password": "a-long-password",
                "phone_number": "01933333333",
                "license_number": "LIC-0002",
                "vehicle_type": "bike",
                "vehicle_number": "B-1"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "license numbers are unique");
}

#[tokio::test]
async fn wrong_password_and_unknown_user_are_unauthorized() {
    let app = TestApp::new().await;

    let (status, _) = app
        .call(
            Method::POST,
            "/auth/login",
            Some(json!({ "username_or_email": "rahim", "password": "not-the-password" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(
            Method::POST,
            "/auth/login",
            Some(json!({ "username_or_email": "ghost", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_issues_new_pair_and_logout_revokes_token() {
    let app = TestApp::new().await;

    let (status, login) = app
        .call(
            Method::POST,
            "/auth/login",
            Some(json!({ "username_or_email": "rahim", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let access = login["access_token"].as_str().unwrap().to_string();
    let refresh = login["refresh_token"].as_str().unwrap().to_string();

    let (status, refreshed) = app
        .call(
            Method::POST,
            "/auth/refresh",
            Some(json!({ "refresh_token": refresh })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(refreshed["access_token"].as_str().is_some());

    // An access token is not a refresh token
    let (status, _) = app
        .call(
            Method::POST,
            "/auth/refresh",
            Some(json!({ "refresh_token": access })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(Method::POST, "/auth/logout", None, Some(&access))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .call(Method::GET, "/api/v1/users/me", None, Some(&access))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn permission_gates_follow_roles() {
    let app = TestApp::new().await;

    let (status, _) = app.call(Method::GET, "/api/v1/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/v1/users", &app.customer).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/api/v1/system-logs", &app.agent).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(
            "/api/v1/orders",
            json!({ "delivery_address": "x", "cart_items": [] }),
            &app.agent,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "agents cannot place orders");

    let (status, body) = app.get("/api/v1/users?user_type=customer", &app.admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn admin_lists_agents_and_agents_toggle_only_themselves() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/v1/users/agents", &app.admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"][0]["user"]["username"], "karim");

    let uri = format!("/api/v1/users/agents/{}/availability", app.agent.id);
    let (status, body) = app.post(&uri, json!({}), &app.agent).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["is_available"], false);

    let (status, body) = app.post(&uri, json!({}), &app.admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_available"], true);

    let other = app.extra_customer("someone", "01744444444").await;
    let other_uri = format!("/api/v1/users/agents/{}/availability", other.id);
    let (status, _) = app.post(&other_uri, json!({}), &app.agent).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn profile_update_keeps_phone_numbers_unique() {
    let app = TestApp::new().await;

    let (status, body) = app
        .put(
            "/api/v1/users/me",
            json!({ "city": "Chattogram", "delivery_instructions": "Ring twice" }),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["user"]["city"], "Chattogram");
    assert_eq!(
        body["data"]["customer_profile"]["delivery_instructions"],
        "Ring twice"
    );

    let (status, _) = app
        .put(
            "/api/v1/users/me",
            json!({ "phone_number": "01710000003" }),
            &app.customer,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn health_and_status_endpoints_respond() {
    let app = TestApp::new().await;

    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.call(Method::GET, "/api/v1/status", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["environment"], "test");
    assert_eq!(body["data"]["currency"], "BDT");

    let response = app.request(Method::GET, "/metrics", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

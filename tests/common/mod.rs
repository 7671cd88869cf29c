#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use nagaribashi_express::{
    app_router,
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db,
    entities::{delivery_agent_profile::VehicleType, product::ProductCategory},
    events::{self, EventSender},
    services::{
        catalog::CreateProductRequest,
        payments::CreatePaymentMethodRequest,
        users::{AccountFields, RegisterAgentRequest, RegisterCustomerRequest},
    },
    AppState,
};

pub const PASSWORD: &str = "correct-horse-42";
const TEST_JWT_SECRET: &str =
    "t3st_s1gning_k3y_for_integration_runs_only_QWERTYUIOPASDFGHJKLZXCVBNM_0987654321";

/// A seeded account and a bearer token for it.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub token: String,
}

/// Application harness backed by a throwaway SQLite file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub auth_service: Arc<AuthService>,
    pub admin: TestUser,
    pub customer: TestUser,
    pub agent: TestUser,
    _event_task: tokio::task::JoinHandle<()>,
    _db_dir: TempDir,
}

pub fn account(username: &str, phone: &str) -> AccountFields {
    AccountFields {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password: PASSWORD.to_string(),
        first_name: "Test".to_string(),
        last_name: username.to_string(),
        phone_number: phone.to_string(),
        address: Some("12 Lake Road".to_string()),
        city: None,
        postal_code: None,
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("create temp dir");
        let db_path = db_dir.path().join("nagaribashi_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            TEST_JWT_SECRET.to_string(),
            3600,
            86_400,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 4;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        let db_arc = Arc::new(pool);

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx, db_arc.clone()));

        let auth_service = Arc::new(AuthService::new(AuthConfig::from(&cfg), db_arc.clone()));
        let state = AppState::new(db_arc, cfg, Some(event_sender));
        let router = app_router(state.clone(), auth_service.clone());

        let users = state.services.users.clone();
        let admin = users
            .create_admin(account("admin", "01710000001"))
            .await
            .expect("seed admin");
        let customer = users
            .register_customer(RegisterCustomerRequest {
                account: account("rahim", "01710000002"),
                preferred_language: None,
                emergency_contact: None,
                delivery_instructions: None,
            })
            .await
            .expect("seed customer");
        let agent = users
            .register_delivery_agent(RegisterAgentRequest {
                account: account("karim", "01710000003"),
                license_number: "LIC-0001".to_string(),
                vehicle_type: VehicleType::Bike,
                vehicle_number: "DHA-1234".to_string(),
            })
            .await
            .expect("seed agent");

        let mut app = Self {
            router,
            state,
            auth_service,
            admin: TestUser {
                id: admin.id,
                username: admin.username,
                token: String::new(),
            },
            customer: TestUser {
                id: customer.user.id,
                username: customer.user.username,
                token: String::new(),
            },
            agent: TestUser {
                id: agent.user.id,
                username: agent.user.username,
                token: String::new(),
            },
            _event_task: event_task,
            _db_dir: db_dir,
        };
        app.admin.token = app.token_for(app.admin.id).await;
        app.customer.token = app.token_for(app.customer.id).await;
        app.agent.token = app.token_for(app.agent.id).await;
        app
    }

    /// Mints an access token for an existing account.
    pub async fn token_for(&self, user_id: Uuid) -> String {
        let user = self
            .state
            .services
            .users
            .find_user(user_id)
            .await
            .expect("user exists");
        self.auth_service
            .generate_token(&user)
            .expect("generate token")
            .access_token
    }

    /// Registers another customer and returns it with a token.
    pub async fn extra_customer(&self, username: &str, phone: &str) -> TestUser {
        let created = self
            .state
            .services
            .users
            .register_customer(RegisterCustomerRequest {
                account: account(username, phone),
                preferred_language: None,
                emergency_contact: None,
                delivery_instructions: None,
            })
            .await
            .expect("register extra customer");
        TestUser {
            id: created.user.id,
            username: created.user.username,
            token: self.token_for(created.user.id).await,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("serialize request body"))
            }
            None => Body::empty(),
        };

        let request = builder.body(body).expect("build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request and returns the status with the decoded JSON body.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body, token).await;
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn get(&self, uri: &str, user: &TestUser) -> (StatusCode, Value) {
        self.call(Method::GET, uri, None, Some(&user.token)).await
    }

    pub async fn post(&self, uri: &str, body: Value, user: &TestUser) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(body), Some(&user.token))
            .await
    }

    pub async fn put(&self, uri: &str, body: Value, user: &TestUser) -> (StatusCode, Value) {
        self.call(Method::PUT, uri, Some(body), Some(&user.token))
            .await
    }

    pub async fn seed_product(&self, name: &str, price: Decimal, stock: i32) -> Uuid {
        self.state
            .services
            .catalog
            .create_product(CreateProductRequest {
                name: name.to_string(),
                description: format!("{} for tests", name),
                category: ProductCategory::Groceries,
                price,
                stock_quantity: stock,
                image_path: None,
            })
            .await
            .expect("seed product")
            .product
            .id
    }

    pub async fn seed_payment_method(&self, code: &str, min: Decimal, max: Decimal) {
        self.state
            .services
            .payments
            .create_payment_method(CreatePaymentMethodRequest {
                name: code.to_uppercase(),
                code: code.to_string(),
                description: None,
                processing_fee: Decimal::ZERO,
                min_amount: min,
                max_amount: max,
                is_active: true,
            })
            .await
            .expect("seed payment method");
    }

    pub async fn stock_of(&self, product_id: Uuid) -> i32 {
        self.state
            .services
            .catalog
            .find_product(product_id)
            .await
            .expect("product exists")
            .stock_quantity
    }

    /// Places an order as `user` and returns the `data` object.
    pub async fn place_order(&self, user: &TestUser, lines: &[(Uuid, i32)]) -> Value {
        let cart: Vec<Value> = lines
            .iter()
            .map(|(id, quantity)| json!({ "id": id, "quantity": quantity }))
            .collect();
        let (status, body) = self
            .post(
                "/api/v1/orders",
                json!({
                    "delivery_address": "House 7, Road 2, Mirpur",
                    "cart_items": cart,
                }),
                user,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "order creation failed: {body}");
        body["data"].clone()
    }

    /// Moves an order through the admin status endpoint.
    pub async fn set_order_status(&self, order_id: &str, status: &str) {
        let (code, body) = self
            .put(
                &format!("/api/v1/orders/{}/status", order_id),
                json!({ "status": status }),
                &self.admin,
            )
            .await;
        assert_eq!(code, StatusCode::OK, "status change to {status} failed: {body}");
    }

    /// Waits for the event processor to persist a notification for `user`
    /// whose title contains `needle`.
    pub async fn wait_for_notification(&self, user: &TestUser, needle: &str) -> Value {
        for _ in 0..50 {
            let (status, body) = self.get("/api/v1/notifications?page=1", user).await;
            assert_eq!(status, StatusCode::OK);
            if let Some(found) = body["data"]["items"]
                .as_array()
                .and_then(|items| {
                    items.iter().find(|n| {
                        n["title"]
                            .as_str()
                            .map_or(false, |title| title.contains(needle))
                    })
                })
            {
                return found.clone();
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("no notification containing {needle:?} for {}", user.username);
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
}

/// Decimals serialize as strings.
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("not a decimal: {other}"),
    }
}

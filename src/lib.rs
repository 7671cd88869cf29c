//! Nagaribashi Express API Library
//!
//! Delivery-commerce backend: accounts, catalog, orders, payments,
//! deliveries, reviews, dashboards and notifications.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod metrics;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::auth::consts as perm;
use crate::auth::{AuthRouterExt, AuthService};
use crate::services::PageRequest;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: Option<Arc<events::EventSender>>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: Option<Arc<events::EventSender>>,
    ) -> Self {
        let services = handlers::AppServices::new(db.clone(), event_sender.clone());
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    /// Falls back to the configured default page size.
    pub limit: Option<u64>,
}

pub fn default_page() -> u64 {
    1
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: PageRequest) -> Self {
        Self {
            items,
            total,
            page: page.page,
            limit: page.limit,
            total_pages: total.div_ceil(page.limit.max(1)),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-err"), async {
                ApiResponse::<()>::error("oops".into())
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
        assert!(!meta.timestamp.is_empty());
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = PaginatedResponse::new(vec![1, 2], 41, PageRequest::new(3, 20));
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 3);

        let empty = PaginatedResponse::<u8>::new(Vec::new(), 0, PageRequest::new(1, 20));
        assert_eq!(empty.total_pages, 0);
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Routes mounted under `/api/v1`. Each group is gated by one permission;
/// administrators pass every gate.
pub fn api_v1_routes() -> Router<AppState> {
    use handlers::{catalog, dashboard, delivery, notifications, orders, payments, reviews, users};

    let public = Router::new()
        .route("/status", get(api_status))
        .route("/users/register", post(users::register_customer))
        .route("/users/register/agent", post(users::register_delivery_agent))
        .route("/products", get(catalog::list_products))
        .route("/products/:id", get(catalog::get_product))
        .route("/products/:id/reviews", get(reviews::product_reviews))
        .route("/payment-methods", get(payments::list_payment_methods))
        .route("/delivery/areas", get(delivery::list_delivery_areas))
        .route("/dashboard/home", get(dashboard::home_stats));

    let public_with_viewer = Router::new()
        .route("/reviews/:id", get(reviews::get_review))
        .with_optional_auth();

    // Users
    let profile_read = Router::new()
        .route("/users/me", get(users::me))
        .with_permission(perm::PROFILE_READ);
    let profile_update = Router::new()
        .route("/users/me", put(users::update_profile))
        .with_permission(perm::PROFILE_UPDATE);
    let users_admin = Router::new()
        .route("/users", get(users::list_users))
        .with_permission(perm::USERS_READ);
    let agents_read = Router::new()
        .route("/users/agents", get(users::list_delivery_agents))
        .with_permission(perm::AGENTS_READ);
    let agents_availability = Router::new()
        .route(
            "/users/agents/:id/availability",
            post(users::toggle_agent_availability),
        )
        .with_permission(perm::AGENTS_AVAILABILITY);

    // Catalog
    let products_manage = Router::new()
        .route("/products", post(catalog::create_product))
        .route(
            "/products/:id",
            put(catalog::update_product).delete(catalog::delete_product),
        )
        .with_permission(perm::PRODUCTS_MANAGE);

    // Orders
    let orders_read = Router::new()
        .route("/orders", get(orders::list_orders))
        .route("/orders/:id", get(orders::get_order))
        .route("/orders/:id/items", get(orders::get_order_items))
        .route("/orders/:id/history", get(orders::get_order_history))
        .route("/orders/:id/invoice", get(orders::get_invoice))
        .route("/orders/:id/cancellation", get(orders::get_cancellation_info))
        .with_permission(perm::ORDERS_READ);
    let orders_create = Router::new()
        .route("/orders", post(orders::create_order))
        .with_permission(perm::ORDERS_CREATE);
    let orders_cancel = Router::new()
        .route("/orders/:id/cancel", post(orders::cancel_order))
        .with_permission(perm::ORDERS_CANCEL);
    let orders_update = Router::new()
        .route("/orders/:id/status", put(orders::update_order_status))
        .with_permission(perm::ORDERS_UPDATE);

    // Payments
    let payment_methods_manage = Router::new()
        .route("/payment-methods", post(payments::create_payment_method))
        .with_permission(perm::PAYMENT_METHODS_MANAGE);
    let payments_read = Router::new()
        .route("/payments", get(payments::list_payments))
        .route("/payments/:id", get(payments::get_payment))
        .with_permission(perm::PAYMENTS_READ);
    let payments_create = Router::new()
        .route("/payments", post(payments::create_payment))
        .with_permission(perm::PAYMENTS_CREATE);
    let payments_update = Router::new()
        .route("/payments/:id/status", put(payments::update_payment_status))
        .with_permission(perm::PAYMENTS_UPDATE);
    let refunds_request = Router::new()
        .route("/payments/:id/refunds", post(payments::request_refund))
        .with_permission(perm::REFUNDS_REQUEST);
    let refunds_read = Router::new()
        .route("/refunds", get(payments::list_refunds))
        .with_permission(perm::REFUNDS_READ);
    let refunds_process = Router::new()
        .route("/refunds/:id/process", post(payments::process_refund))
        .with_permission(perm::REFUNDS_PROCESS);

    // Delivery
    let delivery_areas_manage = Router::new()
        .route("/delivery/areas", post(delivery::create_delivery_area))
        .with_permission(perm::DELIVERY_AREAS_MANAGE);
    let deliveries_assign = Router::new()
        .route("/delivery/assignments", post(delivery::assign_delivery))
        .with_permission(perm::DELIVERIES_ASSIGN);
    let deliveries_read = Router::new()
        .route("/delivery/assignments", get(delivery::list_deliveries))
        .route("/delivery/assignments/:id", get(delivery::get_delivery))
        .with_permission(perm::DELIVERIES_READ);
    let deliveries_update = Router::new()
        .route(
            "/delivery/assignments/:id/status",
            post(delivery::update_delivery_status),
        )
        .with_permission(perm::DELIVERIES_UPDATE);
    let deliveries_rate = Router::new()
        .route(
            "/delivery/assignments/:id/rating",
            post(delivery::rate_delivery),
        )
        .with_permission(perm::DELIVERIES_RATE);
    let locations = Router::new()
        .route(
            "/delivery/location",
            post(delivery::update_location).get(delivery::location_history),
        )
        .with_permission(perm::LOCATIONS_UPDATE);
    let ratings_read = Router::new()
        .route("/delivery/ratings", get(delivery::list_ratings))
        .with_permission(perm::RATINGS_READ);

    // Reviews
    let reviews_create = Router::new()
        .route("/reviews", post(reviews::create_review))
        .route("/reviews/mine", get(reviews::my_reviews))
        .route("/reviews/:id/images", post(reviews::add_review_image))
        .with_permission(perm::REVIEWS_CREATE);
    let reviews_vote = Router::new()
        .route("/reviews/:id/helpful", post(reviews::vote_helpful))
        .with_permission(perm::REVIEWS_VOTE);
    let reviews_report = Router::new()
        .route("/reviews/:id/report", post(reviews::report_review))
        .with_permission(perm::REVIEWS_REPORT);
    let reviews_respond = Router::new()
        .route("/reviews/:id/response", post(reviews::respond_to_review))
        .with_permission(perm::REVIEWS_RESPOND);
    let reviews_moderate = Router::new()
        .route("/reviews/reports", get(reviews::list_reports))
        .route(
            "/reviews/reports/:id/moderate",
            post(reviews::moderate_report),
        )
        .with_permission(perm::REVIEWS_MODERATE);

    // Dashboard and analytics
    let dashboard_read = Router::new()
        .route("/dashboard/me", get(dashboard::user_dashboard))
        .with_permission(perm::DASHBOARD_READ);
    let dashboard_admin = Router::new()
        .route("/dashboard/admin", get(dashboard::admin_dashboard))
        .with_permission(perm::DASHBOARD_ADMIN);
    let analytics_read = Router::new()
        .route("/dashboard/analytics", get(dashboard::analytics))
        .route("/dashboard/reports/orders", get(dashboard::order_report))
        .route("/dashboard/reports/revenue", get(dashboard::revenue_report))
        .route("/dashboard/reports/deliveries", get(dashboard::delivery_report))
        .with_permission(perm::ANALYTICS_READ);
    let analytics_write = Router::new()
        .route(
            "/dashboard/analytics/snapshot",
            post(dashboard::record_snapshot),
        )
        .with_permission(perm::ANALYTICS_WRITE);

    // Notifications and audit log
    let notifications_read = Router::new()
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/unread-count", get(notifications::unread_count))
        .with_permission(perm::NOTIFICATIONS_READ);
    let notifications_update = Router::new()
        .route("/notifications/:id/read", post(notifications::mark_read))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .with_permission(perm::NOTIFICATIONS_UPDATE);
    let system_logs = Router::new()
        .route("/system-logs", get(notifications::list_system_logs))
        .with_permission(perm::SYSTEM_LOGS_READ);

    Router::new()
        .merge(public)
        .merge(public_with_viewer)
        .merge(profile_read)
        .merge(profile_update)
        .merge(users_admin)
        .merge(agents_read)
        .merge(agents_availability)
        .merge(products_manage)
        .merge(orders_read)
        .merge(orders_create)
        .merge(orders_cancel)
        .merge(orders_update)
        .merge(payment_methods_manage)
        .merge(payments_read)
        .merge(payments_create)
        .merge(payments_update)
        .merge(refunds_request)
        .merge(refunds_read)
        .merge(refunds_process)
        .merge(delivery_areas_manage)
        .merge(deliveries_assign)
        .merge(deliveries_read)
        .merge(deliveries_update)
        .merge(deliveries_rate)
        .merge(locations)
        .merge(ratings_read)
        .merge(reviews_create)
        .merge(reviews_vote)
        .merge(reviews_report)
        .merge(reviews_respond)
        .merge(reviews_moderate)
        .merge(dashboard_read)
        .merge(dashboard_admin)
        .merge(analytics_read)
        .merge(analytics_write)
        .merge(notifications_read)
        .merge(notifications_update)
        .merge(system_logs)
}

/// Full application router without transport layers (CORS, compression),
/// which `main` adds on top.
pub fn app_router(state: AppState, auth_service: Arc<AuthService>) -> Router {
    Router::<AppState>::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics::metrics_handler))
        .route("/metrics/json", get(metrics::metrics_json_handler))
        .nest("/api/v1", api_v1_routes())
        .nest("/auth", auth::auth_routes().with_state(auth_service.clone()))
        .merge(openapi::swagger_ui())
        .layer(axum::middleware::from_fn(metrics::metrics_middleware))
        .layer(crate::tracing::configure_http_tracing())
        // Auth middleware reads the service from request extensions
        .layer(axum::Extension(auth_service))
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

async fn api_status(State(state): State<AppState>) -> Json<ApiResponse<Value>> {
    Json(ApiResponse::success(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "currency": state.config.currency,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = db::check_connection(&state.db).await.is_ok();
    crate::metrics::set_gauge("database_up", if healthy { 1.0 } else { 0.0 });

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let label = if healthy { "healthy" } else { "unhealthy" };

    (
        status,
        Json(json!({
            "status": label,
            "database": label,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}

pub mod prelude {
    pub use crate::auth::{AuthService, AuthUser};
    pub use crate::config::AppConfig;
    pub use crate::db::*;
    pub use crate::errors::*;
    pub use crate::events::*;
    pub use crate::services::*;
    pub use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};
}

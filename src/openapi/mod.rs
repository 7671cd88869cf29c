use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Nagaribashi Express API",
        version = "1.0.0",
        description = r#"
# Nagaribashi Express

Delivery-commerce backend for a single-city grocery and goods service.

## Roles

- **Customer**: browses the catalog, places and cancels orders, pays, requests refunds and reviews delivered products.
- **Delivery agent**: receives assignments, reports delivery stages and location.
- **Admin**: manages the catalog, payment methods, delivery areas, refunds, moderation and analytics.

## Authentication

Obtain a token pair from `POST /auth/login` and send the access token on every call:

```
Authorization: Bearer <access-token>
```

## Errors

Failures return `{error, message, details?, request_id?, timestamp}` with a matching HTTP status.

## Pagination

List endpoints accept `page` (1-based) and `limit` (default 20, max 100). The catalog defaults to 12 per page and notifications always use 20.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Login, token refresh and logout"),
        (name = "users", description = "Registration, profiles and delivery agents"),
        (name = "catalog", description = "Products"),
        (name = "orders", description = "Checkout, order lifecycle and cancellation"),
        (name = "payments", description = "Payment methods, payments and refunds"),
        (name = "delivery", description = "Areas, assignments, tracking and ratings"),
        (name = "reviews", description = "Verified reviews and moderation"),
        (name = "dashboard", description = "Statistics, analytics and reports"),
        (name = "notifications", description = "In-app notifications and the audit log")
    ),
    paths(
        // Auth
        crate::auth::login_handler,
        crate::auth::refresh_token_handler,
        crate::auth::logout_handler,

        // Users
        crate::handlers::users::register_customer,
        crate::handlers::users::register_delivery_agent,
        crate::handlers::users::me,
        crate::handlers::users::update_profile,
        crate::handlers::users::list_users,
        crate::handlers::users::list_delivery_agents,
        crate::handlers::users::toggle_agent_availability,

        // Catalog
        crate::handlers::catalog::list_products,
        crate::handlers::catalog::get_product,
        crate::handlers::catalog::create_product,
        crate::handlers::catalog::update_product,
        crate::handlers::catalog::delete_product,

        // Orders
        crate::handlers::orders::create_order,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::get_order_items,
        crate::handlers::orders::get_order_history,
        crate::handlers::orders::get_invoice,
        crate::handlers::orders::get_cancellation_info,
        crate::handlers::orders::cancel_order,
        crate::handlers::orders::update_order_status,

        // Payments
        crate::handlers::payments::list_payment_methods,
        crate::handlers::payments::create_payment_method,
        crate::handlers::payments::create_payment,
        crate::handlers::payments::list_payments,
        crate::handlers::payments::get_payment,
        crate::handlers::payments::update_payment_status,
        crate::handlers::payments::request_refund,
        crate::handlers::payments::list_refunds,
        crate::handlers::payments::process_refund,

        // Delivery
        crate::handlers::delivery::list_delivery_areas,
        crate::handlers::delivery::create_delivery_area,
        crate::handlers::delivery::assign_delivery,
        crate::handlers::delivery::list_deliveries,
        crate::handlers::delivery::get_delivery,
        crate::handlers::delivery::update_delivery_status,
        crate::handlers::delivery::update_location,
        crate::handlers::delivery::location_history,
        crate::handlers::delivery::rate_delivery,
        crate::handlers::delivery::list_ratings,

        // Reviews
        crate::handlers::reviews::create_review,
        crate::handlers::reviews::product_reviews,
        crate::handlers::reviews::my_reviews,
        crate::handlers::reviews::get_review,
        crate::handlers::reviews::vote_helpful,
        crate::handlers::reviews::respond_to_review,
        crate::handlers::reviews::report_review,
        crate::handlers::reviews::add_review_image,
        crate::handlers::reviews::list_reports,
        crate::handlers::reviews::moderate_report,

        // Dashboard
        crate::handlers::dashboard::home_stats,
        crate::handlers::dashboard::admin_dashboard,
        crate::handlers::dashboard::user_dashboard,
        crate::handlers::dashboard::analytics,
        crate::handlers::dashboard::order_report,
        crate::handlers::dashboard::revenue_report,
        crate::handlers::dashboard::delivery_report,
        crate::handlers::dashboard::record_snapshot,

        // Notifications
        crate::handlers::notifications::list_notifications,
        crate::handlers::notifications::unread_count,
        crate::handlers::notifications::mark_read,
        crate::handlers::notifications::mark_all_read,
        crate::handlers::notifications::list_system_logs,
    ),
    components(
        schemas(
            // Enums shared across requests and filters
            crate::entities::user::UserType,
            crate::entities::product::ProductCategory,
            crate::entities::order::OrderStatus,
            crate::entities::order::DeliveryType,
            crate::entities::order::CancellationReason,
            crate::entities::order::RefundPreference,
            crate::entities::payment::PaymentStatus,
            crate::entities::refund::RefundStatus,
            crate::entities::delivery_status::DeliveryStage,
            crate::entities::review_report::ReportReason,
            crate::entities::review_report::ReportStatus,
            crate::entities::notification::NotificationType,
            crate::entities::notification::NotificationPriority,
            crate::entities::system_log::LogLevel,
            crate::entities::system_log::LogAction,
            crate::entities::analytics_data::MetricType,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

/// Registers the `Bearer` JWT scheme referenced by secured paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "Bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_area() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string(&openapi).expect("serializable");
        assert!(json.contains("Nagaribashi Express API"));
        for path in [
            "/auth/login",
            "/api/v1/orders/{id}/cancel",
            "/api/v1/payments/{id}/refunds",
            "/api/v1/delivery/assignments/{id}/status",
            "/api/v1/reviews/reports/{id}/moderate",
            "/api/v1/dashboard/reports/orders",
            "/api/v1/dashboard/reports/revenue",
            "/api/v1/dashboard/reports/deliveries",
            "/api/v1/system-logs",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let openapi = ApiDocV1::openapi();
        let components = openapi.components.expect("components");
        assert!(components.security_schemes.contains_key("Bearer"));
    }
}

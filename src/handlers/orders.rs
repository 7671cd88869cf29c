use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::AuthUser;
use crate::entities::order::{self, OrderStatus};
use crate::entities::order_status_history;
use crate::errors::ServiceError;
use crate::services::orders::{
    CancelOrderRequest, CancelOrderResponse, CancellationInfo, CreateOrderRequest,
    InvoiceResponse, OrderDetailResponse, OrderItemResponse, UpdateOrderStatusRequest,
};
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct OrderListQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    pub limit: Option<u64>,
    pub status: Option<OrderStatus>,
    /// Matches the order number.
    pub search: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/orders",
    summary = "Place order from cart",
    description = "Checks every cart line against stock, then creates the order, its items and the stock decrements in one transaction",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<OrderDetailResponse>),
        (status = 400, description = "Empty cart or invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown product in cart", body = crate::errors::ErrorResponse),
        (status = 422, description = "Some lines are out of stock", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .services
        .orders
        .create_order_from_cart(&user, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    summary = "List orders",
    description = "Admins see all orders, customers their own and agents the orders assigned to them",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders page", body = ApiResponse<PaginatedResponse<order::Model>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<PaginatedResponse<order::Model>> {
    let page = state.page(query.page, query.limit);
    let orders = state
        .services
        .orders
        .list_orders(&user, page, query.status, query.search)
        .await?;
    Ok(Json(ApiResponse::success(orders)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    summary = "Get order",
    params(("id" = String, Path, description = "Order id or order number")),
    responses(
        (status = 200, description = "Order with items, history and cancellation info", body = ApiResponse<OrderDetailResponse>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    user: AuthUser,
) -> ApiResult<OrderDetailResponse> {
    let order = state.services.orders.get_order(&user, &reference).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/items",
    summary = "Order items",
    params(("id" = String, Path, description = "Order id or order number")),
    responses(
        (status = 200, description = "Line items", body = ApiResponse<Vec<OrderItemResponse>>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn get_order_items(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    user: AuthUser,
) -> ApiResult<Vec<OrderItemResponse>> {
    let items = state.services.orders.order_items(&user, &reference).await?;
    Ok(Json(ApiResponse::success(items)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/history",
    summary = "Order status history",
    params(("id" = String, Path, description = "Order id or order number")),
    responses(
        (status = 200, description = "History, newest first", body = ApiResponse<Vec<order_status_history::Model>>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn get_order_history(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    user: AuthUser,
) -> ApiResult<Vec<order_status_history::Model>> {
    let history = state.services.orders.order_history(&user, &reference).await?;
    Ok(Json(ApiResponse::success(history)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/invoice",
    summary = "Order invoice",
    params(("id" = String, Path, description = "Order id or order number")),
    responses(
        (status = 200, description = "Invoice", body = ApiResponse<InvoiceResponse>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    user: AuthUser,
) -> ApiResult<InvoiceResponse> {
    let invoice = state.services.orders.invoice(&user, &reference).await?;
    Ok(Json(ApiResponse::success(invoice)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/cancellation",
    summary = "Cancellation window",
    params(("id" = String, Path, description = "Order id or order number")),
    responses(
        (status = 200, description = "Whether the order can still be cancelled", body = ApiResponse<CancellationInfo>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn get_cancellation_info(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    user: AuthUser,
) -> ApiResult<CancellationInfo> {
    let info = state
        .services
        .orders
        .cancellation_info(&user, &reference)
        .await?;
    Ok(Json(ApiResponse::success(info)))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/cancel",
    summary = "Cancel order",
    params(("id" = String, Path, description = "Order id or order number")),
    request_body = CancelOrderRequest,
    responses(
        (status = 200, description = "Order cancelled", body = ApiResponse<CancelOrderResponse>),
        (status = 400, description = "Order can no longer be cancelled", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order changed concurrently", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    user: AuthUser,
    Json(payload): Json<CancelOrderRequest>,
) -> ApiResult<CancelOrderResponse> {
    let cancelled = state
        .services
        .orders
        .cancel_order(&user, &reference, payload)
        .await?;
    Ok(Json(ApiResponse::success(cancelled)))
}

#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/status",
    summary = "Update order status",
    params(("id" = String, Path, description = "Order id or order number")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<OrderDetailResponse>),
        (status = 400, description = "Transition not allowed", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order changed concurrently", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    user: AuthUser,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> ApiResult<OrderDetailResponse> {
    let order = state
        .services
        .orders
        .update_order_status(&user, &reference, payload)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

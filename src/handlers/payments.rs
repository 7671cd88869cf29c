use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::{
    payment::{self, PaymentStatus},
    payment_method,
    refund::{self, RefundStatus},
};
use crate::errors::ServiceError;
use crate::services::payments::{
    CreatePaymentMethodRequest, CreatePaymentRequest, PaymentDetailResponse,
    ProcessRefundRequest, RefundRequest, UpdatePaymentStatusRequest,
};
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct PaymentListQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    pub limit: Option<u64>,
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RefundListQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    pub limit: Option<u64>,
    pub status: Option<RefundStatus>,
}

#[utoipa::path(
    get,
    path = "/api/v1/payment-methods",
    summary = "Active payment methods",
    responses(
        (status = 200, description = "Methods ordered by name", body = ApiResponse<Vec<payment_method::Model>>),
    ),
    tag = "payments"
)]
pub async fn list_payment_methods(
    State(state): State<AppState>,
) -> ApiResult<Vec<payment_method::Model>> {
    let methods = state.services.payments.list_payment_methods().await?;
    Ok(Json(ApiResponse::success(methods)))
}

#[utoipa::path(
    post,
    path = "/api/v1/payment-methods",
    summary = "Create payment method",
    request_body = CreatePaymentMethodRequest,
    responses(
        (status = 201, description = "Method created", body = ApiResponse<payment_method::Model>),
        (status = 409, description = "Code already in use", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "payments"
)]
pub async fn create_payment_method(
    State(state): State<AppState>,
    Json(payload): Json<CreatePaymentMethodRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let method = state.services.payments.create_payment_method(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(method))))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments",
    summary = "Pay for an order",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment initiated", body = ApiResponse<PaymentDetailResponse>),
        (status = 400, description = "Order not payable or amount outside method limits", body = crate::errors::ErrorResponse),
        (status = 403, description = "Not your order", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order or method not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "payments"
)]
pub async fn create_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let payment = state.services.payments.create_payment(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(payment))))
}

#[utoipa::path(
    get,
    path = "/api/v1/payments",
    summary = "List payments",
    params(PaymentListQuery),
    responses(
        (status = 200, description = "Payments page", body = ApiResponse<PaginatedResponse<payment::Model>>),
    ),
    security(("Bearer" = [])),
    tag = "payments"
)]
pub async fn list_payments(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PaymentListQuery>,
) -> ApiResult<PaginatedResponse<payment::Model>> {
    let page = state.page(query.page, query.limit);
    let payments = state
        .services
        .payments
        .list_payments(&user, page, query.status)
        .await?;
    Ok(Json(ApiResponse::success(payments)))
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/{id}",
    summary = "Get payment",
    params(("id" = Uuid, Path, description = "Payment id")),
    responses(
        (status = 200, description = "Payment with transaction log and refunds", body = ApiResponse<PaymentDetailResponse>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Payment not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "payments"
)]
pub async fn get_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
    user: AuthUser,
) -> ApiResult<PaymentDetailResponse> {
    let payment = state.services.payments.get_payment(&user, payment_id).await?;
    Ok(Json(ApiResponse::success(payment)))
}

#[utoipa::path(
    put,
    path = "/api/v1/payments/{id}/status",
    summary = "Update payment status",
    params(("id" = Uuid, Path, description = "Payment id")),
    request_body = UpdatePaymentStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<PaymentDetailResponse>),
        (status = 404, description = "Payment not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "payments"
)]
pub async fn update_payment_status(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentStatusRequest>,
) -> ApiResult<PaymentDetailResponse> {
    let payment = state
        .services
        .payments
        .update_payment_status(payment_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(payment)))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/{id}/refunds",
    summary = "Request refund",
    params(("id" = Uuid, Path, description = "Payment id")),
    request_body = RefundRequest,
    responses(
        (status = 201, description = "Refund requested", body = ApiResponse<refund::Model>),
        (status = 400, description = "Payment not completed or amount too large", body = crate::errors::ErrorResponse),
        (status = 403, description = "Not your payment", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "payments"
)]
pub async fn request_refund(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
    user: AuthUser,
    Json(payload): Json<RefundRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let refund = state
        .services
        .payments
        .request_refund(&user, payment_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(refund))))
}

#[utoipa::path(
    get,
    path = "/api/v1/refunds",
    summary = "List refunds",
    params(RefundListQuery),
    responses(
        (status = 200, description = "Refunds page", body = ApiResponse<PaginatedResponse<refund::Model>>),
    ),
    security(("Bearer" = [])),
    tag = "payments"
)]
pub async fn list_refunds(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<RefundListQuery>,
) -> ApiResult<PaginatedResponse<refund::Model>> {
    let page = state.page(query.page, query.limit);
    let refunds = state
        .services
        .payments
        .list_refunds(&user, page, query.status)
        .await?;
    Ok(Json(ApiResponse::success(refunds)))
}

#[utoipa::path(
    post,
    path = "/api/v1/refunds/{id}/process",
    summary = "Approve or reject refund",
    params(("id" = Uuid, Path, description = "Refund id")),
    request_body = ProcessRefundRequest,
    responses(
        (status = 200, description = "Refund processed", body = ApiResponse<refund::Model>),
        (status = 400, description = "Refund already processed", body = crate::errors::ErrorResponse),
        (status = 404, description = "Refund not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "payments"
)]
pub async fn process_refund(
    State(state): State<AppState>,
    Path(refund_id): Path<Uuid>,
    user: AuthUser,
    Json(payload): Json<ProcessRefundRequest>,
) -> ApiResult<refund::Model> {
    let refund = state
        .services
        .payments
        .process_refund(&user, refund_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(refund)))
}

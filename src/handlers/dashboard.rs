use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::AuthUser;
use crate::services::dashboard::{
    AdminDashboard, AnalyticsResponse, DeliveryReport, HomeStats, OrderReport, RevenueReport,
    SnapshotRequest, SnapshotResponse, UserDashboard,
};
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportQuery {
    /// Defaults to 30 days before `end_date`.
    pub start_date: Option<NaiveDate>,
    /// Defaults to today.
    pub end_date: Option<NaiveDate>,
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/home",
    summary = "Storefront statistics",
    responses(
        (status = 200, description = "Public counters", body = ApiResponse<HomeStats>),
    ),
    tag = "dashboard"
)]
pub async fn home_stats(State(state): State<AppState>) -> ApiResult<HomeStats> {
    let stats = state.services.dashboard.home_stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/admin",
    summary = "Administrator dashboard",
    responses(
        (status = 200, description = "Order, revenue and user statistics", body = ApiResponse<AdminDashboard>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "dashboard"
)]
pub async fn admin_dashboard(State(state): State<AppState>) -> ApiResult<AdminDashboard> {
    let dashboard = state.services.dashboard.admin_dashboard().await?;
    Ok(Json(ApiResponse::success(dashboard)))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/me",
    summary = "Personal dashboard",
    responses(
        (status = 200, description = "Role specific statistics", body = ApiResponse<UserDashboard>),
    ),
    security(("Bearer" = [])),
    tag = "dashboard"
)]
pub async fn user_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<UserDashboard> {
    let dashboard = state.services.dashboard.user_dashboard(&user).await?;
    Ok(Json(ApiResponse::success(dashboard)))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/analytics",
    summary = "Thirty day analytics",
    responses(
        (status = 200, description = "Daily series and category breakdown", body = ApiResponse<AnalyticsResponse>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "dashboard"
)]
pub async fn analytics(State(state): State<AppState>) -> ApiResult<AnalyticsResponse> {
    let analytics = state.services.dashboard.analytics().await?;
    Ok(Json(ApiResponse::success(analytics)))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/reports/orders",
    summary = "Order report",
    params(ReportQuery),
    responses(
        (status = 200, description = "Orders in the date range", body = ApiResponse<OrderReport>),
        (status = 400, description = "Start date after end date", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "dashboard"
)]
pub async fn order_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<OrderReport> {
    let report = state
        .services
        .dashboard
        .order_report(query.start_date, query.end_date)
        .await?;
    Ok(Json(ApiResponse::success(report)))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/reports/revenue",
    summary = "Revenue report",
    params(ReportQuery),
    responses(
        (status = 200, description = "Completed payments in the date range", body = ApiResponse<RevenueReport>),
        (status = 400, description = "Start date after end date", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "dashboard"
)]
pub async fn revenue_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<RevenueReport> {
    let report = state
        .services
        .dashboard
        .revenue_report(query.start_date, query.end_date)
        .await?;
    Ok(Json(ApiResponse::success(report)))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/reports/deliveries",
    summary = "Delivery report",
    params(ReportQuery),
    responses(
        (status = 200, description = "Assignments made in the date range", body = ApiResponse<DeliveryReport>),
        (status = 400, description = "Start date after end date", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "dashboard"
)]
pub async fn delivery_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<DeliveryReport> {
    let report = state
        .services
        .dashboard
        .delivery_report(query.start_date, query.end_date)
        .await?;
    Ok(Json(ApiResponse::success(report)))
}

#[utoipa::path(
    post,
    path = "/api/v1/dashboard/analytics/snapshot",
    summary = "Record daily analytics",
    request_body = SnapshotRequest,
    responses(
        (status = 200, description = "Metrics stored for the day", body = ApiResponse<SnapshotResponse>),
    ),
    security(("Bearer" = [])),
    tag = "dashboard"
)]
pub async fn record_snapshot(
    State(state): State<AppState>,
    payload: Option<Json<SnapshotRequest>>,
) -> ApiResult<SnapshotResponse> {
    let request = payload.map(|Json(body)| body).unwrap_or_default();
    let snapshot = state
        .services
        .dashboard
        .record_analytics_snapshot(request)
        .await?;
    Ok(Json(ApiResponse::success(snapshot)))
}

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::{
    notification,
    system_log::{self, LogLevel},
};
use crate::services::notifications::{MarkAllReadResponse, UnreadCountResponse};
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct NotificationQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SystemLogQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    pub limit: Option<u64>,
    pub level: Option<LogLevel>,
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    summary = "Own notifications",
    description = "Newest first, twenty per page",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Notifications page", body = ApiResponse<PaginatedResponse<notification::Model>>),
    ),
    security(("Bearer" = [])),
    tag = "notifications"
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<PaginatedResponse<notification::Model>> {
    let notifications = state
        .services
        .notifications
        .list_notifications(&user, query.page, query.unread_only)
        .await?;
    Ok(Json(ApiResponse::success(notifications)))
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications/unread-count",
    summary = "Unread notification count",
    responses(
        (status = 200, description = "Unread count", body = ApiResponse<UnreadCountResponse>),
    ),
    security(("Bearer" = [])),
    tag = "notifications"
)]
pub async fn unread_count(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<UnreadCountResponse> {
    let count = state.services.notifications.unread_count(&user).await?;
    Ok(Json(ApiResponse::success(count)))
}

#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/read",
    summary = "Mark notification read",
    params(("id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification marked read", body = ApiResponse<notification::Model>),
        (status = 404, description = "Notification not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "notifications"
)]
pub async fn mark_read(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
    user: AuthUser,
) -> ApiResult<notification::Model> {
    let notification = state
        .services
        .notifications
        .mark_notification_read(&user, notification_id)
        .await?;
    Ok(Json(ApiResponse::success(notification)))
}

#[utoipa::path(
    post,
    path = "/api/v1/notifications/read-all",
    summary = "Mark all notifications read",
    responses(
        (status = 200, description = "Number of notifications updated", body = ApiResponse<MarkAllReadResponse>),
    ),
    security(("Bearer" = [])),
    tag = "notifications"
)]
pub async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<MarkAllReadResponse> {
    let updated = state.services.notifications.mark_all_read(&user).await?;
    Ok(Json(ApiResponse::success(updated)))
}

#[utoipa::path(
    get,
    path = "/api/v1/system-logs",
    summary = "Audit log",
    params(SystemLogQuery),
    responses(
        (status = 200, description = "Log entries, newest first", body = ApiResponse<PaginatedResponse<system_log::Model>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "notifications"
)]
pub async fn list_system_logs(
    State(state): State<AppState>,
    Query(query): Query<SystemLogQuery>,
) -> ApiResult<PaginatedResponse<system_log::Model>> {
    let page = state.page(query.page, query.limit);
    let logs = state
        .services
        .notifications
        .list_system_logs(page, query.level)
        .await?;
    Ok(Json(ApiResponse::success(logs)))
}

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
use crate::entities::user::UserType;
use crate::errors::ServiceError;
use crate::services::users::{
    AgentSummary, AvailabilityResponse, RegisterAgentRequest, RegisterCustomerRequest,
    UpdateProfileRequest, UserProfileResponse, UserResponse,
};
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserListQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub user_type: Option<UserType>,
}

#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    summary = "Register customer",
    request_body = RegisterCustomerRequest,
    responses(
        (status = 201, description = "Customer registered", body = ApiResponse<UserProfileResponse>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
        (status = 409, description = "Username, email or phone already taken", body = crate::errors::ErrorResponse),
    ),
    tag = "users"
)]
pub async fn register_customer(
    State(state): State<AppState>,
    Json(payload): Json<RegisterCustomerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let profile = state.services.users.register_customer(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(profile))))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/register/agent",
    summary = "Register delivery agent",
    request_body = RegisterAgentRequest,
    responses(
        (status = 201, description = "Delivery agent registered", body = ApiResponse<UserProfileResponse>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
        (status = 409, description = "Account or license already registered", body = crate::errors::ErrorResponse),
    ),
    tag = "users"
)]
pub async fn register_delivery_agent(
    State(state): State<AppState>,
    Json(payload): Json<RegisterAgentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let profile = state.services.users.register_delivery_agent(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(profile))))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    summary = "Current user",
    responses(
        (status = 200, description = "Account and role profile", body = ApiResponse<UserProfileResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "users"
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<UserProfileResponse> {
    let profile = state.services.users.me(user.user_id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    summary = "Update own profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserProfileResponse>),
        (status = 400, description = "Validation failed", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email or phone already taken", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "users"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<UserProfileResponse> {
    let profile = state
        .services
        .users
        .update_profile(user.user_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    summary = "List users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Users page", body = ApiResponse<PaginatedResponse<UserResponse>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<PaginatedResponse<UserResponse>> {
    let page = state.page(query.page, query.limit);
    let users = state
        .services
        .users
        .list_users(page, query.search, query.user_type)
        .await?;
    Ok(Json(ApiResponse::success(users)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/agents",
    summary = "List delivery agents",
    params(crate::ListQuery),
    responses(
        (status = 200, description = "Agents with profiles", body = ApiResponse<PaginatedResponse<AgentSummary>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "users"
)]
pub async fn list_delivery_agents(
    State(state): State<AppState>,
    Query(query): Query<crate::ListQuery>,
) -> ApiResult<PaginatedResponse<AgentSummary>> {
    let page = state.page(query.page, query.limit);
    let agents = state.services.users.list_delivery_agents(page).await?;
    Ok(Json(ApiResponse::success(agents)))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/agents/{id}/availability",
    summary = "Toggle agent availability",
    params(("id" = Uuid, Path, description = "Agent user id")),
    responses(
        (status = 200, description = "New availability", body = ApiResponse<AvailabilityResponse>),
        (status = 403, description = "Not your account", body = crate::errors::ErrorResponse),
        (status = 404, description = "Agent not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "users"
)]
pub async fn toggle_agent_availability(
    State(state): State<AppState>,
    Path(agent_id): Path<Uuid>,
    user: AuthUser,
) -> ApiResult<AvailabilityResponse> {
    let availability = state
        .services
        .users
        .toggle_agent_availability(&user, agent_id)
        .await?;
    Ok(Json(ApiResponse::success(availability)))
}

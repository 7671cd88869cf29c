use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::{
    delivery_agent_location, delivery_area, delivery_assignment, delivery_rating,
};
use crate::errors::ServiceError;
use crate::services::delivery::{
    AssignDeliveryRequest, CreateDeliveryAreaRequest, DeliveryDetailResponse,
    LocationUpdateRequest, RateDeliveryRequest, UpdateDeliveryStatusRequest,
};
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

#[utoipa::path(
    get,
    path = "/api/v1/delivery/areas",
    summary = "Active delivery areas",
    responses(
        (status = 200, description = "Areas ordered by name", body = ApiResponse<Vec<delivery_area::Model>>),
    ),
    tag = "delivery"
)]
pub async fn list_delivery_areas(
    State(state): State<AppState>,
) -> ApiResult<Vec<delivery_area::Model>> {
    let areas = state.services.delivery.list_delivery_areas().await?;
    Ok(Json(ApiResponse::success(areas)))
}

#[utoipa::path(
    post,
    path = "/api/v1/delivery/areas",
    summary = "Create delivery area",
    request_body = CreateDeliveryAreaRequest,
    responses(
        (status = 201, description = "Area created", body = ApiResponse<delivery_area::Model>),
        (status = 409, description = "Area name taken", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "delivery"
)]
pub async fn create_delivery_area(
    State(state): State<AppState>,
    Json(payload): Json<CreateDeliveryAreaRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let area = state.services.delivery.create_delivery_area(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(area))))
}

#[utoipa::path(
    post,
    path = "/api/v1/delivery/assignments",
    summary = "Assign delivery agent",
    request_body = AssignDeliveryRequest,
    responses(
        (status = 201, description = "Agent assigned", body = ApiResponse<DeliveryDetailResponse>),
        (status = 400, description = "Agent unavailable or order closed", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order already assigned", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "delivery"
)]
pub async fn assign_delivery(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AssignDeliveryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let delivery = state.services.delivery.assign_delivery(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(delivery))))
}

#[utoipa::path(
    get,
    path = "/api/v1/delivery/assignments",
    summary = "List deliveries",
    params(ListQuery),
    responses(
        (status = 200, description = "Assignments page", body = ApiResponse<PaginatedResponse<delivery_assignment::Model>>),
    ),
    security(("Bearer" = [])),
    tag = "delivery"
)]
pub async fn list_deliveries(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<delivery_assignment::Model>> {
    let page = state.page(query.page, query.limit);
    let deliveries = state.services.delivery.list_deliveries(&user, page).await?;
    Ok(Json(ApiResponse::success(deliveries)))
}

#[utoipa::path(
    get,
    path = "/api/v1/delivery/assignments/{id}",
    summary = "Get delivery",
    params(("id" = Uuid, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Assignment with status timeline", body = ApiResponse<DeliveryDetailResponse>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Assignment not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "delivery"
)]
pub async fn get_delivery(
    State(state): State<AppState>,
    Path(assignment_id): Path<Uuid>,
    user: AuthUser,
) -> ApiResult<DeliveryDetailResponse> {
    let delivery = state
        .services
        .delivery
        .get_delivery(&user, assignment_id)
        .await?;
    Ok(Json(ApiResponse::success(delivery)))
}

#[utoipa::path(
    post,
    path = "/api/v1/delivery/assignments/{id}/status",
    summary = "Update delivery status",
    params(("id" = Uuid, Path, description = "Assignment id")),
    request_body = UpdateDeliveryStatusRequest,
    responses(
        (status = 200, description = "Stage recorded", body = ApiResponse<DeliveryDetailResponse>),
        (status = 400, description = "Delivery already finished", body = crate::errors::ErrorResponse),
        (status = 403, description = "Not the assigned agent", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "delivery"
)]
pub async fn update_delivery_status(
    State(state): State<AppState>,
    Path(assignment_id): Path<Uuid>,
    user: AuthUser,
    Json(payload): Json<UpdateDeliveryStatusRequest>,
) -> ApiResult<DeliveryDetailResponse> {
    let delivery = state
        .services
        .delivery
        .update_delivery_status(&user, assignment_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(delivery)))
}

#[utoipa::path(
    post,
    path = "/api/v1/delivery/location",
    summary = "Report agent location",
    request_body = LocationUpdateRequest,
    responses(
        (status = 201, description = "Location recorded", body = ApiResponse<delivery_agent_location::Model>),
        (status = 400, description = "Coordinates out of range", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "delivery"
)]
pub async fn update_location(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<LocationUpdateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let location = state.services.delivery.update_location(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(location))))
}

#[utoipa::path(
    get,
    path = "/api/v1/delivery/location",
    summary = "Own location history",
    params(ListQuery),
    responses(
        (status = 200, description = "Locations, newest first", body = ApiResponse<PaginatedResponse<delivery_agent_location::Model>>),
    ),
    security(("Bearer" = [])),
    tag = "delivery"
)]
pub async fn location_history(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<delivery_agent_location::Model>> {
    let page = state.page(query.page, query.limit);
    let locations = state.services.delivery.location_history(&user, page).await?;
    Ok(Json(ApiResponse::success(locations)))
}

#[utoipa::path(
    post,
    path = "/api/v1/delivery/assignments/{id}/rating",
    summary = "Rate delivery",
    params(("id" = Uuid, Path, description = "Assignment id")),
    request_body = RateDeliveryRequest,
    responses(
        (status = 201, description = "Rating saved", body = ApiResponse<delivery_rating::Model>),
        (status = 400, description = "Delivery not completed", body = crate::errors::ErrorResponse),
        (status = 409, description = "Already rated", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "delivery"
)]
pub async fn rate_delivery(
    State(state): State<AppState>,
    Path(assignment_id): Path<Uuid>,
    user: AuthUser,
    Json(payload): Json<RateDeliveryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let rating = state
        .services
        .delivery
        .rate_delivery(&user, assignment_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(rating))))
}

#[utoipa::path(
    get,
    path = "/api/v1/delivery/ratings",
    summary = "List delivery ratings",
    params(ListQuery),
    responses(
        (status = 200, description = "Ratings, newest first", body = ApiResponse<PaginatedResponse<delivery_rating::Model>>),
    ),
    security(("Bearer" = [])),
    tag = "delivery"
)]
pub async fn list_ratings(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<delivery_rating::Model>> {
    let page = state.page(query.page, query.limit);
    let ratings = state.services.delivery.list_ratings(&user, page).await?;
    Ok(Json(ApiResponse::success(ratings)))
}

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
    review, review_image,
    review_report::{self, ReportStatus},
    review_response,
};
use crate::errors::ServiceError;
use crate::services::reviews::{
    AddReviewImageRequest, CreateReviewRequest, HelpfulVoteRequest, ModerateReportRequest,
    ProductReviewsResponse, ReportReviewRequest, ReviewDetailResponse, ReviewResponseRequest,
};
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportListQuery {
    #[serde(default = "crate::default_page")]
    pub page: u64,
    pub limit: Option<u64>,
    pub status: Option<ReportStatus>,
}

#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    summary = "Review a delivered product",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ApiResponse<review::Model>),
        (status = 400, description = "Order not delivered or product not in order", body = crate::errors::ErrorResponse),
        (status = 409, description = "Product already reviewed for this order", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let review = state.services.reviews.create_review(&user, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(review))))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/reviews",
    summary = "Product reviews",
    description = "Visible reviews plus the rating summary",
    params(("id" = Uuid, Path, description = "Product id"), ListQuery),
    responses(
        (status = 200, description = "Reviews with summary", body = ApiResponse<ProductReviewsResponse>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    ),
    tag = "reviews"
)]
pub async fn product_reviews(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> ApiResult<ProductReviewsResponse> {
    let page = state.page(query.page, query.limit);
    let reviews = state
        .services
        .reviews
        .product_reviews(product_id, page)
        .await?;
    Ok(Json(ApiResponse::success(reviews)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reviews/mine",
    summary = "Own reviews",
    params(ListQuery),
    responses(
        (status = 200, description = "Reviews page", body = ApiResponse<PaginatedResponse<review::Model>>),
    ),
    security(("Bearer" = [])),
    tag = "reviews"
)]
pub async fn my_reviews(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<review::Model>> {
    let page = state.page(query.page, query.limit);
    let reviews = state.services.reviews.my_reviews(&user, page).await?;
    Ok(Json(ApiResponse::success(reviews)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reviews/{id}",
    summary = "Get review",
    description = "Hidden reviews are only visible to their author and administrators",
    params(("id" = Uuid, Path, description = "Review id")),
    responses(
        (status = 200, description = "Review with images and response", body = ApiResponse<ReviewDetailResponse>),
        (status = 404, description = "Review not found", body = crate::errors::ErrorResponse),
    ),
    tag = "reviews"
)]
pub async fn get_review(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
    user: Option<AuthUser>,
) -> ApiResult<ReviewDetailResponse> {
    let review = state
        .services
        .reviews
        .get_review(user.as_ref(), review_id)
        .await?;
    Ok(Json(ApiResponse::success(review)))
}

#[utoipa::path(
    post,
    path = "/api/v1/reviews/{id}/helpful",
    summary = "Vote on review helpfulness",
    params(("id" = Uuid, Path, description = "Review id")),
    request_body = HelpfulVoteRequest,
    responses(
        (status = 200, description = "Vote recorded, counter refreshed", body = ApiResponse<review::Model>),
        (status = 400, description = "Cannot vote on own review", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "reviews"
)]
pub async fn vote_helpful(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
    user: AuthUser,
    Json(payload): Json<HelpfulVoteRequest>,
) -> ApiResult<review::Model> {
    let review = state
        .services
        .reviews
        .vote_helpful(&user, review_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(review)))
}

#[utoipa::path(
    post,
    path = "/api/v1/reviews/{id}/response",
    summary = "Respond to review",
    params(("id" = Uuid, Path, description = "Review id")),
    request_body = ReviewResponseRequest,
    responses(
        (status = 200, description = "Response saved", body = ApiResponse<review_response::Model>),
        (status = 404, description = "Review not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "reviews"
)]
pub async fn respond_to_review(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
    user: AuthUser,
    Json(payload): Json<ReviewResponseRequest>,
) -> ApiResult<review_response::Model> {
    let response = state
        .services
        .reviews
        .respond_to_review(&user, review_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(response)))
}

#[utoipa::path(
    post,
    path = "/api/v1/reviews/{id}/report",
    summary = "Report review",
    params(("id" = Uuid, Path, description = "Review id")),
    request_body = ReportReviewRequest,
    responses(
        (status = 201, description = "Report filed", body = ApiResponse<review_report::Model>),
        (status = 409, description = "Already reported", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "reviews"
)]
pub async fn report_review(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
    user: AuthUser,
    Json(payload): Json<ReportReviewRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let report = state
        .services
        .reviews
        .report_review(&user, review_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(report))))
}

#[utoipa::path(
    post,
    path = "/api/v1/reviews/{id}/images",
    summary = "Attach review image",
    params(("id" = Uuid, Path, description = "Review id")),
    request_body = AddReviewImageRequest,
    responses(
        (status = 201, description = "Image attached", body = ApiResponse<review_image::Model>),
        (status = 403, description = "Not your review", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "reviews"
)]
pub async fn add_review_image(
    State(state): State<AppState>,
    Path(review_id): Path<Uuid>,
    user: AuthUser,
    Json(payload): Json<AddReviewImageRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let image = state
        .services
        .reviews
        .add_review_image(&user, review_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(image))))
}

#[utoipa::path(
    get,
    path = "/api/v1/reviews/reports",
    summary = "Moderation queue",
    params(ReportListQuery),
    responses(
        (status = 200, description = "Reports page", body = ApiResponse<PaginatedResponse<review_report::Model>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "reviews"
)]
pub async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<ReportListQuery>,
) -> ApiResult<PaginatedResponse<review_report::Model>> {
    let page = state.page(query.page, query.limit);
    let reports = state
        .services
        .reviews
        .list_reports(page, query.status)
        .await?;
    Ok(Json(ApiResponse::success(reports)))
}

#[utoipa::path(
    post,
    path = "/api/v1/reviews/reports/{id}/moderate",
    summary = "Resolve report",
    params(("id" = Uuid, Path, description = "Report id")),
    request_body = ModerateReportRequest,
    responses(
        (status = 200, description = "Report resolved", body = ApiResponse<review_report::Model>),
        (status = 404, description = "Report not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "reviews"
)]
pub async fn moderate_report(
    State(state): State<AppState>,
    Path(report_id): Path<Uuid>,
    user: AuthUser,
    Json(payload): Json<ModerateReportRequest>,
) -> ApiResult<review_report::Model> {
    let report = state
        .services
        .reviews
        .moderate_report(&user, report_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(report)))
}

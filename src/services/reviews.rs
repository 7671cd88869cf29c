use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{conflict_or_db, db_err, emit, PageRequest};
use crate::auth::AuthUser;
use crate::entities::{
    order::{self, OrderStatus},
    order_item, product, review, review_helpful, review_image,
    review_report::{self, ReportReason, ReportStatus},
    review_response,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::PaginatedResponse;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateReviewRequest {
    pub order_id: Uuid,
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HelpfulVoteRequest {
    pub is_helpful: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReviewResponseRequest {
    #[validate(length(min = 1, max = 5000))]
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReportReviewRequest {
    pub reason: ReportReason,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModerateReportRequest {
    pub status: ReportStatus,
    #[serde(default)]
    pub hide_review: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddReviewImageRequest {
    #[validate(length(min = 1, max = 255))]
    pub image_path: String,
    #[validate(length(max = 200))]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RatingSummary {
    pub average_rating: Decimal,
    pub total_reviews: u64,
    /// Counts for ratings 1 through 5.
    pub distribution: [u64; 5],
}

impl RatingSummary {
    pub fn from_ratings(ratings: &[i32]) -> Self {
        let mut distribution = [0u64; 5];
        for rating in ratings.iter().filter(|r| (1..=5).contains(*r)) {
            distribution[(*rating - 1) as usize] += 1;
        }
        let total: u64 = distribution.iter().sum();
        let average_rating = if total == 0 {
            Decimal::ZERO
        } else {
            let weighted: u64 = distribution
                .iter()
                .enumerate()
                .map(|(i, n)| (i as u64 + 1) * n)
                .sum();
            (Decimal::from(weighted) / Decimal::from(total)).round_dp(2)
        };
        Self {
            average_rating,
            total_reviews: total,
            distribution,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductReviewsResponse {
    pub product_id: Uuid,
    pub summary: RatingSummary,
    #[schema(value_type = Object)]
    pub reviews: PaginatedResponse<review::Model>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewDetailResponse {
    #[schema(value_type = crate::entities::review::Model)]
    pub review: review::Model,
    #[schema(value_type = Vec<crate::entities::review_image::Model>)]
    pub images: Vec<review_image::Model>,
    #[schema(value_type = Option<crate::entities::review_response::Model>)]
    pub response: Option<review_response::Model>,
}

/// Verified product reviews with votes, responses and moderation.
#[derive(Clone)]
pub struct ReviewService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl ReviewService {
    pub fn new(db_pool: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    async fn find_review(&self, review_id: Uuid) -> Result<review::Model, ServiceError> {
        review::Entity::find_by_id(review_id)
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load review"))?
            .ok_or_else(|| ServiceError::not_found("Review", review_id))
    }

    /// Hidden reviews are visible to their author and admins only; everyone
    /// else gets a 404.
    async fn find_visible_review(
        &self,
        viewer: Option<&AuthUser>,
        review_id: Uuid,
    ) -> Result<review::Model, ServiceError> {
        let review = self.find_review(review_id).await?;
        let privileged =
            viewer.map_or(false, |v| v.is_admin() || v.user_id == review.customer_id);
        if !review.is_public && !privileged {
            return Err(ServiceError::not_found("Review", review_id));
        }
        Ok(review)
    }

    /// Only the buyer of a delivered order can review a product on it.
    #[instrument(skip(self, actor, request), fields(order_id = %request.order_id, product_id = %request.product_id))]
    pub async fn create_review(
        &self,
        actor: &AuthUser,
        request: CreateReviewRequest,
    ) -> Result<review::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let order = order::Entity::find_by_id(request.order_id)
            .one(db)
            .await
            .map_err(db_err("Failed to load order"))?
            .ok_or_else(|| ServiceError::not_found("Order", request.order_id))?;
        if order.customer_id != actor.user_id {
            return Err(ServiceError::Forbidden(
                "You can only review your own orders".to_string(),
            ));
        }
        if order.status != OrderStatus::Delivered {
            return Err(ServiceError::InvalidOperation(
                "Only delivered orders can be reviewed".to_string(),
            ));
        }

        let contains = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order.id))
            .filter(order_item::Column::ProductId.eq(request.product_id))
            .count(db)
            .await
            .map_err(db_err("Failed to check order items"))?;
        if contains == 0 {
            return Err(ServiceError::ValidationError(format!(
                "Order {} does not contain this product",
                order.order_number
            )));
        }

        let duplicate = review::Entity::find()
            .filter(review::Column::CustomerId.eq(actor.user_id))
            .filter(review::Column::OrderId.eq(order.id))
            .filter(review::Column::ProductId.eq(request.product_id))
            .count(db)
            .await
            .map_err(db_err("Failed to check existing review"))?;
        if duplicate > 0 {
            return Err(ServiceError::Conflict(
                "You have already reviewed this product for this order".to_string(),
            ));
        }

        let review = review::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(actor.user_id),
            order_id: Set(order.id),
            product_id: Set(request.product_id),
            rating: Set(request.rating),
            title: Set(request.title.trim().to_string()),
            comment: Set(request.comment.trim().to_string()),
            is_verified: Set(true),
            is_public: Set(true),
            helpful_count: Set(0),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(conflict_or_db(
            "Failed to create review",
            "You have already reviewed this product for this order",
        ))?;

        info!(review_id = %review.id, rating = review.rating, "review created");
        emit(
            &self.event_sender,
            Event::ReviewCreated {
                review_id: review.id,
                product_id: review.product_id,
                customer_id: review.customer_id,
            },
        )
        .await;
        Ok(review)
    }

    /// Public reviews for a product, newest first, with a rating summary
    /// over all public reviews.
    #[instrument(skip(self))]
    pub async fn product_reviews(
        &self,
        product_id: Uuid,
        page: PageRequest,
    ) -> Result<ProductReviewsResponse, ServiceError> {
        let db = &*self.db_pool;
        product::Entity::find_by_id(product_id)
            .one(db)
            .await
            .map_err(db_err("Failed to load product"))?
            .ok_or_else(|| ServiceError::not_found("Product", product_id))?;

        let ratings: Vec<i32> = review::Entity::find()
            .filter(review::Column::ProductId.eq(product_id))
            .filter(review::Column::IsPublic.eq(true))
            .select_only()
            .column(review::Column::Rating)
            .into_tuple()
            .all(db)
            .await
            .map_err(db_err("Failed to load ratings"))?;

        let paginator = review::Entity::find()
            .filter(review::Column::ProductId.eq(product_id))
            .filter(review::Column::IsPublic.eq(true))
            .order_by_desc(review::Column::CreatedAt)
            .paginate(db, page.limit);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("Failed to count reviews"))?;
        let reviews = paginator
            .fetch_page(page.index())
            .await
            .map_err(db_err("Failed to fetch reviews page"))?;

        Ok(ProductReviewsResponse {
            product_id,
            summary: RatingSummary::from_ratings(&ratings),
            reviews: PaginatedResponse::new(reviews, total, page),
        })
    }

    pub async fn my_reviews(
        &self,
        actor: &AuthUser,
        page: PageRequest,
    ) -> Result<PaginatedResponse<review::Model>, ServiceError> {
        let paginator = review::Entity::find()
            .filter(review::Column::CustomerId.eq(actor.user_id))
            .order_by_desc(review::Column::CreatedAt)
            .paginate(&*self.db_pool, page.limit);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("Failed to count reviews"))?;
        let reviews = paginator
            .fetch_page(page.index())
            .await
            .map_err(db_err("Failed to fetch reviews page"))?;
        Ok(PaginatedResponse::new(reviews, total, page))
    }

    #[instrument(skip(self, viewer))]
    pub async fn get_review(
        &self,
        viewer: Option<&AuthUser>,
        review_id: Uuid,
    ) -> Result<ReviewDetailResponse, ServiceError> {
        let review = self.find_visible_review(viewer, review_id).await?;

        let images = review_image::Entity::find()
            .filter(review_image::Column::ReviewId.eq(review.id))
            .order_by_asc(review_image::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load review images"))?;
        let response = review_response::Entity::find()
            .filter(review_response::Column::ReviewId.eq(review.id))
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load review response"))?;

        Ok(ReviewDetailResponse {
            review,
            images,
            response,
        })
    }

    /// Records or changes the caller's vote, then recounts `helpful_count`.
    #[instrument(skip(self, actor, request), fields(is_helpful = request.is_helpful))]
    pub async fn vote_helpful(
        &self,
        actor: &AuthUser,
        review_id: Uuid,
        request: HelpfulVoteRequest,
    ) -> Result<review::Model, ServiceError> {
        let review = self.find_visible_review(Some(actor), review_id).await?;
        if review.customer_id == actor.user_id {
            return Err(ServiceError::BadRequest(
                "You cannot vote on your own review".to_string(),
            ));
        }

        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(db_err("Failed to start vote"))?;

        let existing = review_helpful::Entity::find()
            .filter(review_helpful::Column::ReviewId.eq(review.id))
            .filter(review_helpful::Column::UserId.eq(actor.user_id))
            .one(&txn)
            .await
            .map_err(db_err("Failed to load vote"))?;
        match existing {
            Some(vote) => {
                let mut active: review_helpful::ActiveModel = vote.into();
                active.is_helpful = Set(request.is_helpful);
                active
                    .update(&txn)
                    .await
                    .map_err(db_err("Failed to update vote"))?;
            }
            None => {
                review_helpful::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    review_id: Set(review.id),
                    user_id: Set(actor.user_id),
                    is_helpful: Set(request.is_helpful),
                    created_at: Set(Utc::now()),
                }
                .insert(&txn)
                .await
                .map_err(conflict_or_db(
                    "Failed to record vote",
                    "You have already voted on this review",
                ))?;
            }
        }

        let helpful = review_helpful::Entity::find()
            .filter(review_helpful::Column::ReviewId.eq(review.id))
            .filter(review_helpful::Column::IsHelpful.eq(true))
            .count(&txn)
            .await
            .map_err(db_err("Failed to count votes"))?;

        review::Entity::update_many()
            .col_expr(review::Column::HelpfulCount, Expr::value(helpful as i32))
            .filter(review::Column::Id.eq(review.id))
            .exec(&txn)
            .await
            .map_err(db_err("Failed to update helpful count"))?;

        txn.commit().await.map_err(db_err("Failed to commit vote"))?;

        self.find_review(review.id).await
    }

    /// Creates the single response for a review, or replaces its text.
    #[instrument(skip(self, actor, request))]
    pub async fn respond_to_review(
        &self,
        actor: &AuthUser,
        review_id: Uuid,
        request: ReviewResponseRequest,
    ) -> Result<review_response::Model, ServiceError> {
        request.validate()?;
        let review = self.find_review(review_id).await?;
        let db = &*self.db_pool;

        let existing = review_response::Entity::find()
            .filter(review_response::Column::ReviewId.eq(review.id))
            .one(db)
            .await
            .map_err(db_err("Failed to load review response"))?;

        let now = Utc::now();
        let response = match existing {
            Some(current) => {
                let mut active: review_response::ActiveModel = current.into();
                active.response = Set(request.response.trim().to_string());
                active.responder_id = Set(actor.user_id);
                active.updated_at = Set(now);
                active
                    .update(db)
                    .await
                    .map_err(db_err("Failed to update review response"))?
            }
            None => review_response::ActiveModel {
                id: Set(Uuid::new_v4()),
                review_id: Set(review.id),
                responder_id: Set(actor.user_id),
                response: Set(request.response.trim().to_string()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await
            .map_err(conflict_or_db(
                "Failed to create review response",
                "Review already has a response",
            ))?,
        };

        info!(review_id = %review.id, "review response saved");
        Ok(response)
    }

    #[instrument(skip(self, actor, request))]
    pub async fn report_review(
        &self,
        actor: &AuthUser,
        review_id: Uuid,
        request: ReportReviewRequest,
    ) -> Result<review_report::Model, ServiceError> {
        request.validate()?;
        let review = self.find_visible_review(Some(actor), review_id).await?;
        let db = &*self.db_pool;

        let already = review_report::Entity::find()
            .filter(review_report::Column::ReviewId.eq(review.id))
            .filter(review_report::Column::ReporterId.eq(actor.user_id))
            .count(db)
            .await
            .map_err(db_err("Failed to check existing report"))?;
        if already > 0 {
            return Err(ServiceError::Conflict(
                "You have already reported this review".to_string(),
            ));
        }

        let report = review_report::ActiveModel {
            id: Set(Uuid::new_v4()),
            review_id: Set(review.id),
            reporter_id: Set(actor.user_id),
            reason: Set(request.reason),
            description: Set(request.description),
            status: Set(ReportStatus::Pending),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .map_err(conflict_or_db(
            "Failed to create review report",
            "You have already reported this review",
        ))?;

        info!(report_id = %report.id, review_id = %review.id, "review reported");
        Ok(report)
    }

    pub async fn list_reports(
        &self,
        page: PageRequest,
        status: Option<ReportStatus>,
    ) -> Result<PaginatedResponse<review_report::Model>, ServiceError> {
        let mut query =
            review_report::Entity::find().order_by_desc(review_report::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(review_report::Column::Status.eq(status));
        }

        let paginator = query.paginate(&*self.db_pool, page.limit);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("Failed to count reports"))?;
        let reports = paginator
            .fetch_page(page.index())
            .await
            .map_err(db_err("Failed to fetch reports page"))?;
        Ok(PaginatedResponse::new(reports, total, page))
    }

    #[instrument(skip(self, actor, request), fields(hide_review = request.hide_review))]
    pub async fn moderate_report(
        &self,
        actor: &AuthUser,
        report_id: Uuid,
        request: ModerateReportRequest,
    ) -> Result<review_report::Model, ServiceError> {
        let db = &*self.db_pool;
        let report = review_report::Entity::find_by_id(report_id)
            .one(db)
            .await
            .map_err(db_err("Failed to load review report"))?
            .ok_or_else(|| ServiceError::not_found("Review report", report_id))?;

        let txn = db
            .begin()
            .await
            .map_err(db_err("Failed to start moderation"))?;

        let review_id = report.review_id;
        let mut active: review_report::ActiveModel = report.into();
        active.status = Set(request.status);
        active.reviewed_by = Set(Some(actor.user_id));
        active.reviewed_at = Set(Some(Utc::now()));
        let moderated = active
            .update(&txn)
            .await
            .map_err(db_err("Failed to update review report"))?;

        if request.hide_review {
            review::Entity::update_many()
                .col_expr(review::Column::IsPublic, Expr::value(false))
                .col_expr(review::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(review::Column::Id.eq(review_id))
                .exec(&txn)
                .await
                .map_err(db_err("Failed to hide review"))?;
        }

        txn.commit()
            .await
            .map_err(db_err("Failed to commit moderation"))?;

        info!(report_id = %moderated.id, review_id = %review_id, hidden = request.hide_review, "review report moderated");
        Ok(moderated)
    }

    pub async fn add_review_image(
        &self,
        actor: &AuthUser,
        review_id: Uuid,
        request: AddReviewImageRequest,
    ) -> Result<review_image::Model, ServiceError> {
        request.validate()?;
        let review = self.find_review(review_id).await?;
        if review.customer_id != actor.user_id {
            return Err(ServiceError::Forbidden(
                "Only the author can add images to a review".to_string(),
            ));
        }

        review_image::ActiveModel {
            id: Set(Uuid::new_v4()),
            review_id: Set(review.id),
            image_path: Set(request.image_path),
            caption: Set(request.caption),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(db_err("Failed to add review image"))
    }
}

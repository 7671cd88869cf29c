use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::orders::{append_history, transition_order};
use super::payments::log_transaction;
use super::{conflict_or_db, db_err, emit, PageRequest};
use crate::auth::AuthUser;
use crate::entities::{
    delivery_agent_location, delivery_agent_profile, delivery_area, delivery_assignment,
    delivery_rating,
    delivery_status::{self, DeliveryStage},
    order::{self, OrderStatus},
    payment::{self, PaymentStatus, CASH_ON_DELIVERY},
    user::{self, UserType},
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::PaginatedResponse;

fn validate_latitude(value: &Decimal) -> Result<(), ValidationError> {
    if *value >= dec!(-90) && *value <= dec!(90) {
        Ok(())
    } else {
        Err(ValidationError::new("latitude_out_of_range"))
    }
}

fn validate_longitude(value: &Decimal) -> Result<(), ValidationError> {
    if *value >= dec!(-180) && *value <= dec!(180) {
        Ok(())
    } else {
        Err(ValidationError::new("longitude_out_of_range"))
    }
}

fn validate_fee(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        Err(ValidationError::new("negative_fee"))
    } else {
        Ok(())
    }
}

/// Order statuses a delivery stage walks the order through, in order.
///
/// Tracking is only accepted while the order is confirmed, processing,
/// dispatched or delivered. A confirmed or processing order is moved to
/// `dispatched` first, since an agent carrying the parcel may skip
/// `processing`; every further step must be an edge of the order graph.
pub fn order_sync_path(
    stage: DeliveryStage,
    current: OrderStatus,
) -> Result<Vec<OrderStatus>, ServiceError> {
    if matches!(
        current,
        OrderStatus::Pending | OrderStatus::Cancelled | OrderStatus::Returned
    ) {
        return Err(ServiceError::InvalidOperation(format!(
            "Cannot track delivery of a {} order",
            current
        )));
    }

    let Some(target) = stage.order_status() else {
        return Ok(Vec::new());
    };
    let mut path = Vec::new();
    let mut at = current;
    if at != target && matches!(at, OrderStatus::Confirmed | OrderStatus::Processing) {
        at = OrderStatus::Dispatched;
        path.push(at);
    }
    if at != target {
        if !at.can_transition_to(target) {
            return Err(ServiceError::InvalidStatus(format!(
                "Delivery stage {} cannot move a {} order",
                stage, current
            )));
        }
        path.push(target);
    }
    Ok(path)
}

/// Mean of the given ratings to two decimal places, zero when empty.
pub fn average_rating(ratings: &[i32]) -> Decimal {
    if ratings.is_empty() {
        return Decimal::ZERO;
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    (Decimal::from(sum) / Decimal::from(ratings.len() as i64)).round_dp(2)
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateDeliveryAreaRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom = "validate_fee")]
    pub delivery_fee: Decimal,
    /// Minutes
    #[validate(range(min = 1, max = 1440))]
    pub estimated_delivery_time: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AssignDeliveryRequest {
    pub order_id: Uuid,
    pub delivery_agent_id: Uuid,
    pub estimated_delivery_time: Option<DateTime<Utc>>,
    #[validate(length(max = 1000))]
    pub delivery_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateDeliveryStatusRequest {
    pub status: DeliveryStage,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LocationUpdateRequest {
    #[validate(custom = "validate_latitude")]
    pub latitude: Decimal,
    #[validate(custom = "validate_longitude")]
    pub longitude: Decimal,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RateDeliveryRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeliveryDetailResponse {
    #[schema(value_type = crate::entities::delivery_assignment::Model)]
    pub assignment: delivery_assignment::Model,
    pub order_number: String,
    pub order_status: OrderStatus,
    pub current_status: Option<DeliveryStage>,
    /// Oldest first.
    #[schema(value_type = Vec<crate::entities::delivery_status::Model>)]
    pub timeline: Vec<delivery_status::Model>,
    #[schema(value_type = Option<crate::entities::delivery_rating::Model>)]
    pub rating: Option<delivery_rating::Model>,
}

async fn append_stage<C: ConnectionTrait>(
    conn: &C,
    assignment_id: Uuid,
    stage: DeliveryStage,
    location: Option<String>,
    notes: Option<String>,
) -> Result<delivery_status::Model, DbErr> {
    delivery_status::ActiveModel {
        id: Set(Uuid::new_v4()),
        delivery_assignment_id: Set(assignment_id),
        status: Set(stage),
        location: Set(location),
        notes: Set(notes),
        timestamp: Set(Utc::now()),
    }
    .insert(conn)
    .await
}

/// Cash collected at the door settles any pending cash-on-delivery payment.
async fn settle_cash_on_delivery<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> Result<u64, DbErr> {
    let pending = payment::Entity::find()
        .filter(payment::Column::OrderId.eq(order_id))
        .filter(payment::Column::PaymentMethod.eq(CASH_ON_DELIVERY))
        .filter(payment::Column::Status.eq(PaymentStatus::Pending))
        .all(conn)
        .await?;

    let now = Utc::now();
    for payment in &pending {
        payment::Entity::update_many()
            .col_expr(payment::Column::Status, Expr::value(PaymentStatus::Completed))
            .col_expr(payment::Column::PaidAt, Expr::value(Some(now)))
            .col_expr(payment::Column::UpdatedAt, Expr::value(now))
            .filter(payment::Column::Id.eq(payment.id))
            .exec(conn)
            .await?;
        log_transaction(
            conn,
            payment.id,
            "collected",
            PaymentStatus::Completed,
            Some("Cash collected on delivery".to_string()),
            None,
        )
        .await?;
    }
    Ok(pending.len() as u64)
}

/// Delivery areas, agent assignments, tracking and ratings.
#[derive(Clone)]
pub struct DeliveryService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl DeliveryService {
    pub fn new(db_pool: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_delivery_areas(&self) -> Result<Vec<delivery_area::Model>, ServiceError> {
        delivery_area::Entity::find()
            .filter(delivery_area::Column::IsActive.eq(true))
            .order_by_asc(delivery_area::Column::Name)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to list delivery areas"))
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_delivery_area(
        &self,
        request: CreateDeliveryAreaRequest,
    ) -> Result<delivery_area::Model, ServiceError> {
        request.validate()?;
        let area = delivery_area::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            description: Set(request.description),
            delivery_fee: Set(request.delivery_fee.round_dp(2)),
            estimated_delivery_time: Set(request.estimated_delivery_time),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(conflict_or_db(
            "Failed to create delivery area",
            "A delivery area with this name already exists",
        ))?;

        info!(area_id = %area.id, "delivery area created");
        Ok(area)
    }

    async fn find_assignment(
        &self,
        assignment_id: Uuid,
    ) -> Result<delivery_assignment::Model, ServiceError> {
        delivery_assignment::Entity::find_by_id(assignment_id)
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load delivery assignment"))?
            .ok_or_else(|| ServiceError::not_found("Delivery assignment", assignment_id))
    }

    async fn order_for(
        &self,
        assignment: &delivery_assignment::Model,
    ) -> Result<order::Model, ServiceError> {
        order::Entity::find_by_id(assignment.order_id)
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load order"))?
            .ok_or_else(|| ServiceError::not_found("Order", assignment.order_id))
    }

    async fn timeline(&self, assignment_id: Uuid) -> Result<Vec<delivery_status::Model>, ServiceError> {
        delivery_status::Entity::find()
            .filter(delivery_status::Column::DeliveryAssignmentId.eq(assignment_id))
            .order_by_asc(delivery_status::Column::Timestamp)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load delivery timeline"))
    }

    async fn detail(
        &self,
        assignment: delivery_assignment::Model,
        order: &order::Model,
    ) -> Result<DeliveryDetailResponse, ServiceError> {
        let timeline = self.timeline(assignment.id).await?;
        let rating = delivery_rating::Entity::find()
            .filter(delivery_rating::Column::DeliveryAssignmentId.eq(assignment.id))
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load delivery rating"))?;

        Ok(DeliveryDetailResponse {
            current_status: timeline.last().map(|s| s.status),
            order_number: order.order_number.clone(),
            order_status: order.status,
            assignment,
            timeline,
            rating,
        })
    }

    /// Assigns an available agent to an order that has no assignment yet.
    #[instrument(skip(self, actor, request), fields(order_id = %request.order_id, agent_id = %request.delivery_agent_id))]
    pub async fn assign_delivery(
        &self,
        actor: &AuthUser,
        request: AssignDeliveryRequest,
    ) -> Result<DeliveryDetailResponse, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let (agent, profile) = user::Entity::find_by_id(request.delivery_agent_id)
            .find_also_related(delivery_agent_profile::Entity)
            .one(db)
            .await
            .map_err(db_err("Failed to load delivery agent"))?
            .ok_or_else(|| ServiceError::not_found("Delivery agent", request.delivery_agent_id))?;
        if agent.user_type != UserType::DeliveryAgent {
            return Err(ServiceError::ValidationError(format!(
                "User {} is not a delivery agent",
                agent.username
            )));
        }
        match profile {
            Some(profile) if profile.is_available && agent.is_active => {}
            _ => {
                return Err(ServiceError::InvalidOperation(format!(
                    "Delivery agent {} is not available",
                    agent.username
                )))
            }
        }

        let order = order::Entity::find_by_id(request.order_id)
            .one(db)
            .await
            .map_err(db_err("Failed to load order"))?
            .ok_or_else(|| ServiceError::not_found("Order", request.order_id))?;
        if order.status.is_terminal() || order.status == OrderStatus::Delivered {
            return Err(ServiceError::InvalidOperation(format!(
                "Order {} is {} and cannot be assigned",
                order.order_number, order.status
            )));
        }

        let already = delivery_assignment::Entity::find()
            .filter(delivery_assignment::Column::OrderId.eq(order.id))
            .count(db)
            .await
            .map_err(db_err("Failed to check existing assignment"))?;
        if already > 0 {
            return Err(ServiceError::Conflict(format!(
                "Order {} already has a delivery agent",
                order.order_number
            )));
        }

        let txn = db
            .begin()
            .await
            .map_err(db_err("Failed to start assignment"))?;

        let assignment = delivery_assignment::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            delivery_agent_id: Set(agent.id),
            assigned_at: Set(Utc::now()),
            assigned_by: Set(Some(actor.user_id)),
            estimated_delivery_time: Set(request.estimated_delivery_time),
            actual_delivery_time: Set(None),
            delivery_notes: Set(request.delivery_notes),
        }
        .insert(&txn)
        .await
        .map_err(conflict_or_db(
            "Failed to create delivery assignment",
            "Order already has a delivery agent",
        ))?;

        append_stage(
            &txn,
            assignment.id,
            DeliveryStage::Assigned,
            None,
            Some(format!("Assigned to {}", agent.full_name())),
        )
        .await
        .map_err(db_err("Failed to write delivery status"))?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit assignment"))?;

        info!(assignment_id = %assignment.id, order_number = %order.order_number, "delivery assigned");
        emit(
            &self.event_sender,
            Event::DeliveryAssigned {
                assignment_id: assignment.id,
                order_id: order.id,
                agent_id: agent.id,
                customer_id: order.customer_id,
            },
        )
        .await;

        self.detail(assignment, &order).await
    }

    /// Admins see every assignment, agents their own, anyone else nothing.
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn list_deliveries(
        &self,
        actor: &AuthUser,
        page: PageRequest,
    ) -> Result<PaginatedResponse<delivery_assignment::Model>, ServiceError> {
        let mut query =
            delivery_assignment::Entity::find().order_by_desc(delivery_assignment::Column::AssignedAt);
        if actor.is_admin() {
            // unrestricted
        } else if actor.is_delivery_agent() {
            query = query.filter(delivery_assignment::Column::DeliveryAgentId.eq(actor.user_id));
        } else {
            return Ok(PaginatedResponse::new(Vec::new(), 0, page));
        }

        let paginator = query.paginate(&*self.db_pool, page.limit);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("Failed to count deliveries"))?;
        let deliveries = paginator
            .fetch_page(page.index())
            .await
            .map_err(db_err("Failed to fetch deliveries page"))?;

        Ok(PaginatedResponse::new(deliveries, total, page))
    }

    #[instrument(skip(self, actor))]
    pub async fn get_delivery(
        &self,
        actor: &AuthUser,
        assignment_id: Uuid,
    ) -> Result<DeliveryDetailResponse, ServiceError> {
        let assignment = self.find_assignment(assignment_id).await?;
        let order = self.order_for(&assignment).await?;
        let allowed = actor.is_admin()
            || assignment.delivery_agent_id == actor.user_id
            || order.customer_id == actor.user_id;
        if !allowed {
            return Err(ServiceError::Forbidden(
                "You do not have access to this delivery".to_string(),
            ));
        }
        self.detail(assignment, &order).await
    }

    /// Appends a tracking stage and keeps the order status in step with it.
    #[instrument(skip(self, actor, request), fields(stage = %request.status))]
    pub async fn update_delivery_status(
        &self,
        actor: &AuthUser,
        assignment_id: Uuid,
        request: UpdateDeliveryStatusRequest,
    ) -> Result<DeliveryDetailResponse, ServiceError> {
        request.validate()?;
        let assignment = self.find_assignment(assignment_id).await?;
        if !actor.is_admin() && assignment.delivery_agent_id != actor.user_id {
            return Err(ServiceError::Forbidden(
                "Only the assigned agent can update this delivery".to_string(),
            ));
        }

        let timeline = self.timeline(assignment.id).await?;
        if let Some(last) = timeline.last().filter(|s| s.status.is_final()) {
            return Err(ServiceError::InvalidStatus(format!(
                "Delivery is already {}",
                last.status
            )));
        }

        let order = self.order_for(&assignment).await?;
        let stage = request.status;
        let path = order_sync_path(stage, order.status)?;
        let now = Utc::now();

        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(db_err("Failed to start delivery update"))?;

        append_stage(
            &txn,
            assignment.id,
            stage,
            request.location.clone(),
            request.notes.clone(),
        )
        .await
        .map_err(db_err("Failed to write delivery status"))?;

        let mut order_after = order.clone();
        for target in path {
            let next = order::ActiveModel {
                status: Set(target),
                updated_at: Set(now),
                ..Default::default()
            };
            order_after = transition_order(&txn, &order_after, next).await?;
            append_history(
                &txn,
                order.id,
                target,
                format!("Delivery {} by {}", stage, actor.display_name()),
                Some(actor.user_id),
            )
            .await
            .map_err(db_err("Failed to write order history"))?;
        }

        let mut assignment_after = assignment.clone();
        if stage == DeliveryStage::Delivered && order_after.status == OrderStatus::Delivered {
            let mut active: delivery_assignment::ActiveModel = assignment.into();
            active.actual_delivery_time = Set(Some(now));
            assignment_after = active
                .update(&txn)
                .await
                .map_err(db_err("Failed to record delivery time"))?;

            delivery_agent_profile::Entity::update_many()
                .col_expr(
                    delivery_agent_profile::Column::TotalDeliveries,
                    Expr::col(delivery_agent_profile::Column::TotalDeliveries).add(1),
                )
                .filter(delivery_agent_profile::Column::UserId.eq(assignment_after.delivery_agent_id))
                .exec(&txn)
                .await
                .map_err(db_err("Failed to update agent delivery count"))?;

            let settled = settle_cash_on_delivery(&txn, order.id)
                .await
                .map_err(db_err("Failed to settle cash on delivery"))?;
            if settled > 0 {
                info!(order_number = %order.order_number, settled, "cash on delivery collected");
            }
        }

        txn.commit()
            .await
            .map_err(db_err("Failed to commit delivery update"))?;

        info!(assignment_id = %assignment_after.id, stage = %stage, "delivery status updated");
        emit(
            &self.event_sender,
            Event::DeliveryStatusChanged {
                assignment_id: assignment_after.id,
                customer_id: order.customer_id,
                status: stage.to_string(),
            },
        )
        .await;

        self.detail(assignment_after, &order_after).await
    }

    #[instrument(skip(self, actor, request))]
    pub async fn update_location(
        &self,
        actor: &AuthUser,
        request: LocationUpdateRequest,
    ) -> Result<delivery_agent_location::Model, ServiceError> {
        request.validate()?;
        let location = delivery_agent_location::ActiveModel {
            id: Set(Uuid::new_v4()),
            delivery_agent_id: Set(actor.user_id),
            latitude: Set(request.latitude),
            longitude: Set(request.longitude),
            address: Set(request.address),
            timestamp: Set(Utc::now()),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(db_err("Failed to record agent location"))?;
        Ok(location)
    }

    pub async fn location_history(
        &self,
        actor: &AuthUser,
        page: PageRequest,
    ) -> Result<PaginatedResponse<delivery_agent_location::Model>, ServiceError> {
        let paginator = delivery_agent_location::Entity::find()
            .filter(delivery_agent_location::Column::DeliveryAgentId.eq(actor.user_id))
            .order_by_desc(delivery_agent_location::Column::Timestamp)
            .paginate(&*self.db_pool, page.limit);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("Failed to count locations"))?;
        let locations = paginator
            .fetch_page(page.index())
            .await
            .map_err(db_err("Failed to fetch locations page"))?;

        Ok(PaginatedResponse::new(locations, total, page))
    }

    /// Rates a delivered order and refreshes the agent's average rating.
    #[instrument(skip(self, actor, request), fields(rating = request.rating))]
    pub async fn rate_delivery(
        &self,
        actor: &AuthUser,
        assignment_id: Uuid,
        request: RateDeliveryRequest,
    ) -> Result<delivery_rating::Model, ServiceError> {
        request.validate()?;
        let assignment = self.find_assignment(assignment_id).await?;
        let order = self.order_for(&assignment).await?;
        if order.customer_id != actor.user_id {
            return Err(ServiceError::Forbidden(
                "Only the customer can rate this delivery".to_string(),
            ));
        }
        if order.status != OrderStatus::Delivered {
            return Err(ServiceError::InvalidOperation(
                "Only delivered orders can be rated".to_string(),
            ));
        }

        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(db_err("Failed to start rating"))?;

        let rating = delivery_rating::ActiveModel {
            id: Set(Uuid::new_v4()),
            delivery_assignment_id: Set(assignment.id),
            rating: Set(request.rating),
            comment: Set(request.comment),
            rated_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await
        .map_err(conflict_or_db(
            "Failed to save delivery rating",
            "This delivery has already been rated",
        ))?;

        let scores: Vec<i32> = delivery_rating::Entity::find()
            .join(JoinType::InnerJoin, delivery_rating::Relation::Assignment.def())
            .filter(delivery_assignment::Column::DeliveryAgentId.eq(assignment.delivery_agent_id))
            .select_only()
            .column(delivery_rating::Column::Rating)
            .into_tuple()
            .all(&txn)
            .await
            .map_err(db_err("Failed to load agent ratings"))?;

        delivery_agent_profile::Entity::update_many()
            .col_expr(
                delivery_agent_profile::Column::Rating,
                Expr::value(average_rating(&scores)),
            )
            .filter(delivery_agent_profile::Column::UserId.eq(assignment.delivery_agent_id))
            .exec(&txn)
            .await
            .map_err(db_err("Failed to update agent rating"))?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit rating"))?;

        info!(assignment_id = %assignment.id, rating = rating.rating, "delivery rated");
        Ok(rating)
    }

    /// Admins see every rating, agents the ratings on their own deliveries.
    pub async fn list_ratings(
        &self,
        actor: &AuthUser,
        page: PageRequest,
    ) -> Result<PaginatedResponse<delivery_rating::Model>, ServiceError> {
        let mut query = delivery_rating::Entity::find().order_by_desc(delivery_rating::Column::RatedAt);
        if !actor.is_admin() {
            if !actor.is_delivery_agent() {
                return Err(ServiceError::Forbidden(
                    "Only admins and delivery agents can view ratings".to_string(),
                ));
            }
            query = query
                .join(JoinType::InnerJoin, delivery_rating::Relation::Assignment.def())
                .filter(delivery_assignment::Column::DeliveryAgentId.eq(actor.user_id));
        }

        let paginator = query.paginate(&*self.db_pool, page.limit);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("Failed to count ratings"))?;
        let ratings = paginator
            .fetch_page(page.index())
            .await
            .map_err(db_err("Failed to fetch ratings page"))?;

        Ok(PaginatedResponse::new(ratings, total, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use sea_orm::Iterable;

    #[rstest]
    #[case(DeliveryStage::PickedUp, OrderStatus::Processing, vec![OrderStatus::Dispatched])]
    #[case(DeliveryStage::InTransit, OrderStatus::Confirmed, vec![OrderStatus::Dispatched])]
    #[case(DeliveryStage::InTransit, OrderStatus::Dispatched, vec![])]
    #[case(DeliveryStage::Delivered, OrderStatus::Dispatched, vec![OrderStatus::Delivered])]
    #[case(
        DeliveryStage::Delivered,
        OrderStatus::Confirmed,
        vec![OrderStatus::Dispatched, OrderStatus::Delivered]
    )]
    #[case(
        DeliveryStage::Returned,
        OrderStatus::Processing,
        vec![OrderStatus::Dispatched, OrderStatus::Returned]
    )]
    #[case(DeliveryStage::Returned, OrderStatus::Delivered, vec![OrderStatus::Returned])]
    #[case(DeliveryStage::Delivered, OrderStatus::Delivered, vec![])]
    #[case(DeliveryStage::Failed, OrderStatus::Dispatched, vec![])]
    #[case(DeliveryStage::Assigned, OrderStatus::Confirmed, vec![])]
    fn stage_sync_follows_order_graph(
        #[case] stage: DeliveryStage,
        #[case] current: OrderStatus,
        #[case] expected: Vec<OrderStatus>,
    ) {
        assert_eq!(order_sync_path(stage, current).unwrap(), expected);
    }

    #[rstest]
    #[case(DeliveryStage::Delivered, OrderStatus::Cancelled)]
    #[case(DeliveryStage::Failed, OrderStatus::Cancelled)]
    #[case(DeliveryStage::PickedUp, OrderStatus::Pending)]
    #[case(DeliveryStage::InTransit, OrderStatus::Returned)]
    fn inactive_orders_reject_tracking(#[case] stage: DeliveryStage, #[case] current: OrderStatus) {
        assert_matches!(
            order_sync_path(stage, current),
            Err(ServiceError::InvalidOperation(_))
        );
    }

    #[test]
    fn stages_never_move_an_order_backwards() {
        assert_matches!(
            order_sync_path(DeliveryStage::PickedUp, OrderStatus::Delivered),
            Err(ServiceError::InvalidStatus(_))
        );
    }

    #[test]
    fn every_sync_step_is_a_graph_edge_or_the_pickup_shortcut() {
        for stage in DeliveryStage::iter() {
            for current in OrderStatus::iter() {
                let Ok(path) = order_sync_path(stage, current) else {
                    continue;
                };
                let mut at = current;
                for next in path {
                    let pickup = next == OrderStatus::Dispatched && at == OrderStatus::Confirmed;
                    assert!(pickup || at.can_transition_to(next), "{at} -> {next}");
                    at = next;
                }
            }
        }
    }

    #[test]
    fn average_is_rounded_to_cents() {
        assert_eq!(average_rating(&[]), Decimal::ZERO);
        assert_eq!(average_rating(&[5, 4, 4]), dec!(4.33));
        assert_eq!(average_rating(&[5]), dec!(5));
    }

    #[test]
    fn coordinates_are_bounded() {
        let request = LocationUpdateRequest {
            latitude: dec!(91),
            longitude: dec!(90.4125),
            address: None,
        };
        assert!(request.validate().is_err());

        let request = LocationUpdateRequest {
            latitude: dec!(23.8103),
            longitude: dec!(-181),
            address: None,
        };
        assert!(request.validate().is_err());

        let request = LocationUpdateRequest {
            latitude: dec!(23.8103),
            longitude: dec!(90.4125),
            address: Some("Gulshan 2".into()),
        };
        assert!(request.validate().is_ok());
    }
}

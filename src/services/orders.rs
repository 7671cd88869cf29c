use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::catalog::{reduce_stock, restore_stock};
use super::payments::create_cancellation_refunds;
use super::{db_err, emit, PageRequest};
use crate::auth::AuthUser;
use crate::entities::{
    delivery_area, delivery_assignment,
    order::{self, CancellationReason, DeliveryType, OrderStatus, RefundPreference},
    order_item, order_status_history, payment, product, refund, user,
};
use crate::errors::{ServiceError, StockShortage};
use crate::events::{Event, EventSender};
use crate::PaginatedResponse;

pub const DEFAULT_DELIVERY_CITY: &str = "ঢাকা";

/// `ORD` followed by eight uppercase hex digits.
pub fn generate_order_number() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("ORD{}", hex[..8].to_uppercase())
}

pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Sum of line totals for `(unit_price, quantity)` pairs.
pub fn order_total(lines: &[(Decimal, i32)]) -> Decimal {
    lines
        .iter()
        .map(|(price, quantity)| line_total(*price, *quantity))
        .sum()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CartItem {
    /// Product id
    pub id: Uuid,
    #[validate(range(min = 1, max = 1000))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 500))]
    pub delivery_address: String,
    #[validate(length(min = 1, max = 100))]
    pub delivery_city: Option<String>,
    pub delivery_instructions: Option<String>,
    pub special_instructions: Option<String>,
    pub delivery_type: Option<DeliveryType>,
    pub scheduled_delivery_time: Option<DateTime<Utc>>,
    /// Delivery area whose fee applies to this order
    pub delivery_area_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100))]
    pub cart_items: Vec<CartItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CancelOrderRequest {
    pub reason: CancellationReason,
    #[validate(length(max = 500))]
    pub additional_notes: Option<String>,
    pub refund_preference: RefundPreference,
    pub confirm_cancellation: bool,
}

impl CancelOrderRequest {
    pub fn ensure_confirmed(&self) -> Result<(), ServiceError> {
        if self.confirm_cancellation {
            Ok(())
        } else {
            Err(ServiceError::ValidationError(
                "confirm_cancellation must be true".to_string(),
            ))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    #[serde(flatten)]
    #[schema(inline, value_type = crate::entities::order_item::Model)]
    pub item: order_item::Model,
    pub product_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CancellationInfo {
    pub can_be_cancelled: bool,
    pub deadline: Option<DateTime<Utc>>,
}

impl CancellationInfo {
    pub fn for_order(order: &order::Model, now: DateTime<Utc>) -> Self {
        Self {
            can_be_cancelled: order.can_be_cancelled(now),
            deadline: order.cancellation_deadline(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDetailResponse {
    #[schema(value_type = crate::entities::order::Model)]
    pub order: order::Model,
    pub items: Vec<OrderItemResponse>,
    #[schema(value_type = Vec<crate::entities::order_status_history::Model>)]
    pub history: Vec<order_status_history::Model>,
    pub cancellation: CancellationInfo,
    pub amount_due: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerContact {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: Option<String>,
    pub city: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceResponse {
    #[schema(value_type = crate::entities::order::Model)]
    pub order: order::Model,
    pub items: Vec<OrderItemResponse>,
    #[schema(value_type = Vec<crate::entities::payment::Model>)]
    pub payments: Vec<payment::Model>,
    pub customer: CustomerContact,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total_due: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CancelOrderResponse {
    #[schema(value_type = crate::entities::order::Model)]
    pub order: order::Model,
    #[schema(value_type = Vec<crate::entities::refund::Model>)]
    pub refunds: Vec<refund::Model>,
}

/// Appends a row to an order's status history.
pub(crate) async fn append_history<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    status: OrderStatus,
    notes: String,
    created_by: Option<Uuid>,
) -> Result<order_status_history::Model, DbErr> {
    order_status_history::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        status: Set(status),
        notes: Set(Some(notes)),
        created_by: Set(created_by),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await
}

/// Applies `next` only if the order still has the status it was loaded with.
pub(crate) async fn transition_order<C: ConnectionTrait>(
    conn: &C,
    order: &order::Model,
    next: order::ActiveModel,
) -> Result<order::Model, ServiceError> {
    let result = order::Entity::update_many()
        .set(next)
        .filter(order::Column::Id.eq(order.id))
        .filter(order::Column::Status.eq(order.status))
        .exec(conn)
        .await
        .map_err(db_err("Failed to update order status"))?;

    if result.rows_affected != 1 {
        return Err(ServiceError::Conflict(format!(
            "Order {} was modified concurrently",
            order.order_number
        )));
    }

    order::Entity::find_by_id(order.id)
        .one(conn)
        .await
        .map_err(db_err("Failed to reload order"))?
        .ok_or_else(|| ServiceError::not_found("Order", order.id))
}

async fn restore_order_stock<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> Result<(), DbErr> {
    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .all(conn)
        .await?;
    for item in items {
        restore_stock(conn, item.product_id, item.quantity).await?;
    }
    Ok(())
}

/// Checkout, order views, cancellation and admin status changes.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    pub fn new(db_pool: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Finds an order by UUID or by order number.
    pub async fn resolve_order(&self, reference: &str) -> Result<order::Model, ServiceError> {
        let db = &*self.db_pool;
        let found = match Uuid::parse_str(reference) {
            Ok(id) => order::Entity::find_by_id(id).one(db).await,
            Err(_) => {
                order::Entity::find()
                    .filter(order::Column::OrderNumber.eq(reference.trim().to_uppercase()))
                    .one(db)
                    .await
            }
        }
        .map_err(db_err("Failed to load order"))?;

        found.ok_or_else(|| ServiceError::not_found("Order", reference))
    }

    async fn is_assigned_agent(&self, order_id: Uuid, agent_id: Uuid) -> Result<bool, ServiceError> {
        let count = delivery_assignment::Entity::find()
            .filter(delivery_assignment::Column::OrderId.eq(order_id))
            .filter(delivery_assignment::Column::DeliveryAgentId.eq(agent_id))
            .count(&*self.db_pool)
            .await
            .map_err(db_err("Failed to check delivery assignment"))?;
        Ok(count > 0)
    }

    /// Owner, admin, or the agent delivering the order.
    async fn ensure_can_view(&self, actor: &AuthUser, order: &order::Model) -> Result<(), ServiceError> {
        if actor.is_admin() || order.customer_id == actor.user_id {
            return Ok(());
        }
        if actor.is_delivery_agent() && self.is_assigned_agent(order.id, actor.user_id).await? {
            return Ok(());
        }
        Err(ServiceError::Forbidden(
            "You do not have access to this order".to_string(),
        ))
    }

    fn ensure_owner_or_admin(actor: &AuthUser, order: &order::Model) -> Result<(), ServiceError> {
        if actor.is_admin() || order.customer_id == actor.user_id {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "You do not have access to this order".to_string(),
            ))
        }
    }

    /// Merges repeated cart lines and checks every line against current stock.
    async fn check_cart(
        &self,
        items: &[CartItem],
    ) -> Result<Vec<(product::Model, i32)>, ServiceError> {
        let mut quantities: Vec<(Uuid, i32)> = Vec::new();
        for item in items {
            match quantities.iter_mut().find(|(id, _)| *id == item.id) {
                Some((_, quantity)) => *quantity += item.quantity,
                None => quantities.push((item.id, item.quantity)),
            }
        }

        let ids: Vec<Uuid> = quantities.iter().map(|(id, _)| *id).collect();
        let products: HashMap<Uuid, product::Model> = product::Entity::find()
            .filter(product::Column::Id.is_in(ids))
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load cart products"))?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut lines = Vec::with_capacity(quantities.len());
        let mut shortages = Vec::new();
        for (product_id, quantity) in quantities {
            let product = products
                .get(&product_id)
                .cloned()
                .ok_or_else(|| ServiceError::not_found("Product", product_id))?;

            if !product.is_in_stock(quantity) {
                shortages.push(StockShortage {
                    product_id,
                    name: product.name.clone(),
                    requested: quantity,
                    available: if product.is_available {
                        product.stock_quantity.max(0)
                    } else {
                        0
                    },
                });
            }
            lines.push((product, quantity));
        }

        if !shortages.is_empty() {
            warn!(lines = shortages.len(), "checkout rejected: insufficient stock");
            return Err(ServiceError::InsufficientStock(shortages));
        }
        Ok(lines)
    }

    async fn delivery_fee_for(&self, area_id: Option<Uuid>) -> Result<Decimal, ServiceError> {
        let Some(area_id) = area_id else {
            return Ok(Decimal::ZERO);
        };
        let area = delivery_area::Entity::find_by_id(area_id)
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load delivery area"))?
            .filter(|area| area.is_active)
            .ok_or_else(|| ServiceError::not_found("Delivery area", area_id))?;
        Ok(area.delivery_fee)
    }

    /// Turns a cart into an order. Stock is checked up front and decremented
    /// conditionally inside the transaction.
    #[instrument(skip(self, actor, request), fields(customer_id = %actor.user_id))]
    pub async fn create_order_from_cart(
        &self,
        actor: &AuthUser,
        request: CreateOrderRequest,
    ) -> Result<OrderDetailResponse, ServiceError> {
        if request.cart_items.is_empty() {
            return Err(ServiceError::BadRequest("Cart is empty".to_string()));
        }
        request.validate()?;
        for item in &request.cart_items {
            item.validate()?;
        }

        let delivery_type = request.delivery_type.unwrap_or(DeliveryType::Instant);
        if delivery_type == DeliveryType::Scheduled {
            match request.scheduled_delivery_time {
                Some(at) if at > Utc::now() => {}
                Some(_) => {
                    return Err(ServiceError::ValidationError(
                        "scheduled_delivery_time must be in the future".to_string(),
                    ))
                }
                None => {
                    return Err(ServiceError::ValidationError(
                        "scheduled_delivery_time is required for scheduled delivery".to_string(),
                    ))
                }
            }
        }

        let lines = self.check_cart(&request.cart_items).await?;
        let delivery_fee = self.delivery_fee_for(request.delivery_area_id).await?;

        let db = &*self.db_pool;
        let order_id = Uuid::new_v4();
        let order_number = generate_order_number();
        let total = order_total(
            &lines
                .iter()
                .map(|(product, quantity)| (product.price, *quantity))
                .collect::<Vec<_>>(),
        );

        let txn = db
            .begin()
            .await
            .map_err(db_err("Failed to start order transaction"))?;

        order::ActiveModel {
            id: Set(order_id),
            order_number: Set(order_number.clone()),
            customer_id: Set(actor.user_id),
            delivery_type: Set(delivery_type),
            scheduled_delivery_time: Set(request.scheduled_delivery_time),
            delivery_address: Set(request.delivery_address.trim().to_string()),
            delivery_city: Set(request
                .delivery_city
                .unwrap_or_else(|| DEFAULT_DELIVERY_CITY.to_string())),
            delivery_instructions: Set(request.delivery_instructions),
            status: Set(OrderStatus::Pending),
            total_amount: Set(total),
            delivery_fee: Set(delivery_fee),
            special_instructions: Set(request.special_instructions),
            cancellation_reason: Set(None),
            cancellation_notes: Set(None),
            cancelled_at: Set(None),
            cancelled_by: Set(None),
            refund_preference: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to insert order");
            ServiceError::DatabaseError(e)
        })?;

        for (product, quantity) in &lines {
            if !reduce_stock(&txn, product.id, *quantity)
                .await
                .map_err(db_err("Failed to reduce stock"))?
            {
                // Lost a race with another checkout; the transaction rolls back on drop.
                let available = product::Entity::find_by_id(product.id)
                    .one(&txn)
                    .await
                    .map_err(db_err("Failed to reload product"))?
                    .filter(|p| p.is_available)
                    .map(|p| p.stock_quantity.max(0))
                    .unwrap_or(0);
                return Err(ServiceError::InsufficientStock(vec![StockShortage {
                    product_id: product.id,
                    name: product.name.clone(),
                    requested: *quantity,
                    available,
                }]));
            }

            order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(product.id),
                quantity: Set(*quantity),
                unit_price: Set(product.price),
                total_price: Set(line_total(product.price, *quantity)),
            }
            .insert(&txn)
            .await
            .map_err(db_err("Failed to insert order item"))?;
        }

        append_history(
            &txn,
            order_id,
            OrderStatus::Pending,
            "Order created".to_string(),
            Some(actor.user_id),
        )
        .await
        .map_err(db_err("Failed to write order history"))?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit order"))?;

        info!(order_id = %order_id, order_number = %order_number, total = %total, "order created");
        emit(
            &self.event_sender,
            Event::OrderCreated {
                order_id,
                order_number,
                customer_id: actor.user_id,
            },
        )
        .await;

        let order = self.resolve_order(&order_id.to_string()).await?;
        self.detail(order).await
    }

    async fn items_for(&self, order_id: Uuid) -> Result<Vec<OrderItemResponse>, ServiceError> {
        let rows = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .find_also_related(product::Entity)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load order items"))?;

        Ok(rows
            .into_iter()
            .map(|(item, product)| OrderItemResponse {
                product_name: product.map(|p| p.name).unwrap_or_default(),
                item,
            })
            .collect())
    }

    async fn history_for(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<order_status_history::Model>, ServiceError> {
        order_status_history::Entity::find()
            .filter(order_status_history::Column::OrderId.eq(order_id))
            .order_by_desc(order_status_history::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load order history"))
    }

    async fn detail(&self, order: order::Model) -> Result<OrderDetailResponse, ServiceError> {
        let items = self.items_for(order.id).await?;
        let history = self.history_for(order.id).await?;
        Ok(OrderDetailResponse {
            cancellation: CancellationInfo::for_order(&order, Utc::now()),
            amount_due: order.amount_due(),
            order,
            items,
            history,
        })
    }

    #[instrument(skip(self, actor))]
    pub async fn get_order(
        &self,
        actor: &AuthUser,
        reference: &str,
    ) -> Result<OrderDetailResponse, ServiceError> {
        let order = self.resolve_order(reference).await?;
        self.ensure_can_view(actor, &order).await?;
        self.detail(order).await
    }

    #[instrument(skip(self, actor))]
    pub async fn order_items(
        &self,
        actor: &AuthUser,
        reference: &str,
    ) -> Result<Vec<OrderItemResponse>, ServiceError> {
        let order = self.resolve_order(reference).await?;
        self.ensure_can_view(actor, &order).await?;
        self.items_for(order.id).await
    }

    #[instrument(skip(self, actor))]
    pub async fn order_history(
        &self,
        actor: &AuthUser,
        reference: &str,
    ) -> Result<Vec<order_status_history::Model>, ServiceError> {
        let order = self.resolve_order(reference).await?;
        self.ensure_can_view(actor, &order).await?;
        self.history_for(order.id).await
    }

    #[instrument(skip(self, actor))]
    pub async fn invoice(
        &self,
        actor: &AuthUser,
        reference: &str,
    ) -> Result<InvoiceResponse, ServiceError> {
        let order = self.resolve_order(reference).await?;
        Self::ensure_owner_or_admin(actor, &order)?;
        let db = &*self.db_pool;

        let items = self.items_for(order.id).await?;
        let payments = payment::Entity::find()
            .filter(payment::Column::OrderId.eq(order.id))
            .order_by_desc(payment::Column::CreatedAt)
            .all(db)
            .await
            .map_err(db_err("Failed to load payments"))?;
        let customer = user::Entity::find_by_id(order.customer_id)
            .one(db)
            .await
            .map_err(db_err("Failed to load customer"))?
            .ok_or_else(|| ServiceError::not_found("Customer", order.customer_id))?;

        Ok(InvoiceResponse {
            subtotal: order.total_amount,
            delivery_fee: order.delivery_fee,
            total_due: order.amount_due(),
            customer: CustomerContact {
                name: customer.full_name(),
                email: customer.email,
                phone_number: customer.phone_number,
                address: customer.address,
                city: customer.city,
            },
            order,
            items,
            payments,
        })
    }

    /// Orders visible to the caller, newest first.
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn list_orders(
        &self,
        actor: &AuthUser,
        page: PageRequest,
        status: Option<OrderStatus>,
        search: Option<String>,
    ) -> Result<PaginatedResponse<order::Model>, ServiceError> {
        let mut query = order::Entity::find().order_by_desc(order::Column::CreatedAt);

        if actor.is_admin() {
            // Administrators see every order.
        } else if actor.is_delivery_agent() {
            query = query
                .join(
                    sea_orm::JoinType::InnerJoin,
                    order::Relation::DeliveryAssignment.def(),
                )
                .filter(delivery_assignment::Column::DeliveryAgentId.eq(actor.user_id));
        } else {
            query = query.filter(order::Column::CustomerId.eq(actor.user_id));
        }

        if let Some(status) = status {
            query = query.filter(order::Column::Status.eq(status));
        }
        if let Some(term) = search.map(|s| s.trim().to_uppercase()).filter(|s| !s.is_empty()) {
            query = query.filter(order::Column::OrderNumber.contains(&term));
        }

        let paginator = query.paginate(&*self.db_pool, page.limit);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("Failed to count orders"))?;
        let orders = paginator
            .fetch_page(page.index())
            .await
            .map_err(db_err("Failed to fetch orders page"))?;

        Ok(PaginatedResponse::new(orders, total, page))
    }

    #[instrument(skip(self, actor))]
    pub async fn cancellation_info(
        &self,
        actor: &AuthUser,
        reference: &str,
    ) -> Result<CancellationInfo, ServiceError> {
        let order = self.resolve_order(reference).await?;
        Self::ensure_owner_or_admin(actor, &order)?;
        Ok(CancellationInfo::for_order(&order, Utc::now()))
    }

    /// Cancels an order, restores its stock, then requests refunds for
    /// completed payments. Refund creation never fails the cancellation.
    #[instrument(skip(self, actor, request), fields(actor_id = %actor.user_id))]
    pub async fn cancel_order(
        &self,
        actor: &AuthUser,
        reference: &str,
        request: CancelOrderRequest,
    ) -> Result<CancelOrderResponse, ServiceError> {
        request.validate()?;
        request.ensure_confirmed()?;
        let order = self.resolve_order(reference).await?;
        Self::ensure_owner_or_admin(actor, &order)?;

        let now = Utc::now();
        if !order.can_be_cancelled(now) {
            return Err(ServiceError::InvalidOperation(format!(
                "Order {} can no longer be cancelled",
                order.order_number
            )));
        }

        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(db_err("Failed to start cancellation"))?;

        let cancelled = transition_order(
            &txn,
            &order,
            order::ActiveModel {
                status: Set(OrderStatus::Cancelled),
                cancellation_reason: Set(Some(request.reason)),
                cancellation_notes: Set(request.additional_notes.clone()),
                cancelled_at: Set(Some(now)),
                cancelled_by: Set(Some(actor.user_id)),
                refund_preference: Set(Some(request.refund_preference)),
                updated_at: Set(now),
                ..Default::default()
            },
        )
        .await?;

        restore_order_stock(&txn, order.id)
            .await
            .map_err(db_err("Failed to restore stock"))?;

        append_history(
            &txn,
            order.id,
            OrderStatus::Cancelled,
            format!(
                "Order cancelled by {}. Reason: {}",
                actor.display_name(),
                request.reason
            ),
            Some(actor.user_id),
        )
        .await
        .map_err(db_err("Failed to write order history"))?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit cancellation"))?;

        info!(order_id = %order.id, reason = %request.reason, "order cancelled");

        let refunds = if request.refund_preference != RefundPreference::NoRefundNeeded {
            match create_cancellation_refunds(&*self.db_pool, &cancelled).await {
                Ok(refunds) => refunds,
                Err(e) => {
                    warn!(error = %e, order_id = %order.id, "cancellation refund could not be created");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        emit(
            &self.event_sender,
            Event::OrderCancelled {
                order_id: order.id,
                order_number: order.order_number.clone(),
                customer_id: order.customer_id,
                reason: request.reason.to_string(),
            },
        )
        .await;
        for refund in &refunds {
            emit(
                &self.event_sender,
                Event::RefundRequested {
                    refund_id: refund.id,
                    customer_id: order.customer_id,
                },
            )
            .await;
        }

        Ok(CancelOrderResponse {
            order: cancelled,
            refunds,
        })
    }

    /// Admin status change along the transition graph.
    #[instrument(skip(self, actor, request), fields(new_status = %request.status))]
    pub async fn update_order_status(
        &self,
        actor: &AuthUser,
        reference: &str,
        request: UpdateOrderStatusRequest,
    ) -> Result<OrderDetailResponse, ServiceError> {
        request.validate()?;
        let order = self.resolve_order(reference).await?;
        let old_status = order.status;
        let new_status = request.status;

        if old_status == new_status {
            return Err(ServiceError::InvalidStatus(format!(
                "Order is already {}",
                old_status
            )));
        }
        if !old_status.can_transition_to(new_status) {
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot move order from {} to {}",
                old_status, new_status
            )));
        }

        let now = Utc::now();
        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(db_err("Failed to start status update"))?;

        let mut next = order::ActiveModel {
            status: Set(new_status),
            updated_at: Set(now),
            ..Default::default()
        };
        if new_status == OrderStatus::Cancelled {
            next.cancelled_at = Set(Some(now));
            next.cancelled_by = Set(Some(actor.user_id));
            next.cancellation_notes = Set(request.notes.clone());
        }
        let updated = transition_order(&txn, &order, next).await?;

        if new_status == OrderStatus::Cancelled {
            restore_order_stock(&txn, order.id)
                .await
                .map_err(db_err("Failed to restore stock"))?;
        }

        let mut note = format!("Status changed from {} to {} by admin", old_status, new_status);
        if let Some(extra) = request.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            note.push_str(". ");
            note.push_str(extra.trim());
        }
        append_history(&txn, order.id, new_status, note, Some(actor.user_id))
            .await
            .map_err(db_err("Failed to write order history"))?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit status update"))?;

        info!(order_id = %order.id, old_status = %old_status, new_status = %new_status, "order status updated");
        emit(
            &self.event_sender,
            Event::OrderStatusChanged {
                order_id: order.id,
                order_number: order.order_number.clone(),
                customer_id: order.customer_id,
                old_status: old_status.to_string(),
                new_status: new_status.to_string(),
            },
        )
        .await;

        self.detail(updated).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_numbers_are_ord_plus_eight_hex() {
        for _ in 0..32 {
            let number = generate_order_number();
            assert_eq!(number.len(), 11);
            assert!(number.starts_with("ORD"));
            assert!(number[3..]
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
        }
    }

    #[test]
    fn empty_cart_fails_validation() {
        let request = CreateOrderRequest {
            delivery_address: "Road 7, Banani".into(),
            delivery_city: None,
            delivery_instructions: None,
            special_instructions: None,
            delivery_type: None,
            scheduled_delivery_time: None,
            delivery_area_id: None,
            cart_items: vec![],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn cancellation_must_be_confirmed() {
        let request = CancelOrderRequest {
            reason: CancellationReason::ChangedMind,
            additional_notes: None,
            refund_preference: RefundPreference::NoRefundNeeded,
            confirm_cancellation: false,
        };
        assert!(request.validate().is_ok());
        assert!(matches!(
            request.ensure_confirmed(),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn line_totals_multiply_price_by_quantity() {
        assert_eq!(line_total(dec!(120.50), 3), dec!(361.50));
        assert_eq!(
            order_total(&[(dec!(120.50), 2), (dec!(45.25), 4)]),
            dec!(422.00)
        );
    }

    proptest! {
        #[test]
        fn total_equals_sum_of_lines(
            lines in prop::collection::vec((1i64..1_000_000i64, 1i32..50i32), 1..10)
        ) {
            let priced: Vec<(Decimal, i32)> = lines
                .iter()
                .map(|(paisa, qty)| (Decimal::new(*paisa, 2), *qty))
                .collect();
            let expected: Decimal = priced
                .iter()
                .map(|(price, qty)| *price * Decimal::from(*qty))
                .sum();
            prop_assert_eq!(order_total(&priced), expected);
            prop_assert!(order_total(&priced) > Decimal::ZERO);
        }
    }
}

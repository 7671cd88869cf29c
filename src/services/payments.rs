use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{conflict_or_db, db_err, emit, PageRequest};
use crate::auth::AuthUser;
use crate::entities::{
    order::{self, OrderStatus},
    payment::{self, PaymentStatus, CASH_ON_DELIVERY},
    payment_method, payment_transaction,
    refund::{self, RefundStatus},
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::PaginatedResponse;

/// `TXN` followed by twelve uppercase hex digits.
pub fn generate_transaction_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("TXN{}", hex[..12].to_uppercase())
}

fn validate_positive(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount >= dec!(0.01) {
        Ok(())
    } else {
        Err(ValidationError::new("amount_below_minimum"))
    }
}

fn validate_non_negative(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() {
        Err(ValidationError::new("negative_amount"))
    } else {
        Ok(())
    }
}

/// What is left to refund on a payment given its existing refunds.
pub fn remaining_refundable(payment_amount: Decimal, refunds: &[refund::Model]) -> Decimal {
    let committed: Decimal = refunds
        .iter()
        .filter(|r| r.status.is_outstanding_or_done())
        .map(|r| r.amount)
        .sum();
    (payment_amount - committed).max(Decimal::ZERO)
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePaymentMethodRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(min = 1, max = 30))]
    pub code: String,
    pub description: Option<String>,
    #[validate(custom = "validate_non_negative")]
    #[serde(default)]
    pub processing_fee: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub min_amount: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub max_amount: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePaymentRequest {
    pub order_id: Uuid,
    #[validate(length(min = 1, max = 30))]
    pub payment_method: String,
    #[validate(custom = "validate_positive")]
    pub amount: Option<Decimal>,
    #[validate(length(max = 100))]
    pub payment_reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePaymentStatusRequest {
    pub status: PaymentStatus,
    #[validate(length(max = 500))]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RefundRequest {
    #[validate(custom = "validate_positive")]
    pub amount: Decimal,
    #[validate(length(min = 1, max = 1000))]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProcessRefundRequest {
    pub approve: bool,
    #[validate(length(max = 100))]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentDetailResponse {
    #[schema(value_type = crate::entities::payment::Model)]
    pub payment: payment::Model,
    #[schema(value_type = Vec<crate::entities::payment_transaction::Model>)]
    pub transactions: Vec<payment_transaction::Model>,
    #[schema(value_type = Vec<crate::entities::refund::Model>)]
    pub refunds: Vec<refund::Model>,
    pub refundable_amount: Decimal,
}

/// Appends an entry to a payment's transaction log.
pub(crate) async fn log_transaction<C: ConnectionTrait>(
    conn: &C,
    payment_id: Uuid,
    action: &str,
    status: PaymentStatus,
    message: Option<String>,
    response_data: Option<serde_json::Value>,
) -> Result<payment_transaction::Model, DbErr> {
    payment_transaction::ActiveModel {
        id: Set(Uuid::new_v4()),
        payment_id: Set(payment_id),
        action: Set(action.to_string()),
        status: Set(status.to_string()),
        message: Set(message),
        response_data: Set(response_data),
        timestamp: Set(Utc::now()),
    }
    .insert(conn)
    .await
}

/// Opens a pending refund for whatever is still refundable on each completed
/// payment of a cancelled order.
pub async fn create_cancellation_refunds<C: ConnectionTrait>(
    conn: &C,
    order: &order::Model,
) -> Result<Vec<refund::Model>, ServiceError> {
    let payments = payment::Entity::find()
        .filter(payment::Column::OrderId.eq(order.id))
        .filter(payment::Column::Status.eq(PaymentStatus::Completed))
        .all(conn)
        .await
        .map_err(db_err("Failed to load payments for cancellation refund"))?;

    let reason = match &order.cancellation_reason {
        Some(reason) => format!("Order cancellation: {}", reason),
        None => "Order cancellation".to_string(),
    };

    let mut created = Vec::new();
    for payment in payments {
        let existing = refund::Entity::find()
            .filter(refund::Column::PaymentId.eq(payment.id))
            .all(conn)
            .await
            .map_err(db_err("Failed to load refunds"))?;
        let amount = remaining_refundable(payment.amount, &existing);
        if amount <= Decimal::ZERO {
            continue;
        }

        let refund = refund::ActiveModel {
            id: Set(Uuid::new_v4()),
            payment_id: Set(payment.id),
            amount: Set(amount),
            reason: Set(reason.clone()),
            status: Set(RefundStatus::Pending),
            refund_reference: Set(None),
            processed_by: Set(None),
            processed_at: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(conn)
        .await
        .map_err(db_err("Failed to create cancellation refund"))?;

        info!(refund_id = %refund.id, payment_id = %payment.id, amount = %amount, "cancellation refund requested");
        created.push(refund);
    }
    Ok(created)
}

/// Payment methods, stubbed payments and refunds. No real gateway is called.
#[derive(Clone)]
pub struct PaymentService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl PaymentService {
    pub fn new(db_pool: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Active methods ordered by name.
    #[instrument(skip(self))]
    pub async fn list_payment_methods(&self) -> Result<Vec<payment_method::Model>, ServiceError> {
        payment_method::Entity::find()
            .filter(payment_method::Column::IsActive.eq(true))
            .order_by_asc(payment_method::Column::Name)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to list payment methods"))
    }

    #[instrument(skip(self, request), fields(code = %request.code))]
    pub async fn create_payment_method(
        &self,
        request: CreatePaymentMethodRequest,
    ) -> Result<payment_method::Model, ServiceError> {
        request.validate()?;
        if request.min_amount > request.max_amount {
            return Err(ServiceError::ValidationError(
                "min_amount must not exceed max_amount".to_string(),
            ));
        }

        let code = request.code.trim().to_lowercase();
        let taken = payment_method::Entity::find()
            .filter(payment_method::Column::Code.eq(code.as_str()))
            .count(&*self.db_pool)
            .await
            .map_err(db_err("Failed to check payment method code"))?;
        if taken > 0 {
            return Err(ServiceError::Conflict(format!(
                "Payment method {} already exists",
                code
            )));
        }

        let method = payment_method::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            code: Set(code),
            is_active: Set(request.is_active),
            description: Set(request.description),
            processing_fee: Set(request.processing_fee),
            min_amount: Set(request.min_amount),
            max_amount: Set(request.max_amount),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(conflict_or_db(
            "Failed to create payment method",
            "Payment method already exists",
        ))?;

        info!(method_id = %method.id, "payment method created");
        Ok(method)
    }

    async fn find_payment(&self, payment_id: Uuid) -> Result<payment::Model, ServiceError> {
        payment::Entity::find_by_id(payment_id)
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load payment"))?
            .ok_or_else(|| ServiceError::not_found("Payment", payment_id))
    }

    async fn order_of(&self, payment: &payment::Model) -> Result<order::Model, ServiceError> {
        order::Entity::find_by_id(payment.order_id)
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load order"))?
            .ok_or_else(|| ServiceError::not_found("Order", payment.order_id))
    }

    async fn refunds_of(&self, payment_id: Uuid) -> Result<Vec<refund::Model>, ServiceError> {
        refund::Entity::find()
            .filter(refund::Column::PaymentId.eq(payment_id))
            .order_by_desc(refund::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load refunds"))
    }

    async fn detail(&self, payment: payment::Model) -> Result<PaymentDetailResponse, ServiceError> {
        let transactions = payment_transaction::Entity::find()
            .filter(payment_transaction::Column::PaymentId.eq(payment.id))
            .order_by_asc(payment_transaction::Column::Timestamp)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load payment transactions"))?;
        let refunds = self.refunds_of(payment.id).await?;
        let refundable_amount = if payment.status == PaymentStatus::Completed {
            remaining_refundable(payment.amount, &refunds)
        } else {
            Decimal::ZERO
        };

        Ok(PaymentDetailResponse {
            payment,
            transactions,
            refunds,
            refundable_amount,
        })
    }

    /// Records a payment against one of the caller's orders.
    #[instrument(skip(self, actor, request), fields(order_id = %request.order_id))]
    pub async fn create_payment(
        &self,
        actor: &AuthUser,
        request: CreatePaymentRequest,
    ) -> Result<PaymentDetailResponse, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let order = order::Entity::find_by_id(request.order_id)
            .one(db)
            .await
            .map_err(db_err("Failed to load order"))?
            .ok_or_else(|| ServiceError::not_found("Order", request.order_id))?;
        if order.customer_id != actor.user_id {
            return Err(ServiceError::Forbidden(
                "You can only pay for your own orders".to_string(),
            ));
        }
        if matches!(order.status, OrderStatus::Cancelled | OrderStatus::Returned) {
            return Err(ServiceError::InvalidOperation(format!(
                "Order {} is {} and cannot be paid",
                order.order_number, order.status
            )));
        }

        let code = request.payment_method.trim().to_lowercase();
        let method = payment_method::Entity::find()
            .filter(payment_method::Column::Code.eq(code.as_str()))
            .filter(payment_method::Column::IsActive.eq(true))
            .one(db)
            .await
            .map_err(db_err("Failed to load payment method"))?
            .ok_or_else(|| ServiceError::not_found("Payment method", &code))?;

        let amount = request.amount.unwrap_or_else(|| order.amount_due()).round_dp(2);
        if !method.accepts(amount) {
            return Err(ServiceError::ValidationError(format!(
                "{} accepts amounts between {} and {}",
                method.name, method.min_amount, method.max_amount
            )));
        }

        let txn = db
            .begin()
            .await
            .map_err(db_err("Failed to start payment transaction"))?;

        let payment = payment::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            payment_method: Set(method.code.clone()),
            amount: Set(amount),
            status: Set(PaymentStatus::Pending),
            transaction_id: Set(generate_transaction_id()),
            payment_reference: Set(request.payment_reference),
            payment_details: Set(Some(json!({
                "method_name": method.name,
                "processing_fee": method.processing_fee,
                "collect_on_delivery": method.code == CASH_ON_DELIVERY,
            }))),
            paid_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(conflict_or_db("Failed to insert payment", "Duplicate transaction id"))?;

        log_transaction(
            &txn,
            payment.id,
            "initiated",
            PaymentStatus::Pending,
            Some(format!("Payment initiated via {}", method.name)),
            None,
        )
        .await
        .map_err(db_err("Failed to log payment transaction"))?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit payment"))?;

        info!(payment_id = %payment.id, amount = %amount, method = %payment.payment_method, "payment created");
        emit(
            &self.event_sender,
            Event::PaymentCreated {
                payment_id: payment.id,
                order_id: order.id,
                customer_id: order.customer_id,
            },
        )
        .await;

        self.detail(payment).await
    }

    /// Admins see all payments, everyone else the payments on their own orders.
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn list_payments(
        &self,
        actor: &AuthUser,
        page: PageRequest,
        status: Option<PaymentStatus>,
    ) -> Result<PaginatedResponse<payment::Model>, ServiceError> {
        let mut query = payment::Entity::find().order_by_desc(payment::Column::CreatedAt);
        if !actor.is_admin() {
            query = query
                .join(JoinType::InnerJoin, payment::Relation::Order.def())
                .filter(order::Column::CustomerId.eq(actor.user_id));
        }
        if let Some(status) = status {
            query = query.filter(payment::Column::Status.eq(status));
        }

        let paginator = query.paginate(&*self.db_pool, page.limit);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("Failed to count payments"))?;
        let payments = paginator
            .fetch_page(page.index())
            .await
            .map_err(db_err("Failed to fetch payments page"))?;

        Ok(PaginatedResponse::new(payments, total, page))
    }

    #[instrument(skip(self, actor))]
    pub async fn get_payment(
        &self,
        actor: &AuthUser,
        payment_id: Uuid,
    ) -> Result<PaymentDetailResponse, ServiceError> {
        let payment = self.find_payment(payment_id).await?;
        if !actor.is_admin() {
            let order = self.order_of(&payment).await?;
            if order.customer_id != actor.user_id {
                return Err(ServiceError::Forbidden(
                    "You do not have access to this payment".to_string(),
                ));
            }
        }
        self.detail(payment).await
    }

    /// Sets a payment's status and logs the change.
    #[instrument(skip(self, request), fields(new_status = %request.status))]
    pub async fn update_payment_status(
        &self,
        payment_id: Uuid,
        request: UpdatePaymentStatusRequest,
    ) -> Result<PaymentDetailResponse, ServiceError> {
        request.validate()?;
        let payment = self.find_payment(payment_id).await?;
        let order = self.order_of(&payment).await?;
        let old_status = payment.status;

        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(db_err("Failed to start payment update"))?;

        let mut active: payment::ActiveModel = payment.into();
        active.status = Set(request.status);
        if request.status == PaymentStatus::Completed {
            active.paid_at = Set(Some(Utc::now()));
        }
        let updated = active
            .update(&txn)
            .await
            .map_err(db_err("Failed to update payment"))?;

        log_transaction(
            &txn,
            updated.id,
            "status_update",
            request.status,
            request
                .message
                .or_else(|| Some(format!("Status changed from {} to {}", old_status, request.status))),
            None,
        )
        .await
        .map_err(db_err("Failed to log payment transaction"))?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit payment update"))?;

        info!(payment_id = %updated.id, old_status = %old_status, new_status = %request.status, "payment status updated");
        emit(
            &self.event_sender,
            Event::PaymentStatusChanged {
                payment_id: updated.id,
                customer_id: order.customer_id,
                new_status: request.status.to_string(),
            },
        )
        .await;

        self.detail(updated).await
    }

    /// Opens a refund request against a completed payment.
    #[instrument(skip(self, actor, request), fields(amount = %request.amount))]
    pub async fn request_refund(
        &self,
        actor: &AuthUser,
        payment_id: Uuid,
        request: RefundRequest,
    ) -> Result<refund::Model, ServiceError> {
        request.validate()?;
        let payment = self.find_payment(payment_id).await?;
        let order = self.order_of(&payment).await?;
        if order.customer_id != actor.user_id {
            return Err(ServiceError::Forbidden(
                "You can only request refunds for your own payments".to_string(),
            ));
        }

        // The payment row lock serializes concurrent requests against one balance.
        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(db_err("Failed to start refund request"))?;
        let payment = payment::Entity::find_by_id(payment.id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err("Failed to lock payment"))?
            .ok_or_else(|| ServiceError::not_found("Payment", payment_id))?;
        if payment.status != PaymentStatus::Completed {
            return Err(ServiceError::InvalidOperation(format!(
                "Only completed payments can be refunded (payment is {})",
                payment.status
            )));
        }

        let existing = refund::Entity::find()
            .filter(refund::Column::PaymentId.eq(payment.id))
            .all(&txn)
            .await
            .map_err(db_err("Failed to load refunds"))?;
        let remaining = remaining_refundable(payment.amount, &existing);
        if request.amount > remaining {
            return Err(ServiceError::ValidationError(format!(
                "Refund amount exceeds the refundable balance of {}",
                remaining
            )));
        }

        let refund = refund::ActiveModel {
            id: Set(Uuid::new_v4()),
            payment_id: Set(payment.id),
            amount: Set(request.amount.round_dp(2)),
            reason: Set(request.reason.trim().to_string()),
            status: Set(RefundStatus::Pending),
            refund_reference: Set(None),
            processed_by: Set(None),
            processed_at: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await
        .map_err(db_err("Failed to create refund"))?;
        txn.commit()
            .await
            .map_err(db_err("Failed to commit refund request"))?;

        info!(refund_id = %refund.id, payment_id = %payment.id, "refund requested");
        emit(
            &self.event_sender,
            Event::RefundRequested {
                refund_id: refund.id,
                customer_id: order.customer_id,
            },
        )
        .await;
        Ok(refund)
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn list_refunds(
        &self,
        actor: &AuthUser,
        page: PageRequest,
        status: Option<RefundStatus>,
    ) -> Result<PaginatedResponse<refund::Model>, ServiceError> {
        let mut query = refund::Entity::find().order_by_desc(refund::Column::CreatedAt);
        if !actor.is_admin() {
            query = query
                .join(JoinType::InnerJoin, refund::Relation::Payment.def())
                .join(JoinType::InnerJoin, payment::Relation::Order.def())
                .filter(order::Column::CustomerId.eq(actor.user_id));
        }
        if let Some(status) = status {
            query = query.filter(refund::Column::Status.eq(status));
        }

        let paginator = query.paginate(&*self.db_pool, page.limit);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("Failed to count refunds"))?;
        let refunds = paginator
            .fetch_page(page.index())
            .await
            .map_err(db_err("Failed to fetch refunds page"))?;

        Ok(PaginatedResponse::new(refunds, total, page))
    }

    /// Approves or rejects a pending refund. A payment whose completed refunds
    /// cover its full amount becomes `refunded`.
    #[instrument(skip(self, actor, request), fields(approve = request.approve))]
    pub async fn process_refund(
        &self,
        actor: &AuthUser,
        refund_id: Uuid,
        request: ProcessRefundRequest,
    ) -> Result<refund::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let refund = refund::Entity::find_by_id(refund_id)
            .one(db)
            .await
            .map_err(db_err("Failed to load refund"))?
            .ok_or_else(|| ServiceError::not_found("Refund", refund_id))?;

        if !matches!(refund.status, RefundStatus::Pending | RefundStatus::Processing) {
            return Err(ServiceError::InvalidOperation(format!(
                "Refund is already {}",
                refund.status
            )));
        }

        let payment = self.find_payment(refund.payment_id).await?;
        let order = self.order_of(&payment).await?;
        let now = Utc::now();

        let txn = db
            .begin()
            .await
            .map_err(db_err("Failed to start refund processing"))?;

        let mut active: refund::ActiveModel = refund.into();
        active.status = Set(if request.approve {
            RefundStatus::Completed
        } else {
            RefundStatus::Cancelled
        });
        active.processed_by = Set(Some(actor.user_id));
        active.processed_at = Set(Some(now));
        if let Some(reference) = request.reference.clone() {
            active.refund_reference = Set(Some(reference));
        }
        let processed = active
            .update(&txn)
            .await
            .map_err(db_err("Failed to update refund"))?;

        if request.approve {
            let completed: Decimal = refund::Entity::find()
                .filter(refund::Column::PaymentId.eq(payment.id))
                .filter(refund::Column::Status.eq(RefundStatus::Completed))
                .all(&txn)
                .await
                .map_err(db_err("Failed to total refunds"))?
                .iter()
                .map(|r| r.amount)
                .sum();

            if completed >= payment.amount && payment.status != PaymentStatus::Refunded {
                let payment_id = payment.id;
                let mut payment_active: payment::ActiveModel = payment.into();
                payment_active.status = Set(PaymentStatus::Refunded);
                payment_active
                    .update(&txn)
                    .await
                    .map_err(db_err("Failed to mark payment refunded"))?;
                log_transaction(
                    &txn,
                    payment_id,
                    "refund",
                    PaymentStatus::Refunded,
                    Some("Payment fully refunded".to_string()),
                    Some(json!({ "refunded_total": completed })),
                )
                .await
                .map_err(db_err("Failed to log payment transaction"))?;
            }
        }

        txn.commit()
            .await
            .map_err(db_err("Failed to commit refund processing"))?;

        if request.approve {
            info!(refund_id = %processed.id, "refund approved");
        } else {
            warn!(refund_id = %processed.id, "refund rejected");
        }
        emit(
            &self.event_sender,
            Event::RefundProcessed {
                refund_id: processed.id,
                customer_id: order.customer_id,
                approved: request.approve,
            },
        )
        .await;
        Ok(processed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refund_of(amount: Decimal, status: RefundStatus) -> refund::Model {
        refund::Model {
            id: Uuid::new_v4(),
            payment_id: Uuid::new_v4(),
            amount,
            reason: "test".into(),
            status,
            refund_reference: None,
            processed_by: None,
            processed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn transaction_ids_are_txn_plus_twelve() {
        let id = generate_transaction_id();
        assert_eq!(id.len(), 15);
        assert!(id.starts_with("TXN"));
        assert!(id[3..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn failed_and_cancelled_refunds_do_not_count() {
        let refunds = vec![
            refund_of(dec!(100.00), RefundStatus::Completed),
            refund_of(dec!(50.00), RefundStatus::Pending),
            refund_of(dec!(75.00), RefundStatus::Failed),
            refund_of(dec!(25.00), RefundStatus::Cancelled),
        ];
        assert_eq!(remaining_refundable(dec!(300.00), &refunds), dec!(150.00));
    }

    #[test]
    fn remaining_never_goes_negative() {
        let refunds = vec![refund_of(dec!(500.00), RefundStatus::Completed)];
        assert_eq!(remaining_refundable(dec!(300.00), &refunds), Decimal::ZERO);
    }

    #[test]
    fn refund_amount_must_be_positive() {
        let request = RefundRequest {
            amount: Decimal::ZERO,
            reason: "damaged".into(),
        };
        assert!(request.validate().is_err());
    }
}

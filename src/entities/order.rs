use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Window for cancelling a pending or confirmed order.
pub const OPEN_CANCELLATION_WINDOW_HOURS: i64 = 48;
/// Window for cancelling an order that is already being processed.
pub const PROCESSING_CANCELLATION_WINDOW_HOURS: i64 = 24;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "dispatched")]
    Dispatched,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "returned")]
    Returned,
}

impl OrderStatus {
    /// Statuses reachable in one step from `self`.
    pub fn allowed_transitions(self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Confirmed, Cancelled],
            Confirmed => &[Processing, Cancelled],
            Processing => &[Dispatched, Cancelled],
            Dispatched => &[Delivered, Returned],
            Delivered => &[Returned],
            Cancelled | Returned => &[],
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Statuses a customer may cancel from, subject to the time window.
    pub fn is_cancellable(self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Processing
        )
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    #[sea_orm(string_value = "instant")]
    Instant,
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(40))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CancellationReason {
    #[sea_orm(string_value = "changed_mind")]
    ChangedMind,
    #[sea_orm(string_value = "wrong_order")]
    WrongOrder,
    #[sea_orm(string_value = "delivery_issue")]
    DeliveryIssue,
    #[sea_orm(string_value = "price_issue")]
    PriceIssue,
    #[sea_orm(string_value = "found_elsewhere")]
    FoundElsewhere,
    #[sea_orm(string_value = "no_longer_needed")]
    NoLongerNeeded,
    #[sea_orm(string_value = "payment_issue")]
    PaymentIssue,
    #[sea_orm(string_value = "delivery_time_issue")]
    DeliveryTimeIssue,
    #[sea_orm(string_value = "product_quality_concern")]
    ProductQualityConcern,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(30))")]
#[serde(rename_all = "snake_case")]
pub enum RefundPreference {
    #[sea_orm(string_value = "refund_to_payment_method")]
    RefundToPaymentMethod,
    #[sea_orm(string_value = "refund_to_wallet")]
    RefundToWallet,
    #[sea_orm(string_value = "no_refund_needed")]
    NoRefundNeeded,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "orders")]
#[schema(as = Order)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub order_number: String,
    pub customer_id: Uuid,
    pub delivery_type: DeliveryType,
    pub scheduled_delivery_time: Option<DateTime<Utc>>,
    #[sea_orm(column_type = "Text")]
    pub delivery_address: String,
    pub delivery_city: String,
    pub delivery_instructions: Option<String>,
    pub status: OrderStatus,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub delivery_fee: Decimal,
    pub special_instructions: Option<String>,
    pub cancellation_reason: Option<CancellationReason>,
    pub cancellation_notes: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<Uuid>,
    pub refund_preference: Option<RefundPreference>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Latest moment a customer may cancel, or `None` once past processing.
    pub fn cancellation_deadline(&self) -> Option<DateTime<Utc>> {
        match self.status {
            OrderStatus::Pending | OrderStatus::Confirmed => {
                Some(self.created_at + Duration::hours(OPEN_CANCELLATION_WINDOW_HOURS))
            }
            OrderStatus::Processing => {
                Some(self.created_at + Duration::hours(PROCESSING_CANCELLATION_WINDOW_HOURS))
            }
            _ => None,
        }
    }

    pub fn can_be_cancelled(&self, now: DateTime<Utc>) -> bool {
        if !self.status.is_cancellable() {
            return false;
        }
        if self.status == OrderStatus::Processing {
            return now - self.created_at <= Duration::hours(PROCESSING_CANCELLATION_WINDOW_HOURS);
        }
        true
    }

    /// Amount the customer is expected to pay for this order.
    pub fn amount_due(&self) -> Decimal {
        self.total_amount + self.delivery_fee
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CustomerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Customer,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
    #[sea_orm(has_many = "super::order_status_history::Entity")]
    StatusHistory,
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
    #[sea_orm(has_one = "super::delivery_assignment::Entity")]
    DeliveryAssignment,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::order_status_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusHistory.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::delivery_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryAssignment.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr> {
        let now = Utc::now();
        if insert {
            self.created_at = Set(now);
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use sea_orm::Iterable;

    fn order(status: OrderStatus, age_hours: i64) -> Model {
        let created = Utc::now() - Duration::hours(age_hours);
        Model {
            id: Uuid::new_v4(),
            order_number: "ORD0A1B2C3D".into(),
            customer_id: Uuid::new_v4(),
            delivery_type: DeliveryType::Instant,
            scheduled_delivery_time: None,
            delivery_address: "House 12, Road 5, Dhanmondi".into(),
            delivery_city: "ঢাকা".into(),
            delivery_instructions: None,
            status,
            total_amount: dec!(250.00),
            delivery_fee: dec!(60.00),
            special_instructions: None,
            cancellation_reason: None,
            cancellation_notes: None,
            cancelled_at: None,
            cancelled_by: None,
            refund_preference: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[rstest]
    #[case(OrderStatus::Pending, 1, true)]
    #[case(OrderStatus::Pending, 72, true)]
    #[case(OrderStatus::Confirmed, 10, true)]
    #[case(OrderStatus::Processing, 2, true)]
    #[case(OrderStatus::Processing, 25, false)]
    #[case(OrderStatus::Dispatched, 1, false)]
    #[case(OrderStatus::Delivered, 1, false)]
    #[case(OrderStatus::Cancelled, 1, false)]
    fn cancellation_window(#[case] status: OrderStatus, #[case] age: i64, #[case] expected: bool) {
        assert_eq!(order(status, age).can_be_cancelled(Utc::now()), expected);
    }

    #[test]
    fn deadline_depends_on_status() {
        let pending = order(OrderStatus::Pending, 0);
        assert_eq!(
            pending.cancellation_deadline(),
            Some(pending.created_at + Duration::hours(48))
        );
        let processing = order(OrderStatus::Processing, 0);
        assert_eq!(
            processing.cancellation_deadline(),
            Some(processing.created_at + Duration::hours(24))
        );
        assert_eq!(order(OrderStatus::Dispatched, 0).cancellation_deadline(), None);
    }

    #[test]
    fn terminal_statuses_accept_nothing() {
        for status in OrderStatus::iter() {
            if status.is_terminal() {
                assert!(OrderStatus::iter().all(|next| !status.can_transition_to(next)));
            }
        }
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Returned.is_terminal());
    }

    #[test]
    fn happy_path_is_a_chain() {
        use OrderStatus::*;
        let chain = [Pending, Confirmed, Processing, Dispatched, Delivered];
        for pair in chain.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
        assert!(!Delivered.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Delivered));
    }

    fn any_status() -> impl Strategy<Value = OrderStatus> {
        prop::sample::select(OrderStatus::iter().collect::<Vec<_>>())
    }

    proptest! {
        #[test]
        fn no_self_transitions(status in any_status()) {
            prop_assert!(!status.can_transition_to(status));
        }

        #[test]
        fn nothing_leads_back_to_pending(from in any_status()) {
            prop_assert!(!from.can_transition_to(OrderStatus::Pending));
        }

        #[test]
        fn cancelled_only_reachable_from_cancellable(from in any_status()) {
            prop_assert_eq!(
                from.can_transition_to(OrderStatus::Cancelled),
                from.is_cancellable()
            );
        }
    }
}

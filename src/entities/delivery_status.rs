use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::order::OrderStatus;

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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeliveryStage {
    #[sea_orm(string_value = "assigned")]
    Assigned,
    #[sea_orm(string_value = "picked_up")]
    PickedUp,
    #[sea_orm(string_value = "in_transit")]
    InTransit,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "returned")]
    Returned,
}

impl DeliveryStage {
    /// No further updates are accepted after these stages.
    pub fn is_final(self) -> bool {
        matches!(self, DeliveryStage::Delivered | DeliveryStage::Returned)
    }

    /// Order status this stage moves the order to, if any.
    pub fn order_status(self) -> Option<OrderStatus> {
        match self {
            DeliveryStage::PickedUp | DeliveryStage::InTransit => Some(OrderStatus::Dispatched),
            DeliveryStage::Delivered => Some(OrderStatus::Delivered),
            DeliveryStage::Returned => Some(OrderStatus::Returned),
            DeliveryStage::Assigned | DeliveryStage::Failed => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "delivery_statuses")]
#[schema(as = DeliveryStatus)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub delivery_assignment_id: Uuid,
    pub status: DeliveryStage,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::delivery_assignment::Entity",
        from = "Column::DeliveryAssignmentId",
        to = "super::delivery_assignment::Column::Id",
        on_delete = "Cascade"
    )]
    Assignment,
}

impl Related<super::delivery_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "payment_methods")]
#[schema(as = PaymentMethod)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    /// Stable identifier stored on payments, e.g. `bkash`
    #[sea_orm(unique)]
    pub code: String,
    pub is_active: bool,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub processing_fee: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub min_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub max_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Model {
    pub fn accepts(&self, amount: Decimal) -> bool {
        amount >= self.min_amount && amount <= self.max_amount
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

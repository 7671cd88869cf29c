use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

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
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    #[sea_orm(string_value = "orders")]
    Orders,
    #[sea_orm(string_value = "revenue")]
    Revenue,
    #[sea_orm(string_value = "customers")]
    Customers,
    #[sea_orm(string_value = "deliveries")]
    Deliveries,
    #[sea_orm(string_value = "products")]
    Products,
    #[sea_orm(string_value = "reviews")]
    Reviews,
}

/// Daily metric snapshot; unique per (metric_type, date).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "analytics_data")]
#[schema(as = AnalyticsData)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub metric_type: MetricType,
    pub date: NaiveDate,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub value: Decimal,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Json>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stock level at or below which the remaining count is called out.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

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
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProductCategory {
    #[sea_orm(string_value = "food")]
    Food,
    #[sea_orm(string_value = "medicine")]
    Medicine,
    #[sea_orm(string_value = "gas")]
    Gas,
    #[sea_orm(string_value = "groceries")]
    Groceries,
    #[sea_orm(string_value = "electronics")]
    Electronics,
    #[sea_orm(string_value = "clothing")]
    Clothing,
    #[sea_orm(string_value = "books")]
    Books,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "products")]
#[schema(as = Product)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category: ProductCategory,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    pub is_available: bool,
    pub stock_quantity: i32,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// True when the product is sellable and at least `quantity` units remain.
    pub fn is_in_stock(&self, quantity: i32) -> bool {
        self.is_available && self.stock_quantity >= quantity
    }

    pub fn stock_status(&self) -> String {
        if !self.is_available {
            "unavailable".to_string()
        } else if self.stock_quantity <= 0 {
            "out of stock".to_string()
        } else if self.stock_quantity <= LOW_STOCK_THRESHOLD {
            format!("only {} left", self.stock_quantity)
        } else {
            format!("{} in stock", self.stock_quantity)
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
    #[sea_orm(has_many = "super::review::Entity")]
    Reviews,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
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
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn product(is_available: bool, stock_quantity: i32) -> Model {
        Model {
            id: Uuid::new_v4(),
            name: "Napa Extra".into(),
            description: "Paracetamol".into(),
            category: ProductCategory::Medicine,
            price: dec!(2.50),
            is_available,
            stock_quantity,
            image_path: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    #[case(false, 40, "unavailable")]
    #[case(true, 0, "out of stock")]
    #[case(true, 1, "only 1 left")]
    #[case(true, 5, "only 5 left")]
    #[case(true, 6, "6 in stock")]
    fn stock_status_text(#[case] available: bool, #[case] stock: i32, #[case] expected: &str) {
        assert_eq!(product(available, stock).stock_status(), expected);
    }

    #[test]
    fn in_stock_requires_availability_and_quantity() {
        assert!(product(true, 3).is_in_stock(3));
        assert!(!product(true, 3).is_in_stock(4));
        assert!(!product(false, 30).is_in_stock(1));
    }
}

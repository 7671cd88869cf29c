use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{db_err, PageRequest};
use crate::entities::product::{self, ProductCategory};
use crate::errors::ServiceError;
use crate::PaginatedResponse;

/// Page size used by the public catalog when the caller does not ask for one.
pub const CATALOG_PAGE_SIZE: u64 = 12;

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price >= dec!(0.01) {
        Ok(())
    } else {
        Err(ValidationError::new("price_below_minimum"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    #[serde(flatten)]
    #[schema(inline, value_type = crate::entities::product::Model)]
    pub product: product::Model,
    pub in_stock: bool,
    pub stock_status: String,
}

impl From<product::Model> for ProductResponse {
    fn from(product: product::Model) -> Self {
        Self {
            in_stock: product.is_in_stock(1),
            stock_status: product.stock_status(),
            product,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: ProductCategory,
    #[validate(custom = "validate_price")]
    pub price: Decimal,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub stock_quantity: i32,
    #[validate(length(max = 255))]
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<ProductCategory>,
    #[validate(custom = "validate_price")]
    pub price: Option<Decimal>,
    pub is_available: Option<bool>,
    #[validate(range(min = 0))]
    pub stock_quantity: Option<i32>,
    #[validate(length(max = 255))]
    pub image_path: Option<String>,
}

/// Conditionally decrements stock. Returns `false` and leaves the row alone
/// when the product is unavailable or fewer than `quantity` units remain.
pub async fn reduce_stock<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    quantity: i32,
) -> Result<bool, DbErr> {
    let result = product::Entity::update_many()
        .col_expr(
            product::Column::StockQuantity,
            Expr::col(product::Column::StockQuantity).sub(quantity),
        )
        .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::IsAvailable.eq(true))
        .filter(product::Column::StockQuantity.gte(quantity))
        .exec(conn)
        .await?;
    Ok(result.rows_affected == 1)
}

/// Puts `quantity` units back on the shelf.
pub async fn restore_stock<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    quantity: i32,
) -> Result<(), DbErr> {
    product::Entity::update_many()
        .col_expr(
            product::Column::StockQuantity,
            Expr::col(product::Column::StockQuantity).add(quantity),
        )
        .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(product::Column::Id.eq(product_id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Products and services offered for delivery.
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    /// Available products, newest first.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        page: PageRequest,
        category: Option<ProductCategory>,
        search: Option<String>,
    ) -> Result<PaginatedResponse<ProductResponse>, ServiceError> {
        let mut query = product::Entity::find()
            .filter(product::Column::IsAvailable.eq(true))
            .order_by_desc(product::Column::CreatedAt);

        if let Some(category) = category {
            query = query.filter(product::Column::Category.eq(category));
        }
        if let Some(term) = search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(product::Column::Name.contains(&term))
                    .add(product::Column::Description.contains(&term)),
            );
        }

        let paginator = query.paginate(&*self.db_pool, page.limit);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("Failed to count products"))?;
        let products = paginator
            .fetch_page(page.index())
            .await
            .map_err(db_err("Failed to fetch products page"))?;

        Ok(PaginatedResponse::new(
            products.into_iter().map(ProductResponse::from).collect(),
            total,
            page,
        ))
    }

    pub async fn find_product(&self, product_id: Uuid) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(product_id)
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load product"))?
            .ok_or_else(|| ServiceError::not_found("Product", product_id))
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductResponse, ServiceError> {
        self.find_product(product_id).await.map(ProductResponse::from)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        request.validate()?;

        let product = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            description: Set(request.description),
            category: Set(request.category),
            price: Set(request.price.round_dp(2)),
            is_available: Set(true),
            stock_quantity: Set(request.stock_quantity),
            image_path: Set(request.image_path),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(db_err("Failed to create product"))?;

        info!(product_id = %product.id, "product created");
        Ok(product.into())
    }

    #[instrument(skip(self, request))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        request: UpdateProductRequest,
    ) -> Result<ProductResponse, ServiceError> {
        request.validate()?;
        let existing = self.find_product(product_id).await?;

        let mut active: product::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = request.description {
            active.description = Set(description);
        }
        if let Some(category) = request.category {
            active.category = Set(category);
        }
        if let Some(price) = request.price {
            active.price = Set(price.round_dp(2));
        }
        if let Some(is_available) = request.is_available {
            active.is_available = Set(is_available);
        }
        if let Some(stock) = request.stock_quantity {
            active.stock_quantity = Set(stock);
        }
        if let Some(image_path) = request.image_path {
            active.image_path = Set(Some(image_path));
        }

        let product = active
            .update(&*self.db_pool)
            .await
            .map_err(db_err("Failed to update product"))?;

        info!(product_id = %product.id, "product updated");
        Ok(product.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: Uuid) -> Result<(), ServiceError> {
        let result = product::Entity::delete_by_id(product_id)
            .exec(&*self.db_pool)
            .await
            .map_err(db_err("Failed to delete product"))?;

        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Product", product_id));
        }
        info!(product_id = %product_id, "product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_must_be_at_least_one_paisa() {
        assert!(validate_price(&dec!(0.01)).is_ok());
        assert!(validate_price(&dec!(0.00)).is_err());
        assert!(validate_price(&dec!(-5)).is_err());
    }

    #[test]
    fn create_request_rejects_negative_stock() {
        let request = CreateProductRequest {
            name: "Napa Extra".into(),
            description: String::new(),
            category: ProductCategory::Medicine,
            price: dec!(25.00),
            stock_quantity: -1,
            image_path: None,
        };
        assert!(request.validate().is_err());
    }
}

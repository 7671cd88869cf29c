use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Alias, Expr},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use super::db_err;
use crate::auth::AuthUser;
use crate::entities::{
    analytics_data::{self, MetricType},
    delivery_assignment,
    order::{self, OrderStatus},
    order_item,
    payment::{self, PaymentStatus},
    product::{self, ProductCategory},
    review,
    user::{self, UserType},
};
use crate::errors::ServiceError;

/// Window used by the analytics view and the default order report.
pub const ANALYTICS_WINDOW_DAYS: i64 = 30;

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Half-open `[start, end + 1 day)` range covering both dates.
pub fn day_range(start: NaiveDate, end: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    (day_start(start), day_start(end) + Duration::days(1))
}

/// Resolves the report range, defaulting to the trailing window ending today.
pub fn report_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), ServiceError> {
    let end = end.unwrap_or(today);
    let start = start.unwrap_or(end - Duration::days(ANALYTICS_WINDOW_DAYS));
    if start > end {
        return Err(ServiceError::BadRequest(
            "start_date must not be after end_date".to_string(),
        ));
    }
    Ok((start, end))
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HomeStats {
    pub total_customers: u64,
    pub delivered_orders: u64,
    pub available_products: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct OrderCounts {
    pub total: u64,
    pub pending: u64,
    pub delivered: u64,
    pub cancelled: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RevenueStats {
    pub total: Decimal,
    pub last_7_days: Decimal,
    pub last_30_days: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub name: String,
    pub order_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminDashboard {
    pub orders: OrderCounts,
    pub revenue: RevenueStats,
    pub total_customers: u64,
    pub new_customers_7_days: u64,
    pub total_products: u64,
    pub available_products: u64,
    pub total_deliveries: u64,
    pub completed_deliveries: u64,
    #[schema(value_type = Vec<crate::entities::order::Model>)]
    pub recent_orders: Vec<order::Model>,
    #[schema(value_type = Vec<crate::entities::payment::Model>)]
    pub recent_payments: Vec<payment::Model>,
    pub top_products: Vec<TopProduct>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDashboard {
    pub orders: OrderCounts,
    pub total_spent: Decimal,
    #[schema(value_type = Vec<crate::entities::order::Model>)]
    pub recent_orders: Vec<order::Model>,
    #[schema(value_type = Vec<crate::entities::review::Model>)]
    pub recent_reviews: Vec<review::Model>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryStats {
    pub category: ProductCategory,
    pub product_count: u64,
    pub items_ordered: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsResponse {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub orders_per_day: Vec<DailyCount>,
    pub revenue_per_day: Vec<DailyRevenue>,
    pub categories: Vec<CategoryStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_orders: u64,
    pub total_amount: Decimal,
    pub total_delivery_fees: Decimal,
    pub by_status: BTreeMap<String, u64>,
    #[schema(value_type = Vec<crate::entities::order::Model>)]
    pub orders: Vec<order::Model>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RevenueReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_revenue: Decimal,
    pub payment_count: u64,
    #[schema(value_type = Vec<crate::entities::payment::Model>)]
    pub payments: Vec<payment::Model>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeliveryReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_deliveries: u64,
    pub completed_deliveries: u64,
    #[schema(value_type = Vec<crate::entities::delivery_assignment::Model>)]
    pub assignments: Vec<delivery_assignment::Model>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SnapshotRequest {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SnapshotResponse {
    pub date: NaiveDate,
    #[schema(value_type = Vec<crate::entities::analytics_data::Model>)]
    pub metrics: Vec<analytics_data::Model>,
}

/// Groups timestamps by calendar day and fills the gaps with zero.
pub fn bucket_by_day(
    timestamps: &[DateTime<Utc>],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<DailyCount> {
    let mut counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    let mut day = from;
    while day <= to {
        counts.insert(day, 0);
        day += Duration::days(1);
    }
    for ts in timestamps {
        if let Some(count) = counts.get_mut(&ts.date_naive()) {
            *count += 1;
        }
    }
    counts
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

fn sum_by_day(
    entries: &[(DateTime<Utc>, Decimal)],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<DailyRevenue> {
    let mut sums: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    let mut day = from;
    while day <= to {
        sums.insert(day, Decimal::ZERO);
        day += Duration::days(1);
    }
    for (ts, amount) in entries {
        if let Some(sum) = sums.get_mut(&ts.date_naive()) {
            *sum += *amount;
        }
    }
    sums.into_iter()
        .map(|(date, revenue)| DailyRevenue { date, revenue })
        .collect()
}

/// Completed payments settle at `paid_at`; rows without one fall back to `created_at`.
fn settled_between(since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Condition {
    let mut paid = Condition::all().add(payment::Column::PaidAt.is_not_null());
    let mut unpaid = Condition::all().add(payment::Column::PaidAt.is_null());
    if let Some(since) = since {
        paid = paid.add(payment::Column::PaidAt.gte(since));
        unpaid = unpaid.add(payment::Column::CreatedAt.gte(since));
    }
    if let Some(until) = until {
        paid = paid.add(payment::Column::PaidAt.lt(until));
        unpaid = unpaid.add(payment::Column::CreatedAt.lt(until));
    }
    Condition::any().add(paid).add(unpaid)
}

#[derive(Debug, FromQueryResult)]
struct ProductOrderCount {
    product_id: Uuid,
    name: String,
    order_count: i64,
}

/// Read-only aggregates for the home page, the admin console and customers.
#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DatabaseConnection>,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    async fn count_orders(&self, scope: Condition) -> Result<OrderCounts, ServiceError> {
        let db = &*self.db_pool;
        let count = |status: Option<OrderStatus>| {
            let mut query = order::Entity::find().filter(scope.clone());
            if let Some(status) = status {
                query = query.filter(order::Column::Status.eq(status));
            }
            query.count(db)
        };

        Ok(OrderCounts {
            total: count(None).await.map_err(db_err("Failed to count orders"))?,
            pending: count(Some(OrderStatus::Pending))
                .await
                .map_err(db_err("Failed to count pending orders"))?,
            delivered: count(Some(OrderStatus::Delivered))
                .await
                .map_err(db_err("Failed to count delivered orders"))?,
            cancelled: count(Some(OrderStatus::Cancelled))
                .await
                .map_err(db_err("Failed to count cancelled orders"))?,
        })
    }

    /// Sum of completed payments settled in `[since, until)`, optionally for one customer.
    async fn completed_revenue(
        &self,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
        customer_id: Option<Uuid>,
    ) -> Result<Decimal, ServiceError> {
        let mut query = payment::Entity::find()
            .filter(payment::Column::Status.eq(PaymentStatus::Completed))
            .filter(settled_between(since, until));
        if let Some(customer_id) = customer_id {
            query = query
                .join(JoinType::InnerJoin, payment::Relation::Order.def())
                .filter(order::Column::CustomerId.eq(customer_id));
        }
        let total = query
            .select_only()
            .column_as(
                Expr::col((payment::Entity, payment::Column::Amount)).sum(),
                "total",
            )
            .into_tuple::<Option<Decimal>>()
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to sum completed payments"))?
            .flatten()
            .unwrap_or_default();

        Ok(total.round_dp(2))
    }

    async fn count_customers(&self, since: Option<DateTime<Utc>>) -> Result<u64, ServiceError> {
        let mut query = user::Entity::find().filter(user::Column::UserType.eq(UserType::Customer));
        if let Some(since) = since {
            query = query.filter(user::Column::DateJoined.gte(since));
        }
        query
            .count(&*self.db_pool)
            .await
            .map_err(db_err("Failed to count customers"))
    }

    async fn count_available_products(&self) -> Result<u64, ServiceError> {
        product::Entity::find()
            .filter(product::Column::IsAvailable.eq(true))
            .count(&*self.db_pool)
            .await
            .map_err(db_err("Failed to count products"))
    }

    #[instrument(skip(self))]
    pub async fn home_stats(&self) -> Result<HomeStats, ServiceError> {
        let delivered_orders = order::Entity::find()
            .filter(order::Column::Status.eq(OrderStatus::Delivered))
            .count(&*self.db_pool)
            .await
            .map_err(db_err("Failed to count delivered orders"))?;

        Ok(HomeStats {
            total_customers: self.count_customers(None).await?,
            delivered_orders,
            available_products: self.count_available_products().await?,
        })
    }

    /// Products ranked by how many orders contain them. Cart lines are merged per
    /// product, so each order contributes at most one item row per product.
    async fn top_products(&self, limit: u64) -> Result<Vec<TopProduct>, ServiceError> {
        let rows = order_item::Entity::find()
            .join(JoinType::InnerJoin, order_item::Relation::Product.def())
            .select_only()
            .column_as(product::Column::Id, "product_id")
            .column(product::Column::Name)
            .column_as(
                Expr::col((order_item::Entity, order_item::Column::Id)).count(),
                "order_count",
            )
            .group_by(product::Column::Id)
            .group_by(product::Column::Name)
            .order_by_desc(Expr::col(Alias::new("order_count")))
            .order_by_asc(product::Column::Id)
            .limit(limit)
            .into_model::<ProductOrderCount>()
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to rank products"))?;

        Ok(rows
            .into_iter()
            .map(|row| TopProduct {
                product_id: row.product_id,
                name: row.name,
                order_count: row.order_count.max(0) as u64,
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn admin_dashboard(&self) -> Result<AdminDashboard, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();

        let revenue = RevenueStats {
            total: self.completed_revenue(None, None, None).await?,
            last_7_days: self
                .completed_revenue(Some(now - Duration::days(7)), None, None)
                .await?,
            last_30_days: self
                .completed_revenue(
                    Some(now - Duration::days(ANALYTICS_WINDOW_DAYS)),
                    None,
                    None,
                )
                .await?,
        };

        let total_products = product::Entity::find()
            .count(db)
            .await
            .map_err(db_err("Failed to count products"))?;
        let total_deliveries = delivery_assignment::Entity::find()
            .count(db)
            .await
            .map_err(db_err("Failed to count deliveries"))?;
        let completed_deliveries = delivery_assignment::Entity::find()
            .filter(delivery_assignment::Column::ActualDeliveryTime.is_not_null())
            .count(db)
            .await
            .map_err(db_err("Failed to count completed deliveries"))?;

        let recent_orders = order::Entity::find()
            .order_by_desc(order::Column::CreatedAt)
            .limit(10)
            .all(db)
            .await
            .map_err(db_err("Failed to load recent orders"))?;
        let recent_payments = payment::Entity::find()
            .order_by_desc(payment::Column::CreatedAt)
            .limit(10)
            .all(db)
            .await
            .map_err(db_err("Failed to load recent payments"))?;

        Ok(AdminDashboard {
            orders: self.count_orders(Condition::all()).await?,
            revenue,
            total_customers: self.count_customers(None).await?,
            new_customers_7_days: self.count_customers(Some(now - Duration::days(7))).await?,
            total_products,
            available_products: self.count_available_products().await?,
            total_deliveries,
            completed_deliveries,
            recent_orders,
            recent_payments,
            top_products: self.top_products(5).await?,
        })
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn user_dashboard(&self, actor: &AuthUser) -> Result<UserDashboard, ServiceError> {
        let db = &*self.db_pool;
        let scope = Condition::all().add(order::Column::CustomerId.eq(actor.user_id));

        let total_spent = self
            .completed_revenue(None, None, Some(actor.user_id))
            .await?;

        let recent_orders = order::Entity::find()
            .filter(order::Column::CustomerId.eq(actor.user_id))
            .order_by_desc(order::Column::CreatedAt)
            .limit(5)
            .all(db)
            .await
            .map_err(db_err("Failed to load recent orders"))?;
        let recent_reviews = review::Entity::find()
            .filter(review::Column::CustomerId.eq(actor.user_id))
            .order_by_desc(review::Column::CreatedAt)
            .limit(3)
            .all(db)
            .await
            .map_err(db_err("Failed to load recent reviews"))?;

        Ok(UserDashboard {
            orders: self.count_orders(scope).await?,
            total_spent,
            recent_orders,
            recent_reviews,
        })
    }

    /// Daily orders and revenue plus per-category totals over the trailing window.
    #[instrument(skip(self))]
    pub async fn analytics(&self) -> Result<AnalyticsResponse, ServiceError> {
        let db = &*self.db_pool;
        let to = Utc::now().date_naive();
        let from = to - Duration::days(ANALYTICS_WINDOW_DAYS - 1);
        let since = day_start(from);

        let order_times: Vec<DateTime<Utc>> = order::Entity::find()
            .filter(order::Column::CreatedAt.gte(since))
            .select_only()
            .column(order::Column::CreatedAt)
            .into_tuple()
            .all(db)
            .await
            .map_err(db_err("Failed to load order timestamps"))?;
        let settlements: Vec<(Option<DateTime<Utc>>, DateTime<Utc>, Decimal)> =
            payment::Entity::find()
                .filter(payment::Column::Status.eq(PaymentStatus::Completed))
                .filter(settled_between(Some(since), None))
                .select_only()
                .column(payment::Column::PaidAt)
                .column(payment::Column::CreatedAt)
                .column(payment::Column::Amount)
                .into_tuple()
                .all(db)
                .await
                .map_err(db_err("Failed to load settled payments"))?;
        let payments: Vec<(DateTime<Utc>, Decimal)> = settlements
            .into_iter()
            .map(|(paid_at, created_at, amount)| (paid_at.unwrap_or(created_at), amount))
            .collect();

        let product_counts: Vec<(ProductCategory, i64)> = product::Entity::find()
            .select_only()
            .column(product::Column::Category)
            .column_as(
                Expr::col((product::Entity, product::Column::Id)).count(),
                "product_count",
            )
            .group_by(product::Column::Category)
            .into_tuple()
            .all(db)
            .await
            .map_err(db_err("Failed to count products per category"))?;
        let ordered: BTreeMap<String, i64> = order_item::Entity::find()
            .join(JoinType::InnerJoin, order_item::Relation::Product.def())
            .join(JoinType::InnerJoin, order_item::Relation::Order.def())
            .filter(order::Column::CreatedAt.gte(since))
            .select_only()
            .column(product::Column::Category)
            .column_as(
                Expr::col((order_item::Entity, order_item::Column::Quantity)).sum(),
                "items_ordered",
            )
            .group_by(product::Column::Category)
            .into_tuple::<(ProductCategory, Option<i64>)>()
            .all(db)
            .await
            .map_err(db_err("Failed to sum ordered quantities"))?
            .into_iter()
            .map(|(category, quantity)| (category.to_string(), quantity.unwrap_or(0)))
            .collect();

        let mut categories: Vec<CategoryStats> = product_counts
            .into_iter()
            .map(|(category, product_count)| CategoryStats {
                items_ordered: ordered
                    .get(&category.to_string())
                    .copied()
                    .unwrap_or(0)
                    .max(0) as u64,
                product_count: product_count.max(0) as u64,
                category,
            })
            .collect();
        categories.sort_by_key(|c| c.category.to_string());

        Ok(AnalyticsResponse {
            from,
            to,
            orders_per_day: bucket_by_day(&order_times, from, to),
            revenue_per_day: sum_by_day(&payments, from, to),
            categories,
        })
    }

    #[instrument(skip(self))]
    pub async fn order_report(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<OrderReport, ServiceError> {
        let (start, end) = report_range(start_date, end_date, Utc::now().date_naive())?;
        let (from, until) = day_range(start, end);

        let orders = order::Entity::find()
            .filter(order::Column::CreatedAt.gte(from))
            .filter(order::Column::CreatedAt.lt(until))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load orders for report"))?;

        let mut by_status = BTreeMap::new();
        for order in &orders {
            *by_status.entry(order.status.to_string()).or_insert(0u64) += 1;
        }

        Ok(OrderReport {
            start_date: start,
            end_date: end,
            total_orders: orders.len() as u64,
            total_amount: orders.iter().map(|o| o.total_amount).sum(),
            total_delivery_fees: orders.iter().map(|o| o.delivery_fee).sum(),
            by_status,
            orders,
        })
    }

    /// Completed payments created in the range, newest first.
    #[instrument(skip(self))]
    pub async fn revenue_report(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<RevenueReport, ServiceError> {
        let (start, end) = report_range(start_date, end_date, Utc::now().date_naive())?;
        let (from, until) = day_range(start, end);

        let payments = payment::Entity::find()
            .filter(payment::Column::Status.eq(PaymentStatus::Completed))
            .filter(payment::Column::CreatedAt.gte(from))
            .filter(payment::Column::CreatedAt.lt(until))
            .order_by_desc(payment::Column::CreatedAt)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load payments for report"))?;

        Ok(RevenueReport {
            start_date: start,
            end_date: end,
            total_revenue: payments.iter().map(|p| p.amount).sum(),
            payment_count: payments.len() as u64,
            payments,
        })
    }

    /// Delivery assignments made in the range, newest first.
    #[instrument(skip(self))]
    pub async fn delivery_report(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<DeliveryReport, ServiceError> {
        let (start, end) = report_range(start_date, end_date, Utc::now().date_naive())?;
        let (from, until) = day_range(start, end);

        let assignments = delivery_assignment::Entity::find()
            .filter(delivery_assignment::Column::AssignedAt.gte(from))
            .filter(delivery_assignment::Column::AssignedAt.lt(until))
            .order_by_desc(delivery_assignment::Column::AssignedAt)
            .all(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load assignments for report"))?;

        let completed = assignments
            .iter()
            .filter(|a| a.actual_delivery_time.is_some())
            .count();
        Ok(DeliveryReport {
            start_date: start,
            end_date: end,
            total_deliveries: assignments.len() as u64,
            completed_deliveries: completed as u64,
            assignments,
        })
    }

    async fn upsert_metric(
        &self,
        metric_type: MetricType,
        date: NaiveDate,
        value: Decimal,
    ) -> Result<analytics_data::Model, ServiceError> {
        let db = &*self.db_pool;
        let existing = analytics_data::Entity::find()
            .filter(analytics_data::Column::MetricType.eq(metric_type))
            .filter(analytics_data::Column::Date.eq(date))
            .one(db)
            .await
            .map_err(db_err("Failed to load analytics row"))?;

        let metadata = Some(json!({ "recorded_at": Utc::now() }));
        match existing {
            Some(row) => {
                let mut active: analytics_data::ActiveModel = row.into();
                active.value = Set(value);
                active.metadata = Set(metadata);
                active
                    .update(db)
                    .await
                    .map_err(db_err("Failed to update analytics row"))
            }
            None => analytics_data::ActiveModel {
                id: Set(Uuid::new_v4()),
                metric_type: Set(metric_type),
                date: Set(date),
                value: Set(value),
                metadata: Set(metadata),
                created_at: Set(Utc::now()),
            }
            .insert(db)
            .await
            .map_err(db_err("Failed to insert analytics row")),
        }
    }

    /// Computes the day's metrics and stores one row per metric type.
    #[instrument(skip(self, request))]
    pub async fn record_analytics_snapshot(
        &self,
        request: SnapshotRequest,
    ) -> Result<SnapshotResponse, ServiceError> {
        let db = &*self.db_pool;
        let date = request.date.unwrap_or_else(|| Utc::now().date_naive());
        let (from, until) = day_range(date, date);

        let orders = order::Entity::find()
            .filter(order::Column::CreatedAt.gte(from))
            .filter(order::Column::CreatedAt.lt(until))
            .count(db)
            .await
            .map_err(db_err("Failed to count orders"))?;
        let revenue = self
            .completed_revenue(Some(from), Some(until), None)
            .await?;
        let customers = user::Entity::find()
            .filter(user::Column::UserType.eq(UserType::Customer))
            .filter(user::Column::DateJoined.gte(from))
            .filter(user::Column::DateJoined.lt(until))
            .count(db)
            .await
            .map_err(db_err("Failed to count customers"))?;
        let deliveries = delivery_assignment::Entity::find()
            .filter(delivery_assignment::Column::ActualDeliveryTime.gte(from))
            .filter(delivery_assignment::Column::ActualDeliveryTime.lt(until))
            .count(db)
            .await
            .map_err(db_err("Failed to count deliveries"))?;
        let products = self.count_available_products().await?;
        let reviews = review::Entity::find()
            .filter(review::Column::CreatedAt.gte(from))
            .filter(review::Column::CreatedAt.lt(until))
            .count(db)
            .await
            .map_err(db_err("Failed to count reviews"))?;

        let values = [
            (MetricType::Orders, Decimal::from(orders)),
            (MetricType::Revenue, revenue),
            (MetricType::Customers, Decimal::from(customers)),
            (MetricType::Deliveries, Decimal::from(deliveries)),
            (MetricType::Products, Decimal::from(products)),
            (MetricType::Reviews, Decimal::from(reviews)),
        ];
        let mut metrics = Vec::with_capacity(values.len());
        for (metric_type, value) in values {
            metrics.push(self.upsert_metric(metric_type, date, value).await?);
        }

        info!(date = %date, "analytics snapshot recorded");
        Ok(SnapshotResponse { date, metrics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn report_range_defaults_to_trailing_window() {
        let today = date(2024, 3, 31);
        let (start, end) = report_range(None, None, today).unwrap();
        assert_eq!(end, today);
        assert_eq!(start, date(2024, 3, 1));
    }

    #[test]
    fn inverted_report_range_is_rejected() {
        let result = report_range(Some(date(2024, 5, 2)), Some(date(2024, 5, 1)), date(2024, 6, 1));
        assert_matches!(result, Err(ServiceError::BadRequest(_)));
    }

    #[test]
    fn day_range_is_half_open_over_whole_days() {
        let (from, until) = day_range(date(2024, 1, 1), date(2024, 1, 1));
        assert_eq!(until - from, Duration::days(1));
        assert_eq!(from.date_naive(), date(2024, 1, 1));
    }

    #[test]
    fn buckets_fill_missing_days() {
        let from = date(2024, 1, 1);
        let to = date(2024, 1, 3);
        let stamps = vec![
            day_start(date(2024, 1, 1)) + Duration::hours(3),
            day_start(date(2024, 1, 3)) + Duration::hours(20),
            day_start(date(2024, 1, 3)) + Duration::hours(21),
            day_start(date(2024, 1, 9)),
        ];
        let buckets = bucket_by_day(&stamps, from, to);
        let counts: Vec<u64> = buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 0, 2]);
    }

    #[test]
    fn revenue_sums_per_day() {
        let from = date(2024, 1, 1);
        let entries = vec![
            (day_start(from), dec!(100.50)),
            (day_start(from) + Duration::hours(5), dec!(49.50)),
        ];
        let sums = sum_by_day(&entries, from, from);
        assert_eq!(sums.len(), 1);
        assert_eq!(sums[0].revenue, dec!(150.00));
    }
}

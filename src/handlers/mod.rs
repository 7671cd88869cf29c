pub mod catalog;
pub mod dashboard;
pub mod delivery;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod reviews;
pub mod users;

use crate::events::EventSender;
use crate::services::{
    catalog::CatalogService, dashboard::DashboardService, delivery::DeliveryService,
    notifications::NotificationService, orders::OrderService, payments::PaymentService,
    reviews::ReviewService, users::UserService, PageRequest,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<UserService>,
    pub catalog: Arc<CatalogService>,
    pub orders: Arc<OrderService>,
    pub payments: Arc<PaymentService>,
    pub delivery: Arc<DeliveryService>,
    pub reviews: Arc<ReviewService>,
    pub dashboard: Arc<DashboardService>,
    pub notifications: Arc<NotificationService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            users: Arc::new(UserService::new(db_pool.clone())),
            catalog: Arc::new(CatalogService::new(db_pool.clone())),
            orders: Arc::new(OrderService::new(db_pool.clone(), event_sender.clone())),
            payments: Arc::new(PaymentService::new(db_pool.clone(), event_sender.clone())),
            delivery: Arc::new(DeliveryService::new(db_pool.clone(), event_sender.clone())),
            reviews: Arc::new(ReviewService::new(db_pool.clone(), event_sender)),
            dashboard: Arc::new(DashboardService::new(db_pool.clone())),
            notifications: Arc::new(NotificationService::new(db_pool)),
        }
    }
}

impl AppState {
    /// Page request from list query parameters, clamped to the configured maximum.
    pub fn page(&self, page: u64, limit: Option<u64>) -> PageRequest {
        let limit = limit.unwrap_or(self.config.default_page_size);
        PageRequest::new(page, self.config.clamp_page_size(limit))
    }
}

use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{db_err, PageRequest};
use crate::auth::AuthUser;
use crate::entities::{
    notification,
    system_log::{self, LogLevel},
};
use crate::errors::ServiceError;
use crate::PaginatedResponse;

/// Notification listings always use this page size.
pub const NOTIFICATION_PAGE_SIZE: u64 = 20;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountResponse {
    pub unread: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}

/// In-app notifications and the audit log.
#[derive(Clone)]
pub struct NotificationService {
    db_pool: Arc<DatabaseConnection>,
}

impl NotificationService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn list_notifications(
        &self,
        actor: &AuthUser,
        page: u64,
        unread_only: bool,
    ) -> Result<PaginatedResponse<notification::Model>, ServiceError> {
        let page = PageRequest::new(page, NOTIFICATION_PAGE_SIZE);
        let mut query = notification::Entity::find()
            .filter(notification::Column::RecipientId.eq(actor.user_id))
            .order_by_desc(notification::Column::CreatedAt);
        if unread_only {
            query = query.filter(notification::Column::IsRead.eq(false));
        }

        let paginator = query.paginate(&*self.db_pool, page.limit);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("Failed to count notifications"))?;
        let notifications = paginator
            .fetch_page(page.index())
            .await
            .map_err(db_err("Failed to fetch notifications page"))?;
        Ok(PaginatedResponse::new(notifications, total, page))
    }

    pub async fn unread_count(&self, actor: &AuthUser) -> Result<UnreadCountResponse, ServiceError> {
        let unread = notification::Entity::find()
            .filter(notification::Column::RecipientId.eq(actor.user_id))
            .filter(notification::Column::IsRead.eq(false))
            .count(&*self.db_pool)
            .await
            .map_err(db_err("Failed to count unread notifications"))?;
        Ok(UnreadCountResponse { unread })
    }

    /// Another user's notification is reported as missing.
    #[instrument(skip(self, actor))]
    pub async fn mark_notification_read(
        &self,
        actor: &AuthUser,
        notification_id: Uuid,
    ) -> Result<notification::Model, ServiceError> {
        let notification = notification::Entity::find_by_id(notification_id)
            .filter(notification::Column::RecipientId.eq(actor.user_id))
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load notification"))?
            .ok_or_else(|| ServiceError::not_found("Notification", notification_id))?;

        if notification.is_read {
            return Ok(notification);
        }

        let mut active: notification::ActiveModel = notification.into();
        active.is_read = Set(true);
        active.read_at = Set(Some(Utc::now()));
        active
            .update(&*self.db_pool)
            .await
            .map_err(db_err("Failed to mark notification read"))
    }

    pub async fn mark_all_read(&self, actor: &AuthUser) -> Result<MarkAllReadResponse, ServiceError> {
        let result = notification::Entity::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .col_expr(notification::Column::ReadAt, Expr::value(Some(Utc::now())))
            .filter(notification::Column::RecipientId.eq(actor.user_id))
            .filter(notification::Column::IsRead.eq(false))
            .exec(&*self.db_pool)
            .await
            .map_err(db_err("Failed to mark notifications read"))?;

        debug!(user_id = %actor.user_id, updated = result.rows_affected, "notifications marked read");
        Ok(MarkAllReadResponse {
            updated: result.rows_affected,
        })
    }

    pub async fn list_system_logs(
        &self,
        page: PageRequest,
        level: Option<LogLevel>,
    ) -> Result<PaginatedResponse<system_log::Model>, ServiceError> {
        let mut query = system_log::Entity::find().order_by_desc(system_log::Column::CreatedAt);
        if let Some(level) = level {
            query = query.filter(system_log::Column::Level.eq(level));
        }

        let paginator = query.paginate(&*self.db_pool, page.limit);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("Failed to count system logs"))?;
        let logs = paginator
            .fetch_page(page.index())
            .await
            .map_err(db_err("Failed to fetch system logs page"))?;
        Ok(PaginatedResponse::new(logs, total, page))
    }
}

//! Business services. Each holds the shared connection and an optional
//! event sender; handlers stay thin and delegate here.

pub mod catalog;
pub mod dashboard;
pub mod delivery;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod reviews;
pub mod users;

use sea_orm::{DbErr, SqlErr};
use std::sync::Arc;
use tracing::error;

use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Emits an event if a sender is configured. Send failures are logged only.
pub(crate) async fn emit(sender: &Option<Arc<EventSender>>, event: Event) {
    if let Some(sender) = sender {
        sender.send_or_log(event).await;
    }
}

/// Logs a database failure with context and wraps it.
pub(crate) fn db_err(context: &'static str) -> impl Fn(DbErr) -> ServiceError {
    move |e| {
        error!(error = %e, "{}", context);
        ServiceError::DatabaseError(e)
    }
}

/// Maps unique-constraint violations to 409, everything else through [`db_err`].
pub(crate) fn conflict_or_db(
    context: &'static str,
    conflict: &'static str,
) -> impl Fn(DbErr) -> ServiceError {
    move |e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::Conflict(conflict.to_string()),
        _ => db_err(context)(e),
    }
}

/// One-based page and page size after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Zero-based index for `Paginator::fetch_page`.
    pub fn index(&self) -> u64 {
        self.page - 1
    }
}

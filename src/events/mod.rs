use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::entities::{
    notification::{self, NotificationPriority, NotificationType},
    system_log::{self, LogAction, LogLevel},
    user::{self, UserType},
};
use crate::errors::ServiceError;
use crate::metrics::BUSINESS_METRICS;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), ServiceError> {
        self.sender
            .send(event)
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))
    }

    /// Sends an event, logging instead of failing when the channel is closed.
    pub async fn send_or_log(&self, event: Event) {
        let name = event.name();
        if let Err(e) = self.send(event).await {
            warn!(event = name, error = %e, "domain event dropped");
        }
    }
}

/// Domain events raised by the services after a successful commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderCreated {
        order_id: Uuid,
        order_number: String,
        customer_id: Uuid,
    },
    OrderStatusChanged {
        order_id: Uuid,
        order_number: String,
        customer_id: Uuid,
        old_status: String,
        new_status: String,
    },
    OrderCancelled {
        order_id: Uuid,
        order_number: String,
        customer_id: Uuid,
        reason: String,
    },
    PaymentCreated {
        payment_id: Uuid,
        order_id: Uuid,
        customer_id: Uuid,
    },
    PaymentStatusChanged {
        payment_id: Uuid,
        customer_id: Uuid,
        new_status: String,
    },
    RefundRequested {
        refund_id: Uuid,
        customer_id: Uuid,
    },
    RefundProcessed {
        refund_id: Uuid,
        customer_id: Uuid,
        approved: bool,
    },
    DeliveryAssigned {
        assignment_id: Uuid,
        order_id: Uuid,
        agent_id: Uuid,
        customer_id: Uuid,
    },
    DeliveryStatusChanged {
        assignment_id: Uuid,
        customer_id: Uuid,
        status: String,
    },
    ReviewCreated {
        review_id: Uuid,
        product_id: Uuid,
        customer_id: Uuid,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::OrderCreated { .. } => "order_created",
            Event::OrderStatusChanged { .. } => "order_status_changed",
            Event::OrderCancelled { .. } => "order_cancelled",
            Event::PaymentCreated { .. } => "payment_created",
            Event::PaymentStatusChanged { .. } => "payment_status_changed",
            Event::RefundRequested { .. } => "refund_requested",
            Event::RefundProcessed { .. } => "refund_processed",
            Event::DeliveryAssigned { .. } => "delivery_assigned",
            Event::DeliveryStatusChanged { .. } => "delivery_status_changed",
            Event::ReviewCreated { .. } => "review_created",
        }
    }

    fn record_metric(&self) {
        match self {
            Event::OrderCreated { .. } => BUSINESS_METRICS.orders_created.inc(),
            Event::OrderStatusChanged { new_status, .. } => {
                BUSINESS_METRICS.order_status_changes.inc();
                if new_status == "delivered" {
                    BUSINESS_METRICS.deliveries_completed.inc();
                }
            }
            Event::OrderCancelled { .. } => BUSINESS_METRICS.orders_cancelled.inc(),
            Event::PaymentCreated { .. } => BUSINESS_METRICS.payments_created.inc(),
            Event::PaymentStatusChanged { .. } => BUSINESS_METRICS.payment_status_changes.inc(),
            Event::RefundRequested { .. } => BUSINESS_METRICS.refunds_requested.inc(),
            Event::RefundProcessed { .. } => BUSINESS_METRICS.refunds_processed.inc(),
            Event::DeliveryAssigned { .. } => BUSINESS_METRICS.deliveries_assigned.inc(),
            Event::DeliveryStatusChanged { status, .. } => {
                if status == "delivered" {
                    BUSINESS_METRICS.deliveries_completed.inc();
                }
            }
            Event::ReviewCreated { .. } => BUSINESS_METRICS.reviews_created.inc(),
        }
    }
}

/// A notification about to be written for one recipient.
#[derive(Debug, Clone)]
struct Notice {
    recipient_id: Uuid,
    title: String,
    message: String,
    notification_type: NotificationType,
    priority: NotificationPriority,
    action_url: Option<String>,
    metadata: serde_json::Value,
}

impl Notice {
    fn new(
        recipient_id: Uuid,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient_id,
            title: title.into(),
            message: message.into(),
            notification_type,
            priority: NotificationPriority::Medium,
            action_url: None,
            metadata: json!({}),
        }
    }

    fn priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }

    fn link(mut self, url: String) -> Self {
        self.action_url = Some(url);
        self
    }

    fn meta(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// An audit row for admin-relevant actions.
#[derive(Debug, Clone)]
struct Audit {
    action: LogAction,
    user_id: Option<Uuid>,
    model_name: &'static str,
    object_id: Uuid,
    message: String,
}

/// Turns domain events into notifications and audit rows.
#[derive(Clone)]
pub struct EventProcessor {
    db: Arc<DatabaseConnection>,
}

impl EventProcessor {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn admin_ids(&self) -> Result<Vec<Uuid>, ServiceError> {
        let ids = user::Entity::find()
            .select_only()
            .column(user::Column::Id)
            .filter(user::Column::UserType.eq(UserType::Admin))
            .filter(user::Column::IsActive.eq(true))
            .into_tuple::<Uuid>()
            .all(self.db.as_ref())
            .await?;
        Ok(ids)
    }

    async fn plan(&self, event: &Event) -> Result<(Vec<Notice>, Option<Audit>), ServiceError> {
        use NotificationType as T;

        let plan = match event {
            Event::OrderCreated {
                order_id,
                order_number,
                customer_id,
            } => {
                let mut notices = vec![Notice::new(
                    *customer_id,
                    T::Order,
                    "Order placed",
                    format!("Your order {} has been placed successfully.", order_number),
                )
                .link(format!("/orders/{}", order_id))];
                for admin in self.admin_ids().await? {
                    notices.push(
                        Notice::new(
                            admin,
                            T::Order,
                            "New order",
                            format!("Order {} is waiting for confirmation.", order_number),
                        )
                        .link(format!("/orders/{}", order_id)),
                    );
                }
                let audit = Audit {
                    action: LogAction::Create,
                    user_id: Some(*customer_id),
                    model_name: "order",
                    object_id: *order_id,
                    message: format!("Order {} created", order_number),
                };
                (notices, Some(audit))
            }
            Event::OrderStatusChanged {
                order_id,
                order_number,
                customer_id,
                old_status,
                new_status,
            } => {
                let notice = Notice::new(
                    *customer_id,
                    T::Order,
                    "Order status updated",
                    format!("Order {} is now {}.", order_number, new_status),
                )
                .link(format!("/orders/{}", order_id))
                .meta(json!({ "old_status": old_status, "new_status": new_status }));
                let audit = Audit {
                    action: LogAction::Update,
                    user_id: None,
                    model_name: "order",
                    object_id: *order_id,
                    message: format!(
                        "Order {} moved from {} to {}",
                        order_number, old_status, new_status
                    ),
                };
                (vec![notice], Some(audit))
            }
            Event::OrderCancelled {
                order_id,
                order_number,
                customer_id,
                reason,
            } => {
                let mut notices = vec![Notice::new(
                    *customer_id,
                    T::Order,
                    "Order cancelled",
                    format!("Order {} has been cancelled.", order_number),
                )
                .priority(NotificationPriority::High)
                .link(format!("/orders/{}", order_id))];
                for admin in self.admin_ids().await? {
                    notices.push(
                        Notice::new(
                            admin,
                            T::Order,
                            "Order cancelled",
                            format!("Order {} was cancelled. Reason: {}", order_number, reason),
                        )
                        .link(format!("/orders/{}", order_id)),
                    );
                }
                let audit = Audit {
                    action: LogAction::Update,
                    user_id: Some(*customer_id),
                    model_name: "order",
                    object_id: *order_id,
                    message: format!("Order {} cancelled ({})", order_number, reason),
                };
                (notices, Some(audit))
            }
            Event::PaymentCreated {
                payment_id,
                order_id,
                customer_id,
            } => (
                vec![Notice::new(
                    *customer_id,
                    T::Payment,
                    "Payment initiated",
                    "Your payment has been recorded and is awaiting confirmation.",
                )
                .link(format!("/payments/{}", payment_id))
                .meta(json!({ "order_id": order_id }))],
                None,
            ),
            Event::PaymentStatusChanged {
                payment_id,
                customer_id,
                new_status,
            } => {
                let priority = if new_status == "failed" {
                    NotificationPriority::High
                } else {
                    NotificationPriority::Medium
                };
                let notice = Notice::new(
                    *customer_id,
                    T::Payment,
                    "Payment status updated",
                    format!("Your payment is now {}.", new_status),
                )
                .priority(priority)
                .link(format!("/payments/{}", payment_id));
                let audit = Audit {
                    action: LogAction::Update,
                    user_id: None,
                    model_name: "payment",
                    object_id: *payment_id,
                    message: format!("Payment {} set to {}", payment_id, new_status),
                };
                (vec![notice], Some(audit))
            }
            Event::RefundRequested {
                refund_id,
                customer_id,
            } => {
                let mut notices = vec![Notice::new(
                    *customer_id,
                    T::Payment,
                    "Refund requested",
                    "Your refund request has been received.",
                )];
                for admin in self.admin_ids().await? {
                    notices.push(
                        Notice::new(
                            admin,
                            T::Payment,
                            "Refund awaiting review",
                            "A customer has requested a refund.",
                        )
                        .priority(NotificationPriority::High)
                        .meta(json!({ "refund_id": refund_id })),
                    );
                }
                let audit = Audit {
                    action: LogAction::Create,
                    user_id: Some(*customer_id),
                    model_name: "refund",
                    object_id: *refund_id,
                    message: "Refund requested".to_string(),
                };
                (notices, Some(audit))
            }
            Event::RefundProcessed {
                refund_id,
                customer_id,
                approved,
            } => {
                let (title, message) = if *approved {
                    ("Refund approved", "Your refund has been approved and completed.")
                } else {
                    ("Refund declined", "Your refund request was declined.")
                };
                let audit = Audit {
                    action: LogAction::Update,
                    user_id: None,
                    model_name: "refund",
                    object_id: *refund_id,
                    message: format!("Refund {}", if *approved { "approved" } else { "rejected" }),
                };
                (
                    vec![Notice::new(*customer_id, T::Payment, title, message)
                        .priority(NotificationPriority::High)],
                    Some(audit),
                )
            }
            Event::DeliveryAssigned {
                assignment_id,
                order_id,
                agent_id,
                customer_id,
            } => {
                let notices = vec![
                    Notice::new(
                        *agent_id,
                        T::Delivery,
                        "New delivery assigned",
                        "A new delivery has been assigned to you.",
                    )
                    .priority(NotificationPriority::High)
                    .link(format!("/delivery/assignments/{}", assignment_id)),
                    Notice::new(
                        *customer_id,
                        T::Delivery,
                        "Delivery agent assigned",
                        "A delivery agent has been assigned to your order.",
                    )
                    .link(format!("/orders/{}", order_id)),
                ];
                let audit = Audit {
                    action: LogAction::Create,
                    user_id: None,
                    model_name: "delivery_assignment",
                    object_id: *assignment_id,
                    message: format!("Order {} assigned to agent {}", order_id, agent_id),
                };
                (notices, Some(audit))
            }
            Event::DeliveryStatusChanged {
                assignment_id,
                customer_id,
                status,
            } => (
                vec![Notice::new(
                    *customer_id,
                    T::Delivery,
                    "Delivery update",
                    format!("Your delivery is now {}.", status.replace('_', " ")),
                )
                .meta(json!({ "assignment_id": assignment_id, "status": status }))],
                None,
            ),
            Event::ReviewCreated {
                review_id,
                product_id,
                customer_id,
            } => {
                let audit = Audit {
                    action: LogAction::Create,
                    user_id: Some(*customer_id),
                    model_name: "review",
                    object_id: *review_id,
                    message: format!("Review posted for product {}", product_id),
                };
                (Vec::new(), Some(audit))
            }
        };

        Ok(plan)
    }

    /// Persists the notifications and audit row for one event.
    pub async fn handle(&self, event: &Event) -> Result<(), ServiceError> {
        let (notices, audit) = self.plan(event).await?;
        let now = Utc::now();

        for notice in notices {
            notification::ActiveModel {
                id: Set(Uuid::new_v4()),
                recipient_id: Set(notice.recipient_id),
                title: Set(notice.title),
                message: Set(notice.message),
                notification_type: Set(notice.notification_type),
                priority: Set(notice.priority),
                is_read: Set(false),
                read_at: Set(None),
                action_url: Set(notice.action_url),
                metadata: Set(Some(notice.metadata)),
                created_at: Set(now),
            }
            .insert(self.db.as_ref())
            .await?;
            BUSINESS_METRICS.notifications_sent.inc();
        }

        if let Some(audit) = audit {
            system_log::ActiveModel {
                id: Set(Uuid::new_v4()),
                level: Set(LogLevel::Info),
                action: Set(audit.action),
                user_id: Set(audit.user_id),
                model_name: Set(Some(audit.model_name.to_string())),
                object_id: Set(Some(audit.object_id.to_string())),
                message: Set(audit.message),
                ip_address: Set(None),
                user_agent: Set(None),
                metadata: Set(Some(json!({ "event": event.name() }))),
                created_at: Set(now),
            }
            .insert(self.db.as_ref())
            .await?;
        }

        Ok(())
    }
}

/// Consumes events until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, db: Arc<DatabaseConnection>) {
    info!("Starting event processing loop");
    let processor = EventProcessor::new(db);

    while let Some(event) = rx.recv().await {
        debug!(event = event.name(), "Received event");
        event.record_metric();

        // Failures are logged and counted by with_metrics; the loop keeps going.
        let _ = crate::tracing::with_metrics("event_processing", || processor.handle(&event)).await;
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_after_receiver_dropped_is_an_event_error() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        let result = sender
            .send(Event::RefundRequested {
                refund_id: Uuid::new_v4(),
                customer_id: Uuid::new_v4(),
            })
            .await;
        assert!(matches!(result, Err(ServiceError::EventError(_))));
    }

    #[test]
    fn event_names_are_snake_case() {
        let event = Event::DeliveryStatusChanged {
            assignment_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            status: "picked_up".into(),
        };
        assert_eq!(event.name(), "delivery_status_changed");
    }
}

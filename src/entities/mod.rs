//! sea-orm entities, one module per table.

pub mod analytics_data;
pub mod customer_profile;
pub mod delivery_agent_location;
pub mod delivery_agent_profile;
pub mod delivery_area;
pub mod delivery_assignment;
pub mod delivery_rating;
pub mod delivery_status;
pub mod notification;
pub mod order;
pub mod order_item;
pub mod order_status_history;
pub mod payment;
pub mod payment_method;
pub mod payment_transaction;
pub mod product;
pub mod refund;
pub mod review;
pub mod review_helpful;
pub mod review_image;
pub mod review_report;
pub mod review_response;
pub mod system_log;
pub mod user;

/*!
 * # Permissions Module
 *
 * Permission strings are `resource:action`. A trailing `:*` grants every
 * action on the resource.
 */

/// Permission actions
pub struct Actions;

impl Actions {
    pub const READ: &'static str = "read";
    pub const CREATE: &'static str = "create";
    pub const UPDATE: &'static str = "update";
    pub const DELETE: &'static str = "delete";
    pub const MANAGE: &'static str = "manage";
    pub const ALL: &'static str = "*";
}

/// Resource types
pub struct Resources;

impl Resources {
    pub const USERS: &'static str = "users";
    pub const PROFILE: &'static str = "profile";
    pub const AGENTS: &'static str = "agents";
    pub const PRODUCTS: &'static str = "products";
    pub const ORDERS: &'static str = "orders";
    pub const PAYMENTS: &'static str = "payments";
    pub const PAYMENT_METHODS: &'static str = "payment_methods";
    pub const REFUNDS: &'static str = "refunds";
    pub const DELIVERIES: &'static str = "deliveries";
    pub const DELIVERY_AREAS: &'static str = "delivery_areas";
    pub const LOCATIONS: &'static str = "locations";
    pub const REVIEWS: &'static str = "reviews";
    pub const DASHBOARD: &'static str = "dashboard";
    pub const ANALYTICS: &'static str = "analytics";
    pub const NOTIFICATIONS: &'static str = "notifications";
    pub const SYSTEM_LOGS: &'static str = "system_logs";
    pub const ADMIN: &'static str = "admin";
}

/// Permission string constants used by the route table.
pub mod consts {
    // Users
    pub const USERS_READ: &str = "users:read";
    pub const PROFILE_READ: &str = "profile:read";
    pub const PROFILE_UPDATE: &str = "profile:update";
    pub const AGENTS_READ: &str = "agents:read";
    pub const AGENTS_AVAILABILITY: &str = "agents:availability";

    // Catalog
    pub const PRODUCTS_MANAGE: &str = "products:manage";

    // Orders
    pub const ORDERS_READ: &str = "orders:read";
    pub const ORDERS_CREATE: &str = "orders:create";
    pub const ORDERS_CANCEL: &str = "orders:cancel";
    pub const ORDERS_UPDATE: &str = "orders:update";

    // Payments
    pub const PAYMENTS_READ: &str = "payments:read";
    pub const PAYMENTS_CREATE: &str = "payments:create";
    pub const PAYMENTS_UPDATE: &str = "payments:update";
    pub const PAYMENT_METHODS_MANAGE: &str = "payment_methods:manage";
    pub const REFUNDS_READ: &str = "refunds:read";
    pub const REFUNDS_REQUEST: &str = "refunds:request";
    pub const REFUNDS_PROCESS: &str = "refunds:process";

    // Delivery
    pub const DELIVERIES_READ: &str = "deliveries:read";
    pub const DELIVERIES_ASSIGN: &str = "deliveries:assign";
    pub const DELIVERIES_UPDATE: &str = "deliveries:update";
    pub const DELIVERIES_RATE: &str = "deliveries:rate";
    pub const DELIVERY_AREAS_MANAGE: &str = "delivery_areas:manage";
    pub const LOCATIONS_UPDATE: &str = "locations:update";
    pub const RATINGS_READ: &str = "deliveries:ratings";

    // Reviews
    pub const REVIEWS_CREATE: &str = "reviews:create";
    pub const REVIEWS_VOTE: &str = "reviews:vote";
    pub const REVIEWS_REPORT: &str = "reviews:report";
    pub const REVIEWS_RESPOND: &str = "reviews:respond";
    pub const REVIEWS_MODERATE: &str = "reviews:moderate";

    // Dashboard
    pub const DASHBOARD_READ: &str = "dashboard:read";
    pub const DASHBOARD_ADMIN: &str = "dashboard:admin";
    pub const ANALYTICS_READ: &str = "analytics:read";
    pub const ANALYTICS_WRITE: &str = "analytics:write";
    pub const NOTIFICATIONS_READ: &str = "notifications:read";
    pub const NOTIFICATIONS_UPDATE: &str = "notifications:update";
    pub const SYSTEM_LOGS_READ: &str = "system_logs:read";
}

/// Format a permission string
pub fn format_permission(resource: &str, action: &str) -> String {
    format!("{}:{}", resource, action)
}

/// Whether a granted permission satisfies a required one.
///
/// `*` matches everything and `resource:*` matches every action on `resource`.
pub fn permission_matches(granted: &str, required: &str) -> bool {
    if granted == required || granted == Actions::ALL {
        return true;
    }

    match granted.strip_suffix(":*") {
        Some(resource) => required
            .split_once(':')
            .map_or(false, |(required_resource, _)| required_resource == resource),
        None => false,
    }
}

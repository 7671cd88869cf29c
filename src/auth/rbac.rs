/*!
 * # Role-Based Access Control (RBAC) Module
 *
 * Roles follow the account's `user_type`. Each role carries a static
 * permission list.
 */

use super::permissions::{consts, permission_matches};
use crate::entities::user::UserType;
use lazy_static::lazy_static;
use std::collections::HashMap;
use tracing::warn;

/// Role definition with associated permissions
#[derive(Debug, Clone)]
pub struct Role {
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
}

fn role(name: &str, description: &str, permissions: &[&str]) -> (String, Role) {
    (
        name.to_string(),
        Role {
            name: name.to_string(),
            description: description.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        },
    )
}

lazy_static! {
    pub static ref ROLES: HashMap<String, Role> = {
        let mut roles = HashMap::new();

        let (name, admin) = role(
            "admin",
            "Administrator with full access",
            &[
                "admin:*",
                "users:*",
                "profile:*",
                "agents:*",
                "products:*",
                "orders:*",
                "payments:*",
                "payment_methods:*",
                "refunds:*",
                "deliveries:*",
                "delivery_areas:*",
                "reviews:*",
                "dashboard:*",
                "analytics:*",
                "notifications:*",
                "system_logs:*",
            ],
        );
        roles.insert(name, admin);

        let (name, customer) = role(
            "customer",
            "Shopper who places and pays for orders",
            &[
                consts::PROFILE_READ,
                consts::PROFILE_UPDATE,
                consts::ORDERS_READ,
                consts::ORDERS_CREATE,
                consts::ORDERS_CANCEL,
                consts::PAYMENTS_READ,
                consts::PAYMENTS_CREATE,
                consts::REFUNDS_READ,
                consts::REFUNDS_REQUEST,
                consts::DELIVERIES_READ,
                consts::DELIVERIES_RATE,
                consts::REVIEWS_CREATE,
                consts::REVIEWS_VOTE,
                consts::REVIEWS_REPORT,
                consts::DASHBOARD_READ,
                consts::NOTIFICATIONS_READ,
                consts::NOTIFICATIONS_UPDATE,
            ],
        );
        roles.insert(name, customer);

        let (name, agent) = role(
            "delivery_agent",
            "Rider who picks up and delivers orders",
            &[
                consts::PROFILE_READ,
                consts::PROFILE_UPDATE,
                consts::AGENTS_AVAILABILITY,
                consts::ORDERS_READ,
                consts::PAYMENTS_READ,
                consts::REFUNDS_READ,
                consts::DELIVERIES_READ,
                consts::DELIVERIES_UPDATE,
                consts::LOCATIONS_UPDATE,
                consts::RATINGS_READ,
                consts::REVIEWS_VOTE,
                consts::REVIEWS_REPORT,
                consts::DASHBOARD_READ,
                consts::NOTIFICATIONS_READ,
                consts::NOTIFICATIONS_UPDATE,
            ],
        );
        roles.insert(name, agent);

        roles
    };
}

/// Resolves roles and permissions for accounts.
#[derive(Debug, Clone, Default)]
pub struct RbacService;

impl RbacService {
    pub fn new() -> Self {
        Self
    }

    /// Get a role by name
    pub fn get_role(&self, role_name: &str) -> Option<&Role> {
        ROLES.get(role_name)
    }

    /// Role name for an account type.
    pub fn role_for(&self, user_type: UserType) -> String {
        user_type.to_string()
    }

    /// Get all permissions for a role
    pub fn get_role_permissions(&self, role_name: &str) -> Vec<String> {
        match ROLES.get(role_name) {
            Some(role) => role.permissions.clone(),
            None => {
                warn!("Role not found: {}", role_name);
                vec![]
            }
        }
    }

    pub fn check_permission(&self, user_permission: &str, required_permission: &str) -> bool {
        permission_matches(user_permission, required_permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grants(user_type: UserType, required: &str) -> bool {
        let rbac = RbacService::new();
        rbac.get_role_permissions(&rbac.role_for(user_type))
            .iter()
            .any(|p| rbac.check_permission(p, required))
    }

    #[test]
    fn every_user_type_has_a_role() {
        let rbac = RbacService::new();
        for user_type in [UserType::Customer, UserType::DeliveryAgent, UserType::Admin] {
            assert!(rbac.get_role(&rbac.role_for(user_type)).is_some());
        }
    }

    #[test]
    fn customers_order_but_do_not_deliver() {
        assert!(grants(UserType::Customer, consts::ORDERS_CREATE));
        assert!(grants(UserType::Customer, consts::REFUNDS_REQUEST));
        assert!(!grants(UserType::Customer, consts::DELIVERIES_UPDATE));
        assert!(!grants(UserType::Customer, consts::ORDERS_UPDATE));
    }

    #[test]
    fn agents_deliver_but_do_not_order() {
        assert!(grants(UserType::DeliveryAgent, consts::DELIVERIES_UPDATE));
        assert!(grants(UserType::DeliveryAgent, consts::LOCATIONS_UPDATE));
        assert!(!grants(UserType::DeliveryAgent, consts::ORDERS_CREATE));
        assert!(!grants(UserType::DeliveryAgent, consts::DELIVERIES_ASSIGN));
    }

    #[test]
    fn admin_wildcards_cover_management() {
        assert!(grants(UserType::Admin, consts::SYSTEM_LOGS_READ));
        assert!(grants(UserType::Admin, consts::DELIVERIES_ASSIGN));
        assert!(grants(UserType::Admin, consts::REVIEWS_MODERATE));
    }
}

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{db_err, PageRequest};
use crate::auth::{hash_password, AuthUser, MIN_PASSWORD_LENGTH};
use crate::entities::{
    customer_profile::{self, PreferredLanguage},
    delivery_agent_profile::{self, VehicleType},
    user::{self, UserType},
};
use crate::errors::ServiceError;
use crate::PaginatedResponse;

pub const DEFAULT_CITY: &str = "Dhaka";

lazy_static! {
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9]{10,14}$").expect("valid phone regex");
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.@+-]+$").expect("valid username regex");
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_phone_number"))
    }
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_username"))
    }
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub user_type: UserType,
    pub phone_number: String,
    pub address: Option<String>,
    pub city: String,
    pub postal_code: Option<String>,
    pub is_verified: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            full_name: model.full_name(),
            id: model.id,
            username: model.username,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            user_type: model.user_type,
            phone_number: model.phone_number,
            address: model.address,
            city: model.city,
            postal_code: model.postal_code,
            is_verified: model.is_verified,
            is_active: model.is_active,
            date_joined: model.date_joined,
        }
    }
}

/// Account together with its role-specific profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfileResponse {
    pub user: UserResponse,
    #[schema(value_type = Option<crate::entities::customer_profile::Model>)]
    pub customer_profile: Option<customer_profile::Model>,
    #[schema(value_type = Option<crate::entities::delivery_agent_profile::Model>)]
    pub agent_profile: Option<delivery_agent_profile::Model>,
}

/// A delivery agent listing row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AgentSummary {
    pub user: UserResponse,
    #[schema(value_type = crate::entities::delivery_agent_profile::Model)]
    pub profile: delivery_agent_profile::Model,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityResponse {
    pub agent_id: Uuid,
    pub is_available: bool,
}

/// Fields shared by every registration form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AccountFields {
    #[validate(length(min = 3, max = 150), custom = "validate_username")]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(max = 30))]
    #[serde(default)]
    pub first_name: String,
    #[validate(length(max = 30))]
    #[serde(default)]
    pub last_name: String,
    #[validate(length(max = 15), custom = "validate_phone")]
    pub phone_number: String,
    pub address: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 10))]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterCustomerRequest {
    #[serde(flatten)]
    #[validate]
    pub account: AccountFields,
    pub preferred_language: Option<PreferredLanguage>,
    #[validate(length(max = 15))]
    pub emergency_contact: Option<String>,
    pub delivery_instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterAgentRequest {
    #[serde(flatten)]
    #[validate]
    pub account: AccountFields,
    #[validate(length(min = 1, max = 50))]
    pub license_number: String,
    pub vehicle_type: VehicleType,
    #[validate(length(min = 1, max = 20))]
    pub vehicle_number: String,
}

/// Partial profile update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 30))]
    pub first_name: Option<String>,
    #[validate(length(max = 30))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 15), custom = "validate_phone")]
    pub phone_number: Option<String>,
    pub address: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 10))]
    pub postal_code: Option<String>,
    pub preferred_language: Option<PreferredLanguage>,
    #[validate(length(max = 15))]
    pub emergency_contact: Option<String>,
    pub delivery_instructions: Option<String>,
}

/// Accounts, role profiles and agent availability.
#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DatabaseConnection>,
}

impl UserService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    async fn ensure_unique(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        phone_number: Option<&str>,
        exclude: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let checks = [
            (username.map(|u| user::Column::Username.eq(u)), "username"),
            (email.map(|e| user::Column::Email.eq(e)), "email"),
            (phone_number.map(|p| user::Column::PhoneNumber.eq(p)), "phone number"),
        ];

        for (condition, field) in checks {
            let Some(condition) = condition else { continue };
            let mut query = user::Entity::find().filter(condition);
            if let Some(id) = exclude {
                query = query.filter(user::Column::Id.ne(id));
            }
            let taken = query
                .count(db)
                .await
                .map_err(db_err("Failed to check account uniqueness"))?;
            if taken > 0 {
                return Err(ServiceError::Conflict(format!(
                    "An account with this {} already exists",
                    field
                )));
            }
        }
        Ok(())
    }

    fn new_account(fields: &AccountFields, user_type: UserType) -> Result<user::ActiveModel, ServiceError> {
        if fields.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ServiceError::ValidationError(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        let password_hash = hash_password(&fields.password)?;

        Ok(user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(fields.username.trim().to_string()),
            email: Set(fields.email.trim().to_lowercase()),
            password_hash: Set(password_hash),
            first_name: Set(fields.first_name.trim().to_string()),
            last_name: Set(fields.last_name.trim().to_string()),
            user_type: Set(user_type),
            phone_number: Set(fields.phone_number.trim().to_string()),
            address: Set(fields.address.clone()),
            city: Set(fields
                .city
                .clone()
                .unwrap_or_else(|| DEFAULT_CITY.to_string())),
            postal_code: Set(fields.postal_code.clone()),
            is_verified: Set(false),
            is_active: Set(true),
            ..Default::default()
        })
    }

    /// Creates a customer account and its profile in one transaction.
    #[instrument(skip(self, request), fields(username = %request.account.username))]
    pub async fn register_customer(
        &self,
        request: RegisterCustomerRequest,
    ) -> Result<UserProfileResponse, ServiceError> {
        request.validate()?;
        let email = request.account.email.trim().to_lowercase();
        self.ensure_unique(
            Some(request.account.username.trim()),
            Some(&email),
            Some(request.account.phone_number.trim()),
            None,
        )
        .await?;

        let account = Self::new_account(&request.account, UserType::Customer)?;
        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(db_err("Failed to start registration transaction"))?;

        let user = account
            .insert(&txn)
            .await
            .map_err(super::conflict_or_db("Failed to insert user", "Account already exists"))?;

        let profile = customer_profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            preferred_language: Set(request.preferred_language.unwrap_or(PreferredLanguage::Bn)),
            emergency_contact: Set(request.emergency_contact),
            delivery_instructions: Set(request.delivery_instructions),
        }
        .insert(&txn)
        .await
        .map_err(db_err("Failed to insert customer profile"))?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit registration"))?;

        info!(user_id = %user.id, "customer registered");
        Ok(UserProfileResponse {
            user: user.into(),
            customer_profile: Some(profile),
            agent_profile: None,
        })
    }

    /// Creates a delivery agent account and its vehicle profile.
    #[instrument(skip(self, request), fields(username = %request.account.username))]
    pub async fn register_delivery_agent(
        &self,
        request: RegisterAgentRequest,
    ) -> Result<UserProfileResponse, ServiceError> {
        request.validate()?;
        let email = request.account.email.trim().to_lowercase();
        self.ensure_unique(
            Some(request.account.username.trim()),
            Some(&email),
            Some(request.account.phone_number.trim()),
            None,
        )
        .await?;

        let license_taken = delivery_agent_profile::Entity::find()
            .filter(delivery_agent_profile::Column::LicenseNumber.eq(request.license_number.trim()))
            .count(&*self.db_pool)
            .await
            .map_err(db_err("Failed to check license number"))?;
        if license_taken > 0 {
            return Err(ServiceError::Conflict(
                "An agent with this license number already exists".to_string(),
            ));
        }

        let account = Self::new_account(&request.account, UserType::DeliveryAgent)?;
        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(db_err("Failed to start registration transaction"))?;

        let user = account
            .insert(&txn)
            .await
            .map_err(super::conflict_or_db("Failed to insert user", "Account already exists"))?;

        let profile = delivery_agent_profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            license_number: Set(request.license_number.trim().to_string()),
            vehicle_type: Set(request.vehicle_type),
            vehicle_number: Set(request.vehicle_number.trim().to_string()),
            is_available: Set(true),
            rating: Set(Decimal::ZERO),
            total_deliveries: Set(0),
        }
        .insert(&txn)
        .await
        .map_err(super::conflict_or_db(
            "Failed to insert agent profile",
            "An agent with this license number already exists",
        ))?;

        txn.commit()
            .await
            .map_err(db_err("Failed to commit registration"))?;

        info!(user_id = %user.id, "delivery agent registered");
        Ok(UserProfileResponse {
            user: user.into(),
            customer_profile: None,
            agent_profile: Some(profile),
        })
    }

    /// Creates a verified administrator. Not exposed over HTTP; used by
    /// `seed-data` and operators.
    #[instrument(skip(self, account), fields(username = %account.username))]
    pub async fn create_admin(&self, account: AccountFields) -> Result<UserResponse, ServiceError> {
        account.validate()?;
        let email = account.email.trim().to_lowercase();
        self.ensure_unique(
            Some(account.username.trim()),
            Some(&email),
            Some(account.phone_number.trim()),
            None,
        )
        .await?;

        let mut model = Self::new_account(&account, UserType::Admin)?;
        model.is_verified = Set(true);
        let user = model
            .insert(&*self.db_pool)
            .await
            .map_err(super::conflict_or_db("Failed to insert user", "Account already exists"))?;

        info!(user_id = %user.id, "administrator created");
        Ok(user.into())
    }

    pub async fn find_user(&self, user_id: Uuid) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(user_id)
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load user"))?
            .ok_or_else(|| ServiceError::not_found("User", user_id))
    }

    /// The caller's account and role profile.
    #[instrument(skip(self))]
    pub async fn me(&self, user_id: Uuid) -> Result<UserProfileResponse, ServiceError> {
        let db = &*self.db_pool;
        let user = self.find_user(user_id).await?;

        let customer_profile = match user.user_type {
            UserType::Customer => customer_profile::Entity::find()
                .filter(customer_profile::Column::UserId.eq(user.id))
                .one(db)
                .await
                .map_err(db_err("Failed to load customer profile"))?,
            _ => None,
        };
        let agent_profile = match user.user_type {
            UserType::DeliveryAgent => delivery_agent_profile::Entity::find()
                .filter(delivery_agent_profile::Column::UserId.eq(user.id))
                .one(db)
                .await
                .map_err(db_err("Failed to load agent profile"))?,
            _ => None,
        };

        Ok(UserProfileResponse {
            user: user.into(),
            customer_profile,
            agent_profile,
        })
    }

    /// Applies a partial update to the caller's account and customer profile.
    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<UserProfileResponse, ServiceError> {
        request.validate()?;
        let user = self.find_user(user_id).await?;

        let email = request.email.as_deref().map(|e| e.trim().to_lowercase());
        self.ensure_unique(
            None,
            email.as_deref(),
            request.phone_number.as_deref().map(str::trim),
            Some(user.id),
        )
        .await?;

        let txn = self
            .db_pool
            .begin()
            .await
            .map_err(db_err("Failed to start profile update"))?;

        let user_type = user.user_type;
        let mut active: user::ActiveModel = user.into();
        if let Some(first_name) = request.first_name {
            active.first_name = Set(first_name.trim().to_string());
        }
        if let Some(last_name) = request.last_name {
            active.last_name = Set(last_name.trim().to_string());
        }
        if let Some(email) = email {
            active.email = Set(email);
        }
        if let Some(phone) = request.phone_number {
            active.phone_number = Set(phone.trim().to_string());
        }
        if let Some(address) = request.address {
            active.address = Set(Some(address));
        }
        if let Some(city) = request.city {
            active.city = Set(city);
        }
        if let Some(postal_code) = request.postal_code {
            active.postal_code = Set(Some(postal_code));
        }
        active
            .update(&txn)
            .await
            .map_err(super::conflict_or_db("Failed to update user", "Email or phone number already in use"))?;

        if user_type == UserType::Customer {
            let profile = customer_profile::Entity::find()
                .filter(customer_profile::Column::UserId.eq(user_id))
                .one(&txn)
                .await
                .map_err(db_err("Failed to load customer profile"))?;

            let exists = profile.is_some();
            let mut profile: customer_profile::ActiveModel = match profile {
                Some(existing) => existing.into(),
                None => customer_profile::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    preferred_language: Set(PreferredLanguage::Bn),
                    emergency_contact: Set(None),
                    delivery_instructions: Set(None),
                },
            };
            if let Some(language) = request.preferred_language {
                profile.preferred_language = Set(language);
            }
            if let Some(contact) = request.emergency_contact {
                profile.emergency_contact = Set(Some(contact));
            }
            if let Some(instructions) = request.delivery_instructions {
                profile.delivery_instructions = Set(Some(instructions));
            }
            if exists {
                profile.update(&txn).await
            } else {
                profile.insert(&txn).await
            }
            .map_err(db_err("Failed to save customer profile"))?;
        }

        txn.commit()
            .await
            .map_err(db_err("Failed to commit profile update"))?;

        info!(user_id = %user_id, "profile updated");
        self.me(user_id).await
    }

    /// Paginated account listing for administrators.
    #[instrument(skip(self))]
    pub async fn list_users(
        &self,
        page: PageRequest,
        search: Option<String>,
        user_type: Option<UserType>,
    ) -> Result<PaginatedResponse<UserResponse>, ServiceError> {
        let mut query = user::Entity::find().order_by_desc(user::Column::DateJoined);

        if let Some(term) = search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(user::Column::Username.contains(&term))
                    .add(user::Column::Email.contains(&term))
                    .add(user::Column::FirstName.contains(&term))
                    .add(user::Column::LastName.contains(&term)),
            );
        }
        if let Some(user_type) = user_type {
            query = query.filter(user::Column::UserType.eq(user_type));
        }

        let paginator = query.paginate(&*self.db_pool, page.limit);
        let total = paginator
            .num_items()
            .await
            .map_err(db_err("Failed to count users"))?;
        let users = paginator
            .fetch_page(page.index())
            .await
            .map_err(db_err("Failed to fetch users page"))?;

        Ok(PaginatedResponse::new(
            users.into_iter().map(UserResponse::from).collect(),
            total,
            page,
        ))
    }

    /// Delivery agents with their profiles, newest first.
    #[instrument(skip(self))]
    pub async fn list_delivery_agents(
        &self,
        page: PageRequest,
    ) -> Result<PaginatedResponse<AgentSummary>, ServiceError> {
        let paginator = user::Entity::find()
            .filter(user::Column::UserType.eq(UserType::DeliveryAgent))
            .order_by_desc(user::Column::DateJoined)
            .find_also_related(delivery_agent_profile::Entity)
            .paginate(&*self.db_pool, page.limit);

        let total = paginator
            .num_items()
            .await
            .map_err(db_err("Failed to count agents"))?;
        let rows = paginator
            .fetch_page(page.index())
            .await
            .map_err(db_err("Failed to fetch agents page"))?;

        let items = rows
            .into_iter()
            .filter_map(|(user, profile)| match profile {
                Some(profile) => Some(AgentSummary {
                    user: user.into(),
                    profile,
                }),
                None => {
                    warn!(user_id = %user.id, "delivery agent without profile");
                    None
                }
            })
            .collect();

        Ok(PaginatedResponse::new(items, total, page))
    }

    /// Flips an agent's availability. Agents may only toggle themselves.
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id))]
    pub async fn toggle_agent_availability(
        &self,
        actor: &AuthUser,
        agent_id: Uuid,
    ) -> Result<AvailabilityResponse, ServiceError> {
        if !actor.is_admin() && actor.user_id != agent_id {
            return Err(ServiceError::Forbidden(
                "You can only change your own availability".to_string(),
            ));
        }

        let profile = delivery_agent_profile::Entity::find()
            .filter(delivery_agent_profile::Column::UserId.eq(agent_id))
            .one(&*self.db_pool)
            .await
            .map_err(db_err("Failed to load agent profile"))?
            .ok_or_else(|| ServiceError::not_found("Delivery agent", agent_id))?;

        let next = !profile.is_available;
        let mut active: delivery_agent_profile::ActiveModel = profile.into();
        active.is_available = Set(next);
        active
            .update(&*self.db_pool)
            .await
            .map_err(db_err("Failed to update availability"))?;

        info!(agent_id = %agent_id, is_available = next, "agent availability changed");
        Ok(AvailabilityResponse {
            agent_id,
            is_available: next,
        })
    }
}

//! Seed data script - populates the database with demo data
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates:
//! - an administrator, a customer and a delivery agent
//! - the six payment methods accepted at checkout
//! - delivery areas around Dhaka
//! - sample products across categories

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::{info, warn};

use nagaribashi_express::{
    config, db,
    entities::{delivery_agent_profile::VehicleType, product::ProductCategory},
    errors::ServiceError,
    services::{
        catalog::{CatalogService, CreateProductRequest},
        delivery::{CreateDeliveryAreaRequest, DeliveryService},
        payments::{CreatePaymentMethodRequest, PaymentService},
        users::{AccountFields, RegisterAgentRequest, RegisterCustomerRequest, UserService},
        PageRequest,
    },
};

const DEMO_PASSWORD: &str = "nagaribashi-demo-1";

fn account(username: &str, first_name: &str, last_name: &str, phone: &str) -> AccountFields {
    AccountFields {
        username: username.to_string(),
        email: format!("{}@nagaribashi.test", username),
        password: DEMO_PASSWORD.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        phone_number: phone.to_string(),
        address: Some("House 12, Road 5, Dhanmondi".to_string()),
        city: None,
        postal_code: Some("1205".to_string()),
    }
}

/// Conflicts mean the row was seeded by an earlier run.
fn skip_existing<T>(what: &str, result: Result<T, ServiceError>) -> Result<Option<T>, ServiceError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ServiceError::Conflict(msg)) => {
            warn!(what, "{}", msg);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::init_tracing("info", false);

    info!("=== Nagaribashi Express Seed Data ===");

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => config::load_config()?.database_url,
    };
    let pool = db::establish_connection(&database_url).await?;
    db::run_migrations(&pool).await?;
    let pool = Arc::new(pool);

    let users = UserService::new(pool.clone());
    let catalog = CatalogService::new(pool.clone());
    let payments = PaymentService::new(pool.clone(), None);
    let delivery = DeliveryService::new(pool.clone(), None);

    info!("Creating accounts...");
    skip_existing(
        "admin",
        users
            .create_admin(account("admin", "Site", "Admin", "01700000001"))
            .await,
    )?;
    skip_existing(
        "customer",
        users
            .register_customer(RegisterCustomerRequest {
                account: account("rahim", "Rahim", "Uddin", "01700000002"),
                preferred_language: None,
                emergency_contact: None,
                delivery_instructions: Some("Call on arrival".to_string()),
            })
            .await,
    )?;
    skip_existing(
        "delivery agent",
        users
            .register_delivery_agent(RegisterAgentRequest {
                account: account("karim", "Karim", "Hossain", "01700000003"),
                license_number: "DHK-BIKE-0001".to_string(),
                vehicle_type: VehicleType::Bike,
                vehicle_number: "DHAKA-METRO-HA-1234".to_string(),
            })
            .await,
    )?;

    info!("Creating payment methods...");
    let methods: [(&str, &str, Decimal, Decimal, Decimal); 6] = [
        ("Cash on Delivery", "cash_on_delivery", dec!(0), dec!(0), dec!(20000)),
        ("bKash", "bkash", dec!(1.85), dec!(10), dec!(25000)),
        ("Nagad", "nagad", dec!(1.50), dec!(10), dec!(25000)),
        ("Rocket", "rocket", dec!(1.80), dec!(10), dec!(25000)),
        ("Bank Transfer", "bank_transfer", dec!(0), dec!(500), dec!(500000)),
        ("Card", "card", dec!(2.50), dec!(50), dec!(200000)),
    ];
    for (name, code, fee, min, max) in methods {
        skip_existing(
            code,
            payments
                .create_payment_method(CreatePaymentMethodRequest {
                    name: name.to_string(),
                    code: code.to_string(),
                    description: None,
                    processing_fee: fee,
                    min_amount: min,
                    max_amount: max,
                    is_active: true,
                })
                .await,
        )?;
    }

    info!("Creating delivery areas...");
    let areas: [(&str, Decimal, i32); 5] = [
        ("Dhanmondi", dec!(60), 45),
        ("Gulshan", dec!(80), 60),
        ("Mirpur", dec!(60), 60),
        ("Uttara", dec!(100), 90),
        ("Old Dhaka", dec!(70), 75),
    ];
    for (name, fee, minutes) in areas {
        skip_existing(
            name,
            delivery
                .create_delivery_area(CreateDeliveryAreaRequest {
                    name: name.to_string(),
                    description: None,
                    delivery_fee: fee,
                    estimated_delivery_time: minutes,
                })
                .await,
        )?;
    }

    info!("Creating products...");
    let existing = catalog
        .list_products(PageRequest::new(1, 1), None, None)
        .await?
        .total;
    if existing > 0 {
        info!("  Catalog already has {} products, skipping", existing);
        info!("=== Seed Data Complete ===");
        return Ok(());
    }
    let products: [(&str, ProductCategory, Decimal, i32); 8] = [
        ("Miniket Rice 5kg", ProductCategory::Groceries, dec!(420), 120),
        ("Soybean Oil 2L", ProductCategory::Groceries, dec!(360), 80),
        ("Kacchi Biryani", ProductCategory::Food, dec!(350), 40),
        ("Paracetamol 500mg (10)", ProductCategory::Medicine, dec!(12), 500),
        ("LPG Cylinder 12kg", ProductCategory::Gas, dec!(1450), 25),
        ("Power Bank 10000mAh", ProductCategory::Electronics, dec!(1650), 5),
        ("Cotton Panjabi", ProductCategory::Clothing, dec!(1800), 0),
        ("Bangla Sahitya Collection", ProductCategory::Books, dec!(550), 15),
    ];
    let mut created = 0;
    for (name, category, price, stock) in products {
        catalog
            .create_product(CreateProductRequest {
                name: name.to_string(),
                description: String::new(),
                category,
                price,
                stock_quantity: stock,
                image_path: None,
            })
            .await?;
        created += 1;
    }
    info!("  Created {} products", created);

    info!("=== Seed Data Complete ===");
    info!("Log in with admin / rahim / karim and password {}", DEMO_PASSWORD);
    info!("Or explore interactively at: http://localhost:8080/swagger-ui");

    Ok(())
}

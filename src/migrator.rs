use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_user_tables::Migration),
            Box::new(m20240101_000002_create_products_table::Migration),
            Box::new(m20240101_000003_create_order_tables::Migration),
            Box::new(m20240101_000004_create_payment_tables::Migration),
            Box::new(m20240101_000005_create_delivery_tables::Migration),
            Box::new(m20240101_000006_create_review_tables::Migration),
            Box::new(m20240101_000007_create_dashboard_tables::Migration),
        ]
    }
}

mod m20240101_000001_create_user_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_user_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Users::Username)
                                .string_len(150)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Email)
                                .string_len(254)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::FirstName).string_len(150).not_null())
                        .col(ColumnDef::new(Users::LastName).string_len(150).not_null())
                        .col(ColumnDef::new(Users::UserType).string_len(20).not_null())
                        .col(
                            ColumnDef::new(Users::PhoneNumber)
                                .string_len(15)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::Address).text().null())
                        .col(ColumnDef::new(Users::City).string_len(100).not_null())
                        .col(ColumnDef::new(Users::PostalCode).string_len(10).null())
                        .col(
                            ColumnDef::new(Users::IsVerified)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Users::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Users::DateJoined)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_users_user_type")
                        .table(Users::Table)
                        .col(Users::UserType)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CustomerProfiles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CustomerProfiles::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerProfiles::UserId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(CustomerProfiles::PreferredLanguage)
                                .string_len(5)
                                .not_null()
                                .default("bn"),
                        )
                        .col(
                            ColumnDef::new(CustomerProfiles::EmergencyContact)
                                .string_len(15)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(CustomerProfiles::DeliveryInstructions)
                                .text()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_customer_profiles_user_id")
                                .from(CustomerProfiles::Table, CustomerProfiles::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DeliveryAgentProfiles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DeliveryAgentProfiles::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryAgentProfiles::UserId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(DeliveryAgentProfiles::LicenseNumber)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(DeliveryAgentProfiles::VehicleType)
                                .string_len(10)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryAgentProfiles::VehicleNumber)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryAgentProfiles::IsAvailable)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(DeliveryAgentProfiles::Rating)
                                .decimal_len(3, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DeliveryAgentProfiles::TotalDeliveries)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_delivery_agent_profiles_user_id")
                                .from(DeliveryAgentProfiles::Table, DeliveryAgentProfiles::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DeliveryAgentProfiles::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CustomerProfiles::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Users {
        Table,
        Id,
        Username,
        Email,
        PasswordHash,
        FirstName,
        LastName,
        UserType,
        PhoneNumber,
        Address,
        City,
        PostalCode,
        IsVerified,
        IsActive,
        DateJoined,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum CustomerProfiles {
        Table,
        Id,
        UserId,
        PreferredLanguage,
        EmergencyContact,
        DeliveryInstructions,
    }

    #[derive(DeriveIden)]
    enum DeliveryAgentProfiles {
        Table,
        Id,
        UserId,
        LicenseNumber,
        VehicleType,
        VehicleNumber,
        IsAvailable,
        Rating,
        TotalDeliveries,
    }
}

mod m20240101_000002_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Name).string_len(200).not_null())
                        .col(ColumnDef::new(Products::Description).text().not_null())
                        .col(ColumnDef::new(Products::Category).string_len(20).not_null())
                        .col(ColumnDef::new(Products::Price).decimal_len(10, 2).not_null())
                        .col(
                            ColumnDef::new(Products::IsAvailable)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Products::StockQuantity)
                                .integer()
                                .not_null()
                                .default(0)
                                .check(Expr::col(Products::StockQuantity).gte(0)),
                        )
                        .col(ColumnDef::new(Products::ImagePath).string().null())
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_category")
                        .table(Products::Table)
                        .col(Products::Category)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        Name,
        Description,
        Category,
        Price,
        IsAvailable,
        StockQuantity,
        ImagePath,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_order_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Orders::OrderNumber)
                                .string_len(20)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Orders::DeliveryType).string_len(20).not_null())
                        .col(
                            ColumnDef::new(Orders::ScheduledDeliveryTime)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Orders::DeliveryAddress).text().not_null())
                        .col(ColumnDef::new(Orders::DeliveryCity).string_len(100).not_null())
                        .col(ColumnDef::new(Orders::DeliveryInstructions).text().null())
                        .col(ColumnDef::new(Orders::Status).string_len(20).not_null())
                        .col(
                            ColumnDef::new(Orders::TotalAmount)
                                .decimal_len(10, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::DeliveryFee)
                                .decimal_len(10, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::SpecialInstructions).text().null())
                        .col(
                            ColumnDef::new(Orders::CancellationReason)
                                .string_len(40)
                                .null(),
                        )
                        .col(ColumnDef::new(Orders::CancellationNotes).text().null())
                        .col(
                            ColumnDef::new(Orders::CancelledAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Orders::CancelledBy).uuid().null())
                        .col(ColumnDef::new(Orders::RefundPreference).string_len(30).null())
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_customer_id")
                                .from(Orders::Table, Orders::CustomerId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_customer_id")
                        .table(Orders::Table)
                        .col(Orders::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_created_at")
                        .table(Orders::Table)
                        .col(Orders::CreatedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(OrderItems::Quantity)
                                .integer()
                                .not_null()
                                .check(Expr::col(OrderItems::Quantity).gte(1)),
                        )
                        .col(
                            ColumnDef::new(OrderItems::UnitPrice)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderItems::TotalPrice)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order_id")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_product_id")
                                .from(OrderItems::Table, OrderItems::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderStatusHistory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderStatusHistory::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderStatusHistory::OrderId).uuid().not_null())
                        .col(
                            ColumnDef::new(OrderStatusHistory::Status)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderStatusHistory::Notes).text().null())
                        .col(ColumnDef::new(OrderStatusHistory::CreatedBy).uuid().null())
                        .col(
                            ColumnDef::new(OrderStatusHistory::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_status_history_order_id")
                                .from(OrderStatusHistory::Table, OrderStatusHistory::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderStatusHistory::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        OrderNumber,
        CustomerId,
        DeliveryType,
        ScheduledDeliveryTime,
        DeliveryAddress,
        DeliveryCity,
        DeliveryInstructions,
        Status,
        TotalAmount,
        DeliveryFee,
        SpecialInstructions,
        CancellationReason,
        CancellationNotes,
        CancelledAt,
        CancelledBy,
        RefundPreference,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        ProductId,
        Quantity,
        UnitPrice,
        TotalPrice,
    }

    #[derive(DeriveIden)]
    enum OrderStatusHistory {
        Table,
        Id,
        OrderId,
        Status,
        Notes,
        CreatedBy,
        CreatedAt,
    }
}

mod m20240101_000004_create_payment_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_payment_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PaymentMethods::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PaymentMethods::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PaymentMethods::Name).string_len(100).not_null())
                        .col(
                            ColumnDef::new(PaymentMethods::Code)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(PaymentMethods::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(PaymentMethods::Description).text().null())
                        .col(
                            ColumnDef::new(PaymentMethods::ProcessingFee)
                                .decimal_len(5, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PaymentMethods::MinAmount)
                                .decimal_len(10, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PaymentMethods::MaxAmount)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentMethods::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Payments::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Payments::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Payments::OrderId).uuid().not_null())
                        .col(
                            ColumnDef::new(Payments::PaymentMethod)
                                .string_len(50)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Payments::Amount).decimal_len(10, 2).not_null())
                        .col(ColumnDef::new(Payments::Status).string_len(20).not_null())
                        .col(
                            ColumnDef::new(Payments::TransactionId)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Payments::PaymentReference)
                                .string_len(100)
                                .null(),
                        )
                        .col(ColumnDef::new(Payments::PaymentDetails).json().null())
                        .col(
                            ColumnDef::new(Payments::PaidAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Payments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Payments::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_payments_order_id")
                                .from(Payments::Table, Payments::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_payments_order_id")
                        .table(Payments::Table)
                        .col(Payments::OrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_payments_status")
                        .table(Payments::Table)
                        .col(Payments::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PaymentTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PaymentTransactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PaymentTransactions::PaymentId).uuid().not_null())
                        .col(
                            ColumnDef::new(PaymentTransactions::Action)
                                .string_len(50)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PaymentTransactions::Status)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(PaymentTransactions::Message).text().null())
                        .col(ColumnDef::new(PaymentTransactions::ResponseData).json().null())
                        .col(
                            ColumnDef::new(PaymentTransactions::Timestamp)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_payment_transactions_payment_id")
                                .from(PaymentTransactions::Table, PaymentTransactions::PaymentId)
                                .to(Payments::Table, Payments::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Refunds::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Refunds::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Refunds::PaymentId).uuid().not_null())
                        .col(ColumnDef::new(Refunds::Amount).decimal_len(10, 2).not_null())
                        .col(ColumnDef::new(Refunds::Reason).text().not_null())
                        .col(ColumnDef::new(Refunds::Status).string_len(20).not_null())
                        .col(
                            ColumnDef::new(Refunds::RefundReference)
                                .string_len(100)
                                .null(),
                        )
                        .col(ColumnDef::new(Refunds::ProcessedBy).uuid().null())
                        .col(
                            ColumnDef::new(Refunds::ProcessedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Refunds::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_refunds_payment_id")
                                .from(Refunds::Table, Refunds::PaymentId)
                                .to(Payments::Table, Payments::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Refunds::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PaymentTransactions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Payments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PaymentMethods::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum PaymentMethods {
        Table,
        Id,
        Name,
        Code,
        IsActive,
        Description,
        ProcessingFee,
        MinAmount,
        MaxAmount,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Payments {
        Table,
        Id,
        OrderId,
        PaymentMethod,
        Amount,
        Status,
        TransactionId,
        PaymentReference,
        PaymentDetails,
        PaidAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum PaymentTransactions {
        Table,
        Id,
        PaymentId,
        Action,
        Status,
        Message,
        ResponseData,
        Timestamp,
    }

    #[derive(DeriveIden)]
    enum Refunds {
        Table,
        Id,
        PaymentId,
        Amount,
        Reason,
        Status,
        RefundReference,
        ProcessedBy,
        ProcessedAt,
        CreatedAt,
    }
}

mod m20240101_000005_create_delivery_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_delivery_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DeliveryAreas::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DeliveryAreas::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryAreas::Name)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(DeliveryAreas::Description).text().null())
                        .col(
                            ColumnDef::new(DeliveryAreas::DeliveryFee)
                                .decimal_len(10, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(DeliveryAreas::EstimatedDeliveryTime)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryAreas::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(DeliveryAreas::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DeliveryAssignments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DeliveryAssignments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryAssignments::OrderId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(DeliveryAssignments::DeliveryAgentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryAssignments::AssignedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DeliveryAssignments::AssignedBy).uuid().null())
                        .col(
                            ColumnDef::new(DeliveryAssignments::EstimatedDeliveryTime)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryAssignments::ActualDeliveryTime)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(DeliveryAssignments::DeliveryNotes).text().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_delivery_assignments_order_id")
                                .from(DeliveryAssignments::Table, DeliveryAssignments::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_delivery_assignments_agent_id")
                                .from(
                                    DeliveryAssignments::Table,
                                    DeliveryAssignments::DeliveryAgentId,
                                )
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_delivery_assignments_agent_id")
                        .table(DeliveryAssignments::Table)
                        .col(DeliveryAssignments::DeliveryAgentId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DeliveryStatuses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DeliveryStatuses::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryStatuses::DeliveryAssignmentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DeliveryStatuses::Status).string_len(20).not_null())
                        .col(ColumnDef::new(DeliveryStatuses::Location).string_len(200).null())
                        .col(ColumnDef::new(DeliveryStatuses::Notes).text().null())
                        .col(
                            ColumnDef::new(DeliveryStatuses::Timestamp)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_delivery_statuses_assignment_id")
                                .from(
                                    DeliveryStatuses::Table,
                                    DeliveryStatuses::DeliveryAssignmentId,
                                )
                                .to(DeliveryAssignments::Table, DeliveryAssignments::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DeliveryAgentLocations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DeliveryAgentLocations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryAgentLocations::DeliveryAgentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryAgentLocations::Latitude)
                                .decimal_len(9, 6)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryAgentLocations::Longitude)
                                .decimal_len(9, 6)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryAgentLocations::Address)
                                .string_len(200)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryAgentLocations::Timestamp)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_delivery_agent_locations_agent_id")
                                .from(
                                    DeliveryAgentLocations::Table,
                                    DeliveryAgentLocations::DeliveryAgentId,
                                )
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DeliveryRatings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DeliveryRatings::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(DeliveryRatings::DeliveryAssignmentId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(DeliveryRatings::Rating)
                                .integer()
                                .not_null()
                                .check(Expr::col(DeliveryRatings::Rating).between(1, 5)),
                        )
                        .col(ColumnDef::new(DeliveryRatings::Comment).text().null())
                        .col(
                            ColumnDef::new(DeliveryRatings::RatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_delivery_ratings_assignment_id")
                                .from(
                                    DeliveryRatings::Table,
                                    DeliveryRatings::DeliveryAssignmentId,
                                )
                                .to(DeliveryAssignments::Table, DeliveryAssignments::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DeliveryRatings::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DeliveryAgentLocations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DeliveryStatuses::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DeliveryAssignments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DeliveryAreas::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum DeliveryAreas {
        Table,
        Id,
        Name,
        Description,
        DeliveryFee,
        EstimatedDeliveryTime,
        IsActive,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum DeliveryAssignments {
        Table,
        Id,
        OrderId,
        DeliveryAgentId,
        AssignedAt,
        AssignedBy,
        EstimatedDeliveryTime,
        ActualDeliveryTime,
        DeliveryNotes,
    }

    #[derive(DeriveIden)]
    enum DeliveryStatuses {
        Table,
        Id,
        DeliveryAssignmentId,
        Status,
        Location,
        Notes,
        Timestamp,
    }

    #[derive(DeriveIden)]
    enum DeliveryAgentLocations {
        Table,
        Id,
        DeliveryAgentId,
        Latitude,
        Longitude,
        Address,
        Timestamp,
    }

    #[derive(DeriveIden)]
    enum DeliveryRatings {
        Table,
        Id,
        DeliveryAssignmentId,
        Rating,
        Comment,
        RatedAt,
    }
}

mod m20240101_000006_create_review_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_review_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Reviews::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Reviews::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Reviews::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Reviews::OrderId).uuid().not_null())
                        .col(ColumnDef::new(Reviews::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(Reviews::Rating)
                                .integer()
                                .not_null()
                                .check(Expr::col(Reviews::Rating).between(1, 5)),
                        )
                        .col(ColumnDef::new(Reviews::Title).string_len(200).not_null())
                        .col(ColumnDef::new(Reviews::Comment).text().not_null())
                        .col(
                            ColumnDef::new(Reviews::IsVerified)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Reviews::IsPublic)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Reviews::HelpfulCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Reviews::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Reviews::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_reviews_customer_id")
                                .from(Reviews::Table, Reviews::CustomerId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_reviews_order_id")
                                .from(Reviews::Table, Reviews::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_reviews_product_id")
                                .from(Reviews::Table, Reviews::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("uq_reviews_customer_order_product")
                        .table(Reviews::Table)
                        .col(Reviews::CustomerId)
                        .col(Reviews::OrderId)
                        .col(Reviews::ProductId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ReviewImages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ReviewImages::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ReviewImages::ReviewId).uuid().not_null())
                        .col(ColumnDef::new(ReviewImages::ImagePath).string().not_null())
                        .col(ColumnDef::new(ReviewImages::Caption).string_len(200).null())
                        .col(
                            ColumnDef::new(ReviewImages::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_review_images_review_id")
                                .from(ReviewImages::Table, ReviewImages::ReviewId)
                                .to(Reviews::Table, Reviews::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ReviewHelpful::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ReviewHelpful::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ReviewHelpful::ReviewId).uuid().not_null())
                        .col(ColumnDef::new(ReviewHelpful::UserId).uuid().not_null())
                        .col(ColumnDef::new(ReviewHelpful::IsHelpful).boolean().not_null())
                        .col(
                            ColumnDef::new(ReviewHelpful::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_review_helpful_review_id")
                                .from(ReviewHelpful::Table, ReviewHelpful::ReviewId)
                                .to(Reviews::Table, Reviews::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("uq_review_helpful_review_user")
                        .table(ReviewHelpful::Table)
                        .col(ReviewHelpful::ReviewId)
                        .col(ReviewHelpful::UserId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ReviewResponses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ReviewResponses::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReviewResponses::ReviewId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(ReviewResponses::ResponderId).uuid().not_null())
                        .col(ColumnDef::new(ReviewResponses::Response).text().not_null())
                        .col(
                            ColumnDef::new(ReviewResponses::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReviewResponses::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_review_responses_review_id")
                                .from(ReviewResponses::Table, ReviewResponses::ReviewId)
                                .to(Reviews::Table, Reviews::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ReviewReports::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ReviewReports::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ReviewReports::ReviewId).uuid().not_null())
                        .col(ColumnDef::new(ReviewReports::ReporterId).uuid().not_null())
                        .col(ColumnDef::new(ReviewReports::Reason).string_len(20).not_null())
                        .col(ColumnDef::new(ReviewReports::Description).text().null())
                        .col(ColumnDef::new(ReviewReports::Status).string_len(20).not_null())
                        .col(ColumnDef::new(ReviewReports::ReviewedBy).uuid().null())
                        .col(
                            ColumnDef::new(ReviewReports::ReviewedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ReviewReports::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_review_reports_review_id")
                                .from(ReviewReports::Table, ReviewReports::ReviewId)
                                .to(Reviews::Table, Reviews::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("uq_review_reports_review_reporter")
                        .table(ReviewReports::Table)
                        .col(ReviewReports::ReviewId)
                        .col(ReviewReports::ReporterId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ReviewReports::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ReviewResponses::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ReviewHelpful::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ReviewImages::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Reviews::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Reviews {
        Table,
        Id,
        CustomerId,
        OrderId,
        ProductId,
        Rating,
        Title,
        Comment,
        IsVerified,
        IsPublic,
        HelpfulCount,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ReviewImages {
        Table,
        Id,
        ReviewId,
        ImagePath,
        Caption,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum ReviewHelpful {
        Table,
        Id,
        ReviewId,
        UserId,
        IsHelpful,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum ReviewResponses {
        Table,
        Id,
        ReviewId,
        ResponderId,
        Response,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ReviewReports {
        Table,
        Id,
        ReviewId,
        ReporterId,
        Reason,
        Description,
        Status,
        ReviewedBy,
        ReviewedAt,
        CreatedAt,
    }
}

mod m20240101_000007_create_dashboard_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_dashboard_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Notifications::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Notifications::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Notifications::RecipientId).uuid().not_null())
                        .col(ColumnDef::new(Notifications::Title).string_len(200).not_null())
                        .col(ColumnDef::new(Notifications::Message).text().not_null())
                        .col(
                            ColumnDef::new(Notifications::NotificationType)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Notifications::Priority).string_len(10).not_null())
                        .col(
                            ColumnDef::new(Notifications::IsRead)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Notifications::ReadAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Notifications::ActionUrl).string().null())
                        .col(ColumnDef::new(Notifications::Metadata).json().null())
                        .col(
                            ColumnDef::new(Notifications::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_notifications_recipient_id")
                                .from(Notifications::Table, Notifications::RecipientId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_notifications_recipient_read")
                        .table(Notifications::Table)
                        .col(Notifications::RecipientId)
                        .col(Notifications::IsRead)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SystemLogs::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(SystemLogs::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(SystemLogs::Level).string_len(10).not_null())
                        .col(ColumnDef::new(SystemLogs::Action).string_len(10).not_null())
                        .col(ColumnDef::new(SystemLogs::UserId).uuid().null())
                        .col(ColumnDef::new(SystemLogs::ModelName).string_len(100).null())
                        .col(ColumnDef::new(SystemLogs::ObjectId).string_len(100).null())
                        .col(ColumnDef::new(SystemLogs::Message).text().not_null())
                        .col(ColumnDef::new(SystemLogs::IpAddress).string_len(45).null())
                        .col(ColumnDef::new(SystemLogs::UserAgent).text().null())
                        .col(ColumnDef::new(SystemLogs::Metadata).json().null())
                        .col(
                            ColumnDef::new(SystemLogs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AnalyticsData::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AnalyticsData::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AnalyticsData::MetricType)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(AnalyticsData::Date).date().not_null())
                        .col(
                            ColumnDef::new(AnalyticsData::Value)
                                .decimal_len(15, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(AnalyticsData::Metadata).json().null())
                        .col(
                            ColumnDef::new(AnalyticsData::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("uq_analytics_data_metric_date")
                        .table(AnalyticsData::Table)
                        .col(AnalyticsData::MetricType)
                        .col(AnalyticsData::Date)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AnalyticsData::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SystemLogs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Notifications::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Notifications {
        Table,
        Id,
        RecipientId,
        Title,
        Message,
        NotificationType,
        Priority,
        IsRead,
        ReadAt,
        ActionUrl,
        Metadata,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum SystemLogs {
        Table,
        Id,
        Level,
        Action,
        UserId,
        ModelName,
        ObjectId,
        Message,
        IpAddress,
        UserAgent,
        Metadata,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum AnalyticsData {
        Table,
        Id,
        MetricType,
        Date,
        Value,
        Metadata,
        CreatedAt,
    }
}

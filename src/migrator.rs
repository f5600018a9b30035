//! Embedded schema migrations. Applied on startup when `auto_migrate` is
//! set, and by the test harness against in-memory SQLite.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_refresh_tokens_table::Migration),
            Box::new(m20240101_000003_create_items_table::Migration),
            Box::new(m20240101_000004_create_kit_templates_table::Migration),
            Box::new(m20240101_000005_create_assemblies_table::Migration),
            Box::new(m20240101_000006_create_stock_movements_table::Migration),
            Box::new(m20240101_000007_create_productions_table::Migration),
            Box::new(m20240101_000008_create_purchases_table::Migration),
            Box::new(m20240101_000009_create_distributions_table::Migration),
            Box::new(m20240101_000010_create_recipients_table::Migration),
        ]
    }
}

mod m20240101_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_users_table"
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
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Email)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                        .col(ColumnDef::new(Users::FullName).string_len(255).null())
                        .col(ColumnDef::new(Users::Role).string_len(48).not_null())
                        .col(
                            ColumnDef::new(Users::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
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
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        Username,
        Email,
        PasswordHash,
        FullName,
        Role,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_refresh_tokens_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_refresh_tokens_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(RefreshTokens::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RefreshTokens::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RefreshTokens::UserId).uuid().not_null())
                        .col(
                            ColumnDef::new(RefreshTokens::Token)
                                .string_len(500)
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(RefreshTokens::ExpiresAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RefreshTokens::CreatedAt)
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
                        .name("idx_refresh_tokens_user_id")
                        .table(RefreshTokens::Table)
                        .col(RefreshTokens::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RefreshTokens::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum RefreshTokens {
        Table,
        Id,
        UserId,
        Token,
        ExpiresAt,
        CreatedAt,
    }
}

mod m20240101_000003_create_items_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Items::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Items::Name).string_len(255).not_null())
                        .col(ColumnDef::new(Items::Description).text().null())
                        .col(ColumnDef::new(Items::Category).string_len(32).not_null())
                        .col(ColumnDef::new(Items::UnitOfMeasure).string_len(50).not_null())
                        .col(
                            ColumnDef::new(Items::CurrentStockLevel)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Items::MinimumStockLevel)
                                .decimal_len(12, 2)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Items::Sku)
                                .string_len(100)
                                .null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Items::Notes).text().null())
                        .col(
                            ColumnDef::new(Items::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Items::UpdatedAt)
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
                        .name("idx_items_name")
                        .table(Items::Table)
                        .col(Items::Name)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_items_category")
                        .table(Items::Table)
                        .col(Items::Category)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Items {
        Table,
        Id,
        Name,
        Description,
        Category,
        UnitOfMeasure,
        CurrentStockLevel,
        MinimumStockLevel,
        Sku,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_kit_templates_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_kit_templates_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(KitTemplates::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(KitTemplates::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(KitTemplates::Name)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(KitTemplates::Description).text().null())
                        .col(ColumnDef::new(KitTemplates::KitItemId).uuid().not_null())
                        .col(ColumnDef::new(KitTemplates::Components).json().not_null())
                        .col(
                            ColumnDef::new(KitTemplates::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(KitTemplates::CreatedByUserId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(KitTemplates::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(KitTemplates::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_kit_templates_kit_item")
                                .from(KitTemplates::Table, KitTemplates::KitItemId)
                                .to(Items::Table, Items::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(KitTemplates::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum KitTemplates {
        Table,
        Id,
        Name,
        Description,
        KitItemId,
        Components,
        IsActive,
        CreatedByUserId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Items {
        Table,
        Id,
    }
}

mod m20240101_000005_create_assemblies_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_assemblies_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Assemblies::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Assemblies::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Assemblies::AssemblyDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Assemblies::KitTemplateId).uuid().not_null())
                        .col(ColumnDef::new(Assemblies::KitItemId).uuid().not_null())
                        .col(
                            ColumnDef::new(Assemblies::QuantityAssembled)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Assemblies::ComponentsUsed)
                                .json()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Assemblies::AssembledByUserId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Assemblies::Notes).string_len(500).null())
                        .col(
                            ColumnDef::new(Assemblies::CreatedAt)
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
                        .name("idx_assemblies_assembly_date")
                        .table(Assemblies::Table)
                        .col(Assemblies::AssemblyDate)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_assemblies_kit_item_id")
                        .table(Assemblies::Table)
                        .col(Assemblies::KitItemId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Assemblies::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Assemblies {
        Table,
        Id,
        AssemblyDate,
        KitTemplateId,
        KitItemId,
        QuantityAssembled,
        ComponentsUsed,
        AssembledByUserId,
        Notes,
        CreatedAt,
    }
}

mod m20240101_000006_create_stock_movements_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_stock_movements_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockMovements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockMovements::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::ItemId).uuid().not_null())
                        .col(
                            ColumnDef::new(StockMovements::MovementType)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::Quantity)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::ReferenceType)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::ReferenceId).uuid().null())
                        .col(ColumnDef::new(StockMovements::UserId).uuid().not_null())
                        .col(ColumnDef::new(StockMovements::Notes).text().null())
                        .col(
                            ColumnDef::new(StockMovements::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_movements_item")
                                .from(StockMovements::Table, StockMovements::ItemId)
                                .to(Items::Table, Items::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_movements_item_id")
                        .table(StockMovements::Table)
                        .col(StockMovements::ItemId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_movements_reference_id")
                        .table(StockMovements::Table)
                        .col(StockMovements::ReferenceId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_movements_created_at")
                        .table(StockMovements::Table)
                        .col(StockMovements::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockMovements::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum StockMovements {
        Table,
        Id,
        ItemId,
        MovementType,
        Quantity,
        ReferenceType,
        ReferenceId,
        UserId,
        Notes,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Items {
        Table,
        Id,
    }
}

mod m20240101_000007_create_productions_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_productions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Productions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Productions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Productions::ProductionDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Productions::ProducedItemId).uuid().not_null())
                        .col(
                            ColumnDef::new(Productions::QuantityProduced)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Productions::ProducedByUserId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Productions::Notes).text().null())
                        .col(
                            ColumnDef::new(Productions::CreatedAt)
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
                        .name("idx_productions_production_date")
                        .table(Productions::Table)
                        .col(Productions::ProductionDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Productions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Productions {
        Table,
        Id,
        ProductionDate,
        ProducedItemId,
        QuantityProduced,
        ProducedByUserId,
        Notes,
        CreatedAt,
    }
}

mod m20240101_000008_create_purchases_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_purchases_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Purchases::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Purchases::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Purchases::PurchaseDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Purchases::SupplierName).string_len(255).null())
                        .col(ColumnDef::new(Purchases::ItemsPurchased).json().not_null())
                        .col(ColumnDef::new(Purchases::TotalCost).decimal_len(12, 2).null())
                        .col(
                            ColumnDef::new(Purchases::ReceivedByUserId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Purchases::Notes).text().null())
                        .col(
                            ColumnDef::new(Purchases::CreatedAt)
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
                        .name("idx_purchases_purchase_date")
                        .table(Purchases::Table)
                        .col(Purchases::PurchaseDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Purchases::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Purchases {
        Table,
        Id,
        PurchaseDate,
        SupplierName,
        ItemsPurchased,
        TotalCost,
        ReceivedByUserId,
        Notes,
        CreatedAt,
    }
}

mod m20240101_000009_create_distributions_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000009_create_distributions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Distributions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Distributions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Distributions::DistributionDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Distributions::DistributionType)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Distributions::ItemsDistributed)
                                .json()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Distributions::RecipientInfo).text().null())
                        .col(
                            ColumnDef::new(Distributions::DistributedByUserId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Distributions::Notes).text().null())
                        .col(
                            ColumnDef::new(Distributions::DistributionTypeLegacy)
                                .string_len(50)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Distributions::CreatedAt)
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
                        .name("idx_distributions_distribution_date")
                        .table(Distributions::Table)
                        .col(Distributions::DistributionDate)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_distributions_distribution_type")
                        .table(Distributions::Table)
                        .col(Distributions::DistributionType)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Distributions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Distributions {
        Table,
        Id,
        DistributionDate,
        DistributionType,
        ItemsDistributed,
        RecipientInfo,
        DistributedByUserId,
        Notes,
        DistributionTypeLegacy,
        CreatedAt,
    }
}

mod m20240101_000010_create_recipients_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000010_create_recipients_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Recipients::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Recipients::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Recipients::Name)
                                .string_len(255)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Recipients::Notes).text().null())
                        .col(
                            ColumnDef::new(Recipients::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Recipients::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Recipients::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Recipients::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Recipients {
        Table,
        Id,
        Name,
        Notes,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

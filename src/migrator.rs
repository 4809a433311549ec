use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_customers_table::Migration),
            Box::new(m20240101_000002_create_vehicles_table::Migration),
            Box::new(m20240101_000003_create_parts_table::Migration),
            Box::new(m20240101_000004_create_service_orders_table::Migration),
            Box::new(m20240101_000005_create_service_tasks_table::Migration),
            Box::new(m20240101_000006_create_used_parts_table::Migration),
            Box::new(m20240101_000007_create_comments_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_customers_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Customers::FirstName).string().not_null())
                        .col(ColumnDef::new(Customers::LastName).string().not_null())
                        .col(ColumnDef::new(Customers::Email).string().not_null())
                        .col(ColumnDef::new(Customers::PhoneNumber).string().null())
                        .col(ColumnDef::new(Customers::Address).string().null())
                        .col(
                            ColumnDef::new(Customers::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customers_email")
                        .table(Customers::Table)
                        .col(Customers::Email)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Customers {
        Table,
        Id,
        FirstName,
        LastName,
        Email,
        PhoneNumber,
        Address,
        Version,
    }
}

mod m20240101_000002_create_vehicles_table {

    use super::m20240101_000001_create_customers_table::Customers;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_vehicles_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Vehicles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Vehicles::Id)
                                .integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Vehicles::Vin).string_len(17).not_null())
                        .col(
                            ColumnDef::new(Vehicles::RegistrationNumber)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Vehicles::Make).string_len(50).not_null())
                        .col(ColumnDef::new(Vehicles::Model).string_len(50).not_null())
                        .col(ColumnDef::new(Vehicles::Year).integer().not_null())
                        .col(ColumnDef::new(Vehicles::ImageUrl).string().null())
                        .col(ColumnDef::new(Vehicles::CustomerId).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_vehicles_customer")
                                .from(Vehicles::Table, Vehicles::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_vehicles_customer_id")
                        .table(Vehicles::Table)
                        .col(Vehicles::CustomerId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Vehicles::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Vehicles {
        Table,
        Id,
        Vin,
        RegistrationNumber,
        Make,
        Model,
        Year,
        ImageUrl,
        CustomerId,
    }
}

mod m20240101_000003_create_parts_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_parts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Parts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Parts::Id)
                                .integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Parts::Name).string_len(100).not_null())
                        .col(
                            ColumnDef::new(Parts::UnitPrice)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Parts::Description).string_len(500).null())
                        .col(ColumnDef::new(Parts::PartNumber).string_len(50).null())
                        // Nullable: null means stock is not tracked for this part
                        .col(ColumnDef::new(Parts::StockQuantity).integer().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_parts_part_number")
                        .table(Parts::Table)
                        .col(Parts::PartNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Parts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Parts {
        Table,
        Id,
        Name,
        UnitPrice,
        Description,
        PartNumber,
        StockQuantity,
    }
}

mod m20240101_000004_create_service_orders_table {

    use super::m20240101_000002_create_vehicles_table::Vehicles;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_service_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ServiceOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ServiceOrders::Id)
                                .integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ServiceOrders::Description).string().not_null())
                        .col(
                            ColumnDef::new(ServiceOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ServiceOrders::CompletedAt).timestamp_with_time_zone().null())
                        .col(
                            ColumnDef::new(ServiceOrders::Status)
                                .string_len(20)
                                .not_null()
                                .default("created"),
                        )
                        .col(
                            ColumnDef::new(ServiceOrders::AssignedMechanicId)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(ServiceOrders::VehicleId).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_service_orders_vehicle")
                                .from(ServiceOrders::Table, ServiceOrders::VehicleId)
                                .to(Vehicles::Table, Vehicles::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_service_orders_vehicle_id")
                        .table(ServiceOrders::Table)
                        .col(ServiceOrders::VehicleId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_service_orders_status")
                        .table(ServiceOrders::Table)
                        .col(ServiceOrders::Status)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ServiceOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ServiceOrders {
        Table,
        Id,
        Description,
        CreatedAt,
        CompletedAt,
        Status,
        AssignedMechanicId,
        VehicleId,
    }
}

mod m20240101_000005_create_service_tasks_table {

    use super::m20240101_000004_create_service_orders_table::ServiceOrders;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_service_tasks_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ServiceTasks::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ServiceTasks::Id)
                                .integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceTasks::Description)
                                .string_len(200)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceTasks::LaborCost)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceTasks::IsCompleted)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(ServiceTasks::CompletedAt).timestamp_with_time_zone().null())
                        .col(
                            ColumnDef::new(ServiceTasks::AssignedMechanicId)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ServiceTasks::ServiceOrderId)
                                .integer()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_service_tasks_order")
                                .from(ServiceTasks::Table, ServiceTasks::ServiceOrderId)
                                .to(ServiceOrders::Table, ServiceOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_service_tasks_order_id")
                        .table(ServiceTasks::Table)
                        .col(ServiceTasks::ServiceOrderId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ServiceTasks::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ServiceTasks {
        Table,
        Id,
        Description,
        LaborCost,
        IsCompleted,
        CompletedAt,
        AssignedMechanicId,
        ServiceOrderId,
    }
}

mod m20240101_000006_create_used_parts_table {

    use super::m20240101_000003_create_parts_table::Parts;
    use super::m20240101_000004_create_service_orders_table::ServiceOrders;
    use super::m20240101_000005_create_service_tasks_table::ServiceTasks;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_used_parts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(UsedParts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UsedParts::Id)
                                .integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(UsedParts::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(UsedParts::ServiceTaskId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(UsedParts::PartId).integer().not_null())
                        .col(
                            ColumnDef::new(UsedParts::ServiceOrderId)
                                .integer()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_used_parts_task")
                                .from(UsedParts::Table, UsedParts::ServiceTaskId)
                                .to(ServiceTasks::Table, ServiceTasks::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        // Parts may not be deleted while usage rows reference them
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_used_parts_part")
                                .from(UsedParts::Table, UsedParts::PartId)
                                .to(Parts::Table, Parts::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_used_parts_order")
                                .from(UsedParts::Table, UsedParts::ServiceOrderId)
                                .to(ServiceOrders::Table, ServiceOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_used_parts_task_id")
                        .table(UsedParts::Table)
                        .col(UsedParts::ServiceTaskId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_used_parts_order_id")
                        .table(UsedParts::Table)
                        .col(UsedParts::ServiceOrderId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(UsedParts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum UsedParts {
        Table,
        Id,
        Quantity,
        ServiceTaskId,
        PartId,
        ServiceOrderId,
    }
}

mod m20240101_000007_create_comments_table {

    use super::m20240101_000004_create_service_orders_table::ServiceOrders;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_comments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Comments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Comments::Id)
                                .integer()
                                .auto_increment()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Comments::Content).string().not_null())
                        .col(ColumnDef::new(Comments::AuthorId).string().not_null())
                        .col(ColumnDef::new(Comments::CreatedAt).timestamp_with_time_zone().not_null())
                        .col(
                            ColumnDef::new(Comments::ServiceOrderId)
                                .integer()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_comments_order")
                                .from(Comments::Table, Comments::ServiceOrderId)
                                .to(ServiceOrders::Table, ServiceOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_comments_order_id")
                        .table(Comments::Table)
                        .col(Comments::ServiceOrderId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Comments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Comments {
        Table,
        Id,
        Content,
        AuthorId,
        CreatedAt,
        ServiceOrderId,
    }
}

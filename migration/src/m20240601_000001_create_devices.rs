use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Devices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Devices::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()".to_string()),
                    )
                    .col(ColumnDef::new(Devices::Hostname).string().not_null())
                    .col(ColumnDef::new(Devices::Address).string().not_null())
                    .col(ColumnDef::new(Devices::SnmpConfig).json().not_null())
                    .col(ColumnDef::new(Devices::Os).string())
                    .col(ColumnDef::new(Devices::Vendor).string())
                    .col(ColumnDef::new(Devices::Model).string())
                    .col(ColumnDef::new(Devices::Serial).string())
                    .col(ColumnDef::new(Devices::Uptime).big_unsigned())
                    .col(ColumnDef::new(Devices::DeviceType).string())
                    .col(
                        ColumnDef::new(Devices::Groups)
                            .json()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(Devices::Location).string())
                    .col(
                        ColumnDef::new(Devices::Status)
                            .string()
                            .not_null()
                            .default("unknown"),
                    )
                    .col(
                        ColumnDef::new(Devices::Disabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Devices::LastPolled).timestamp())
                    .col(ColumnDef::new(Devices::LastDiscovered).timestamp())
                    .col(
                        ColumnDef::new(Devices::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(
                        ColumnDef::new(Devices::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_devices_hostname")
                    .table(Devices::Table)
                    .col(Devices::Hostname)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_devices_disabled")
                    .table(Devices::Table)
                    .col(Devices::Disabled)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Devices::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Devices {
    Table,
    Id,
    Hostname,
    Address,
    SnmpConfig,
    Os,
    Vendor,
    Model,
    Serial,
    Uptime,
    DeviceType,
    Groups,
    Location,
    Status,
    Disabled,
    LastPolled,
    LastDiscovered,
    CreatedAt,
    UpdatedAt,
}

use sea_orm_migration::prelude::*;

use super::m20240601_000001_create_devices::Devices;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ports::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()".to_string()),
                    )
                    .col(ColumnDef::new(Ports::DeviceId).uuid().not_null())
                    .col(ColumnDef::new(Ports::IfIndex).integer().not_null())
                    .col(ColumnDef::new(Ports::Name).string().not_null())
                    .col(ColumnDef::new(Ports::Alias).string())
                    .col(ColumnDef::new(Ports::Type).string().not_null())
                    .col(ColumnDef::new(Ports::Mtu).integer())
                    .col(ColumnDef::new(Ports::SpeedBps).big_unsigned())
                    .col(
                        ColumnDef::new(Ports::AdminStatus)
                            .string()
                            .not_null()
                            .default("down"),
                    )
                    .col(
                        ColumnDef::new(Ports::OperStatus)
                            .string()
                            .not_null()
                            .default("unknown"),
                    )
                    .col(
                        ColumnDef::new(Ports::InOctets)
                            .big_unsigned()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Ports::OutOctets)
                            .big_unsigned()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Ports::InUcast)
                            .big_unsigned()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Ports::OutUcast)
                            .big_unsigned()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Ports::InDiscards)
                            .big_unsigned()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Ports::OutDiscards)
                            .big_unsigned()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Ports::InErrors)
                            .big_unsigned()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Ports::OutErrors)
                            .big_unsigned()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Ports::HcInOctets).big_unsigned())
                    .col(ColumnDef::new(Ports::HcOutOctets).big_unsigned())
                    .col(
                        ColumnDef::new(Ports::Disabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Ports::LastPolled).timestamp())
                    .col(
                        ColumnDef::new(Ports::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(
                        ColumnDef::new(Ports::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ports_device_id")
                            .from(Ports::Table, Ports::DeviceId)
                            .to(Devices::Table, Devices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ports_device_ifindex")
                    .table(Ports::Table)
                    .col(Ports::DeviceId)
                    .col(Ports::IfIndex)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ports::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Ports {
    Table,
    Id,
    DeviceId,
    IfIndex,
    Name,
    Alias,
    Type,
    Mtu,
    SpeedBps,
    AdminStatus,
    OperStatus,
    InOctets,
    OutOctets,
    InUcast,
    OutUcast,
    InDiscards,
    OutDiscards,
    InErrors,
    OutErrors,
    HcInOctets,
    HcOutOctets,
    Disabled,
    LastPolled,
    CreatedAt,
    UpdatedAt,
}

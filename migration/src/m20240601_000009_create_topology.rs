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
                    .table(Topology::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Topology::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()".to_string()),
                    )
                    .col(ColumnDef::new(Topology::DeviceId).uuid().not_null())
                    .col(ColumnDef::new(Topology::LocalPort).string().not_null())
                    .col(ColumnDef::new(Topology::Protocol).string().not_null())
                    .col(ColumnDef::new(Topology::RemoteChassisId).string())
                    .col(ColumnDef::new(Topology::RemotePortId).string().not_null())
                    .col(ColumnDef::new(Topology::RemoteHostname).string().not_null())
                    .col(ColumnDef::new(Topology::RemotePlatform).string())
                    .col(ColumnDef::new(Topology::LastUpdated).timestamp().not_null())
                    .col(
                        ColumnDef::new(Topology::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_topology_device_id")
                            .from(Topology::Table, Topology::DeviceId)
                            .to(Devices::Table, Devices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_topology_dedup")
                    .table(Topology::Table)
                    .col(Topology::DeviceId)
                    .col(Topology::Protocol)
                    .col(Topology::LocalPort)
                    .col(Topology::RemoteHostname)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Topology::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Topology {
    Table,
    Id,
    DeviceId,
    LocalPort,
    Protocol,
    RemoteChassisId,
    RemotePortId,
    RemoteHostname,
    RemotePlatform,
    LastUpdated,
    Active,
}

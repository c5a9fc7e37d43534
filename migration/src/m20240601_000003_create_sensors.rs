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
                    .table(Sensors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sensors::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()".to_string()),
                    )
                    .col(ColumnDef::new(Sensors::DeviceId).uuid().not_null())
                    .col(ColumnDef::new(Sensors::Index).integer().not_null())
                    .col(ColumnDef::new(Sensors::Type).string().not_null())
                    .col(ColumnDef::new(Sensors::Descr).string().not_null())
                    .col(ColumnDef::new(Sensors::Class).string().not_null())
                    .col(ColumnDef::new(Sensors::Oid).string().not_null())
                    .col(ColumnDef::new(Sensors::Value).double())
                    .col(ColumnDef::new(Sensors::PrevValue).double())
                    .col(ColumnDef::new(Sensors::LimitHigh).double())
                    .col(ColumnDef::new(Sensors::LimitLow).double())
                    .col(ColumnDef::new(Sensors::WarnHigh).double())
                    .col(ColumnDef::new(Sensors::WarnLow).double())
                    .col(
                        ColumnDef::new(Sensors::Divisor)
                            .double()
                            .not_null()
                            .default(1.0),
                    )
                    .col(
                        ColumnDef::new(Sensors::Multiplier)
                            .double()
                            .not_null()
                            .default(1.0),
                    )
                    .col(
                        ColumnDef::new(Sensors::Disabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Sensors::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(
                        ColumnDef::new(Sensors::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sensors_device_id")
                            .from(Sensors::Table, Sensors::DeviceId)
                            .to(Devices::Table, Devices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sensors_device_index_type")
                    .table(Sensors::Table)
                    .col(Sensors::DeviceId)
                    .col(Sensors::Index)
                    .col(Sensors::Type)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sensors::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Sensors {
    Table,
    Id,
    DeviceId,
    Index,
    Type,
    Descr,
    Class,
    Oid,
    Value,
    PrevValue,
    LimitHigh,
    LimitLow,
    WarnHigh,
    WarnLow,
    Divisor,
    Multiplier,
    Disabled,
    CreatedAt,
    UpdatedAt,
}

use sea_orm_migration::prelude::*;

use super::{
    m20240601_000005_create_alerts::Alerts, m20240601_000006_create_alert_transports::AlertTransports,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AlertNotifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AlertNotifications::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()".to_string()),
                    )
                    .col(ColumnDef::new(AlertNotifications::AlertId).uuid().not_null())
                    .col(
                        ColumnDef::new(AlertNotifications::TransportId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AlertNotifications::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(AlertNotifications::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(AlertNotifications::LastAttempt).timestamp())
                    .col(ColumnDef::new(AlertNotifications::SentAt).timestamp())
                    .col(ColumnDef::new(AlertNotifications::Error).text())
                    .col(ColumnDef::new(AlertNotifications::Response).text())
                    .col(
                        ColumnDef::new(AlertNotifications::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(
                        ColumnDef::new(AlertNotifications::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notifications_alert_id")
                            .from(AlertNotifications::Table, AlertNotifications::AlertId)
                            .to(Alerts::Table, Alerts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notifications_transport_id")
                            .from(AlertNotifications::Table, AlertNotifications::TransportId)
                            .to(AlertTransports::Table, AlertTransports::Id),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AlertNotifications::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum AlertNotifications {
    Table,
    Id,
    AlertId,
    TransportId,
    Status,
    Attempts,
    LastAttempt,
    SentAt,
    Error,
    Response,
    CreatedAt,
    UpdatedAt,
}

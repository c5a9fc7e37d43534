use sea_orm_migration::prelude::*;

use super::{m20240601_000001_create_devices::Devices, m20240601_000004_create_alert_rules::AlertRules};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alerts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alerts::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()".to_string()),
                    )
                    .col(ColumnDef::new(Alerts::RuleId).uuid().not_null())
                    .col(ColumnDef::new(Alerts::DeviceId).uuid().not_null())
                    .col(ColumnDef::new(Alerts::Severity).string().not_null())
                    .col(
                        ColumnDef::new(Alerts::State)
                            .string()
                            .not_null()
                            .default("open"),
                    )
                    .col(ColumnDef::new(Alerts::Title).string().not_null())
                    .col(ColumnDef::new(Alerts::Message).text().not_null())
                    .col(ColumnDef::new(Alerts::Details).json().not_null())
                    .col(ColumnDef::new(Alerts::FirstOccurred).timestamp().not_null())
                    .col(ColumnDef::new(Alerts::LastOccurred).timestamp().not_null())
                    .col(
                        ColumnDef::new(Alerts::Occurrences)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Alerts::AcknowledgedAt).timestamp())
                    .col(ColumnDef::new(Alerts::AcknowledgedBy).string())
                    .col(ColumnDef::new(Alerts::ResolvedAt).timestamp())
                    .col(ColumnDef::new(Alerts::ResolvedBy).string())
                    .col(ColumnDef::new(Alerts::SuppressedUntil).timestamp())
                    .col(
                        ColumnDef::new(Alerts::NotificationsSent)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Alerts::LastNotificationSent).timestamp())
                    .col(
                        ColumnDef::new(Alerts::EscalationLevel)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Alerts::CorrelationKey).string().not_null())
                    .col(
                        ColumnDef::new(Alerts::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(
                        ColumnDef::new(Alerts::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alerts_rule_id")
                            .from(Alerts::Table, Alerts::RuleId)
                            .to(AlertRules::Table, AlertRules::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alerts_device_id")
                            .from(Alerts::Table, Alerts::DeviceId)
                            .to(Devices::Table, Devices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_alerts_rule_device")
                    .table(Alerts::Table)
                    .col(Alerts::RuleId)
                    .col(Alerts::DeviceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_alerts_state")
                    .table(Alerts::Table)
                    .col(Alerts::State)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alerts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Alerts {
    Table,
    Id,
    RuleId,
    DeviceId,
    Severity,
    State,
    Title,
    Message,
    Details,
    FirstOccurred,
    LastOccurred,
    Occurrences,
    AcknowledgedAt,
    AcknowledgedBy,
    ResolvedAt,
    ResolvedBy,
    SuppressedUntil,
    NotificationsSent,
    LastNotificationSent,
    EscalationLevel,
    CorrelationKey,
    CreatedAt,
    UpdatedAt,
}

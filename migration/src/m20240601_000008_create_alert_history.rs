use sea_orm_migration::prelude::*;

use super::m20240601_000005_create_alerts::Alerts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AlertHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AlertHistory::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()".to_string()),
                    )
                    .col(ColumnDef::new(AlertHistory::AlertId).uuid().not_null())
                    .col(ColumnDef::new(AlertHistory::At).timestamp().not_null())
                    .col(ColumnDef::new(AlertHistory::Actor).string().not_null())
                    .col(ColumnDef::new(AlertHistory::FromState).string())
                    .col(ColumnDef::new(AlertHistory::ToState).string().not_null())
                    .col(ColumnDef::new(AlertHistory::Note).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alert_history_alert_id")
                            .from(AlertHistory::Table, AlertHistory::AlertId)
                            .to(Alerts::Table, Alerts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AlertHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum AlertHistory {
    Table,
    Id,
    AlertId,
    At,
    Actor,
    FromState,
    ToState,
    Note,
}

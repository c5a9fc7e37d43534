use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AlertTransports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AlertTransports::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .extra("DEFAULT gen_random_uuid()".to_string()),
                    )
                    .col(ColumnDef::new(AlertTransports::Name).string().not_null())
                    .col(ColumnDef::new(AlertTransports::Type).string().not_null())
                    .col(
                        ColumnDef::new(AlertTransports::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(AlertTransports::Config).json().not_null())
                    .col(ColumnDef::new(AlertTransports::FilterConditions).json())
                    .col(
                        ColumnDef::new(AlertTransports::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(
                        ColumnDef::new(AlertTransports::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AlertTransports::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum AlertTransports {
    Table,
    Id,
    Name,
    Type,
    Enabled,
    Config,
    FilterConditions,
    CreatedAt,
    UpdatedAt,
}

//! Create test_run table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestRun::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestRun::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestRun::Name).string().not_null())
                    .col(ColumnDef::new(TestRun::Description).string().not_null())
                    .col(
                        ColumnDef::new(TestRun::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestRun::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TestRun {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
}

//! Create test_case_template table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestCaseTemplate::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestCaseTemplate::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestCaseTemplate::Name).string().not_null())
                    .col(
                        ColumnDef::new(TestCaseTemplate::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestCaseTemplate::Precondition)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestCaseTemplate::Postcondition)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestCaseTemplate::Category)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestCaseTemplate::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestCaseTemplate::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TestCaseTemplate {
    Table,
    Id,
    Name,
    Description,
    Precondition,
    Postcondition,
    Category,
    CreatedAt,
}

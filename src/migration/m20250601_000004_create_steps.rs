//! Create step table.

use sea_orm_migration::prelude::*;

use super::m20250601_000003_create_test_cases::TestCase;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Step::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Step::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Step::TestCaseId).big_integer().not_null())
                    .col(ColumnDef::new(Step::Description).string().not_null())
                    .col(ColumnDef::new(Step::ExpectedResult).string().not_null())
                    .col(ColumnDef::new(Step::ActualResult).string())
                    .col(
                        ColumnDef::new(Step::Order)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Step::Table, Step::TestCaseId)
                            .to(TestCase::Table, TestCase::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_step_test_case_id")
                    .table(Step::Table)
                    .col(Step::TestCaseId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Step::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Step {
    Table,
    Id,
    TestCaseId,
    Description,
    ExpectedResult,
    ActualResult,
    Order,
}

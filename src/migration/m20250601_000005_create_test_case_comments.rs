//! Create test_case_comment table.

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
                    .table(TestCaseComment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestCaseComment::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TestCaseComment::TestCaseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestCaseComment::Comment)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestCaseComment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestCaseComment::Table, TestCaseComment::TestCaseId)
                            .to(TestCase::Table, TestCase::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_case_comment_test_case_id")
                    .table(TestCaseComment::Table)
                    .col(TestCaseComment::TestCaseId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestCaseComment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TestCaseComment {
    Table,
    Id,
    TestCaseId,
    Comment,
    CreatedAt,
}

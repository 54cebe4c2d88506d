//! Create test_case_execution table.

use sea_orm_migration::prelude::*;

use super::m20250601_000003_create_test_cases::TestCase;
use super::m20250601_000007_create_test_runs::TestRun;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestCaseExecution::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestCaseExecution::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TestCaseExecution::TestRunId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestCaseExecution::TestCaseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestCaseExecution::Status)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TestCaseExecution::Notes).string().not_null())
                    .col(
                        ColumnDef::new(TestCaseExecution::ExecutedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestCaseExecution::Table, TestCaseExecution::TestRunId)
                            .to(TestRun::Table, TestRun::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestCaseExecution::Table, TestCaseExecution::TestCaseId)
                            .to(TestCase::Table, TestCase::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Recency lookups scan executions per test case ordered by timestamp.
        manager
            .create_index(
                Index::create()
                    .name("idx_test_case_execution_case_executed_at")
                    .table(TestCaseExecution::Table)
                    .col(TestCaseExecution::TestCaseId)
                    .col(TestCaseExecution::ExecutedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_case_execution_run_id")
                    .table(TestCaseExecution::Table)
                    .col(TestCaseExecution::TestRunId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestCaseExecution::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TestCaseExecution {
    Table,
    Id,
    TestRunId,
    TestCaseId,
    Status,
    Notes,
    ExecutedAt,
}

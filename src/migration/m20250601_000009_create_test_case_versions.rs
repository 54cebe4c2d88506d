//! Create test_case_version table.

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
                    .table(TestCaseVersion::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestCaseVersion::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TestCaseVersion::TestCaseId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestCaseVersion::VersionNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TestCaseVersion::Name).string().not_null())
                    .col(
                        ColumnDef::new(TestCaseVersion::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestCaseVersion::Precondition)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestCaseVersion::Postcondition)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestCaseVersion::Comment)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestCaseVersion::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestCaseVersion::Table, TestCaseVersion::TestCaseId)
                            .to(TestCase::Table, TestCase::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Concurrent edits must never claim the same version number.
        manager
            .create_index(
                Index::create()
                    .name("idx_test_case_version_case_number")
                    .table(TestCaseVersion::Table)
                    .col(TestCaseVersion::TestCaseId)
                    .col(TestCaseVersion::VersionNumber)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestCaseVersion::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TestCaseVersion {
    Table,
    Id,
    TestCaseId,
    VersionNumber,
    Name,
    Description,
    Precondition,
    Postcondition,
    Comment,
    CreatedAt,
}

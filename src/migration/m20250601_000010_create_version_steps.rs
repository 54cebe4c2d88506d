//! Create version_step table.

use sea_orm_migration::prelude::*;

use super::m20250601_000009_create_test_case_versions::TestCaseVersion;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VersionStep::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VersionStep::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VersionStep::VersionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VersionStep::Description).string().not_null())
                    .col(
                        ColumnDef::new(VersionStep::ExpectedResult)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VersionStep::Order)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(VersionStep::Table, VersionStep::VersionId)
                            .to(TestCaseVersion::Table, TestCaseVersion::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_version_step_version_id")
                    .table(VersionStep::Table)
                    .col(VersionStep::VersionId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VersionStep::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VersionStep {
    Table,
    Id,
    VersionId,
    Description,
    ExpectedResult,
    Order,
}

//! Create test_case table.

use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_test_case_templates::TestCaseTemplate;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestCase::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestCase::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestCase::Name).string().not_null())
                    .col(ColumnDef::new(TestCase::Description).string().not_null())
                    .col(ColumnDef::new(TestCase::Precondition).string().not_null())
                    .col(ColumnDef::new(TestCase::Postcondition).string().not_null())
                    .col(ColumnDef::new(TestCase::Comment).string().not_null())
                    .col(ColumnDef::new(TestCase::Status).string().not_null())
                    .col(ColumnDef::new(TestCase::Priority).string().not_null())
                    .col(ColumnDef::new(TestCase::Category).string().not_null())
                    .col(ColumnDef::new(TestCase::Tags).string().not_null())
                    .col(ColumnDef::new(TestCase::TemplateId).big_integer())
                    .col(ColumnDef::new(TestCase::RelatedTo).big_integer())
                    .col(
                        ColumnDef::new(TestCase::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestCase::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestCase::Table, TestCase::TemplateId)
                            .to(TestCaseTemplate::Table, TestCaseTemplate::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TestCase::Table, TestCase::RelatedTo)
                            .to(TestCase::Table, TestCase::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_case_created_at")
                    .table(TestCase::Table)
                    .col(TestCase::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestCase::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TestCase {
    Table,
    Id,
    Name,
    Description,
    Precondition,
    Postcondition,
    Comment,
    Status,
    Priority,
    Category,
    Tags,
    TemplateId,
    RelatedTo,
    CreatedAt,
    UpdatedAt,
}

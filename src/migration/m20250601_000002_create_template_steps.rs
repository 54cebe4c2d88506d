//! Create template_step table.

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
                    .table(TemplateStep::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TemplateStep::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TemplateStep::TemplateId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TemplateStep::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TemplateStep::ExpectedResult)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TemplateStep::Order)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TemplateStep::Table, TemplateStep::TemplateId)
                            .to(TestCaseTemplate::Table, TestCaseTemplate::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_template_step_template_id")
                    .table(TemplateStep::Table)
                    .col(TemplateStep::TemplateId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TemplateStep::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TemplateStep {
    Table,
    Id,
    TemplateId,
    Description,
    ExpectedResult,
    Order,
}

//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_test_case_templates;
mod m20250601_000002_create_template_steps;
mod m20250601_000003_create_test_cases;
mod m20250601_000004_create_steps;
mod m20250601_000005_create_test_case_comments;
mod m20250601_000006_create_attachments;
mod m20250601_000007_create_test_runs;
mod m20250601_000008_create_test_case_executions;
mod m20250601_000009_create_test_case_versions;
mod m20250601_000010_create_version_steps;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_test_case_templates::Migration),
            Box::new(m20250601_000002_create_template_steps::Migration),
            Box::new(m20250601_000003_create_test_cases::Migration),
            Box::new(m20250601_000004_create_steps::Migration),
            Box::new(m20250601_000005_create_test_case_comments::Migration),
            Box::new(m20250601_000006_create_attachments::Migration),
            Box::new(m20250601_000007_create_test_runs::Migration),
            Box::new(m20250601_000008_create_test_case_executions::Migration),
            Box::new(m20250601_000009_create_test_case_versions::Migration),
            Box::new(m20250601_000010_create_version_steps::Migration),
        ]
    }
}

//! Immutable snapshot of a test case's narrative fields.
//!
//! Rows are only ever inserted, or removed by cascade with their test case.
//! The unique (test_case_id, version_number) index keeps concurrent edits
//! from claiming the same number.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_case_version")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub test_case_id: i64,
    pub version_number: i32,
    pub name: String,
    pub description: String,
    pub precondition: String,
    pub postcondition: String,
    pub comment: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::test_case::Entity",
        from = "Column::TestCaseId",
        to = "super::test_case::Column::Id",
        on_delete = "Cascade"
    )]
    TestCase,
    #[sea_orm(has_many = "super::version_step::Entity")]
    VersionSteps,
}

impl Related<super::test_case::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TestCase.def()
    }
}

impl Related<super::version_step::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VersionSteps.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

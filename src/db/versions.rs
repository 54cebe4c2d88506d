//! Queries for test case version snapshots.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entity::test_case;
use crate::entity::test_case_version::{self, Entity as TestCaseVersion};
use crate::entity::version_step::{self, Entity as VersionStep};
use crate::error::{AppError, AppResult};

use super::{steps, DbPool};

/// Snapshot the narrative fields and live steps of `case` as the next
/// version. Runs on any connection so it can join the surrounding write
/// transaction.
pub async fn create_snapshot<C: ConnectionTrait>(
    conn: &C,
    case: &test_case::Model,
) -> AppResult<test_case_version::Model> {
    let latest = TestCaseVersion::find()
        .filter(test_case_version::Column::TestCaseId.eq(case.id))
        .order_by_desc(test_case_version::Column::VersionNumber)
        .one(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to read latest version: {}", e)))?;

    let next_number = latest.map(|v| v.version_number + 1).unwrap_or(1);

    let version = test_case_version::ActiveModel {
        test_case_id: Set(case.id),
        version_number: Set(next_number),
        name: Set(case.name.clone()),
        description: Set(case.description.clone()),
        precondition: Set(case.precondition.clone()),
        postcondition: Set(case.postcondition.clone()),
        comment: Set(case.comment.clone()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(|e| AppError::Database(format!("Failed to insert version: {}", e)))?;

    for step in steps::list_steps(conn, case.id).await? {
        version_step::ActiveModel {
            version_id: Set(version.id),
            description: Set(step.description),
            expected_result: Set(step.expected_result),
            order: Set(step.order),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert version step: {}", e)))?;
    }

    Ok(version)
}

/// Whether a failed snapshot write can be retried with a fresh version
/// number. Covers the unique (test_case_id, version_number) index and
/// SQLite's writer lock.
pub fn retryable_conflict(message: &str) -> bool {
    message.contains("UNIQUE constraint")
        || message.contains("database is locked")
        || message.contains("database is busy")
}

impl DbPool {
    /// List a test case's versions newest-first, each with its frozen steps.
    pub async fn list_versions(
        &self,
        test_case_id: i64,
    ) -> AppResult<Vec<(test_case_version::Model, Vec<version_step::Model>)>> {
        let versions = TestCaseVersion::find()
            .filter(test_case_version::Column::TestCaseId.eq(test_case_id))
            .order_by_desc(test_case_version::Column::VersionNumber)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list versions: {}", e)))?;

        if versions.is_empty() {
            return Ok(Vec::new());
        }

        let version_ids: Vec<i64> = versions.iter().map(|v| v.id).collect();
        let steps = VersionStep::find()
            .filter(version_step::Column::VersionId.is_in(version_ids))
            .order_by_asc(version_step::Column::Order)
            .order_by_asc(version_step::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list version steps: {}", e)))?;

        let mut by_version: HashMap<i64, Vec<version_step::Model>> = HashMap::new();
        for step in steps {
            by_version.entry(step.version_id).or_default().push(step);
        }

        Ok(versions
            .into_iter()
            .map(|v| {
                let steps = by_version.remove(&v.id).unwrap_or_default();
                (v, steps)
            })
            .collect())
    }
}

//! Queries for test case comments.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entity::test_case_comment::{self, Entity as TestCaseComment};
use crate::error::{AppError, AppResult};

use super::{test_cases, DbPool};

/// List a test case's comments oldest-first.
pub async fn list_comments<C: ConnectionTrait>(
    conn: &C,
    test_case_id: i64,
) -> AppResult<Vec<test_case_comment::Model>> {
    TestCaseComment::find()
        .filter(test_case_comment::Column::TestCaseId.eq(test_case_id))
        .order_by_asc(test_case_comment::Column::CreatedAt)
        .order_by_asc(test_case_comment::Column::Id)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to list comments: {}", e)))
}

/// Comment counts per test case for the given ids.
pub async fn count_by_test_case<C: ConnectionTrait>(
    conn: &C,
    test_case_ids: &[i64],
) -> AppResult<HashMap<i64, i64>> {
    if test_case_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i64, i64)> = TestCaseComment::find()
        .select_only()
        .column(test_case_comment::Column::TestCaseId)
        .column_as(test_case_comment::Column::Id.count(), "count")
        .filter(test_case_comment::Column::TestCaseId.is_in(test_case_ids.to_vec()))
        .group_by(test_case_comment::Column::TestCaseId)
        .into_tuple()
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to count comments: {}", e)))?;

    Ok(rows.into_iter().collect())
}

impl DbPool {
    /// Add a comment to a test case.
    pub async fn insert_comment(
        &self,
        test_case_id: i64,
        comment: String,
    ) -> AppResult<test_case_comment::Model> {
        if !test_cases::test_case_exists(self.connection(), test_case_id).await? {
            return Err(AppError::NotFound(format!("Test case {}", test_case_id)));
        }

        test_case_comment::ActiveModel {
            test_case_id: Set(test_case_id),
            comment: Set(comment),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert comment: {}", e)))
    }

    /// Remove a comment by id.
    pub async fn delete_comment(&self, id: i64) -> AppResult<()> {
        let existing = TestCaseComment::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get comment: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Comment {}", id)))?;

        TestCaseComment::delete_by_id(existing.id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete comment: {}", e)))?;
        Ok(())
    }
}

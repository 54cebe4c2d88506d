//! Queries for the live steps attached to a test case.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entity::step::{self, Entity as Step};
use crate::error::{AppError, AppResult};
use crate::models::StepInput;

use super::DbPool;

/// Insert a list of steps for a test case. The stored order is the explicit
/// `order` value when given, otherwise the array index.
pub async fn insert_steps<C: ConnectionTrait>(
    conn: &C,
    test_case_id: i64,
    steps: &[StepInput],
) -> AppResult<()> {
    for (index, input) in steps.iter().enumerate() {
        let model = step::ActiveModel {
            test_case_id: Set(test_case_id),
            description: Set(input.description.clone()),
            expected_result: Set(input.expected_result.clone()),
            actual_result: Set(input.actual_result.clone()),
            order: Set(input.effective_order(index)),
            ..Default::default()
        };
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert step: {}", e)))?;
    }
    Ok(())
}

/// Replace the full step list of a test case with `steps`.
pub async fn replace_steps<C: ConnectionTrait>(
    conn: &C,
    test_case_id: i64,
    steps: &[StepInput],
) -> AppResult<()> {
    Step::delete_many()
        .filter(step::Column::TestCaseId.eq(test_case_id))
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to delete steps: {}", e)))?;

    insert_steps(conn, test_case_id, steps).await
}

/// List the steps of one test case ordered by position, ties broken by
/// insertion id.
pub async fn list_steps<C: ConnectionTrait>(
    conn: &C,
    test_case_id: i64,
) -> AppResult<Vec<step::Model>> {
    Step::find()
        .filter(step::Column::TestCaseId.eq(test_case_id))
        .order_by_asc(step::Column::Order)
        .order_by_asc(step::Column::Id)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to list steps: {}", e)))
}

/// List the steps of many test cases in one query, same ordering as
/// [`list_steps`]. Callers group the result by `test_case_id`.
pub async fn list_steps_for_cases<C: ConnectionTrait>(
    conn: &C,
    test_case_ids: &[i64],
) -> AppResult<Vec<step::Model>> {
    if test_case_ids.is_empty() {
        return Ok(Vec::new());
    }

    Step::find()
        .filter(step::Column::TestCaseId.is_in(test_case_ids.to_vec()))
        .order_by_asc(step::Column::Order)
        .order_by_asc(step::Column::Id)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to list steps: {}", e)))
}

impl DbPool {
    /// Record the actual result observed on a single live step.
    ///
    /// An absent `actual_result` leaves the stored value untouched so a
    /// client can re-submit a step without wiping earlier observations.
    pub async fn update_step_actual_result(
        &self,
        step_id: i64,
        actual_result: Option<String>,
    ) -> AppResult<step::Model> {
        let existing = Step::find_by_id(step_id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get step: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Step {}", step_id)))?;

        let Some(value) = actual_result else {
            return Ok(existing);
        };

        let mut active: step::ActiveModel = existing.into();
        active.actual_result = Set(Some(value));
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update step: {}", e)))
    }
}

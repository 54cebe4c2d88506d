//! Queries for individual execution rows. Updating an execution is what
//! moves a test case's status: the case always mirrors its most recent
//! execution across all runs.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::entity::step::{self, Entity as Step};
use crate::entity::test_case::{self, Entity as TestCase};
use crate::entity::test_case_execution::{self, Entity as TestCaseExecution};
use crate::entity::test_run::Entity as TestRun;
use crate::error::{AppError, AppResult};
use crate::models::TestStatus;

use super::DbPool;

/// Observed outcome for one live step, recorded during an execution.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub step_id: i64,
    pub actual_result: Option<String>,
}

/// Partial update for an execution row.
#[derive(Debug, Clone, Default)]
pub struct ExecutionUpdate {
    pub status: Option<TestStatus>,
    pub notes: Option<String>,
    pub steps: Vec<StepResult>,
}

impl DbPool {
    /// Update one execution of a run and propagate its status to the test
    /// case when this row is the case's most recent execution.
    pub async fn update_execution(
        &self,
        run_id: i64,
        execution_id: i64,
        update: ExecutionUpdate,
    ) -> AppResult<test_case_execution::Model> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        let run_count = TestRun::find_by_id(run_id)
            .count(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to check test run: {}", e)))?;
        if run_count == 0 {
            return Err(AppError::NotFound(format!("Test run {}", run_id)));
        }

        let execution = TestCaseExecution::find_by_id(execution_id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get execution: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Execution {}", execution_id)))?;
        if execution.test_run_id != run_id {
            return Err(AppError::NotFound(format!("Execution {}", execution_id)));
        }

        let old_status = execution.status.clone();
        let mut active: test_case_execution::ActiveModel = execution.into();

        if let Some(status) = update.status {
            active.status = Set(status.as_str().to_string());
            // Only a real outcome counts as "executed"; resetting back to
            // Not Run keeps the old timestamp.
            if status.as_str() != old_status && status != TestStatus::NotRun {
                active.executed_at = Set(Utc::now());
            }
        }
        if let Some(notes) = update.notes {
            active.notes = Set(notes);
        }

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to update execution: {}", e)))?;

        // Record observed results on the live steps. The filter on
        // test_case_id drops ids that belong to some other case.
        for step_result in &update.steps {
            let actual = step_result.actual_result.clone().unwrap_or_default();
            Step::update_many()
                .col_expr(step::Column::ActualResult, Expr::value(actual))
                .filter(step::Column::Id.eq(step_result.step_id))
                .filter(step::Column::TestCaseId.eq(updated.test_case_id))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to update step: {}", e)))?;
        }

        let latest = TestCaseExecution::find()
            .filter(test_case_execution::Column::TestCaseId.eq(updated.test_case_id))
            .order_by_desc(test_case_execution::Column::ExecutedAt)
            .order_by_desc(test_case_execution::Column::Id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find latest execution: {}", e)))?;

        if latest.map(|l| l.id) == Some(updated.id) {
            TestCase::update_many()
                .col_expr(test_case::Column::Status, Expr::value(updated.status.clone()))
                .col_expr(test_case::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(test_case::Column::Id.eq(updated.test_case_id))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to propagate status: {}", e)))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;
        Ok(updated)
    }

    /// Remove one execution row. The owning test case keeps whatever status
    /// it already carries.
    pub async fn delete_execution(&self, run_id: i64, execution_id: i64) -> AppResult<()> {
        let run_count = TestRun::find_by_id(run_id)
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to check test run: {}", e)))?;
        if run_count == 0 {
            return Err(AppError::NotFound(format!("Test run {}", run_id)));
        }

        let execution = TestCaseExecution::find_by_id(execution_id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get execution: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Execution {}", execution_id)))?;
        if execution.test_run_id != run_id {
            return Err(AppError::NotFound(format!("Execution {}", execution_id)));
        }

        TestCaseExecution::delete_by_id(execution.id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete execution: {}", e)))?;
        Ok(())
    }
}

//! Queries for test runs and their execution rows.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

use crate::entity::step;
use crate::entity::test_case::{self, Entity as TestCase};
use crate::entity::test_case_execution::{self, Entity as TestCaseExecution};
use crate::entity::test_run::{self, Entity as TestRun};
use crate::error::{AppError, AppResult};
use crate::models::TestStatus;

use super::{steps, DbPool};

/// Fields for a new test run. Every listed test case gets a pending
/// execution row.
#[derive(Debug, Clone)]
pub struct NewTestRun {
    pub name: String,
    pub description: String,
    pub test_case_ids: Vec<i64>,
}

/// One execution joined with its test case and the case's live steps.
pub struct RunExecution {
    pub execution: test_case_execution::Model,
    pub test_case: test_case::Model,
    pub steps: Vec<step::Model>,
}

impl DbPool {
    /// Create a run and one `Not Run` execution per test case in a single
    /// transaction. Any unknown test case id fails the whole request.
    pub async fn insert_test_run(&self, new: NewTestRun) -> AppResult<test_run::Model> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        if !new.test_case_ids.is_empty() {
            let known: HashSet<i64> = TestCase::find()
                .select_only()
                .column(test_case::Column::Id)
                .filter(test_case::Column::Id.is_in(new.test_case_ids.clone()))
                .into_tuple::<i64>()
                .all(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to check test cases: {}", e)))?
                .into_iter()
                .collect();

            if let Some(missing) = new.test_case_ids.iter().find(|id| !known.contains(id)) {
                return Err(AppError::NotFound(format!("Test case {}", missing)));
            }
        }

        let run = test_run::ActiveModel {
            name: Set(new.name),
            description: Set(new.description),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert test run: {}", e)))?;

        for test_case_id in &new.test_case_ids {
            test_case_execution::ActiveModel {
                test_run_id: Set(run.id),
                test_case_id: Set(*test_case_id),
                status: Set(TestStatus::NotRun.as_str().to_string()),
                notes: Set(String::new()),
                executed_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert execution: {}", e)))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;
        Ok(run)
    }

    /// List runs newest-first with their execution counts.
    pub async fn list_test_runs(&self) -> AppResult<Vec<(test_run::Model, i64)>> {
        let runs = TestRun::find()
            .order_by_desc(test_run::Column::CreatedAt)
            .order_by_desc(test_run::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list test runs: {}", e)))?;

        if runs.is_empty() {
            return Ok(Vec::new());
        }

        let run_ids: Vec<i64> = runs.iter().map(|r| r.id).collect();
        let counts: HashMap<i64, i64> = TestCaseExecution::find()
            .select_only()
            .column(test_case_execution::Column::TestRunId)
            .column_as(test_case_execution::Column::Id.count(), "count")
            .filter(test_case_execution::Column::TestRunId.is_in(run_ids))
            .group_by(test_case_execution::Column::TestRunId)
            .into_tuple::<(i64, i64)>()
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count executions: {}", e)))?
            .into_iter()
            .collect();

        Ok(runs
            .into_iter()
            .map(|r| {
                let count = counts.get(&r.id).copied().unwrap_or(0);
                (r, count)
            })
            .collect())
    }

    /// Fetch one run.
    pub async fn get_test_run(&self, id: i64) -> AppResult<Option<test_run::Model>> {
        TestRun::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get test run: {}", e)))
    }

    /// Delete a run; its executions cascade with it.
    pub async fn delete_test_run(&self, id: i64) -> AppResult<()> {
        let existing = self
            .get_test_run(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test run {}", id)))?;

        TestRun::delete_by_id(existing.id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete test run: {}", e)))?;
        Ok(())
    }

    /// Executions of a run joined with their test cases and live steps.
    pub async fn list_run_executions(&self, run_id: i64) -> AppResult<Vec<RunExecution>> {
        let executions = TestCaseExecution::find()
            .filter(test_case_execution::Column::TestRunId.eq(run_id))
            .order_by_asc(test_case_execution::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list executions: {}", e)))?;

        if executions.is_empty() {
            return Ok(Vec::new());
        }

        let case_ids: Vec<i64> = executions
            .iter()
            .map(|e| e.test_case_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let cases: HashMap<i64, test_case::Model> = TestCase::find()
            .filter(test_case::Column::Id.is_in(case_ids.clone()))
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list test cases: {}", e)))?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut steps_by_case: HashMap<i64, Vec<step::Model>> = HashMap::new();
        for step in steps::list_steps_for_cases(self.connection(), &case_ids).await? {
            steps_by_case
                .entry(step.test_case_id)
                .or_default()
                .push(step);
        }

        let mut result = Vec::with_capacity(executions.len());
        for execution in executions {
            let Some(test_case) = cases.get(&execution.test_case_id).cloned() else {
                tracing::warn!(
                    execution_id = execution.id,
                    test_case_id = execution.test_case_id,
                    "execution references a missing test case"
                );
                continue;
            };
            let steps = steps_by_case
                .get(&test_case.id)
                .cloned()
                .unwrap_or_default();
            result.push(RunExecution {
                execution,
                test_case,
                steps,
            });
        }
        Ok(result)
    }
}

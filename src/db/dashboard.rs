//! Aggregate queries behind the dashboard endpoint.

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::entity::test_case::{self, Entity as TestCase};
use crate::entity::test_case_execution::{self, Entity as TestCaseExecution};
use crate::error::{AppError, AppResult};
use crate::models::{Priority, TestStatus};

use super::DbPool;

/// How many executions the dashboard lists.
const RECENT_LIMIT: u64 = 10;

/// One recent execution with the owning test case's name resolved.
pub struct RecentExecution {
    pub execution: test_case_execution::Model,
    pub test_case_name: String,
}

/// Everything the dashboard shows in one bundle.
pub struct DashboardCounts {
    pub total_cases: u64,
    pub status_counts: Vec<(TestStatus, u64)>,
    pub priority_counts: Vec<(Priority, u64)>,
    pub recent_executions: Vec<RecentExecution>,
}

impl DbPool {
    /// Collect the dashboard aggregates. Every status and priority appears
    /// in the count lists even when zero.
    pub async fn dashboard_counts(&self) -> AppResult<DashboardCounts> {
        let total_cases = TestCase::find()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count test cases: {}", e)))?;

        let mut status_counts = Vec::with_capacity(TestStatus::ALL.len());
        for status in TestStatus::ALL {
            let count = TestCase::find()
                .filter(test_case::Column::Status.eq(status.as_str()))
                .count(self.connection())
                .await
                .map_err(|e| AppError::Database(format!("Failed to count by status: {}", e)))?;
            status_counts.push((status, count));
        }

        let mut priority_counts = Vec::with_capacity(Priority::ALL.len());
        for priority in Priority::ALL {
            let count = TestCase::find()
                .filter(test_case::Column::Priority.eq(priority.as_str()))
                .count(self.connection())
                .await
                .map_err(|e| AppError::Database(format!("Failed to count by priority: {}", e)))?;
            priority_counts.push((priority, count));
        }

        let recent_executions = TestCaseExecution::find()
            .find_also_related(TestCase)
            .order_by_desc(test_case_execution::Column::ExecutedAt)
            .order_by_desc(test_case_execution::Column::Id)
            .limit(RECENT_LIMIT)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list recent executions: {}", e)))?
            .into_iter()
            .map(|(execution, case)| RecentExecution {
                execution,
                test_case_name: case.map(|c| c.name).unwrap_or_default(),
            })
            .collect();

        Ok(DashboardCounts {
            total_cases,
            status_counts,
            priority_counts,
            recent_executions,
        })
    }
}

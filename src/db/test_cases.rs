//! Queries for test cases: CRUD, catalog filters and bulk writes.

use std::collections::BTreeSet;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entity::attachment::{self, Entity as Attachment};
use crate::entity::test_case::{self, Entity as TestCase};
use crate::error::{AppError, AppResult};
use crate::models::{Priority, StepInput, TestStatus};

use super::{steps, templates, versions, DbPool};

/// Attempts per update before a version-number conflict is surfaced.
const UPDATE_ATTEMPTS: u32 = 3;

/// Fields for a new test case, already validated against the closed
/// status/priority vocabularies.
#[derive(Debug, Clone)]
pub struct NewTestCase {
    pub name: String,
    pub description: String,
    pub precondition: String,
    pub postcondition: String,
    pub comment: String,
    pub status: TestStatus,
    pub priority: Priority,
    pub category: String,
    pub tags: String,
    pub template_id: Option<i64>,
    pub related_to: Option<i64>,
    pub steps: Vec<StepInput>,
}

/// Partial update; `None` keeps the stored value. `related_to` is doubly
/// optional so an explicit JSON `null` can clear the link.
#[derive(Debug, Clone, Default)]
pub struct TestCaseUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub precondition: Option<String>,
    pub postcondition: Option<String>,
    pub comment: Option<String>,
    pub status: Option<TestStatus>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub related_to: Option<Option<i64>>,
    pub steps: Option<Vec<StepInput>>,
}

/// Catalog filters. Status, priority and category match exactly; `search`
/// matches name or description substrings and `tag` matches a substring of
/// the comma-separated tags field.
#[derive(Debug, Clone, Default)]
pub struct TestCaseFilter {
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
}

/// Whether a test case row exists.
pub async fn test_case_exists<C: ConnectionTrait>(conn: &C, id: i64) -> AppResult<bool> {
    let count = TestCase::find_by_id(id)
        .count(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to check test case: {}", e)))?;
    Ok(count > 0)
}

/// Insert one case row plus its steps, without snapshots or reference
/// checks. Shared by the create and import paths.
async fn insert_case_row<C: ConnectionTrait>(
    conn: &C,
    new: NewTestCase,
) -> AppResult<test_case::Model> {
    let now = Utc::now();
    let case = test_case::ActiveModel {
        name: Set(new.name),
        description: Set(new.description),
        precondition: Set(new.precondition),
        postcondition: Set(new.postcondition),
        comment: Set(new.comment),
        status: Set(new.status.as_str().to_string()),
        priority: Set(new.priority.as_str().to_string()),
        category: Set(new.category),
        tags: Set(new.tags),
        template_id: Set(new.template_id),
        related_to: Set(new.related_to),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(|e| AppError::Database(format!("Failed to insert test case: {}", e)))?;

    steps::insert_steps(conn, case.id, &new.steps).await?;
    Ok(case)
}

impl DbPool {
    /// Insert a test case with its steps and the initial version snapshot in
    /// one transaction.
    pub async fn insert_test_case(&self, new: NewTestCase) -> AppResult<test_case::Model> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        if let Some(template_id) = new.template_id {
            if !templates::template_exists(&txn, template_id).await? {
                return Err(AppError::NotFound(format!("Template {}", template_id)));
            }
        }
        if let Some(related_id) = new.related_to {
            if !test_case_exists(&txn, related_id).await? {
                return Err(AppError::NotFound(format!("Test case {}", related_id)));
            }
        }

        let case = insert_case_row(&txn, new).await?;
        versions::create_snapshot(&txn, &case).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;
        Ok(case)
    }

    /// Insert many imported cases in one transaction. Imported rows get no
    /// version snapshot; their history starts with the first edit.
    pub async fn import_test_cases(&self, cases: Vec<NewTestCase>) -> AppResult<u64> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        let mut imported = 0u64;
        for new in cases {
            insert_case_row(&txn, new).await?;
            imported += 1;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;
        Ok(imported)
    }

    /// Fetch a single test case.
    pub async fn get_test_case(&self, id: i64) -> AppResult<Option<test_case::Model>> {
        TestCase::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get test case: {}", e)))
    }

    /// List test cases matching `filter`, newest first.
    pub async fn list_test_cases(&self, filter: &TestCaseFilter) -> AppResult<Vec<test_case::Model>> {
        let mut query = TestCase::find();

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(test_case::Column::Name.contains(search))
                    .add(test_case::Column::Description.contains(search)),
            );
        }
        if let Some(status) = filter.status.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(test_case::Column::Status.eq(status));
        }
        if let Some(priority) = filter.priority.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(test_case::Column::Priority.eq(priority));
        }
        if let Some(category) = filter.category.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(test_case::Column::Category.eq(category));
        }
        if let Some(tag) = filter.tag.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(test_case::Column::Tags.contains(tag));
        }

        query
            .order_by_desc(test_case::Column::CreatedAt)
            .order_by_desc(test_case::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list test cases: {}", e)))
    }

    /// Apply a partial update. Retries the whole transaction when two
    /// concurrent edits race for the same version number.
    pub async fn update_test_case(
        &self,
        id: i64,
        update: &TestCaseUpdate,
    ) -> AppResult<test_case::Model> {
        let mut attempt = 1;
        loop {
            match self.try_update_test_case(id, update).await {
                Err(AppError::Database(message))
                    if attempt < UPDATE_ATTEMPTS && versions::retryable_conflict(&message) =>
                {
                    tracing::debug!(attempt, test_case_id = id, "retrying update after version conflict");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn try_update_test_case(
        &self,
        id: i64,
        update: &TestCaseUpdate,
    ) -> AppResult<test_case::Model> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        let existing = TestCase::find_by_id(id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to get test case: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Test case {}", id)))?;

        if let Some(Some(related_id)) = update.related_to {
            if related_id == id {
                return Err(AppError::InvalidInput(
                    "A test case cannot be related to itself".to_string(),
                ));
            }
            if !test_case_exists(&txn, related_id).await? {
                return Err(AppError::NotFound(format!("Test case {}", related_id)));
            }
        }

        // A version is cut when the request renames or re-describes the case,
        // or rewrites its steps. Identical step content still counts.
        let cut_version = update.name.as_ref().is_some_and(|n| *n != existing.name)
            || update
                .description
                .as_ref()
                .is_some_and(|d| *d != existing.description)
            || update.steps.is_some();

        let mut active: test_case::ActiveModel = existing.into();
        if let Some(name) = &update.name {
            active.name = Set(name.clone());
        }
        if let Some(description) = &update.description {
            active.description = Set(description.clone());
        }
        if let Some(precondition) = &update.precondition {
            active.precondition = Set(precondition.clone());
        }
        if let Some(postcondition) = &update.postcondition {
            active.postcondition = Set(postcondition.clone());
        }
        if let Some(comment) = &update.comment {
            active.comment = Set(comment.clone());
        }
        if let Some(status) = update.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(priority) = update.priority {
            active.priority = Set(priority.as_str().to_string());
        }
        if let Some(category) = &update.category {
            active.category = Set(category.clone());
        }
        if let Some(tags) = &update.tags {
            active.tags = Set(tags.clone());
        }
        if let Some(related_to) = update.related_to {
            active.related_to = Set(related_to);
        }
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to update test case: {}", e)))?;

        if let Some(steps) = &update.steps {
            steps::replace_steps(&txn, id, steps).await?;
        }

        if cut_version {
            versions::create_snapshot(&txn, &updated).await?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;
        Ok(updated)
    }

    /// Delete a test case. Children and version snapshots go with it via
    /// schema cascades; returns the stored attachment names so the caller
    /// can remove the files afterwards.
    pub async fn delete_test_case(&self, id: i64) -> AppResult<Vec<String>> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        if !test_case_exists(&txn, id).await? {
            return Err(AppError::NotFound(format!("Test case {}", id)));
        }

        let stored_names: Vec<String> = Attachment::find()
            .select_only()
            .column(attachment::Column::StoredName)
            .filter(attachment::Column::TestCaseId.eq(id))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to list attachments: {}", e)))?;

        TestCase::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete test case: {}", e)))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;
        Ok(stored_names)
    }

    /// Delete many test cases at once. Unknown ids are ignored. Returns the
    /// stored attachment names of every deleted case.
    pub async fn bulk_delete_test_cases(&self, ids: &[i64]) -> AppResult<Vec<String>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        let stored_names: Vec<String> = Attachment::find()
            .select_only()
            .column(attachment::Column::StoredName)
            .filter(attachment::Column::TestCaseId.is_in(ids.to_vec()))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to list attachments: {}", e)))?;

        TestCase::delete_many()
            .filter(test_case::Column::Id.is_in(ids.to_vec()))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete test cases: {}", e)))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;
        Ok(stored_names)
    }

    /// Set the status on many test cases, stamping `updated_at`.
    pub async fn bulk_update_status(&self, ids: &[i64], status: TestStatus) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = TestCase::update_many()
            .col_expr(test_case::Column::Status, Expr::value(status.as_str()))
            .col_expr(test_case::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(test_case::Column::Id.is_in(ids.to_vec()))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update statuses: {}", e)))?;
        Ok(result.rows_affected)
    }

    /// Set the priority on many test cases, stamping `updated_at`.
    pub async fn bulk_update_priority(&self, ids: &[i64], priority: Priority) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = TestCase::update_many()
            .col_expr(test_case::Column::Priority, Expr::value(priority.as_str()))
            .col_expr(test_case::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(test_case::Column::Id.is_in(ids.to_vec()))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update priorities: {}", e)))?;
        Ok(result.rows_affected)
    }

    /// Distinct non-empty categories, sorted.
    pub async fn distinct_categories(&self) -> AppResult<Vec<String>> {
        TestCase::find()
            .select_only()
            .column(test_case::Column::Category)
            .distinct()
            .filter(test_case::Column::Category.ne(""))
            .order_by_asc(test_case::Column::Category)
            .into_tuple()
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list categories: {}", e)))
    }

    /// Distinct tags across all cases. Tags are stored comma-separated, so
    /// the split and dedup happen here rather than in SQL.
    pub async fn distinct_tags(&self) -> AppResult<Vec<String>> {
        let rows: Vec<String> = TestCase::find()
            .select_only()
            .column(test_case::Column::Tags)
            .filter(test_case::Column::Tags.ne(""))
            .into_tuple()
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list tags: {}", e)))?;

        let mut tags = BTreeSet::new();
        for row in rows {
            for tag in row.split(',') {
                let tag = tag.trim();
                if !tag.is_empty() {
                    tags.insert(tag.to_string());
                }
            }
        }
        Ok(tags.into_iter().collect())
    }

    /// Cases whose `related_to` points at `id`, for the detail view.
    pub async fn list_related_cases(&self, id: i64) -> AppResult<Vec<test_case::Model>> {
        TestCase::find()
            .filter(test_case::Column::RelatedTo.eq(id))
            .order_by_asc(test_case::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list related cases: {}", e)))
    }
}

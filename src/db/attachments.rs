//! Queries for attachment records. File bytes live on disk; see
//! `services::storage`.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entity::attachment::{self, Entity as Attachment};
use crate::error::{AppError, AppResult};

use super::DbPool;

/// New attachment record; the file is already on disk under `stored_name`.
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub test_case_id: i64,
    pub filename: String,
    pub stored_name: String,
    pub file_type: String,
}

/// List a test case's attachments oldest-first.
pub async fn list_attachments<C: ConnectionTrait>(
    conn: &C,
    test_case_id: i64,
) -> AppResult<Vec<attachment::Model>> {
    Attachment::find()
        .filter(attachment::Column::TestCaseId.eq(test_case_id))
        .order_by_asc(attachment::Column::CreatedAt)
        .order_by_asc(attachment::Column::Id)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to list attachments: {}", e)))
}

/// Attachment counts per test case for the given ids.
pub async fn count_by_test_case<C: ConnectionTrait>(
    conn: &C,
    test_case_ids: &[i64],
) -> AppResult<HashMap<i64, i64>> {
    if test_case_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i64, i64)> = Attachment::find()
        .select_only()
        .column(attachment::Column::TestCaseId)
        .column_as(attachment::Column::Id.count(), "count")
        .filter(attachment::Column::TestCaseId.is_in(test_case_ids.to_vec()))
        .group_by(attachment::Column::TestCaseId)
        .into_tuple()
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to count attachments: {}", e)))?;

    Ok(rows.into_iter().collect())
}

impl DbPool {
    /// Record a stored upload.
    pub async fn insert_attachment(&self, new: NewAttachment) -> AppResult<attachment::Model> {
        attachment::ActiveModel {
            test_case_id: Set(new.test_case_id),
            filename: Set(new.filename),
            stored_name: Set(new.stored_name),
            file_type: Set(new.file_type),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.connection())
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert attachment: {}", e)))
    }

    /// Fetch one attachment record.
    pub async fn get_attachment(&self, id: i64) -> AppResult<Option<attachment::Model>> {
        Attachment::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get attachment: {}", e)))
    }

    /// Remove an attachment record, returning it so the caller can delete
    /// the file on disk.
    pub async fn delete_attachment(&self, id: i64) -> AppResult<attachment::Model> {
        let existing = Attachment::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get attachment: {}", e)))?
            .ok_or_else(|| AppError::NotFound(format!("Attachment {}", id)))?;

        Attachment::delete_by_id(existing.id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete attachment: {}", e)))?;
        Ok(existing)
    }
}

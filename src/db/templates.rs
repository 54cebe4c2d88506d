//! Queries for test case templates and their step outlines.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::entity::template_step::{self, Entity as TemplateStep};
use crate::entity::test_case_template::{self, Entity as TestCaseTemplate};
use crate::error::{AppError, AppResult};
use crate::models::StepInput;

use super::DbPool;

/// Fields for a new template.
#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub name: String,
    pub description: String,
    pub precondition: String,
    pub postcondition: String,
    pub category: String,
    pub steps: Vec<StepInput>,
}

/// Whether a template row exists.
pub async fn template_exists<C: ConnectionTrait>(conn: &C, id: i64) -> AppResult<bool> {
    let count = TestCaseTemplate::find_by_id(id)
        .count(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to check template: {}", e)))?;
    Ok(count > 0)
}

impl DbPool {
    /// Insert a template and its step outline in one transaction.
    pub async fn insert_template(&self, new: NewTemplate) -> AppResult<test_case_template::Model> {
        let txn = self
            .connection()
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to start transaction: {}", e)))?;

        let template = test_case_template::ActiveModel {
            name: Set(new.name),
            description: Set(new.description),
            precondition: Set(new.precondition),
            postcondition: Set(new.postcondition),
            category: Set(new.category),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert template: {}", e)))?;

        for (index, input) in new.steps.iter().enumerate() {
            template_step::ActiveModel {
                template_id: Set(template.id),
                description: Set(input.description.clone()),
                expected_result: Set(input.expected_result.clone()),
                order: Set(input.effective_order(index)),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert template step: {}", e)))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;
        Ok(template)
    }

    /// List every template with its steps ascending.
    pub async fn list_templates(
        &self,
    ) -> AppResult<Vec<(test_case_template::Model, Vec<template_step::Model>)>> {
        let templates = TestCaseTemplate::find()
            .order_by_asc(test_case_template::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list templates: {}", e)))?;

        if templates.is_empty() {
            return Ok(Vec::new());
        }

        let template_ids: Vec<i64> = templates.iter().map(|t| t.id).collect();
        let steps = TemplateStep::find()
            .filter(template_step::Column::TemplateId.is_in(template_ids))
            .order_by_asc(template_step::Column::Order)
            .order_by_asc(template_step::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list template steps: {}", e)))?;

        let mut by_template: HashMap<i64, Vec<template_step::Model>> = HashMap::new();
        for step in steps {
            by_template.entry(step.template_id).or_default().push(step);
        }

        Ok(templates
            .into_iter()
            .map(|t| {
                let steps = by_template.remove(&t.id).unwrap_or_default();
                (t, steps)
            })
            .collect())
    }

    /// Delete a template. Its steps cascade; test cases created from it keep
    /// running with `template_id` set to NULL by the schema.
    pub async fn delete_template(&self, id: i64) -> AppResult<()> {
        if !template_exists(self.connection(), id).await? {
            return Err(AppError::NotFound(format!("Template {}", id)));
        }

        TestCaseTemplate::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete template: {}", e)))?;
        Ok(())
    }
}

//! Step payloads shared by the test case endpoints, the importer and the
//! database layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::step;

/// Incoming step definition.
///
/// A `steps` array on a create or update request replaces the full set of
/// live steps. An explicit `order` wins over the array position.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StepInput {
    /// What the tester does
    pub description: String,
    /// What should happen
    #[serde(default)]
    pub expected_result: String,
    /// What actually happened (kept when re-submitting recorded steps)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_result: Option<String>,
    /// Explicit position; defaults to the array index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl StepInput {
    /// Resolve the effective order for a step at `index` in its array.
    pub fn effective_order(&self, index: usize) -> i32 {
        self.order.unwrap_or(index as i32)
    }
}

/// A live step as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StepResponse {
    /// Step ID
    pub id: i64,
    /// What the tester does
    pub description: String,
    /// What should happen
    pub expected_result: String,
    /// What actually happened; empty until an execution records it
    pub actual_result: String,
    /// Position within the test case
    pub order: i32,
}

impl From<step::Model> for StepResponse {
    fn from(model: step::Model) -> Self {
        StepResponse {
            id: model.id,
            description: model.description,
            expected_result: model.expected_result,
            actual_result: model.actual_result.unwrap_or_default(),
            order: model.order,
        }
    }
}

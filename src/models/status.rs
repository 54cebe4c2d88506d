//! Closed status and priority vocabularies shared across the API surface.
//!
//! Both enums serialize to their exact display strings; any other string in
//! a JSON body fails deserialization and surfaces as a 400.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Execution status of a test case or a single execution record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum TestStatus {
    #[default]
    #[serde(rename = "Not Run")]
    NotRun,
    Passed,
    Failed,
    Blocked,
    Skipped,
}

impl TestStatus {
    /// Every status value, in dashboard display order.
    pub const ALL: [TestStatus; 5] = [
        Self::NotRun,
        Self::Passed,
        Self::Failed,
        Self::Blocked,
        Self::Skipped,
    ];

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotRun => "Not Run",
            Self::Passed => "Passed",
            Self::Failed => "Failed",
            Self::Blocked => "Blocked",
            Self::Skipped => "Skipped",
        }
    }

    /// Parse from string representation; `None` for anything outside the set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Not Run" => Some(Self::NotRun),
            "Passed" => Some(Self::Passed),
            "Failed" => Some(Self::Failed),
            "Blocked" => Some(Self::Blocked),
            "Skipped" => Some(Self::Skipped),
            _ => None,
        }
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Priority of a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Every priority value, in dashboard display order.
    pub const ALL: [Priority; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Parse from string representation; `None` for anything outside the set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Critical" => Some(Self::Critical),
            "High" => Some(Self::High),
            "Medium" => Some(Self::Medium),
            "Low" => Some(Self::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Planning entities as supplied by the hosting application.
//!
//! Initiatives and work packages are stored independently and joined by
//! initiative identifier at build time. Dates are kept as raw strings so a
//! malformed value never prevents a snapshot from loading; the task graph
//! builder decides what to do with them.

use serde::{Deserialize, Serialize};

/// A top-level planning unit with a target timeframe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initiative {
    /// Stable unique identifier. Empty means structurally missing.
    #[serde(rename = "initiativeId", default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Explicit start date (`YYYY-MM-DD` or `YYYY/MM/DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Target due date (`YYYY-MM-DD` or `YYYY/MM/DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_due_date: Option<String>,
    #[serde(default)]
    pub status: String,
}

impl Initiative {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn with_dates(mut self, start: Option<&str>, due: Option<&str>) -> Self {
        self.start_date = start.map(str::to_string);
        self.target_due_date = due.map(str::to_string);
        self
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }
}

/// A scheduled sub-unit of an initiative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkPackage {
    /// Unique identifier. Empty means structurally missing.
    #[serde(rename = "workPackageId", default)]
    pub id: String,
    /// Identifier of the owning initiative.
    #[serde(default)]
    pub initiative_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: String,
    /// Ordered identifiers of other work packages this one depends on.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl WorkPackage {
    pub fn new(id: &str, initiative_id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            initiative_id: initiative_id.to_string(),
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn with_dates(mut self, start: Option<&str>, end: Option<&str>) -> Self {
        self.start_date = start.map(str::to_string);
        self.end_date = end.map(str::to_string);
        self
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }

    pub fn depends_on(mut self, ids: &[&str]) -> Self {
        self.dependencies = ids.iter().map(|id| id.to_string()).collect();
        self
    }
}

/// A point-in-time copy of the planning data, as read from a plan file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSnapshot {
    #[serde(default)]
    pub initiatives: Vec<Initiative>,
    #[serde(default)]
    pub work_packages: Vec<WorkPackage>,
}

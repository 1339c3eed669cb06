//! Renderer-neutral task nodes.
//!
//! A `TaskNode` is the projection of an initiative or a work package that
//! renderers draw. Nodes are pure derived state: they are rebuilt from the
//! planning snapshot on every render request and never mutated in place.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of planning entity a task node was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    Initiative,
    WorkPackage,
}

impl SourceKind {
    /// Prefix used to keep node identifiers unique across source kinds.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            SourceKind::Initiative => "init",
            SourceKind::WorkPackage => "wp",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Initiative => write!(f, "initiative"),
            SourceKind::WorkPackage => write!(f, "workPackage"),
        }
    }
}

/// Synthetic, globally unique task node identifier (`init-<id>` / `wp-<id>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(kind: SourceKind, source_id: &str) -> Self {
        Self(format!("{}-{}", kind.id_prefix(), source_id))
    }

    pub fn initiative(source_id: &str) -> Self {
        Self::new(SourceKind::Initiative, source_id)
    }

    pub fn work_package(source_id: &str) -> Self {
        Self::new(SourceKind::WorkPackage, source_id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single bar in a timeline view.
///
/// Invariants upheld by the builder: `start <= end`, every entry of
/// `dependencies` names another node of the same build output, and ids
/// are unique within one output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNode {
    pub id: TaskId,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Completion percentage, always one of 0, 10, 50, 100.
    pub progress: u8,
    pub dependencies: Vec<TaskId>,
    pub kind: SourceKind,
    /// Identifier of the originating initiative or work package.
    pub source_id: String,
    /// Owning initiative for work-package nodes.
    pub initiative_id: Option<String>,
    /// Free-text status carried through for renderer styling.
    pub status: String,
    /// Set on initiative nodes that have at least one work package emitted.
    pub has_work_packages: bool,
}

impl TaskNode {
    /// Length of the bar in days; zero for single-day intervals.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn is_initiative(&self) -> bool {
        self.kind == SourceKind::Initiative
    }
}

//! Core planning domain.
//!
//! Planning entities, the renderer-neutral task nodes derived from them,
//! and the pure functions that derive them: date fallback, progress
//! classification, dependency sanitization and graph construction.

pub mod builder;
pub mod dates;
pub mod entity;
pub mod graph;
pub mod progress;
pub mod sanitize;
pub mod schedule;
pub mod task;

pub use builder::{build, TaskGraphBuilder};
pub use dates::DateSpan;
pub use entity::{Initiative, PlanSnapshot, WorkPackage};
pub use graph::DependencyGraph;
pub use sanitize::{normalize_id, sanitize, ElementIds};
pub use schedule::{auto_schedule, scheduling_conflicts, ScheduleReport, SchedulingConflict};
pub use task::{SourceKind, TaskId, TaskNode};

//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - A representative plan snapshot as JSON and as entities
//! - Shared in-memory surfaces
//! - Fixed-offset timestamps

use std::sync::{Arc, Mutex};

use chrono::{DateTime, FixedOffset, NaiveDate};
use tempfile::TempDir;

use planline::core::{PlanSnapshot, TaskGraphBuilder, TaskNode};
use planline::render::MemorySurface;

pub const YEAR: i32 = 2025;

/// Two initiatives, three work packages, one dangling dependency and one
/// inverted range.
pub const PLAN_JSON: &str = r#"{
    "initiatives": [
        {
            "initiativeId": "INIT-1",
            "title": "Payments platform",
            "startDate": "2025-02-01",
            "targetDueDate": "2025-09-30",
            "status": "In Progress"
        },
        {
            "initiativeId": "INIT-2",
            "title": "Mobile refresh",
            "status": "Planned"
        }
    ],
    "workPackages": [
        {
            "workPackageId": "WP-A",
            "initiativeId": "INIT-1",
            "title": "Ledger service",
            "startDate": "2025-02-01",
            "endDate": "2025-04-15",
            "status": "Done"
        },
        {
            "workPackageId": "WP-B",
            "initiativeId": "INIT-1",
            "title": "Checkout API",
            "startDate": "2025-04-01",
            "endDate": "2025-03-01",
            "status": "Blocked",
            "dependencies": ["WP-A", "WP-GONE"]
        },
        {
            "workPackageId": "WP-C",
            "initiativeId": "INIT-2",
            "title": "Design system",
            "dependencies": ["WP-B"]
        }
    ]
}"#;

pub fn plan() -> PlanSnapshot {
    serde_json::from_str(PLAN_JSON).expect("fixture plan parses")
}

pub fn tasks() -> Vec<TaskNode> {
    let plan = plan();
    TaskGraphBuilder::new(YEAR).build(&plan.initiatives, &plan.work_packages)
}

pub fn surface() -> Arc<Mutex<MemorySurface>> {
    MemorySurface::new().shared()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid fixture date")
}

pub fn at(rfc3339: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(rfc3339).expect("valid fixture timestamp")
}

/// A temporary directory holding `plan.json`.
pub struct PlanFile {
    pub temp_dir: TempDir,
    pub path: std::path::PathBuf,
}

impl PlanFile {
    pub fn new(json: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("plan.json");
        std::fs::write(&path, json).expect("Failed to write plan");
        Self { temp_dir, path }
    }

    pub fn read(&self) -> PlanSnapshot {
        let text = std::fs::read_to_string(&self.path).expect("Failed to read plan");
        serde_json::from_str(&text).expect("plan parses")
    }
}

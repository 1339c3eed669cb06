//! Dependency-aware schedule checks for work packages.
//!
//! These operate on the source entities rather than on task nodes: a
//! conflict is something the planner should fix in the data, and the
//! auto-scheduler mutates the data directly before the next rebuild.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::dates::{add_days, format_date, parse_opt};
use crate::core::entity::WorkPackage;
use crate::plog;

/// A work package that starts on or before the end of a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingConflict {
    pub work_package_id: String,
    pub dependency_id: String,
    pub start_date: NaiveDate,
    pub dependency_end_date: NaiveDate,
}

impl std::fmt::Display for SchedulingConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} starts {} but depends on {} which ends {}",
            self.work_package_id, self.start_date, self.dependency_id, self.dependency_end_date
        )
    }
}

/// Summary of an auto-schedule run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleReport {
    /// Number of shifts applied (a work package may shift more than once).
    pub shifted: usize,
    /// Conflicts still present after scheduling.
    pub conflict_count: usize,
}

/// Find every dependency a work package does not clear.
///
/// Work packages without a parseable start, and dependencies that are
/// unknown or have no parseable end, are not checked.
pub fn scheduling_conflicts(work_packages: &[WorkPackage]) -> Vec<SchedulingConflict> {
    let by_id: HashMap<&str, &WorkPackage> =
        work_packages.iter().map(|wp| (wp.id.as_str(), wp)).collect();

    let mut conflicts = Vec::new();
    for wp in work_packages {
        let Some(start) = parse_opt(wp.start_date.as_deref()) else {
            continue;
        };
        for dep_id in &wp.dependencies {
            let Some(dep_end) = by_id
                .get(dep_id.as_str())
                .and_then(|dep| parse_opt(dep.end_date.as_deref()))
            else {
                continue;
            };
            if start <= dep_end {
                conflicts.push(SchedulingConflict {
                    work_package_id: wp.id.clone(),
                    dependency_id: dep_id.clone(),
                    start_date: start,
                    dependency_end_date: dep_end,
                });
            }
        }
    }
    conflicts
}

/// Shift work packages forward until each starts at least `min_gap_days`
/// after its latest dependency ends.
///
/// Start and end move by the same number of days. The number of passes is
/// bounded by `max(2 * n, 10)` so cyclic dependencies terminate; whatever
/// remains unresolved is reported as `conflict_count`.
pub fn auto_schedule(work_packages: &mut [WorkPackage], min_gap_days: i64) -> ScheduleReport {
    let max_passes = (work_packages.len() * 2).max(10);
    let mut shifted = 0;
    let mut passes = 0;
    let mut changed = true;

    while changed && passes < max_passes {
        changed = false;
        passes += 1;

        for i in 0..work_packages.len() {
            let Some(start) = parse_opt(work_packages[i].start_date.as_deref()) else {
                continue;
            };
            let Some(latest_dep_end) = latest_dependency_end(work_packages, i) else {
                continue;
            };

            let earliest_allowed = add_days(latest_dep_end, min_gap_days);
            if start >= earliest_allowed {
                continue;
            }

            let delta = (earliest_allowed - start).num_days();
            let wp = &mut work_packages[i];
            wp.start_date = Some(format_date(earliest_allowed));
            if let Some(end) = parse_opt(wp.end_date.as_deref()) {
                wp.end_date = Some(format_date(add_days(end, delta)));
            }
            shifted += 1;
            changed = true;
        }
    }

    let report = ScheduleReport {
        shifted,
        conflict_count: scheduling_conflicts(work_packages).len(),
    };
    plog!(
        "auto_schedule: {} shift(s) in {} pass(es), {} conflict(s) remain",
        report.shifted,
        passes,
        report.conflict_count
    );
    report
}

fn latest_dependency_end(work_packages: &[WorkPackage], index: usize) -> Option<NaiveDate> {
    work_packages[index]
        .dependencies
        .iter()
        .filter_map(|dep_id| {
            work_packages
                .iter()
                .find(|wp| &wp.id == dep_id)
                .and_then(|dep| parse_opt(dep.end_date.as_deref()))
        })
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wp(id: &str, start: &str, end: &str, deps: &[&str]) -> WorkPackage {
        WorkPackage::new(id, "I1", id)
            .with_dates(Some(start), Some(end))
            .depends_on(deps)
    }

    #[test]
    fn test_no_conflicts_when_sequenced() {
        let wps = vec![
            wp("a", "2025-01-01", "2025-01-31", &[]),
            wp("b", "2025-02-01", "2025-02-28", &["a"]),
        ];
        assert!(scheduling_conflicts(&wps).is_empty());
    }

    #[test]
    fn test_conflict_on_overlap_and_same_day() {
        let wps = vec![
            wp("a", "2025-01-01", "2025-01-31", &[]),
            wp("b", "2025-01-31", "2025-02-28", &["a"]),
            wp("c", "2025-01-15", "2025-03-01", &["a", "ghost"]),
        ];
        let conflicts = scheduling_conflicts(&wps);
        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].work_package_id, "b");
        assert_eq!(conflicts[1].work_package_id, "c");
        assert!(conflicts[0].to_string().contains("depends on a"));
    }

    #[test]
    fn test_auto_schedule_shifts_chain() {
        let mut wps = vec![
            wp("a", "2025-01-01", "2025-01-31", &[]),
            wp("b", "2025-01-10", "2025-01-20", &["a"]),
            wp("c", "2025-01-05", "2025-01-06", &["b"]),
        ];
        let report = auto_schedule(&mut wps, 1);

        assert_eq!(wps[1].start_date.as_deref(), Some("2025-02-01"));
        assert_eq!(wps[1].end_date.as_deref(), Some("2025-02-11"));
        assert_eq!(wps[2].start_date.as_deref(), Some("2025-02-12"));
        assert_eq!(wps[2].end_date.as_deref(), Some("2025-02-13"));
        assert_eq!(report.conflict_count, 0);
        assert!(report.shifted >= 2);
    }

    #[test]
    fn test_auto_schedule_terminates_on_cycle() {
        let mut wps = vec![
            wp("a", "2025-01-01", "2025-01-10", &["b"]),
            wp("b", "2025-01-01", "2025-01-10", &["a"]),
        ];
        let report = auto_schedule(&mut wps, 1);
        assert!(report.conflict_count > 0);
    }

    #[test]
    fn test_auto_schedule_leaves_undated_alone() {
        let mut wps = vec![
            wp("a", "2025-01-01", "2025-01-31", &[]),
            WorkPackage::new("b", "I1", "b").depends_on(&["a"]),
        ];
        let report = auto_schedule(&mut wps, 1);
        assert_eq!(report.shifted, 0);
        assert!(wps[1].start_date.is_none());
    }

    #[test]
    fn test_auto_schedule_huge_gap_does_not_overflow() {
        let mut wps = vec![
            wp("a", "2025-01-01", "2025-01-31", &[]),
            wp("b", "2025-01-10", "2025-01-20", &["a"]),
        ];
        auto_schedule(&mut wps, i64::MAX);
        assert_eq!(wps[1].start_date.as_deref(), Some("2025-01-31"));
        assert_eq!(wps[1].end_date.as_deref(), Some("2025-02-10"));

        let mut wps = vec![
            wp("a", "2025-01-01", "2025-01-31", &[]),
            wp("b", "2025-01-10", "2025-01-20", &["a"]),
        ];
        auto_schedule(&mut wps, i64::MIN);
        assert_eq!(wps[1].start_date.as_deref(), Some("2025-01-31"));
    }
}

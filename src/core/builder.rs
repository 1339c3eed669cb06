//! Task graph construction.
//!
//! Turns initiatives and their work packages into a flat, renderer-neutral
//! list of [`TaskNode`]s. Construction is two-pass: every node is
//! materialized first so the set of valid identifiers is complete, then
//! dependency references are sanitized against that set. Sanitizing while
//! building would drop forward references to work packages emitted later.

use std::collections::{HashMap, HashSet};

use crate::core::dates::{resolve_span, DateSpan};
use crate::core::entity::{Initiative, WorkPackage};
use crate::core::progress;
use crate::core::sanitize::sanitize;
use crate::core::task::{SourceKind, TaskId, TaskNode};
use crate::plog_debug;

const UNTITLED_INITIATIVE: &str = "Untitled Initiative";
const UNTITLED_WORK_PACKAGE: &str = "Phase";

/// Builds task graphs for a fixed reference year.
///
/// The reference year only manufactures default dates; it never filters
/// input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskGraphBuilder {
    reference_year: i32,
}

impl TaskGraphBuilder {
    pub fn new(reference_year: i32) -> Self {
        Self { reference_year }
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// Build the task node list.
    ///
    /// Output order: each initiative in input order, immediately followed
    /// by its work packages in input order. Work packages without an id,
    /// or whose initiative is unknown, are skipped; so are initiatives
    /// without an id and repeated ids of either kind (first one wins).
    pub fn build(&self, initiatives: &[Initiative], work_packages: &[WorkPackage]) -> Vec<TaskNode> {
        let by_initiative = group_work_packages(work_packages);
        let defaults = DateSpan::defaults_for(self.reference_year);

        let mut nodes: Vec<TaskNode> = Vec::with_capacity(initiatives.len() + work_packages.len());
        let mut seen: HashSet<TaskId> = HashSet::new();

        for initiative in initiatives {
            if initiative.id.trim().is_empty() {
                plog_debug!("builder: skipping initiative without id (title={:?})", initiative.title);
                continue;
            }
            let init_id = TaskId::initiative(&initiative.id);
            if !seen.insert(init_id.clone()) {
                plog_debug!("builder: skipping duplicate initiative {}", initiative.id);
                continue;
            }

            let (init_span, resolution) = resolve_span(
                initiative.start_date.as_deref(),
                initiative.target_due_date.as_deref(),
                defaults,
            );
            if !resolution.is_clean() {
                plog_debug!("builder: initiative {} dates repaired: {:?}", initiative.id, resolution);
            }

            let init_index = nodes.len();
            nodes.push(TaskNode {
                id: init_id,
                name: display_name(&initiative.title, UNTITLED_INITIATIVE),
                start: init_span.start,
                end: init_span.end,
                progress: progress::classify(&initiative.status),
                dependencies: Vec::new(),
                kind: SourceKind::Initiative,
                source_id: initiative.id.clone(),
                initiative_id: None,
                status: initiative.status.clone(),
                has_work_packages: false,
            });

            let children = by_initiative
                .get(initiative.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();
            for wp in children {
                let wp_id = TaskId::work_package(&wp.id);
                if !seen.insert(wp_id.clone()) {
                    plog_debug!("builder: skipping duplicate work package {}", wp.id);
                    continue;
                }

                let (span, resolution) =
                    resolve_span(wp.start_date.as_deref(), wp.end_date.as_deref(), init_span);
                if resolution.end_forced {
                    plog_debug!(
                        "builder: work package {} ends before it starts, end forced to {}",
                        wp.id,
                        span.start
                    );
                }

                // Raw references; sanitized once every node exists.
                let dependencies = wp
                    .dependencies
                    .iter()
                    .filter(|dep| dep.as_str() != wp.id)
                    .map(|dep| TaskId::work_package(dep))
                    .collect();

                nodes.push(TaskNode {
                    id: wp_id,
                    name: display_name(&wp.title, UNTITLED_WORK_PACKAGE),
                    start: span.start,
                    end: span.end,
                    progress: progress::classify(&wp.status),
                    dependencies,
                    kind: SourceKind::WorkPackage,
                    source_id: wp.id.clone(),
                    initiative_id: Some(initiative.id.clone()),
                    status: wp.status.clone(),
                    has_work_packages: false,
                });
                nodes[init_index].has_work_packages = true;
            }
        }

        let skipped = work_packages.len() + initiatives.len() - nodes.len();
        if skipped > 0 {
            plog_debug!("builder: {} item(s) excluded from task graph", skipped);
        }

        let valid: HashSet<TaskId> = nodes.iter().map(|node| node.id.clone()).collect();
        for node in &mut nodes {
            let before = node.dependencies.len();
            node.dependencies = sanitize(&node.dependencies, &valid);
            if node.dependencies.len() != before {
                plog_debug!(
                    "builder: dropped {} dangling dependency reference(s) from {}",
                    before - node.dependencies.len(),
                    node.id
                );
            }
        }

        nodes
    }
}

/// Build the task graph for `reference_year`.
pub fn build(initiatives: &[Initiative], work_packages: &[WorkPackage], reference_year: i32) -> Vec<TaskNode> {
    TaskGraphBuilder::new(reference_year).build(initiatives, work_packages)
}

fn group_work_packages(work_packages: &[WorkPackage]) -> HashMap<&str, Vec<&WorkPackage>> {
    let mut grouped: HashMap<&str, Vec<&WorkPackage>> = HashMap::new();
    for wp in work_packages {
        if wp.id.trim().is_empty() {
            plog_debug!("builder: skipping work package without id (title={:?})", wp.title);
            continue;
        }
        grouped.entry(wp.initiative_id.as_str()).or_default().push(wp);
    }
    grouped
}

fn display_name(title: &str, fallback: &str) -> String {
    if title.trim().is_empty() {
        fallback.to_string()
    } else {
        title.to_string()
    }
}

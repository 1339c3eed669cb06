//! Conflict detection and auto-scheduling from plan files.

use planline::core::{auto_schedule, scheduling_conflicts, DependencyGraph, TaskGraphBuilder};

use crate::fixtures::{plan, PlanFile, PLAN_JSON, YEAR};

#[test]
fn test_fixture_conflicts() {
    let plan = plan();
    let conflicts = scheduling_conflicts(&plan.work_packages);
    // WP-B starts on 2025-04-01, before WP-A ends; WP-C has no dates.
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].work_package_id, "WP-B");
    assert_eq!(conflicts[0].dependency_id, "WP-A");
}

#[test]
fn test_schedule_and_write_back() {
    let file = PlanFile::new(PLAN_JSON);
    let mut plan = file.read();

    let report = auto_schedule(&mut plan.work_packages, 1);
    assert_eq!(report.conflict_count, 0);
    std::fs::write(&file.path, serde_json::to_string_pretty(&plan).unwrap()).unwrap();

    let reloaded = file.read();
    assert_eq!(reloaded, plan);
    let wp_b = reloaded.work_packages.iter().find(|wp| wp.id == "WP-B").unwrap();
    assert_eq!(wp_b.start_date.as_deref(), Some("2025-04-16"));
    // The end keeps its offset from the start, inverted input included.
    assert_eq!(wp_b.end_date.as_deref(), Some("2025-03-16"));

    let nodes = TaskGraphBuilder::new(YEAR).build(&reloaded.initiatives, &reloaded.work_packages);
    let node = nodes.iter().find(|n| n.source_id == "WP-B").unwrap();
    assert_eq!(node.start, node.end);
}

#[test]
fn test_dependency_graph_from_fixture() {
    let plan = plan();
    let graph = DependencyGraph::from_work_packages(&plan.work_packages);
    assert_eq!(graph.node_count(), 3);
    // WP-GONE is unknown and contributes no edge.
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.topological_order().unwrap(), vec!["WP-A", "WP-B", "WP-C"]);
    assert!(graph.would_create_cycle("WP-A", "WP-C"));
    assert!(!graph.would_create_cycle("WP-C", "WP-A"));
}

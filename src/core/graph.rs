//! Work package dependency graph.
//!
//! Wraps a petgraph `DiGraph` keyed by work package id. An edge
//! `dependency -> dependent` means the dependent cannot start before the
//! dependency ends. Unlike the task node list, this graph keeps cycles
//! when the source data contains them so they can be reported.

use std::collections::HashMap;

use petgraph::algo::{has_path_connecting, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::core::entity::WorkPackage;
use crate::error::{Error, Result};

pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Build the graph from work packages.
    ///
    /// References to unknown work packages are ignored, as are repeated
    /// references to the same dependency.
    pub fn from_work_packages(work_packages: &[WorkPackage]) -> Self {
        let mut graph = Self::new();
        for wp in work_packages.iter().filter(|wp| !wp.id.is_empty()) {
            graph.add_node(&wp.id);
        }
        for wp in work_packages.iter().filter(|wp| !wp.id.is_empty()) {
            for dep in &wp.dependencies {
                // Unknown ids are dropped; the only possible error.
                let _ = graph.add_edge(dep, &wp.id);
            }
        }
        graph
    }

    /// Add a node, returning the existing index for a known id.
    pub fn add_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&index) = self.index.get(id) {
            return index;
        }
        let index = self.graph.add_node(id.to_string());
        self.index.insert(id.to_string(), index);
        index
    }

    /// Record that `dependent` depends on `dependency`.
    ///
    /// # Errors
    /// Returns `Error::Validation` if either id is unknown.
    pub fn add_edge(&mut self, dependency: &str, dependent: &str) -> Result<()> {
        let from = self.node(dependency)?;
        let to = self.node(dependent)?;
        if self.graph.find_edge(from, to).is_none() {
            self.graph.add_edge(from, to, ());
        }
        Ok(())
    }

    fn node(&self, id: &str) -> Result<NodeIndex> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| Error::Validation(format!("Work package {} not found in graph", id)))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Would making `from` depend on `to` close a cycle?
    ///
    /// True when `to` already (transitively) depends on `from`, or when
    /// both are the same work package. Unknown ids cannot form a cycle.
    pub fn would_create_cycle(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }
        match (self.index.get(from), self.index.get(to)) {
            (Some(&from_idx), Some(&to_idx)) => {
                has_path_connecting(&self.graph, from_idx, to_idx, None)
            }
            _ => false,
        }
    }

    /// Direct dependencies of a work package, in insertion order.
    pub fn dependencies_of(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, Direction::Incoming)
    }

    /// Work packages that directly depend on `id`.
    pub fn dependents_of(&self, id: &str) -> Vec<&str> {
        self.neighbors(id, Direction::Outgoing)
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Vec<&str> {
        let Some(&index) = self.index.get(id) else {
            return Vec::new();
        };
        // petgraph walks adjacency lists newest-first.
        let mut ids: Vec<&str> = self
            .graph
            .neighbors_directed(index, direction)
            .filter_map(|n| self.graph.node_weight(n).map(String::as_str))
            .collect();
        ids.reverse();
        ids
    }

    /// Work package ids with every dependency before its dependents.
    ///
    /// # Errors
    /// Returns `Error::Validation` naming a work package on a cycle.
    pub fn topological_order(&self) -> Result<Vec<&str>> {
        let sorted = toposort(&self.graph, None).map_err(|cycle| {
            let id = self
                .graph
                .node_weight(cycle.node_id())
                .map(String::as_str)
                .unwrap_or("unknown");
            Error::Validation(format!("Dependency cycle detected at work package: {}", id))
        })?;
        Ok(sorted
            .into_iter()
            .filter_map(|index| self.graph.node_weight(index).map(String::as_str))
            .collect())
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("work_packages", &self.node_count())
            .field("dependencies", &self.edge_count())
            .finish()
    }
}

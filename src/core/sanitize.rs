//! Dependency reference filtering and identifier normalization.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::OnceLock;

use regex::Regex;

use crate::core::task::{TaskId, TaskNode};

/// Keep only the candidates present in `valid`, preserving their order.
///
/// Total: empty or fully dangling input yields an empty list.
pub fn sanitize<T>(candidates: &[T], valid: &HashSet<T>) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    candidates
        .iter()
        .filter(|candidate| valid.contains(*candidate))
        .cloned()
        .collect()
}

fn non_id_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-z0-9_-]+").expect("valid id regex"))
}

/// Lowercase an identifier and collapse every run of characters outside
/// `[a-z0-9_-]` into `-`, trimming dashes at either end.
///
/// Used wherever an id has to be safe inside diagram source or as a
/// surface element id.
pub fn normalize_id(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    non_id_chars()
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

const FALLBACK_ELEMENT_ID: &str = "task";

/// Element ids for one rendered task list.
///
/// Each id is [`normalize_id`] of the task id. When two tasks normalize
/// to the same text, later ones get a `-2`, `-3`, ... suffix, so distinct
/// tasks never share an element id. Assignment follows task order and is
/// stable across rebuilds of the same input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementIds {
    by_task: HashMap<TaskId, String>,
}

impl ElementIds {
    pub fn assign(tasks: &[TaskNode]) -> Self {
        let mut by_task = HashMap::with_capacity(tasks.len());
        let mut taken: HashSet<String> = HashSet::with_capacity(tasks.len());

        for task in tasks {
            if by_task.contains_key(&task.id) {
                continue;
            }
            let mut base = normalize_id(task.id.as_str());
            if base.is_empty() {
                base = FALLBACK_ELEMENT_ID.to_string();
            }
            let mut candidate = base.clone();
            let mut n = 2;
            while taken.contains(&candidate) {
                candidate = format!("{}-{}", base, n);
                n += 1;
            }
            taken.insert(candidate.clone());
            by_task.insert(task.id.clone(), candidate);
        }

        Self { by_task }
    }

    /// Element id for `task_id`. Ids outside the assigned list fall back
    /// to their plain normalized form.
    pub fn get(&self, task_id: &TaskId) -> String {
        self.by_task
            .get(task_id)
            .cloned()
            .unwrap_or_else(|| normalize_id(task_id.as_str()))
    }

    /// Comma-joined element ids of `deps`.
    pub fn join(&self, deps: &[TaskId]) -> String {
        deps.iter().map(|dep| self.get(dep)).collect::<Vec<_>>().join(",")
    }
}

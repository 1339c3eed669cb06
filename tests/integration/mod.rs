//! Integration test suite for planline.
//!
//! These tests drive the public API end to end: plan snapshot to task
//! graph, task graph through a factory-built renderer into a surface, and
//! edits back out through the update callback.
//!
//! # Test Categories
//!
//! - `pipeline`: build, select and render, including degraded paths
//! - `edits`: interactive date edits and local-day normalization
//! - `store`: reactive store wiring a renderer selection to a redraw
//! - `schedule`: conflict detection and auto-scheduling from plan files

mod fixtures;

mod edits;
mod pipeline;
mod schedule;
mod store;

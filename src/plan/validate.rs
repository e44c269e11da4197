// src/plan/validate.rs

//! Plan validation.
//!
//! Construction is the single validation point: a [`TaskPlan`] in hand is
//! well-formed (non-empty unique names, dependencies resolve, no cycles),
//! so a run never discovers plan problems after it has started.

use std::collections::HashSet;
use std::fmt::Write as _;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{GenflowError, Result};
use crate::plan::spec::TaskSpec;
use crate::types::EmptyResultPolicy;

/// A validated set of task specs for one run.
///
/// The empty plan is valid; a run over it settles immediately.
pub struct TaskPlan<R> {
    pub(crate) tasks: Vec<TaskSpec<R>>,
}

impl<R> TaskPlan<R> {
    pub fn new(tasks: Vec<TaskSpec<R>>) -> Result<Self> {
        validate_specs(&tasks)?;
        Ok(Self { tasks })
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|t| t.name())
    }

    /// Human-readable listing of the plan, one block per task in plan
    /// order. Only non-default knobs are shown.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "plan ({} tasks):", self.tasks.len());
        for task in &self.tasks {
            let _ = writeln!(out, "  - {}", task.name);
            if let Some(dep) = &task.depends_on {
                let _ = writeln!(out, "      depends_on: {dep}");
            }
            if !task.start_offset.is_zero() {
                let _ = writeln!(out, "      start_offset: {:?}", task.start_offset);
            }
            if !task.progress_lines.is_empty() {
                let _ = writeln!(out, "      progress_lines: {}", task.progress_lines.len());
            }
            if task.on_empty != EmptyResultPolicy::Accept {
                let _ = writeln!(out, "      on_empty: {:?}", task.on_empty);
            }
        }
        out
    }
}

impl<R> std::fmt::Debug for TaskPlan<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskPlan").field("tasks", &self.tasks).finish()
    }
}

fn validate_specs<R>(tasks: &[TaskSpec<R>]) -> Result<()> {
    ensure_named_tasks(tasks)?;
    ensure_unique_names(tasks)?;
    validate_dependencies(tasks)?;
    validate_acyclic(tasks)?;
    Ok(())
}

fn ensure_named_tasks<R>(tasks: &[TaskSpec<R>]) -> Result<()> {
    for (i, task) in tasks.iter().enumerate() {
        if task.name.is_empty() {
            return Err(GenflowError::PlanError(format!(
                "task at position {i} has an empty name"
            )));
        }
    }
    Ok(())
}

fn ensure_unique_names<R>(tasks: &[TaskSpec<R>]) -> Result<()> {
    let mut seen = HashSet::new();
    for task in tasks {
        if !seen.insert(task.name.as_str()) {
            return Err(GenflowError::PlanError(format!(
                "duplicate task name '{}' in plan",
                task.name
            )));
        }
    }
    Ok(())
}

fn validate_dependencies<R>(tasks: &[TaskSpec<R>]) -> Result<()> {
    let names: HashSet<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
    for task in tasks {
        let Some(dep) = &task.depends_on else {
            continue;
        };
        if dep == &task.name {
            return Err(GenflowError::PlanError(format!(
                "task '{}' depends on itself",
                task.name
            )));
        }
        if !names.contains(dep.as_str()) {
            return Err(GenflowError::PlanError(format!(
                "task '{}' has unknown dependency '{}'",
                task.name, dep
            )));
        }
    }
    Ok(())
}

fn validate_acyclic<R>(tasks: &[TaskSpec<R>]) -> Result<()> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for task in tasks {
        graph.add_node(task.name.as_str());
    }
    for task in tasks {
        if let Some(dep) = &task.depends_on {
            graph.add_edge(dep.as_str(), task.name.as_str(), ());
        }
    }
    toposort(&graph, None).map_err(|cycle| {
        GenflowError::PlanCycle(format!(
            "cycle detected in task plan involving task '{}'",
            cycle.node_id()
        ))
    })?;
    Ok(())
}

//! Feasibility pre-checks.
//!
//! Cheap necessary conditions evaluated before search, in order:
//! 1. Structural validity (ids, names, positive durations and budget)
//! 2. Every task has at least one eligible resource
//! 3. No single task exceeds the budget
//! 4. Total work fits the pooled capacity of all resources
//!
//! The first failing check decides the result. Passing all of them does
//! not imply a solution exists: check 4 is only a lower bound.

use super::types::AssignRequest;
use std::collections::HashSet;

/// Why a request was rejected before search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Structurally malformed request.
    InvalidInput(String),
    /// Proven impossible.
    Infeasible(String),
}

impl Rejection {
    fn invalid(message: impl Into<String>) -> Self {
        Rejection::InvalidInput(message.into())
    }

    fn infeasible(message: impl Into<String>) -> Self {
        Rejection::Infeasible(message.into())
    }
}

/// Runs all pre-checks in order.
pub fn precheck(request: &AssignRequest) -> Result<(), Rejection> {
    check_structure(request)?;
    check_domains(request)?;
    check_task_budget(request)?;
    check_aggregate_capacity(request)
}

/// Check 1: unique non-empty ids, positive numbers, known references.
pub fn check_structure(request: &AssignRequest) -> Result<(), Rejection> {
    if request.budget <= 0 {
        return Err(Rejection::invalid(format!(
            "budget must be positive, got {}",
            request.budget
        )));
    }

    let mut task_ids = HashSet::new();
    for task in &request.tasks {
        if task.id.is_empty() {
            return Err(Rejection::invalid("task id must be non-empty"));
        }
        if !task_ids.insert(task.id.as_str()) {
            return Err(Rejection::invalid(format!("duplicate task id: {}", task.id)));
        }
        if task.duration <= 0 {
            return Err(Rejection::invalid(format!(
                "task {} duration must be positive, got {}",
                task.id, task.duration
            )));
        }
    }

    let mut resource_ids = HashSet::new();
    for resource in &request.resources {
        if resource.id.is_empty() {
            return Err(Rejection::invalid("resource id must be non-empty"));
        }
        if !resource_ids.insert(resource.id.as_str()) {
            return Err(Rejection::invalid(format!(
                "duplicate resource id: {}",
                resource.id
            )));
        }
    }

    // Sorted so the reported offender does not depend on map order
    let mut entries: Vec<_> = request.eligibility.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    for (task, eligible) in entries {
        if !task_ids.contains(task.as_str()) {
            return Err(Rejection::invalid(format!(
                "eligibility references unknown task: {task}"
            )));
        }
        for resource in eligible {
            if !resource_ids.contains(resource.as_str()) {
                return Err(Rejection::invalid(format!(
                    "task {task} references unknown resource: {resource}"
                )));
            }
        }
    }

    Ok(())
}

/// Check 2: every task has an eligible resource.
pub fn check_domains(request: &AssignRequest) -> Result<(), Rejection> {
    match request
        .tasks
        .iter()
        .find(|t| request.eligible(&t.id).is_empty())
    {
        Some(task) => Err(Rejection::infeasible(format!(
            "no eligible worker for task {}",
            task.id
        ))),
        None => Ok(()),
    }
}

/// Check 3: no task is longer than the budget.
pub fn check_task_budget(request: &AssignRequest) -> Result<(), Rejection> {
    match request.tasks.iter().find(|t| t.duration > request.budget) {
        Some(task) => Err(Rejection::infeasible(format!(
            "task {} exceeds budget",
            task.id
        ))),
        None => Ok(()),
    }
}

/// Check 4: `sum(durations) / resource_count <= budget`.
///
/// Compared as `sum <= budget * resource_count` in `i128`, so there is
/// neither rounding nor overflow.
pub fn check_aggregate_capacity(request: &AssignRequest) -> Result<(), Rejection> {
    if request.tasks.is_empty() {
        return Ok(());
    }
    let total: i128 = request.tasks.iter().map(|t| t.duration as i128).sum();
    let pooled = request.budget as i128 * request.resources.len() as i128;
    if total > pooled {
        return Err(Rejection::infeasible("insufficient aggregate capacity"));
    }
    Ok(())
}

//! Assignment service: pre-checks, model construction, and search.

use super::feasibility::{precheck, Rejection};
use super::types::{AssignRequest, Assignment, Eligibility, Outcome, Resource, Task};
use crate::csp::{
    ConfigError, Domain, MinConflictsConfig, MinConflictsSolver, Problem, SolverStatus,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Assigns tasks to resources with the default search configuration.
///
/// # Examples
///
/// ```
/// use u_ridecheck::assign::{assign, Eligibility, Outcome, Resource, Task};
///
/// let tasks = vec![Task::new("A", 10), Task::new("B", 20)];
/// let resources = vec![Resource::new("w1"), Resource::new("w2")];
/// let mut eligibility = Eligibility::new();
/// eligibility.insert("A".into(), vec!["w1".into(), "w2".into()]);
/// eligibility.insert("B".into(), vec!["w2".into()]);
///
/// match assign(&tasks, &resources, &eligibility, 25) {
///     Outcome::Assigned(a) => assert_eq!(a["B"], "w2"),
///     other => panic!("unexpected outcome: {other:?}"),
/// }
/// ```
pub fn assign(
    tasks: &[Task],
    resources: &[Resource],
    eligibility: &Eligibility,
    budget: i64,
) -> Outcome {
    let request = AssignRequest {
        tasks: tasks.to_vec(),
        resources: resources.to_vec(),
        eligibility: eligibility.clone(),
        budget,
    };
    Assigner::default().assign(&request)
}

/// The assignment entry point.
///
/// Holds only configuration; every call builds its own problem and RNG,
/// so one `Assigner` can serve concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct Assigner {
    solver: MinConflictsSolver,
}

impl Assigner {
    /// Creates an assigner, rejecting invalid search configurations.
    pub fn new(config: MinConflictsConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            solver: MinConflictsSolver::new(config)?,
        })
    }

    /// The search configuration.
    pub fn config(&self) -> &MinConflictsConfig {
        self.solver.config()
    }

    /// Runs pre-checks and, if they pass, Min-Conflicts search.
    pub fn assign(&self, request: &AssignRequest) -> Outcome {
        self.assign_with_cancel(request, None)
    }

    /// Like [`assign`](Self::assign), polling `cancel` at every search step.
    pub fn assign_with_cancel(
        &self,
        request: &AssignRequest,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Outcome {
        if let Err(rejection) = precheck(request) {
            debug!(?rejection, "request rejected before search");
            return match rejection {
                Rejection::InvalidInput(msg) => Outcome::InvalidInput(msg),
                Rejection::Infeasible(msg) => Outcome::Infeasible(msg),
            };
        }

        let problem = build_problem(request);
        let solution = self.solver.solve_with_cancel(&problem, cancel);

        match solution.status {
            SolverStatus::Solved => {
                info!(
                    tasks = request.tasks.len(),
                    steps = solution.steps,
                    solve_time_ms = solution.solve_time_ms,
                    "assignment found"
                );
                Outcome::Assigned(solution.assignment.into_iter().collect())
            }
            SolverStatus::StepLimit | SolverStatus::Timeout | SolverStatus::Cancelled => {
                warn!(
                    status = ?solution.status,
                    steps = solution.steps,
                    violated = solution.violated,
                    "search stopped without a solution"
                );
                Outcome::NoSolutionFound(no_solution_message(solution.status, solution.steps))
            }
            // Unreachable once pre-checks pass
            SolverStatus::Infeasible => {
                Outcome::Infeasible("a task has no eligible worker".into())
            }
            SolverStatus::ModelInvalid => {
                Outcome::InvalidInput("request could not be turned into a valid model".into())
            }
        }
    }
}

/// One variable per task (input order), domain = eligible resources
/// (input order), one capacity constraint per resource seen in any domain.
pub fn build_problem(request: &AssignRequest) -> Problem {
    Problem::capacitated_assignment(
        "assignment",
        request
            .tasks
            .iter()
            .map(|t| {
                let domain = Domain::new(request.eligible(&t.id).iter().cloned());
                (t.id.as_str(), t.duration, domain)
            }),
        request.budget,
    )
}

fn no_solution_message(status: SolverStatus, steps: usize) -> String {
    let cause = match status {
        SolverStatus::Timeout => "time limit reached",
        SolverStatus::Cancelled => "search cancelled",
        _ => "step budget exhausted",
    };
    format!(
        "no assignment found ({cause} after {steps} steps); this does not prove \
         the request is infeasible, retry with a larger step budget or another seed"
    )
}

/// Verifies that `assignment` is a complete, eligible, within-budget
/// solution of `request`.
pub fn check_assignment(request: &AssignRequest, assignment: &Assignment) -> Result<(), String> {
    let mut loads: HashMap<&str, i128> = HashMap::new();
    for task in &request.tasks {
        let resource = assignment
            .get(&task.id)
            .ok_or_else(|| format!("task {} is unassigned", task.id))?;
        if !request.eligible(&task.id).contains(resource) {
            return Err(format!("{resource} is not eligible for task {}", task.id));
        }
        *loads.entry(resource.as_str()).or_insert(0) += i128::from(task.duration);
    }
    if assignment.len() != request.tasks.len() {
        return Err("assignment contains unknown tasks".into());
    }
    let mut over: Vec<_> = loads
        .into_iter()
        .filter(|&(_, load)| load > i128::from(request.budget))
        .collect();
    over.sort();
    match over.first() {
        Some((resource, load)) => Err(format!(
            "{resource} is loaded {load}, over budget {}",
            request.budget
        )),
        None => Ok(()),
    }
}

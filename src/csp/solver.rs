//! CSP solver interface and Min-Conflicts implementation.
//!
//! # Algorithm
//!
//! 1. Give every variable an initial value from its domain
//! 2. At each step:
//!    a. Stop if no constraint is violated
//!    b. Stop if the step budget, time limit, or cancel flag is hit
//!    c. Pick a conflicted variable (its current value loads a violated constraint)
//!    d. Move it to the domain value that minimizes violated constraints
//!
//! The search is incomplete: running out of steps does not prove that
//! no solution exists.
//!
//! # Reference
//!
//! Minton, Johnston, Philips & Laird (1992), "Minimizing conflicts: a heuristic
//! repair method for constraint satisfaction and scheduling problems",
//! *Artificial Intelligence* 58, 161-205.

use super::config::{ConfigError, MinConflictsConfig, TieBreak};
use super::model::{Constraint, Problem};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Every constraint is satisfied.
    Solved,
    /// Some variable has an empty domain, so no assignment exists.
    Infeasible,
    /// The problem is malformed (see [`Problem::validate`]).
    ModelInvalid,
    /// Step budget exhausted before a solution was found.
    StepLimit,
    /// Wall-clock limit elapsed before a solution was found.
    Timeout,
    /// Cancelled by the caller.
    Cancelled,
}

/// Solution from a CSP solver.
#[derive(Debug, Clone)]
pub struct CspSolution {
    /// Solver status.
    pub status: SolverStatus,
    /// Final variable → value assignment.
    ///
    /// Complete when `status` is [`SolverStatus::Solved`]; otherwise it is
    /// the last state visited (or empty if search never started).
    pub assignment: HashMap<String, String>,
    /// Number of repair steps taken.
    pub steps: usize,
    /// Constraints still violated by `assignment`.
    pub violated: usize,
    /// Solve time in milliseconds.
    pub solve_time_ms: i64,
}

impl CspSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            assignment: HashMap::new(),
            steps: 0,
            violated: 0,
            solve_time_ms: 0,
        }
    }

    /// Whether a satisfying assignment was found.
    pub fn is_solution_found(&self) -> bool {
        self.status == SolverStatus::Solved
    }
}

/// Trait for CSP solver implementations.
pub trait CspSolver {
    /// Solves the problem and returns a solution.
    fn solve(&self, problem: &Problem) -> CspSolution;
}

/// Min-Conflicts local search solver.
///
/// # Examples
///
/// ```
/// use u_ridecheck::csp::{
///     CspSolver, Domain, MinConflictsConfig, MinConflictsSolver, Problem, TieBreak,
/// };
///
/// let problem = Problem::capacitated_assignment(
///     "rides",
///     vec![
///         ("roller", 20, Domain::new(["josh"])),
///         ("flume", 30, Domain::new(["josh", "terry"])),
///     ],
///     40,
/// );
/// let config = MinConflictsConfig::default().with_tie_break(TieBreak::Deterministic);
/// let solver = MinConflictsSolver::new(config).unwrap();
/// let solution = solver.solve(&problem);
///
/// assert!(solution.is_solution_found());
/// assert_eq!(solution.assignment["flume"], "terry");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MinConflictsSolver {
    config: MinConflictsConfig,
}

impl MinConflictsSolver {
    /// Creates a solver, rejecting invalid configurations.
    pub fn new(config: MinConflictsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The solver configuration.
    pub fn config(&self) -> &MinConflictsConfig {
        &self.config
    }

    /// Runs the search with an optional cancellation token.
    ///
    /// The token is polled once per step.
    pub fn solve_with_cancel(
        &self,
        problem: &Problem,
        cancel: Option<Arc<AtomicBool>>,
    ) -> CspSolution {
        if let Err(err) = problem.validate() {
            debug!(problem = %problem.name, %err, "rejecting malformed problem");
            return CspSolution::empty(SolverStatus::ModelInvalid);
        }
        if let Some(var) = problem.variables.iter().find(|v| v.domain.is_empty()) {
            debug!(problem = %problem.name, variable = %var.name, "empty domain");
            return CspSolution::empty(SolverStatus::Infeasible);
        }

        let start_time = Instant::now();
        let deadline = self
            .config
            .time_limit_ms
            .map(|ms| start_time + Duration::from_millis(ms));
        let budget = self.config.step_budget(problem.candidate_count());
        let deterministic = self.config.tie_break == TieBreak::Deterministic;
        let mut rng = StdRng::seed_from_u64(self.config.seed.unwrap_or_else(rand::random));

        let mut state = SearchState::compile(problem);
        let n = state.touches.len();

        // Initialize
        for var in 0..n {
            let size = state.touches[var].len();
            let value = if deterministic {
                0
            } else {
                rng.random_range(0..size)
            };
            state.place(var, value);
        }

        debug!(
            problem = %problem.name,
            variables = n,
            constraints = state.limits.len(),
            budget,
            "min-conflicts search started"
        );

        let mut steps = 0usize;
        let mut cursor = 0usize;
        let status = loop {
            if state.violated == 0 {
                break SolverStatus::Solved;
            }
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    break SolverStatus::Cancelled;
                }
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break SolverStatus::Timeout;
            }
            if steps >= budget {
                break SolverStatus::StepLimit;
            }

            let conflicted: Vec<usize> = (0..n).filter(|&v| state.is_conflicted(v)).collect();
            let var = if deterministic {
                conflicted
                    .iter()
                    .copied()
                    .find(|&v| v >= cursor)
                    .unwrap_or(conflicted[0])
            } else {
                conflicted[rng.random_range(0..conflicted.len())]
            };
            cursor = var + 1;

            // Score every candidate value
            let current = state.current[var];
            let mut best_score = usize::MAX;
            let mut minimizers: Vec<usize> = Vec::new();
            for value in 0..state.touches[var].len() {
                let score = state.violations_after(var, value);
                if score < best_score {
                    best_score = score;
                    minimizers.clear();
                    minimizers.push(value);
                } else if score == best_score {
                    minimizers.push(value);
                }
            }

            let chosen = if deterministic {
                if minimizers.contains(&current) {
                    current
                } else {
                    minimizers[0]
                }
            } else {
                minimizers[rng.random_range(0..minimizers.len())]
            };

            if chosen != current {
                state.unplace(var);
                state.place(var, chosen);
            }
            steps += 1;
        };

        let assignment = problem
            .variables
            .iter()
            .zip(&state.current)
            .map(|(v, &idx)| (v.name.clone(), v.domain.values()[idx].clone()))
            .collect();

        let solve_time_ms = start_time.elapsed().as_millis() as i64;
        debug!(
            problem = %problem.name,
            ?status,
            steps,
            violated = state.violated,
            solve_time_ms,
            "min-conflicts search finished"
        );

        CspSolution {
            status,
            assignment,
            steps,
            violated: state.violated,
            solve_time_ms,
        }
    }
}

impl CspSolver for MinConflictsSolver {
    fn solve(&self, problem: &Problem) -> CspSolution {
        self.solve_with_cancel(problem, None)
    }
}

/// Index-based view of a validated [`Problem`] with incremental loads.
struct SearchState {
    /// `touches[var][value]`: (constraint, weight) pairs loaded when `var`
    /// takes its `value`-th domain element.
    touches: Vec<Vec<Vec<(usize, i128)>>>,
    /// Widened: a sum of `i64` weights may exceed `i64::MAX`.
    limits: Vec<i128>,
    loads: Vec<i128>,
    /// Domain index of each variable's current value.
    current: Vec<usize>,
    violated: usize,
}

impl SearchState {
    fn compile(problem: &Problem) -> Self {
        let index: HashMap<&str, usize> = problem
            .variables
            .iter()
            .enumerate()
            .map(|(i, v)| (v.name.as_str(), i))
            .collect();

        let mut touches: Vec<Vec<Vec<(usize, i128)>>> = problem
            .variables
            .iter()
            .map(|v| vec![Vec::new(); v.domain.len()])
            .collect();
        let mut limits = Vec::with_capacity(problem.constraints.len());

        for (c, constraint) in problem.constraints.iter().enumerate() {
            match constraint {
                Constraint::Capacity {
                    value,
                    scope,
                    weights,
                    limit,
                } => {
                    limits.push(i128::from(*limit));
                    for (name, &w) in scope.iter().zip(weights) {
                        let var = index[name.as_str()];
                        if let Some(pos) = problem.variables[var].domain.position(value) {
                            touches[var][pos].push((c, i128::from(w)));
                        }
                    }
                }
            }
        }

        let n = touches.len();
        Self {
            touches,
            loads: vec![0; limits.len()],
            limits,
            current: vec![0; n],
            violated: 0,
        }
    }

    fn place(&mut self, var: usize, value: usize) {
        self.current[var] = value;
        for &(c, w) in &self.touches[var][value] {
            let was = self.loads[c] > self.limits[c];
            self.loads[c] += w;
            if !was && self.loads[c] > self.limits[c] {
                self.violated += 1;
            }
        }
    }

    fn unplace(&mut self, var: usize) {
        let value = self.current[var];
        for &(c, w) in &self.touches[var][value] {
            let was = self.loads[c] > self.limits[c];
            self.loads[c] -= w;
            if was && self.loads[c] <= self.limits[c] {
                self.violated -= 1;
            }
        }
    }

    fn is_conflicted(&self, var: usize) -> bool {
        self.touches[var][self.current[var]]
            .iter()
            .any(|&(c, _)| self.loads[c] > self.limits[c])
    }

    /// Violated-constraint count if `var` moved to `value`.
    fn violations_after(&self, var: usize, value: usize) -> usize {
        let current = self.current[var];
        if value == current {
            return self.violated;
        }
        let mut count = self.violated as isize;
        for &(c, w) in &self.touches[var][current] {
            let before = self.loads[c] > self.limits[c];
            let after = self.loads[c] - w > self.limits[c];
            count += after as isize - before as isize;
        }
        for &(c, w) in &self.touches[var][value] {
            let before = self.loads[c] > self.limits[c];
            let after = self.loads[c] + w > self.limits[c];
            count += after as isize - before as isize;
        }
        count as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csp::{ConstraintStatus, Domain, Variable};

    fn deterministic() -> MinConflictsSolver {
        MinConflictsSolver::new(MinConflictsConfig::default().with_tie_break(TieBreak::Deterministic))
            .unwrap()
    }

    fn rides(limit: i64) -> Problem {
        Problem::capacitated_assignment(
            "rides",
            vec![
                ("helevator", 10, Domain::new(["charlie", "josh"])),
                ("roller", 20, Domain::new(["josh"])),
                ("carusel", 5, Domain::new(["charlie"])),
                ("flume", 30, Domain::new(["charlie", "josh", "terry"])),
            ],
            limit,
        )
    }

    fn assert_sound(problem: &Problem, solution: &CspSolution) {
        for var in &problem.variables {
            let value = &solution.assignment[&var.name];
            assert!(var.domain.contains(value), "{} -> {value} not in domain", var.name);
        }
        for c in &problem.constraints {
            assert_eq!(c.evaluate(&solution.assignment), ConstraintStatus::Satisfied);
        }
    }

    #[test]
    fn test_solves_initial_assignment() {
        let problem = rides(100);
        let solution = deterministic().solve(&problem);

        assert!(solution.is_solution_found());
        assert_eq!(solution.steps, 0);
        assert_eq!(solution.violated, 0);
        assert_eq!(solution.assignment["helevator"], "charlie");
        assert_eq!(solution.assignment["flume"], "charlie");
    }

    #[test]
    fn test_deterministic_repair() {
        // First-value start puts helevator, carusel and flume on charlie (45 > 30)
        let problem = rides(30);
        let solution = deterministic().solve(&problem);

        assert!(solution.is_solution_found());
        assert!(solution.steps > 0);
        assert_sound(&problem, &solution);
    }

    #[test]
    fn test_deterministic_is_reproducible() {
        let problem = rides(30);
        let a = deterministic().solve(&problem);
        let b = deterministic().solve(&problem);
        assert_eq!(a.assignment, b.assignment);
        assert_eq!(a.steps, b.steps);
    }

    #[test]
    fn test_seeded_random_is_reproducible() {
        let problem = rides(30);
        let config = MinConflictsConfig::default().with_seed(42);
        let solver = MinConflictsSolver::new(config).unwrap();

        let a = solver.solve(&problem);
        let b = solver.solve(&problem);

        assert!(a.is_solution_found());
        assert_sound(&problem, &a);
        assert_eq!(a.assignment, b.assignment);
        assert_eq!(a.steps, b.steps);
    }

    #[test]
    fn test_unsatisfiable_hits_step_limit() {
        // roller alone needs 20 on josh
        let problem = rides(15);
        let config = MinConflictsConfig::default()
            .with_max_steps(50)
            .with_seed(7);
        let solution = MinConflictsSolver::new(config).unwrap().solve(&problem);

        assert_eq!(solution.status, SolverStatus::StepLimit);
        assert_eq!(solution.steps, 50);
        assert!(solution.violated > 0);
        assert_eq!(solution.assignment.len(), 4);
    }

    #[test]
    fn test_cancelled() {
        let problem = rides(15);
        let flag = Arc::new(AtomicBool::new(true));
        let solution = deterministic().solve_with_cancel(&problem, Some(flag));

        assert_eq!(solution.status, SolverStatus::Cancelled);
        assert_eq!(solution.steps, 0);
    }

    #[test]
    fn test_timeout() {
        let problem = rides(15);
        let config = MinConflictsConfig::default()
            .with_tie_break(TieBreak::Deterministic)
            .with_max_steps(usize::MAX)
            .with_time_limit_ms(0);
        let solution = MinConflictsSolver::new(config).unwrap().solve(&problem);

        assert_eq!(solution.status, SolverStatus::Timeout);
    }

    #[test]
    fn test_solved_before_deadline_check() {
        let problem = rides(100);
        let config = MinConflictsConfig::default().with_time_limit_ms(0);
        let solution = MinConflictsSolver::new(config).unwrap().solve(&problem);

        assert!(solution.is_solution_found());
    }

    #[test]
    fn test_invalid_model() {
        let mut problem = Problem::new("bad");
        problem.add_capacity("x", vec!["nonexistent".into()], vec![1], 1);
        let solution = deterministic().solve(&problem);
        assert_eq!(solution.status, SolverStatus::ModelInvalid);
        assert!(solution.assignment.is_empty());
    }

    #[test]
    fn test_empty_domain_is_infeasible() {
        let mut problem = Problem::new("empty");
        problem.add_variable(Variable::new("helevator", Domain::default()));
        let solution = deterministic().solve(&problem);
        assert_eq!(solution.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_empty_problem() {
        let solution = deterministic().solve(&Problem::new("nothing"));
        assert!(solution.is_solution_found());
        assert!(solution.assignment.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MinConflictsConfig::default().with_min_steps(0);
        assert_eq!(
            MinConflictsSolver::new(config).unwrap_err(),
            ConfigError::ZeroMinSteps
        );
    }

    #[test]
    fn test_weights_near_i64_max() {
        let problem = Problem::capacitated_assignment(
            "huge",
            vec![
                ("A", i64::MAX, Domain::new(["w1", "w2"])),
                ("B", i64::MAX, Domain::new(["w1", "w2"])),
            ],
            i64::MAX,
        );
        // Both start on w1, carrying 2 * i64::MAX
        let solution = deterministic().solve(&problem);

        assert!(solution.is_solution_found());
        assert_eq!(solution.steps, 1);
        assert_ne!(solution.assignment["A"], solution.assignment["B"]);
        assert_sound(&problem, &solution);
    }

    #[test]
    fn test_violations_after_delta() {
        let problem = rides(30);
        let mut state = SearchState::compile(&problem);
        for var in 0..4 {
            state.place(var, 0);
        }
        // charlie carries 10 + 5 + 30
        assert_eq!(state.violated, 1);
        assert!(state.is_conflicted(0));
        assert!(!state.is_conflicted(1));

        // flume -> terry clears charlie
        assert_eq!(state.violations_after(3, 2), 0);
        // flume -> josh clears charlie but overloads josh (20 + 30)
        assert_eq!(state.violations_after(3, 1), 1);
        assert_eq!(state.violations_after(3, 0), 1);
    }
}

//! Finite-domain constraint satisfaction.
//!
//! Provides a small, domain-agnostic CSP layer: variables with ordered
//! finite domains, capacity constraints over named scopes, and a
//! Min-Conflicts local search solver.
//!
//! # Key Components
//!
//! - **Variables**: [`Variable`], [`Domain`] — decision variables and their candidates
//! - **Constraints**: [`Constraint`] — predicates over a scope of variables
//! - **Model**: [`Problem`] — container for variables and constraints
//! - **Solver**: [`CspSolver`] trait, [`MinConflictsSolver`] implementation
//!
//! # Design
//!
//! The model layer holds no search logic. Solvers compile a validated
//! [`Problem`] into an index-based form once per search. Min-Conflicts is
//! incomplete: [`SolverStatus::StepLimit`] means "not found", not "impossible".
//!
//! # References
//!
//! Russell & Norvig (2010), "Artificial Intelligence: A Modern Approach", Ch. 6.4

mod config;
mod model;
mod solver;
mod variables;

pub use config::{ConfigError, MinConflictsConfig, TieBreak};
pub use model::{Constraint, ConstraintStatus, ModelError, Problem};
pub use solver::{CspSolution, CspSolver, MinConflictsSolver, SolverStatus};
pub use variables::{Domain, Variable};

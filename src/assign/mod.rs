//! Task → resource assignment under a shared time budget.
//!
//! [`Assigner`] is the single entry point. It runs the feasibility
//! pre-checks, builds a capacitated [`Problem`](crate::csp::Problem), and
//! runs Min-Conflicts search. Every failure is a returned [`Outcome`],
//! never a panic:
//!
//! - [`Outcome::InvalidInput`]: malformed request (duplicate ids, empty
//!   names, non-positive numbers, unknown references)
//! - [`Outcome::Infeasible`]: a necessary condition fails
//! - [`Outcome::NoSolutionFound`]: search stopped early; retrying with
//!   more steps or another seed may succeed

mod feasibility;
mod service;
mod types;

pub use feasibility::{
    check_aggregate_capacity, check_domains, check_structure, check_task_budget, precheck,
    Rejection,
};
pub use service::{assign, build_problem, check_assignment, Assigner};
pub use types::{AssignRequest, Assignment, Eligibility, Outcome, Resource, Task};

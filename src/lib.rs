//! Ride-check assignment under a shared time budget.
//!
//! Assigns tasks (ride checks), each with a duration and a set of eligible
//! workers, so that no worker's total exceeds the budget, or reports why
//! that is impossible.
//!
//! - **CSP**: Domain-agnostic finite-domain modeling layer (variables,
//!   ordered domains, capacity constraints) with a Min-Conflicts local
//!   search solver.
//! - **Assign**: The entry point. Feasibility pre-checks, problem
//!   construction, and outcome mapping.
//! - **Roster**: Rides, trained workers, and per-day restrictions on top
//!   of the assignment service.
//!
//! # Architecture
//!
//! `roster` depends on `assign`, which depends on `csp`. The `csp` module
//! contains no ride-check concepts.

pub mod assign;
pub mod csp;
pub mod roster;

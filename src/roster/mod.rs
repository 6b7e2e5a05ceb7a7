//! Ride-check rosters.
//!
//! The vocabulary of a park's morning ride check: rides with a check
//! time, workers with the rides they are trained on, and per-day
//! restrictions (closed rides, absent workers, time before opening).
//! A [`Roster`] lowers to an [`AssignRequest`](crate::assign::AssignRequest).

mod runner;
mod types;

pub use runner::generate_ridechecks;
pub use types::{DayRestriction, DayRidecheck, Ride, Roster, Worker};

//! Multi-day ride-check generation.

use super::types::{DayRestriction, DayRidecheck, Roster};
use crate::assign::Assigner;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Generates one ride check per day, in the order of `days`.
///
/// Each day is an independent request: its restriction is applied to
/// `roster` and the result is handed to `assigner`. With the `parallel`
/// feature the days are solved concurrently.
///
/// # Examples
///
/// ```
/// use u_ridecheck::assign::Assigner;
/// use u_ridecheck::roster::{generate_ridechecks, DayRestriction, Ride, Roster, Worker};
///
/// let roster = Roster::new(0)
///     .with_ride(Ride::new("flume", 30))
///     .with_worker(Worker::new("terry", ["flume"]));
/// let days = [DayRestriction::new("Mon", 45), DayRestriction::new("Tue", 20)];
///
/// let checks = generate_ridechecks(&roster, &days, &Assigner::default());
/// assert!(checks[0].outcome.is_assigned());
/// assert!(!checks[1].outcome.is_assigned());
/// ```
pub fn generate_ridechecks(
    roster: &Roster,
    days: &[DayRestriction],
    assigner: &Assigner,
) -> Vec<DayRidecheck> {
    let solve_day = |restriction: &DayRestriction| {
        let request = roster.for_day(restriction).to_request();
        let outcome = assigner.assign(&request);
        debug!(day = %restriction.day, assigned = outcome.is_assigned(), "day solved");
        DayRidecheck {
            day: restriction.day.clone(),
            outcome,
        }
    };

    #[cfg(feature = "parallel")]
    let checks: Vec<DayRidecheck> = days.par_iter().map(solve_day).collect();
    #[cfg(not(feature = "parallel"))]
    let checks: Vec<DayRidecheck> = days.iter().map(solve_day).collect();

    checks
}

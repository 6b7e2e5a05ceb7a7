//! Ride-check roster types.

use crate::assign::{AssignRequest, Outcome};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A ride that must be checked before opening.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ride {
    /// Ride name.
    #[cfg_attr(feature = "serde", serde(rename = "ride"))]
    pub name: String,
    /// Minutes needed to check the ride.
    pub time: i64,
}

impl Ride {
    /// Creates a new ride taking `time` minutes to check.
    pub fn new(name: impl Into<String>, time: i64) -> Self {
        Self {
            name: name.into(),
            time,
        }
    }
}

/// A worker and the rides they are trained to check.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Worker {
    /// Worker name.
    #[cfg_attr(feature = "serde", serde(rename = "worker"))]
    pub name: String,
    /// Names of rides this worker may check.
    #[cfg_attr(feature = "serde", serde(rename = "canCheck"))]
    pub can_check: Vec<String>,
}

impl Worker {
    /// Creates a new worker trained on the rides in `can_check`.
    pub fn new<I, S>(name: impl Into<String>, can_check: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            can_check: can_check.into_iter().map(Into::into).collect(),
        }
    }
}

/// Everything needed to generate one ride check.
///
/// # Examples
///
/// ```
/// use u_ridecheck::roster::{Ride, Roster, Worker};
///
/// let roster = Roster::new(45)
///     .with_ride(Ride::new("roller", 20))
///     .with_ride(Ride::new("flume", 30))
///     .with_worker(Worker::new("josh", ["roller", "flume"]))
///     .with_worker(Worker::new("terry", ["flume"]));
///
/// let request = roster.to_request();
/// assert_eq!(request.eligible("flume"), &["josh", "terry"]);
/// assert_eq!(request.budget, 45);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Roster {
    /// Rides to check.
    pub rides: Vec<Ride>,
    /// Available workers.
    pub workers: Vec<Worker>,
    /// Minutes each worker has before opening.
    pub total_time: i64,
}

impl Roster {
    /// Creates an empty roster with the given time before opening.
    pub fn new(total_time: i64) -> Self {
        Self {
            total_time,
            ..Self::default()
        }
    }

    /// Adds a ride.
    pub fn with_ride(mut self, ride: Ride) -> Self {
        self.rides.push(ride);
        self
    }

    /// Adds a worker.
    pub fn with_worker(mut self, worker: Worker) -> Self {
        self.workers.push(worker);
        self
    }

    /// Lowers the roster to an assignment request.
    ///
    /// The eligible workers of a ride are those whose `can_check` lists it,
    /// in worker order. Permissions for rides not on the roster are dropped.
    pub fn to_request(&self) -> AssignRequest {
        let mut request = AssignRequest::new(self.total_time);
        for ride in &self.rides {
            request = request.with_task(ride.name.clone(), ride.time);
        }
        for worker in &self.workers {
            request = request.with_resource(worker.name.clone());
        }
        for ride in &self.rides {
            let eligible = self
                .workers
                .iter()
                .filter(|w| w.can_check.contains(&ride.name))
                .map(|w| w.name.clone());
            request = request.with_eligible(ride.name.clone(), eligible);
        }
        request
    }

    /// The roster as it stands on one day.
    ///
    /// Closed rides and absent workers are removed, closed rides are
    /// dropped from the remaining permissions, and the time before
    /// opening becomes the day's.
    pub fn for_day(&self, restriction: &DayRestriction) -> Roster {
        let rides = self
            .rides
            .iter()
            .filter(|r| !restriction.closed_rides.contains(&r.name))
            .cloned()
            .collect();
        let workers = self
            .workers
            .iter()
            .filter(|w| !restriction.absent_workers.contains(&w.name))
            .map(|w| Worker {
                name: w.name.clone(),
                can_check: w
                    .can_check
                    .iter()
                    .filter(|r| !restriction.closed_rides.contains(*r))
                    .cloned()
                    .collect(),
            })
            .collect();
        Roster {
            rides,
            workers,
            total_time: restriction.time,
        }
    }
}

/// Per-day changes to the roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DayRestriction {
    /// Day label (e.g. "Monday").
    pub day: String,
    /// Minutes before opening on this day.
    pub time: i64,
    /// Rides closed on this day.
    pub closed_rides: Vec<String>,
    /// Workers absent on this day.
    pub absent_workers: Vec<String>,
}

impl DayRestriction {
    /// Creates a restriction with nothing closed and nobody absent.
    pub fn new(day: impl Into<String>, time: i64) -> Self {
        Self {
            day: day.into(),
            time,
            ..Self::default()
        }
    }

    /// Marks a ride closed.
    pub fn with_closed_ride(mut self, ride: impl Into<String>) -> Self {
        self.closed_rides.push(ride.into());
        self
    }

    /// Marks a worker absent.
    pub fn with_absent_worker(mut self, worker: impl Into<String>) -> Self {
        self.absent_workers.push(worker.into());
        self
    }
}

/// The ride check generated for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DayRidecheck {
    /// Day label.
    pub day: String,
    /// Assignment outcome for the day.
    pub outcome: Outcome,
}

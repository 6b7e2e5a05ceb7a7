//! Assignment request and outcome types.

use std::collections::{BTreeMap, HashMap};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A unit of work with a fixed duration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Task {
    /// Unique, non-empty task identifier.
    pub id: String,
    /// Time needed to perform the task. Must be positive.
    pub duration: i64,
}

impl Task {
    /// Creates a new task.
    pub fn new(id: impl Into<String>, duration: i64) -> Self {
        Self {
            id: id.into(),
            duration,
        }
    }
}

/// A worker that can be assigned tasks.
///
/// Capacity is not per resource: all resources share the request budget.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Resource {
    /// Unique, non-empty resource identifier.
    pub id: String,
}

impl Resource {
    /// Creates a new resource.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Task id → resource ids qualified to perform it, in preference order.
pub type Eligibility = HashMap<String, Vec<String>>;

/// Task id → assigned resource id.
pub type Assignment = BTreeMap<String, String>;

/// Input to the assignment service.
///
/// # Examples
///
/// ```
/// use u_ridecheck::assign::AssignRequest;
///
/// let request = AssignRequest::new(25)
///     .with_task("A", 10)
///     .with_task("B", 20)
///     .with_resource("w1")
///     .with_resource("w2")
///     .with_eligible("A", ["w1", "w2"])
///     .with_eligible("B", ["w2"]);
/// assert_eq!(request.tasks.len(), 2);
/// assert_eq!(request.eligibility["B"], vec!["w2".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AssignRequest {
    /// Tasks in input order.
    pub tasks: Vec<Task>,
    /// Resources in input order.
    pub resources: Vec<Resource>,
    /// Eligible resources per task. A missing entry means no one is eligible.
    pub eligibility: Eligibility,
    /// Time available to each resource.
    pub budget: i64,
}

impl AssignRequest {
    /// Creates an empty request with the given per-resource budget.
    pub fn new(budget: i64) -> Self {
        Self {
            budget,
            ..Self::default()
        }
    }

    /// Adds a task.
    pub fn with_task(mut self, id: impl Into<String>, duration: i64) -> Self {
        self.tasks.push(Task::new(id, duration));
        self
    }

    /// Adds a resource.
    pub fn with_resource(mut self, id: impl Into<String>) -> Self {
        self.resources.push(Resource::new(id));
        self
    }

    /// Sets the eligible resources of a task, replacing any previous entry.
    pub fn with_eligible<I, S>(mut self, task: impl Into<String>, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.eligibility
            .insert(task.into(), resources.into_iter().map(Into::into).collect());
        self
    }

    /// Eligible resources of a task (empty if none recorded).
    pub fn eligible(&self, task: &str) -> &[String] {
        self.eligibility.get(task).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Same tasks and resources, with every task pinned to the resource
    /// chosen for it in `assignment`.
    pub fn pinned_to(&self, assignment: &Assignment) -> Self {
        let eligibility: Eligibility = self
            .tasks
            .iter()
            .map(|t| {
                let pinned: Vec<String> = assignment.get(&t.id).cloned().into_iter().collect();
                (t.id.clone(), pinned)
            })
            .collect();
        Self {
            tasks: self.tasks.clone(),
            resources: self.resources.clone(),
            eligibility,
            budget: self.budget,
        }
    }
}

/// Result of an assignment request.
///
/// With the `serde` feature this serializes externally tagged, e.g.
/// `{"Infeasible": "task A exceeds budget"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Outcome {
    /// Every task is assigned within budget.
    Assigned(Assignment),
    /// A necessary condition proves no assignment exists.
    Infeasible(String),
    /// The request is structurally malformed.
    InvalidInput(String),
    /// Search stopped without a solution. Not a proof of infeasibility.
    NoSolutionFound(String),
}

impl Outcome {
    /// Whether an assignment was produced.
    pub fn is_assigned(&self) -> bool {
        matches!(self, Outcome::Assigned(_))
    }

    /// The assignment, if any.
    pub fn assignment(&self) -> Option<&Assignment> {
        match self {
            Outcome::Assigned(a) => Some(a),
            _ => None,
        }
    }

    /// The failure reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Assigned(_) => None,
            Outcome::Infeasible(r) | Outcome::InvalidInput(r) | Outcome::NoSolutionFound(r) => {
                Some(r.as_str())
            }
        }
    }
}

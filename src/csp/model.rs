//! CSP model definition.

use super::variables::{Domain, Variable};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of evaluating a constraint against a (possibly partial) assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintStatus {
    /// The constraint holds.
    Satisfied,
    /// The constraint is broken.
    Violated,
    /// Some scope variable is unassigned and the outcome is still open.
    Undetermined,
}

/// A constraint in the CSP model.
///
/// Constraints own their scope by variable name; the solver resolves
/// names to indices once per search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Constraint {
    /// Capacity of a single value.
    ///
    /// The total weight of scope variables currently assigned `value`
    /// must not exceed `limit`:
    /// `sum(weights[i] for scope[i] == value) <= limit`.
    Capacity {
        /// The value whose load is bounded (e.g. a worker id).
        value: String,
        /// Names of variables that may take `value`.
        scope: Vec<String>,
        /// Weight of each scope variable (parallel to `scope`).
        weights: Vec<i64>,
        /// Maximum total weight.
        limit: i64,
    },
}

impl Constraint {
    /// Names of the variables this constraint governs.
    pub fn scope(&self) -> &[String] {
        match self {
            Constraint::Capacity { scope, .. } => scope,
        }
    }

    /// Evaluates the constraint.
    ///
    /// Variables missing from `assignment` are treated as unassigned.
    /// Weights are positive, so a partial load already over the limit
    /// is reported as [`ConstraintStatus::Violated`].
    pub fn evaluate(&self, assignment: &HashMap<String, String>) -> ConstraintStatus {
        match self {
            Constraint::Capacity {
                value,
                scope,
                weights,
                limit,
            } => {
                let mut load = 0i128;
                let mut open = false;
                for (name, &w) in scope.iter().zip(weights) {
                    match assignment.get(name) {
                        Some(v) if v == value => load += i128::from(w),
                        Some(_) => {}
                        None => open = true,
                    }
                }
                if load > i128::from(*limit) {
                    ConstraintStatus::Violated
                } else if open {
                    ConstraintStatus::Undetermined
                } else {
                    ConstraintStatus::Satisfied
                }
            }
        }
    }
}

/// Malformed-model errors reported by [`Problem::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Two variables share a name.
    #[error("duplicate variable: {0}")]
    DuplicateVariable(String),
    /// A constraint references a variable that does not exist.
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),
    /// A capacity constraint has mismatched scope and weights.
    #[error("capacity on '{value}': {scope} variables but {weights} weights")]
    WeightMismatch {
        value: String,
        scope: usize,
        weights: usize,
    },
}

/// A constraint satisfaction problem.
///
/// Variables keep insertion order, which the solver uses as the
/// variable index for deterministic tie-breaking.
///
/// # Examples
///
/// ```
/// use u_ridecheck::csp::{Domain, Problem, Variable};
///
/// let mut problem = Problem::new("ridecheck");
/// problem.add_variable(Variable::new("roller", Domain::new(["josh"])));
/// problem.add_variable(Variable::new("flume", Domain::new(["josh", "terry"])));
/// problem.add_capacity("josh", vec!["roller".into(), "flume".into()], vec![20, 30], 45);
/// assert!(problem.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Problem {
    /// Problem name.
    pub name: String,
    /// Variables in insertion order.
    pub variables: Vec<Variable>,
    /// Constraints.
    pub constraints: Vec<Constraint>,
}

impl Problem {
    /// Creates a new empty problem.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Adds a variable.
    pub fn add_variable(&mut self, var: Variable) {
        self.variables.push(var);
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Convenience: add a capacity constraint.
    pub fn add_capacity(
        &mut self,
        value: impl Into<String>,
        scope: Vec<String>,
        weights: Vec<i64>,
        limit: i64,
    ) {
        self.constraints.push(Constraint::Capacity {
            value: value.into(),
            scope,
            weights,
            limit,
        });
    }

    /// Looks up a variable by name.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Index of a variable by name.
    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name == name)
    }

    /// Validates the problem for consistency.
    ///
    /// Checks that variable names are unique and that every
    /// constraint references existing variables.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut names = HashSet::new();
        for var in &self.variables {
            if !names.insert(var.name.as_str()) {
                return Err(ModelError::DuplicateVariable(var.name.clone()));
            }
        }

        for constraint in &self.constraints {
            match constraint {
                Constraint::Capacity {
                    value,
                    scope,
                    weights,
                    ..
                } => {
                    if scope.len() != weights.len() {
                        return Err(ModelError::WeightMismatch {
                            value: value.clone(),
                            scope: scope.len(),
                            weights: weights.len(),
                        });
                    }
                    for name in scope {
                        if !names.contains(name.as_str()) {
                            return Err(ModelError::UndefinedVariable(name.clone()));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns the number of variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Sum of domain sizes over all variables.
    pub fn candidate_count(&self) -> usize {
        self.variables.iter().map(|v| v.domain.len()).sum()
    }

    /// Builds an assignment problem: one variable per task, one capacity
    /// constraint per distinct value seen in any domain.
    ///
    /// `tasks` yields `(name, weight, domain)`. Constraints are emitted in
    /// order of first appearance of each value, and each scope lists
    /// variables in task order.
    pub fn capacitated_assignment<'a, I>(name: impl Into<String>, tasks: I, limit: i64) -> Self
    where
        I: IntoIterator<Item = (&'a str, i64, Domain)>,
    {
        let mut problem = Problem::new(name);
        let mut order: Vec<String> = Vec::new();
        let mut scopes: HashMap<String, (Vec<String>, Vec<i64>)> = HashMap::new();

        for (task, weight, domain) in tasks {
            for value in domain.values() {
                let entry = scopes.entry(value.clone()).or_insert_with(|| {
                    order.push(value.clone());
                    (Vec::new(), Vec::new())
                });
                entry.0.push(task.to_string());
                entry.1.push(weight);
            }
            problem.add_variable(Variable::new(task, domain));
        }

        for value in order {
            if let Some((scope, weights)) = scopes.remove(&value) {
                problem.add_capacity(value, scope, weights, limit);
            }
        }
        problem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn josh_capacity(limit: i64) -> Constraint {
        Constraint::Capacity {
            value: "josh".into(),
            scope: vec!["helevator".into(), "roller".into(), "flume".into()],
            weights: vec![10, 20, 30],
            limit,
        }
    }

    #[test]
    fn test_capacity_satisfied() {
        let c = josh_capacity(30);
        let a = assignment(&[("helevator", "josh"), ("roller", "josh"), ("flume", "terry")]);
        assert_eq!(c.evaluate(&a), ConstraintStatus::Satisfied);
    }

    #[test]
    fn test_capacity_violated() {
        let c = josh_capacity(29);
        let a = assignment(&[("helevator", "josh"), ("roller", "josh"), ("flume", "terry")]);
        assert_eq!(c.evaluate(&a), ConstraintStatus::Violated);
    }

    #[test]
    fn test_capacity_partial() {
        let c = josh_capacity(30);
        let a = assignment(&[("helevator", "josh")]);
        assert_eq!(c.evaluate(&a), ConstraintStatus::Undetermined);

        // Already over the limit: no completion can repair it
        let a = assignment(&[("roller", "josh"), ("flume", "josh")]);
        assert_eq!(c.evaluate(&a), ConstraintStatus::Violated);
    }

    #[test]
    fn test_capacity_load_past_i64_max() {
        let c = Constraint::Capacity {
            value: "josh".into(),
            scope: vec!["roller".into(), "flume".into()],
            weights: vec![i64::MAX, i64::MAX],
            limit: i64::MAX,
        };
        let a = assignment(&[("roller", "josh"), ("flume", "josh")]);
        assert_eq!(c.evaluate(&a), ConstraintStatus::Violated);

        let a = assignment(&[("roller", "josh"), ("flume", "terry")]);
        assert_eq!(c.evaluate(&a), ConstraintStatus::Satisfied);
    }

    #[test]
    fn test_validate_ok() {
        let mut p = Problem::new("test");
        p.add_variable(Variable::new("a", Domain::new(["x", "y"])));
        p.add_variable(Variable::new("b", Domain::new(["y"])));
        p.add_capacity("y", vec!["a".into(), "b".into()], vec![1, 2], 3);
        assert!(p.validate().is_ok());
        assert_eq!(p.variable_count(), 2);
        assert_eq!(p.constraint_count(), 1);
        assert_eq!(p.candidate_count(), 3);
        assert_eq!(p.variable_index("b"), Some(1));
    }

    #[test]
    fn test_duplicate_variable() {
        let mut p = Problem::new("test");
        p.add_variable(Variable::new("a", Domain::new(["x"])));
        p.add_variable(Variable::new("a", Domain::new(["y"])));
        assert_eq!(
            p.validate(),
            Err(ModelError::DuplicateVariable("a".into()))
        );
    }

    #[test]
    fn test_undefined_variable() {
        let mut p = Problem::new("test");
        p.add_capacity("x", vec!["nonexistent".into()], vec![1], 5);
        assert_eq!(
            p.validate(),
            Err(ModelError::UndefinedVariable("nonexistent".into()))
        );
    }

    #[test]
    fn test_weight_mismatch() {
        let mut p = Problem::new("test");
        p.add_variable(Variable::new("a", Domain::new(["x"])));
        p.add_capacity("x", vec!["a".into()], vec![1, 2], 5);
        assert!(matches!(
            p.validate(),
            Err(ModelError::WeightMismatch { scope: 1, weights: 2, .. })
        ));
    }

    #[test]
    fn test_capacitated_assignment_layout() {
        let tasks = vec![
            ("helevator", 10, Domain::new(["charlie", "josh"])),
            ("roller", 20, Domain::new(["josh"])),
            ("flume", 30, Domain::new(["charlie", "josh", "terry"])),
        ];
        let p = Problem::capacitated_assignment("rides", tasks, 45);

        assert!(p.validate().is_ok());
        assert_eq!(p.variable_count(), 3);
        assert_eq!(p.constraint_count(), 3);

        match &p.constraints[1] {
            Constraint::Capacity {
                value,
                scope,
                weights,
                limit,
            } => {
                assert_eq!(value, "josh");
                assert_eq!(scope, &["helevator", "roller", "flume"]);
                assert_eq!(weights, &[10, 20, 30]);
                assert_eq!(*limit, 45);
            }
        }
        assert_eq!(p.constraints[2].scope(), &["flume".to_string()]);
    }
}

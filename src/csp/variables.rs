//! CSP variable and domain types.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordered, duplicate-free set of candidate values.
///
/// Order is significant: it is the order in which the solver tries
/// values when breaking ties deterministically.
///
/// # Examples
///
/// ```
/// use u_ridecheck::csp::Domain;
///
/// let d = Domain::new(["w1", "w2", "w1"]);
/// assert_eq!(d.values(), &["w1".to_string(), "w2".to_string()]);
/// assert_eq!(d.position("w2"), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Domain {
    values: Vec<String>,
}

impl Domain {
    /// Creates a domain from candidate values.
    ///
    /// Repeated values keep their first position.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for v in values {
            let v = v.into();
            if !out.contains(&v) {
                out.push(v);
            }
        }
        Self { values: out }
    }

    /// Creates a single-value domain.
    pub fn singleton(value: impl Into<String>) -> Self {
        Self {
            values: vec![value.into()],
        }
    }

    /// Candidate values in order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Number of candidate values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the domain has no candidates.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether `value` is a candidate.
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Index of `value` in the domain.
    pub fn position(&self, value: &str) -> Option<usize> {
        self.values.iter().position(|v| v == value)
    }
}

/// A decision variable with a finite domain.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Variable {
    /// Variable name (unique identifier within a problem).
    pub name: String,
    /// Candidate values.
    pub domain: Domain,
}

impl Variable {
    /// Creates a new variable.
    pub fn new(name: impl Into<String>, domain: Domain) -> Self {
        Self {
            name: name.into(),
            domain,
        }
    }

    /// Whether the variable has exactly one candidate value.
    pub fn is_fixed(&self) -> bool {
        self.domain.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_preserves_order() {
        let d = Domain::new(["c", "a", "b"]);
        assert_eq!(d.values(), &["c", "a", "b"]);
        assert_eq!(d.position("a"), Some(1));
        assert_eq!(d.position("z"), None);
    }

    #[test]
    fn test_domain_drops_duplicates() {
        let d = Domain::new(["a", "b", "a", "c", "b"]);
        assert_eq!(d.len(), 3);
        assert_eq!(d.values(), &["a", "b", "c"]);
    }

    #[test]
    fn test_empty_domain() {
        let d = Domain::new(Vec::<String>::new());
        assert!(d.is_empty());
        assert!(!d.contains("a"));
    }

    #[test]
    fn test_variable_fixed() {
        let v = Variable::new("ride", Domain::singleton("josh"));
        assert!(v.is_fixed());
        assert!(v.domain.contains("josh"));

        let w = Variable::new("ride", Domain::new(["josh", "terry"]));
        assert!(!w.is_fixed());
    }
}

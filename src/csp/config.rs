//! Min-Conflicts configuration.

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the solver breaks ties when picking variables and values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TieBreak {
    /// Uniform random choice driven by the configured seed.
    ///
    /// Initial values are drawn at random, the conflicted variable is
    /// drawn uniformly, and ties between best values are broken uniformly.
    #[default]
    Random,

    /// Fully reproducible choice without consulting the RNG.
    ///
    /// Initial values are the first domain element. Conflicted variables
    /// are visited round-robin in index order. Among best values the
    /// current one is kept, otherwise the lowest domain index wins.
    Deterministic,
}

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("max_steps must be positive")]
    ZeroMaxSteps,
    #[error("min_steps must be positive")]
    ZeroMinSteps,
    #[error("steps_per_candidate must be positive")]
    ZeroStepsPerCandidate,
}

/// Configuration for Min-Conflicts search.
///
/// # Examples
///
/// ```
/// use u_ridecheck::csp::{MinConflictsConfig, TieBreak};
///
/// let config = MinConflictsConfig::default()
///     .with_tie_break(TieBreak::Deterministic)
///     .with_min_steps(200);
/// assert_eq!(config.step_budget(10), 200);
/// assert_eq!(config.step_budget(100), 1000);
///
/// let pinned = config.with_max_steps(50);
/// assert_eq!(pinned.step_budget(100), 50);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MinConflictsConfig {
    /// Hard step budget. Overrides the derived budget when set.
    pub max_steps: Option<usize>,

    /// Lower bound of the derived step budget.
    pub min_steps: usize,

    /// Steps granted per domain candidate in the derived budget.
    ///
    /// Derived budget: `max(min_steps, steps_per_candidate * sum(domain sizes))`.
    pub steps_per_candidate: usize,

    /// Tie-breaking policy.
    pub tie_break: TieBreak,

    /// Random seed for reproducibility. `None` draws a fresh seed per run.
    ///
    /// Ignored by [`TieBreak::Deterministic`].
    pub seed: Option<u64>,

    /// Optional wall-clock time limit in milliseconds.
    ///
    /// Checked once per step.
    pub time_limit_ms: Option<u64>,
}

impl Default for MinConflictsConfig {
    fn default() -> Self {
        Self {
            max_steps: None,
            min_steps: 1000,
            steps_per_candidate: 10,
            tie_break: TieBreak::default(),
            seed: None,
            time_limit_ms: None,
        }
    }
}

impl MinConflictsConfig {
    /// Sets a fixed step budget.
    pub fn with_max_steps(mut self, n: usize) -> Self {
        self.max_steps = Some(n);
        self
    }

    /// Sets the lower bound of the derived step budget.
    pub fn with_min_steps(mut self, n: usize) -> Self {
        self.min_steps = n;
        self
    }

    /// Sets the steps granted per domain candidate.
    pub fn with_steps_per_candidate(mut self, n: usize) -> Self {
        self.steps_per_candidate = n;
        self
    }

    /// Sets the tie-breaking policy.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the wall-clock limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Step budget for a problem with `candidates` total domain entries.
    pub fn step_budget(&self, candidates: usize) -> usize {
        match self.max_steps {
            Some(n) => n,
            None => self
                .min_steps
                .max(self.steps_per_candidate.saturating_mul(candidates)),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_steps == Some(0) {
            return Err(ConfigError::ZeroMaxSteps);
        }
        if self.min_steps == 0 {
            return Err(ConfigError::ZeroMinSteps);
        }
        if self.steps_per_candidate == 0 {
            return Err(ConfigError::ZeroStepsPerCandidate);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MinConflictsConfig::default();
        assert_eq!(config.max_steps, None);
        assert_eq!(config.min_steps, 1000);
        assert_eq!(config.steps_per_candidate, 10);
        assert_eq!(config.tie_break, TieBreak::Random);
        assert!(config.seed.is_none());
        assert!(config.time_limit_ms.is_none());
    }

    #[test]
    fn test_step_budget_lower_bound() {
        let config = MinConflictsConfig::default();
        assert_eq!(config.step_budget(0), 1000);
        assert_eq!(config.step_budget(99), 1000);
        assert_eq!(config.step_budget(250), 2500);
    }

    #[test]
    fn test_builder() {
        let config = MinConflictsConfig::default()
            .with_max_steps(10)
            .with_min_steps(5)
            .with_steps_per_candidate(3)
            .with_tie_break(TieBreak::Deterministic)
            .with_seed(7)
            .with_time_limit_ms(250);

        assert_eq!(config.max_steps, Some(10));
        assert_eq!(config.min_steps, 5);
        assert_eq!(config.steps_per_candidate, 3);
        assert_eq!(config.tie_break, TieBreak::Deterministic);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.time_limit_ms, Some(250));
        assert_eq!(config.step_budget(1_000_000), 10);
    }

    #[test]
    fn test_validate() {
        assert!(MinConflictsConfig::default().validate().is_ok());
        assert_eq!(
            MinConflictsConfig::default().with_max_steps(0).validate(),
            Err(ConfigError::ZeroMaxSteps)
        );
        assert_eq!(
            MinConflictsConfig::default().with_min_steps(0).validate(),
            Err(ConfigError::ZeroMinSteps)
        );
        assert_eq!(
            MinConflictsConfig::default()
                .with_steps_per_candidate(0)
                .validate(),
            Err(ConfigError::ZeroStepsPerCandidate)
        );
    }
}

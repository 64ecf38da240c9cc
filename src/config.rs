//! PAC parameters shared by the solvers.

use crate::error::{PacError, Result};

/// The (ε, δ) accuracy target plus an optional ceiling on total pulls.
///
/// A solver built from this config looks for an arm whose expected value is
/// within `epsilon` of the best arm's, with probability at least `1 - delta`.
/// When `pull_limit` is set and a round would exceed it, the solver halts and
/// reports [`Outcome::BudgetExhausted`](crate::Outcome::BudgetExhausted).
///
/// # Examples
///
/// ```
/// use pacbandit::PacConfig;
///
/// let config = PacConfig::new(0.1, 0.05).unwrap().with_pull_limit(1_000_000);
/// assert_eq!(config.pull_limit(), Some(1_000_000));
///
/// assert!(PacConfig::new(0.0, 0.05).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PacConfig {
    epsilon: f64,
    delta: f64,
    pull_limit: Option<u64>,
}

impl PacConfig {
    /// Creates a config with no pull limit.
    ///
    /// Both `epsilon` and `delta` must lie in `(0, 1]`.
    pub fn new(epsilon: f64, delta: f64) -> Result<Self> {
        validate_epsilon(epsilon)?;
        validate_delta(delta)?;
        Ok(Self {
            epsilon,
            delta,
            pull_limit: None,
        })
    }

    /// Like [`new`](Self::new) but also accepts `epsilon == 0`.
    ///
    /// Zero epsilon asks exponential-gap elimination to keep going until one
    /// arm is left, so it is only accepted together with a pull limit.
    pub(crate) fn unbounded_rounds(delta: f64, pull_limit: u64) -> Result<Self> {
        validate_delta(delta)?;
        Ok(Self {
            epsilon: 0.0,
            delta,
            pull_limit: Some(pull_limit),
        })
    }

    /// Same pull limit with a different (ε, δ) pair, for nested solves.
    pub(crate) fn rescaled(&self, epsilon: f64, delta: f64) -> Result<Self> {
        validate_epsilon(epsilon)?;
        validate_delta(delta)?;
        Ok(Self {
            epsilon,
            delta,
            pull_limit: self.pull_limit,
        })
    }

    /// Sets the pull limit
    #[must_use]
    pub fn with_pull_limit(mut self, limit: u64) -> Self {
        self.pull_limit = Some(limit);
        self
    }

    /// Removes the pull limit
    #[must_use]
    pub fn without_pull_limit(mut self) -> Self {
        self.pull_limit = None;
        self
    }

    /// Gets epsilon
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Gets delta
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Gets the pull limit, `None` when unbounded
    pub fn pull_limit(&self) -> Option<u64> {
        self.pull_limit
    }

    /// True when spending `cost` more pulls on top of `total` would pass the limit.
    pub(crate) fn exceeds_limit(&self, total: u64, cost: u64) -> bool {
        self.pull_limit
            .is_some_and(|limit| total.saturating_add(cost) > limit)
    }
}

pub(crate) fn validate_epsilon(epsilon: f64) -> Result<()> {
    if epsilon > 0.0 && epsilon <= 1.0 {
        Ok(())
    } else {
        Err(PacError::invalid(format!(
            "epsilon must be in (0, 1], got {epsilon}"
        )))
    }
}

pub(crate) fn validate_delta(delta: f64) -> Result<()> {
    if delta > 0.0 && delta <= 1.0 {
        Ok(())
    } else {
        Err(PacError::invalid(format!(
            "delta must be in (0, 1], got {delta}"
        )))
    }
}

pub(crate) fn validate_players(players: usize) -> Result<()> {
    if players == 0 {
        Err(PacError::invalid("number of players must be positive"))
    } else {
        Ok(())
    }
}

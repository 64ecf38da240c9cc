use tracing::{debug, warn};

use crate::arm::BanditArm;
use crate::bounds;
use crate::config::PacConfig;
use crate::error::{PacError, Result};
use crate::sequential::MedianElimination;
use crate::solver::{Outcome, Solution, Solver, sample_mean};

/// Exponential-gap elimination (Karnin, Koren and Somekh, 2013).
///
/// Round `r` samples every survivor `2 / ε_r² · ln(2 / δ_r)` times with
/// `ε_r = 2^-r / 4`, asks an inner [`MedianElimination`] for an
/// `(ε_r / 2, δ_r)`-good reference arm among the survivors, and keeps only the
/// arms whose round estimate is within `ε_r` of the reference. Arms with large
/// gaps are discarded after few, cheap rounds.
///
/// Rounds run while `r < ceil(log2(1 / ε))`. Solvers built with
/// [`unbounded`](Self::unbounded) have `ε = 0` and run until a single arm is
/// left or the pull limit is reached.
///
/// # Examples
///
/// ```
/// use pacbandit::{ExpGapElimination, Solver, make_bernoulli_bandit};
///
/// let arms = make_bernoulli_bandit(&[0.1, 0.2, 0.9], 3).unwrap();
/// let solver = ExpGapElimination::new(0.2, 0.1).unwrap();
/// assert_eq!(solver.solve(&arms).unwrap().arm, 2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExpGapElimination {
    config: PacConfig,
}

impl ExpGapElimination {
    /// Creates a solver with no pull limit
    pub fn new(epsilon: f64, delta: f64) -> Result<Self> {
        Self::from_config(PacConfig::new(epsilon, delta)?)
    }

    /// Creates a solver with `ε = 0`: rounds continue until one arm survives or
    /// `pull_limit` would be exceeded.
    pub fn unbounded(delta: f64, pull_limit: u64) -> Result<Self> {
        Self::from_config(PacConfig::unbounded_rounds(delta, pull_limit)?)
    }

    /// Creates a solver from a config.
    ///
    /// Fails for a zero-epsilon config without a pull limit, since its round
    /// loop has no other exit on tied arms.
    pub fn from_config(config: PacConfig) -> Result<Self> {
        if config.epsilon() == 0.0 && config.pull_limit().is_none() {
            return Err(PacError::invalid(
                "epsilon = 0 requires a pull limit",
            ));
        }
        Ok(Self { config })
    }

    /// Sets the pull limit
    #[must_use]
    pub fn with_pull_limit(mut self, limit: u64) -> Self {
        self.config = self.config.with_pull_limit(limit);
        self
    }

    /// Gets the solver parameters
    pub fn config(&self) -> &PacConfig {
        &self.config
    }
}

impl<A: BanditArm> Solver<A> for ExpGapElimination {
    fn solve_tracked(&self, arms: &[A], total_pulls: &mut u64) -> Result<Solution> {
        if arms.is_empty() {
            return Err(PacError::NoArmsAvailable);
        }

        let start = *total_pulls;
        let round_limit = bounds::exp_gap_round_limit(self.config.epsilon());
        let mut survivors: Vec<usize> = (0..arms.len()).collect();
        let mut round = 1u32;

        while survivors.len() > 1 && round_limit.is_none_or(|limit| round < limit) {
            let (epsilon, delta) = bounds::exp_gap_round_params(round, self.config.delta());
            let num_pulls = bounds::exp_gap_pulls(epsilon, delta);
            let cost = (survivors.len() as u64).saturating_mul(num_pulls);
            if self.config.exceeds_limit(*total_pulls, cost) {
                warn!(
                    round,
                    survivors = survivors.len(),
                    total_pulls = *total_pulls,
                    "exponential-gap elimination hit the pull limit"
                );
                return Ok(Solution::exhausted(survivors[0], *total_pulls - start));
            }
            *total_pulls = total_pulls.saturating_add(cost);

            let values: Vec<f64> = survivors
                .iter()
                .map(|&idx| sample_mean(&arms[idx], num_pulls))
                .collect();

            // TODO: reuse `values` as the first round of the inner elimination
            // instead of sampling the survivors again.
            let inner = MedianElimination::from_config(self.config.rescaled(epsilon / 2.0, delta)?);
            let (best, outcome) = inner.eliminate(arms, &survivors, total_pulls);
            if outcome == Outcome::BudgetExhausted {
                return Ok(Solution::exhausted(survivors[0], *total_pulls - start));
            }

            let threshold = values[best] - epsilon;
            let before = survivors.len();
            survivors = survivors
                .into_iter()
                .zip(values)
                .filter(|&(_, value)| value >= threshold)
                .map(|(idx, _)| idx)
                .collect();

            debug!(
                round,
                num_pulls,
                epsilon,
                before,
                after = survivors.len(),
                "exponential-gap round"
            );
            round += 1;
        }

        Ok(Solution::converged(survivors[0], *total_pulls - start))
    }

    fn name(&self) -> &'static str {
        "exp_gap_elimination"
    }
}

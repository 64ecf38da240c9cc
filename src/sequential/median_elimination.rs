use tracing::{debug, warn};

use crate::arm::BanditArm;
use crate::bounds;
use crate::config::PacConfig;
use crate::error::{PacError, Result};
use crate::median::MedianHeap;
use crate::solver::{Outcome, Solution, Solver, sample_mean};

/// Median elimination (Even-Dar, Mannor and Mansour, 2002).
///
/// Every round samples all surviving arms equally and drops the half whose
/// empirical mean falls below the median, so `n` arms are resolved in
/// `ceil(log2 n)` rounds. The per-round tolerance shrinks by `3/4` and the
/// per-round failure probability halves, which keeps the total error within
/// (ε, δ).
///
/// # Examples
///
/// ```
/// use pacbandit::{MedianElimination, Solver, make_bernoulli_bandit};
///
/// let arms = make_bernoulli_bandit(&[0.2, 0.9, 0.3], 7).unwrap();
/// let solver = MedianElimination::new(0.2, 0.1).unwrap();
/// let solution = solver.solve(&arms).unwrap();
/// assert_eq!(solution.arm, 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MedianElimination {
    config: PacConfig,
}

impl MedianElimination {
    /// Creates a solver with no pull limit
    pub fn new(epsilon: f64, delta: f64) -> Result<Self> {
        Ok(Self::from_config(PacConfig::new(epsilon, delta)?))
    }

    /// Creates a solver from a validated config
    pub fn from_config(config: PacConfig) -> Self {
        Self { config }
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

    /// Runs the elimination over `arms[candidates[..]]`.
    ///
    /// Returns the position of the winner inside `candidates` together with the
    /// outcome. `candidates` must not be empty.
    pub(crate) fn eliminate<A: BanditArm>(
        &self,
        arms: &[A],
        candidates: &[usize],
        total_pulls: &mut u64,
    ) -> (usize, Outcome) {
        let mut epsilon = self.config.epsilon() / 4.0;
        let mut delta = self.config.delta() / 2.0;
        let mut survivors: Vec<usize> = (0..candidates.len()).collect();
        let mut round = 1u32;

        while survivors.len() > 1 {
            let num_pulls = bounds::median_elimination_pulls(epsilon, delta);
            let cost = (survivors.len() as u64).saturating_mul(num_pulls);
            if self.config.exceeds_limit(*total_pulls, cost) {
                warn!(
                    round,
                    survivors = survivors.len(),
                    total_pulls = *total_pulls,
                    "median elimination hit the pull limit"
                );
                return (survivors[0], Outcome::BudgetExhausted);
            }
            *total_pulls = total_pulls.saturating_add(cost);

            let mut medians = MedianHeap::with_capacity(survivors.len());
            for &pos in &survivors {
                medians.push(sample_mean(&arms[candidates[pos]], num_pulls), pos);
            }

            let mut upper = medians.upper_ids();
            upper.sort_unstable();
            debug!(
                round,
                num_pulls,
                epsilon,
                before = survivors.len(),
                after = upper.len(),
                "median elimination round"
            );

            survivors = upper;
            epsilon *= 0.75;
            delta /= 2.0;
            round += 1;
        }

        (survivors[0], Outcome::Converged)
    }
}

impl<A: BanditArm> Solver<A> for MedianElimination {
    fn solve_tracked(&self, arms: &[A], total_pulls: &mut u64) -> Result<Solution> {
        if arms.is_empty() {
            return Err(PacError::NoArmsAvailable);
        }

        let start = *total_pulls;
        let candidates: Vec<usize> = (0..arms.len()).collect();
        let (pos, outcome) = self.eliminate(arms, &candidates, total_pulls);

        Ok(Solution {
            arm: candidates[pos],
            pulls: *total_pulls - start,
            outcome,
        })
    }

    fn name(&self) -> &'static str {
        "median_elimination"
    }
}

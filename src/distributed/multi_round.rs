use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::arm::BanditArm;
use crate::bounds;
use crate::config::{PacConfig, validate_players};
use crate::distributed::player_pool;
use crate::error::{PacError, Result};
use crate::solver::{Solution, Solver, sample_mean};

/// Multi-round distributed ε-arm identification.
///
/// Round `r` uses `ε_r = 2^-r` and a cumulative per-player sampling time
/// `t_r = 2 / (P ε_r²) · ln(4 n r² / δ)`. Every player pulls each survivor
/// `ceil(t_r - t_{r-1})` times and folds the round mean into its own running
/// average for that arm. After the join the coordinator averages each
/// survivor across players and keeps the arms within `ε_r` of the best one.
/// Rounds continue while more than one arm survives and `ε_r > ε / 2`.
///
/// # Examples
///
/// ```
/// use pacbandit::{MultiRoundEpsilonArm, Solver, make_bernoulli_bandit};
///
/// let arms = make_bernoulli_bandit(&[0.1, 0.9, 0.2], 9).unwrap();
/// let solver = MultiRoundEpsilonArm::new(2, 0.2, 0.1).unwrap();
/// assert_eq!(solver.solve(&arms).unwrap().arm, 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MultiRoundEpsilonArm {
    players: usize,
    config: PacConfig,
}

impl MultiRoundEpsilonArm {
    /// Creates a solver with no pull limit.
    ///
    /// Each solve starts one pool thread per player, at most
    /// [`MAX_POOL_THREADS`]; further players share those threads.
    ///
    /// [`MAX_POOL_THREADS`]: crate::distributed::MAX_POOL_THREADS
    pub fn new(players: usize, epsilon: f64, delta: f64) -> Result<Self> {
        Self::from_config(players, PacConfig::new(epsilon, delta)?)
    }

    /// Creates a solver from a validated config
    pub fn from_config(players: usize, config: PacConfig) -> Result<Self> {
        validate_players(players)?;
        Ok(Self { players, config })
    }

    /// Sets the pull limit, counted over all players
    #[must_use]
    pub fn with_pull_limit(mut self, limit: u64) -> Self {
        self.config = self.config.with_pull_limit(limit);
        self
    }

    /// Gets the number of players
    pub fn players(&self) -> usize {
        self.players
    }

    /// Gets the solver parameters
    pub fn config(&self) -> &PacConfig {
        &self.config
    }
}

impl<A: BanditArm> Solver<A> for MultiRoundEpsilonArm {
    fn solve_tracked(&self, arms: &[A], total_pulls: &mut u64) -> Result<Solution> {
        if arms.is_empty() {
            return Err(PacError::NoArmsAvailable);
        }

        let start = *total_pulls;
        let num_arms = arms.len();
        let pool = player_pool(self.players)?;

        // players x arms running averages; row p is only touched by player p.
        let mut tables = vec![vec![0.0; num_arms]; self.players];
        let mut survivors: Vec<usize> = (0..num_arms).collect();
        let mut round = 1u32;
        let mut epsilon = 1.0;
        let mut time = 0.0;

        while survivors.len() > 1 && epsilon > self.config.epsilon() / 2.0 {
            let previous = time;
            epsilon = 2f64.powi(-(round as i32));
            time = bounds::multi_round_time(self.players, epsilon, num_arms, round, self.config.delta());
            let num_pulls = bounds::ceil_pulls(time - previous);

            let cost = (self.players as u64)
                .saturating_mul(survivors.len() as u64)
                .saturating_mul(num_pulls);
            if self.config.exceeds_limit(*total_pulls, cost) {
                warn!(
                    round,
                    survivors = survivors.len(),
                    total_pulls = *total_pulls,
                    "multi-round elimination hit the pull limit"
                );
                return Ok(Solution::exhausted(survivors[0], *total_pulls - start));
            }
            *total_pulls = total_pulls.saturating_add(cost);

            let weight = f64::from(round);
            pool.install(|| {
                tables.par_iter_mut().enumerate().for_each(|(player, table)| {
                    for &idx in &survivors {
                        let mean = sample_mean(&arms[idx], num_pulls);
                        table[idx] += (mean - table[idx]) / weight;
                    }
                    trace!(player, round, num_pulls, "player finished round");
                });
            });

            let averages: Vec<f64> = survivors
                .iter()
                .map(|&idx| tables.iter().map(|table| table[idx]).sum::<f64>() / self.players as f64)
                .collect();
            let best = averages.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            let before = survivors.len();
            survivors = survivors
                .into_iter()
                .zip(averages)
                .filter(|&(_, value)| value >= best - epsilon)
                .map(|(idx, _)| idx)
                .collect();

            debug!(
                round,
                num_pulls,
                epsilon,
                best,
                before,
                after = survivors.len(),
                "multi-round elimination round"
            );
            round += 1;
        }

        Ok(Solution::converged(survivors[0], *total_pulls - start))
    }

    fn name(&self) -> &'static str {
        "multi_round_epsilon_arm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::Outcome;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct Constant(f64);

    impl BanditArm for Constant {
        fn pull(&self) -> f64 {
            self.0
        }
    }

    struct Counting {
        value: f64,
        pulls: AtomicU64,
    }

    impl BanditArm for Counting {
        fn pull(&self) -> f64 {
            self.pulls.fetch_add(1, Ordering::Relaxed);
            self.value
        }
    }

    #[test]
    fn test_validation() {
        assert!(MultiRoundEpsilonArm::new(0, 0.1, 0.1).is_err());
        assert!(MultiRoundEpsilonArm::new(2, 0.0, 0.1).is_err());
        assert!(MultiRoundEpsilonArm::new(2, 0.1, 1.5).is_err());
        assert_eq!(MultiRoundEpsilonArm::new(3, 0.1, 0.1).unwrap().players(), 3);
    }

    #[test]
    fn test_shrinks_to_best_constant_arm() {
        // 0.2 goes in round 1, 0.5 in round 2, 0.85 in round 5.
        let arms = [Constant(0.2), Constant(0.9), Constant(0.5), Constant(0.85)];
        let solver = MultiRoundEpsilonArm::new(3, 0.1, 0.1).unwrap();

        let solution = solver.solve(&arms).unwrap();
        assert_eq!(solution.arm, 1);
        assert_eq!(solution.outcome, Outcome::Converged);

        // Survivors per round: 4, 3, 2, 2, 2.
        let mut previous = 0.0;
        let mut expected = 0;
        for (round, survivors) in [(1u32, 4u64), (2, 3), (3, 2), (4, 2), (5, 2)] {
            let epsilon = 2f64.powi(-(round as i32));
            let time = bounds::multi_round_time(3, epsilon, 4, round, 0.1);
            expected += 3 * survivors * bounds::ceil_pulls(time - previous);
            previous = time;
        }
        assert_eq!(solution.pulls, expected);
    }

    #[test]
    fn test_pull_count_matches_arm_pulls() {
        let arms: Vec<Counting> = [0.3, 0.8, 0.6]
            .into_iter()
            .map(|value| Counting {
                value,
                pulls: AtomicU64::new(0),
            })
            .collect();
        let solver = MultiRoundEpsilonArm::new(4, 0.1, 0.1).unwrap();

        let solution = solver.solve(&arms).unwrap();
        let drawn: u64 = arms.iter().map(|arm| arm.pulls.load(Ordering::Relaxed)).sum();
        assert_eq!(solution.arm, 1);
        assert_eq!(solution.pulls, drawn);
    }

    #[test]
    fn test_tied_arms_stop_at_epsilon() {
        let arms = [Constant(0.5), Constant(0.5), Constant(0.5)];
        let solver = MultiRoundEpsilonArm::new(2, 0.5, 0.1).unwrap();

        // Rounds 1 and 2 run, then 2^-2 is no longer above 0.5 / 2.
        let first = bounds::ceil_pulls(bounds::multi_round_time(2, 0.5, 3, 1, 0.1));
        let time_1 = bounds::multi_round_time(2, 0.5, 3, 1, 0.1);
        let time_2 = bounds::multi_round_time(2, 0.25, 3, 2, 0.1);
        let second = bounds::ceil_pulls(time_2 - time_1);

        let solution = solver.solve(&arms).unwrap();
        assert_eq!(solution.arm, 0);
        assert!(solution.is_verified());
        assert_eq!(solution.pulls, 2 * 3 * (first + second));
    }

    #[test]
    fn test_pull_limit_halts() {
        let arms = [Constant(0.1), Constant(0.9)];
        let solver = MultiRoundEpsilonArm::new(2, 0.1, 0.1).unwrap().with_pull_limit(10);

        let solution = solver.solve(&arms).unwrap();
        assert_eq!(solution.arm, 0);
        assert_eq!(solution.pulls, 0);
        assert_eq!(solution.outcome, Outcome::BudgetExhausted);
    }

    #[test]
    fn test_more_players_than_pool_threads() {
        let arms = [Constant(0.1), Constant(0.9)];
        let solver = MultiRoundEpsilonArm::new(100, 0.5, 0.1).unwrap();

        // Round 1 drops 0.1; every one of the 100 players pulled both arms.
        let time = bounds::multi_round_time(100, 0.5, 2, 1, 0.1);
        let solution = solver.solve(&arms).unwrap();
        assert_eq!(solution.arm, 1);
        assert_eq!(solution.pulls, 100 * 2 * bounds::ceil_pulls(time));
    }

    #[test]
    fn test_single_arm() {
        let arms = [Constant(0.4)];
        let solution = MultiRoundEpsilonArm::new(2, 0.1, 0.1).unwrap().solve(&arms).unwrap();
        assert_eq!(solution.arm, 0);
        assert_eq!(solution.pulls, 0);
    }

    #[test]
    fn test_empty_arms_rejected() {
        let arms: Vec<Constant> = Vec::new();
        let result = MultiRoundEpsilonArm::new(2, 0.1, 0.1).unwrap().solve(&arms);
        assert!(matches!(result, Err(PacError::NoArmsAvailable)));
    }
}

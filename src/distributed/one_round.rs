use std::sync::atomic::{AtomicU64, Ordering};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::arm::BanditArm;
use crate::bounds;
use crate::config::validate_players;
use crate::distributed::{player_pool, player_seed};
use crate::error::{PacError, Result};
use crate::sequential::ExpGapElimination;
use crate::solver::{Outcome, Solution, Solver, sample_mean};

/// Confidence each player's exploration runs at.
const EXPLORE_DELTA: f64 = 1.0 / 3.0;

/// One-round distributed best-arm identification.
///
/// Every player independently explores a random subset of
/// `min(ceil(6 n / sqrt(P)), n)` arms with zero-epsilon
/// [`ExpGapElimination`] under half of its time horizon, then spends the other
/// half pulling only its candidate. After the single join, an arm needs
/// reports from at least `sqrt(P)` players to be eligible; the eligible arm
/// with the highest averaged value wins. The best arm is found with
/// probability at least 2/3.
///
/// # Examples
///
/// ```
/// use pacbandit::{OneRoundBestArm, Solver, make_bernoulli_bandit};
///
/// let arms = make_bernoulli_bandit(&[0.1, 0.9, 0.2], 5).unwrap();
/// let solver = OneRoundBestArm::new(2, 200_000).unwrap().with_seed(1);
/// let solution = solver.solve(&arms).unwrap();
/// assert!(solution.arm < arms.len());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OneRoundBestArm {
    players: usize,
    time_horizon: u64,
    seed: Option<u64>,
}

/// What one player sends back after its exploit phase.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Report {
    arm: usize,
    value: f64,
}

impl OneRoundBestArm {
    /// Creates a solver for `players` players, each allowed `time_horizon` pulls.
    ///
    /// `time_horizon` must be at least 2 so both phases get a pull. Each solve
    /// starts one pool thread per player, at most [`MAX_POOL_THREADS`]; further
    /// players share those threads.
    ///
    /// [`MAX_POOL_THREADS`]: crate::distributed::MAX_POOL_THREADS
    pub fn new(players: usize, time_horizon: u64) -> Result<Self> {
        validate_players(players)?;
        if time_horizon < 2 {
            return Err(PacError::invalid(format!(
                "time horizon must be at least 2, got {time_horizon}"
            )));
        }
        Ok(Self {
            players,
            time_horizon,
            seed: None,
        })
    }

    /// Seeds the players' subset shuffles
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Gets the number of players
    pub fn players(&self) -> usize {
        self.players
    }

    /// Gets the per-player pull horizon
    pub fn time_horizon(&self) -> u64 {
        self.time_horizon
    }

    fn play<A: BanditArm>(
        &self,
        arms: &[A],
        player: usize,
        base_seed: u64,
        explorer: &ExpGapElimination,
        pulls: &AtomicU64,
    ) -> Result<Report> {
        let half = self.time_horizon / 2;
        let subset_size = bounds::one_round_subset_size(arms.len(), self.players);

        let mut rng = StdRng::seed_from_u64(player_seed(base_seed, player));
        let mut order: Vec<usize> = (0..arms.len()).collect();
        order.shuffle(&mut rng);
        order.truncate(subset_size);

        // Explore
        let subset: Vec<&A> = order.iter().map(|&idx| &arms[idx]).collect();
        let explored = explorer.solve(subset.as_slice())?;
        pulls.fetch_add(explored.pulls, Ordering::Relaxed);

        // Exploit
        let arm = order[explored.arm];
        let value = sample_mean(&arms[arm], half);
        pulls.fetch_add(half, Ordering::Relaxed);

        trace!(player, arm, value, explore_pulls = explored.pulls, "player report");
        Ok(Report { arm, value })
    }
}

/// Averages the reports per arm and picks the best arm reported by at least
/// `quorum` players. Ties go to the lower index.
fn aggregate(reports: &[Report], num_arms: usize, quorum: f64) -> Option<(usize, f64)> {
    let mut totals = vec![0.0; num_arms];
    let mut counts = vec![0usize; num_arms];
    for report in reports {
        totals[report.arm] += report.value;
        counts[report.arm] += 1;
    }

    let mut best: Option<(usize, f64)> = None;
    for arm in 0..num_arms {
        if counts[arm] == 0 || (counts[arm] as f64) < quorum {
            continue;
        }
        let value = totals[arm] / counts[arm] as f64;
        if best.is_none_or(|(_, best_value)| value > best_value) {
            best = Some((arm, value));
        }
    }
    best
}

impl<A: BanditArm> Solver<A> for OneRoundBestArm {
    fn solve_tracked(&self, arms: &[A], total_pulls: &mut u64) -> Result<Solution> {
        if arms.is_empty() {
            return Err(PacError::NoArmsAvailable);
        }

        let explorer = ExpGapElimination::unbounded(EXPLORE_DELTA, self.time_horizon / 2)?;
        let base_seed = self.seed.unwrap_or_else(|| rand::rng().random());
        let pulls = AtomicU64::new(0);

        let pool = player_pool(self.players)?;
        let reports: Vec<Report> = pool.install(|| {
            (0..self.players)
                .into_par_iter()
                .map(|player| self.play(arms, player, base_seed, &explorer, &pulls))
                .collect::<Result<Vec<_>>>()
        })?;

        let pulls = pulls.into_inner();
        *total_pulls = total_pulls.saturating_add(pulls);

        let quorum = bounds::one_round_quorum(self.players);
        let solution = match aggregate(&reports, arms.len(), quorum) {
            Some((arm, value)) => {
                debug!(arm, value, players = self.players, pulls, "one-round consensus");
                Solution::converged(arm, pulls)
            }
            None => {
                debug!(players = self.players, pulls, "one-round found no consensus");
                Solution {
                    arm: arms.len() - 1,
                    pulls,
                    outcome: Outcome::NoConsensus,
                }
            }
        };
        Ok(solution)
    }

    fn name(&self) -> &'static str {
        "one_round_best_arm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    impl Counting {
        fn new(value: f64) -> Self {
            Self {
                value,
                pulls: AtomicU64::new(0),
            }
        }
    }

    impl BanditArm for Counting {
        fn pull(&self) -> f64 {
            self.pulls.fetch_add(1, Ordering::Relaxed);
            self.value
        }
    }

    #[test]
    fn test_validation() {
        assert!(OneRoundBestArm::new(0, 100).is_err());
        assert!(OneRoundBestArm::new(4, 1).is_err());
        assert!(OneRoundBestArm::new(4, 2).is_ok());
    }

    #[test]
    fn test_players_agree_on_clear_winner() {
        let arms = [Constant(0.2), Constant(0.9), Constant(0.1)];
        let solver = OneRoundBestArm::new(4, 2_000_000).unwrap().with_seed(7);

        let solution = solver.solve(&arms).unwrap();
        assert_eq!(solution.arm, 1);
        assert_eq!(solution.outcome, Outcome::Converged);
    }

    #[test]
    fn test_pull_count_matches_arm_pulls() {
        let arms: Vec<Counting> = [0.2, 0.9, 0.1].into_iter().map(Counting::new).collect();
        let solver = OneRoundBestArm::new(3, 2_000_000).unwrap().with_seed(3);

        let mut total = 5;
        let solution = solver.solve_tracked(&arms, &mut total).unwrap();
        let drawn: u64 = arms.iter().map(|arm| arm.pulls.load(Ordering::Relaxed)).sum();

        assert_eq!(solution.pulls, drawn);
        assert_eq!(total, 5 + drawn);
        // Each player spends exactly half its horizon exploiting.
        assert!(drawn >= 3 * 1_000_000);
        assert!(drawn <= 3 * 2_000_000);
    }

    #[test]
    fn test_tiny_horizon_still_returns_valid_arm() {
        let arms: Vec<Constant> = (0..10).map(|i| Constant(i as f64 / 10.0)).collect();
        let solver = OneRoundBestArm::new(4, 2).unwrap().with_seed(11);

        let solution = solver.solve(&arms).unwrap();
        assert!(solution.arm < arms.len());
        assert_eq!(solution.pulls, 4);
    }

    #[test]
    fn test_no_quorum_falls_back_to_last_arm() {
        // Four players on ten tied arms with a one-pull explore phase; the
        // seed-0 reports land on four distinct arms, none reaching sqrt(4).
        let arms: Vec<Constant> = (0..10).map(|_| Constant(0.5)).collect();
        let solver = OneRoundBestArm::new(4, 2).unwrap().with_seed(0);

        let solution = solver.solve(&arms).unwrap();
        assert_eq!(solution.arm, arms.len() - 1);
        assert_eq!(solution.outcome, Outcome::NoConsensus);
        assert_eq!(solution.pulls, 4);
        assert!(!solution.is_verified());
    }

    #[test]
    fn test_more_players_than_pool_threads() {
        let arms = [Constant(0.2), Constant(0.9), Constant(0.1)];
        let solver = OneRoundBestArm::new(100, 2).unwrap().with_seed(5);

        let solution = solver.solve(&arms).unwrap();
        assert!(solution.arm < arms.len());
        assert_eq!(solution.pulls, 100);
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let arms: Vec<Constant> = (0..10).map(|i| Constant(i as f64 / 10.0)).collect();
        let solver = OneRoundBestArm::new(4, 2).unwrap().with_seed(99);

        let first = solver.solve(&arms).unwrap();
        let second = solver.solve(&arms).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_arms_rejected() {
        let arms: Vec<Constant> = Vec::new();
        let result = OneRoundBestArm::new(2, 10).unwrap().solve(&arms);
        assert!(matches!(result, Err(PacError::NoArmsAvailable)));
    }

    #[test]
    fn test_aggregate_quorum() {
        let reports = [
            Report { arm: 0, value: 0.9 },
            Report { arm: 1, value: 0.6 },
            Report { arm: 1, value: 0.5 },
            Report { arm: 2, value: 0.4 },
            Report { arm: 2, value: 0.4 },
        ];

        // Arm 0 has the best value but only one report.
        assert_eq!(aggregate(&reports, 3, 2.0), Some((1, 0.55)));
        assert_eq!(aggregate(&reports, 3, 1.0), Some((0, 0.9)));
        assert_eq!(aggregate(&reports, 3, 2.5), None);
    }

    #[test]
    fn test_aggregate_ties_prefer_lower_index() {
        let reports = [
            Report { arm: 2, value: 0.5 },
            Report { arm: 1, value: 0.5 },
        ];
        assert_eq!(aggregate(&reports, 3, 1.0), Some((1, 0.5)));
    }

    #[test]
    fn test_aggregate_accepts_zero_valued_arm() {
        let reports = [Report { arm: 0, value: 0.0 }, Report { arm: 0, value: 0.0 }];
        assert_eq!(aggregate(&reports, 2, 1.5), Some((0, 0.0)));
    }
}

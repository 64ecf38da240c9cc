//! Solver trait shared by every PAC best-arm algorithm.

use crate::arm::BanditArm;
use crate::error::Result;

/// How a solve finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The elimination schedule ran to completion; the PAC guarantee holds.
    Converged,
    /// The pull limit stopped the solve early; the returned arm is simply the
    /// first survivor and carries no guarantee.
    BudgetExhausted,
    /// One-round aggregation only: no arm was reported by enough players, so
    /// the default arm (the last index) was returned.
    NoConsensus,
}

/// Result of a solve: the chosen arm plus how many pulls it took.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Solution {
    /// Index of the chosen arm in the slice passed to `solve`
    pub arm: usize,
    /// Pulls drawn by this solve across all arms and players
    pub pulls: u64,
    /// How the solve finished
    pub outcome: Outcome,
}

impl Solution {
    pub(crate) fn converged(arm: usize, pulls: u64) -> Self {
        Self {
            arm,
            pulls,
            outcome: Outcome::Converged,
        }
    }

    pub(crate) fn exhausted(arm: usize, pulls: u64) -> Self {
        Self {
            arm,
            pulls,
            outcome: Outcome::BudgetExhausted,
        }
    }

    /// True when the solve finished without hitting the pull limit or
    /// falling back to a default arm.
    pub fn is_verified(&self) -> bool {
        self.outcome == Outcome::Converged
    }
}

/// A best-arm identification strategy.
///
/// Solvers are small immutable parameter holders; all per-solve state lives on
/// the stack of [`solve_tracked`](Solver::solve_tracked). The trait is generic
/// over the arm type rather than its methods so that `Box<dyn Solver<A>>`
/// works.
pub trait Solver<A: BanditArm> {
    /// Identify a good arm, adding every pull to `total_pulls`.
    ///
    /// `total_pulls` is the running total checked against the pull limit, so
    /// callers can chain solves under one budget. The returned
    /// [`Solution::pulls`] counts only the pulls drawn by this call.
    fn solve_tracked(&self, arms: &[A], total_pulls: &mut u64) -> Result<Solution>;

    /// Identify a good arm starting from a zero pull count.
    fn solve(&self, arms: &[A]) -> Result<Solution> {
        let mut total_pulls = 0;
        self.solve_tracked(arms, &mut total_pulls)
    }

    /// Short human-readable name, used in logs and result tables
    fn name(&self) -> &'static str;
}

/// Mean of `num_pulls` fresh samples of `arm`.
pub(crate) fn sample_mean<A: BanditArm + ?Sized>(arm: &A, num_pulls: u64) -> f64 {
    let mut total = 0.0;
    for _ in 0..num_pulls {
        total += arm.pull();
    }
    total / num_pulls as f64
}

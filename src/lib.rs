//! PacBandit: PAC best-arm identification for multi-armed bandits.
//!
//! Given a set of stochastic arms, each solver finds an arm whose expected
//! reward is within ε of the best one with probability at least `1 - δ`,
//! using as few pulls as its schedule allows. Four algorithms are provided:
//!
//! - [`MedianElimination`]: halves the arm set each round around the median
//!   empirical mean.
//! - [`ExpGapElimination`]: exponentially shrinking gaps with an inner median
//!   elimination as reference.
//! - [`OneRoundBestArm`]: independent players that explore random subsets and
//!   vote once.
//! - [`MultiRoundEpsilonArm`]: players sample every survivor in parallel and
//!   a coordinator eliminates between rounds.
//!
//! # Quick Start
//!
//! ```
//! use pacbandit::prelude::*;
//!
//! // Three coins, the last one is the best
//! let arms = make_bernoulli_bandit(&[0.2, 0.4, 0.8], 42).unwrap();
//!
//! let solver = MedianElimination::new(0.2, 0.1).unwrap();
//! let solution = solver.solve(&arms).unwrap();
//! assert_eq!(solution.arm, 2);
//! assert!(solution.is_verified());
//!
//! // Cap the total number of pulls
//! let capped = MedianElimination::new(0.01, 0.01).unwrap().with_pull_limit(1_000);
//! let solution = capped.solve(&arms).unwrap();
//! assert_eq!(solution.outcome, Outcome::BudgetExhausted);
//! ```

mod arm;
pub mod bounds;
mod config;
pub mod distributed;
mod error;
mod median;
pub mod sequential;
mod solver;

// Re-export main types
pub use arm::{BanditArm, BernoulliArm, make_bernoulli_bandit, make_bernoulli_bandit_with_gap};
pub use config::PacConfig;
pub use distributed::{MultiRoundEpsilonArm, OneRoundBestArm};
pub use error::{PacError, Result};
pub use median::MedianHeap;
pub use sequential::{ExpGapElimination, MedianElimination};
pub use solver::{Outcome, Solution, Solver};

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use pacbandit::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BanditArm, BernoulliArm, ExpGapElimination, MedianElimination, MultiRoundEpsilonArm,
        OneRoundBestArm, Outcome, PacConfig, PacError, Result, Solution, Solver,
        make_bernoulli_bandit,
    };
}

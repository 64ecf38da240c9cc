//! Single-threaded elimination algorithms.
//!
//! Both solvers pull arms on the calling thread and share one running pull
//! total, so exponential-gap elimination can call median elimination as an
//! ordinary nested solve under the same budget.

mod exp_gap;
mod median_elimination;

pub use exp_gap::ExpGapElimination;
pub use median_elimination::MedianElimination;

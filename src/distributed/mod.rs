//! Multi-player elimination algorithms (Hillel, Karnin, Koren, Lempel and
//! Somekh, "Distributed Exploration in Multi-Armed Bandits", 2013).
//!
//! Each parallel phase forks one task per player on a dedicated rayon pool
//! and joins them all before the coordinating thread aggregates. Players only
//! write their own result slot; the one shared mutable value is the pull
//! counter, which is an atomic.

mod multi_round;
mod one_round;

pub use multi_round::MultiRoundEpsilonArm;
pub use one_round::OneRoundBestArm;

use crate::error::Result;

/// Most OS threads a solve's pool will start. Larger player counts share them.
pub const MAX_POOL_THREADS: usize = 64;

/// Builds the fork-join pool for one solve, one thread per player up to
/// [`MAX_POOL_THREADS`].
pub(crate) fn player_pool(players: usize) -> Result<rayon::ThreadPool> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(players.min(MAX_POOL_THREADS))
        .thread_name(|index| format!("pac-player-{index}"))
        .build()?;
    Ok(pool)
}

/// Seed for player `player`'s private generator.
pub(crate) fn player_seed(base: u64, player: usize) -> u64 {
    base.wrapping_add(player as u64)
}

//! Sample-size formulas.
//!
//! Every solver turns its (ε, δ) schedule into a per-arm pull count through
//! one of these functions. They are pure so the schedules can be tested and
//! benchmarked without pulling a single arm.

/// Converts a non-negative real pull count to an integer, rounding up.
///
/// Saturates at `u64::MAX` for huge or infinite inputs and never returns zero,
/// so every surviving arm is pulled at least once per round.
pub fn ceil_pulls(x: f64) -> u64 {
    if x.is_nan() || x <= 1.0 {
        1
    } else {
        // `as` saturates for values above u64::MAX.
        x.ceil() as u64
    }
}

/// Per-arm pulls for one median elimination round.
///
/// `(2 / ε)² · ln(3 / δ)` samples put each empirical mean within `ε / 2` of
/// its true mean with probability at least `1 - δ`.
pub fn median_elimination_pulls(epsilon: f64, delta: f64) -> u64 {
    ceil_pulls((2.0 / epsilon).powi(2) * (3.0 / delta).ln())
}

/// The (ε_r, δ_r) pair used by round `round` (1-based) of exponential-gap
/// elimination: `ε_r = 2^-r / 4`, `δ_r = δ / (50 r³)`.
pub fn exp_gap_round_params(round: u32, delta: f64) -> (f64, f64) {
    let r = f64::from(round);
    let epsilon = 2f64.powi(-(round as i32)) / 4.0;
    (epsilon, delta / (50.0 * r.powi(3)))
}

/// Per-arm pulls for one exponential-gap round: `2 / ε² · ln(2 / δ)`.
pub fn exp_gap_pulls(epsilon: f64, delta: f64) -> u64 {
    ceil_pulls(2.0 / epsilon.powi(2) * (2.0 / delta).ln())
}

/// Number of rounds exponential-gap elimination may start, `ceil(log2(1/ε))`.
///
/// Rounds run while `round < limit`. Returns `None` for `ε == 0`, meaning no
/// round limit.
pub fn exp_gap_round_limit(epsilon: f64) -> Option<u32> {
    if epsilon == 0.0 {
        None
    } else {
        Some((1.0 / epsilon).log2().ceil().max(0.0) as u32)
    }
}

/// Cumulative per-player sampling time after round `round` of the multi-round
/// ε-arm algorithm: `2 / (P ε_r²) · ln(4 n r² / δ)`.
pub fn multi_round_time(players: usize, epsilon: f64, num_arms: usize, round: u32, delta: f64) -> f64 {
    let r = f64::from(round);
    (2.0 / (players as f64 * epsilon.powi(2))) * ((4.0 * num_arms as f64 * r.powi(2)) / delta).ln()
}

/// Size of the random arm subset each one-round player explores:
/// `min(ceil(6 n / sqrt(P)), n)`.
pub fn one_round_subset_size(num_arms: usize, players: usize) -> usize {
    let size = (6.0 * num_arms as f64 / (players as f64).sqrt()).ceil() as usize;
    size.clamp(1, num_arms.max(1))
}

/// Minimum number of player reports an arm needs to be eligible in the
/// one-round aggregation, `sqrt(P)`.
pub fn one_round_quorum(players: usize) -> f64 {
    (players as f64).sqrt()
}

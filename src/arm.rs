//! Arm capability for multi-armed bandits.
//!
//! A [`BanditArm`] is anything that can be pulled to produce one reward
//! sample. Solvers only ever hold shared references to arms, so the trait
//! takes `&self` and requires `Send + Sync` so the distributed solvers can pull
//! the same arm from several workers at once.

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Bernoulli, Distribution};

use crate::error::{PacError, Result};

/// A reward source.
///
/// Each call to [`pull`](BanditArm::pull) draws one independent sample of the
/// arm's (unknown) expected value. Implementations that keep random number
/// generator state must synchronize it internally.
pub trait BanditArm: Send + Sync {
    /// Draw one reward sample.
    fn pull(&self) -> f64;
}

impl<T: BanditArm + ?Sized> BanditArm for &T {
    fn pull(&self) -> f64 {
        (**self).pull()
    }
}

impl<T: BanditArm + ?Sized> BanditArm for Box<T> {
    fn pull(&self) -> f64 {
        (**self).pull()
    }
}

impl<T: BanditArm + ?Sized> BanditArm for Arc<T> {
    fn pull(&self) -> f64 {
        (**self).pull()
    }
}

/// Generator streams per arm. Stream 0 serves threads outside any rayon pool;
/// pool worker `i` draws from stream `1 + i % (RNG_STREAMS - 1)`.
const RNG_STREAMS: usize = 16;

/// Arm paying 1.0 with probability `p` and 0.0 otherwise.
///
/// Each rayon worker pulls from its own lazily seeded generator, so players
/// sampling the same arm in parallel do not serialize on one lock. Pulls made
/// outside a pool all use the stream seeded with the arm's seed and are
/// reproducible.
///
/// # Examples
///
/// ```
/// use pacbandit::{BanditArm, BernoulliArm};
///
/// let arm = BernoulliArm::with_seed(0.7, 42).unwrap();
/// let reward = arm.pull();
/// assert!(reward == 0.0 || reward == 1.0);
/// ```
#[derive(Debug)]
pub struct BernoulliArm {
    expected_value: f64,
    dist: Bernoulli,
    seed: u64,
    streams: Box<[OnceLock<Box<Mutex<StdRng>>>]>,
}

impl BernoulliArm {
    /// Creates an arm with success probability `p`, seeded from the thread RNG.
    pub fn new(p: f64) -> Result<Self> {
        Self::with_seed(p, rand::rng().random())
    }

    /// Creates an arm with success probability `p` and a fixed seed.
    pub fn with_seed(p: f64, seed: u64) -> Result<Self> {
        let dist = Bernoulli::new(p).map_err(|_| {
            PacError::invalid(format!("expected value must be in [0, 1], got {p}"))
        })?;
        Ok(Self {
            expected_value: p,
            dist,
            seed,
            streams: (0..RNG_STREAMS).map(|_| OnceLock::new()).collect(),
        })
    }

    /// Gets the true expected value of the arm
    pub fn expected_value(&self) -> f64 {
        self.expected_value
    }

    fn stream(&self) -> &Mutex<StdRng> {
        let index = rayon::current_thread_index().map_or(0, |i| 1 + i % (RNG_STREAMS - 1));
        self.streams[index]
            .get_or_init(|| Box::new(Mutex::new(StdRng::seed_from_u64(stream_seed(self.seed, index)))))
    }
}

fn stream_seed(seed: u64, stream: usize) -> u64 {
    seed ^ (stream as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

impl BanditArm for BernoulliArm {
    fn pull(&self) -> f64 {
        let mut rng = self.stream().lock().unwrap_or_else(PoisonError::into_inner);
        if self.dist.sample(&mut *rng) {
            1.0
        } else {
            0.0
        }
    }
}

/// Builds one Bernoulli arm per expected value, in order.
///
/// Arm `i` is seeded deterministically from `seed + i`, so the whole set is
/// reproducible.
pub fn make_bernoulli_bandit(expected_values: &[f64], seed: u64) -> Result<Vec<BernoulliArm>> {
    expected_values
        .iter()
        .enumerate()
        .map(|(i, &p)| BernoulliArm::with_seed(p, seed.wrapping_add(i as u64)))
        .collect()
}

/// Builds `num_arms` Bernoulli arms whose last arm is the unique best one.
///
/// The best arm has mean `0.5 + min_gap / 2`; every other mean is drawn
/// uniformly from `[0, best - min_gap]`, so the gap to the best arm is at least
/// `min_gap`.
pub fn make_bernoulli_bandit_with_gap<R: Rng + ?Sized>(
    num_arms: usize,
    min_gap: f64,
    rng: &mut R,
) -> Result<Vec<BernoulliArm>> {
    if num_arms == 0 {
        return Err(PacError::NoArmsAvailable);
    }
    if !(min_gap > 0.0 && min_gap <= 1.0) {
        return Err(PacError::invalid(format!(
            "min_gap must be in (0, 1], got {min_gap}"
        )));
    }

    let best = 0.5 + min_gap / 2.0;
    let ceiling = best - min_gap;
    let mut means: Vec<f64> = (0..num_arms - 1)
        .map(|_| rng.random_range(0.0..=ceiling))
        .collect();
    means.push(best);

    let seed: u64 = rng.random();
    make_bernoulli_bandit(&means, seed)
}

//! Seedable RNG wrappers handed to vehicles explicitly.
//!
//! A pool derives one global seed (from `RunConfig::seed`, or OS entropy via
//! [`SimRng::from_entropy`]) and gives vehicle `i` its own `SmallRng`:
//!
//!   seed_i = global_seed XOR (i * MIXING_CONSTANT)
//!
//! Consequences for a run:
//!
//! - Vehicles never share RNG state, so live-mode tasks each own theirs.
//! - Adding vehicles leaves the streams of the first `n` unchanged.
//! - A fixed seed reproduces speeds, headings and drift; vehicle ids stay
//!   random.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── VehicleRng ────────────────────────────────────────────────────────────────

/// Per-vehicle deterministic RNG, passed explicitly to `Vehicle::new` and
/// `Vehicle::step`.
pub struct VehicleRng(SmallRng);

impl VehicleRng {
    /// Seed deterministically from the run's global seed and a vehicle's
    /// position in its pool.
    pub fn new(global_seed: u64, index: usize) -> Self {
        let seed = global_seed ^ (index as u64).wrapping_mul(MIXING_CONSTANT);
        VehicleRng(SmallRng::seed_from_u64(seed))
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Run-level RNG, used only at pool build time to derive the global seed
/// handed to each [`VehicleRng`].
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        SimRng(SmallRng::from_entropy())
    }

    /// Seeded when `seed` is `Some`, entropy otherwise.
    pub fn from_seed_opt(seed: Option<u64>) -> Self {
        seed.map_or_else(SimRng::from_entropy, SimRng::new)
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }
}

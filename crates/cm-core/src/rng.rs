//! Deterministic per-mission and simulation-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each mission gets its own `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (mission_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive mission IDs uniformly across the seed space.
//! Site selection for one mission therefore never depends on how many other
//! missions drew numbers before it.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::MissionId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── MissionRng ────────────────────────────────────────────────────────────────

/// Per-mission deterministic RNG, used for field-site bearings and
/// exploration site scatter.
pub struct MissionRng(SmallRng);

impl MissionRng {
    /// Seed deterministically from the run's global seed and a mission ID.
    pub fn new(global_seed: u64, mission: MissionId) -> Self {
        let seed = global_seed ^ (mission.0 as u64).wrapping_mul(MIXING_CONSTANT);
        MissionRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
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

    /// A uniformly random bearing in radians, `[0, 2π)`.
    #[inline]
    pub fn bearing(&mut self) -> f64 {
        self.0.gen_range(0.0..std::f64::consts::TAU)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for the driver.  Hands out per-mission RNGs.
pub struct SimRng {
    seed: u64,
    inner: SmallRng,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng { seed, inner: SmallRng::seed_from_u64(seed) }
    }

    /// The deterministic RNG for `mission`, independent of draw order.
    pub fn for_mission(&self, mission: MissionId) -> MissionRng {
        MissionRng::new(self.seed, mission)
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.inner
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.inner.gen_range(range)
    }
}

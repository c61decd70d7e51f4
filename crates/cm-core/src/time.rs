//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing `Tick` counter.  `SimClock` maps ticks
//! to Martian time, measured in millisols (thousandths of a sol):
//!
//!   elapsed_millisols = tick * millisols_per_tick
//!
//! Integer ticks keep ordering exact; every duration a mission compares
//! (time at site, leg time) is converted to millisols through the clock.
//!
//! The default resolution is 1 millisol per tick (88.775 s).

use std::fmt;

/// Seconds in one Martian sol.
pub const SECS_PER_SOL: f64 = 88_775.244;

/// Millisols in one Earth hour, used to turn km/h speeds into trip times.
pub const MILLISOLS_PER_HOUR: f64 = 3_600.0 * 1_000.0 / SECS_PER_SOL;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`; zero if `earlier` is later.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and Martian millisols.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// How many millisols one tick represents.  Default: 1.0.
    pub millisols_per_tick: f64,
    /// The current tick, advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SimClock {
    pub fn new(millisols_per_tick: f64) -> Self {
        Self { millisols_per_tick, current_tick: Tick::ZERO }
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Elapsed millisols since tick 0.
    #[inline]
    pub fn elapsed_millisols(&self) -> f64 {
        self.ticks_to_millisols(self.current_tick.0)
    }

    #[inline]
    pub fn ticks_to_millisols(&self, ticks: u64) -> f64 {
        ticks as f64 * self.millisols_per_tick
    }

    /// Millisols elapsed between `earlier` and `later`.
    #[inline]
    pub fn millisols_between(&self, earlier: Tick, later: Tick) -> f64 {
        self.ticks_to_millisols(later.since(earlier))
    }

    /// How many ticks span `millisols`? (rounds up)
    pub fn ticks_for_millisols(&self, millisols: f64) -> u64 {
        if millisols <= 0.0 || self.millisols_per_tick <= 0.0 {
            return 0;
        }
        (millisols / self.millisols_per_tick).ceil() as u64
    }

    /// Break elapsed time into (sol, millisol-of-sol) from sim start.
    pub fn elapsed_sol_millisol(&self) -> (u64, u32) {
        let total = self.elapsed_millisols().max(0.0);
        let sol = (total / 1_000.0).floor();
        (sol as u64, (total - sol * 1_000.0) as u32)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sol, msol) = self.elapsed_sol_millisol();
        write!(f, "{} (sol {} msol {:03})", self.current_tick, sol, msol)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level run configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Millisols per tick.  Default: 1.0.
    pub millisols_per_tick: f64,

    /// Total ticks to simulate.  Ten sols at 1 msol/tick: 10_000.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Report progress to the observer every N ticks.
    pub output_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            millisols_per_tick:    1.0,
            total_ticks:           10_000,
            seed:                  42,
            output_interval_ticks: 100,
        }
    }
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.millisols_per_tick)
    }
}

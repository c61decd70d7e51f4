//! Per-call view of the world and clock handed to a mission.

use cm_core::{MissionConfig, SimClock, Tick};
use cm_world::World;

/// Everything a mission may read or touch while it acts.
///
/// The driver builds one per `perform_mission` call (and one per proposal),
/// so the mutable world borrow never outlives a single mission step.
pub struct MissionContext<'a> {
    pub now:    Tick,
    pub clock:  &'a SimClock,
    pub config: &'a MissionConfig,
    pub world:  &'a mut dyn World,
}

impl<'a> MissionContext<'a> {
    #[inline]
    pub fn new(clock: &'a SimClock, config: &'a MissionConfig, world: &'a mut dyn World) -> Self {
        Self { now: clock.current_tick, clock, config, world }
    }

    /// Millisols elapsed since `since`.
    #[inline]
    pub fn millisols_since(&self, since: Tick) -> f64 {
        self.clock.millisols_between(since, self.now)
    }
}

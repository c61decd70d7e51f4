//! Simulation observer trait for progress reporting and data collection.

use cm_core::Tick;
use cm_mission::{Mission, MissionEvent};

/// Callbacks invoked by [`MissionSim::run`][crate::MissionSim::run] at key
/// points in the tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: ending reporter
///
/// ```rust,ignore
/// struct Endings(Vec<(MissionId, MissionStatus)>);
///
/// impl SimObserver for Endings {
///     fn on_mission_end(&mut self, mission: &Mission) {
///         self.0.push((mission.id(), mission.statuses()[0]));
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any mission acts.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per event, in emission order, right after the emitting
    /// mission's turn.
    fn on_mission_event(&mut self, _event: &MissionEvent) {}

    /// Called when a mission is retired to the finished archive, after the
    /// task scheduler advanced for the tick it ended in.
    fn on_mission_end(&mut self, _mission: &Mission) {}

    /// Called at the end of each tick.
    ///
    /// `steps` is the number of `perform_mission` calls that did work this
    /// tick.
    fn on_tick_end(&mut self, _tick: Tick, _steps: usize) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// ticks) with the missions still running.
    fn on_snapshot(&mut self, _tick: Tick, _active: &[Mission]) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

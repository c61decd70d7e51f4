//! The `MissionSim` struct and its tick loop.

use tracing::{debug, info, warn};

use cm_core::{MemberId, MissionConfig, MissionId, MissionRng, SimClock, SimConfig, SimRng, Tick, VehicleId};
use cm_mission::{Mission, MissionContext, MissionKind, MissionStatus};
use cm_world::{TaskScheduler, World};

use crate::{SimError, SimObserver, SimResult};

// ── MissionSim ────────────────────────────────────────────────────────────────

/// The mission driver.
///
/// `MissionSim<W>` owns the world and every mission proposed into it, and
/// drives a three-step tick loop:
///
/// 1. **Missions**: for every active mission in ascending `MissionId`, every
///    living roster member (ascending `MemberId`) gets one
///    [`Mission::perform_mission`] call; the mission's events are drained to
///    the observer right after its turn.
/// 2. **Tasks**: the world's [`TaskScheduler`] plays out one tick of
///    millisols, so drives, boarding, and field work make progress.
/// 3. **Retire**: missions that finished this tick move to the finished
///    archive and are reported through `on_mission_end`.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct MissionSim<W: World + TaskScheduler> {
    /// Global configuration (total ticks, seed, tick length, …).
    pub config: SimConfig,

    /// Tunable mission constants handed to every mission step.
    pub mission_config: MissionConfig,

    /// Simulation clock: tracks the current tick and maps it to millisols.
    pub clock: SimClock,

    /// The colony the missions act on.
    pub world: W,

    /// Hands out one deterministic RNG per proposed mission.
    pub rng: SimRng,

    /// Running missions, ascending by id.
    pub active: Vec<Mission>,

    /// Finished missions in the order they ended.
    pub finished: Vec<Mission>,

    pub(crate) next_id: u32,
}

impl<W: World + TaskScheduler> MissionSim<W> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Create a mission through `build` and add it to the active set.
    ///
    /// `build` receives the id the driver assigned, a context on the current
    /// tick, and the mission's own RNG; it is usually one of the
    /// `cm_mission::missions` constructors.  A mission that already failed
    /// during construction is still added and retires at the end of the next
    /// tick, so its events reach the observer like any other.
    pub fn propose<F>(&mut self, build: F) -> SimResult<MissionId>
    where
        F: FnOnce(MissionId, &mut MissionContext<'_>, &mut MissionRng) -> Mission,
    {
        let id = MissionId(self.next_id);
        let mut rng = self.rng.for_mission(id);
        let mut ctx = MissionContext::new(&self.clock, &self.mission_config, &mut self.world);
        let mission = build(id, &mut ctx, &mut rng);
        if mission.id() != id {
            return Err(SimError::MissionIdMismatch { expected: id, got: mission.id() });
        }
        self.next_id += 1;

        info!(
            mission = %id,
            kind = %mission.mission_type(),
            members = mission.roster().len(),
            done = mission.is_done(),
            "mission proposed"
        );
        self.active.push(mission);
        Ok(id)
    }

    /// Call off an active mission with [`MissionStatus::AbortedByOperator`].
    ///
    /// A mission whose vehicle is out in the field stays active until it is
    /// back at a settlement.
    pub fn abort(&mut self, id: MissionId) -> SimResult<()> {
        let mission = self
            .active
            .iter_mut()
            .find(|m| m.id() == id)
            .ok_or(SimError::UnknownMission(id))?;
        let mut ctx = MissionContext::new(&self.clock, &self.mission_config, &mut self.world);
        mission.abort_mission(MissionStatus::AbortedByOperator, &mut ctx);
        Ok(())
    }

    /// Look up a mission, active or finished.
    pub fn mission(&self, id: MissionId) -> Option<&Mission> {
        self.active
            .iter()
            .chain(self.finished.iter())
            .find(|m| m.id() == id)
    }

    /// Vehicles an active rescue mission is already heading for; pass these
    /// as the exclusion list when proposing another rescue.
    pub fn rescue_targets(&self) -> Vec<VehicleId> {
        self.active
            .iter()
            .filter(|m| !m.is_done())
            .filter_map(|m| match m.kind() {
                MissionKind::RescueSalvage { target, .. } => *target,
                _ => None,
            })
            .collect()
    }

    /// `true` when no mission is running.
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    /// Run the simulation from the current tick to `config.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.current_tick < self.config.end_tick() {
            self.step(observer);
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer);
        }
        Ok(())
    }

    /// Run until every mission has finished or `max_ticks` elapsed.
    /// Returns the number of ticks run.
    pub fn run_until_idle<O: SimObserver>(&mut self, max_ticks: u64, observer: &mut O) -> SimResult<u64> {
        let mut ran = 0;
        while !self.is_idle() && ran < max_ticks {
            self.step(observer);
            ran += 1;
        }
        if !self.is_idle() {
            warn!(active = self.active.len(), max_ticks, "missions still running at tick limit");
        }
        Ok(ran)
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn step<O: SimObserver>(&mut self, observer: &mut O) {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        let steps = self.process_tick(now, observer);
        observer.on_tick_end(now, steps);
        if self.config.output_interval_ticks > 0
            && now.0.is_multiple_of(self.config.output_interval_ticks)
        {
            observer.on_snapshot(now, &self.active);
        }
        self.clock.advance();
    }

    fn process_tick<O: SimObserver>(&mut self, now: Tick, observer: &mut O) -> usize {
        let mut steps = 0;

        // ── Step 1: mission turns ─────────────────────────────────────────
        //
        // Explicit field borrows so the context's world borrow stays
        // disjoint from the mission list.
        {
            let mut ctx = MissionContext::new(&self.clock, &self.mission_config, &mut self.world);
            for mission in &mut self.active {
                let members: Vec<MemberId> = mission
                    .roster()
                    .iter()
                    .copied()
                    .filter(|&m| ctx.world.member(m).is_some_and(|m| m.is_alive()))
                    .collect();
                if members.is_empty() && !mission.is_done() {
                    warn!(mission = %mission.id(), "no living member left");
                    mission.abort_mission(MissionStatus::NotEnoughMembers, &mut ctx);
                }
                for member in members {
                    if mission.perform_mission(member, &mut ctx) {
                        steps += 1;
                    }
                }
                for event in mission.take_events() {
                    observer.on_mission_event(&event);
                }
            }
        }

        // ── Step 2: tasks play out ────────────────────────────────────────
        self.world.advance(now, self.clock.millisols_per_tick, &self.mission_config);

        // ── Step 3: retire finished missions ──────────────────────────────
        if self.active.iter().any(Mission::is_done) {
            let (done, running): (Vec<Mission>, Vec<Mission>) =
                std::mem::take(&mut self.active).into_iter().partition(Mission::is_done);
            self.active = running;
            for mission in done {
                debug!(mission = %mission.id(), statuses = ?mission.statuses(), "mission retired");
                observer.on_mission_end(&mission);
                self.finished.push(mission);
            }
        }

        steps
    }
}

//! Off-vehicle work phases.
//!
//! Each tick the mission-level step decides whether EVA may go on at this
//! site.  The checks run in a fixed order and any one of them can switch
//! EVA off:
//!
//! 1. time at site reached the kind's site duration;
//! 2. too dark to work, outside a polar region in permanent night;
//! 3. an emergency: a medical problem or a resource shortfall (both
//!    trigger a reroute) or a distress beacon nearby;
//! 4. the kind's own `continue_work` hook, or nobody left able to go out.
//!
//! Once EVA is off the phase ends as soon as nobody is outside; until then
//! everyone outside is told to return to the vehicle.  A mission that
//! called for help while crew were out ends at that point instead.

use tracing::debug;

use cm_core::{MemberId, VehicleId};
use cm_world::{Situation, Task, World};

use crate::{
    Mission, MissionContext, MissionResult, MissionStatus, PhasedWorkSite, ResourceProvisioned,
    Routable,
};

impl Mission {
    pub(crate) fn perform_eva_phase(&mut self, member: MemberId, first: bool, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        let vehicle = self.vehicle_id()?;
        if first {
            self.evaluate_eva(vehicle, ctx)?;
            if self.is_done() || self.phase_ended {
                return Ok(());
            }
        }

        if self.eva_active {
            if let Some(work) = self.kind.field_work() {
                let Some(m) = ctx.world.member(member) else { return Ok(()) };
                if m.is_eva_fit() && m.task().is_none() && m.situation().vehicle() == Some(vehicle) {
                    ctx.world.assign_task(member, Task::FieldWork { vehicle, work })?;
                }
            }
        }
        Ok(())
    }

    /// The mission-level gate, once per tick.
    fn evaluate_eva(&mut self, vehicle: VehicleId, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        if self.eva_active {
            self.eva_active = self.eva_may_continue(vehicle, ctx)?;
            if self.is_done() {
                return Ok(());
            }
        }
        if self.eva_active {
            return Ok(());
        }

        let mut outside = Vec::new();
        for &id in &self.roster {
            let Some(m) = ctx.world.member(id) else { continue };
            if !m.is_alive() {
                continue;
            }
            match m.situation() {
                Situation::Outside(v) if v == vehicle => outside.push(id),
                Situation::InVehicle(v) if v == vehicle => {
                    // Called off before stepping out.
                    if matches!(m.task(), Some(Task::FieldWork { .. })) {
                        if let Some(m) = ctx.world.member_mut(id) {
                            m.clear_task();
                        }
                    }
                }
                _ => {}
            }
        }

        if outside.is_empty() {
            self.log.add_entry(ctx.now, "EVA ended");
            match self.stranded {
                Some(status) => self.end_with(status, ctx),
                None => self.phase_ended = true,
            }
            return Ok(());
        }
        let back = Task::ReturnToVehicle { vehicle };
        for id in outside {
            if ctx.world.member(id).is_some_and(|m| m.task() != Some(back)) {
                ctx.world.assign_task(id, back)?;
            }
        }
        Ok(())
    }

    fn eva_may_continue(&mut self, vehicle: VehicleId, ctx: &mut MissionContext<'_>) -> MissionResult<bool> {
        let elapsed = ctx.millisols_since(self.phase_start);
        if elapsed >= self.kind.site_millisols(ctx.config) {
            debug!(mission = %self.id, elapsed, "site time reached");
            return Ok(false);
        }

        let location = self.current_location(&*ctx.world)?;
        if ctx.world.solar_irradiance(location) < ctx.config.min_eva_irradiance
            && !ctx.world.is_polar_dark(location)
        {
            debug!(mission = %self.id, "too dark for EVA");
            return Ok(false);
        }

        let medical = self.has_medical_emergency(&*ctx.world);
        let short = !self.has_enough_resources_for_remaining_mission(ctx, false)?;
        if (medical || short) && !self.route.is_rerouted() {
            let reason = if medical { MissionStatus::MedicalEmergency } else { MissionStatus::NotEnoughResources };
            self.determine_emergency_destination(reason, ctx)?;
        }
        if medical || short || self.beacon_nearby(vehicle, ctx.config.beacon_response_range_km, &*ctx.world) {
            return Ok(false);
        }

        let config = ctx.config;
        let v = self.vehicle_ref(&*ctx.world)?;
        let keep_going = self.kind.continue_work(v, elapsed, config);
        Ok(keep_going && self.anyone_eva_fit(&*ctx.world))
    }

    /// Another vehicle within response range is calling for help and this
    /// mission may not ignore it.
    fn beacon_nearby(&self, vehicle: VehicleId, range_km: f64, world: &dyn World) -> bool {
        let Some(own) = world.vehicle(vehicle) else { return false };
        world.vehicle_ids().into_iter().any(|id| {
            id != vehicle
                && !self.kind.ignores_beacon(id)
                && world.vehicle(id).is_some_and(|v| {
                    v.beacon_on && v.location.distance_km(own.location) <= range_km
                })
        })
    }

    /// Living crew standing outside `vehicle`.
    pub(crate) fn crew_outside(&self, vehicle: VehicleId, world: &dyn World) -> Vec<MemberId> {
        self.roster
            .iter()
            .filter_map(|&m| world.member(m))
            .filter(|m| m.is_alive() && m.situation() == Situation::Outside(vehicle))
            .map(|m| m.id())
            .collect()
    }

    fn anyone_eva_fit(&self, world: &dyn World) -> bool {
        self.roster
            .iter()
            .filter_map(|&m| world.member(m))
            .any(|m| m.is_eva_fit())
    }
}

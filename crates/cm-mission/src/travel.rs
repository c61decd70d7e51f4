//! Travelling: route queries, driving, distance updates, emergency reroutes.

use tracing::{debug, warn};

use cm_core::{Coordinates, MemberId, VehicleId};
use cm_route::{Route, RouteError};
use cm_world::{Situation, Task, VehicleKind, World};

use crate::provisioning::first_shortfall;
use crate::{
    Mission, MissionContext, MissionEventKind, MissionPhase, MissionResult, MissionStatus,
    ResourceProvisioned,
};

/// Reported distance changes smaller than this are not announced (km).
const DISTANCE_EPSILON_KM: f64 = 1e-3;

// ── Routable ──────────────────────────────────────────────────────────────────

/// Route and distance queries of a travelling mission.
pub trait Routable {
    fn route(&self) -> &Route;

    /// Where the mission is: its vehicle's location, or the route origin
    /// before a vehicle is bound.
    fn current_location(&self, world: &dyn World) -> MissionResult<Coordinates>;

    fn current_leg_remaining_distance(&self, world: &dyn World) -> MissionResult<f64> {
        let at = self.current_location(world)?;
        Ok(self.route().leg_remaining_km(at))
    }

    /// Current leg remaining plus every later leg, computed fresh.
    fn total_remaining_distance(&self, world: &dyn World) -> MissionResult<f64> {
        let at = self.current_location(world)?;
        Ok(self.route().total_remaining_km(at))
    }
}

impl Routable for Mission {
    fn route(&self) -> &Route {
        &self.route
    }

    fn current_location(&self, world: &dyn World) -> MissionResult<Coordinates> {
        match self.vehicle {
            Some(_) => Ok(self.vehicle_ref(world)?.location),
            None => Ok(self.route.origin().location()),
        }
    }
}

// ── Travel phase ──────────────────────────────────────────────────────────────

impl Mission {
    /// Set off toward the next navpoint.
    pub(crate) fn start_leg(&mut self, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        let next = self.route.start_travel_to_next_node(ctx.now)?.description().to_owned();
        self.set_phase(MissionPhase::Travelling, &next, ctx);
        self.update_distance(ctx)
    }

    /// Mission-level travelling step, once per tick.
    pub(crate) fn travel(&mut self, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        let vehicle = self.vehicle_id()?;
        let location = self.vehicle_ref(&*ctx.world)?.location;
        let target = self.leg_target()?;

        if location.distance_km(target) <= ctx.config.arrival_tolerance_km {
            return self.arrive(vehicle, ctx);
        }

        if !self.route.is_rerouted() {
            let emergency = if self.has_medical_emergency(&*ctx.world) {
                Some(MissionStatus::MedicalEmergency)
            } else if !self.has_enough_resources_for_remaining_mission(ctx, false)? {
                Some(MissionStatus::NotEnoughResources)
            } else {
                None
            };
            if let Some(reason) = emergency {
                self.determine_emergency_destination(reason, ctx)?;
                if self.is_done() || self.stranded.is_some() {
                    return Ok(());
                }
            }
        }

        let target = self.leg_target()?;
        self.ensure_driver(vehicle, target, ctx)?;
        self.update_distance(ctx)
    }

    fn leg_target(&self) -> MissionResult<Coordinates> {
        let len = self.route.len();
        self.route
            .next_navpoint()
            .map(|p| p.location())
            .ok_or(RouteError::Exhausted { cursor: self.route.cursor(), len }.into())
    }

    fn arrive(&mut self, vehicle: VehicleId, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        let reached = self.route.reached_next_node()?.description().to_owned();
        let operator = self.vehicle_mut(&mut *ctx.world)?.operator.take();
        if let Some(op) = operator {
            if let Some(m) = ctx.world.member_mut(op) {
                m.clear_task();
            }
        }
        debug!(mission = %self.id, %vehicle, navpoint = %reached, "arrived");
        self.log.add_entry(ctx.now, format!("arrived at {reached}"));
        self.phase_ended = true;
        self.update_distance(ctx)
    }

    /// Keep exactly one capable member driving toward `destination`.
    ///
    /// Drive orders for an older destination, or held by a member no longer
    /// able to drive, are withdrawn before a new driver is chosen.
    fn ensure_driver(&mut self, vehicle: VehicleId, destination: Coordinates, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        let wanted = Task::Drive { vehicle, destination };
        let driving = self
            .roster
            .iter()
            .filter_map(|&m| ctx.world.member(m))
            .any(|m| m.task() == Some(wanted) && m.can_drive());
        if driving {
            return Ok(());
        }

        let remote = self.vehicle_ref(&*ctx.world)?.kind == VehicleKind::Drone;
        let mut candidate: Option<MemberId> = None;
        let mut stale = Vec::new();
        for &id in &self.roster {
            let Some(m) = ctx.world.member(id) else { continue };
            if matches!(m.task(), Some(Task::Drive { vehicle: v, .. }) if v == vehicle) {
                stale.push(id);
            }
            let placed = remote || m.situation() == Situation::InVehicle(vehicle);
            if candidate.is_none() && placed && m.can_drive() {
                candidate = Some(id);
            }
        }
        for id in stale {
            if let Some(m) = ctx.world.member_mut(id) {
                m.clear_task();
            }
        }
        self.vehicle_mut(&mut *ctx.world)?.operator = None;

        match candidate {
            Some(driver) => {
                ctx.world.assign_task(driver, wanted)?;
                Ok(())
            }
            None => {
                warn!(mission = %self.id, %vehicle, "nobody able to drive");
                self.get_help(MissionStatus::NotEnoughMembers, ctx)
            }
        }
    }

    /// Some living member is placed to drive: aboard, or anywhere for a
    /// remotely piloted drone.
    pub(crate) fn anyone_can_drive(&self, world: &dyn World) -> MissionResult<bool> {
        let vehicle = self.vehicle_id()?;
        let remote = self.vehicle_ref(world)?.kind == VehicleKind::Drone;
        Ok(self
            .roster
            .iter()
            .filter_map(|&m| world.member(m))
            .any(|m| m.can_drive() && (remote || m.situation().vehicle() == Some(vehicle))))
    }

    /// Recompute the total remaining distance and announce a change.
    pub(crate) fn update_distance(&mut self, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        let total = Routable::total_remaining_distance(self, &*ctx.world)?;
        if (total - self.reported_km).abs() > DISTANCE_EPSILON_KM {
            self.reported_km = total;
            self.emit(ctx.now, MissionEventKind::DistanceChanged { remaining_km: total });
        }
        Ok(())
    }

    // ── Emergencies ───────────────────────────────────────────────────────

    /// A crew member aboard (or outside) the vehicle needs a settlement's
    /// medical care.
    pub(crate) fn has_medical_emergency(&self, world: &dyn World) -> bool {
        let Some(vehicle) = self.vehicle else { return false };
        self.roster.iter().filter_map(|&m| world.member(m)).any(|m| {
            m.situation().vehicle() == Some(vehicle) && m.has_serious_medical_problem()
        })
    }

    /// Redirect to the nearest settlement the vehicle can still reach, or
    /// call for help and end the mission.
    ///
    /// Reachability is tested against the trip need scaled by each of the
    /// configured range fractions in turn.
    pub(crate) fn determine_emergency_destination(
        &mut self,
        reason: MissionStatus,
        ctx:    &mut MissionContext<'_>,
    ) -> MissionResult<()> {
        let location = self.current_location(&*ctx.world)?;
        let nearest = ctx
            .world
            .nearest_settlement(location)
            .and_then(|s| ctx.world.settlement(s))
            .map(|s| (s.id, s.location, s.name.clone()));
        let Some((settlement, at, name)) = nearest else {
            let status = match reason {
                MissionStatus::MedicalEmergency => MissionStatus::MedicalEmergency,
                _ => MissionStatus::NoEmergencySettlementFound,
            };
            return self.get_help(status, ctx);
        };

        let distance = location.distance_km(at);
        let config = ctx.config;
        for &fraction in &config.emergency_range_fractions {
            let need = self.resources_needed_for_trip(ctx, false, distance * fraction)?;
            let vehicle = self.vehicle_ref(&*ctx.world)?;
            if first_shortfall(&vehicle.inventory, &need).is_none() {
                self.route.insert_emergency_destination(at, Some(settlement), name.clone());
                warn!(mission = %self.id, %settlement, ?reason, fraction, "rerouting to emergency destination");
                self.log.add_entry(ctx.now, format!("emergency destination {name}: {reason}"));
                self.emit(ctx.now, MissionEventKind::EmergencyDestination { settlement, reason });
                return self.update_distance(ctx);
            }
        }

        let status = match reason {
            MissionStatus::MedicalEmergency => MissionStatus::MedicalEmergency,
            _ => MissionStatus::NotEnoughResources,
        };
        self.get_help(status, ctx)
    }

    /// Switch on the vehicle's beacon and end the mission with `status`.
    ///
    /// Crew still outside are called back first, and the mission ends only
    /// once the last of them is aboard.
    pub(crate) fn get_help(&mut self, status: MissionStatus, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        let vehicle = self.vehicle_id()?;
        let v = self.vehicle_mut(&mut *ctx.world)?;
        if !v.is_parked() && !v.beacon_on {
            v.beacon_on = true;
            v.operator = None;
            warn!(mission = %self.id, %vehicle, ?status, "emergency beacon on");
            self.log.add_entry(ctx.now, format!("beacon on: {status}"));
            self.emit(ctx.now, MissionEventKind::EmergencyBeacon { vehicle, on: true, reason: Some(status) });
        }

        let outside = self.crew_outside(vehicle, &*ctx.world);
        if outside.is_empty() {
            self.end_with(status, ctx);
            return Ok(());
        }
        self.eva_active = false;
        let back = Task::ReturnToVehicle { vehicle };
        for id in outside {
            if ctx.world.member(id).is_some_and(|m| m.task() != Some(back)) {
                ctx.world.assign_task(id, back)?;
            }
        }
        if self.stranded.is_none() {
            self.stranded = Some(status);
            self.log.add_entry(ctx.now, "waiting for crew outside");
            debug!(mission = %self.id, %vehicle, "waiting for crew outside");
        }
        Ok(())
    }
}

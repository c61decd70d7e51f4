//! Rescue and salvage of a vehicle that called for help.

use tracing::{debug, info, warn};

use cm_core::{Coordinates, MemberId, MissionId, VehicleId};
use cm_world::{Holder, World};

use crate::{Mission, MissionContext, MissionEventKind, MissionKind, MissionResult, MissionStatus};

use super::{finish_setup, return_home, round_trip_reach};

/// The beaconing vehicle a rescue from `from` should head for.
///
/// Candidates have their beacon on, are not being towed, are not reserved
/// by another mission, are not in `excluded`, and lie within `max_km`.
/// Vehicles with living crew win over empty ones; then the closest; then
/// the lower id.  The flag reports whether the chosen vehicle has living
/// crew.
pub fn find_beacon_vehicle(
    world:    &dyn World,
    from:     Coordinates,
    max_km:   f64,
    excluded: &[VehicleId],
) -> Option<(VehicleId, bool)> {
    world
        .vehicle_ids()
        .into_iter()
        .filter(|id| !excluded.contains(id))
        .filter_map(|id| world.vehicle(id))
        .filter(|v| v.beacon_on && v.towed_by.is_none() && v.reserved_by.is_none())
        .map(|v| {
            let living = v.crew.iter().any(|&m| world.member(m).is_some_and(|m| m.is_alive()));
            (v.id, living, v.location.distance_km(from))
        })
        .filter(|&(_, _, d)| d <= max_km)
        .min_by(|a, b| b.1.cmp(&a.1).then(a.2.total_cmp(&b.2)).then(a.0.cmp(&b.0)))
        .map(|(id, living, _)| (id, living))
}

/// Plan a rescue (or, with nobody alive aboard, a salvage) of the nearest
/// stranded vehicle within the rescuer's round-trip reach.
///
/// `excluded` lists vehicles other missions are already heading for.  Ends
/// with `TargetVehicleNotFound` when no vehicle qualifies.
pub fn rescue_salvage(
    id:         MissionId,
    lead:       MemberId,
    candidates: &[MemberId],
    excluded:   &[VehicleId],
    ctx:        &mut MissionContext<'_>,
) -> Mission {
    let kind = MissionKind::RescueSalvage { target: None, rescue_crew: false, coupled: false };
    let mut mission = Mission::new(id, kind, lead, ctx);
    if mission.is_done() || !mission.reserve_vehicle(ctx) {
        return mission;
    }

    let home = mission.route.origin().location();
    let reach = round_trip_reach(&mission, ctx);
    let mut skip = excluded.to_vec();
    skip.extend(mission.vehicle);
    let Some((target, rescue_crew)) = find_beacon_vehicle(&*ctx.world, home, reach, &skip) else {
        mission.end_mission(MissionStatus::TargetVehicleNotFound, ctx);
        return mission;
    };

    let Some(t) = ctx.world.vehicle_mut(target) else {
        mission.end_mission(MissionStatus::TargetVehicleNotFound, ctx);
        return mission;
    };
    t.reserved_by = Some(id);
    let (at, name) = (t.location, t.name.clone());
    mission.kind = MissionKind::RescueSalvage { target: Some(target), rescue_crew, coupled: false };
    info!(mission = %id, %target, rescue_crew, "rescue target chosen");
    mission.log.add_entry(ctx.now, format!("target {name}"));

    mission.route.add_navpoint(at, None, name);
    return_home(&mut mission);

    finish_setup(&mut mission, candidates, ctx);
    mission
}

impl Mission {
    /// Reach the target: hand over supplies if its crew is alive, couple it
    /// for towing, and switch its beacon off.
    pub(crate) fn rendezvous(&mut self, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        let MissionKind::RescueSalvage { target: Some(target), rescue_crew, .. } = self.kind else {
            self.phase_ended = true;
            return Ok(());
        };
        let vehicle = self.vehicle_id()?;

        if rescue_crew {
            for (resource, amount) in self.rescue_supply(ctx, target)? {
                let available = self.vehicle_ref(&*ctx.world)?.inventory.stored(resource);
                let amount = amount.min(available);
                if let Err(e) = ctx.world.transfer(Holder::Vehicle(vehicle), Holder::Vehicle(target), resource, amount) {
                    warn!(mission = %self.id, %resource, amount, error = %e, "cannot hand over supplies");
                }
            }
        }

        let location = self.vehicle_ref(&*ctx.world)?.location;
        let t = ctx
            .world
            .vehicle_mut(target)
            .ok_or(crate::MissionError::VehicleMissing(target))?;
        t.towed_by = Some(vehicle);
        t.location = location;
        let was_on = std::mem::replace(&mut t.beacon_on, false);
        let name = t.name.clone();
        self.vehicle_mut(&mut *ctx.world)?.towing = Some(target);

        if let MissionKind::RescueSalvage { coupled, .. } = &mut self.kind {
            *coupled = true;
        }
        if was_on {
            self.emit(ctx.now, MissionEventKind::EmergencyBeacon { vehicle: target, on: false, reason: None });
        }
        self.emit(ctx.now, MissionEventKind::Rendezvous { target });
        debug!(mission = %self.id, %vehicle, %target, "coupled");
        self.log.add_entry(ctx.now, format!("coupled {name}"));
        self.phase_ended = true;
        Ok(())
    }
}

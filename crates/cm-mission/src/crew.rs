//! Embarking and disembarking for rovers and drones.
//!
//! Rovers carry their crew: every member boards before departure and walks
//! into the settlement on return.  Drones are piloted from home, so nobody
//! boards and nobody needs to leave.

use tracing::{debug, warn};

use cm_core::resource::merge;
use cm_core::{MemberId, SettlementId, VehicleId};
use cm_world::{Holder, MissionMember, Situation, Task, VehicleKind, World};

use crate::{
    Mission, MissionContext, MissionError, MissionEventKind, MissionKind, MissionResult,
    MissionStatus, ResourceProvisioned,
};

impl Mission {
    // ── Embark ────────────────────────────────────────────────────────────

    pub(crate) fn embark(&mut self, member: MemberId, first: bool, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        let vehicle = self.vehicle_id()?;
        let rover = self.vehicle_ref(&*ctx.world)?.kind == VehicleKind::Rover;

        if first {
            if !self.loaded {
                self.load_vehicle(vehicle, ctx)?;
                if self.is_done() {
                    return Ok(());
                }
            }
            if !rover || self.all_aboard(vehicle, &*ctx.world) {
                if let Err(e) = ctx.world.retrieve_vehicle(vehicle, self.home) {
                    warn!(mission = %self.id, %vehicle, error = %e, "cannot retrieve vehicle");
                    self.end_mission(MissionStatus::CannotRetrieveVehicle, ctx);
                    return Ok(());
                }
                self.log.add_entry(ctx.now, "departed");
                self.phase_ended = true;
                return Ok(());
            }
        }

        if rover && !self.phase_ended {
            let m = ctx.world.member(member).ok_or(cm_world::WorldError::MemberNotFound(member))?;
            let board = Task::BoardVehicle { vehicle };
            if m.situation() != Situation::InVehicle(vehicle) && m.task() != Some(board) {
                ctx.world.assign_task(member, board)?;
            }
        }
        Ok(())
    }

    /// Top the vehicle up to the full remaining-trip load from home stores.
    fn load_vehicle(&mut self, vehicle: VehicleId, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        let mut load = self.resources_needed_for_remaining_mission(ctx, true)?;
        merge(&mut load, &self.optional_resources(ctx)?);

        for (resource, amount) in load {
            let stored = self.vehicle_ref(&*ctx.world)?.inventory.stored(resource);
            let missing = amount - stored;
            if missing <= 0.0 {
                continue;
            }
            if let Err(e) = ctx.world.transfer(Holder::Settlement(self.home), Holder::Vehicle(vehicle), resource, missing) {
                warn!(mission = %self.id, %resource, missing, error = %e, "cannot load");
                self.log.add_entry(ctx.now, format!("cannot load {resource}: {e}"));
                self.end_mission(MissionStatus::CannotLoadResources, ctx);
                return Ok(());
            }
        }
        self.loaded = true;
        self.log.add_entry(ctx.now, "loaded");
        debug!(mission = %self.id, %vehicle, "vehicle loaded");
        Ok(())
    }

    /// Every living roster member is inside the vehicle.
    fn all_aboard(&self, vehicle: VehicleId, world: &dyn World) -> bool {
        self.roster
            .iter()
            .filter_map(|&m| world.member(m))
            .filter(|m| m.is_alive())
            .all(|m| m.situation() == Situation::InVehicle(vehicle))
    }

    // ── Disembark ─────────────────────────────────────────────────────────

    pub(crate) fn disembark(&mut self, member: MemberId, first: bool, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        let vehicle = self.vehicle_id()?;
        let settlement = self
            .route
            .current_navpoint()
            .and_then(|p| p.settlement())
            .ok_or(MissionError::NotAtBase(self.id))?;

        if first {
            if self.loaded {
                self.park_and_unload(vehicle, settlement, ctx)?;
            }
            self.retrieve_dead_crew(vehicle, settlement, ctx)?;
            let anyone_aboard = self
                .roster
                .iter()
                .filter_map(|&m| ctx.world.member(m))
                .any(|m| m.situation().vehicle() == Some(vehicle));
            if !anyone_aboard {
                self.finish_disembark(settlement, ctx)?;
                return Ok(());
            }
        }

        if !self.phase_ended {
            let m = ctx.world.member(member).ok_or(cm_world::WorldError::MemberNotFound(member))?;
            let exit = Task::ExitToSettlement { vehicle, settlement };
            if m.situation().vehicle() == Some(vehicle) && m.task() != Some(exit) {
                ctx.world.assign_task(member, exit)?;
            }
        }
        Ok(())
    }

    /// Garage the vehicle, release anything it tows, and move its cargo
    /// into the settlement.  Runs once per disembark.
    fn park_and_unload(&mut self, vehicle: VehicleId, settlement: SettlementId, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        ctx.world.store_vehicle(vehicle, settlement)?;
        if let Some(towed) = self.vehicle_ref(&*ctx.world)?.towing {
            self.release_towed(vehicle, towed, settlement, ctx)?;
        }

        let cargo = ctx.world.inventory_mut(Holder::Vehicle(vehicle))?.drain();
        let store = ctx.world.inventory_mut(Holder::Settlement(settlement))?;
        for (resource, amount) in cargo {
            let stored = store.store_up_to(resource, amount);
            if stored + 1e-9 < amount {
                warn!(mission = %self.id, %resource, lost = amount - stored, "settlement storage full");
            }
        }
        self.loaded = false;
        self.log.add_entry(ctx.now, "unloaded");
        Ok(())
    }

    /// Crew who died aboard are carried in for burial.
    fn retrieve_dead_crew(&mut self, vehicle: VehicleId, settlement: SettlementId, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        let dead: Vec<MemberId> = self
            .roster
            .iter()
            .filter_map(|&m| ctx.world.member(m))
            .filter(|m| !m.is_alive() && m.situation().vehicle() == Some(vehicle))
            .map(|m| m.id())
            .collect();
        for id in dead {
            retrieve_body(id, vehicle, settlement, &mut *ctx.world)?;
            self.emit(ctx.now, MissionEventKind::BodyRetrieved { member: id, settlement });
        }
        Ok(())
    }

    fn finish_disembark(&mut self, settlement: SettlementId, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        let relocating =
            matches!(self.kind, MissionKind::TravelToSettlement { .. }) && self.abort_reason.is_none();
        if relocating {
            for &id in &self.roster {
                if let Some(m) = ctx.world.member_mut(id) {
                    m.set_home(settlement);
                }
            }
        }
        let v = self.vehicle_mut(&mut *ctx.world)?;
        if v.reserved_by == Some(self.id) {
            v.reserved_by = None;
        }
        if relocating {
            v.home = settlement;
        }
        let name = ctx.world.settlement(settlement).map_or_else(|| settlement.to_string(), |s| s.name.clone());
        self.log.add_entry(ctx.now, format!("disembarked at {name}"));
        self.phase_ended = true;
        Ok(())
    }

    /// Put a vehicle that never left, or is already back, into its garage,
    /// unload it, and bring everyone aboard inside.
    pub(crate) fn stand_down(&mut self, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        let Some(vehicle) = self.vehicle else { return Ok(()) };
        let settlement = ctx
            .world
            .vehicle(vehicle)
            .ok_or(MissionError::VehicleMissing(vehicle))?
            .parked_at
            .unwrap_or(self.home);
        if self.loaded {
            self.park_and_unload(vehicle, settlement, ctx)?;
        } else {
            ctx.world.store_vehicle(vehicle, settlement)?;
        }
        self.retrieve_dead_crew(vehicle, settlement, ctx)?;

        let aboard: Vec<MemberId> = self
            .roster
            .iter()
            .filter_map(|&m| ctx.world.member(m))
            .filter(|m| m.situation().vehicle() == Some(vehicle))
            .map(|m| m.id())
            .collect();
        for id in aboard {
            ctx.world.move_into_settlement(id, settlement)?;
        }
        self.log.add_entry(ctx.now, "stood down");
        debug!(mission = %self.id, %vehicle, %settlement, "stood down");
        Ok(())
    }

    // ── Towing ────────────────────────────────────────────────────────────

    /// Decouple a towed vehicle, garage it, and bring its crew inside.
    pub(crate) fn release_towed(
        &mut self,
        vehicle:    VehicleId,
        towed:      VehicleId,
        settlement: SettlementId,
        ctx:        &mut MissionContext<'_>,
    ) -> MissionResult<()> {
        self.vehicle_mut(&mut *ctx.world)?.towing = None;
        let crew: Vec<MemberId> = {
            let t = ctx.world.vehicle_mut(towed).ok_or(MissionError::VehicleMissing(towed))?;
            t.towed_by = None;
            if t.reserved_by == Some(self.id) {
                t.reserved_by = None;
            }
            t.crew.iter().copied().collect()
        };
        ctx.world.store_vehicle(towed, settlement)?;
        debug!(mission = %self.id, %vehicle, %towed, "decoupled");
        self.log.add_entry(ctx.now, format!("salvaged {towed}"));
        self.emit(ctx.now, MissionEventKind::VehicleSalvaged { vehicle: towed, settlement });

        for id in crew {
            let alive = ctx.world.member(id).is_some_and(|m| m.is_alive());
            if alive {
                ctx.world.move_into_settlement(id, settlement)?;
                self.emit(ctx.now, MissionEventKind::PersonRescued { member: id, settlement });
            } else {
                retrieve_body(id, towed, settlement, &mut *ctx.world)?;
                self.emit(ctx.now, MissionEventKind::BodyRetrieved { member: id, settlement });
            }
        }
        Ok(())
    }
}

/// Take a dead member out of a vehicle and mark the remains retrieved at
/// `settlement`.
fn retrieve_body(member: MemberId, vehicle: VehicleId, settlement: SettlementId, world: &mut dyn World) -> MissionResult<()> {
    let at = world
        .settlement(settlement)
        .ok_or(cm_world::WorldError::SettlementNotFound(settlement))?
        .location;
    if let Some(v) = world.vehicle_mut(vehicle) {
        v.crew.remove(&member);
    }
    let m: &mut dyn MissionMember = world
        .member_mut(member)
        .ok_or(cm_world::WorldError::MemberNotFound(member))?;
    m.relocate(Situation::Retrieved, at);
    m.clear_task();
    Ok(())
}

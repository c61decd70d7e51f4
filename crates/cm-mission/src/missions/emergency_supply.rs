//! Emergency deliveries of life support and fuel to a settlement running
//! short.

use tracing::{debug, error, warn};

use cm_core::resource::{add_amount, total_mass};
use cm_core::{MemberId, MissionConfig, MissionId, Resource, ResourceMap, SettlementId};
use cm_world::{Holder, World};

use crate::{
    Mission, MissionContext, MissionEventKind, MissionKind, MissionResult, MissionStatus,
    ResourceProvisioned,
};

use super::{finish_setup, return_home, round_trip_reach};

/// Sols of consumption a settlement should have in store.
const SUPPLY_HORIZON_SOLS: f64 = 28.0;

/// Home keeps this many horizons of its own consumption before sharing.
const HOME_RESERVE_HORIZONS: f64 = 3.0;

/// Least amount of a short resource worth shipping (kg).
const MIN_SUPPLY_KG: f64 = 10.0;

/// Methane a settlement wants for its garaged vehicles: a full tank each.
fn fuel_demand(world: &dyn World, settlement: SettlementId) -> f64 {
    world.settlement(settlement).map_or(0.0, |s| {
        s.garage
            .iter()
            .filter_map(|&v| world.vehicle(v))
            .map(|v| v.inventory.capacity(Resource::Methane))
            .sum()
    })
}

/// What `settlement` lacks to feed the people inside it for the supply
/// horizon and to fuel its vehicles.  A short resource is topped up by at
/// least [`MIN_SUPPLY_KG`].
pub fn emergency_needs(world: &dyn World, config: &MissionConfig, settlement: SettlementId) -> ResourceMap {
    let mut needs = ResourceMap::new();
    let Some(s) = world.settlement(settlement) else { return needs };
    let people = world.population(settlement) as f64;

    let mut wanted: Vec<(Resource, f64)> = Resource::LIFE_SUPPORT
        .iter()
        .map(|&r| (r, config.consumption_per_sol(r) * people * SUPPLY_HORIZON_SOLS))
        .collect();
    wanted.push((Resource::Methane, fuel_demand(world, settlement)));

    for (r, want) in wanted {
        let short = want - s.inventory.stored(r);
        if short > 0.0 {
            add_amount(&mut needs, r, short.max(MIN_SUPPLY_KG));
        }
    }
    needs
}

/// How much of `resource` home can give and still keep its own reserve.
fn spare(world: &dyn World, config: &MissionConfig, home: SettlementId, resource: Resource) -> f64 {
    let Some(s) = world.settlement(home) else { return 0.0 };
    let reserve = match resource {
        Resource::Methane => fuel_demand(world, home),
        r => {
            let people = world.population(home) as f64;
            config.consumption_per_sol(r) * people * SUPPLY_HORIZON_SOLS * HOME_RESERVE_HORIZONS
        }
    };
    (s.inventory.stored(resource) - reserve).max(0.0)
}

/// Trim `supplies` to fit beside the trip's own load, entry by entry and
/// in total mass.
fn fit_to_vehicle(mission: &Mission, ctx: &MissionContext<'_>, mut supplies: ResourceMap) -> MissionResult<ResourceMap> {
    let trip = mission.resources_needed_for_remaining_mission(ctx, true)?;
    let inventory = &mission.vehicle_ref(&*ctx.world)?.inventory;
    for (r, amount) in supplies.iter_mut() {
        let room = inventory.capacity(*r) - trip.get(r).copied().unwrap_or(0.0);
        *amount = amount.min(room.max(0.0));
    }

    let room = (inventory.general_capacity_kg - total_mass(&trip)).max(0.0);
    let mass = total_mass(&supplies);
    if mass > room {
        let scale = room / mass;
        for amount in supplies.values_mut() {
            *amount *= scale;
        }
    }
    supplies.retain(|_, amount| *amount > 1e-9);
    Ok(supplies)
}

/// Plan a delivery to the closest settlement within round-trip reach that
/// runs short of something home can spare.
///
/// The crew is recruited before the load is sized, so the supplies fit
/// next to what the whole crew consumes.  Ends with `NoSettlementInNeed`
/// when no settlement in reach qualifies or nothing fits the vehicle.
pub fn emergency_supply(
    id:         MissionId,
    lead:       MemberId,
    candidates: &[MemberId],
    ctx:        &mut MissionContext<'_>,
) -> Mission {
    let kind = MissionKind::EmergencySupply {
        destination: SettlementId::INVALID,
        supplies:    ResourceMap::new(),
        delivered:   false,
    };
    let mut mission = Mission::new(id, kind, lead, ctx);
    if mission.is_done() || !mission.reserve_vehicle(ctx) {
        return mission;
    }

    let home = mission.home;
    let from = mission.route.origin().location();
    let reach = round_trip_reach(&mission, ctx);

    let world = &*ctx.world;
    let mut best: Option<(f64, SettlementId, ResourceMap)> = None;
    for s in world.settlement_ids() {
        let Some(settlement) = world.settlement(s) else { continue };
        let distance = settlement.location.distance_km(from);
        if s == home || distance > reach || best.as_ref().is_some_and(|(d, ..)| *d <= distance) {
            continue;
        }
        let mut shipment = ResourceMap::new();
        for (r, need) in emergency_needs(world, ctx.config, s) {
            add_amount(&mut shipment, r, need.min(spare(world, ctx.config, home, r)));
        }
        if !shipment.is_empty() {
            best = Some((distance, s, shipment));
        }
    }
    let Some((_, destination, wanted)) = best else {
        mission.end_mission(MissionStatus::NoSettlementInNeed, ctx);
        return mission;
    };
    let Some((at, name)) = ctx.world.settlement(destination).map(|s| (s.location, s.name.clone())) else {
        mission.end_mission(MissionStatus::NoSettlementInNeed, ctx);
        return mission;
    };

    // A work stop, like a trading partner: the vehicle is not garaged there.
    mission.route.add_navpoint(at, None, name.clone());
    return_home(&mut mission);
    mission.recruit_members(candidates, ctx);

    let supplies = match fit_to_vehicle(&mission, ctx, wanted) {
        Ok(supplies) => supplies,
        Err(e) => {
            error!(mission = %id, error = %e, "cannot size supply load");
            mission.end_mission(MissionStatus::InternalProblem, ctx);
            return mission;
        }
    };
    if supplies.is_empty() {
        mission.end_mission(MissionStatus::NoSettlementInNeed, ctx);
        return mission;
    }
    debug!(mission = %id, %destination, mass = total_mass(&supplies), "supply run planned");
    mission.log.add_entry(ctx.now, format!("supplies for {name}: {:.1} kg", total_mass(&supplies)));
    mission.kind = MissionKind::EmergencySupply { destination, supplies, delivered: false };

    finish_setup(&mut mission, &[], ctx);
    mission
}

impl Mission {
    /// Hand the supplies over, keeping back what the trip home still needs.
    pub(crate) fn deliver_supplies(&mut self, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        let MissionKind::EmergencySupply { destination, ref supplies, delivered: false } = self.kind else {
            self.phase_ended = true;
            return Ok(());
        };
        let supplies = supplies.clone();
        let vehicle = self.vehicle_id()?;
        let keep = self.resources_needed_for_remaining_mission(ctx, false)?;

        let mut handed = ResourceMap::new();
        for (resource, amount) in supplies {
            let stored = self.vehicle_ref(&*ctx.world)?.inventory.stored(resource);
            let reserve = keep.get(&resource).copied().unwrap_or(0.0);
            let amount = amount.min(stored - reserve).max(0.0);
            match ctx.world.transfer(Holder::Vehicle(vehicle), Holder::Settlement(destination), resource, amount) {
                Ok(()) => add_amount(&mut handed, resource, amount),
                Err(e) => warn!(mission = %self.id, %resource, error = %e, "hand-over failed"),
            }
        }

        if let MissionKind::EmergencySupply { delivered, .. } = &mut self.kind {
            *delivered = true;
        }
        let mass_kg = total_mass(&handed);
        debug!(mission = %self.id, %destination, mass_kg, "supplies delivered");
        self.log.add_entry(ctx.now, format!("delivered {mass_kg:.1} kg"));
        self.emit(ctx.now, MissionEventKind::SuppliesDelivered { settlement: destination, mass_kg });
        self.phase_ended = true;
        Ok(())
    }
}

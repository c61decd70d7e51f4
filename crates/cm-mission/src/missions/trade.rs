//! Trade runs between settlements.

use tracing::{debug, warn};

use cm_core::resource::{add_amount, total_mass};
use cm_core::{MemberId, MissionId, Resource, ResourceMap, SettlementId};
use cm_world::{Holder, World};

use crate::{LoadValuer, Mission, MissionContext, MissionKind, MissionResult, MissionStatus, TradePlan};

use super::{finish_setup, return_home, round_trip_reach};

/// Goods [`SurplusValuer`] considers tradeable.
const TRADE_GOODS: [Resource; 5] = [
    Resource::Water,
    Resource::Food,
    Resource::Minerals,
    Resource::RockSamples,
    Resource::Regolith,
];

/// Evens out stocks: sells half of what home holds beyond the partner,
/// buys half of what the partner holds beyond home.  The plan's value is
/// the mass moved.
#[derive(Copy, Clone, Debug, Default)]
pub struct SurplusValuer;

impl LoadValuer for SurplusValuer {
    fn plan(&self, world: &dyn World, home: SettlementId, partner: SettlementId, cargo_kg: f64) -> TradePlan {
        let (Some(h), Some(p)) = (world.settlement(home), world.settlement(partner)) else {
            return TradePlan::default();
        };
        let mut plan = TradePlan::default();
        let (mut out_room, mut back_room) = (cargo_kg, cargo_kg);
        for r in TRADE_GOODS {
            let gap = (h.inventory.stored(r) - p.inventory.stored(r)) / 2.0;
            if gap > 0.0 {
                let amount = gap.min(out_room);
                out_room -= amount;
                add_amount(&mut plan.sell, r, amount);
            } else if gap < 0.0 {
                let amount = (-gap).min(back_room);
                back_room -= amount;
                add_amount(&mut plan.buy, r, amount);
            }
        }
        plan.value = total_mass(&plan.sell) + total_mass(&plan.buy);
        plan
    }
}

/// Plan a trade run to the settlement within the vehicle's round-trip
/// reach whose plan is worth most.  Drones may fly it.  The valuer is
/// offered the hold minus room for a full tank.  Ends with
/// `NoTradingPartner` when no partner offers a plan of positive value.
pub fn trade(
    id:         MissionId,
    lead:       MemberId,
    valuer:     &dyn LoadValuer,
    candidates: &[MemberId],
    ctx:        &mut MissionContext<'_>,
) -> Mission {
    let kind = MissionKind::Trade { partner: SettlementId::INVALID, plan: TradePlan::default(), traded: false };
    let mut mission = Mission::new(id, kind, lead, ctx);
    if mission.is_done() || !mission.reserve_vehicle(ctx) {
        return mission;
    }

    let home = mission.home;
    let from = mission.route.origin().location();
    // Goods share the hold with a full tank of fuel.
    let (reach, cargo) = match mission.vehicle_ref(&*ctx.world) {
        Ok(v) => (
            round_trip_reach(&mission, ctx),
            (v.cargo_capacity() - v.inventory.capacity(Resource::Methane)).max(0.0),
        ),
        Err(_) => (0.0, 0.0),
    };

    let world = &*ctx.world;
    let mut best: Option<(SettlementId, TradePlan)> = None;
    for s in world.settlement_ids() {
        let Some(settlement) = world.settlement(s) else { continue };
        if s == home || settlement.location.distance_km(from) > reach {
            continue;
        }
        let plan = valuer.plan(world, home, s, cargo);
        if plan.value > 0.0 && best.as_ref().is_none_or(|(_, b)| plan.value > b.value) {
            best = Some((s, plan));
        }
    }
    let Some((partner, plan)) = best else {
        mission.end_mission(MissionStatus::NoTradingPartner, ctx);
        return mission;
    };

    let Some((at, name)) = ctx.world.settlement(partner).map(|s| (s.location, s.name.clone())) else {
        mission.end_mission(MissionStatus::NoTradingPartner, ctx);
        return mission;
    };
    debug!(mission = %id, %partner, value = plan.value, "trading partner chosen");
    mission.log.add_entry(ctx.now, format!("trading partner {name}"));
    mission.kind = MissionKind::Trade { partner, plan, traded: false };

    // The partner is a work stop, not a base: the vehicle is not garaged there.
    mission.route.add_navpoint(at, None, name);
    return_home(&mut mission);

    finish_setup(&mut mission, candidates, ctx);
    mission
}

impl Mission {
    /// Hand over the sold goods and load the bought ones, as far as stock
    /// and cargo space allow.
    pub(crate) fn negotiate_trade(&mut self, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        let MissionKind::Trade { partner, ref plan, traded: false } = self.kind else {
            self.phase_ended = true;
            return Ok(());
        };
        let (sell, buy) = (plan.sell.clone(), plan.buy.clone());
        let vehicle = self.vehicle_id()?;

        let mut delivered = ResourceMap::new();
        for (resource, amount) in sell {
            let amount = amount.min(self.vehicle_ref(&*ctx.world)?.inventory.stored(resource));
            match ctx.world.transfer(Holder::Vehicle(vehicle), Holder::Settlement(partner), resource, amount) {
                Ok(()) => add_amount(&mut delivered, resource, amount),
                Err(e) => warn!(mission = %self.id, %resource, error = %e, "sale failed"),
            }
        }

        let mut received = ResourceMap::new();
        for (resource, amount) in buy {
            let stock = ctx
                .world
                .inventory(Holder::Settlement(partner))
                .map_or(0.0, |inv| inv.stored(resource));
            let room = self.vehicle_ref(&*ctx.world)?.inventory.remaining_capacity(resource);
            let amount = amount.min(stock).min(room);
            match ctx.world.transfer(Holder::Settlement(partner), Holder::Vehicle(vehicle), resource, amount) {
                Ok(()) => add_amount(&mut received, resource, amount),
                Err(e) => warn!(mission = %self.id, %resource, error = %e, "purchase failed"),
            }
        }

        if let MissionKind::Trade { traded, .. } = &mut self.kind {
            *traded = true;
        }
        // Unloaded at home on disembark.
        self.loaded = true;
        self.log.add_entry(
            ctx.now,
            format!("traded: sold {:.1} kg, bought {:.1} kg", total_mass(&delivered), total_mass(&received)),
        );
        self.phase_ended = true;
        Ok(())
    }
}

use cm_core::{MemberId, MissionId, SettlementId};

use crate::{Mission, MissionContext, MissionKind, MissionStatus};

use super::{finish_setup, one_way_reach};

/// Plan a one-way relocation of the crew and vehicle.
///
/// With no `destination` the closest other settlement within the
/// vehicle's one-way reach is chosen.  Ends with `NoDestinationFound`
/// when there is none, or when the given destination is home, unknown,
/// or out of reach.
pub fn travel_to_settlement(
    id:          MissionId,
    lead:        MemberId,
    destination: Option<SettlementId>,
    candidates:  &[MemberId],
    ctx:         &mut MissionContext<'_>,
) -> Mission {
    let kind = MissionKind::TravelToSettlement { destination: destination.unwrap_or(SettlementId::INVALID) };
    let mut mission = Mission::new(id, kind, lead, ctx);
    if mission.is_done() || !mission.reserve_vehicle(ctx) {
        return mission;
    }

    let home = mission.home;
    let from = mission.route.origin().location();
    let reach = one_way_reach(&mission, ctx);
    let world = &*ctx.world;
    let reachable = |s: SettlementId| {
        world
            .settlement(s)
            .filter(|s| s.id != home && s.location.distance_km(from) <= reach)
            .map(|s| (s.id, s.location, s.name.clone(), s.location.distance_km(from)))
    };
    let chosen = match destination {
        Some(s) => reachable(s),
        None => world
            .settlement_ids()
            .into_iter()
            .filter_map(reachable)
            .min_by(|a, b| a.3.total_cmp(&b.3)),
    };
    let Some((dest, at, name, _)) = chosen else {
        mission.end_mission(MissionStatus::NoDestinationFound, ctx);
        return mission;
    };

    mission.kind = MissionKind::TravelToSettlement { destination: dest };
    mission.log.add_entry(ctx.now, format!("destination {name}"));
    mission.route.add_navpoint(at, Some(dest), name);

    finish_setup(&mut mission, candidates, ctx);
    mission
}

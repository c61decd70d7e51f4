use tracing::debug;

use cm_core::{MemberId, MissionId, MissionRng};
use cm_route::order_sites;

use crate::{Mission, MissionContext, MissionKind};

use super::{finish_setup, return_home, round_trip_reach};

/// Plan an exploration of `sites` random locations around home.
///
/// Each site lies within `reach / sites` of home, where `reach` is the
/// vehicle's round-trip reach, so the whole tour stays within what one
/// tank covers with the fuel margin.  Sites are then visited in
/// nearest-neighbour order when that is shorter.
pub fn exploration(
    id:         MissionId,
    lead:       MemberId,
    sites:      usize,
    candidates: &[MemberId],
    ctx:        &mut MissionContext<'_>,
    rng:        &mut MissionRng,
) -> Mission {
    let mut mission = Mission::new(id, MissionKind::Exploration { completion: Vec::new() }, lead, ctx);
    if mission.is_done() || !mission.reserve_vehicle(ctx) {
        return mission;
    }

    let home = mission.route.origin().location();
    let radius = round_trip_reach(&mission, ctx) / sites.max(1) as f64;
    let scattered: Vec<_> = (0..sites)
        .map(|_| {
            let distance = rng.gen_range(0.25..1.0) * radius;
            home.destination(rng.bearing(), distance)
        })
        .collect();
    let ordered = order_sites(home, &scattered);
    debug!(mission = %id, sites = ordered.len(), radius, "exploration sites chosen");
    for (i, site) in ordered.into_iter().enumerate() {
        mission.route.add_navpoint(site, None, format!("exploration site {}", i + 1));
    }
    return_home(&mut mission);

    finish_setup(&mut mission, candidates, ctx);
    mission
}

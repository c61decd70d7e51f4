use cm_core::{Coordinates, MemberId, MissionId};

use crate::{Mission, MissionContext, MissionKind, MissionStatus};

use super::{finish_setup, return_home, round_trip_reach};

/// Plan a mining trip to the closest of `candidate_sites` within the
/// vehicle's round-trip reach.  Ends with `NoMiningSite` when none qualifies.
pub fn mining(
    id:              MissionId,
    lead:            MemberId,
    candidate_sites: &[Coordinates],
    candidates:      &[MemberId],
    ctx:             &mut MissionContext<'_>,
) -> Mission {
    let mut mission = Mission::new(id, MissionKind::Mining, lead, ctx);
    if mission.is_done() || !mission.reserve_vehicle(ctx) {
        return mission;
    }

    let home = mission.route.origin().location();
    let reach = round_trip_reach(&mission, ctx);
    let site = candidate_sites
        .iter()
        .map(|&s| (s, home.distance_km(s)))
        .filter(|&(_, d)| d <= reach)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(s, _)| s);
    let Some(site) = site else {
        mission.end_mission(MissionStatus::NoMiningSite, ctx);
        return mission;
    };

    mission.route.add_navpoint(site, None, "mining site");
    return_home(&mut mission);

    finish_setup(&mut mission, candidates, ctx);
    mission
}

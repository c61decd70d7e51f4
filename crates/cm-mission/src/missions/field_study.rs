use tracing::debug;

use cm_core::{MemberId, MissionId, MissionRng};

use crate::{Mission, MissionContext, MissionKind, MissionStatus};

use super::{finish_setup, return_home, vehicle_range};

/// Plan a field study led by `lead`, in the discipline of the lead's study.
///
/// The site lies at a random bearing, between an eighth and a quarter of the
/// vehicle's range from home, so the round trip uses at most half a tank.
pub fn field_study(
    id:         MissionId,
    lead:       MemberId,
    candidates: &[MemberId],
    ctx:        &mut MissionContext<'_>,
    rng:        &mut MissionRng,
) -> Mission {
    let science = ctx.world.member(lead).and_then(|m| m.research_study());
    let mut mission = Mission::new(id, MissionKind::FieldStudy { science }, lead, ctx);
    if mission.is_done() {
        return mission;
    }
    if science.is_none() {
        mission.end_mission(MissionStatus::NoResearchStudy, ctx);
        return mission;
    }
    if !mission.reserve_vehicle(ctx) {
        return mission;
    }

    let range = vehicle_range(&mission, &*ctx.world);
    let distance = rng.gen_range(0.5..1.0) * range / 4.0;
    let site = mission.route.origin().location().destination(rng.bearing(), distance);
    debug!(mission = %id, %site, distance, "field site chosen");
    mission.route.add_navpoint(site, None, "field site");
    return_home(&mut mission);

    finish_setup(&mut mission, candidates, ctx);
    mission
}

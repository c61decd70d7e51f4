//! Constructors for the concrete mission kinds.
//!
//! Every constructor follows the same order: create the mission with its
//! lead, reserve a vehicle, plan the route, then recruit.  A failure at any
//! step ends the mission with the matching status and still returns it, so
//! the caller can log or report why the proposal went nowhere.
//!
//! | Constructor               | Route                                        |
//! |---------------------------|----------------------------------------------|
//! | [`field_study`]           | home → one random field site → home          |
//! | [`exploration`]           | home → N ordered sites → home                |
//! | [`mining`]                | home → closest mining candidate → home       |
//! | [`rescue_salvage`]        | home → stranded vehicle → home               |
//! | [`travel_to_settlement`]  | home → destination settlement                |
//! | [`trade`]                 | home → trading partner → home                |
//! | [`emergency_supply`]      | home → settlement in need → home             |

mod emergency_supply;
mod exploration;
mod field_study;
mod mining;
mod rescue;
mod trade;
mod travel_to_settlement;

pub use emergency_supply::{emergency_needs, emergency_supply};
pub use exploration::exploration;
pub use field_study::field_study;
pub use mining::mining;
pub use rescue::{find_beacon_vehicle, rescue_salvage};
pub use trade::{trade, SurplusValuer};
pub use travel_to_settlement::travel_to_settlement;

use tracing::error;

use cm_world::World;

use crate::{Mission, MissionContext, MissionStatus};

/// Full-tank range of the reserved vehicle (km); zero without one.
fn vehicle_range(mission: &Mission, world: &dyn World) -> f64 {
    mission.vehicle_ref(world).map_or(0.0, |v| v.range_km())
}

/// Farthest a one-way trip may go so its fuel estimate, margin included,
/// fits one tank (km).
fn one_way_reach(mission: &Mission, ctx: &MissionContext<'_>) -> f64 {
    vehicle_range(mission, &*ctx.world) / ctx.config.fuel_range_error_margin.max(1.0)
}

/// As [`one_way_reach`], for a there-and-back trip.
fn round_trip_reach(mission: &Mission, ctx: &MissionContext<'_>) -> f64 {
    one_way_reach(mission, ctx) / 2.0
}

/// Close the route at the home settlement.
fn return_home(mission: &mut Mission) {
    let origin = mission.route.origin();
    let (at, name) = (origin.location(), origin.description().to_owned());
    let home = mission.home;
    mission.route.add_navpoint(at, Some(home), name);
}

/// Recruit from `candidates` and publish the planned distance.
fn finish_setup(mission: &mut Mission, candidates: &[cm_core::MemberId], ctx: &mut MissionContext<'_>) {
    mission.recruit_members(candidates, ctx);
    if let Err(e) = mission.update_distance(ctx) {
        error!(mission = %mission.id(), error = %e, "cannot measure planned route");
        mission.end_mission(MissionStatus::InternalProblem, ctx);
    }
}

//! Mission-engine error type.
//!
//! These are invariant violations, not termination reasons.  A mission that
//! hits one logs it at `error` level and ends with
//! [`MissionStatus::InternalProblem`][crate::MissionStatus::InternalProblem].

use thiserror::Error;

use cm_core::{MissionId, VehicleId};
use cm_route::RouteError;
use cm_world::WorldError;

use crate::MissionPhase;

#[derive(Debug, Error)]
pub enum MissionError {
    #[error("world error: {0}")]
    World(#[from] WorldError),

    #[error("route error: {0}")]
    Route(#[from] RouteError),

    #[error("mission {0} has no vehicle")]
    NoVehicle(MissionId),

    #[error("mission {0} is disembarking away from a settlement")]
    NotAtBase(MissionId),

    #[error("vehicle {0} vanished from the world")]
    VehicleMissing(VehicleId),

    #[error("phase {phase} has no transition registered for mission {mission}")]
    UnregisteredPhase { mission: MissionId, phase: MissionPhase },
}

pub type MissionResult<T> = Result<T, MissionError>;

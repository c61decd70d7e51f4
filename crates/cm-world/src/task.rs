//! Task directives a mission hands to the task scheduler.
//!
//! A task describes *what* a member should do next; the scheduler
//! ([`TaskScheduler`][crate::TaskScheduler]) decides how it plays out over
//! ticks and clears it once complete.  Continuous work (`FieldWork`) stays
//! assigned until the mission replaces it.

use cm_core::{Coordinates, SettlementId, VehicleId};

/// Kind of off-vehicle work done at a site.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldWork {
    Research,
    /// Collects rock samples into the vehicle.
    Explore,
    /// Collects minerals into the vehicle.
    Mine,
}

/// One member's current directive.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Task {
    /// Climb into a vehicle parked at (or next to) the member.
    BoardVehicle { vehicle: VehicleId },
    /// Leave a vehicle and walk into a settlement.
    ExitToSettlement { vehicle: VehicleId, settlement: SettlementId },
    /// Operate a vehicle toward `destination`.  Drones are piloted remotely,
    /// so the operator need not be aboard.
    Drive { vehicle: VehicleId, destination: Coordinates },
    /// Leave the vehicle and work outside next to it.
    FieldWork { vehicle: VehicleId, work: FieldWork },
    /// Walk back into the vehicle from outside.
    ReturnToVehicle { vehicle: VehicleId },
}

impl Task {
    pub fn vehicle(&self) -> VehicleId {
        match *self {
            Task::BoardVehicle { vehicle }
            | Task::ExitToSettlement { vehicle, .. }
            | Task::Drive { vehicle, .. }
            | Task::FieldWork { vehicle, .. }
            | Task::ReturnToVehicle { vehicle } => vehicle,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Task::BoardVehicle { .. }     => "board vehicle",
            Task::ExitToSettlement { .. } => "exit to settlement",
            Task::Drive { .. }            => "drive",
            Task::FieldWork { .. }        => "field work",
            Task::ReturnToVehicle { .. }  => "return to vehicle",
        }
    }
}

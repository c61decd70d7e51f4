//! World-subsystem error type.

use thiserror::Error;

use cm_core::{MemberId, Resource, SettlementId, VehicleId};

/// Errors produced by storage and lookup operations on the world.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("member {0} not found")]
    MemberNotFound(MemberId),

    #[error("vehicle {0} not found")]
    VehicleNotFound(VehicleId),

    #[error("settlement {0} not found")]
    SettlementNotFound(SettlementId),

    #[error("vehicle {vehicle} is not parked at settlement {settlement}")]
    VehicleNotParked { vehicle: VehicleId, settlement: SettlementId },

    #[error("requested {requested:.3} of {resource} but only {available:.3} stored")]
    InsufficientStock { resource: Resource, requested: f64, available: f64 },

    #[error("cannot store {requested:.3} of {resource}: only {remaining:.3} capacity left")]
    CapacityExceeded { resource: Resource, requested: f64, remaining: f64 },
}

pub type WorldResult<T> = Result<T, WorldError>;

//! Settlements: garages, stores, and livable space.

use std::collections::BTreeSet;

use cm_core::{Coordinates, SettlementId, VehicleId};

use crate::Inventory;

#[derive(Clone, Debug)]
pub struct Settlement {
    pub id:        SettlementId,
    pub name:      String,
    pub location:  Coordinates,
    pub inventory: Inventory,
    /// Vehicles parked in the garage.
    pub garage:    BTreeSet<VehicleId>,
}

impl Settlement {
    pub fn new(name: impl Into<String>, location: Coordinates) -> Self {
        Self {
            id:        SettlementId::INVALID,
            name:      name.into(),
            location,
            inventory: Inventory::unbounded(),
            garage:    BTreeSet::new(),
        }
    }
}

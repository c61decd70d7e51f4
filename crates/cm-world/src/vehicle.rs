//! Vehicles: ground rovers and remotely piloted drones.

use std::collections::BTreeSet;

use cm_core::{Coordinates, MemberId, MissionId, Resource, SettlementId, VehicleId};

use crate::Inventory;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VehicleKind {
    /// Crewed ground vehicle.  Members ride inside.
    Rover,
    /// Uncrewed flyer piloted from the settlement.
    Drone,
}

impl VehicleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleKind::Rover => "rover",
            VehicleKind::Drone => "drone",
        }
    }
}

/// Static performance figures used to construct a [`Vehicle`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleSpec {
    pub kind:           VehicleKind,
    pub base_speed_kph: f64,
    /// Kilometres per kg of methane.
    pub fuel_economy:   f64,
    pub fuel_tank_kg:   f64,
    pub cargo_kg:       f64,
    pub crew_capacity:  usize,
    pub eva_suit_rack:  f64,
    pub has_lab:        bool,
}

impl VehicleSpec {
    pub fn rover() -> Self {
        Self {
            kind:           VehicleKind::Rover,
            base_speed_kph: 30.0,
            fuel_economy:   4.0,
            fuel_tank_kg:   400.0,
            cargo_kg:       2_500.0,
            crew_capacity:  4,
            eva_suit_rack:  6.0,
            has_lab:        true,
        }
    }

    pub fn drone() -> Self {
        Self {
            kind:           VehicleKind::Drone,
            base_speed_kph: 60.0,
            fuel_economy:   10.0,
            fuel_tank_kg:   60.0,
            cargo_kg:       300.0,
            crew_capacity:  0,
            eva_suit_rack:  0.0,
            has_lab:        false,
        }
    }
}

/// A vehicle and its live state.
#[derive(Clone, Debug)]
pub struct Vehicle {
    pub id:             VehicleId,
    pub name:           String,
    pub kind:           VehicleKind,
    pub home:           SettlementId,
    pub location:       Coordinates,
    /// Garage the vehicle sits in; `None` while out on the surface.
    pub parked_at:      Option<SettlementId>,
    pub base_speed_kph: f64,
    pub fuel_economy:   f64,
    pub crew_capacity:  usize,
    pub has_lab:        bool,
    pub inventory:      Inventory,
    /// Members currently aboard.
    pub crew:           BTreeSet<MemberId>,
    pub operator:       Option<MemberId>,
    pub beacon_on:      bool,
    pub towing:         Option<VehicleId>,
    pub towed_by:       Option<VehicleId>,
    pub reserved_by:    Option<MissionId>,
    pub odometer_km:    f64,
}

impl Vehicle {
    pub fn new(name: impl Into<String>, home: SettlementId, location: Coordinates, spec: &VehicleSpec) -> Self {
        let mut inventory = Inventory::new(spec.cargo_kg).with_cap(Resource::Methane, spec.fuel_tank_kg);
        if spec.kind == VehicleKind::Rover {
            inventory = inventory.with_cap(Resource::EvaSuit, spec.eva_suit_rack);
        } else {
            inventory = inventory.with_cap(Resource::EvaSuit, 0.0);
        }
        Self {
            id:             VehicleId::INVALID,
            name:           name.into(),
            kind:           spec.kind,
            home,
            location,
            parked_at:      Some(home),
            base_speed_kph: spec.base_speed_kph,
            fuel_economy:   spec.fuel_economy,
            crew_capacity:  spec.crew_capacity,
            has_lab:        spec.has_lab,
            inventory,
            crew:           BTreeSet::new(),
            operator:       None,
            beacon_on:      false,
            towing:         None,
            towed_by:       None,
            reserved_by:    None,
            odometer_km:    0.0,
        }
    }

    /// Distance a full tank covers (km).
    pub fn range_km(&self) -> f64 {
        self.inventory.capacity(Resource::Methane) * self.fuel_economy
    }

    /// Distance the fuel currently aboard covers (km).
    pub fn fuel_range_km(&self) -> f64 {
        self.inventory.stored(Resource::Methane) * self.fuel_economy
    }

    pub fn cargo_capacity(&self) -> f64 {
        self.inventory.general_capacity_kg
    }

    /// Free to be reserved by a new mission.
    pub fn is_available(&self) -> bool {
        self.parked_at.is_some()
            && self.reserved_by.is_none()
            && !self.beacon_on
            && self.towed_by.is_none()
    }

    /// Average speed a trip can plan with (km/h).
    pub fn average_speed(&self, default_kph: f64) -> f64 {
        if self.base_speed_kph > 0.0 { self.base_speed_kph } else { default_kph }
    }

    #[inline]
    pub fn is_parked(&self) -> bool {
        self.parked_at.is_some()
    }
}

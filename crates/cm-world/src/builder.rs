//! Fluent construction of a [`ColonyWorld`].
//!
//! # Usage
//!
//! ```rust
//! use cm_core::{Coordinates, Resource};
//! use cm_world::{ColonyWorldBuilder, Person, VehicleSpec};
//!
//! let mut b = ColonyWorldBuilder::new();
//! let base = b.add_settlement("Schiaparelli", Coordinates::new(0.0, 0.0));
//! b.stock(base, Resource::Oxygen, 500.0);
//! let rover = b.add_vehicle("Opportunity", base, VehicleSpec::rover());
//! let lead = b.add_person(Person::new("Ada", base, Coordinates::default()));
//! let world = b.build().unwrap();
//! # let _ = (rover, lead, world);
//! ```

use cm_core::{Coordinates, MemberId, Resource, SettlementId, VehicleId};

use crate::{
    ColonyWorld, MissionMember, Person, Robot, Settlement, Situation, SolarModel, Vehicle,
    VehicleSpec, WorldError, WorldResult,
};

/// Collects settlements, vehicles, and members, then validates the
/// cross-references and builds the spatial index in [`build`](Self::build).
///
/// Vehicles and members are placed at their home settlement; vehicles start
/// parked in its garage.
#[derive(Default)]
pub struct ColonyWorldBuilder {
    settlements: Vec<Settlement>,
    vehicles:    Vec<Vehicle>,
    members:     Vec<Box<dyn MissionMember>>,
    stock:       Vec<(SettlementId, Resource, f64)>,
    solar:       SolarModel,
}

impl ColonyWorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_settlement(&mut self, name: &str, location: Coordinates) -> SettlementId {
        let id = SettlementId(self.settlements.len() as u32);
        let mut s = Settlement::new(name, location);
        s.id = id;
        self.settlements.push(s);
        id
    }

    /// Add `amount` of `resource` to a settlement's stores.
    pub fn stock(&mut self, settlement: SettlementId, resource: Resource, amount: f64) -> &mut Self {
        self.stock.push((settlement, resource, amount));
        self
    }

    pub fn add_vehicle(&mut self, name: &str, home: SettlementId, spec: VehicleSpec) -> VehicleId {
        let id = VehicleId(self.vehicles.len() as u32);
        let mut v = Vehicle::new(name, home, Coordinates::default(), &spec);
        v.id = id;
        self.vehicles.push(v);
        id
    }

    pub fn add_person(&mut self, mut person: Person) -> MemberId {
        let id = MemberId(self.members.len() as u32);
        person.id = id;
        self.members.push(Box::new(person));
        id
    }

    pub fn add_robot(&mut self, mut robot: Robot) -> MemberId {
        let id = MemberId(self.members.len() as u32);
        robot.id = id;
        self.members.push(Box::new(robot));
        id
    }

    pub fn solar(&mut self, solar: SolarModel) -> &mut Self {
        self.solar = solar;
        self
    }

    /// Validate every home reference and return the finished world.
    pub fn build(self) -> WorldResult<ColonyWorld> {
        let mut settlements = self.settlements;

        for (settlement, resource, amount) in self.stock {
            let s = settlements
                .get_mut(settlement.index())
                .ok_or(WorldError::SettlementNotFound(settlement))?;
            s.inventory.store(resource, amount)?;
        }

        let mut vehicles = Vec::with_capacity(self.vehicles.len());
        for mut v in self.vehicles {
            let home = settlements
                .get_mut(v.home.index())
                .ok_or(WorldError::SettlementNotFound(v.home))?;
            v.location = home.location;
            v.parked_at = Some(home.id);
            home.garage.insert(v.id);
            vehicles.push(v);
        }

        let mut members = self.members;
        for m in &mut members {
            let home = m.home();
            let s = settlements
                .get(home.index())
                .ok_or(WorldError::SettlementNotFound(home))?;
            if let Situation::InSettlement(_) = m.situation() {
                m.relocate(Situation::InSettlement(home), s.location);
            }
        }

        Ok(ColonyWorld::from_parts(members, vehicles, settlements, self.solar))
    }
}

//! The demo colony: a main base and an outpost on the Martian equator.

use cm_core::{Coordinates, MemberId, MissionType, Resource, Science, SettlementId, VehicleId};
use cm_world::{ColonyWorld, ColonyWorldBuilder, Person, Robot, SolarModel, VehicleSpec, WorldResult};

pub const BASE_LOCATION:    Coordinates = Coordinates { lat: -4.6, lon: 137.4 };
pub const OUTPOST_LOCATION: Coordinates = Coordinates { lat: -3.0, lon: 140.0 };

/// Handles the scenario needs after the world is built.
pub struct Roster {
    pub outpost:    SettlementId,
    /// Broke down on the way back from a survey; Ines is aboard.
    pub stranded:   VehicleId,
    pub geologist:  MemberId,
    pub biologist:  MemberId,
    pub engineer:   MemberId,
    pub medic:      MemberId,
    pub pilot:      MemberId,
    pub miner:      MemberId,
    pub courier:    MemberId,
    pub settler:    MemberId,
    pub rover_bot:  MemberId,
    pub survivor:   MemberId,
}

fn stock(b: &mut ColonyWorldBuilder, at: SettlementId, amounts: &[(Resource, f64)]) {
    for &(resource, amount) in amounts {
        b.stock(at, resource, amount);
    }
}

pub fn build_colony() -> WorldResult<(ColonyWorld, Roster)> {
    let mut b = ColonyWorldBuilder::new();
    let base = b.add_settlement("Schiaparelli Base", BASE_LOCATION);
    let outpost = b.add_settlement("Gale Outpost", OUTPOST_LOCATION);

    stock(&mut b, base, &[
        (Resource::Oxygen, 2_000.0),
        (Resource::Water, 8_000.0),
        (Resource::Food, 1_500.0),
        (Resource::Methane, 6_000.0),
        (Resource::EvaSuit, 30.0),
        (Resource::SparePart, 60.0),
    ]);
    stock(&mut b, outpost, &[
        (Resource::Oxygen, 400.0),
        (Resource::Water, 300.0),
        (Resource::Food, 200.0),
        (Resource::Methane, 1_000.0),
        (Resource::Minerals, 900.0),
    ]);

    for name in ["Opportunity", "Perseverance", "Curiosity", "Sojourner", "Spirit"] {
        b.add_vehicle(name, base, VehicleSpec::rover());
    }
    b.add_vehicle("Ingenuity", base, VehicleSpec::drone());
    let stranded = b.add_vehicle("Zhurong", base, VehicleSpec::rover());

    let at = BASE_LOCATION;
    let geologist = b.add_person(
        Person::new("Ada", base, at)
            .with_study(Science::Areology)
            .with_experience(MissionType::FieldStudy, 4.0),
    );
    let biologist = b.add_person(Person::new("Katherine", base, at).with_study(Science::Biology));
    let engineer = b.add_person(Person::new("Grace", base, at).with_experience(MissionType::Exploration, 3.0));
    let medic = b.add_person(Person::new("Mae", base, at));
    let pilot = b.add_person(Person::new("Valentina", base, at).with_experience(MissionType::RescueSalvage, 2.0));
    let miner = b.add_person(Person::new("Yuri", base, at).with_experience(MissionType::Mining, 5.0));
    let courier = b.add_person(Person::new("Sally", base, at));
    let settler = b.add_person(Person::new("Chris", base, at));
    let survivor = b.add_person(Person::new("Ines", base, at));
    let rover_bot = b.add_robot(Robot::new("Unit 7", base, at));

    b.solar(SolarModel::default());
    let mut world = b.build()?;

    let breakdown = BASE_LOCATION.destination(std::f64::consts::PI, 120.0);
    world.strand_vehicle(stranded, breakdown, &[survivor])?;

    Ok((world, Roster {
        outpost,
        stranded,
        geologist,
        biologist,
        engineer,
        medic,
        pilot,
        miner,
        courier,
        settler,
        rover_bot,
        survivor,
    }))
}

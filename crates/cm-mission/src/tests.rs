//! Unit and scenario tests for cm-mission.

use std::f64::consts::FRAC_PI_2;

use cm_core::{
    Coordinates, MemberId, MissionConfig, MissionId, MissionRng, MissionType, Resource, Science,
    SettlementId, SimClock, VehicleId,
};
use cm_world::{
    ColonyWorld, ColonyWorldBuilder, Health, Person, Robot, Situation, SolarModel, TaskScheduler,
    Vehicle, VehicleSpec, World,
};

use crate::missions;
use crate::provisioning::{best_vehicle, compare_vehicles, resources_needed_for_trip};
use crate::{
    Mission, MissionContext, MissionEvent, MissionEventKind, MissionKind, MissionPhase,
    MissionStatus, PhaseTable, ResourceProvisioned, Routable, TripProfile, VehicleRequirement,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const HOME: Coordinates = Coordinates { lat: 0.0, lon: 0.0 };
const MSOL_PER_TICK: f64 = 10.0;
const MAX_TICKS: usize = 2_000;

struct Harness {
    world:  ColonyWorld,
    clock:  SimClock,
    config: MissionConfig,
}

impl Harness {
    fn new(world: ColonyWorld) -> Self {
        Self { world, clock: SimClock::new(MSOL_PER_TICK), config: MissionConfig::default() }
    }

    fn ctx(&mut self) -> MissionContext<'_> {
        MissionContext::new(&self.clock, &self.config, &mut self.world)
    }

    /// Every roster member acts once, then tasks play out and the clock moves.
    fn tick(&mut self, mission: &mut Mission) {
        let roster: Vec<MemberId> = mission.roster().iter().copied().collect();
        let mut ctx = MissionContext::new(&self.clock, &self.config, &mut self.world);
        for member in roster {
            mission.perform_mission(member, &mut ctx);
        }
        self.world.advance(self.clock.current_tick, self.clock.millisols_per_tick, &self.config);
        self.clock.advance();
    }

    /// Tick until the mission is done; returns every event, creation included.
    fn run(&mut self, mission: &mut Mission) -> Vec<MissionEvent> {
        let mut events = mission.take_events();
        for _ in 0..MAX_TICKS {
            if mission.is_done() {
                break;
            }
            self.tick(mission);
            events.extend(mission.take_events());
        }
        events
    }
}

fn stock_base(b: &mut ColonyWorldBuilder, base: SettlementId) {
    for (r, amount) in [
        (Resource::Oxygen, 500.0),
        (Resource::Water, 2_000.0),
        (Resource::Food, 500.0),
        (Resource::Methane, 2_000.0),
        (Resource::EvaSuit, 20.0),
        (Resource::SparePart, 20.0),
    ] {
        b.stock(base, r, amount);
    }
}

/// One stocked base with a rover, a lead with a study, and one crew member.
#[derive(Copy, Clone)]
struct Colony {
    base:  SettlementId,
    rover: VehicleId,
    lead:  MemberId,
    crew:  MemberId,
}

fn colony(solar: SolarModel, home: Coordinates) -> (ColonyWorld, Colony) {
    let mut b = ColonyWorldBuilder::new();
    let base = b.add_settlement("Base", home);
    stock_base(&mut b, base);
    let rover = b.add_vehicle("Rover 1", base, VehicleSpec::rover());
    let lead = b.add_person(Person::new("Ada", base, home).with_study(Science::Areology));
    let crew = b.add_person(Person::new("Grace", base, home));
    b.solar(solar);
    (b.build().unwrap(), Colony { base, rover, lead, crew })
}

fn daylight() -> (ColonyWorld, Colony) {
    colony(SolarModel::constant(400.0), HOME)
}

fn field_study(h: &mut Harness, c: &Colony) -> Mission {
    let mut rng = MissionRng::new(7, MissionId(0));
    let mut ctx = h.ctx();
    missions::field_study(MissionId(0), c.lead, &[c.crew], &mut ctx, &mut rng)
}

fn phases(events: &[MissionEvent]) -> Vec<MissionPhase> {
    events
        .iter()
        .filter_map(|e| match &e.kind {
            MissionEventKind::PhaseChanged { phase, .. } => Some(*phase),
            _ => None,
        })
        .collect()
}

fn phase_tick(events: &[MissionEvent], phase: MissionPhase) -> Option<u64> {
    events
        .iter()
        .find(|e| matches!(&e.kind, MissionEventKind::PhaseChanged { phase: p, .. } if *p == phase))
        .map(|e| e.tick.0)
}

fn eva_end_tick(mission: &Mission) -> Option<u64> {
    mission
        .log()
        .entries()
        .iter()
        .find(|e| e.description == "EVA ended")
        .map(|e| e.tick.0)
}

/// Tick until the whole crew is out at the research site.
fn step_outside(h: &mut Harness, m: &mut Mission, c: &Colony) {
    let outside = |h: &Harness| {
        [c.lead, c.crew]
            .iter()
            .all(|&id| h.world.member(id).unwrap().situation() == Situation::Outside(c.rover))
    };
    for _ in 0..MAX_TICKS {
        if m.phase() == MissionPhase::ResearchSite && outside(h) {
            return;
        }
        h.tick(m);
    }
    panic!("crew never stepped outside");
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use super::*;

    #[test]
    fn field_study_runs_every_phase_in_order() {
        let (world, c) = daylight();
        let mut h = Harness::new(world);
        let mut m = field_study(&mut h, &c);
        assert!(!m.is_done());
        assert_eq!(m.roster().len(), 2);
        assert_eq!(m.vehicle(), Some(c.rover));

        // Out to one site and back home.
        let range = h.world.vehicle(c.rover).unwrap().range_km();
        assert_eq!(m.route().len(), 3);
        let points = m.route().points();
        assert!(points[1].settlement().is_none());
        assert_eq!(points[2].settlement(), Some(c.base));
        let out = points[1].location().distance_km(HOME);
        assert!(out >= range / 8.0 - 1e-6 && out < range / 4.0, "site {out:.1} km out, range {range:.1} km");

        let events = h.run(&mut m);
        assert_eq!(m.statuses(), &[MissionStatus::Accomplished]);
        assert_eq!(
            phases(&events),
            vec![
                MissionPhase::Reviewing,
                MissionPhase::Embarking,
                MissionPhase::Travelling,
                MissionPhase::ResearchSite,
                MissionPhase::Travelling,
                MissionPhase::Disembarking,
            ]
        );

        let rover = h.world.vehicle(c.rover).unwrap();
        assert_eq!(rover.parked_at, Some(c.base));
        assert!(rover.reserved_by.is_none());
        for id in [c.lead, c.crew] {
            let member = h.world.member(id).unwrap();
            assert_eq!(member.situation(), Situation::InSettlement(c.base));
            assert!(member.mission().is_none());
            assert!(member.task().is_none());
        }
        assert!(m.log().started().is_some());
        assert!(m.log().finished().is_some());
    }

    #[test]
    fn site_time_bounds_eva() {
        let (world, c) = daylight();
        let mut h = Harness::new(world);
        let mut m = field_study(&mut h, &c);
        let events = h.run(&mut m);

        let entered = phase_tick(&events, MissionPhase::ResearchSite).unwrap();
        let ended = eva_end_tick(&m).unwrap();
        let site_ticks = (h.config.research_site_millisols / MSOL_PER_TICK) as u64;
        assert!(ended - entered >= site_ticks, "EVA lasted {} ticks", ended - entered);
    }

    #[test]
    fn distance_events_shrink_while_driving_out() {
        let (world, c) = daylight();
        let mut h = Harness::new(world);
        let mut m = field_study(&mut h, &c);
        let events = h.run(&mut m);

        let remaining: Vec<f64> = events
            .iter()
            .filter_map(|e| match e.kind {
                MissionEventKind::DistanceChanged { remaining_km } => Some(remaining_km),
                _ => None,
            })
            .collect();
        assert!(remaining.len() > 2);
        assert!(remaining.windows(2).all(|w| w[1] <= w[0] + 1e-6));
        assert!(remaining.last().copied().unwrap() < 1e-3);
    }

    #[test]
    fn travel_to_settlement_relocates_crew_and_vehicle() {
        let mut b = ColonyWorldBuilder::new();
        let base = b.add_settlement("Base", HOME);
        let near = b.add_settlement("Near", HOME.destination(FRAC_PI_2, 100.0));
        b.add_settlement("Far", HOME.destination(0.0, 300.0));
        stock_base(&mut b, base);
        let rover = b.add_vehicle("Rover 1", base, VehicleSpec::rover());
        let lead = b.add_person(Person::new("Ada", base, HOME));
        let mut h = Harness::new(b.build().unwrap());

        let mut m = {
            let mut ctx = h.ctx();
            missions::travel_to_settlement(MissionId(1), lead, None, &[], &mut ctx)
        };
        assert_eq!(m.kind(), &MissionKind::TravelToSettlement { destination: near });
        h.run(&mut m);

        assert_eq!(m.statuses(), &[MissionStatus::Accomplished]);
        let member = h.world.member(lead).unwrap();
        assert_eq!(member.home(), near);
        assert_eq!(member.situation(), Situation::InSettlement(near));
        let v = h.world.vehicle(rover).unwrap();
        assert_eq!(v.home, near);
        assert_eq!(v.parked_at, Some(near));
    }
}

// ── Emergencies ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod emergency {
    use super::*;

    #[test]
    fn mid_eva_shortage_reroutes_and_ends_phase_same_tick() {
        let (world, c) = daylight();
        let mut h = Harness::new(world);
        let mut m = field_study(&mut h, &c);
        let site = m.route().points()[1].location();
        let tolerance = h.config.arrival_tolerance_km;

        // Drive out until the rover sits on the site, one tick before arrival
        // is processed, then leave enough oxygen for the drive home only.
        let mut cut = false;
        for _ in 0..MAX_TICKS {
            let parked_on_site = m.phase() == MissionPhase::Travelling
                && m.route().cursor() == 1
                && h.world.vehicle(c.rover).unwrap().location.distance_km(site) <= tolerance;
            if parked_on_site {
                let oxygen = {
                    let ctx = h.ctx();
                    let need = m.resources_needed_for_trip(&ctx, false, site.distance_km(HOME)).unwrap();
                    need[&Resource::Oxygen] + 1.0
                };
                let inv = &mut h.world.vehicles[c.rover.index()].inventory;
                inv.take_up_to(Resource::Oxygen, f64::INFINITY);
                inv.store(Resource::Oxygen, oxygen).unwrap();
                cut = true;
                break;
            }
            h.tick(&mut m);
        }
        assert!(cut, "rover never reached the field site");
        m.take_events();

        h.tick(&mut m);
        let events = m.take_events();
        assert_eq!(m.phase(), MissionPhase::ResearchSite);
        assert!(m.is_phase_ended());
        assert!(!m.is_eva_active());
        assert!(!m.is_done());
        assert!(m.route().is_rerouted());
        assert_eq!(m.route().points().last().unwrap().settlement(), Some(c.base));
        assert!(events.iter().any(|e| matches!(
            e.kind,
            MissionEventKind::EmergencyDestination { reason: MissionStatus::NotEnoughResources, .. }
        )));

        let ctx = h.ctx();
        assert!(!m.has_enough_resources_for_remaining_mission(&ctx, false).unwrap());
    }

    #[test]
    fn serious_illness_on_the_road_returns_home() {
        let (world, c) = daylight();
        let mut h = Harness::new(world);
        let mut m = field_study(&mut h, &c);
        while m.phase() != MissionPhase::Travelling {
            h.tick(&mut m);
        }
        h.tick(&mut m);
        h.world.member_mut(c.crew).unwrap().set_health(Health::Serious);

        let events = h.run(&mut m);
        assert!(events.iter().any(|e| matches!(
            e.kind,
            MissionEventKind::EmergencyDestination { reason: MissionStatus::MedicalEmergency, .. }
        )));
        assert!(!phases(&events).contains(&MissionPhase::ResearchSite));
        assert_eq!(m.statuses(), &[MissionStatus::Accomplished]);
        assert_eq!(h.world.member(c.crew).unwrap().situation(), Situation::InSettlement(c.base));
    }

    #[test]
    fn running_dry_with_crew_outside_waits_for_them() {
        let (world, c) = daylight();
        let mut h = Harness::new(world);
        let mut m = field_study(&mut h, &c);
        step_outside(&mut h, &mut m, &c);

        let inv = &mut h.world.vehicles[c.rover.index()].inventory;
        inv.take_up_to(Resource::Oxygen, f64::INFINITY);
        inv.take_up_to(Resource::Methane, f64::INFINITY);
        m.take_events();

        h.tick(&mut m);
        assert!(!m.is_done());
        assert!(!m.is_eva_active());
        assert!(h.world.vehicle(c.rover).unwrap().beacon_on);
        for id in [c.lead, c.crew] {
            assert_eq!(h.world.member(id).unwrap().situation(), Situation::InVehicle(c.rover));
        }

        h.tick(&mut m);
        assert_eq!(m.statuses(), &[MissionStatus::NotEnoughResources]);
        for id in [c.lead, c.crew] {
            let member = h.world.member(id).unwrap();
            assert_eq!(member.situation(), Situation::InVehicle(c.rover));
            assert!(member.mission().is_none());
        }
        let events = m.take_events();
        assert!(events.iter().any(|e| matches!(
            e.kind,
            MissionEventKind::EmergencyBeacon { on: true, reason: Some(MissionStatus::NotEnoughResources), .. }
        )));
    }

    #[test]
    fn abort_at_the_site_recalls_crew_and_drives_home() {
        let (world, c) = daylight();
        let mut h = Harness::new(world);
        let mut m = field_study(&mut h, &c);
        step_outside(&mut h, &mut m, &c);
        m.take_events();

        {
            let mut ctx = h.ctx();
            m.abort_mission(MissionStatus::AbortedByOperator, &mut ctx);
        }
        assert!(!m.is_done());
        assert!(!m.is_eva_active());
        assert!(m.route().is_rerouted());
        assert_eq!(m.abort_reason(), Some(MissionStatus::AbortedByOperator));

        let events = h.run(&mut m);
        assert_eq!(m.statuses(), &[MissionStatus::AbortedByOperator]);
        assert_eq!(phases(&events), vec![MissionPhase::Travelling, MissionPhase::Disembarking]);
        let rover = h.world.vehicle(c.rover).unwrap();
        assert_eq!(rover.parked_at, Some(c.base));
        assert!(!rover.beacon_on);
        for id in [c.lead, c.crew] {
            assert_eq!(h.world.member(id).unwrap().situation(), Situation::InSettlement(c.base));
        }
    }

    #[test]
    fn abort_with_nobody_able_to_drive_calls_for_help() {
        let (world, c) = daylight();
        let mut h = Harness::new(world);
        let mut m = field_study(&mut h, &c);
        while m.phase() != MissionPhase::Travelling {
            h.tick(&mut m);
        }
        h.tick(&mut m);
        for id in [c.lead, c.crew] {
            h.world.member_mut(id).unwrap().set_health(Health::Serious);
        }

        let mut ctx = h.ctx();
        m.abort_mission(MissionStatus::AbortedByOperator, &mut ctx);
        assert_eq!(m.statuses(), &[MissionStatus::AbortedByOperator]);
        let rover = h.world.vehicle(c.rover).unwrap();
        assert!(rover.beacon_on);
        assert!(rover.parked_at.is_none());
    }

    #[test]
    fn rescue_without_target_never_leaves_review() {
        let (world, c) = daylight();
        let mut h = Harness::new(world);
        let m = {
            let mut ctx = h.ctx();
            missions::rescue_salvage(MissionId(3), c.lead, &[], &[], &mut ctx)
        };
        assert_eq!(m.statuses(), &[MissionStatus::TargetVehicleNotFound]);
        assert_eq!(m.phase(), MissionPhase::Reviewing);
        assert_eq!(phases(m.pending_events()), vec![MissionPhase::Reviewing]);
        assert!(h.world.vehicle(c.rover).unwrap().reserved_by.is_none());
        assert!(h.world.member(c.lead).unwrap().mission().is_none());
    }

    #[test]
    fn rescue_tows_stranded_crew_home() {
        let mut b = ColonyWorldBuilder::new();
        let base = b.add_settlement("Base", HOME);
        stock_base(&mut b, base);
        let rescuer = b.add_vehicle("Rover 1", base, VehicleSpec::rover());
        let stranded = b.add_vehicle("Spirit", base, VehicleSpec::rover());
        let lead = b.add_person(Person::new("Ada", base, HOME));
        let victim = b.add_person(Person::new("Hedy", base, HOME));
        b.solar(SolarModel::constant(400.0));
        let mut world = b.build().unwrap();
        world.strand_vehicle(stranded, HOME.destination(0.0, 100.0), &[victim]).unwrap();
        let mut h = Harness::new(world);

        let mut m = {
            let mut ctx = h.ctx();
            missions::rescue_salvage(MissionId(4), lead, &[], &[], &mut ctx)
        };
        assert_eq!(m.vehicle(), Some(rescuer));
        assert_eq!(
            m.kind(),
            &MissionKind::RescueSalvage { target: Some(stranded), rescue_crew: true, coupled: false }
        );
        assert_eq!(h.world.vehicle(stranded).unwrap().reserved_by, Some(MissionId(4)));

        let events = h.run(&mut m);
        assert_eq!(m.statuses(), &[MissionStatus::Accomplished]);
        assert!(phases(&events).contains(&MissionPhase::Rendezvous));
        let has = |want: &MissionEventKind| events.iter().any(|e| &e.kind == want);
        assert!(has(&MissionEventKind::Rendezvous { target: stranded }));
        assert!(has(&MissionEventKind::EmergencyBeacon { vehicle: stranded, on: false, reason: None }));
        assert!(has(&MissionEventKind::VehicleSalvaged { vehicle: stranded, settlement: base }));
        assert!(has(&MissionEventKind::PersonRescued { member: victim, settlement: base }));

        assert_eq!(h.world.member(victim).unwrap().situation(), Situation::InSettlement(base));
        let v = h.world.vehicle(stranded).unwrap();
        assert_eq!(v.parked_at, Some(base));
        assert!(!v.beacon_on);
        assert!(v.towed_by.is_none());
        assert!(v.reserved_by.is_none());
        assert!(h.world.vehicle(rescuer).unwrap().towing.is_none());
    }

    #[test]
    fn beacon_search_prefers_living_crew() {
        let mut b = ColonyWorldBuilder::new();
        let base = b.add_settlement("Base", HOME);
        let empty = b.add_vehicle("Empty", base, VehicleSpec::rover());
        let crewed = b.add_vehicle("Crewed", base, VehicleSpec::rover());
        let far = b.add_vehicle("Far", base, VehicleSpec::rover());
        let victim = b.add_person(Person::new("Hedy", base, HOME));
        let mut world = b.build().unwrap();
        world.strand_vehicle(empty, HOME.destination(0.0, 20.0), &[]).unwrap();
        world.strand_vehicle(crewed, HOME.destination(0.0, 80.0), &[victim]).unwrap();
        world.strand_vehicle(far, HOME.destination(0.0, 900.0), &[]).unwrap();

        assert_eq!(missions::find_beacon_vehicle(&world, HOME, 500.0, &[]), Some((crewed, true)));
        assert_eq!(missions::find_beacon_vehicle(&world, HOME, 500.0, &[crewed]), Some((empty, false)));
        assert_eq!(missions::find_beacon_vehicle(&world, HOME, 10.0, &[]), None);
    }
}

// ── Review & termination ──────────────────────────────────────────────────────

#[cfg(test)]
mod termination {
    use super::*;

    #[test]
    fn end_is_idempotent_but_collects_same_tick_reasons() {
        let (world, c) = daylight();
        let mut h = Harness::new(world);
        let mut m = field_study(&mut h, &c);
        m.take_events();
        {
            let mut ctx = h.ctx();
            m.end_mission(MissionStatus::AbortedByOperator, &mut ctx);
            m.end_mission(MissionStatus::AbortedByOperator, &mut ctx);
            m.end_mission(MissionStatus::NotEnoughMembers, &mut ctx);
        }
        h.clock.advance();
        {
            let mut ctx = h.ctx();
            m.end_mission(MissionStatus::MedicalEmergency, &mut ctx);
            assert!(!m.perform_mission(c.lead, &mut ctx));
        }

        assert_eq!(m.statuses(), &[MissionStatus::AbortedByOperator, MissionStatus::NotEnoughMembers]);
        let changes = m
            .take_events()
            .into_iter()
            .filter(|e| matches!(e.kind, MissionEventKind::StatusChanged { .. }))
            .count();
        assert_eq!(changes, 2);
        assert!(h.world.vehicle(c.rover).unwrap().reserved_by.is_none());
        assert!(h.world.member(c.crew).unwrap().mission().is_none());
    }

    #[test]
    fn lone_lead_fails_review() {
        let (world, c) = daylight();
        let mut h = Harness::new(world);
        let mut m = {
            let mut rng = MissionRng::new(7, MissionId(0));
            let mut ctx = h.ctx();
            missions::field_study(MissionId(0), c.lead, &[], &mut ctx, &mut rng)
        };
        h.tick(&mut m);
        assert_eq!(m.statuses(), &[MissionStatus::NotEnoughMembers]);
    }

    #[test]
    fn unknown_lead_is_a_no_show() {
        let (world, _) = daylight();
        let mut h = Harness::new(world);
        let mut ctx = h.ctx();
        let m = Mission::new(MissionId(5), MissionKind::Mining, MemberId(99), &mut ctx);
        assert_eq!(m.statuses(), &[MissionStatus::LeadNoShow]);
        assert!(m.roster().is_empty());
    }

    #[test]
    fn field_study_needs_a_study() {
        let (world, c) = daylight();
        let mut h = Harness::new(world);
        let mut rng = MissionRng::new(7, MissionId(0));
        let mut ctx = h.ctx();
        let m = missions::field_study(MissionId(0), c.crew, &[c.lead], &mut ctx, &mut rng);
        assert_eq!(m.statuses(), &[MissionStatus::NoResearchStudy]);
        assert!(m.vehicle().is_none());
    }

    #[test]
    fn no_vehicle_no_mission() {
        let mut b = ColonyWorldBuilder::new();
        let base = b.add_settlement("Base", HOME);
        let lead = b.add_person(Person::new("Ada", base, HOME));
        let mut h = Harness::new(b.build().unwrap());
        let mut ctx = h.ctx();
        let m = missions::mining(MissionId(0), lead, &[HOME.destination(0.0, 10.0)], &[], &mut ctx);
        assert_eq!(m.statuses(), &[MissionStatus::NoAvailableVehicle]);
    }

    #[test]
    fn mining_site_out_of_reach() {
        let (world, c) = daylight();
        let mut h = Harness::new(world);
        let mut ctx = h.ctx();
        let sites = [HOME.destination(0.0, 1_500.0)];
        let m = missions::mining(MissionId(0), c.lead, &sites, &[c.crew], &mut ctx);
        assert_eq!(m.statuses(), &[MissionStatus::NoMiningSite]);
        assert!(ctx.world.vehicle(c.rover).unwrap().reserved_by.is_none());
    }

    #[test]
    fn tiny_hold_is_not_loadable() {
        let mut b = ColonyWorldBuilder::new();
        let base = b.add_settlement("Base", HOME);
        stock_base(&mut b, base);
        b.add_vehicle("Buggy", base, VehicleSpec { cargo_kg: 10.0, ..VehicleSpec::rover() });
        let lead = b.add_person(Person::new("Ada", base, HOME).with_study(Science::Biology));
        let crew = b.add_person(Person::new("Grace", base, HOME));
        let mut h = Harness::new(b.build().unwrap());
        let mut m = {
            let mut rng = MissionRng::new(1, MissionId(0));
            let mut ctx = h.ctx();
            missions::field_study(MissionId(0), lead, &[crew], &mut ctx, &mut rng)
        };
        h.tick(&mut m);
        assert_eq!(m.statuses(), &[MissionStatus::VehicleNotLoadable]);
    }

    #[test]
    fn empty_stores_cannot_load() {
        let mut b = ColonyWorldBuilder::new();
        let base = b.add_settlement("Base", HOME);
        b.stock(base, Resource::Methane, 1_000.0);
        b.add_vehicle("Rover 1", base, VehicleSpec::rover());
        let lead = b.add_person(Person::new("Ada", base, HOME).with_study(Science::Biology));
        let crew = b.add_person(Person::new("Grace", base, HOME));
        let mut h = Harness::new(b.build().unwrap());
        let mut m = {
            let mut rng = MissionRng::new(1, MissionId(0));
            let mut ctx = h.ctx();
            missions::field_study(MissionId(0), lead, &[crew], &mut ctx, &mut rng)
        };
        let events = h.run(&mut m);
        assert_eq!(m.statuses(), &[MissionStatus::CannotLoadResources]);
        assert_eq!(phases(&events), vec![MissionPhase::Reviewing, MissionPhase::Embarking]);
    }

    #[test]
    fn status_labels_and_categories() {
        assert_eq!(MissionStatus::TargetVehicleNotFound.label(), "target vehicle not found");
        assert_eq!(MissionStatus::NotEnoughResources.to_string(), "not enough resources");
        assert!(MissionStatus::Accomplished.is_success());
        assert!(!MissionStatus::AbortedByOperator.is_success());
        assert_eq!(MissionStatus::LeadNoShow.category().as_str(), "member");
    }
}

// ── Recruitment ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod recruiting {
    use super::*;

    #[test]
    fn best_candidates_fill_the_roster() {
        let mut b = ColonyWorldBuilder::new();
        let base = b.add_settlement("Base", HOME);
        stock_base(&mut b, base);
        b.add_vehicle("Rover 1", base, VehicleSpec::rover());
        let person = |name: &str, exp: f64| {
            Person::new(name, base, HOME).with_experience(MissionType::Exploration, exp)
        };
        let lead = b.add_person(person("Lead", 0.0));
        let veteran = b.add_person(person("Veteran", 5.0));
        let regular = b.add_person(person("Regular", 3.0));
        let novice = b.add_person(person("Novice", 0.0));
        let mut sick = person("Sick", 9.0);
        sick.health = Health::Serious;
        let sick = b.add_person(sick);
        let busy = b.add_person(person("Busy", 9.0));
        let mut world = b.build().unwrap();
        world.set_member_mission(busy, Some(MissionId(9))).unwrap();
        let mut h = Harness::new(world);

        let mut rng = MissionRng::new(3, MissionId(0));
        let mut ctx = h.ctx();
        let candidates = [novice, sick, busy, regular, veteran];
        let m = missions::exploration(MissionId(0), lead, 2, &candidates, &mut ctx, &mut rng);

        assert_eq!(m.capacity(), 4);
        let roster: Vec<MemberId> = m.roster().iter().copied().collect();
        assert_eq!(roster, vec![lead, veteran, regular, novice]);
        assert_eq!(m.mission_qualification(sick, &*ctx.world), 0.0);
        assert_eq!(m.mission_qualification(busy, &*ctx.world), 0.0);
    }

    #[test]
    fn robots_score_below_equally_experienced_people() {
        let mut b = ColonyWorldBuilder::new();
        let base = b.add_settlement("Base", HOME);
        b.add_vehicle("Rover 1", base, VehicleSpec::rover());
        let lead = b.add_person(Person::new("Lead", base, HOME));
        let person = b.add_person(Person::new("Ada", base, HOME).with_experience(MissionType::Mining, 4.0));
        let mut robot = Robot::new("Unit 7", base, HOME);
        robot.experience.insert(MissionType::Mining, 4.0);
        let robot = b.add_robot(robot);
        let mut h = Harness::new(b.build().unwrap());

        let mut ctx = h.ctx();
        let m = Mission::new(MissionId(0), MissionKind::Mining, lead, &mut ctx);
        let p = m.mission_qualification(person, &*ctx.world);
        let r = m.mission_qualification(robot, &*ctx.world);
        assert!(r > 0.0);
        assert!(r < p, "robot {r} vs person {p}");
    }

    #[test]
    fn roster_changes_are_reported() {
        let (world, c) = daylight();
        let mut h = Harness::new(world);
        let mut m = field_study(&mut h, &c);
        m.take_events();
        let mut ctx = h.ctx();
        assert!(m.remove_member(c.crew, &mut ctx));
        assert!(!m.remove_member(c.crew, &mut ctx));
        assert!(m.add_member(c.crew, &mut ctx));
        assert!(!m.add_member(c.crew, &mut ctx));
        let kinds: Vec<MissionEventKind> = m.take_events().into_iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MissionEventKind::RosterChanged { member: c.crew, joined: false },
                MissionEventKind::RosterChanged { member: c.crew, joined: true },
            ]
        );
    }
}

// ── Vehicles ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod vehicles {
    use std::cmp::Ordering;

    use super::*;

    fn vehicle(spec: VehicleSpec) -> Vehicle {
        Vehicle::new("v", SettlementId(0), HOME, &spec)
    }

    #[test]
    fn preference_breaks_ties_between_qualified_vehicles() {
        let hauler = vehicle(VehicleSpec { has_lab: false, ..VehicleSpec::rover() });
        let lab = vehicle(VehicleSpec { cargo_kg: 1_000.0, ..VehicleSpec::rover() });

        let mining = VehicleRequirement::for_kind(&MissionKind::Mining, 2);
        assert_eq!(compare_vehicles(&hauler, &lab, &mining), Ordering::Greater);

        let study = VehicleRequirement::for_kind(&MissionKind::FieldStudy { science: None }, 2);
        assert_eq!(compare_vehicles(&hauler, &lab, &study), Ordering::Less);
    }

    #[test]
    fn drones_only_where_allowed() {
        let rover = vehicle(VehicleSpec::rover());
        let drone = vehicle(VehicleSpec::drone());

        let study = VehicleRequirement::for_kind(&MissionKind::FieldStudy { science: None }, 2);
        assert!(!study.is_met_by(&drone));
        assert_eq!(compare_vehicles(&drone, &rover, &study), Ordering::Less);

        let trade = MissionKind::Trade {
            partner: SettlementId(1),
            plan:    Default::default(),
            traded:  false,
        };
        let req = VehicleRequirement::for_kind(&trade, 1);
        assert!(req.is_met_by(&drone));
        // Both qualify; the bigger hold wins.
        assert_eq!(compare_vehicles(&rover, &drone, &req), Ordering::Greater);
    }

    #[test]
    fn too_few_seats_disqualifies() {
        let rover = vehicle(VehicleSpec { crew_capacity: 2, ..VehicleSpec::rover() });
        let req = VehicleRequirement::for_kind(&MissionKind::Mining, 3);
        assert!(!req.is_met_by(&rover));
    }

    #[test]
    fn best_vehicle_skips_reserved() {
        let mut b = ColonyWorldBuilder::new();
        let base = b.add_settlement("Base", HOME);
        let first = b.add_vehicle("Rover 1", base, VehicleSpec::rover());
        let second = b.add_vehicle("Rover 2", base, VehicleSpec::rover());
        let mut world = b.build().unwrap();
        let req = VehicleRequirement::for_kind(&MissionKind::Mining, 2);

        assert_eq!(best_vehicle(&world, base, &req), Some(first));
        world.vehicle_mut(first).unwrap().reserved_by = Some(MissionId(0));
        assert_eq!(best_vehicle(&world, base, &req), Some(second));
        world.vehicle_mut(second).unwrap().beacon_on = true;
        assert_eq!(best_vehicle(&world, base, &req), None);
    }
}

// ── Provisioning ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod provisioning {
    use super::*;
    use cm_core::resource::{merge, total_mass};

    fn profile(crew: usize) -> TripProfile {
        TripProfile { crew, speed_kph: 30.0, fuel_economy: 4.0, eva: true }
    }

    #[test]
    fn margins_and_distance_only_grow_the_estimate() {
        let cfg = MissionConfig::default();
        for crew in 1..=4 {
            let p = profile(crew);
            let base = resources_needed_for_trip(&cfg, &p, 200.0, 500.0, false);
            let safe = resources_needed_for_trip(&cfg, &p, 200.0, 500.0, true);
            let longer = resources_needed_for_trip(&cfg, &p, 400.0, 500.0, false);
            for (r, amount) in &base {
                assert!(safe[r] >= *amount, "{r}: margin shrank {amount} to {}", safe[r]);
                assert!(longer[r] >= *amount, "{r}: distance shrank {amount} to {}", longer[r]);
            }
        }
    }

    #[test]
    fn life_support_scales_with_crew_and_time() {
        let cfg = MissionConfig::default();
        let one = resources_needed_for_trip(&cfg, &profile(1), 0.0, 1_000.0, false);
        let two = resources_needed_for_trip(&cfg, &profile(2), 0.0, 1_000.0, false);
        let expected = cfg.oxygen_per_sol * cfg.oxygen_margin;
        assert!((one[&Resource::Oxygen] - expected).abs() < 1e-9);
        assert!((two[&Resource::Oxygen] - 2.0 * expected).abs() < 1e-9);
    }

    #[test]
    fn eva_suits_include_spares() {
        let cfg = MissionConfig::default();
        let need = resources_needed_for_trip(&cfg, &profile(4), 100.0, 0.0, false);
        assert_eq!(need[&Resource::EvaSuit], 5.0);
        let need = resources_needed_for_trip(&cfg, &TripProfile { eva: false, ..profile(4) }, 100.0, 0.0, false);
        assert!(!need.contains_key(&Resource::EvaSuit));
    }

    #[test]
    fn drones_carry_no_life_support() {
        let cfg = MissionConfig::default();
        let p = TripProfile { crew: 0, speed_kph: 60.0, fuel_economy: 10.0, eva: false };
        let need = resources_needed_for_trip(&cfg, &p, 300.0, 0.0, true);
        assert!(Resource::LIFE_SUPPORT.iter().all(|r| !need.contains_key(r)));
        assert!((need[&Resource::Methane] - 300.0 / 10.0 * cfg.fuel_range_error_margin).abs() < 1e-9);
        assert_eq!(need[&Resource::SparePart], 1.0);
    }

    #[test]
    fn planned_exploration_always_fits_the_rover() {
        for sites in 1..=4 {
            for extra in 0..=3 {
                let mut b = ColonyWorldBuilder::new();
                let base = b.add_settlement("Base", HOME);
                b.add_vehicle("Rover 1", base, VehicleSpec::rover());
                let lead = b.add_person(Person::new("Lead", base, HOME));
                let crew: Vec<MemberId> = (0..extra)
                    .map(|i| b.add_person(Person::new(format!("Crew {i}"), base, HOME)))
                    .collect();
                let mut h = Harness::new(b.build().unwrap());

                let mut rng = MissionRng::new(sites as u64 * 10 + extra as u64, MissionId(0));
                let mut ctx = h.ctx();
                let m = missions::exploration(MissionId(0), lead, sites, &crew, &mut ctx, &mut rng);
                assert_eq!(m.roster().len(), extra + 1);
                assert_eq!(m.route().len(), sites + 2);
                assert!(
                    m.is_vehicle_loadable(&ctx).unwrap(),
                    "{sites} sites, crew {} not loadable",
                    extra + 1
                );
                assert_load_fits(&m, &ctx);
            }
        }
    }

    #[test]
    fn optional_loads_fit_alongside_trip_supplies() {
        // Trade: the sell load rides along.
        let mut b = ColonyWorldBuilder::new();
        let base = b.add_settlement("Base", HOME);
        let market = b.add_settlement("Market", HOME.destination(FRAC_PI_2, 100.0));
        b.stock(base, Resource::Water, 1_000.0)
            .stock(base, Resource::Methane, 500.0)
            .stock(base, Resource::SparePart, 10.0)
            .stock(market, Resource::Minerals, 200.0);
        b.add_vehicle("Hopper", base, VehicleSpec::drone());
        let lead = b.add_person(Person::new("Ada", base, HOME));
        let mut h = Harness::new(b.build().unwrap());
        let mut ctx = h.ctx();
        let m = missions::trade(MissionId(2), lead, &missions::SurplusValuer, &[], &mut ctx);
        assert!(!m.is_done());
        assert!(!m.optional_resources(&ctx).unwrap().is_empty());
        assert!(m.is_vehicle_loadable(&ctx).unwrap());
        assert_load_fits(&m, &ctx);

        // Rescue: supplies for the stranded crew ride along.
        let mut b = ColonyWorldBuilder::new();
        let base = b.add_settlement("Base", HOME);
        stock_base(&mut b, base);
        b.add_vehicle("Rover 1", base, VehicleSpec::rover());
        let stranded = b.add_vehicle("Spirit", base, VehicleSpec::rover());
        let lead = b.add_person(Person::new("Ada", base, HOME));
        let victims: Vec<MemberId> = (0..3)
            .map(|i| b.add_person(Person::new(format!("Victim {i}"), base, HOME)))
            .collect();
        let mut world = b.build().unwrap();
        world.strand_vehicle(stranded, HOME.destination(0.0, 150.0), &victims).unwrap();
        let mut h = Harness::new(world);
        let mut ctx = h.ctx();
        let m = missions::rescue_salvage(MissionId(4), lead, &[], &[], &mut ctx);
        assert!(!m.is_done());
        let supply = m.optional_resources(&ctx).unwrap();
        assert!(supply.contains_key(&Resource::Oxygen));
        assert!(m.is_vehicle_loadable(&ctx).unwrap());
        assert_load_fits(&m, &ctx);
    }

    /// The full load behind a "loadable" verdict fits the vehicle entry by
    /// entry and in total mass.
    fn assert_load_fits(m: &Mission, ctx: &MissionContext<'_>) {
        let mut load = m.resources_needed_for_remaining_mission(ctx, true).unwrap();
        merge(&mut load, &m.optional_resources(ctx).unwrap());
        let inventory = &ctx.world.vehicle(m.vehicle().unwrap()).unwrap().inventory;
        for (r, amount) in &load {
            let capacity = inventory.capacity(*r);
            assert!(capacity + 1e-9 >= *amount, "{r}: {amount} over capacity {capacity}");
        }
        let mass = total_mass(&load);
        assert!(mass <= inventory.general_capacity_kg + 1e-9, "{mass} kg over {}", inventory.general_capacity_kg);
    }
}

// ── EVA ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod eva {
    use super::*;

    #[test]
    fn darkness_ends_eva_at_once() {
        let (world, c) = colony(SolarModel::constant(0.0), HOME);
        let mut h = Harness::new(world);
        let mut m = field_study(&mut h, &c);
        let events = h.run(&mut m);

        let entered = phase_tick(&events, MissionPhase::ResearchSite).unwrap();
        assert_eq!(eva_end_tick(&m), Some(entered));
        assert_eq!(m.statuses(), &[MissionStatus::Accomplished]);
    }

    #[test]
    fn polar_night_does_not_stop_eva() {
        let solar = SolarModel { fixed_irradiance: Some(0.0), polar_night: true, ..SolarModel::default() };
        let (world, c) = colony(solar, Coordinates::new(85.0, 0.0));
        let mut h = Harness::new(world);
        let mut m = field_study(&mut h, &c);
        let events = h.run(&mut m);

        let entered = phase_tick(&events, MissionPhase::ResearchSite).unwrap();
        let ended = eva_end_tick(&m).unwrap();
        assert!(ended > entered);
        assert_eq!(m.statuses(), &[MissionStatus::Accomplished]);
    }

    #[test]
    fn members_work_outside_during_the_phase() {
        let (world, c) = daylight();
        let mut h = Harness::new(world);
        let mut m = field_study(&mut h, &c);
        let mut seen_outside = false;
        for _ in 0..MAX_TICKS {
            if m.is_done() {
                break;
            }
            h.tick(&mut m);
            seen_outside |= [c.lead, c.crew]
                .iter()
                .any(|&id| h.world.member(id).unwrap().situation() == Situation::Outside(c.rover));
        }
        assert!(seen_outside);
        assert_eq!(m.statuses(), &[MissionStatus::Accomplished]);
    }
}

// ── Trade ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod trade {
    use super::*;
    use crate::missions::SurplusValuer;

    #[test]
    fn drone_trade_run_exchanges_goods() {
        let mut b = ColonyWorldBuilder::new();
        let base = b.add_settlement("Base", HOME);
        let market = b.add_settlement("Market", HOME.destination(FRAC_PI_2, 100.0));
        b.stock(base, Resource::Water, 1_000.0)
            .stock(base, Resource::Methane, 500.0)
            .stock(base, Resource::SparePart, 10.0)
            .stock(market, Resource::Minerals, 200.0);
        let drone = b.add_vehicle("Hopper", base, VehicleSpec::drone());
        let lead = b.add_person(Person::new("Ada", base, HOME));
        let mut h = Harness::new(b.build().unwrap());

        let mut m = {
            let mut ctx = h.ctx();
            missions::trade(MissionId(2), lead, &SurplusValuer, &[], &mut ctx)
        };
        assert_eq!(m.vehicle(), Some(drone));
        let MissionKind::Trade { partner, plan, .. } = m.kind().clone() else { panic!("not a trade") };
        assert_eq!(partner, market);
        assert!((plan.sell[&Resource::Water] - 240.0).abs() < 1e-9);
        assert!((plan.buy[&Resource::Minerals] - 100.0).abs() < 1e-9);

        let events = h.run(&mut m);
        assert_eq!(m.statuses(), &[MissionStatus::Accomplished]);
        assert_eq!(
            phases(&events),
            vec![
                MissionPhase::Reviewing,
                MissionPhase::Embarking,
                MissionPhase::Travelling,
                MissionPhase::TradeNegotiation,
                MissionPhase::Travelling,
                MissionPhase::Disembarking,
            ]
        );
        let stored = |s: SettlementId, r: Resource| h.world.settlement(s).unwrap().inventory.stored(r);
        assert!((stored(market, Resource::Water) - 240.0).abs() < 1e-6);
        assert!((stored(base, Resource::Minerals) - 100.0).abs() < 1e-6);
        assert_eq!(h.world.member(lead).unwrap().situation(), Situation::InSettlement(base));
    }

    #[test]
    fn balanced_stocks_leave_no_partner() {
        let mut b = ColonyWorldBuilder::new();
        let base = b.add_settlement("Base", HOME);
        b.add_settlement("Twin", HOME.destination(0.0, 50.0));
        b.add_vehicle("Hopper", base, VehicleSpec::drone());
        let lead = b.add_person(Person::new("Ada", base, HOME));
        let mut h = Harness::new(b.build().unwrap());
        let mut ctx = h.ctx();
        let m = missions::trade(MissionId(2), lead, &SurplusValuer, &[], &mut ctx);
        assert_eq!(m.statuses(), &[MissionStatus::NoTradingPartner]);
    }
}

// ── Emergency supply ──────────────────────────────────────────────────────────

#[cfg(test)]
mod supply {
    use super::*;

    const OUTPOST_KM: f64 = 120.0;

    /// A stocked base and an empty outpost with one settler.
    fn outpost_in_need() -> (ColonyWorld, SettlementId, SettlementId, MemberId) {
        let mut b = ColonyWorldBuilder::new();
        let base = b.add_settlement("Base", HOME);
        stock_base(&mut b, base);
        let at = HOME.destination(FRAC_PI_2, OUTPOST_KM);
        let outpost = b.add_settlement("Outpost", at);
        b.add_vehicle("Rover 1", base, VehicleSpec::rover());
        let lead = b.add_person(Person::new("Ada", base, HOME));
        b.add_person(Person::new("Hedy", outpost, at));
        b.solar(SolarModel::constant(400.0));
        (b.build().unwrap(), base, outpost, lead)
    }

    #[test]
    fn needs_cover_the_horizon_for_people_inside() {
        let (world, base, outpost, _) = outpost_in_need();
        let config = MissionConfig::default();
        let needs = missions::emergency_needs(&world, &config, outpost);
        assert!((needs[&Resource::Oxygen] - config.oxygen_per_sol * 28.0).abs() < 1e-9);
        assert!((needs[&Resource::Water] - config.water_per_sol * 28.0).abs() < 1e-9);
        // No vehicles there to fuel.
        assert!(!needs.contains_key(&Resource::Methane));
        assert!(missions::emergency_needs(&world, &config, base).is_empty());
    }

    #[test]
    fn supply_run_stocks_the_outpost() {
        let (world, base, outpost, lead) = outpost_in_need();
        let mut h = Harness::new(world);
        let mut m = {
            let mut ctx = h.ctx();
            missions::emergency_supply(MissionId(6), lead, &[], &mut ctx)
        };
        assert!(!m.is_done(), "{:?}", m.statuses());
        let MissionKind::EmergencySupply { destination, supplies, .. } = m.kind().clone() else {
            panic!("not a supply run")
        };
        assert_eq!(destination, outpost);
        assert!(supplies[&Resource::Oxygen] > 0.0);
        assert_eq!(m.route().len(), 3);
        assert!(m.route().points()[1].settlement().is_none());

        let events = h.run(&mut m);
        assert_eq!(m.statuses(), &[MissionStatus::Accomplished]);
        assert_eq!(
            phases(&events),
            vec![
                MissionPhase::Reviewing,
                MissionPhase::Embarking,
                MissionPhase::Travelling,
                MissionPhase::SupplyDelivery,
                MissionPhase::Travelling,
                MissionPhase::Disembarking,
            ]
        );
        let stored = |r: Resource| h.world.settlement(outpost).unwrap().inventory.stored(r);
        for (r, amount) in &supplies {
            assert!((stored(*r) - amount).abs() < 1e-6, "{r}: {} of {amount}", stored(*r));
        }
        assert!(events.iter().any(|e| matches!(
            e.kind,
            MissionEventKind::SuppliesDelivered { settlement, mass_kg } if settlement == outpost && mass_kg > 0.0
        )));
        assert_eq!(h.world.member(lead).unwrap().situation(), Situation::InSettlement(base));
    }

    #[test]
    fn well_stocked_neighbours_need_nothing() {
        let (mut world, _, outpost, lead) = outpost_in_need();
        for r in Resource::LIFE_SUPPORT {
            world.settlement_mut(outpost).unwrap().inventory.store(r, 1_000.0).unwrap();
        }
        let mut h = Harness::new(world);
        let mut ctx = h.ctx();
        let m = missions::emergency_supply(MissionId(6), lead, &[], &mut ctx);
        assert_eq!(m.statuses(), &[MissionStatus::NoSettlementInNeed]);
        let rover = m.vehicle().unwrap();
        assert!(ctx.world.vehicle(rover).unwrap().reserved_by.is_none());
    }
}

// ── Phase tables ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod phase_tables {
    use super::*;

    #[test]
    fn every_kind_shares_the_vehicle_skeleton() {
        for kind in MissionType::ALL {
            let table = PhaseTable::for_type(kind);
            for phase in [
                MissionPhase::Reviewing,
                MissionPhase::Embarking,
                MissionPhase::Travelling,
                MissionPhase::Disembarking,
            ] {
                assert!(table.contains(phase), "{kind} lacks {phase}");
            }
        }
        assert_eq!(PhaseTable::for_type(MissionType::TravelToSettlement).phases().count(), 4);
        assert!(PhaseTable::for_type(MissionType::Mining).contains(MissionPhase::MiningSite));
        assert!(!PhaseTable::for_type(MissionType::Mining).contains(MissionPhase::ResearchSite));
    }

    #[test]
    fn descriptions_fill_their_template() {
        assert_eq!(MissionPhase::Travelling.describe("Base"), "Driving to Base");
        assert_eq!(MissionPhase::Rendezvous.describe("Spirit"), "Meeting Spirit");
    }
}

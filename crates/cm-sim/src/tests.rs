//! Driver tests for cm-sim.

use cm_core::{
    Coordinates, MemberId, MissionConfig, MissionId, Resource, Science, SettlementId, SimConfig,
    Tick, VehicleId,
};
use cm_mission::{missions, Mission, MissionEvent, MissionEventKind, MissionStatus, Routable};
use cm_world::{
    ColonyWorld, ColonyWorldBuilder, Health, Holder, Person, Situation, SolarModel, VehicleSpec,
    World,
};

use crate::{MissionSim, NoopObserver, SimBuilder, SimError, SimObserver};

// ── Helpers ───────────────────────────────────────────────────────────────────

const HOME: Coordinates = Coordinates { lat: 0.0, lon: 0.0 };
const OUTPOST: Coordinates = Coordinates { lat: 0.0, lon: 10.0 };
const MAX_TICKS: u64 = 2_000;

fn test_config(total_ticks: u64) -> SimConfig {
    SimConfig {
        millisols_per_tick:    10.0,
        total_ticks,
        seed:                  42,
        output_interval_ticks: 5,
    }
}

#[derive(Copy, Clone)]
struct Colony {
    base:    SettlementId,
    outpost: SettlementId,
    rover:   VehicleId,
    spare:   VehicleId,
    lead:    MemberId,
    crew:    MemberId,
    second:  MemberId,
    third:   MemberId,
}

/// Two settlements; the base has three rovers and four people.
fn colony() -> (ColonyWorld, Colony) {
    let mut b = ColonyWorldBuilder::new();
    let base = b.add_settlement("Base", HOME);
    let outpost = b.add_settlement("Outpost", OUTPOST);
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
    let rover = b.add_vehicle("Rover 1", base, VehicleSpec::rover());
    b.add_vehicle("Rover 2", base, VehicleSpec::rover());
    let spare = b.add_vehicle("Rover 3", base, VehicleSpec::rover());
    let lead = b.add_person(Person::new("Ada", base, HOME).with_study(Science::Areology));
    let crew = b.add_person(Person::new("Grace", base, HOME));
    let second = b.add_person(Person::new("Katherine", base, HOME).with_study(Science::Biology));
    let third = b.add_person(Person::new("Mae", base, HOME));
    b.solar(SolarModel::constant(400.0));
    (b.build().unwrap(), Colony { base, outpost, rover, spare, lead, crew, second, third })
}

fn sim(total_ticks: u64) -> (MissionSim<ColonyWorld>, Colony) {
    let (world, c) = colony();
    (SimBuilder::new(test_config(total_ticks), world).build().unwrap(), c)
}

fn propose_study(sim: &mut MissionSim<ColonyWorld>, lead: MemberId, crew: MemberId) -> MissionId {
    sim.propose(|id, ctx, rng| missions::field_study(id, lead, &[crew], ctx, rng)).unwrap()
}

/// Records everything the driver reports.
#[derive(Default)]
struct Recorder {
    tick_starts: Vec<Tick>,
    events:      Vec<MissionEvent>,
    endings:     Vec<(MissionId, Vec<MissionStatus>)>,
    snapshots:   Vec<(Tick, usize)>,
    sim_end:     Option<Tick>,
}

impl SimObserver for Recorder {
    fn on_tick_start(&mut self, tick: Tick) {
        self.tick_starts.push(tick);
    }

    fn on_mission_event(&mut self, event: &MissionEvent) {
        self.events.push(event.clone());
    }

    fn on_mission_end(&mut self, mission: &Mission) {
        self.endings.push((mission.id(), mission.statuses().to_vec()));
    }

    fn on_snapshot(&mut self, tick: Tick, active: &[Mission]) {
        self.snapshots.push((tick, active.len()));
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.sim_end = Some(final_tick);
    }
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_with_defaults() {
        let (sim, _) = sim(10);
        assert!(sim.is_idle());
        assert_eq!(sim.clock.current_tick, Tick::ZERO);
        assert_eq!(sim.clock.millisols_per_tick, 10.0);
    }

    #[test]
    fn non_positive_tick_length_errors() {
        let (world, _) = colony();
        let config = SimConfig { millisols_per_tick: 0.0, ..test_config(10) };
        let result = SimBuilder::new(config, world).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn invalid_mission_config_errors() {
        let (world, _) = colony();
        let bad = MissionConfig { oxygen_margin: 0.5, ..MissionConfig::default() };
        let result = SimBuilder::new(test_config(10), world).mission_config(bad).build();
        assert!(matches!(result, Err(SimError::Core(_))));
    }
}

// ── Proposals ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod propose_tests {
    use super::*;

    #[test]
    fn ids_follow_proposal_order() {
        let (mut sim, c) = sim(10);
        let a = propose_study(&mut sim, c.lead, c.crew);
        let b = propose_study(&mut sim, c.second, c.third);
        assert_eq!((a, b), (MissionId(0), MissionId(1)));
        assert_eq!(sim.active.len(), 2);
        assert_ne!(sim.mission(a).unwrap().vehicle(), sim.mission(b).unwrap().vehicle());
    }

    #[test]
    fn mismatched_id_is_rejected() {
        let (mut sim, c) = sim(10);
        let result = sim.propose(|_, ctx, _| {
            missions::travel_to_settlement(MissionId(99), c.lead, None, &[], ctx)
        });
        assert!(matches!(
            result,
            Err(SimError::MissionIdMismatch { expected: MissionId(0), got: MissionId(99) })
        ));
        assert!(sim.is_idle());
    }

    #[test]
    fn failed_construction_still_reports() {
        let (mut sim, c) = sim(10);
        // Grace has no research study.
        let id = propose_study(&mut sim, c.crew, c.lead);
        let mut rec = Recorder::default();
        sim.run_ticks(1, &mut rec).unwrap();

        assert!(sim.is_idle());
        assert_eq!(rec.endings, vec![(id, vec![MissionStatus::NoResearchStudy])]);
        assert!(rec.events.iter().any(|e| {
            e.kind == MissionEventKind::StatusChanged { status: MissionStatus::NoResearchStudy }
        }));
    }
}

// ── Running ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;

    #[test]
    fn noop_runs_to_end_tick() {
        let (mut sim, _) = sim(25);
        sim.run(&mut NoopObserver).unwrap();
        assert_eq!(sim.clock.current_tick, Tick(25));
    }

    #[test]
    fn observer_hooks_fire() {
        let (mut sim, _) = sim(12);
        let mut rec = Recorder::default();
        sim.run(&mut rec).unwrap();
        assert_eq!(rec.tick_starts.len(), 12);
        assert_eq!(rec.snapshots, vec![(Tick(0), 0), (Tick(5), 0), (Tick(10), 0)]);
        assert_eq!(rec.sim_end, Some(Tick(12)));
    }

    #[test]
    fn field_study_completes_and_retires() {
        let (mut sim, c) = sim(MAX_TICKS);
        let id = propose_study(&mut sim, c.lead, c.crew);
        let mut rec = Recorder::default();
        let ran = sim.run_until_idle(MAX_TICKS, &mut rec).unwrap();

        assert!(ran < MAX_TICKS);
        assert_eq!(rec.endings, vec![(id, vec![MissionStatus::Accomplished])]);
        assert_eq!(sim.finished.len(), 1);
        assert_eq!(sim.mission(id).unwrap().statuses(), &[MissionStatus::Accomplished]);
        assert!(rec.events.windows(2).all(|w| w[0].tick <= w[1].tick));
        assert!(rec.events.iter().all(|e| e.mission == id));

        let rover = sim.world.vehicle(c.rover).unwrap();
        assert_eq!(rover.parked_at, Some(c.base));
        assert!(sim.world.member(c.lead).unwrap().mission().is_none());
    }

    #[test]
    fn concurrent_missions_use_separate_rovers() {
        let (mut sim, c) = sim(MAX_TICKS);
        let a = propose_study(&mut sim, c.lead, c.crew);
        let b = propose_study(&mut sim, c.second, c.third);
        sim.run_until_idle(MAX_TICKS, &mut NoopObserver).unwrap();

        for id in [a, b] {
            assert_eq!(sim.mission(id).unwrap().statuses(), &[MissionStatus::Accomplished]);
        }
    }

    #[test]
    fn same_seed_same_history() {
        let run = || {
            let (mut sim, c) = sim(MAX_TICKS);
            propose_study(&mut sim, c.lead, c.crew);
            propose_study(&mut sim, c.second, c.third);
            let mut rec = Recorder::default();
            sim.run_until_idle(MAX_TICKS, &mut rec).unwrap();
            rec.events
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn relocation_reaches_the_outpost() {
        let (mut sim, c) = sim(MAX_TICKS);
        let id = sim
            .propose(|id, ctx, _| missions::travel_to_settlement(id, c.lead, Some(c.outpost), &[], ctx))
            .unwrap();
        sim.run_until_idle(MAX_TICKS, &mut NoopObserver).unwrap();

        assert_eq!(sim.mission(id).unwrap().statuses(), &[MissionStatus::Accomplished]);
        assert_eq!(sim.world.member(c.lead).unwrap().home(), c.outpost);
    }
}

// ── Operator control ──────────────────────────────────────────────────────────

#[cfg(test)]
mod control_tests {
    use super::*;

    #[test]
    fn abort_before_departure_ends_at_once() {
        let (mut sim, c) = sim(MAX_TICKS);
        let id = propose_study(&mut sim, c.lead, c.crew);
        sim.run_ticks(1, &mut NoopObserver).unwrap();
        sim.abort(id).unwrap();

        assert_eq!(sim.mission(id).unwrap().statuses(), &[MissionStatus::AbortedByOperator]);
        let rover = sim.world.vehicle(c.rover).unwrap();
        assert_eq!(rover.parked_at, Some(c.base));
        assert!(rover.reserved_by.is_none());
        assert!(rover.inventory.stored_mass() < 1e-9);
        for member in [c.lead, c.crew] {
            let m = sim.world.member(member).unwrap();
            assert_eq!(m.situation(), Situation::InSettlement(c.base));
            assert!(m.mission().is_none());
        }
        let oxygen = sim.world.inventory(Holder::Settlement(c.base)).unwrap().stored(Resource::Oxygen);
        assert!((oxygen - 500.0).abs() < 0.5, "base oxygen {oxygen}");

        sim.run_ticks(1, &mut NoopObserver).unwrap();
        assert!(sim.is_idle());
    }

    #[test]
    fn abort_in_the_field_brings_crew_home_first() {
        let (mut sim, c) = sim(MAX_TICKS);
        let id = propose_study(&mut sim, c.lead, c.crew);
        let mut rec = Recorder::default();
        for _ in 0..MAX_TICKS {
            let out = sim.world.vehicle(c.rover).unwrap().location.distance_km(HOME);
            if out > 20.0 {
                break;
            }
            sim.run_ticks(1, &mut rec).unwrap();
        }
        assert!(sim.world.vehicle(c.rover).unwrap().location.distance_km(HOME) > 20.0);

        sim.abort(id).unwrap();
        let mission = sim.mission(id).unwrap();
        assert!(!mission.is_done());
        assert_eq!(mission.abort_reason(), Some(MissionStatus::AbortedByOperator));
        assert!(mission.route().is_rerouted());

        sim.run_until_idle(MAX_TICKS, &mut rec).unwrap();
        assert_eq!(rec.endings, vec![(id, vec![MissionStatus::AbortedByOperator])]);
        assert!(rec.events.iter().any(|e| matches!(
            e.kind,
            MissionEventKind::EmergencyDestination { reason: MissionStatus::AbortedByOperator, .. }
        )));

        let rover = sim.world.vehicle(c.rover).unwrap();
        assert_eq!(rover.parked_at, Some(c.base));
        assert!(!rover.beacon_on);
        assert!(rover.reserved_by.is_none());
        for member in [c.lead, c.crew] {
            let m = sim.world.member(member).unwrap();
            assert_eq!(m.situation(), Situation::InSettlement(c.base));
            assert!(m.mission().is_none());
        }
        assert_eq!(sim.world.member(c.lead).unwrap().home(), c.base);

        let again = propose_study(&mut sim, c.lead, c.crew);
        let mission = sim.mission(again).unwrap();
        assert!(!mission.is_done());
        assert_eq!(mission.roster().len(), 2);
    }

    #[test]
    fn abort_unknown_mission_errors() {
        let (mut sim, _) = sim(10);
        assert!(matches!(sim.abort(MissionId(3)), Err(SimError::UnknownMission(MissionId(3)))));
    }

    #[test]
    fn dead_roster_ends_mission() {
        let (mut sim, c) = sim(MAX_TICKS);
        let id = propose_study(&mut sim, c.lead, c.crew);
        sim.run_ticks(3, &mut NoopObserver).unwrap();
        for member in [c.lead, c.crew] {
            sim.world.member_mut(member).unwrap().set_health(Health::Dead);
        }
        sim.run_ticks(1, &mut NoopObserver).unwrap();

        assert!(sim.is_idle());
        assert_eq!(sim.mission(id).unwrap().statuses(), &[MissionStatus::NotEnoughMembers]);
        let rover = sim.world.vehicle(c.rover).unwrap();
        assert!(rover.parked_at.is_none());
        assert!(rover.beacon_on);
        assert!(rover.reserved_by.is_none());
    }

    #[test]
    fn rescue_targets_feed_exclusions() {
        let (mut sim, c) = sim(MAX_TICKS);
        let stranded = Coordinates { lat: 1.0, lon: 0.0 };
        let lost = c.spare;
        sim.world.strand_vehicle(lost, stranded, &[c.third]).unwrap();

        let first = sim
            .propose(|id, ctx, _| missions::rescue_salvage(id, c.lead, &[c.crew], &[], ctx))
            .unwrap();
        assert_eq!(sim.rescue_targets(), vec![lost]);

        let excluded = sim.rescue_targets();
        let second = sim
            .propose(|id, ctx, _| missions::rescue_salvage(id, c.second, &[], &excluded, ctx))
            .unwrap();
        assert!(!sim.mission(first).unwrap().is_done());
        assert_eq!(sim.mission(second).unwrap().statuses(), &[MissionStatus::TargetVehicleNotFound]);
    }
}

//! `ColonyWorld`: in-memory world state plus the task scheduler.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over settlement `[lat, lon]` points answers
//! nearest-settlement queries.  Planar lat/lon distance only ranks
//! candidates; the closest few are re-ranked by great-circle distance so
//! high-latitude queries stay correct.
//!
//! # Task execution
//!
//! [`TaskScheduler::advance`] walks members in ascending `MemberId` order
//! and plays out each member's task for one tick, then charges life support
//! to the vehicle of every person aboard or working next to one.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use tracing::{debug, warn};

use cm_core::time::MILLISOLS_PER_HOUR;
use cm_core::{Coordinates, MemberId, MissionConfig, Resource, SettlementId, Tick, VehicleId};

use crate::{
    FieldWork, MissionMember, Settlement, Situation, Task, TaskScheduler, Vehicle,
    VehicleKind, World, WorldError, WorldResult,
};

/// Members within this distance of a vehicle may board it (km).
const BOARDING_DISTANCE_KM: f64 = 0.5;

/// Great-circle re-ranking pool for nearest-settlement queries.
const NEAREST_CANDIDATES: usize = 4;

/// Collection rates while working outside (kg per millisol).
const ROCK_SAMPLES_PER_MILLISOL: f64 = 0.02;
const MINERALS_PER_MILLISOL:     f64 = 0.1;

// ── R-tree settlement entry ───────────────────────────────────────────────────

#[derive(Clone)]
struct SettlementEntry {
    point: [f64; 2], // [lat, lon]
    id:    SettlementId,
}

impl RTreeObject for SettlementEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for SettlementEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── SolarModel ────────────────────────────────────────────────────────────────

/// Surface irradiance model.
#[derive(Clone, Debug, PartialEq)]
pub struct SolarModel {
    /// Noon irradiance at the equator (W/m²).
    pub peak_irradiance: f64,
    /// Overrides the diurnal cycle with a constant value.
    pub fixed_irradiance: Option<f64>,
    /// Polar regions are in permanent night this season.
    pub polar_night: bool,
}

impl Default for SolarModel {
    fn default() -> Self {
        Self { peak_irradiance: 590.0, fixed_irradiance: None, polar_night: false }
    }
}

impl SolarModel {
    /// Constant irradiance everywhere.
    pub fn constant(irradiance: f64) -> Self {
        Self { fixed_irradiance: Some(irradiance), ..Self::default() }
    }

    pub fn irradiance(&self, at: Coordinates, elapsed_millisols: f64) -> f64 {
        if let Some(fixed) = self.fixed_irradiance {
            return fixed;
        }
        let local_time = (elapsed_millisols / 1_000.0 + at.lon / 360.0).rem_euclid(1.0);
        let hour_angle = std::f64::consts::TAU * (local_time - 0.5);
        (self.peak_irradiance * at.lat.to_radians().cos() * hour_angle.cos()).max(0.0)
    }
}

// ── ColonyWorld ───────────────────────────────────────────────────────────────

/// All people, robots, vehicles, and settlements of one run.
///
/// Construct with [`ColonyWorldBuilder`][crate::ColonyWorldBuilder].  IDs
/// are dense indices into the storage `Vec`s.
pub struct ColonyWorld {
    pub(crate) members:     Vec<Box<dyn MissionMember>>,
    pub vehicles:           Vec<Vehicle>,
    pub settlements:        Vec<Settlement>,
    pub solar:              SolarModel,
    pub(crate) index:       RTree<SettlementEntry>,
    elapsed_millisols:      f64,
}

impl ColonyWorld {
    pub(crate) fn from_parts(
        members:     Vec<Box<dyn MissionMember>>,
        vehicles:    Vec<Vehicle>,
        settlements: Vec<Settlement>,
        solar:       SolarModel,
    ) -> Self {
        let entries = settlements
            .iter()
            .map(|s| SettlementEntry { point: [s.location.lat, s.location.lon], id: s.id })
            .collect();
        Self {
            members,
            vehicles,
            settlements,
            solar,
            index: RTree::bulk_load(entries),
            elapsed_millisols: 0.0,
        }
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Iterator over all members, ascending.
    pub fn members(&self) -> impl Iterator<Item = &dyn MissionMember> + '_ {
        self.members.iter().map(|m| m.as_ref())
    }

    /// Take a parked vehicle out to `at` with `crew` aboard and its
    /// distress beacon on, as after a breakdown in the field.
    pub fn strand_vehicle(&mut self, vehicle: VehicleId, at: Coordinates, crew: &[MemberId]) -> WorldResult<()> {
        if let Some(home) = self.vehicle(vehicle).and_then(|v| v.parked_at) {
            self.retrieve_vehicle(vehicle, home)?;
        }
        let v = self.vehicles.get_mut(vehicle.index()).ok_or(WorldError::VehicleNotFound(vehicle))?;
        v.location = at;
        v.beacon_on = true;
        for &member in crew {
            let m = self
                .members
                .get_mut(member.index())
                .ok_or(WorldError::MemberNotFound(member))?;
            m.relocate(Situation::InVehicle(vehicle), at);
            v.crew.insert(member);
        }
        warn!(%vehicle, %at, crew = crew.len(), "vehicle stranded, beacon on");
        Ok(())
    }

    // ── Task execution ────────────────────────────────────────────────────

    fn run_task(&mut self, i: usize, task: Task, millisols: f64) {
        let member = &mut self.members[i];
        let id = member.id();
        let vehicle_id = task.vehicle();
        let Some(vehicle) = self.vehicles.get_mut(vehicle_id.index()) else {
            member.clear_task();
            return;
        };

        match task {
            Task::BoardVehicle { vehicle: v_id } => {
                let near = member.location().distance_km(vehicle.location) <= BOARDING_DISTANCE_KM;
                if near && vehicle.kind == VehicleKind::Rover && vehicle.crew.len() < vehicle.crew_capacity {
                    vehicle.crew.insert(id);
                    member.relocate(Situation::InVehicle(v_id), vehicle.location);
                }
                member.clear_task();
            }

            Task::ExitToSettlement { vehicle: _, settlement } => {
                let Some(s) = self.settlements.get(settlement.index()) else {
                    member.clear_task();
                    return;
                };
                if vehicle.location.distance_km(s.location) <= BOARDING_DISTANCE_KM {
                    vehicle.crew.remove(&id);
                    member.relocate(Situation::InSettlement(settlement), s.location);
                }
                member.clear_task();
            }

            Task::Drive { vehicle: v_id, destination } => {
                if vehicle.is_parked() {
                    return;
                }
                let aboard = member.situation() == Situation::InVehicle(v_id);
                let remote = vehicle.kind == VehicleKind::Drone;
                if vehicle.operator.is_some_and(|op| op != id) || !(aboard || remote) {
                    member.clear_task();
                    return;
                }
                vehicle.operator = Some(id);

                let wanted = vehicle.base_speed_kph * millisols / MILLISOLS_PER_HOUR;
                let step = wanted.min(vehicle.fuel_range_km());
                let from = vehicle.location;
                let to = from.step_toward(destination, step);
                let moved = from.distance_km(to);
                vehicle.inventory.take_up_to(Resource::Methane, moved / vehicle.fuel_economy);
                vehicle.location = to;
                vehicle.odometer_km += moved;

                if to.distance_km(destination) < 1e-9 {
                    vehicle.operator = None;
                    member.clear_task();
                    debug!(vehicle = %v_id, %destination, "drive complete");
                } else if step <= 0.0 {
                    warn!(vehicle = %v_id, "out of fuel");
                }
                let crew: Vec<MemberId> = vehicle.crew.iter().copied().collect();
                let towed = vehicle.towing;
                self.sync_positions(v_id, to, &crew, towed);
            }

            Task::FieldWork { vehicle: v_id, work } => match member.situation() {
                Situation::InVehicle(v) if v == v_id => {
                    vehicle.crew.remove(&id);
                    member.relocate(Situation::Outside(v_id), vehicle.location);
                }
                Situation::Outside(v) if v == v_id => {
                    let collected = match work {
                        FieldWork::Research => None,
                        FieldWork::Explore  => Some((Resource::RockSamples, ROCK_SAMPLES_PER_MILLISOL)),
                        FieldWork::Mine     => Some((Resource::Minerals, MINERALS_PER_MILLISOL)),
                    };
                    if let Some((resource, rate)) = collected {
                        vehicle.inventory.store_up_to(resource, rate * millisols);
                    }
                }
                _ => member.clear_task(),
            },

            Task::ReturnToVehicle { vehicle: v_id } => {
                if member.situation() == Situation::Outside(v_id) {
                    vehicle.crew.insert(id);
                    member.relocate(Situation::InVehicle(v_id), vehicle.location);
                }
                member.clear_task();
            }
        }
    }

    /// Move crew and any towed vehicle (with its crew) along with a vehicle.
    fn sync_positions(&mut self, vehicle: VehicleId, at: Coordinates, crew: &[MemberId], towed: Option<VehicleId>) {
        for &c in crew {
            if let Some(m) = self.members.get_mut(c.index()) {
                m.relocate(Situation::InVehicle(vehicle), at);
            }
        }
        if let Some(t) = towed {
            let towed_crew: Vec<MemberId> = match self.vehicles.get_mut(t.index()) {
                Some(tv) => {
                    tv.location = at;
                    tv.crew.iter().copied().collect()
                }
                None => return,
            };
            for c in towed_crew {
                if let Some(m) = self.members.get_mut(c.index()) {
                    m.relocate(Situation::InVehicle(t), at);
                }
            }
        }
    }

    fn consume_life_support(&mut self, millisols: f64, config: &MissionConfig) {
        let sols = millisols / 1_000.0;
        for m in &self.members {
            if !m.needs_life_support() {
                continue;
            }
            let Some(v) = m.situation().vehicle() else { continue };
            let Some(vehicle) = self.vehicles.get_mut(v.index()) else { continue };
            for resource in Resource::LIFE_SUPPORT {
                vehicle
                    .inventory
                    .take_up_to(resource, config.consumption_per_sol(resource) * sols);
            }
        }
    }
}

impl World for ColonyWorld {
    fn member(&self, id: MemberId) -> Option<&dyn MissionMember> {
        let m = self.members.get(id.index())?;
        Some(m.as_ref())
    }

    fn member_mut(&mut self, id: MemberId) -> Option<&mut dyn MissionMember> {
        let m = self.members.get_mut(id.index())?;
        Some(m.as_mut())
    }

    fn member_ids(&self) -> Vec<MemberId> {
        self.members.iter().map(|m| m.id()).collect()
    }

    fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(id.index())
    }

    fn vehicle_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.get_mut(id.index())
    }

    fn vehicle_ids(&self) -> Vec<VehicleId> {
        self.vehicles.iter().map(|v| v.id).collect()
    }

    fn settlement(&self, id: SettlementId) -> Option<&Settlement> {
        self.settlements.get(id.index())
    }

    fn settlement_mut(&mut self, id: SettlementId) -> Option<&mut Settlement> {
        self.settlements.get_mut(id.index())
    }

    fn settlement_ids(&self) -> Vec<SettlementId> {
        self.settlements.iter().map(|s| s.id).collect()
    }

    fn nearest_settlement(&self, at: Coordinates) -> Option<SettlementId> {
        self.index
            .nearest_neighbor_iter(&[at.lat, at.lon])
            .take(NEAREST_CANDIDATES)
            .map(|e| (at.distance_km(self.settlements[e.id.index()].location), e.id))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, id)| id)
    }

    fn solar_irradiance(&self, at: Coordinates) -> f64 {
        self.solar.irradiance(at, self.elapsed_millisols)
    }

    fn is_polar_dark(&self, at: Coordinates) -> bool {
        self.solar.polar_night && at.is_polar()
    }
}

impl TaskScheduler for ColonyWorld {
    fn advance(&mut self, now: Tick, millisols: f64, config: &MissionConfig) {
        self.elapsed_millisols = (now.0 + 1) as f64 * millisols;
        for i in 0..self.members.len() {
            if !self.members[i].is_alive() {
                continue;
            }
            if let Some(task) = self.members[i].task() {
                self.run_task(i, task, millisols);
            }
        }
        self.consume_life_support(millisols, config);
    }
}

//! Resource estimates, loadability, and vehicle selection.
//!
//! The estimate functions are pure: they read the route, roster, and
//! vehicle as they are right now and are recomputed on every call.

use std::cmp::Ordering;

use cm_core::resource::{add_amount, merge, total_mass};
use cm_core::time::MILLISOLS_PER_HOUR;
use cm_core::{MissionConfig, Resource, ResourceMap, SettlementId, VehicleId};
use cm_world::{Inventory, Vehicle, VehicleKind, World};

use crate::{Mission, MissionContext, MissionKind, MissionResult, PhasedWorkSite, Routable};

// ── Pure estimates ────────────────────────────────────────────────────────────

/// Who and what a trip estimate is computed for.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TripProfile {
    /// Members aboard who consume life support.
    pub crew:         usize,
    pub speed_kph:    f64,
    /// Kilometres per kg of fuel.
    pub fuel_economy: f64,
    /// Crew works outside and needs suits.
    pub eva:          bool,
}

/// Driving time for `distance_km` at `speed_kph`, in millisols.
pub fn trip_millisols(distance_km: f64, speed_kph: f64) -> f64 {
    if speed_kph <= 0.0 {
        return 0.0;
    }
    distance_km / speed_kph * MILLISOLS_PER_HOUR
}

/// Everything a trip of `distance_km` consumes, plus `extra_millisols` of
/// stationary time (site work).
///
/// Life support is `rate × crew × sols × margin`; with `use_margin` the
/// life-support and fuel figures are further scaled by the range error
/// margins.
pub fn resources_needed_for_trip(
    config:          &MissionConfig,
    profile:         &TripProfile,
    distance_km:     f64,
    extra_millisols: f64,
    use_margin:      bool,
) -> ResourceMap {
    let mut need = ResourceMap::new();
    let sols = (trip_millisols(distance_km, profile.speed_kph) + extra_millisols) / 1_000.0;

    let crew = profile.crew as f64;
    for resource in Resource::LIFE_SUPPORT {
        let mut amount = config.consumption_per_sol(resource) * crew * sols * config.margin(resource);
        if use_margin {
            amount *= config.life_support_range_error_margin;
        }
        add_amount(&mut need, resource, amount);
    }

    if profile.fuel_economy > 0.0 {
        let mut fuel = distance_km / profile.fuel_economy;
        if use_margin {
            fuel *= config.fuel_range_error_margin;
        }
        add_amount(&mut need, Resource::Methane, fuel);
    }

    if profile.eva && profile.crew > 0 {
        let spares = (crew * config.extra_eva_suit_factor).ceil();
        add_amount(&mut need, Resource::EvaSuit, crew + spares);
    }

    let parts = (distance_km / 1_000.0 * config.spare_parts_per_1000km).ceil();
    add_amount(&mut need, Resource::SparePart, parts);

    need
}

/// `true` iff every entry of `need` fits the inventory's capacity for it and
/// the amount resources together fit its mass limit.
pub fn fits_capacity(inventory: &Inventory, need: &ResourceMap) -> bool {
    need.iter().all(|(&r, &amount)| inventory.capacity(r) + 1e-9 >= amount)
        && total_mass(need) <= inventory.general_capacity_kg + 1e-9
}

/// First entry of `need` the inventory does not hold, in resource order.
pub fn first_shortfall(inventory: &Inventory, need: &ResourceMap) -> Option<Resource> {
    need.iter()
        .find(|&(&r, &amount)| inventory.stored(r) + 1e-9 < amount)
        .map(|(&r, _)| r)
}

// ── Vehicle selection ─────────────────────────────────────────────────────────

/// Kind-specific tie-breaker between vehicles that both meet the requirement.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum VehiclePreference {
    Cargo,
    Lab,
    Indifferent,
}

/// What a mission needs from its vehicle.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct VehicleRequirement {
    /// Seats needed when the crew rides along.
    pub seats:       usize,
    pub allow_drone: bool,
    pub preference:  VehiclePreference,
}

impl VehicleRequirement {
    pub fn for_kind(kind: &MissionKind, seats: usize) -> Self {
        let preference = match kind {
            MissionKind::Mining | MissionKind::Trade { .. } | MissionKind::EmergencySupply { .. } => {
                VehiclePreference::Cargo
            }
            MissionKind::FieldStudy { .. } => VehiclePreference::Lab,
            _ => VehiclePreference::Indifferent,
        };
        Self { seats, allow_drone: kind.allows_drone(), preference }
    }

    pub fn is_met_by(&self, vehicle: &Vehicle) -> bool {
        match vehicle.kind {
            VehicleKind::Rover => vehicle.crew_capacity >= self.seats,
            VehicleKind::Drone => self.allow_drone,
        }
    }
}

/// Total order over candidate vehicles; `Greater` means `a` is the better
/// pick.  Meeting the requirement comes first, then the kind's preference,
/// then range.
pub fn compare_vehicles(a: &Vehicle, b: &Vehicle, requirement: &VehicleRequirement) -> Ordering {
    let meets = requirement.is_met_by(a).cmp(&requirement.is_met_by(b));
    let preferred = match requirement.preference {
        VehiclePreference::Cargo => a.cargo_capacity().total_cmp(&b.cargo_capacity()),
        VehiclePreference::Lab => a.has_lab.cmp(&b.has_lab),
        VehiclePreference::Indifferent => Ordering::Equal,
    };
    meets
        .then(preferred)
        .then(a.range_km().total_cmp(&b.range_km()))
}

/// Best available vehicle parked at `home`.  On a tie the lower id wins.
pub fn best_vehicle(world: &dyn World, home: SettlementId, requirement: &VehicleRequirement) -> Option<VehicleId> {
    let garage = &world.settlement(home)?.garage;
    let mut best: Option<&Vehicle> = None;
    for &id in garage {
        let Some(v) = world.vehicle(id) else { continue };
        if !v.is_available() || !requirement.is_met_by(v) {
            continue;
        }
        if best.is_none_or(|b| compare_vehicles(v, b, requirement) == Ordering::Greater) {
            best = Some(v);
        }
    }
    best.map(|v| v.id)
}

// ── ResourceProvisioned ───────────────────────────────────────────────────────

/// Answers "can the vehicle carry enough to finish".
pub trait ResourceProvisioned {
    fn trip_profile(&self, ctx: &MissionContext<'_>) -> MissionResult<TripProfile>;

    fn resources_needed_for_trip(
        &self,
        ctx:         &MissionContext<'_>,
        use_margin:  bool,
        distance_km: f64,
    ) -> MissionResult<ResourceMap>;

    /// Needs for the whole rest of the route, site work included.
    fn resources_needed_for_remaining_mission(
        &self,
        ctx:        &MissionContext<'_>,
        use_margin: bool,
    ) -> MissionResult<ResourceMap>;

    /// Loads carried on top of what the crew consumes.
    fn optional_resources(&self, ctx: &MissionContext<'_>) -> MissionResult<ResourceMap>;

    fn is_vehicle_loadable(&self, ctx: &MissionContext<'_>) -> MissionResult<bool>;

    fn has_enough_resources_for_remaining_mission(
        &self,
        ctx:        &MissionContext<'_>,
        use_margin: bool,
    ) -> MissionResult<bool>;
}

impl ResourceProvisioned for Mission {
    fn trip_profile(&self, ctx: &MissionContext<'_>) -> MissionResult<TripProfile> {
        let vehicle = self.vehicle_ref(&*ctx.world)?;
        let crew = match vehicle.kind {
            VehicleKind::Rover => self
                .roster
                .iter()
                .filter_map(|&m| ctx.world.member(m))
                .filter(|m| m.needs_life_support())
                .count(),
            VehicleKind::Drone => 0,
        };
        Ok(TripProfile {
            crew,
            speed_kph:    vehicle.average_speed(ctx.config.default_speed_kph),
            fuel_economy: vehicle.fuel_economy,
            eva:          vehicle.kind == VehicleKind::Rover && self.mission_type().is_eva(),
        })
    }

    fn resources_needed_for_trip(
        &self,
        ctx:         &MissionContext<'_>,
        use_margin:  bool,
        distance_km: f64,
    ) -> MissionResult<ResourceMap> {
        let profile = self.trip_profile(ctx)?;
        Ok(resources_needed_for_trip(ctx.config, &profile, distance_km, 0.0, use_margin))
    }

    fn resources_needed_for_remaining_mission(
        &self,
        ctx:        &MissionContext<'_>,
        use_margin: bool,
    ) -> MissionResult<ResourceMap> {
        let profile = self.trip_profile(ctx)?;
        let distance = self.total_remaining_distance(&*ctx.world)?;
        let extra = self.remaining_site_millisols(ctx);
        Ok(resources_needed_for_trip(ctx.config, &profile, distance, extra, use_margin))
    }

    fn optional_resources(&self, ctx: &MissionContext<'_>) -> MissionResult<ResourceMap> {
        let mut optional = ResourceMap::new();
        match &self.kind {
            MissionKind::Trade { plan, traded: false, .. } => merge(&mut optional, &plan.sell),
            MissionKind::EmergencySupply { supplies, delivered: false, .. } => merge(&mut optional, supplies),
            MissionKind::RescueSalvage { target: Some(t), rescue_crew: true, coupled: false } => {
                merge(&mut optional, &self.rescue_supply(ctx, *t)?);
            }
            _ => {}
        }
        Ok(optional)
    }

    fn is_vehicle_loadable(&self, ctx: &MissionContext<'_>) -> MissionResult<bool> {
        let vehicle = self.vehicle_ref(&*ctx.world)?;
        let mut load = self.resources_needed_for_remaining_mission(ctx, true)?;
        merge(&mut load, &self.optional_resources(ctx)?);
        Ok(fits_capacity(&vehicle.inventory, &load))
    }

    fn has_enough_resources_for_remaining_mission(
        &self,
        ctx:        &MissionContext<'_>,
        use_margin: bool,
    ) -> MissionResult<bool> {
        let vehicle = self.vehicle_ref(&*ctx.world)?;
        let need = self.resources_needed_for_remaining_mission(ctx, use_margin)?;
        Ok(first_shortfall(&vehicle.inventory, &need).is_none())
    }
}

impl Mission {
    /// Stationary time still ahead: what is left of the current site plus a
    /// full stay at every upcoming work site.
    pub(crate) fn remaining_site_millisols(&self, ctx: &MissionContext<'_>) -> f64 {
        if !self.mission_type().is_eva() {
            return 0.0;
        }
        let site = self.kind.site_millisols(ctx.config);
        let upcoming = self.route.upcoming().iter().filter(|p| !p.is_base()).count() as f64;
        let current = if self.phase.is_eva() {
            (site - ctx.millisols_since(self.phase_start)).max(0.0)
        } else {
            0.0
        };
        current + upcoming * site
    }

    /// Life support the target crew needs to ride home, less what the
    /// target still holds.
    pub(crate) fn rescue_supply(&self, ctx: &MissionContext<'_>, target: VehicleId) -> MissionResult<ResourceMap> {
        let world = &*ctx.world;
        let target = world
            .vehicle(target)
            .ok_or(crate::MissionError::VehicleMissing(target))?;
        let own = self.vehicle_ref(world)?;
        let crew = target
            .crew
            .iter()
            .filter_map(|&m| world.member(m))
            .filter(|m| m.needs_life_support())
            .count();
        let home = self.route.origin().location();
        let profile = TripProfile {
            crew,
            speed_kph:    own.average_speed(ctx.config.default_speed_kph),
            fuel_economy: 0.0,
            eva:          false,
        };
        let distance = target.location.distance_km(home);
        let mut supply = ResourceMap::new();
        for (r, amount) in resources_needed_for_trip(ctx.config, &profile, distance, 0.0, false) {
            if r.is_life_support() {
                let top_up = amount * ctx.config.rescue_resource_buffer - target.inventory.stored(r);
                add_amount(&mut supply, r, top_up);
            }
        }
        Ok(supply)
    }
}

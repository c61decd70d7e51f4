//! Tunable mission constants.
//!
//! `MissionConfig` is loaded once by the application (JSON via the `serde`
//! feature, or `Default`) and shared read-only with every mission through
//! the mission context.

use crate::{CoreError, CoreResult, MissionType, Resource};

/// Every constant the mission engine's resource and timing math uses.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MissionConfig {
    // ── Consumption (kg per person per sol) ───────────────────────────────
    pub oxygen_per_sol: f64,
    pub water_per_sol:  f64,
    pub food_per_sol:   f64,

    // ── Margins ───────────────────────────────────────────────────────────
    pub oxygen_margin: f64,
    pub water_margin:  f64,
    pub food_margin:   f64,
    /// Applied on top of the per-resource margin when a safety margin is
    /// requested.
    pub life_support_range_error_margin: f64,
    pub fuel_range_error_margin:         f64,

    // ── Travel ────────────────────────────────────────────────────────────
    /// Speed assumed when a vehicle reports none (km/h).
    pub default_speed_kph: f64,
    /// A vehicle within this distance of a navpoint has arrived (km).
    pub arrival_tolerance_km: f64,
    /// Fractions of the distance to the nearest settlement tried, in order,
    /// when looking for an emergency destination.
    pub emergency_range_fractions: Vec<f64>,

    // ── EVA ───────────────────────────────────────────────────────────────
    pub research_site_millisols:  f64,
    pub exploring_site_millisols: f64,
    pub mining_site_millisols:    f64,
    /// Below this solar irradiance (W/m²) EVA stops outside polar regions.
    pub min_eva_irradiance: f64,
    /// Extra EVA suits carried per crew member.
    pub extra_eva_suit_factor: f64,

    // ── Equipment & rescue ────────────────────────────────────────────────
    pub spare_parts_per_1000km: f64,
    /// A crew responds to other vehicles' beacons within this range (km).
    pub beacon_response_range_km: f64,
    /// Extra life support handed to a rescued crew, as a multiplier.
    pub rescue_resource_buffer: f64,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            oxygen_per_sol: 0.84,
            water_per_sol:  4.0,
            food_per_sol:   0.62,

            oxygen_margin: 1.25,
            water_margin:  1.5,
            food_margin:   1.75,
            life_support_range_error_margin: 1.5,
            fuel_range_error_margin:         1.5,

            default_speed_kph:         10.0,
            arrival_tolerance_km:      0.1,
            emergency_range_fractions: vec![1.0, 0.667, 0.333],

            research_site_millisols:  1_000.0,
            exploring_site_millisols: 1_000.0,
            mining_site_millisols:    3_000.0,
            min_eva_irradiance:       50.0,
            extra_eva_suit_factor:    0.2,

            spare_parts_per_1000km:   2.0,
            beacon_response_range_km: 100.0,
            rescue_resource_buffer:   1.0,
        }
    }
}

impl MissionConfig {
    /// Per-person consumption of a life-support resource (kg/sol); zero for
    /// everything else.
    pub fn consumption_per_sol(&self, resource: Resource) -> f64 {
        match resource {
            Resource::Oxygen => self.oxygen_per_sol,
            Resource::Water  => self.water_per_sol,
            Resource::Food   => self.food_per_sol,
            _ => 0.0,
        }
    }

    /// Per-resource safety factor applied to every life-support estimate.
    pub fn margin(&self, resource: Resource) -> f64 {
        match resource {
            Resource::Oxygen => self.oxygen_margin,
            Resource::Water  => self.water_margin,
            Resource::Food   => self.food_margin,
            _ => 1.0,
        }
    }

    /// How long an EVA crew works at one site of this mission kind.
    pub fn site_millisols(&self, kind: MissionType) -> f64 {
        match kind {
            MissionType::FieldStudy  => self.research_site_millisols,
            MissionType::Exploration => self.exploring_site_millisols,
            MissionType::Mining      => self.mining_site_millisols,
            _ => 0.0,
        }
    }

    /// Reject configurations the resource math cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        let positive = [
            ("oxygen_per_sol", self.oxygen_per_sol),
            ("water_per_sol", self.water_per_sol),
            ("food_per_sol", self.food_per_sol),
            ("default_speed_kph", self.default_speed_kph),
            ("arrival_tolerance_km", self.arrival_tolerance_km),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(CoreError::Config(format!("{name} must be positive, got {value}")));
            }
        }
        let margins = [
            ("oxygen_margin", self.oxygen_margin),
            ("water_margin", self.water_margin),
            ("food_margin", self.food_margin),
            ("life_support_range_error_margin", self.life_support_range_error_margin),
            ("fuel_range_error_margin", self.fuel_range_error_margin),
        ];
        for (name, value) in margins {
            if value < 1.0 {
                return Err(CoreError::Config(format!("{name} must be >= 1.0, got {value}")));
            }
        }
        if self.emergency_range_fractions.iter().any(|&f| !(f > 0.0 && f <= 1.0)) {
            return Err(CoreError::Config(
                "emergency_range_fractions must lie in (0, 1]".to_owned(),
            ));
        }
        Ok(())
    }
}

//! Mission kinds and their per-kind state and hooks.
//!
//! Every kind is a vehicle mission sharing the review → embark → travel →
//! disembark skeleton.  What differs is carried here: the work phase entered
//! at non-base stops, what members do outside, and the small bits of state
//! each kind keeps (a rescue target, a trade plan, a supply load, per-site
//! progress).

use cm_core::{MissionConfig, MissionType, ResourceMap, Science, SettlementId, VehicleId};
use cm_world::{FieldWork, Vehicle, World};

use crate::MissionPhase;

// ── Trade planning ────────────────────────────────────────────────────────────

/// Goods a trade mission carries out and brings back.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TradePlan {
    /// Loaded at home, handed to the partner.
    pub sell:  ResourceMap,
    /// Taken from the partner, unloaded at home.
    pub buy:   ResourceMap,
    /// Net value of the exchange to the home settlement.
    pub value: f64,
}

/// Values goods between two settlements.  Supplied by the economy model.
pub trait LoadValuer {
    /// The best exchange between `home` and `partner` that fits in
    /// `cargo_kg` each way.
    fn plan(&self, world: &dyn World, home: SettlementId, partner: SettlementId, cargo_kg: f64) -> TradePlan;
}

// ── MissionKind ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum MissionKind {
    /// `science` is the lead's study discipline, if the lead has one.
    FieldStudy { science: Option<Science> },
    Exploration {
        /// Completion (0..=1) of each site visited so far.
        completion: Vec<f64>,
    },
    Mining,
    RescueSalvage {
        target:      Option<VehicleId>,
        /// The target had living crew when the mission was planned.
        rescue_crew: bool,
        coupled:     bool,
    },
    TravelToSettlement { destination: SettlementId },
    Trade {
        partner: SettlementId,
        plan:    TradePlan,
        traded:  bool,
    },
    EmergencySupply {
        destination: SettlementId,
        /// Loaded at home, handed over on arrival.
        supplies:    ResourceMap,
        delivered:   bool,
    },
}

impl MissionKind {
    pub fn mission_type(&self) -> MissionType {
        match self {
            MissionKind::FieldStudy { .. }         => MissionType::FieldStudy,
            MissionKind::Exploration { .. }        => MissionType::Exploration,
            MissionKind::Mining                    => MissionType::Mining,
            MissionKind::RescueSalvage { .. }      => MissionType::RescueSalvage,
            MissionKind::TravelToSettlement { .. } => MissionType::TravelToSettlement,
            MissionKind::Trade { .. }              => MissionType::Trade,
            MissionKind::EmergencySupply { .. }    => MissionType::EmergencySupply,
        }
    }

    /// Fewest members the review accepts.
    pub fn min_members(&self) -> usize {
        match self {
            MissionKind::RescueSalvage { .. }
            | MissionKind::TravelToSettlement { .. }
            | MissionKind::Trade { .. }
            | MissionKind::EmergencySupply { .. } => 1,
            _ => 2,
        }
    }

    /// Drones may carry out this kind (nobody needs to ride along).
    pub fn allows_drone(&self) -> bool {
        matches!(self, MissionKind::Trade { .. })
    }

    /// Called when the mission enters `phase`.
    pub(crate) fn on_enter_phase(&mut self, phase: MissionPhase) {
        if let (MissionKind::Exploration { completion }, MissionPhase::ExploringSite) = (self, phase) {
            completion.push(0.0);
        }
    }
}

// ── PhasedWorkSite ────────────────────────────────────────────────────────────

/// The work a kind does at its non-base stops.
pub trait PhasedWorkSite {
    /// Phase entered at a work stop; `None` if the kind only travels.
    fn work_phase(&self) -> Option<MissionPhase>;

    /// Off-vehicle work members do during an EVA phase.
    fn field_work(&self) -> Option<FieldWork>;

    /// How long the crew stays at one EVA site (millisols).
    fn site_millisols(&self, config: &MissionConfig) -> f64;

    /// `true` if this mission may carry on despite `vehicle`'s beacon.
    fn ignores_beacon(&self, vehicle: VehicleId) -> bool;

    /// Per-tick EVA hook; returns whether work should go on.
    fn continue_work(&mut self, vehicle: &Vehicle, elapsed_millisols: f64, config: &MissionConfig) -> bool;
}

impl PhasedWorkSite for MissionKind {
    fn work_phase(&self) -> Option<MissionPhase> {
        match self {
            MissionKind::FieldStudy { .. }         => Some(MissionPhase::ResearchSite),
            MissionKind::Exploration { .. }        => Some(MissionPhase::ExploringSite),
            MissionKind::Mining                    => Some(MissionPhase::MiningSite),
            MissionKind::RescueSalvage { .. }      => Some(MissionPhase::Rendezvous),
            MissionKind::TravelToSettlement { .. } => None,
            MissionKind::Trade { .. }              => Some(MissionPhase::TradeNegotiation),
            MissionKind::EmergencySupply { .. }    => Some(MissionPhase::SupplyDelivery),
        }
    }

    fn field_work(&self) -> Option<FieldWork> {
        match self {
            MissionKind::FieldStudy { .. }  => Some(FieldWork::Research),
            MissionKind::Exploration { .. } => Some(FieldWork::Explore),
            MissionKind::Mining             => Some(FieldWork::Mine),
            _ => None,
        }
    }

    fn site_millisols(&self, config: &MissionConfig) -> f64 {
        config.site_millisols(self.mission_type())
    }

    fn ignores_beacon(&self, vehicle: VehicleId) -> bool {
        matches!(self, MissionKind::RescueSalvage { target: Some(t), .. } if *t == vehicle)
    }

    fn continue_work(&mut self, vehicle: &Vehicle, elapsed_millisols: f64, config: &MissionConfig) -> bool {
        let site = self.site_millisols(config);
        match self {
            MissionKind::Exploration { completion } => {
                if let Some(last) = completion.last_mut() {
                    *last = if site > 0.0 { (elapsed_millisols / site).min(1.0) } else { 1.0 };
                }
                true
            }
            // Stop once the hold is full.
            MissionKind::Mining => {
                vehicle.inventory.remaining_capacity(cm_core::Resource::Minerals) > 0.0
            }
            _ => true,
        }
    }
}

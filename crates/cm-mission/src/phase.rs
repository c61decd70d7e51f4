//! Mission phases and the per-kind phase tables.
//!
//! A phase is a plain enum value compared structurally.  Each mission kind
//! registers its phases as a [`PhaseTable`]: a static list of
//! `(phase, transition)` pairs.  When a phase ends, the driver looks the
//! current phase up in the table and applies the [`Transition`] its rule
//! returns.  There is no fallback: a phase missing from the table is an
//! internal error.

use cm_core::MissionType;

use crate::{Mission, MissionStatus, Routable};

// ── MissionPhase ──────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MissionPhase {
    Reviewing,
    Embarking,
    Travelling,
    Disembarking,
    ResearchSite,
    ExploringSite,
    MiningSite,
    Rendezvous,
    TradeNegotiation,
    SupplyDelivery,
}

impl MissionPhase {
    pub fn name(self) -> &'static str {
        match self {
            MissionPhase::Reviewing        => "reviewing",
            MissionPhase::Embarking        => "embarking",
            MissionPhase::Travelling       => "travelling",
            MissionPhase::Disembarking     => "disembarking",
            MissionPhase::ResearchSite     => "research site",
            MissionPhase::ExploringSite    => "exploring site",
            MissionPhase::MiningSite       => "mining site",
            MissionPhase::Rendezvous       => "rendezvous",
            MissionPhase::TradeNegotiation => "trade negotiation",
            MissionPhase::SupplyDelivery   => "supply delivery",
        }
    }

    /// Human-readable template; `{}` is replaced by the phase's subject
    /// (a settlement, navpoint, or vehicle name).
    pub fn description_template(self) -> &'static str {
        match self {
            MissionPhase::Reviewing        => "Reviewing plan for {}",
            MissionPhase::Embarking        => "Loading and boarding at {}",
            MissionPhase::Travelling       => "Driving to {}",
            MissionPhase::Disembarking     => "Unloading at {}",
            MissionPhase::ResearchSite     => "Researching at {}",
            MissionPhase::ExploringSite    => "Exploring {}",
            MissionPhase::MiningSite       => "Mining at {}",
            MissionPhase::Rendezvous       => "Meeting {}",
            MissionPhase::TradeNegotiation => "Trading with {}",
            MissionPhase::SupplyDelivery   => "Delivering supplies to {}",
        }
    }

    pub fn describe(self, subject: &str) -> String {
        self.description_template().replacen("{}", subject, 1)
    }

    /// `true` for phases spent working outside the vehicle.
    #[inline]
    pub fn is_eva(self) -> bool {
        matches!(
            self,
            MissionPhase::ResearchSite | MissionPhase::ExploringSite | MissionPhase::MiningSite
        )
    }
}

impl std::fmt::Display for MissionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Transition ────────────────────────────────────────────────────────────────

/// What happens when a phase ends.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Transition {
    Enter(MissionPhase),
    /// Start the leg to the next navpoint and enter `Travelling`.
    StartLeg,
    Finish(MissionStatus),
}

pub type TransitionFn = fn(&Mission) -> Transition;

// ── PhaseTable ────────────────────────────────────────────────────────────────

/// The phases one mission kind may be in, each with its exit rule.
pub struct PhaseTable {
    rules: &'static [(MissionPhase, TransitionFn)],
}

impl PhaseTable {
    pub const fn new(rules: &'static [(MissionPhase, TransitionFn)]) -> Self {
        Self { rules }
    }

    pub fn contains(&self, phase: MissionPhase) -> bool {
        self.rules.iter().any(|(p, _)| *p == phase)
    }

    pub fn rule(&self, phase: MissionPhase) -> Option<TransitionFn> {
        self.rules.iter().find(|(p, _)| *p == phase).map(|(_, f)| *f)
    }

    pub fn phases(&self) -> impl Iterator<Item = MissionPhase> + '_ {
        self.rules.iter().map(|(p, _)| *p)
    }

    /// The table registered for a mission kind.
    pub fn for_type(kind: MissionType) -> &'static PhaseTable {
        match kind {
            MissionType::FieldStudy         => &FIELD_STUDY,
            MissionType::Exploration        => &EXPLORATION,
            MissionType::Mining             => &MINING,
            MissionType::RescueSalvage      => &RESCUE_SALVAGE,
            MissionType::TravelToSettlement => &TRAVEL_TO_SETTLEMENT,
            MissionType::Trade              => &TRADE,
            MissionType::EmergencySupply    => &EMERGENCY_SUPPLY,
        }
    }
}

// ── Rules ─────────────────────────────────────────────────────────────────────

fn to_embarking(_: &Mission) -> Transition {
    Transition::Enter(MissionPhase::Embarking)
}

fn start_leg(_: &Mission) -> Transition {
    Transition::StartLeg
}

/// Back at a settlement: done, unless the trip was called off on the way.
fn disembarked(m: &Mission) -> Transition {
    Transition::Finish(m.abort_reason().unwrap_or(MissionStatus::Accomplished))
}

/// A base ends the trip; any other stop is a work site when the kind has
/// work pending there.
fn after_travel(m: &Mission) -> Transition {
    match m.route().current_navpoint() {
        Some(p) if p.is_base() => Transition::Enter(MissionPhase::Disembarking),
        Some(_) => match m.work_phase() {
            Some(work) if m.has_work_at_current_stop() => Transition::Enter(work),
            _ => Transition::StartLeg,
        },
        None => Transition::StartLeg,
    }
}

macro_rules! vehicle_table {
    ($name:ident $(, $work:ident)?) => {
        pub static $name: PhaseTable = PhaseTable::new(&[
            (MissionPhase::Reviewing, to_embarking),
            (MissionPhase::Embarking, start_leg),
            (MissionPhase::Travelling, after_travel),
            $((MissionPhase::$work, start_leg),)?
            (MissionPhase::Disembarking, disembarked),
        ]);
    };
}

vehicle_table!(FIELD_STUDY, ResearchSite);
vehicle_table!(EXPLORATION, ExploringSite);
vehicle_table!(MINING, MiningSite);
vehicle_table!(RESCUE_SALVAGE, Rendezvous);
vehicle_table!(TRAVEL_TO_SETTLEMENT);
vehicle_table!(TRADE, TradeNegotiation);
vehicle_table!(EMERGENCY_SUPPLY, SupplyDelivery);

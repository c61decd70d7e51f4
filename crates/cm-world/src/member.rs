//! The `MissionMember` capability trait and its two implementations.
//!
//! The mission engine only ever talks to members through [`MissionMember`]:
//! it never branches on "person or robot".  Kind-specific behaviour (robots
//! never fall ill, only people carry a research study) lives behind the
//! trait methods.

use std::collections::BTreeMap;

use cm_core::{Coordinates, MemberId, MissionId, MissionType, Science, SettlementId, VehicleId};

use crate::Task;

// ── Situation ─────────────────────────────────────────────────────────────────

/// Where a member physically is.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Situation {
    InSettlement(SettlementId),
    InVehicle(VehicleId),
    /// On the surface next to the given vehicle.
    Outside(VehicleId),
    /// Remains recovered for burial.
    Retrieved,
}

impl Situation {
    #[inline]
    pub fn vehicle(self) -> Option<VehicleId> {
        match self {
            Situation::InVehicle(v) | Situation::Outside(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemberKind {
    #[default]
    Person,
    Robot,
}

/// Coarse medical state of a person.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Health {
    #[default]
    Well,
    Ill,
    /// Needs a settlement's medical care.
    Serious,
    Dead,
}

// ── MissionMember ─────────────────────────────────────────────────────────────

/// What the mission engine needs from an agent.
pub trait MissionMember {
    fn id(&self) -> MemberId;
    fn name(&self) -> &str;
    fn kind(&self) -> MemberKind;

    fn location(&self) -> Coordinates;
    fn situation(&self) -> Situation;
    /// Settlement the member belongs to.
    fn home(&self) -> SettlementId;

    fn is_alive(&self) -> bool;
    fn has_serious_medical_problem(&self) -> bool;
    /// Able to leave a vehicle and work outside.
    fn is_eva_fit(&self) -> bool;
    fn can_drive(&self) -> bool;
    /// Breathes, drinks, and eats from the vehicle's stores.
    fn needs_life_support(&self) -> bool;

    /// Multiplier a recruiter applies to this member's suitability score.
    fn qualification_weight(&self) -> f64 {
        1.0
    }

    /// Accumulated experience with a mission kind (0 for none).
    fn mission_experience(&self, kind: MissionType) -> f64;

    /// Discipline of the member's current research study, if any.
    fn research_study(&self) -> Option<Science> {
        None
    }

    fn mission(&self) -> Option<MissionId>;
    fn set_mission(&mut self, mission: Option<MissionId>);

    fn task(&self) -> Option<Task>;
    fn assign_task(&mut self, task: Task);
    fn clear_task(&mut self);

    fn relocate(&mut self, situation: Situation, location: Coordinates);
    fn set_home(&mut self, home: SettlementId);

    /// Apply a change of medical state.  Members without one ignore it.
    fn set_health(&mut self, _health: Health) {}
}

// ── Person ────────────────────────────────────────────────────────────────────

/// A colonist.
#[derive(Clone, Debug)]
pub struct Person {
    pub id:         MemberId,
    pub name:       String,
    pub home:       SettlementId,
    pub location:   Coordinates,
    pub situation:  Situation,
    pub health:     Health,
    pub driver:     bool,
    pub experience: BTreeMap<MissionType, f64>,
    pub study:      Option<Science>,
    pub mission:    Option<MissionId>,
    pub task:       Option<Task>,
}

impl Person {
    /// A healthy, driving-capable colonist inside `home`.
    pub fn new(name: impl Into<String>, home: SettlementId, location: Coordinates) -> Self {
        Self {
            id:         MemberId::INVALID,
            name:       name.into(),
            home,
            location,
            situation:  Situation::InSettlement(home),
            health:     Health::Well,
            driver:     true,
            experience: BTreeMap::new(),
            study:      None,
            mission:    None,
            task:       None,
        }
    }

    pub fn with_experience(mut self, kind: MissionType, amount: f64) -> Self {
        self.experience.insert(kind, amount);
        self
    }

    pub fn with_study(mut self, science: Science) -> Self {
        self.study = Some(science);
        self
    }
}

impl MissionMember for Person {
    fn id(&self) -> MemberId { self.id }
    fn name(&self) -> &str { &self.name }
    fn kind(&self) -> MemberKind { MemberKind::Person }
    fn location(&self) -> Coordinates { self.location }
    fn situation(&self) -> Situation { self.situation }
    fn home(&self) -> SettlementId { self.home }

    fn is_alive(&self) -> bool {
        self.health != Health::Dead
    }

    fn has_serious_medical_problem(&self) -> bool {
        matches!(self.health, Health::Serious | Health::Dead)
    }

    fn is_eva_fit(&self) -> bool {
        self.health == Health::Well
    }

    fn can_drive(&self) -> bool {
        self.driver && self.is_alive() && !self.has_serious_medical_problem()
    }

    fn needs_life_support(&self) -> bool {
        self.is_alive()
    }

    fn mission_experience(&self, kind: MissionType) -> f64 {
        self.experience.get(&kind).copied().unwrap_or(0.0)
    }

    fn research_study(&self) -> Option<Science> { self.study }
    fn mission(&self) -> Option<MissionId> { self.mission }
    fn set_mission(&mut self, mission: Option<MissionId>) { self.mission = mission; }
    fn task(&self) -> Option<Task> { self.task }
    fn assign_task(&mut self, task: Task) { self.task = Some(task); }
    fn clear_task(&mut self) { self.task = None; }

    fn relocate(&mut self, situation: Situation, location: Coordinates) {
        self.situation = situation;
        self.location = location;
    }

    fn set_home(&mut self, home: SettlementId) { self.home = home; }
    fn set_health(&mut self, health: Health) { self.health = health; }
}

// ── Robot ─────────────────────────────────────────────────────────────────────

/// An automaton.  Never ill, never consumes life support.
#[derive(Clone, Debug)]
pub struct Robot {
    pub id:          MemberId,
    pub name:        String,
    pub home:        SettlementId,
    pub location:    Coordinates,
    pub situation:   Situation,
    pub operational: bool,
    pub driver:      bool,
    pub eva_capable: bool,
    pub experience:  BTreeMap<MissionType, f64>,
    pub mission:     Option<MissionId>,
    pub task:        Option<Task>,
}

impl Robot {
    pub fn new(name: impl Into<String>, home: SettlementId, location: Coordinates) -> Self {
        Self {
            id:          MemberId::INVALID,
            name:        name.into(),
            home,
            location,
            situation:   Situation::InSettlement(home),
            operational: true,
            driver:      true,
            eva_capable: true,
            experience:  BTreeMap::new(),
            mission:     None,
            task:        None,
        }
    }
}

impl MissionMember for Robot {
    fn id(&self) -> MemberId { self.id }
    fn name(&self) -> &str { &self.name }
    fn kind(&self) -> MemberKind { MemberKind::Robot }
    fn location(&self) -> Coordinates { self.location }
    fn situation(&self) -> Situation { self.situation }
    fn home(&self) -> SettlementId { self.home }
    fn is_alive(&self) -> bool { self.operational }
    fn has_serious_medical_problem(&self) -> bool { false }
    fn is_eva_fit(&self) -> bool { self.operational && self.eva_capable }
    fn can_drive(&self) -> bool { self.operational && self.driver }
    fn needs_life_support(&self) -> bool { false }
    fn qualification_weight(&self) -> f64 { 0.5 }

    fn mission_experience(&self, kind: MissionType) -> f64 {
        self.experience.get(&kind).copied().unwrap_or(0.0)
    }

    fn mission(&self) -> Option<MissionId> { self.mission }
    fn set_mission(&mut self, mission: Option<MissionId>) { self.mission = mission; }
    fn task(&self) -> Option<Task> { self.task }
    fn assign_task(&mut self, task: Task) { self.task = Some(task); }
    fn clear_task(&mut self) { self.task = None; }

    fn relocate(&mut self, situation: Situation, location: Coordinates) {
        self.situation = situation;
        self.location = location;
    }

    fn set_home(&mut self, home: SettlementId) { self.home = home; }
}

//! `cm-mission`: the mission state machine and its concrete kinds.
//!
//! A [`Mission`] is a multi-phase activity carried out by a roster of
//! members with one vehicle.  Every kind shares the same skeleton:
//!
//! ```text
//! Reviewing → Embarking → Travelling ⇄ <work phase> → … → Disembarking
//! ```
//!
//! and differs only in the work it does at non-base stops.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                  |
//! |------------------|-----------------------------------------------------------|
//! | [`mission`]      | `Mission`: roster, statuses, phase protocol, recruiting  |
//! | [`phase`]        | `MissionPhase`, `PhaseTable`, `Transition`                |
//! | [`kind`]         | `MissionKind`, `PhasedWorkSite`, `TradePlan`, `LoadValuer`|
//! | [`status`]       | `MissionStatus`, `FailureCategory`                        |
//! | [`provisioning`] | trip estimates, `ResourceProvisioned`, vehicle selection  |
//! | [`travel`]       | `Routable`, driving, emergency reroutes                   |
//! | `crew`           | embarking and disembarking (internal)                     |
//! | `eva`            | EVA gating at work sites (internal)                       |
//! | [`missions`]     | per-kind constructors                                     |
//! | [`event`]        | `MissionEvent`, `MissionEventKind`                        |
//! | [`log`]          | `MissionLog`, `LogEntry`                                  |
//! | [`context`]      | `MissionContext`: per-call world/clock view              |
//! | [`error`]        | `MissionError`, `MissionResult<T>`                        |
//!
//! # Driving a mission
//!
//! ```rust,ignore
//! let mut ctx = MissionContext::new(&clock, &config, &mut world);
//! let mut mission = missions::field_study(id, lead, &candidates, &mut ctx, &mut rng);
//! for &member in mission.roster().clone().iter() {
//!     mission.perform_mission(member, &mut ctx);
//! }
//! for event in mission.take_events() { /* … */ }
//! ```
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on statuses, phases, events, and log entries. |

pub mod context;
mod crew;
pub mod error;
mod eva;
pub mod event;
pub mod kind;
pub mod log;
pub mod mission;
pub mod missions;
pub mod phase;
pub mod provisioning;
pub mod status;
pub mod travel;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use context::MissionContext;
pub use error::{MissionError, MissionResult};
pub use event::{MissionEvent, MissionEventKind};
pub use kind::{LoadValuer, MissionKind, PhasedWorkSite, TradePlan};
pub use log::{LogEntry, MissionLog};
pub use mission::Mission;
pub use phase::{MissionPhase, PhaseTable, Transition, TransitionFn};
pub use provisioning::{
    best_vehicle, compare_vehicles, fits_capacity, resources_needed_for_trip, ResourceProvisioned,
    TripProfile, VehiclePreference, VehicleRequirement,
};
pub use status::{FailureCategory, MissionStatus};
pub use travel::Routable;

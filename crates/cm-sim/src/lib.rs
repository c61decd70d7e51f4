//! `cm-sim`: tick driver for the colony mission engine.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Missions: for each active mission (ascending id), each living
//!                roster member (ascending id) calls perform_mission;
//!                the mission's events go to the observer.
//!   ② Tasks   : World::advance plays out one tick of millisols:
//!                drives, boarding, exits, field work.
//!   ③ Retire  : finished missions move to the archive (on_mission_end).
//! ```
//!
//! Missions enter through [`MissionSim::propose`] with a constructor from
//! `cm_mission::missions`, and can be cut short with [`MissionSim::abort`].
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use cm_core::SimConfig;
//! use cm_mission::missions;
//! use cm_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(SimConfig::default(), world).build()?;
//! sim.propose(|id, ctx, rng| missions::field_study(id, lead, &crew, ctx, rng))?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::MissionSim;

//! `cm-core`: foundational types for the colony mission engine.
//!
//! This crate is a dependency of every other `cm-*` crate.  It has no `cm-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module           | Contents                                                 |
//! |------------------|----------------------------------------------------------|
//! | [`ids`]          | `MissionId`, `MemberId`, `VehicleId`, `SettlementId`     |
//! | [`geo`]          | `Coordinates`, great-circle distance on the Mars sphere  |
//! | [`time`]         | `Tick`, `SimClock` (millisol conversion), `SimConfig`    |
//! | [`rng`]          | `MissionRng` (per-mission), `SimRng` (global)            |
//! | [`resource`]     | `Resource`, `ResourceMap`                                |
//! | [`mission_type`] | `MissionType`, `Science`                                 |
//! | [`config`]       | `MissionConfig`: consumption rates, margins, site times |
//! | [`error`]        | `CoreError`, `CoreResult`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod mission_type;
pub mod resource;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::MissionConfig;
pub use error::{CoreError, CoreResult};
pub use geo::Coordinates;
pub use ids::{MemberId, MissionId, SettlementId, VehicleId};
pub use mission_type::{MissionType, Science};
pub use resource::{Resource, ResourceMap};
pub use rng::{MissionRng, SimRng};
pub use time::{SimClock, SimConfig, Tick};

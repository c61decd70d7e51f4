//! `cm-world`: the in-world collaborators a mission drives.
//!
//! Missions never own people, vehicles, or settlements.  They reach them
//! through the [`World`] trait and ask the [`TaskScheduler`] to carry out
//! per-member [`Task`]s.  [`ColonyWorld`] is the in-memory implementation of
//! both used by the driver, the demo, and every scenario test.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`member`]     | `MissionMember` trait, `Person`, `Robot`, `Situation`      |
//! | [`task`]       | `Task`, `FieldWork`                                        |
//! | [`inventory`]  | `Inventory`: capacity-bounded resource storage            |
//! | [`vehicle`]    | `Vehicle`, `VehicleKind`, `VehicleSpec`                    |
//! | [`settlement`] | `Settlement`                                               |
//! | [`world`]      | `World` and `TaskScheduler` traits, `Holder`               |
//! | [`colony`]     | `ColonyWorld` (R-tree settlement index + task execution)   |
//! | [`builder`]    | `ColonyWorldBuilder`                                       |
//! | [`error`]      | `WorldError`, `WorldResult<T>`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod builder;
pub mod colony;
pub mod error;
pub mod inventory;
pub mod member;
pub mod settlement;
pub mod task;
pub mod vehicle;
pub mod world;


pub use builder::ColonyWorldBuilder;
pub use colony::{ColonyWorld, SolarModel};
pub use error::{WorldError, WorldResult};
pub use inventory::Inventory;
pub use member::{Health, MemberKind, MissionMember, Person, Robot, Situation};
pub use settlement::Settlement;
pub use task::{FieldWork, Task};
pub use vehicle::{Vehicle, VehicleKind, VehicleSpec};
pub use world::{Holder, TaskScheduler, World};

//! `cm-route`: waypoint sequences for travelling missions.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`navpoint`]   | `NavPoint`: immutable waypoint                            |
//! | [`route`]      | `Route` (cursor + travel status), `TravelStatus`           |
//! | [`ordering`]   | `tour_distance`, `nearest_neighbour_order`, `order_sites`  |
//! | [`error`]      | `RouteError`, `RouteResult<T>`                             |
//!
//! # Cursor model
//!
//! A route always starts with the origin at index 0.  The cursor names the
//! navpoint the mission is *at* (`TravelStatus::AtNavpoint`) or *heading
//! to* (`TravelStatus::Travelling`).  `start_travel_to_next_node` advances
//! it by one; nothing else moves it.  An emergency reroute replaces the
//! upcoming points without moving the cursor backward.

pub mod error;
pub mod navpoint;
pub mod ordering;
pub mod route;

#[cfg(test)]
mod tests;

pub use error::{RouteError, RouteResult};
pub use navpoint::NavPoint;
pub use ordering::{nearest_neighbour_order, order_sites, tour_distance};
pub use route::{Route, TravelStatus};

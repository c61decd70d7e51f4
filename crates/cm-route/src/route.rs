//! Cursor-tracked waypoint sequence owned by one travelling mission.

use cm_core::{Coordinates, SettlementId, Tick};

use crate::{NavPoint, RouteError, RouteResult};

/// Whether the mission is parked at a navpoint or on a leg toward one.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TravelStatus {
    #[default]
    AtNavpoint,
    Travelling,
}

impl TravelStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TravelStatus::AtNavpoint => "at navpoint",
            TravelStatus::Travelling => "travelling",
        }
    }
}

/// Ordered navpoints plus the mission's position within them.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    points:    Vec<NavPoint>,
    cursor:    usize,
    status:    TravelStatus,
    leg_start: Tick,
    last_stop: usize,
    rerouted:  bool,
}

impl Route {
    /// A route whose origin (index 0) is the given point; the mission starts
    /// at it.
    pub fn new(origin: Coordinates, settlement: Option<SettlementId>, description: impl Into<String>) -> Self {
        Self {
            points:    vec![NavPoint::new(origin, settlement, description, None)],
            cursor:    0,
            status:    TravelStatus::AtNavpoint,
            leg_start: Tick::ZERO,
            last_stop: 0,
            rerouted:  false,
        }
    }

    // ── Editing ───────────────────────────────────────────────────────────

    /// Append a navpoint; its distance is measured from the current last point.
    pub fn add_navpoint(
        &mut self,
        location:    Coordinates,
        settlement:  Option<SettlementId>,
        description: impl Into<String>,
    ) -> &NavPoint {
        let previous = self.points.last().map(NavPoint::location);
        self.points.push(NavPoint::new(location, settlement, description, previous));
        let last = self.points.len() - 1;
        &self.points[last]
    }

    /// Drop every navpoint from the next index on: those neither reached
    /// nor under way, plus the current leg's target while travelling.
    pub fn clear_remaining_navpoints(&mut self) {
        let keep = self.next_index().min(self.points.len());
        self.points.truncate(keep);
    }

    /// Replace the rest of the route with a single terminal point.
    ///
    /// When travelling, the new point takes over the current leg.  The
    /// cursor never moves backward.
    pub fn insert_emergency_destination(
        &mut self,
        location:    Coordinates,
        settlement:  Option<SettlementId>,
        description: impl Into<String>,
    ) -> &NavPoint {
        self.clear_remaining_navpoints();
        self.rerouted = true;
        self.add_navpoint(location, settlement, description)
    }

    // ── Travel ────────────────────────────────────────────────────────────

    /// Advance the cursor to the next navpoint and start the leg at `now`.
    pub fn start_travel_to_next_node(&mut self, now: Tick) -> RouteResult<&NavPoint> {
        if self.status == TravelStatus::Travelling {
            return Err(RouteError::AlreadyTravelling(self.cursor));
        }
        if self.cursor + 1 >= self.points.len() {
            return Err(RouteError::Exhausted { cursor: self.cursor, len: self.points.len() });
        }
        self.cursor += 1;
        self.status = TravelStatus::Travelling;
        self.leg_start = now;
        Ok(&self.points[self.cursor])
    }

    /// Mark the leg complete; the navpoint under the cursor becomes the
    /// last stop.
    pub fn reached_next_node(&mut self) -> RouteResult<&NavPoint> {
        if self.status != TravelStatus::Travelling {
            return Err(RouteError::NotTravelling);
        }
        let len = self.points.len();
        let point = self
            .points
            .get(self.cursor)
            .ok_or(RouteError::Exhausted { cursor: self.cursor, len })?;
        self.status = TravelStatus::AtNavpoint;
        self.last_stop = self.cursor;
        Ok(point)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn status(&self) -> TravelStatus {
        self.status
    }

    /// Index of the navpoint the mission is at or heading to.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Index of the first navpoint not yet reached nor under way.
    #[inline]
    pub fn next_index(&self) -> usize {
        match self.status {
            TravelStatus::AtNavpoint => self.cursor + 1,
            TravelStatus::Travelling => self.cursor,
        }
    }

    #[inline]
    pub fn leg_start(&self) -> Tick {
        self.leg_start
    }

    /// `true` once an emergency destination replaced the planned route.
    #[inline]
    pub fn is_rerouted(&self) -> bool {
        self.rerouted
    }

    pub fn points(&self) -> &[NavPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn origin(&self) -> &NavPoint {
        &self.points[0]
    }

    /// The navpoint the mission is parked at, if any.
    pub fn current_navpoint(&self) -> Option<&NavPoint> {
        match self.status {
            TravelStatus::AtNavpoint => self.points.get(self.cursor),
            TravelStatus::Travelling => None,
        }
    }

    /// The navpoint the mission is heading to (travelling) or would head to
    /// next (parked).
    pub fn next_navpoint(&self) -> Option<&NavPoint> {
        self.points.get(self.next_index())
    }

    pub fn last_stop(&self) -> &NavPoint {
        &self.points[self.last_stop]
    }

    /// Navpoints not yet reached nor under way.
    pub fn upcoming(&self) -> &[NavPoint] {
        let start = self.next_index().min(self.points.len());
        &self.points[start..]
    }

    /// `true` when no navpoint is left to travel to.
    pub fn is_exhausted(&self) -> bool {
        self.next_navpoint().is_none() && self.status == TravelStatus::AtNavpoint
    }

    /// Great-circle distance from `from` to the navpoint the current leg
    /// ends at.  With no such point the final navpoint stands in, which is
    /// zero once the mission is parked on it.
    pub fn leg_remaining_km(&self, from: Coordinates) -> f64 {
        match self.next_navpoint().or(self.points.last()) {
            Some(p) => from.distance_km(p.location()),
            None => 0.0,
        }
    }

    /// Current leg remaining plus every later leg of the route.
    pub fn total_remaining_km(&self, from: Coordinates) -> f64 {
        let leg_end = self.next_index();
        let later: f64 = self
            .points
            .iter()
            .skip(leg_end + 1)
            .map(NavPoint::distance_km)
            .sum();
        self.leg_remaining_km(from) + later
    }
}

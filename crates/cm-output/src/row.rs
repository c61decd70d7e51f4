//! Plain data row types written by output backends.

use cm_core::SimClock;
use cm_mission::{Mission, MissionEvent};

/// One mission event.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionEventRow {
    pub mission_id: u32,
    pub tick:       u64,
    /// Elapsed simulated time at `tick`.
    pub millisols:  f64,
    pub kind:       &'static str,
    pub detail:     String,
}

impl MissionEventRow {
    pub fn new(event: &MissionEvent, clock: &SimClock) -> Self {
        Self {
            mission_id: event.mission.0,
            tick:       event.tick.0,
            millisols:  clock.ticks_to_millisols(event.tick.0),
            kind:       event.kind.label(),
            detail:     event.kind.detail(),
        }
    }
}

/// The outcome of one finished mission.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionSummaryRow {
    pub mission_id:    u32,
    pub mission_type:  &'static str,
    pub lead:          u32,
    pub members:       u32,
    /// `None` when no vehicle was ever reserved.
    pub vehicle:       Option<u32>,
    pub created_tick:  Option<u64>,
    /// `None` when the mission never left review.
    pub started_tick:  Option<u64>,
    pub finished_tick: Option<u64>,
    /// Every termination reason, `"; "`-separated, first one first.
    pub statuses:      String,
    /// Failure category of the first reason.
    pub category:      &'static str,
    pub success:       bool,
}

impl MissionSummaryRow {
    pub fn new(mission: &Mission) -> Self {
        let statuses = mission.statuses();
        let log = mission.log();
        Self {
            mission_id:    mission.id().0,
            mission_type:  mission.mission_type().as_str(),
            lead:          mission.lead().0,
            members:       mission.roster().len() as u32,
            vehicle:       mission.vehicle().map(|v| v.0),
            created_tick:  log.created().map(|t| t.0),
            started_tick:  log.started().map(|t| t.0),
            finished_tick: log.finished().map(|t| t.0),
            statuses:      statuses.iter().map(|s| s.label()).collect::<Vec<_>>().join("; "),
            category:      statuses.first().map_or("", |s| s.category().as_str()),
            success:       statuses.first().is_some_and(|s| s.is_success()),
        }
    }
}

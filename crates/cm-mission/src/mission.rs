//! The mission base state machine: roster, statuses, phase protocol.

use std::collections::BTreeSet;

use tracing::{debug, error, info, warn};

use cm_core::{Coordinates, MemberId, MissionId, MissionType, SettlementId, Tick, VehicleId};
use cm_route::Route;
use cm_world::{Situation, Vehicle, World};

use crate::provisioning::{best_vehicle, VehicleRequirement};
use crate::{
    MissionContext, MissionError, MissionEvent, MissionEventKind, MissionKind, MissionLog,
    MissionPhase, MissionResult, MissionStatus, PhaseTable, PhasedWorkSite, ResourceProvisioned,
    Transition,
};

/// Roster bound before a vehicle fixes it.
const DEFAULT_CAPACITY: usize = 8;

/// Roster bound for drone missions, whose members never ride along.
const DRONE_CAPACITY: usize = 2;

/// A goal-directed, multi-phase activity of a roster of members and one
/// vehicle.
///
/// Create through the kind constructors in [`missions`][crate::missions].
/// The driver then calls [`perform_mission`][Self::perform_mission] once per
/// tick for every eligible member.  A mission with any status is done and
/// does no further phase work.
pub struct Mission {
    pub(crate) id:          MissionId,
    pub(crate) kind:        MissionKind,
    pub(crate) lead:        MemberId,
    pub(crate) home:        SettlementId,
    pub(crate) roster:      BTreeSet<MemberId>,
    pub(crate) capacity:    usize,
    pub(crate) min_members: usize,
    statuses:               Vec<MissionStatus>,
    pub(crate) phase:       MissionPhase,
    pub(crate) phase_start: Tick,
    pub(crate) phase_ended: bool,
    phase_description:      String,
    table:                  &'static PhaseTable,
    pub(crate) log:         MissionLog,
    events:                 Vec<MissionEvent>,
    pub(crate) route:       Route,
    pub(crate) vehicle:     Option<VehicleId>,
    pub(crate) eva_active:  bool,
    /// Outbound load is aboard (embark) / not yet unloaded (disembark).
    pub(crate) loaded:      bool,
    /// Last `(tick, phase)` whose mission-level step has run.
    last_step:              Option<(Tick, MissionPhase)>,
    /// Last total remaining distance reported (km).
    pub(crate) reported_km: f64,
    /// Set when called off in the field; the mission ends with it on return.
    pub(crate) abort_reason: Option<MissionStatus>,
    /// Help was called but crew are still outside; ends once they are in.
    pub(crate) stranded:    Option<MissionStatus>,
}

impl Mission {
    /// A fresh mission in `Reviewing` with `lead` as its first member.
    ///
    /// The route starts at the lead's home settlement.  A lead the world
    /// does not know ends the mission at once with `LeadNoShow`.
    pub fn new(id: MissionId, kind: MissionKind, lead: MemberId, ctx: &mut MissionContext<'_>) -> Self {
        let table = PhaseTable::for_type(kind.mission_type());
        let (home, origin, name) = match ctx.world.member(lead) {
            Some(m) => {
                let home = m.home();
                match ctx.world.settlement(home) {
                    Some(s) => (home, s.location, s.name.clone()),
                    None => (home, m.location(), String::from("home")),
                }
            }
            None => (SettlementId::INVALID, Coordinates::new(0.0, 0.0), String::from("home")),
        };

        let min_members = kind.min_members();
        let mut mission = Self {
            id,
            kind,
            lead,
            home,
            roster:            BTreeSet::new(),
            capacity:          DEFAULT_CAPACITY,
            min_members,
            statuses:          Vec::new(),
            phase:             MissionPhase::Reviewing,
            phase_start:       ctx.now,
            phase_ended:       false,
            phase_description: String::new(),
            table,
            log:               MissionLog::new(ctx.now),
            events:            Vec::new(),
            route:             Route::new(origin, Some(home), name.clone()),
            vehicle:           None,
            eva_active:        false,
            loaded:            false,
            last_step:         None,
            reported_km:       0.0,
            abort_reason:      None,
            stranded:          None,
        };
        mission.log.add_entry(ctx.now, format!("{} created", mission.kind.mission_type()));
        mission.set_phase(MissionPhase::Reviewing, &name, ctx);

        if !mission.add_member(lead, ctx) {
            mission.end_mission(MissionStatus::LeadNoShow, ctx);
        }
        mission
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> MissionId {
        self.id
    }

    #[inline]
    pub fn mission_type(&self) -> MissionType {
        self.kind.mission_type()
    }

    pub fn kind(&self) -> &MissionKind {
        &self.kind
    }

    #[inline]
    pub fn lead(&self) -> MemberId {
        self.lead
    }

    #[inline]
    pub fn home(&self) -> SettlementId {
        self.home
    }

    pub fn roster(&self) -> &BTreeSet<MemberId> {
        &self.roster
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn min_members(&self) -> usize {
        self.min_members
    }

    pub fn statuses(&self) -> &[MissionStatus] {
        &self.statuses
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        !self.statuses.is_empty()
    }

    #[inline]
    pub fn phase(&self) -> MissionPhase {
        self.phase
    }

    #[inline]
    pub fn phase_start(&self) -> Tick {
        self.phase_start
    }

    #[inline]
    pub fn is_phase_ended(&self) -> bool {
        self.phase_ended
    }

    pub fn phase_description(&self) -> &str {
        &self.phase_description
    }

    pub fn log(&self) -> &MissionLog {
        &self.log
    }

    #[inline]
    pub fn vehicle(&self) -> Option<VehicleId> {
        self.vehicle
    }

    #[inline]
    pub fn is_eva_active(&self) -> bool {
        self.eva_active
    }

    /// Why the mission was called off while its vehicle was out, if it was.
    #[inline]
    pub fn abort_reason(&self) -> Option<MissionStatus> {
        self.abort_reason
    }

    /// Work phase entered at non-base stops, if this kind has one.
    pub fn work_phase(&self) -> Option<MissionPhase> {
        self.kind.work_phase()
    }

    /// Events emitted since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<MissionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[MissionEvent] {
        &self.events
    }

    pub(crate) fn emit(&mut self, tick: Tick, kind: MissionEventKind) {
        self.events.push(MissionEvent { mission: self.id, tick, kind });
    }

    pub(crate) fn vehicle_id(&self) -> MissionResult<VehicleId> {
        self.vehicle.ok_or(MissionError::NoVehicle(self.id))
    }

    pub(crate) fn vehicle_ref<'w>(&self, world: &'w dyn World) -> MissionResult<&'w Vehicle> {
        let id = self.vehicle_id()?;
        world.vehicle(id).ok_or(MissionError::VehicleMissing(id))
    }

    pub(crate) fn vehicle_mut<'w>(&self, world: &'w mut dyn World) -> MissionResult<&'w mut Vehicle> {
        let id = self.vehicle_id()?;
        world.vehicle_mut(id).ok_or(MissionError::VehicleMissing(id))
    }

    /// `true` if the stop the mission is parked at still holds work for it.
    pub(crate) fn has_work_at_current_stop(&self) -> bool {
        match &self.kind {
            MissionKind::RescueSalvage { target, coupled, .. } => target.is_some() && !coupled,
            MissionKind::Trade { traded, .. } => !traded,
            MissionKind::EmergencySupply { delivered, .. } => !delivered,
            _ => !self.route.is_rerouted(),
        }
    }

    // ── Roster ────────────────────────────────────────────────────────────

    /// Attach a member.  No-op returning `false` when the mission is done,
    /// full, or the member is unknown or on another mission.
    pub fn add_member(&mut self, member: MemberId, ctx: &mut MissionContext<'_>) -> bool {
        if self.is_done() || self.roster.len() >= self.capacity || self.roster.contains(&member) {
            return false;
        }
        let Some(m) = ctx.world.member(member) else { return false };
        if m.mission().is_some_and(|other| other != self.id) {
            return false;
        }
        if ctx.world.set_member_mission(member, Some(self.id)).is_err() {
            return false;
        }
        self.roster.insert(member);
        debug!(mission = %self.id, %member, "member joined");
        self.emit(ctx.now, MissionEventKind::RosterChanged { member, joined: true });
        true
    }

    /// Detach a member.  No-op returning `false` when the mission is done or
    /// the member is not on the roster.
    pub fn remove_member(&mut self, member: MemberId, ctx: &mut MissionContext<'_>) -> bool {
        if self.is_done() || !self.roster.remove(&member) {
            return false;
        }
        if let Err(e) = ctx.world.set_member_mission(member, None) {
            warn!(mission = %self.id, %member, %e, "could not detach member");
        }
        debug!(mission = %self.id, %member, "member left");
        self.emit(ctx.now, MissionEventKind::RosterChanged { member, joined: false });
        true
    }

    // ── Recruitment ───────────────────────────────────────────────────────

    /// Suitability of `candidate` for this mission; zero or less means it
    /// cannot join.
    pub fn mission_qualification(&self, candidate: MemberId, world: &dyn World) -> f64 {
        let Some(m) = world.member(candidate) else { return 0.0 };
        if !m.is_alive()
            || m.has_serious_medical_problem()
            || m.mission().is_some_and(|other| other != self.id)
            || m.situation() != Situation::InSettlement(self.home)
        {
            return 0.0;
        }
        let kind = self.mission_type();
        let mut score = m.mission_experience(kind).max(1.0) * m.qualification_weight();
        match &self.kind {
            MissionKind::FieldStudy { .. } if candidate == self.lead => score += 2.0,
            MissionKind::RescueSalvage { .. } if m.can_drive() => score += 1.0,
            _ => {}
        }
        if kind.is_eva() && m.is_eva_fit() {
            score += 1.0;
        }
        score
    }

    /// Rank `candidates` by qualification and add them, best first, until
    /// the roster is full.  Equal scores keep candidate order.  Returns how
    /// many joined.
    pub fn recruit_members(&mut self, candidates: &[MemberId], ctx: &mut MissionContext<'_>) -> usize {
        let mut ranked: Vec<(MemberId, f64)> = candidates
            .iter()
            .filter(|c| !self.roster.contains(c))
            .map(|&c| (c, self.mission_qualification(c, &*ctx.world)))
            .filter(|&(_, score)| score > 0.0)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut added = 0;
        for (candidate, _) in ranked {
            if self.roster.len() >= self.capacity {
                break;
            }
            if self.add_member(candidate, ctx) {
                added += 1;
            }
        }
        added
    }

    // ── Vehicle reservation ───────────────────────────────────────────────

    /// Reserve the best available vehicle at home and size the roster bound
    /// to it.  Ends the mission with `NoAvailableVehicle` when none fits.
    pub fn reserve_vehicle(&mut self, ctx: &mut MissionContext<'_>) -> bool {
        if self.is_done() {
            return false;
        }
        let requirement = VehicleRequirement::for_kind(&self.kind, self.min_members);
        let Some(id) = best_vehicle(&*ctx.world, self.home, &requirement) else {
            self.end_mission(MissionStatus::NoAvailableVehicle, ctx);
            return false;
        };
        let Some(v) = ctx.world.vehicle_mut(id) else {
            self.end_mission(MissionStatus::NoAvailableVehicle, ctx);
            return false;
        };
        v.reserved_by = Some(self.id);
        self.capacity = match v.kind {
            cm_world::VehicleKind::Rover => v.crew_capacity,
            cm_world::VehicleKind::Drone => DRONE_CAPACITY,
        };
        let name = v.name.clone();
        self.vehicle = Some(id);
        self.log.add_entry(ctx.now, format!("reserved {name}"));
        debug!(mission = %self.id, vehicle = %id, "vehicle reserved");
        true
    }

    // ── Phase protocol ────────────────────────────────────────────────────

    /// Enter `phase`, resetting the phase clock.  `subject` fills the
    /// phase's description template.
    pub(crate) fn set_phase(&mut self, phase: MissionPhase, subject: &str, ctx: &MissionContext<'_>) {
        debug_assert!(self.table.contains(phase), "phase {phase} not registered");
        self.phase = phase;
        self.phase_start = ctx.now;
        self.phase_ended = false;
        self.phase_description = phase.describe(subject);
        self.eva_active = phase.is_eva();
        self.kind.on_enter_phase(phase);
        if phase == MissionPhase::Embarking {
            self.log.mark_started(ctx.now);
        }
        self.log.add_entry(ctx.now, self.phase_description.clone());
        info!(mission = %self.id, %phase, description = %self.phase_description, "phase changed");
        let description = self.phase_description.clone();
        self.emit(ctx.now, MissionEventKind::PhaseChanged { phase, description });
    }

    /// Apply the current phase's transition rule.
    fn determine_new_phase(&mut self, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        let rule = self
            .table
            .rule(self.phase)
            .ok_or(MissionError::UnregisteredPhase { mission: self.id, phase: self.phase })?;
        match rule(self) {
            Transition::Enter(phase) => {
                let subject = self.phase_subject(phase, &*ctx.world);
                self.set_phase(phase, &subject, ctx);
            }
            Transition::StartLeg => self.start_leg(ctx)?,
            Transition::Finish(status) => self.end_mission(status, ctx),
        }
        Ok(())
    }

    fn phase_subject(&self, phase: MissionPhase, world: &dyn World) -> String {
        match (phase, &self.kind) {
            (MissionPhase::Rendezvous, MissionKind::RescueSalvage { target: Some(t), .. }) => {
                world.vehicle(*t).map_or_else(|| t.to_string(), |v| v.name.clone())
            }
            _ => self
                .route
                .current_navpoint()
                .map_or_else(|| String::from("route"), |p| p.description().to_owned()),
        }
    }

    /// One member's turn this tick.  Returns `false` if the mission did
    /// nothing (done, or `member` is not on the roster).
    pub fn perform_mission(&mut self, member: MemberId, ctx: &mut MissionContext<'_>) -> bool {
        if self.is_done() || !self.roster.contains(&member) {
            return false;
        }
        let mut result = Ok(());
        if self.phase_ended {
            result = self.determine_new_phase(ctx);
        }
        if result.is_ok() && !self.is_done() {
            result = self.perform_phase(member, ctx);
        }
        if let Err(e) = result {
            self.fail(e, ctx);
        }
        true
    }

    fn fail(&mut self, e: MissionError, ctx: &mut MissionContext<'_>) {
        error!(mission = %self.id, phase = %self.phase, error = %e, "mission invariant violated");
        self.log.add_entry(ctx.now, format!("internal problem: {e}"));
        self.end_mission(MissionStatus::InternalProblem, ctx);
    }

    fn perform_phase(&mut self, member: MemberId, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        let first = self.last_step != Some((ctx.now, self.phase));
        self.last_step = Some((ctx.now, self.phase));
        match self.phase {
            MissionPhase::Reviewing if first => self.review(ctx),
            MissionPhase::Reviewing => Ok(()),
            MissionPhase::Embarking => self.embark(member, first, ctx),
            MissionPhase::Travelling if first => self.travel(ctx),
            MissionPhase::Travelling => Ok(()),
            MissionPhase::Disembarking => self.disembark(member, first, ctx),
            MissionPhase::ResearchSite | MissionPhase::ExploringSite | MissionPhase::MiningSite => {
                self.perform_eva_phase(member, first, ctx)
            }
            MissionPhase::Rendezvous if first => self.rendezvous(ctx),
            MissionPhase::TradeNegotiation if first => self.negotiate_trade(ctx),
            MissionPhase::SupplyDelivery if first => self.deliver_supplies(ctx),
            MissionPhase::Rendezvous | MissionPhase::TradeNegotiation | MissionPhase::SupplyDelivery => Ok(()),
        }
    }

    /// Approve or reject the plan.
    fn review(&mut self, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        let lead_present = self.roster.contains(&self.lead)
            && ctx.world.member(self.lead).is_some_and(|m| m.is_alive());
        if !lead_present {
            self.end_mission(MissionStatus::LeadNoShow, ctx);
        } else if self.roster.len() < self.min_members {
            self.end_mission(MissionStatus::NotEnoughMembers, ctx);
        } else if !self.is_vehicle_loadable(ctx)? {
            self.end_mission(MissionStatus::VehicleNotLoadable, ctx);
        } else {
            self.log.add_entry(ctx.now, "plan approved");
            self.phase_ended = true;
        }
        Ok(())
    }

    // ── Termination ───────────────────────────────────────────────────────

    /// Call the mission off with `reason`.
    ///
    /// A vehicle that has not left, or is already parked, is unloaded where
    /// it stands and its crew walk in before the mission ends.  A vehicle
    /// out in the field first heads for the nearest reachable settlement;
    /// the mission then ends with `reason` once it has disembarked there.
    /// With nobody left able to drive, or nowhere in reach, the beacon goes
    /// on instead.
    pub fn abort_mission(&mut self, reason: MissionStatus, ctx: &mut MissionContext<'_>) {
        if self.is_done() {
            self.end_mission(reason, ctx);
            return;
        }
        let departed = !matches!(self.phase, MissionPhase::Reviewing | MissionPhase::Embarking);
        let in_field = departed
            && self
                .vehicle
                .and_then(|id| ctx.world.vehicle(id))
                .is_some_and(|v| !v.is_parked());

        if !in_field {
            if let Err(e) = self.stand_down(ctx) {
                warn!(mission = %self.id, error = %e, "could not stand down");
            }
            self.end_mission(reason, ctx);
            return;
        }

        if self.abort_reason.is_none() {
            self.abort_reason = Some(reason);
            self.log.add_entry(ctx.now, format!("abort requested: {reason}"));
            info!(mission = %self.id, ?reason, phase = %self.phase, "abort requested in the field");
        }
        self.eva_active = false;
        if let Err(e) = self.head_for_shelter(reason, ctx) {
            self.fail(e, ctx);
        }
    }

    fn head_for_shelter(&mut self, reason: MissionStatus, ctx: &mut MissionContext<'_>) -> MissionResult<()> {
        if !self.anyone_can_drive(&*ctx.world)? {
            return self.get_help(reason, ctx);
        }
        if !self.route.is_rerouted() {
            self.determine_emergency_destination(reason, ctx)?;
        }
        Ok(())
    }

    /// End with every pending reason: an abort first, then a call for help
    /// that waited on crew outside, then `status`.
    pub(crate) fn end_with(&mut self, status: MissionStatus, ctx: &mut MissionContext<'_>) {
        for reason in [self.abort_reason, self.stranded, Some(status)].into_iter().flatten() {
            if !self.statuses.contains(&reason) {
                self.end_mission(reason, ctx);
            }
        }
    }

    /// Finish the mission with `status`.
    ///
    /// Idempotent: once done, later calls are ignored, except that further
    /// distinct reasons found in the same tick are appended.  Members are
    /// released for new missions and the vehicle reservation is dropped.
    pub fn end_mission(&mut self, status: MissionStatus, ctx: &mut MissionContext<'_>) {
        if self.is_done() {
            let same_tick = self.log.finished() == Some(ctx.now);
            if same_tick && !self.statuses.contains(&status) {
                self.statuses.push(status);
                self.emit(ctx.now, MissionEventKind::StatusChanged { status });
            } else {
                warn!(mission = %self.id, ?status, "end requested on finished mission, ignored");
            }
            return;
        }

        self.statuses.push(status);
        self.eva_active = false;
        self.log.add_entry(ctx.now, format!("finished: {status}"));
        self.log.mark_finished(ctx.now);
        info!(mission = %self.id, ?status, phase = %self.phase, "mission ended");

        for &member in &self.roster {
            if let Err(e) = ctx.world.set_member_mission(member, None) {
                warn!(mission = %self.id, %member, %e, "could not release member");
            }
        }
        if let Some(v) = self.vehicle.and_then(|id| ctx.world.vehicle_mut(id)) {
            if v.reserved_by == Some(self.id) {
                v.reserved_by = None;
            }
            v.operator = None;
        }
        if let MissionKind::RescueSalvage { target: Some(t), coupled: false, .. } = self.kind {
            if let Some(v) = ctx.world.vehicle_mut(t).filter(|v| v.reserved_by == Some(self.id)) {
                v.reserved_by = None;
            }
        }
        self.emit(ctx.now, MissionEventKind::StatusChanged { status });
    }
}

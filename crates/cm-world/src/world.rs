//! The collaborator traits a mission calls into.
//!
//! # Two traits
//!
//! - [`World`]: lookups plus the storage operations missions perform
//!   directly (reserve/retrieve/store a vehicle, move resources, attach a
//!   member).  Missions only ever hold it as `&mut dyn World` for the
//!   duration of one `perform_mission` call.
//! - [`TaskScheduler`]: advances every member's current [`Task`] by one
//!   tick.  Only the driver calls it, after all missions have acted.

use cm_core::{
    Coordinates, MemberId, MissionConfig, MissionId, Resource, SettlementId, Tick, VehicleId,
};
use tracing::debug;

use crate::{Inventory, MissionMember, Settlement, Situation, Task, Vehicle, WorldError, WorldResult};

/// Something that holds an inventory.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Holder {
    Settlement(SettlementId),
    Vehicle(VehicleId),
}

// ── World ─────────────────────────────────────────────────────────────────────

pub trait World {
    // ── Lookups ───────────────────────────────────────────────────────────

    fn member(&self, id: MemberId) -> Option<&dyn MissionMember>;
    fn member_mut(&mut self, id: MemberId) -> Option<&mut dyn MissionMember>;
    /// Every member, ascending.
    fn member_ids(&self) -> Vec<MemberId>;

    fn vehicle(&self, id: VehicleId) -> Option<&Vehicle>;
    fn vehicle_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle>;
    /// Every vehicle, ascending.
    fn vehicle_ids(&self) -> Vec<VehicleId>;

    fn settlement(&self, id: SettlementId) -> Option<&Settlement>;
    fn settlement_mut(&mut self, id: SettlementId) -> Option<&mut Settlement>;
    /// Every settlement, ascending.
    fn settlement_ids(&self) -> Vec<SettlementId>;

    /// The settlement closest (great-circle) to `at`.
    fn nearest_settlement(&self, at: Coordinates) -> Option<SettlementId>;

    // ── Environment ───────────────────────────────────────────────────────

    /// Solar irradiance at `at` right now (W/m²).
    fn solar_irradiance(&self, at: Coordinates) -> f64;

    /// `true` if `at` lies in a polar region currently in permanent night.
    fn is_polar_dark(&self, at: Coordinates) -> bool;

    /// Members inside `settlement` who draw on its life support.
    fn population(&self, settlement: SettlementId) -> usize {
        self.member_ids()
            .into_iter()
            .filter_map(|id| self.member(id))
            .filter(|m| m.needs_life_support() && m.situation() == Situation::InSettlement(settlement))
            .count()
    }

    // ── Storage (provided) ────────────────────────────────────────────────

    fn inventory(&self, holder: Holder) -> Option<&Inventory> {
        match holder {
            Holder::Settlement(s) => self.settlement(s).map(|s| &s.inventory),
            Holder::Vehicle(v) => self.vehicle(v).map(|v| &v.inventory),
        }
    }

    fn inventory_mut(&mut self, holder: Holder) -> WorldResult<&mut Inventory> {
        match holder {
            Holder::Settlement(s) => self
                .settlement_mut(s)
                .map(|s| &mut s.inventory)
                .ok_or(WorldError::SettlementNotFound(s)),
            Holder::Vehicle(v) => self
                .vehicle_mut(v)
                .map(|v| &mut v.inventory)
                .ok_or(WorldError::VehicleNotFound(v)),
        }
    }

    /// Move `amount` of `resource` between holders; all-or-nothing.
    fn transfer(&mut self, from: Holder, to: Holder, resource: Resource, amount: f64) -> WorldResult<()> {
        if amount <= 0.0 {
            return Ok(());
        }
        let remaining = self.inventory_mut(to)?.remaining_capacity(resource);
        if amount > remaining + f64::EPSILON {
            return Err(WorldError::CapacityExceeded { resource, requested: amount, remaining });
        }
        self.inventory_mut(from)?.retrieve(resource, amount)?;
        self.inventory_mut(to)?.store(resource, amount)
    }

    /// Take a parked vehicle out of its garage.
    fn retrieve_vehicle(&mut self, vehicle: VehicleId, settlement: SettlementId) -> WorldResult<()> {
        let parked = self
            .settlement_mut(settlement)
            .ok_or(WorldError::SettlementNotFound(settlement))?
            .garage
            .remove(&vehicle);
        if !parked {
            return Err(WorldError::VehicleNotParked { vehicle, settlement });
        }
        let v = self.vehicle_mut(vehicle).ok_or(WorldError::VehicleNotFound(vehicle))?;
        v.parked_at = None;
        Ok(())
    }

    /// Park a vehicle (and anything it tows) in a settlement's garage.
    fn store_vehicle(&mut self, vehicle: VehicleId, settlement: SettlementId) -> WorldResult<()> {
        let location = self
            .settlement(settlement)
            .ok_or(WorldError::SettlementNotFound(settlement))?
            .location;
        let v = self.vehicle_mut(vehicle).ok_or(WorldError::VehicleNotFound(vehicle))?;
        v.parked_at = Some(settlement);
        v.location = location;
        v.operator = None;
        if let Some(s) = self.settlement_mut(settlement) {
            s.garage.insert(vehicle);
        }
        Ok(())
    }

    /// Attach (or detach) a member to a mission.
    fn set_member_mission(&mut self, member: MemberId, mission: Option<MissionId>) -> WorldResult<()> {
        let m = self.member_mut(member).ok_or(WorldError::MemberNotFound(member))?;
        m.set_mission(mission);
        if mission.is_none() {
            m.clear_task();
        }
        Ok(())
    }

    /// Hand a member a new task, replacing whatever it was doing.
    fn assign_task(&mut self, member: MemberId, task: Task) -> WorldResult<()> {
        let m = self.member_mut(member).ok_or(WorldError::MemberNotFound(member))?;
        debug!(%member, task = task.name(), "task assigned");
        m.assign_task(task);
        Ok(())
    }

    /// Put a member inside a settlement, taking it out of any vehicle crew.
    fn move_into_settlement(&mut self, member: MemberId, settlement: SettlementId) -> WorldResult<()> {
        let location = self
            .settlement(settlement)
            .ok_or(WorldError::SettlementNotFound(settlement))?
            .location;
        let previous = self
            .member(member)
            .ok_or(WorldError::MemberNotFound(member))?
            .situation();
        if let Some(v) = previous.vehicle().and_then(|v| self.vehicle_mut(v)) {
            v.crew.remove(&member);
        }
        let m = self.member_mut(member).ok_or(WorldError::MemberNotFound(member))?;
        m.relocate(Situation::InSettlement(settlement), location);
        m.clear_task();
        Ok(())
    }
}

// ── TaskScheduler ─────────────────────────────────────────────────────────────

/// Advances every member's current task by one tick.
pub trait TaskScheduler {
    /// Play out `millisols` of simulated time ending at `now`.
    fn advance(&mut self, now: Tick, millisols: f64, config: &MissionConfig);
}

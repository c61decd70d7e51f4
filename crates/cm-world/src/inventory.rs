//! Capacity-bounded resource storage shared by vehicles and settlements.
//!
//! Amount resources share one general mass limit (`general_capacity_kg`).
//! Any resource may additionally carry its own cap (a fuel tank, a suit
//! rack).  Equipment is only bounded by its own cap.

use cm_core::{Resource, ResourceMap};

use crate::{WorldError, WorldResult};

/// Stored amounts plus the limits they must stay within.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Inventory {
    /// Mass limit across all amount resources (kg).
    pub general_capacity_kg: f64,
    /// Per-resource caps.  Absent entries fall back to the general limit.
    pub caps:   ResourceMap,
    pub stored: ResourceMap,
}

impl Inventory {
    pub fn new(general_capacity_kg: f64) -> Self {
        Self { general_capacity_kg, caps: ResourceMap::new(), stored: ResourceMap::new() }
    }

    /// Storage with no limits, used for settlements.
    pub fn unbounded() -> Self {
        Self::new(f64::INFINITY)
    }

    /// Builder-style per-resource cap.
    pub fn with_cap(mut self, resource: Resource, cap: f64) -> Self {
        self.caps.insert(resource, cap);
        self
    }

    #[inline]
    pub fn stored(&self, resource: Resource) -> f64 {
        self.stored.get(&resource).copied().unwrap_or(0.0)
    }

    /// The most of `resource` this inventory could ever hold.
    pub fn capacity(&self, resource: Resource) -> f64 {
        match self.caps.get(&resource) {
            Some(&cap) if resource.is_equipment() => cap,
            Some(&cap) => cap.min(self.general_capacity_kg),
            None if resource.is_equipment() => f64::INFINITY,
            None => self.general_capacity_kg,
        }
    }

    /// Total mass of stored amount resources.
    pub fn stored_mass(&self) -> f64 {
        cm_core::resource::total_mass(&self.stored)
    }

    /// How much more of `resource` fits right now.
    pub fn remaining_capacity(&self, resource: Resource) -> f64 {
        let own = self.capacity(resource) - self.stored(resource);
        if resource.is_equipment() {
            return own.max(0.0);
        }
        own.min(self.remaining_general_capacity()).max(0.0)
    }

    /// Mass capacity left for any amount resource.
    pub fn remaining_general_capacity(&self) -> f64 {
        (self.general_capacity_kg - self.stored_mass()).max(0.0)
    }

    pub fn store(&mut self, resource: Resource, amount: f64) -> WorldResult<()> {
        if amount <= 0.0 {
            return Ok(());
        }
        let remaining = self.remaining_capacity(resource);
        if amount > remaining + f64::EPSILON {
            return Err(WorldError::CapacityExceeded { resource, requested: amount, remaining });
        }
        *self.stored.entry(resource).or_insert(0.0) += amount;
        Ok(())
    }

    pub fn retrieve(&mut self, resource: Resource, amount: f64) -> WorldResult<()> {
        if amount <= 0.0 {
            return Ok(());
        }
        let available = self.stored(resource);
        if amount > available + f64::EPSILON {
            return Err(WorldError::InsufficientStock { resource, requested: amount, available });
        }
        self.set_stored(resource, available - amount);
        Ok(())
    }

    /// Retrieve as much of `amount` as is stored; returns what was taken.
    pub fn take_up_to(&mut self, resource: Resource, amount: f64) -> f64 {
        let taken = amount.min(self.stored(resource)).max(0.0);
        let left = self.stored(resource) - taken;
        self.set_stored(resource, left);
        taken
    }

    /// Store as much of `amount` as fits; returns what was stored.
    pub fn store_up_to(&mut self, resource: Resource, amount: f64) -> f64 {
        let stored = amount.min(self.remaining_capacity(resource)).max(0.0);
        if stored > 0.0 {
            *self.stored.entry(resource).or_insert(0.0) += stored;
        }
        stored
    }

    /// Empty the inventory, returning everything it held.
    pub fn drain(&mut self) -> ResourceMap {
        std::mem::take(&mut self.stored)
    }

    fn set_stored(&mut self, resource: Resource, amount: f64) {
        if amount <= f64::EPSILON {
            self.stored.remove(&resource);
        } else {
            self.stored.insert(resource, amount);
        }
    }
}

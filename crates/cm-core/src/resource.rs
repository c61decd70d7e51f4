//! Resources and equipment carried by vehicles and stored in settlements.
//!
//! Amount resources are in kilograms; equipment (`EvaSuit`, `SparePart`) is
//! counted in whole units but stored as `f64` so one map type covers both.

use std::collections::BTreeMap;

/// Everything a mission loads, consumes, collects, or trades.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Resource {
    Oxygen,
    Water,
    Food,
    /// Rover fuel.
    Methane,
    /// Rock samples gathered while exploring.
    RockSamples,
    /// Ore gathered while mining.
    Minerals,
    /// Trade good.
    Regolith,
    EvaSuit,
    SparePart,
}

impl Resource {
    /// Resources every crew member consumes.
    pub const LIFE_SUPPORT: [Resource; 3] = [Resource::Oxygen, Resource::Water, Resource::Food];

    /// `true` for items counted in whole units.
    #[inline]
    pub fn is_equipment(self) -> bool {
        matches!(self, Resource::EvaSuit | Resource::SparePart)
    }

    #[inline]
    pub fn is_life_support(self) -> bool {
        matches!(self, Resource::Oxygen | Resource::Water | Resource::Food)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::Oxygen      => "oxygen",
            Resource::Water       => "water",
            Resource::Food        => "food",
            Resource::Methane     => "methane",
            Resource::RockSamples => "rock samples",
            Resource::Minerals    => "minerals",
            Resource::Regolith    => "regolith",
            Resource::EvaSuit     => "eva suit",
            Resource::SparePart   => "spare part",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered resource → amount map.  `BTreeMap` keeps iteration (and so load
/// order and log output) deterministic.
pub type ResourceMap = BTreeMap<Resource, f64>;

/// Add `amount` of `resource` to `map`.
pub fn add_amount(map: &mut ResourceMap, resource: Resource, amount: f64) {
    if amount > 0.0 {
        *map.entry(resource).or_insert(0.0) += amount;
    }
}

/// Merge every entry of `other` into `map`.
pub fn merge(map: &mut ResourceMap, other: &ResourceMap) {
    for (&resource, &amount) in other {
        add_amount(map, resource, amount);
    }
}

/// Sum of all amount (non-equipment) entries, in kilograms.
pub fn total_mass(map: &ResourceMap) -> f64 {
    map.iter()
        .filter(|(r, _)| !r.is_equipment())
        .map(|(_, &a)| a)
        .sum()
}

//! Immutable waypoints.

use cm_core::{Coordinates, SettlementId};

/// A waypoint on a mission route.
///
/// `distance_km` is the great-circle distance from the previous point of
/// the owning route, fixed when the point is appended.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavPoint {
    location:    Coordinates,
    settlement:  Option<SettlementId>,
    description: String,
    distance_km: f64,
}

impl NavPoint {
    pub fn new(
        location:    Coordinates,
        settlement:  Option<SettlementId>,
        description: impl Into<String>,
        previous:    Option<Coordinates>,
    ) -> Self {
        Self {
            location,
            settlement,
            description: description.into(),
            distance_km: previous.map_or(0.0, |p| p.distance_km(location)),
        }
    }

    #[inline]
    pub fn location(&self) -> Coordinates {
        self.location
    }

    /// The settlement at this point, if it is a base.
    #[inline]
    pub fn settlement(&self) -> Option<SettlementId> {
        self.settlement
    }

    #[inline]
    pub fn is_base(&self) -> bool {
        self.settlement.is_some()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Distance from the previous navpoint (km).
    #[inline]
    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }
}

impl std::fmt::Display for NavPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.description, self.location)
    }
}

//! Termination reasons.
//!
//! A mission is done as soon as its status list is non-empty.  Reasons are
//! data, not errors: they never cross the mission boundary as `Err`.

/// Coarse grouping of termination reasons for reporting.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailureCategory {
    /// The mission could not be set up (no vehicle, site, partner…).
    Setup,
    /// Supplies could not be loaded or ran short.
    Resource,
    /// A reserved asset could not be taken out of storage.
    Logistics,
    /// Not enough able members.
    Member,
    /// Ended from outside the mission.
    External,
    Success,
    /// A broken invariant inside the engine.
    Internal,
}

impl FailureCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureCategory::Setup     => "setup",
            FailureCategory::Resource  => "resource",
            FailureCategory::Logistics => "logistics",
            FailureCategory::Member    => "member",
            FailureCategory::External  => "external",
            FailureCategory::Success   => "success",
            FailureCategory::Internal  => "internal",
        }
    }
}

/// Why a mission ended.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MissionStatus {
    NoAvailableVehicle,
    NoResearchStudy,
    NoDestinationFound,
    NoTradingPartner,
    NoSettlementInNeed,
    NoMiningSite,
    TargetVehicleNotFound,
    CannotLoadResources,
    VehicleNotLoadable,
    NotEnoughResources,
    CannotRetrieveVehicle,
    NotEnoughMembers,
    LeadNoShow,
    MedicalEmergency,
    NoEmergencySettlementFound,
    NotApproved,
    AbortedByOperator,
    Accomplished,
    InternalProblem,
}

impl MissionStatus {
    /// Stable label shown in logs and output rows.
    pub fn label(self) -> &'static str {
        match self {
            MissionStatus::NoAvailableVehicle         => "no available vehicle",
            MissionStatus::NoResearchStudy            => "no research study",
            MissionStatus::NoDestinationFound         => "no destination found",
            MissionStatus::NoTradingPartner           => "no trading partner",
            MissionStatus::NoSettlementInNeed         => "no settlement in need",
            MissionStatus::NoMiningSite               => "no mining site",
            MissionStatus::TargetVehicleNotFound      => "target vehicle not found",
            MissionStatus::CannotLoadResources        => "cannot load resources",
            MissionStatus::VehicleNotLoadable         => "vehicle not loadable",
            MissionStatus::NotEnoughResources         => "not enough resources",
            MissionStatus::CannotRetrieveVehicle      => "cannot retrieve vehicle",
            MissionStatus::NotEnoughMembers           => "not enough members",
            MissionStatus::LeadNoShow                 => "lead no show",
            MissionStatus::MedicalEmergency           => "medical emergency",
            MissionStatus::NoEmergencySettlementFound => "no emergency settlement found",
            MissionStatus::NotApproved                => "not approved",
            MissionStatus::AbortedByOperator          => "aborted by operator",
            MissionStatus::Accomplished               => "accomplished",
            MissionStatus::InternalProblem            => "internal problem",
        }
    }

    pub fn category(self) -> FailureCategory {
        use MissionStatus::*;
        match self {
            NoAvailableVehicle | NoResearchStudy | NoDestinationFound | NoTradingPartner
            | NoSettlementInNeed | NoMiningSite | TargetVehicleNotFound | NotApproved => {
                FailureCategory::Setup
            }
            CannotLoadResources | VehicleNotLoadable | NotEnoughResources
            | NoEmergencySettlementFound => FailureCategory::Resource,
            CannotRetrieveVehicle => FailureCategory::Logistics,
            NotEnoughMembers | LeadNoShow | MedicalEmergency => FailureCategory::Member,
            AbortedByOperator => FailureCategory::External,
            Accomplished => FailureCategory::Success,
            InternalProblem => FailureCategory::Internal,
        }
    }

    #[inline]
    pub fn is_success(self) -> bool {
        self == MissionStatus::Accomplished
    }
}

impl std::fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

//! Mission kind and science discipline enums shared across all mission crates.

/// The closed set of mission kinds the engine runs.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MissionType {
    FieldStudy,
    Exploration,
    Mining,
    RescueSalvage,
    TravelToSettlement,
    Trade,
    EmergencySupply,
}

impl MissionType {
    pub const ALL: [MissionType; 7] = [
        MissionType::FieldStudy,
        MissionType::Exploration,
        MissionType::Mining,
        MissionType::RescueSalvage,
        MissionType::TravelToSettlement,
        MissionType::Trade,
        MissionType::EmergencySupply,
    ];

    /// `true` for kinds whose members leave the vehicle to work on site.
    #[inline]
    pub fn is_eva(self) -> bool {
        matches!(
            self,
            MissionType::FieldStudy | MissionType::Exploration | MissionType::Mining
        )
    }

    /// Label used in logs and output rows.
    pub fn as_str(self) -> &'static str {
        match self {
            MissionType::FieldStudy         => "field study",
            MissionType::Exploration        => "exploration",
            MissionType::Mining             => "mining",
            MissionType::RescueSalvage      => "rescue/salvage vehicle",
            MissionType::TravelToSettlement => "travel to settlement",
            MissionType::Trade              => "trade",
            MissionType::EmergencySupply    => "emergency supply",
        }
    }
}

impl std::fmt::Display for MissionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Research discipline of a field study.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Science {
    Areology,
    Biology,
    Meteorology,
}

impl Science {
    pub fn as_str(self) -> &'static str {
        match self {
            Science::Areology    => "areology",
            Science::Biology     => "biology",
            Science::Meteorology => "meteorology",
        }
    }
}

impl std::fmt::Display for Science {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

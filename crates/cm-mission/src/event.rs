//! Notifications a mission emits for observers (UI, history, output).

use cm_core::{MemberId, MissionId, SettlementId, Tick, VehicleId};

use crate::{MissionPhase, MissionStatus};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MissionEventKind {
    RosterChanged { member: MemberId, joined: bool },
    PhaseChanged { phase: MissionPhase, description: String },
    /// Total remaining distance was recomputed to a new value (km).
    DistanceChanged { remaining_km: f64 },
    StatusChanged { status: MissionStatus },
    /// The route was cut short and redirected to a settlement.
    EmergencyDestination { settlement: SettlementId, reason: MissionStatus },
    /// A beacon switched on (with the reason) or off.
    EmergencyBeacon { vehicle: VehicleId, on: bool, reason: Option<MissionStatus> },
    /// A rescue vehicle reached and coupled with its target.
    Rendezvous { target: VehicleId },
    VehicleSalvaged { vehicle: VehicleId, settlement: SettlementId },
    PersonRescued { member: MemberId, settlement: SettlementId },
    BodyRetrieved { member: MemberId, settlement: SettlementId },
    /// Emergency supplies handed to a settlement (kg).
    SuppliesDelivered { settlement: SettlementId, mass_kg: f64 },
}

impl MissionEventKind {
    /// Short label used as the event type column in output rows.
    pub fn label(&self) -> &'static str {
        match self {
            MissionEventKind::RosterChanged { .. }        => "roster_changed",
            MissionEventKind::PhaseChanged { .. }         => "phase_changed",
            MissionEventKind::DistanceChanged { .. }      => "distance_changed",
            MissionEventKind::StatusChanged { .. }        => "status_changed",
            MissionEventKind::EmergencyDestination { .. } => "emergency_destination",
            MissionEventKind::EmergencyBeacon { .. }      => "emergency_beacon",
            MissionEventKind::Rendezvous { .. }           => "rendezvous",
            MissionEventKind::VehicleSalvaged { .. }      => "vehicle_salvaged",
            MissionEventKind::PersonRescued { .. }        => "person_rescued",
            MissionEventKind::BodyRetrieved { .. }        => "body_retrieved",
            MissionEventKind::SuppliesDelivered { .. }    => "supplies_delivered",
        }
    }

    /// Free-text detail for output rows.
    pub fn detail(&self) -> String {
        match self {
            MissionEventKind::RosterChanged { member, joined } => {
                format!("{member} {}", if *joined { "joined" } else { "left" })
            }
            MissionEventKind::PhaseChanged { phase, description } => format!("{phase}: {description}"),
            MissionEventKind::DistanceChanged { remaining_km } => format!("{remaining_km:.3} km"),
            MissionEventKind::StatusChanged { status } => status.label().to_owned(),
            MissionEventKind::EmergencyDestination { settlement, reason } => {
                format!("{settlement} ({reason})")
            }
            MissionEventKind::EmergencyBeacon { vehicle, on, reason } => match reason {
                Some(reason) => format!("{vehicle} beacon {} ({reason})", if *on { "on" } else { "off" }),
                None => format!("{vehicle} beacon {}", if *on { "on" } else { "off" }),
            },
            MissionEventKind::Rendezvous { target } => target.to_string(),
            MissionEventKind::VehicleSalvaged { vehicle, settlement } => format!("{vehicle} at {settlement}"),
            MissionEventKind::PersonRescued { member, settlement }
            | MissionEventKind::BodyRetrieved { member, settlement } => format!("{member} at {settlement}"),
            MissionEventKind::SuppliesDelivered { settlement, mass_kg } => {
                format!("{mass_kg:.1} kg to {settlement}")
            }
        }
    }
}

/// One notification, stamped with its mission and tick.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MissionEvent {
    pub mission: MissionId,
    pub tick:    Tick,
    pub kind:    MissionEventKind,
}

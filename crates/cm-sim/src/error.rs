use cm_core::{CoreError, MissionId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("no active mission {0}")]
    UnknownMission(MissionId),

    #[error("proposal for mission {expected} built mission {got}")]
    MissionIdMismatch {
        expected: MissionId,
        got:      MissionId,
    },
}

pub type SimResult<T> = Result<T, SimError>;

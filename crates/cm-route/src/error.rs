use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("no navpoint left to travel to (cursor at {cursor} of {len})")]
    Exhausted { cursor: usize, len: usize },

    #[error("already travelling to navpoint {0}")]
    AlreadyTravelling(usize),

    #[error("not travelling")]
    NotTravelling,
}

pub type RouteResult<T> = Result<T, RouteError>;

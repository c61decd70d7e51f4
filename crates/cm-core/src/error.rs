//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` through a
//! `#[from]` variant where they need it.

use thiserror::Error;

use crate::Resource;

/// Errors raised by `cm-core` validation helpers.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("negative amount {amount} for {resource}")]
    NegativeAmount { resource: Resource, amount: f64 },
}

/// Shorthand result type for `cm-core`.
pub type CoreResult<T> = Result<T, CoreError>;

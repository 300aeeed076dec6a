//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`StoreUnavailable`] thrown when the database cannot be reached or a
//!   statement fails.
//! - [`InvalidArgument`] thrown when an input cannot be turned into a query
//!   (non-numeric id, inverted range).
//!
//! A query matching no rows is never an error.
//!
//!  [`StoreUnavailable`]: EngineError::StoreUnavailable
//!  [`InvalidArgument`]: EngineError::InvalidArgument
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] DbErr),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl EngineError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::InvalidArgument(_) => "invalid_argument",
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::StoreUnavailable(a), Self::StoreUnavailable(b)) => a.to_string() == b.to_string(),
            (Self::InvalidArgument(a), Self::InvalidArgument(b)) => a == b,
            _ => false,
        }
    }
}

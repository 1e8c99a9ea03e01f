//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`InvalidAmount`] thrown when a record amount is not a positive number.
//! - [`InvalidDistance`] thrown when a distance reading is not positive.
//! - [`EmptySelection`] returned when a day-scoped operation finds no records.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidDistance`]: EngineError::InvalidDistance
//!  [`EmptySelection`]: EngineError::EmptySelection
use thiserror::Error;

use crate::storage::StorageError;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid distance: {0}")]
    InvalidDistance(String),
    #[error("Invalid category: {0}")]
    InvalidCategory(String),
    #[error("Invalid record kind: {0}")]
    InvalidKind(String),
    #[error("Invalid history mode: {0}")]
    InvalidMode(String),
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
    #[error("No records for {0}")]
    EmptySelection(String),
    #[error("Export failed: {0}")]
    Export(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidDistance(a), Self::InvalidDistance(b)) => a == b,
            (Self::InvalidCategory(a), Self::InvalidCategory(b)) => a == b,
            (Self::InvalidKind(a), Self::InvalidKind(b)) => a == b,
            (Self::InvalidMode(a), Self::InvalidMode(b)) => a == b,
            (Self::InvalidTimezone(a), Self::InvalidTimezone(b)) => a == b,
            (Self::EmptySelection(a), Self::EmptySelection(b)) => a == b,
            (Self::Export(a), Self::Export(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a.to_string() == b.to_string(),
            (Self::Serialization(a), Self::Serialization(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

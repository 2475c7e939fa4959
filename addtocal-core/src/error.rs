//! Error types for addtocal.

use thiserror::Error;

/// Errors that can occur in addtocal operations.
#[derive(Error, Debug)]
pub enum AddToCalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown calendar provider '{0}'")]
    UnknownProvider(String),

    #[error("Invalid timezone '{0}'")]
    InvalidTimezone(String),

    #[error("HTML rewrite error: {0}")]
    Rewrite(String),
}

/// Result type alias for addtocal operations.
pub type AddToCalResult<T> = Result<T, AddToCalError>;

/// Why an event's dates could not be normalized.
///
/// These never abort processing: the event keeps its text fields and its
/// links are generated without dates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("A valid end date, start time and end time is required")]
    MissingTime,

    #[error("'{0}' is not a valid date string")]
    InvalidDate(String),

    #[error("'{0}' is not a valid time (expected HH:MM or HH:MM:SS)")]
    InvalidTime(String),

    #[error("{0} does not exist in timezone {1}")]
    NonexistentLocalTime(String, String),
}

//! Error types for control operations.

use thiserror::Error;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur in control operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Sensor reads a node that does not exist.
    #[error("Invalid control point: {what}")]
    InvalidControlPoint { what: String },

    /// Duty cycle allocation failed.
    #[error("Invalid duty cycle: {what}")]
    InvalidDutyCycle { what: String },
}

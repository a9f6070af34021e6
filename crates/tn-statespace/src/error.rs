//! Error types for state-space operations.

use thiserror::Error;
use tn_core::TnError;
use tn_network::NetworkError;

/// Errors that can occur building or solving a state-space model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateSpaceError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Core error: {0}")]
    Core(#[from] TnError),

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    Dimension {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Singular sensitivity: {what}")]
    Singular { what: String },

    #[error("Multi-input solver has not been set up")]
    SolverNotReady,

    #[error("Non-finite result: {what}")]
    NonFinite { what: String },
}

pub type StateSpaceResult<T> = Result<T, StateSpaceError>;

//! Error types for equipment simulation.

use thiserror::Error;
use tn_controls::ControlError;
use tn_statespace::StateSpaceError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EquipmentError {
    #[error("State-space error: {0}")]
    StateSpace(#[from] StateSpaceError),

    #[error("Control error: {0}")]
    Control(#[from] ControlError),

    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Missing input: {what}")]
    MissingInput { what: &'static str },

    #[error("{equipment} does not support a tank with {nodes} nodes")]
    UnsupportedTank { equipment: &'static str, nodes: usize },
}

pub type EquipmentResult<T> = Result<T, EquipmentError>;

impl From<tn_network::NetworkError> for EquipmentError {
    fn from(e: tn_network::NetworkError) -> Self {
        EquipmentError::StateSpace(e.into())
    }
}

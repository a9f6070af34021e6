use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TnError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Non-positive value for {what}: {value}")]
    NonPositive { what: &'static str, value: f64 },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

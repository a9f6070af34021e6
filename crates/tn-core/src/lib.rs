//! tn-core: stable foundation for thermonet.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (tolerances + value checks)
//! - ids (compact IDs for network nodes)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::TnError;
pub use ids::*;
pub use numeric::*;
pub use units::*;

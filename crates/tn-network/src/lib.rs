//! tn-network: RC network layer for thermonet.
//!
//! Provides:
//! - Typed RC parameter records parsed once from `R_<a>_<b>` / `C_<n>` names
//! - Incremental network builder with validation
//! - Star-mesh elimination of floating (capacitance-free) nodes
//! - Stable name indexing for state-space integration
//!
//! # Example
//!
//! ```
//! use tn_network::RcNetworkBuilder;
//!
//! let mut builder = RcNetworkBuilder::new();
//! builder.add_capacitor("WALL", 1.0e5);
//! builder.add_resistor("WALL", "SURF", 0.01);
//! builder.add_resistor("SURF", "EXT", 0.02);
//! builder.add_external("EXT");
//! let network = builder.build().unwrap();
//!
//! // SURF has no capacitance and is eliminated.
//! assert_eq!(network.internal_names(), vec!["WALL"]);
//! assert_eq!(network.resistors().len(), 1);
//! ```

pub mod builder;
pub mod error;
pub mod indexing;
pub mod network;
pub mod param;
pub mod reduce;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::RcNetworkBuilder;
pub use error::{NetworkError, NetworkResult};
pub use indexing::NameIndex;
pub use network::{NodeKind, RcNetwork};
pub use param::{ParamKind, RcParam, parse_params};
pub use reduce::{ResistorSet, par};

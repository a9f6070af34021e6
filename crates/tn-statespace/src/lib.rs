//! Discrete-time linear state-space models built from RC networks.
//!
//! This crate turns a reduced [`tn_network::RcNetwork`] into continuous
//! matrices (A, B), discretizes them exactly for a fixed timestep and advances
//! the state one step at a time. It also inverts the one-step update to find
//! the inputs that drive states or outputs to target values.

pub mod discretize;
pub mod error;
pub mod export;
pub mod matrices;
pub mod model;
pub mod multi;
pub mod rc_model;
pub mod solve;

pub use discretize::discretize;
pub use error::{StateSpaceError, StateSpaceResult};
pub use export::{ExportedMatrices, LabeledMatrix, MatrixForm};
pub use matrices::rc_matrices;
pub use model::{OutputDef, StateSpaceModel};
pub use multi::{InputGroup, MultiInputSolver};
pub use rc_model::{RcModel, RcModelConfig};
pub use solve::{Target, TargetKind};

//! Control primitives for thermostatic equipment.
//!
//! - [`DeadbandThermostat`]: on/off decisions with hysteresis
//! - [`ControlPoint`]: which node temperature(s) a controller reads
//! - [`Mode`] and [`ModeTimer`]: operating modes with minimum time in mode
//! - [`DutyCycles`]: continuous ("ideal") allocation of a timestep across modes
//! - [`Biquadratic`]: fitted performance curves

pub mod curve;
pub mod duty_cycle;
pub mod error;
pub mod mode;
pub mod sensor;
pub mod thermostat;

pub use curve::Biquadratic;
pub use duty_cycle::DutyCycles;
pub use error::{ControlError, ControlResult};
pub use mode::{Mode, ModeTimer};
pub use sensor::ControlPoint;
pub use thermostat::{DeadbandThermostat, SwitchCommand, ThermostatAction};

//! Thermostatic water heating equipment on top of RC tank models.
//!
//! Provides:
//! - [`WaterTank`]: stratified tank as an RC state-space model
//! - [`ThermostaticEquipment`]: the per-step control contract
//! - water heater variants (generic, gas, electric resistance, heat pump)
//! - [`run_step`] / [`run_sim`]: fixed-step simulation with result reporting

pub mod electric;
pub mod error;
pub mod heat_pump;
pub mod results;
pub mod sim;
pub mod step;
pub mod tank;
pub mod traits;
pub mod water_heater;

pub use electric::ElectricResistanceWaterHeater;
pub use error::{EquipmentError, EquipmentResult};
pub use heat_pump::{HeatPumpConfig, HeatPumpWaterHeater};
pub use results::{AmbientConditions, HeatOutput, HeatPumpReport, ResultValue, StepResults};
pub use sim::{SimOptions, SimRecord, run_model, run_sim};
pub use step::{StepContext, run_step};
pub use tank::{WaterTank, WaterTankConfig};
pub use traits::ThermostaticEquipment;
pub use water_heater::{EquivalentBattery, GasWaterHeater, WaterHeater, WaterHeaterConfig};

//! The per-step control contract shared by all thermostatic equipment.

use tn_controls::{DutyCycles, Mode};

use crate::error::EquipmentResult;
use crate::results::{HeatOutput, HeatPumpReport};
use crate::step::StepContext;
use crate::water_heater::WaterHeater;

/// Thermostatic equipment driving a water tank.
///
/// Variants share their base state through [`ThermostaticEquipment::heater`]
/// and override the control decisions they need. [`crate::run_step`] calls
/// these in order: `prepare`, then `solve_capacity` (ideal mode) or
/// `choose_mode`, then `compute_heat_injection` per active mode, then
/// `power_and_gains` and `add_tank_losses`.
pub trait ThermostaticEquipment {
    /// Shared base state (tank, thermostat, mode timer).
    fn heater(&self) -> &WaterHeater;

    fn heater_mut(&mut self) -> &mut WaterHeater;

    /// Per-step setup before any control decision.
    fn prepare(&mut self, _ctx: &StepContext) -> EquipmentResult<()> {
        Ok(())
    }

    /// Duty cycles that bring the tank to setpoint over the coming step.
    fn solve_capacity(&mut self, ctx: &StepContext) -> EquipmentResult<DutyCycles>;

    /// Thermostat decision on the current tank states; `None` keeps the mode.
    fn choose_mode(&mut self, ctx: &StepContext) -> EquipmentResult<Option<Mode>>;

    /// Add the heat delivered by `mode` over `fraction` of the step to `heats`.
    fn compute_heat_injection(&self, mode: Mode, fraction: f64, heats: &mut [f64]);

    /// Electric/fuel use and zone gains; may scale `heats` down to max power.
    fn power_and_gains(
        &mut self,
        ctx: &StepContext,
        heats: &mut [f64],
    ) -> EquipmentResult<HeatOutput>;

    /// Add tank jacket losses to the zone gains.
    fn add_tank_losses(&self, h_loss_w: f64, output: &mut HeatOutput) {
        output.sensible_gain_w += h_loss_w;
    }

    fn heat_pump_report(&self) -> Option<HeatPumpReport> {
        None
    }

    fn name(&self) -> &str {
        self.heater().name()
    }
}

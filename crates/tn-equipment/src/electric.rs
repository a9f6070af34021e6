//! Two-element electric resistance water heater.

use tn_controls::{DutyCycles, Mode};

use crate::error::EquipmentResult;
use crate::results::HeatOutput;
use crate::step::StepContext;
use crate::tank::WaterTank;
use crate::traits::ThermostaticEquipment;
use crate::water_heater::{WaterHeater, WaterHeaterConfig};

/// Upper and lower elements, never on together; the upper element has
/// priority.
#[derive(Debug, Clone)]
pub struct ElectricResistanceWaterHeater {
    heater: WaterHeater,
}

impl ElectricResistanceWaterHeater {
    pub fn new(config: WaterHeaterConfig, tank: WaterTank) -> EquipmentResult<Self> {
        Ok(Self {
            heater: WaterHeater::new(config, tank)?,
        })
    }

    pub(crate) fn from_heater(heater: WaterHeater) -> Self {
        Self { heater }
    }

    /// Element decision for `states` given the current `mode`.
    pub fn decide(&self, states: &[f64], mode: Mode) -> EquipmentResult<Option<Mode>> {
        self.decide_with_deadband(states, mode, self.heater.deadband())
    }

    /// Element decision using `deadband` in place of the heater's own.
    pub(crate) fn decide_with_deadband(
        &self,
        states: &[f64],
        mode: Mode,
        deadband: f64,
    ) -> EquipmentResult<Option<Mode>> {
        let h = &self.heater;
        let setpoint = h.setpoint();
        let t_upper = states[h.upper_index()];
        let t_lower = h.control_temperature(states)?;
        let lower_threshold = setpoint - deadband;

        Ok(
            if t_upper < lower_threshold || (mode == Mode::UpperOn && t_upper < setpoint) {
                Some(Mode::UpperOn)
            } else if t_lower < lower_threshold {
                Some(Mode::LowerOn)
            } else if (mode == Mode::UpperOn && t_upper > setpoint) || t_lower > setpoint {
                Some(Mode::Off)
            } else {
                None
            },
        )
    }
}

impl ThermostaticEquipment for ElectricResistanceWaterHeater {
    fn heater(&self) -> &WaterHeater {
        &self.heater
    }

    fn heater_mut(&mut self) -> &mut WaterHeater {
        &mut self.heater
    }

    fn solve_capacity(&mut self, _ctx: &StepContext) -> EquipmentResult<DutyCycles> {
        let h = &mut self.heater;
        let off = h.off_states()?;
        let setpoint = h.setpoint();
        let total = h.heat_to_reach(setpoint, &off, h.lower_index());
        let upper = h.heat_to_reach(setpoint, &off, h.upper_index());

        let mut duty = DutyCycles::new();
        duty.allocate(Mode::UpperOn, upper, h.capacity_w())?;
        duty.allocate(Mode::LowerOn, total - upper, h.capacity_w())?;
        Ok(duty.finish())
    }

    fn choose_mode(&mut self, _ctx: &StepContext) -> EquipmentResult<Option<Mode>> {
        self.decide(self.heater.tank().states(), self.heater.mode())
    }

    fn compute_heat_injection(&self, mode: Mode, fraction: f64, heats: &mut [f64]) {
        self.heater.compute_heat_injection(mode, fraction, heats);
    }

    fn power_and_gains(
        &mut self,
        ctx: &StepContext,
        heats: &mut [f64],
    ) -> EquipmentResult<HeatOutput> {
        self.heater.power_and_gains(ctx, heats)
    }
}

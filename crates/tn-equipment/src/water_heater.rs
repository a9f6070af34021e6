//! Tank water heaters with a single heat source.

use tn_controls::{
    ControlPoint, DeadbandThermostat, DutyCycles, Mode, ModeTimer, SwitchCommand,
};
use tn_core::{Power, as_watts, constants::{J_PER_KWH, KWH_TO_THERMS}, w};
use tracing::warn;

use crate::error::{EquipmentError, EquipmentResult};
use crate::results::HeatOutput;
use crate::step::StepContext;
use crate::tank::WaterTank;
use crate::traits::ThermostaticEquipment;

pub const DEFAULT_SETPOINT_C: f64 = 51.67;
pub const DEFAULT_DEADBAND_C: f64 = 5.56;

#[derive(Debug, Clone, PartialEq)]
pub struct WaterHeaterConfig {
    pub name: String,
    pub setpoint_c: f64,
    /// Defaults depend on the equipment type.
    pub deadband_c: Option<f64>,
    /// Rated heat delivered by one element or burner.
    pub capacity: Power,
    pub efficiency: f64,
    pub max_power: Option<Power>,
    pub use_ideal_mode: bool,
}

impl Default for WaterHeaterConfig {
    fn default() -> Self {
        Self {
            name: "Water Heater".into(),
            setpoint_c: DEFAULT_SETPOINT_C,
            deadband_c: None,
            capacity: w(4500.0),
            efficiency: 1.0,
            max_power: None,
            use_ideal_mode: false,
        }
    }
}

/// Single-element water heater (modes On/Off).
///
/// Also the shared base of the other variants: it owns the tank, the
/// thermostat and the mode timer.
#[derive(Debug, Clone)]
pub struct WaterHeater {
    name: String,
    pub(crate) tank: WaterTank,
    pub(crate) thermostat: DeadbandThermostat,
    capacity_w: f64,
    efficiency: f64,
    max_power_kw: Option<f64>,
    use_ideal_mode: bool,
    pub(crate) timer: ModeTimer,
    pub(crate) duty: Option<DutyCycles>,
    upper_idx: usize,
    lower_idx: usize,
    control: ControlPoint,
}

impl WaterHeater {
    pub fn new(config: WaterHeaterConfig, tank: WaterTank) -> EquipmentResult<Self> {
        Self::with_default_deadband(config, tank, DEFAULT_DEADBAND_C)
    }

    pub(crate) fn with_default_deadband(
        config: WaterHeaterConfig,
        tank: WaterTank,
        default_deadband: f64,
    ) -> EquipmentResult<Self> {
        let capacity_w = as_watts(config.capacity);
        if !(capacity_w.is_finite() && capacity_w > 0.0) {
            return Err(EquipmentError::InvalidArg {
                what: format!("capacity must be positive, got {capacity_w} W"),
            });
        }
        if !(config.efficiency.is_finite() && config.efficiency > 0.0) {
            return Err(EquipmentError::InvalidArg {
                what: format!("efficiency must be positive, got {}", config.efficiency),
            });
        }
        let max_power_kw = config.max_power.map(|p| as_watts(p) / 1000.0);
        if let Some(p) = max_power_kw.filter(|p| !(*p > 0.0)) {
            return Err(EquipmentError::InvalidArg {
                what: format!("max power must be positive, got {p} kW"),
            });
        }
        let thermostat = DeadbandThermostat::heating(
            config.setpoint_c,
            config.deadband_c.unwrap_or(default_deadband),
        )?;

        let n = tank.n_nodes();
        let (upper, lower) = if n >= 12 { (3, 10) } else { (1, n) };
        let upper_idx = tank.state_index(upper)?;
        let lower_idx = tank.state_index(lower)?;
        let control = if n <= 2 {
            ControlPoint::single(lower_idx)
        } else {
            ControlPoint::with_node_above(lower_idx)
        };

        Ok(Self {
            name: config.name,
            tank,
            thermostat,
            capacity_w,
            efficiency: config.efficiency,
            max_power_kw,
            use_ideal_mode: config.use_ideal_mode,
            timer: ModeTimer::new(Mode::Off),
            duty: None,
            upper_idx,
            lower_idx,
            control,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tank(&self) -> &WaterTank {
        &self.tank
    }

    pub fn tank_mut(&mut self) -> &mut WaterTank {
        &mut self.tank
    }

    pub fn mode(&self) -> Mode {
        self.timer.mode()
    }

    pub fn timer(&self) -> &ModeTimer {
        &self.timer
    }

    pub fn setpoint(&self) -> f64 {
        self.thermostat.setpoint
    }

    pub fn set_setpoint(&mut self, setpoint_c: f64) -> EquipmentResult<()> {
        self.thermostat = DeadbandThermostat::heating(setpoint_c, self.thermostat.deadband)?;
        Ok(())
    }

    pub fn deadband(&self) -> f64 {
        self.thermostat.deadband
    }

    pub fn capacity_w(&self) -> f64 {
        self.capacity_w
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    pub fn use_ideal_mode(&self) -> bool {
        self.use_ideal_mode
    }

    /// Duty cycles of the last step in ideal mode.
    pub fn duty_cycles(&self) -> Option<&DutyCycles> {
        self.duty.as_ref()
    }

    pub fn upper_index(&self) -> usize {
        self.upper_idx
    }

    pub fn lower_index(&self) -> usize {
        self.lower_idx
    }

    /// Control temperature: lower node, averaged with the node above for
    /// tanks of more than two nodes.
    pub fn control_temperature(&self, states: &[f64]) -> EquipmentResult<f64> {
        Ok(self.control.read(states)?)
    }

    /// Next states with no heat from the equipment.
    pub(crate) fn off_states(&mut self) -> EquipmentResult<Vec<f64>> {
        let zeros = vec![0.0; self.tank.n_nodes()];
        self.tank.update(&zeros)
    }

    /// Heat (W) that brings nodes `0..=through` from `states` to `target`
    /// over one step, weighted by node capacitance.
    pub(crate) fn heat_to_reach(&self, target: f64, states: &[f64], through: usize) -> f64 {
        let dt = self.tank.time_step_s();
        states
            .iter()
            .zip(self.tank.capacitances())
            .take(through + 1)
            .map(|(t, c)| (target - t) * c)
            .sum::<f64>()
            / dt
    }

    /// Delivered heat (W) and input power (kW), clipped to max power except
    /// while the heat pump runs. Scales `heats` when clipping.
    pub(crate) fn clip_to_max_power(&self, heats: &mut [f64]) -> (f64, f64) {
        let mut delivered: f64 = heats.iter().sum();
        let mut power_kw = delivered / self.efficiency / 1000.0;
        if let Some(max_kw) = self.max_power_kw {
            if power_kw > max_kw && self.mode() != Mode::HeatPumpOn {
                let scale = max_kw / power_kw;
                heats.iter_mut().for_each(|h| *h *= scale);
                delivered *= scale;
                power_kw = max_kw;
            }
        }
        (delivered, power_kw)
    }

    /// Equivalent battery parameters relative to 0 °C.
    pub fn equivalent_battery(&self) -> EquipmentResult<EquivalentBattery> {
        let cap_kwh_per_k = self.tank.capacitances().iter().sum::<f64>() / J_PER_KWH;
        let tank_temp = self.control_temperature(self.tank.states())?;
        let setpoint = self.setpoint();
        Ok(EquivalentBattery {
            energy_kwh: cap_kwh_per_k * tank_temp,
            min_energy_kwh: cap_kwh_per_k * (setpoint - self.deadband()),
            max_energy_kwh: cap_kwh_per_k * setpoint,
            max_power_kw: self.capacity_w / self.efficiency / 1000.0,
            efficiency: self.efficiency,
            baseline_power_kw: self.tank.h_loss()? / 1000.0,
        })
    }
}

impl ThermostaticEquipment for WaterHeater {
    fn heater(&self) -> &WaterHeater {
        self
    }

    fn heater_mut(&mut self) -> &mut WaterHeater {
        self
    }

    fn solve_capacity(&mut self, _ctx: &StepContext) -> EquipmentResult<DutyCycles> {
        let required = if self.tank.n_nodes() == 1 {
            // Exact inverse of the one-node tank update.
            self.tank
                .model()
                .solve_for_input("T_WH1", "H_WH1", self.setpoint())?
        } else {
            let off = self.off_states()?;
            self.heat_to_reach(self.setpoint(), &off, self.lower_idx)
        };
        let mut duty = DutyCycles::new();
        duty.allocate(Mode::On, required, self.capacity_w)?;
        Ok(duty.finish())
    }

    fn choose_mode(&mut self, _ctx: &StepContext) -> EquipmentResult<Option<Mode>> {
        let temp = self.control_temperature(self.tank.states())?;
        Ok(match self.thermostat.decide(temp) {
            Some(SwitchCommand::On) => Some(Mode::On),
            Some(SwitchCommand::Off) => Some(Mode::Off),
            None => None,
        })
    }

    fn compute_heat_injection(&self, mode: Mode, fraction: f64, heats: &mut [f64]) {
        match mode {
            Mode::UpperOn => heats[self.upper_idx] += self.capacity_w * fraction,
            Mode::On | Mode::LowerOn => heats[self.lower_idx] += self.capacity_w * fraction,
            Mode::Off | Mode::HeatPumpOn => {}
        }
    }

    fn power_and_gains(
        &mut self,
        _ctx: &StepContext,
        heats: &mut [f64],
    ) -> EquipmentResult<HeatOutput> {
        let (delivered, power_kw) = self.clip_to_max_power(heats);
        Ok(HeatOutput {
            delivered_w: delivered,
            electric_kw: power_kw,
            gas_therms_per_hour: None,
            sensible_gain_w: power_kw * 1000.0 - delivered,
            latent_gain_w: 0.0,
        })
    }
}

/// Equivalent battery model of a tank water heater.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct EquivalentBattery {
    pub energy_kwh: f64,
    pub min_energy_kwh: f64,
    pub max_energy_kwh: f64,
    pub max_power_kw: f64,
    pub efficiency: f64,
    pub baseline_power_kw: f64,
}

/// Gas-fired tank water heater.
///
/// Controls like [`WaterHeater`]; burner exhaust is vented, so the zone only
/// sees a share of the jacket losses.
#[derive(Debug, Clone)]
pub struct GasWaterHeater {
    heater: WaterHeater,
    energy_factor: f64,
    skin_loss_fraction: f64,
}

impl GasWaterHeater {
    pub fn new(
        config: WaterHeaterConfig,
        tank: WaterTank,
        energy_factor: f64,
    ) -> EquipmentResult<Self> {
        if !(energy_factor.is_finite() && energy_factor > 0.0 && energy_factor <= 1.0) {
            return Err(EquipmentError::InvalidArg {
                what: format!("energy factor must be in (0, 1], got {energy_factor}"),
            });
        }
        if config.efficiency > 1.0 {
            warn!(efficiency = config.efficiency, "gas water heater efficiency above 1");
        }
        Ok(Self {
            heater: WaterHeater::new(config, tank)?,
            energy_factor,
            skin_loss_fraction: skin_loss_fraction(energy_factor),
        })
    }

    pub fn energy_factor(&self) -> f64 {
        self.energy_factor
    }

    pub fn skin_loss_fraction(&self) -> f64 {
        self.skin_loss_fraction
    }
}

/// Share of jacket losses reaching the zone for a given energy factor.
pub fn skin_loss_fraction(energy_factor: f64) -> f64 {
    if energy_factor < 0.7 {
        0.64
    } else if energy_factor < 0.8 {
        0.91
    } else {
        0.96
    }
}

impl ThermostaticEquipment for GasWaterHeater {
    fn heater(&self) -> &WaterHeater {
        &self.heater
    }

    fn heater_mut(&mut self) -> &mut WaterHeater {
        &mut self.heater
    }

    fn solve_capacity(&mut self, ctx: &StepContext) -> EquipmentResult<DutyCycles> {
        self.heater.solve_capacity(ctx)
    }

    fn choose_mode(&mut self, ctx: &StepContext) -> EquipmentResult<Option<Mode>> {
        self.heater.choose_mode(ctx)
    }

    fn compute_heat_injection(&self, mode: Mode, fraction: f64, heats: &mut [f64]) {
        self.heater.compute_heat_injection(mode, fraction, heats);
    }

    fn power_and_gains(
        &mut self,
        _ctx: &StepContext,
        heats: &mut [f64],
    ) -> EquipmentResult<HeatOutput> {
        let (delivered, power_kw) = self.heater.clip_to_max_power(heats);
        Ok(HeatOutput {
            delivered_w: delivered,
            electric_kw: 0.0,
            gas_therms_per_hour: Some(power_kw * KWH_TO_THERMS),
            sensible_gain_w: 0.0,
            latent_gain_w: 0.0,
        })
    }

    fn add_tank_losses(&self, h_loss_w: f64, output: &mut HeatOutput) {
        output.sensible_gain_w = h_loss_w * self.skin_loss_fraction;
    }
}

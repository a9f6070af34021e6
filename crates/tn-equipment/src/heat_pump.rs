//! Heat pump water heater with backup resistance elements.

use tn_controls::{Biquadratic, DutyCycles, Mode};
use tn_core::{Power, Time, as_watts, minutes, w};
use tracing::{debug, warn};

use crate::electric::ElectricResistanceWaterHeater;
use crate::error::{EquipmentError, EquipmentResult};
use crate::results::{HeatOutput, HeatPumpReport};
use crate::step::StepContext;
use crate::tank::WaterTank;
use crate::traits::ThermostaticEquipment;
use crate::water_heater::{DEFAULT_DEADBAND_C, WaterHeater, WaterHeaterConfig};

pub const DEFAULT_HP_DEADBAND_C: f64 = 8.17;

/// Zone temperatures outside this range lock out the compressor, °C.
const HP_MIN_ZONE_TEMP_C: f64 = 7.222;
const HP_MAX_ZONE_TEMP_C: f64 = 43.333;

/// Element thresholds below setpoint, K.
const UPPER_ELEMENT_OFFSET: f64 = 13.0;
const LOWER_ELEMENT_OFFSET: f64 = 15.0;

/// Condenser heat distribution over a 12-node tank, top first.
const HP_NODES_12: [f64; 12] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 5.0 / 110.0, 10.0 / 110.0, 15.0 / 110.0, 20.0 / 110.0,
    25.0 / 110.0, 30.0 / 110.0, 5.0 / 110.0,
];

#[derive(Debug, Clone, PartialEq)]
pub struct HeatPumpConfig {
    pub cop_nominal: f64,
    /// Nominal heating capacity; derived from `power × COP` when absent.
    pub capacity: Option<Power>,
    pub power: Power,
    pub fan_power: Power,
    pub parasitic_power: Power,
    pub shr_nominal: f64,
    /// Fraction of heat pump gains that reach the zone.
    pub interaction_factor: f64,
    pub min_on_time: Time,
    pub min_off_time: Time,
    pub hp_only: bool,
    /// Element deadband while the compressor is locked out, K.
    pub element_deadband_c: f64,
}

impl Default for HeatPumpConfig {
    fn default() -> Self {
        Self {
            cop_nominal: 2.5,
            capacity: None,
            power: w(500.0),
            fan_power: w(35.0),
            parasitic_power: w(1.0),
            shr_nominal: 0.88,
            interaction_factor: 1.0,
            min_on_time: minutes(10.0),
            min_off_time: minutes(0.0),
            hp_only: false,
            element_deadband_c: DEFAULT_DEADBAND_C,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeatPumpWaterHeater {
    er: ElectricResistanceWaterHeater,
    hp_only: bool,
    er_only: bool,
    element_deadband_c: f64,
    cop_nominal: f64,
    cop: f64,
    capacity_nominal_w: f64,
    capacity_w: f64,
    fan_power_w: f64,
    parasitic_power_w: f64,
    shr_nominal: f64,
    lost_heat_fraction: f64,
    /// Share of heat pump output per tank node.
    hp_nodes: Vec<f64>,
}

impl HeatPumpWaterHeater {
    pub fn new(
        config: WaterHeaterConfig,
        hp: HeatPumpConfig,
        tank: WaterTank,
    ) -> EquipmentResult<Self> {
        let hp_nodes = match tank.n_nodes() {
            1 => vec![1.0],
            2 => vec![0.0, 1.0],
            12 => HP_NODES_12.to_vec(),
            nodes => {
                return Err(EquipmentError::UnsupportedTank {
                    equipment: "heat pump water heater",
                    nodes,
                });
            }
        };
        if !(hp.cop_nominal.is_finite() && hp.cop_nominal > 0.0) {
            return Err(EquipmentError::InvalidArg {
                what: format!("COP must be positive, got {}", hp.cop_nominal),
            });
        }
        if hp.cop_nominal < 2.0 {
            warn!(cop = hp.cop_nominal, "low nominal heat pump COP");
        }
        if !(hp.element_deadband_c.is_finite() && hp.element_deadband_c >= 0.0) {
            return Err(EquipmentError::InvalidArg {
                what: format!("element deadband must be non-negative, got {}", hp.element_deadband_c),
            });
        }
        if !(0.0..=1.0).contains(&hp.interaction_factor) {
            return Err(EquipmentError::InvalidArg {
                what: format!("interaction factor must be in [0, 1], got {}", hp.interaction_factor),
            });
        }

        let mut heater = WaterHeater::with_default_deadband(config, tank, DEFAULT_HP_DEADBAND_C)?;
        heater.timer.set_min_time(Mode::HeatPumpOn, hp.min_on_time)?;
        heater.timer.set_min_time(Mode::Off, hp.min_off_time)?;

        let capacity_nominal_w = match hp.capacity {
            Some(c) => as_watts(c),
            None => as_watts(hp.power) * hp.cop_nominal,
        };

        Ok(Self {
            er: ElectricResistanceWaterHeater::from_heater(heater),
            hp_only: hp.hp_only,
            er_only: false,
            element_deadband_c: hp.element_deadband_c,
            cop_nominal: hp.cop_nominal,
            cop: hp.cop_nominal,
            capacity_nominal_w,
            capacity_w: capacity_nominal_w,
            fan_power_w: as_watts(hp.fan_power),
            parasitic_power_w: as_watts(hp.parasitic_power),
            shr_nominal: hp.shr_nominal,
            lost_heat_fraction: 1.0 - hp.interaction_factor,
            hp_nodes,
        })
    }

    pub fn cop(&self) -> f64 {
        self.cop
    }

    pub fn capacity_w(&self) -> f64 {
        self.capacity_w
    }

    /// True while the compressor is locked out by zone temperature.
    pub fn er_only(&self) -> bool {
        self.er_only
    }

    /// Mode decision for `states` given the current `mode`.
    pub fn decide(&self, states: &[f64], mode: Mode) -> EquipmentResult<Option<Mode>> {
        if self.er_only {
            return self.er.decide_with_deadband(states, mode, self.element_deadband_c);
        }
        let h = self.er.heater();
        let setpoint = h.setpoint();
        let t_upper = states[h.upper_index()];
        let t_lower = states[h.lower_index()];
        let t_control = 0.75 * t_upper + 0.25 * t_lower;

        if !self.hp_only {
            if t_upper < setpoint - UPPER_ELEMENT_OFFSET
                || (mode == Mode::UpperOn && t_upper < setpoint)
            {
                return Ok(Some(Mode::UpperOn));
            }
            if mode.is_element() && t_lower < setpoint - LOWER_ELEMENT_OFFSET {
                return Ok(Some(Mode::LowerOn));
            }
        }

        Ok(
            if mode.is_element() || t_control < setpoint - h.deadband() {
                Some(Mode::HeatPumpOn)
            } else if t_control >= setpoint || t_upper >= setpoint + 1.0 {
                Some(Mode::Off)
            } else {
                None
            },
        )
    }

    /// Update capacity and COP from wet bulb and condenser water temperature.
    fn update_cop_and_capacity(&mut self, wet_bulb_c: f64) {
        let states = self.er.heater().tank().states();
        let t_condenser: f64 = self.hp_nodes.iter().zip(states).map(|(f, t)| f * t).sum();
        self.capacity_w =
            self.capacity_nominal_w * Biquadratic::HPWH_CAPACITY.eval(wet_bulb_c, t_condenser);
        self.cop = self.cop_nominal * Biquadratic::HPWH_COP.eval(wet_bulb_c, t_condenser);
    }

    /// Heat pump and element duty fractions for the current step.
    fn fractions(&self) -> (f64, f64) {
        let heater = self.er.heater();
        match heater.duty_cycles().filter(|_| heater.use_ideal_mode()) {
            Some(duty) => (
                duty.get(Mode::HeatPumpOn),
                duty.get(Mode::UpperOn) + duty.get(Mode::LowerOn),
            ),
            None => {
                let mode = heater.mode();
                (
                    if mode == Mode::HeatPumpOn { 1.0 } else { 0.0 },
                    if mode.is_element() { 1.0 } else { 0.0 },
                )
            }
        }
    }
}

impl ThermostaticEquipment for HeatPumpWaterHeater {
    fn heater(&self) -> &WaterHeater {
        self.er.heater()
    }

    fn heater_mut(&mut self) -> &mut WaterHeater {
        self.er.heater_mut()
    }

    fn prepare(&mut self, ctx: &StepContext) -> EquipmentResult<()> {
        let zone = ctx.ambient.zone_temp_c;
        let er_only = !(HP_MIN_ZONE_TEMP_C..=HP_MAX_ZONE_TEMP_C).contains(&zone);
        if er_only != self.er_only {
            debug!(zone_temp_c = zone, er_only, "heat pump lockout changed");
            self.er_only = er_only;
        }
        if self.er_only && self.heater().mode() == Mode::HeatPumpOn {
            self.heater_mut().timer.force(Mode::Off, ctx.now);
        }
        // Capacity must be current before any heat is injected this step.
        let t_wet = ctx.ambient.zone_wet_bulb_c.ok_or(EquipmentError::MissingInput {
            what: "zone wet bulb temperature",
        })?;
        self.update_cop_and_capacity(t_wet);
        Ok(())
    }

    fn solve_capacity(&mut self, ctx: &StepContext) -> EquipmentResult<DutyCycles> {
        if self.er_only {
            return self.er.solve_capacity(ctx);
        }

        let off = self.er.heater_mut().off_states()?;
        let mut hp_heats = vec![0.0; off.len()];
        self.compute_heat_injection(Mode::HeatPumpOn, 1.0, &mut hp_heats);
        let hp_states = self.er.heater_mut().tank_mut().update(&hp_heats)?;
        let hp_mode = self.decide(&hp_states, self.heater().mode())?;

        let h = self.er.heater();
        // Aim a quarter deadband below setpoint to limit top-of-tank temperatures.
        let target = h.setpoint() - h.deadband() / 4.0;
        let mut duty = DutyCycles::new();
        if !self.hp_only && hp_mode == Some(Mode::UpperOn) {
            let upper = h.heat_to_reach(target, &hp_states, h.upper_index());
            let d_upper = duty.allocate(Mode::UpperOn, upper, h.capacity_w())?;
            duty.set(Mode::HeatPumpOn, 1.0 - d_upper)?;
        } else {
            let required = h.heat_to_reach(target, &off, h.lower_index());
            duty.allocate(Mode::HeatPumpOn, required, self.capacity_w)?;
        }
        Ok(duty.finish())
    }

    fn choose_mode(&mut self, _ctx: &StepContext) -> EquipmentResult<Option<Mode>> {
        let heater = self.er.heater();
        self.decide(heater.tank().states(), heater.mode())
    }

    fn compute_heat_injection(&self, mode: Mode, fraction: f64, heats: &mut [f64]) {
        if mode == Mode::HeatPumpOn {
            let q = self.capacity_w * fraction;
            for (h, share) in heats.iter_mut().zip(&self.hp_nodes) {
                *h += share * q;
            }
        } else {
            self.er.compute_heat_injection(mode, fraction, heats);
        }
    }

    fn power_and_gains(
        &mut self,
        ctx: &StepContext,
        heats: &mut [f64],
    ) -> EquipmentResult<HeatOutput> {
        let t_dry = ctx.ambient.zone_temp_c;
        let t_wet = ctx.ambient.zone_wet_bulb_c.ok_or(EquipmentError::MissingInput {
            what: "zone wet bulb temperature",
        })?;

        let requested: f64 = heats.iter().sum();
        let (delivered, _) = self.er.heater().clip_to_max_power(heats);
        let clip = if requested > 0.0 { delivered / requested } else { 1.0 };
        let (d_hp, d_er) = self.fractions();
        let heater = self.er.heater();

        let delivered_hp = self.capacity_w * d_hp * clip;
        let power_hp = delivered_hp / self.cop;
        let power_other = self.fan_power_w * d_hp + self.parasitic_power_w * (1.0 - d_hp);
        let delivered_er = heater.capacity_w() * d_er * clip;
        let power_er = delivered_er / heater.efficiency();

        let shr = if t_dry - t_wet > 0.1 { self.shr_nominal } else { 1.0 };
        let to_zone = 1.0 - self.lost_heat_fraction;
        let hp_gain = power_hp - delivered_hp;

        Ok(HeatOutput {
            delivered_w: delivered,
            electric_kw: (power_hp + power_er + power_other) / 1000.0,
            gas_therms_per_hour: None,
            sensible_gain_w: (hp_gain * shr + power_other + (power_er - delivered_er)) * to_zone,
            latent_gain_w: hp_gain * (1.0 - shr) * to_zone,
        })
    }

    fn add_tank_losses(&self, h_loss_w: f64, output: &mut HeatOutput) {
        output.sensible_gain_w += h_loss_w * (1.0 - self.lost_heat_fraction);
    }

    fn heat_pump_report(&self) -> Option<HeatPumpReport> {
        Some(HeatPumpReport {
            max_capacity_w: self.capacity_w,
            on_fraction: self.fractions().0,
            cop: self.cop,
        })
    }
}

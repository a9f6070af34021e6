//! Scenario schema definitions.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tn_core::{minutes, w};
use tn_equipment::water_heater::DEFAULT_DEADBAND_C;
use tn_equipment::{AmbientConditions, HeatPumpConfig, WaterHeaterConfig, WaterTankConfig};
use tn_statespace::OutputDef;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub name: String,
    /// Model timestep, s.
    pub time_res_s: f64,
    #[serde(default)]
    pub start: NaiveDateTime,
    #[serde(default = "default_steps")]
    pub steps: usize,
    #[serde(default = "default_record_every")]
    pub record_every: usize,
    /// 0..=9; higher values report more results per step.
    #[serde(default)]
    pub verbosity: u8,
    pub model: ModelDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<EquipmentDef>,
    #[serde(default)]
    pub ambient: AmbientDef,
}

fn default_steps() -> usize {
    1440
}

fn default_record_every() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelDef {
    Network(NetworkDef),
    WaterTank(WaterTankDef),
}

/// RC network given as encoded parameter names (`C_<node>`, `R_<a>_<b>`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkDef {
    pub params: BTreeMap<String, f64>,
    #[serde(default)]
    pub external_nodes: Vec<String>,
    #[serde(default)]
    pub unused_inputs: Vec<String>,
    /// Initial temperature by state name; unlisted states start at 0.
    #[serde(default)]
    pub initial_states: BTreeMap<String, f64>,
    /// Inputs held constant over a run, by input name.
    #[serde(default)]
    pub inputs: BTreeMap<String, f64>,
    #[serde(default)]
    pub outputs: Vec<WeightedOutputDef>,
}

/// Named output as a weighted sum of states and inputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightedOutputDef {
    pub name: String,
    #[serde(default)]
    pub states: BTreeMap<String, f64>,
    #[serde(default)]
    pub inputs: BTreeMap<String, f64>,
}

impl WeightedOutputDef {
    pub fn to_output(&self) -> OutputDef {
        let mut out = OutputDef::new(&self.name);
        for (name, weight) in &self.states {
            out = out.with_state(name, *weight);
        }
        for (name, weight) in &self.inputs {
            out = out.with_input(name, *weight);
        }
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaterTankDef {
    #[serde(default = "default_tank_nodes")]
    pub nodes: usize,
    #[serde(default = "default_volume_l")]
    pub volume_l: f64,
    #[serde(default = "default_ua")]
    pub ua_w_per_k: f64,
    #[serde(default = "default_node_resistance")]
    pub node_resistance_k_per_w: f64,
    #[serde(default = "default_tank_temp")]
    pub initial_temp_c: f64,
}

fn default_tank_nodes() -> usize {
    WaterTankConfig::default().nodes
}

fn default_volume_l() -> f64 {
    WaterTankConfig::default().volume_l
}

fn default_ua() -> f64 {
    WaterTankConfig::default().ua_w_per_k
}

fn default_node_resistance() -> f64 {
    WaterTankConfig::default().node_resistance_k_per_w
}

fn default_tank_temp() -> f64 {
    WaterTankConfig::default().initial_temp_c
}

impl WaterTankDef {
    pub fn to_config(&self) -> WaterTankConfig {
        WaterTankConfig {
            nodes: self.nodes,
            volume_l: self.volume_l,
            ua_w_per_k: self.ua_w_per_k,
            node_resistance_k_per_w: self.node_resistance_k_per_w,
            initial_temp_c: self.initial_temp_c,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EquipmentDef {
    WaterHeater(HeaterDef),
    GasWaterHeater {
        #[serde(flatten)]
        heater: HeaterDef,
        energy_factor: f64,
    },
    ElectricResistanceWaterHeater(HeaterDef),
    HeatPumpWaterHeater {
        #[serde(flatten)]
        heater: HeaterDef,
        #[serde(default)]
        heat_pump: HeatPumpDef,
    },
}

impl EquipmentDef {
    pub fn heater(&self) -> &HeaterDef {
        match self {
            EquipmentDef::WaterHeater(h) | EquipmentDef::ElectricResistanceWaterHeater(h) => h,
            EquipmentDef::GasWaterHeater { heater, .. }
            | EquipmentDef::HeatPumpWaterHeater { heater, .. } => heater,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EquipmentDef::WaterHeater(_) => "water_heater",
            EquipmentDef::GasWaterHeater { .. } => "gas_water_heater",
            EquipmentDef::ElectricResistanceWaterHeater(_) => "electric_resistance_water_heater",
            EquipmentDef::HeatPumpWaterHeater { .. } => "heat_pump_water_heater",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeaterDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_setpoint")]
    pub setpoint_c: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadband_c: Option<f64>,
    #[serde(default = "default_capacity_w")]
    pub capacity_w: f64,
    #[serde(default = "default_efficiency")]
    pub efficiency: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_power_kw: Option<f64>,
    #[serde(default)]
    pub use_ideal_mode: bool,
}

fn default_setpoint() -> f64 {
    tn_equipment::water_heater::DEFAULT_SETPOINT_C
}

fn default_capacity_w() -> f64 {
    4500.0
}

fn default_efficiency() -> f64 {
    1.0
}

impl HeaterDef {
    pub fn to_config(&self) -> WaterHeaterConfig {
        let defaults = WaterHeaterConfig::default();
        WaterHeaterConfig {
            name: self.name.clone().unwrap_or(defaults.name),
            setpoint_c: self.setpoint_c,
            deadband_c: self.deadband_c,
            capacity: w(self.capacity_w),
            efficiency: self.efficiency,
            max_power: self.max_power_kw.map(|p| w(p * 1000.0)),
            use_ideal_mode: self.use_ideal_mode,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeatPumpDef {
    pub cop_nominal: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity_w: Option<f64>,
    pub power_w: f64,
    pub fan_power_w: f64,
    pub parasitic_power_w: f64,
    pub shr_nominal: f64,
    pub interaction_factor: f64,
    pub min_on_time_min: f64,
    pub min_off_time_min: f64,
    pub hp_only: bool,
    pub element_deadband_c: f64,
}

impl Default for HeatPumpDef {
    fn default() -> Self {
        Self {
            cop_nominal: 2.5,
            capacity_w: None,
            power_w: 500.0,
            fan_power_w: 35.0,
            parasitic_power_w: 1.0,
            shr_nominal: 0.88,
            interaction_factor: 1.0,
            min_on_time_min: 10.0,
            min_off_time_min: 0.0,
            hp_only: false,
            element_deadband_c: DEFAULT_DEADBAND_C,
        }
    }
}

impl HeatPumpDef {
    pub fn to_config(&self) -> HeatPumpConfig {
        HeatPumpConfig {
            cop_nominal: self.cop_nominal,
            capacity: self.capacity_w.map(w),
            power: w(self.power_w),
            fan_power: w(self.fan_power_w),
            parasitic_power: w(self.parasitic_power_w),
            shr_nominal: self.shr_nominal,
            interaction_factor: self.interaction_factor,
            min_on_time: minutes(self.min_on_time_min),
            min_off_time: minutes(self.min_off_time_min),
            hp_only: self.hp_only,
            element_deadband_c: self.element_deadband_c,
        }
    }
}

/// Constant zone conditions around the equipment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AmbientDef {
    #[serde(default = "default_zone_temp")]
    pub zone_temp_c: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_wet_bulb_c: Option<f64>,
}

fn default_zone_temp() -> f64 {
    20.0
}

impl Default for AmbientDef {
    fn default() -> Self {
        Self {
            zone_temp_c: default_zone_temp(),
            zone_wet_bulb_c: None,
        }
    }
}

impl AmbientDef {
    pub fn conditions(&self) -> AmbientConditions {
        match self.zone_wet_bulb_c {
            Some(wb) => AmbientConditions::with_wet_bulb(self.zone_temp_c, wb),
            None => AmbientConditions::dry(self.zone_temp_c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equipment_tag_and_flattened_fields() {
        let yaml = r#"
kind: gas_water_heater
setpoint_c: 50.0
energy_factor: 0.62
"#;
        let def: EquipmentDef = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.kind(), "gas_water_heater");
        assert_eq!(def.heater().setpoint_c, 50.0);
        assert_eq!(def.heater().capacity_w, 4500.0);
        assert!(matches!(def, EquipmentDef::GasWaterHeater { energy_factor, .. } if energy_factor == 0.62));
    }

    #[test]
    fn heat_pump_defaults_fill_in() {
        let yaml = r#"
kind: heat_pump_water_heater
heat_pump:
  cop_nominal: 3.0
"#;
        let def: EquipmentDef = serde_yaml::from_str(yaml).unwrap();
        let EquipmentDef::HeatPumpWaterHeater { heat_pump, .. } = def else {
            panic!("wrong variant");
        };
        assert_eq!(heat_pump.cop_nominal, 3.0);
        assert_eq!(heat_pump.fan_power_w, 35.0);
        assert_eq!(heat_pump.min_on_time_min, 10.0);
    }

    #[test]
    fn weighted_output_conversion() {
        let def = WeightedOutputDef {
            name: "T_AVG".into(),
            states: [("T_A".to_string(), 0.5), ("T_B".to_string(), 0.5)].into(),
            inputs: BTreeMap::new(),
        };
        let out = def.to_output();
        assert_eq!(out.name, "T_AVG");
        assert_eq!(out.states.len(), 2);
        assert!(out.inputs.is_empty());
    }

    #[test]
    fn ambient_without_wet_bulb_is_dry() {
        let amb = AmbientDef::default().conditions();
        assert_eq!(amb.zone_temp_c, 20.0);
        assert_eq!(amb.zone_wet_bulb_c, None);
    }
}

//! Scenario validation logic.
//!
//! Structural checks that do not need a built model. Name resolution against
//! the reduced network happens when the model is built.

use tn_network::RcParam;

use crate::schema::{EquipmentDef, HeaterDef, ModelDef, NetworkDef, Scenario, WaterTankDef};

/// Tank node counts the heat pump condenser profile is defined for.
const HEAT_PUMP_TANK_NODES: [usize; 3] = [1, 2, 12];

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing value: {field} ({reason})")]
    Missing { field: String, reason: String },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive"))
    }
}

fn finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be finite"))
    }
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    positive("time_res_s", scenario.time_res_s)?;
    if scenario.steps == 0 {
        return Err(invalid("steps", 0, "must be at least 1"));
    }
    if scenario.record_every == 0 {
        return Err(invalid("record_every", 0, "must be at least 1"));
    }
    if scenario.verbosity > 9 {
        return Err(invalid("verbosity", scenario.verbosity, "must be 0-9"));
    }
    finite("ambient.zone_temp_c", scenario.ambient.zone_temp_c)?;
    if let Some(wb) = scenario.ambient.zone_wet_bulb_c {
        finite("ambient.zone_wet_bulb_c", wb)?;
    }

    match &scenario.model {
        ModelDef::Network(network) => validate_network(network)?,
        ModelDef::WaterTank(tank) => validate_tank(tank)?,
    }

    if let Some(equipment) = &scenario.equipment {
        let ModelDef::WaterTank(tank) = &scenario.model else {
            return Err(ValidationError::Unsupported {
                feature: equipment.kind().to_string(),
                reason: "equipment requires a water_tank model".to_string(),
            });
        };
        validate_equipment(equipment, tank, scenario)?;
    }

    Ok(())
}

fn validate_network(network: &NetworkDef) -> Result<(), ValidationError> {
    if network.params.is_empty() {
        return Err(ValidationError::Missing {
            field: "model.params".to_string(),
            reason: "a network needs at least one parameter".to_string(),
        });
    }
    for (name, &value) in &network.params {
        RcParam::parse(name, value)
            .map_err(|e| invalid("model.params", name, &e.to_string()))?;
        if !(value.is_finite() && value >= 0.0) {
            return Err(invalid(
                &format!("model.params.{name}"),
                value,
                "must be finite and non-negative",
            ));
        }
    }
    for (name, &value) in network.initial_states.iter().chain(&network.inputs) {
        finite(name, value)?;
    }
    for output in &network.outputs {
        if output.name.is_empty() {
            return Err(ValidationError::Missing {
                field: "model.outputs.name".to_string(),
                reason: "outputs must be named".to_string(),
            });
        }
        if output.states.is_empty() && output.inputs.is_empty() {
            return Err(ValidationError::Missing {
                field: format!("model.outputs.{}", output.name),
                reason: "output has no states or inputs".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_tank(tank: &WaterTankDef) -> Result<(), ValidationError> {
    if tank.nodes == 0 {
        return Err(invalid("model.nodes", 0, "must be at least 1"));
    }
    positive("model.volume_l", tank.volume_l)?;
    positive("model.ua_w_per_k", tank.ua_w_per_k)?;
    positive("model.node_resistance_k_per_w", tank.node_resistance_k_per_w)?;
    finite("model.initial_temp_c", tank.initial_temp_c)
}

fn validate_heater(heater: &HeaterDef) -> Result<(), ValidationError> {
    finite("equipment.setpoint_c", heater.setpoint_c)?;
    if let Some(db) = heater.deadband_c {
        positive("equipment.deadband_c", db)?;
    }
    positive("equipment.capacity_w", heater.capacity_w)?;
    positive("equipment.efficiency", heater.efficiency)?;
    if let Some(p) = heater.max_power_kw {
        positive("equipment.max_power_kw", p)?;
    }
    Ok(())
}

fn validate_equipment(
    equipment: &EquipmentDef,
    tank: &WaterTankDef,
    scenario: &Scenario,
) -> Result<(), ValidationError> {
    validate_heater(equipment.heater())?;
    match equipment {
        EquipmentDef::GasWaterHeater { energy_factor, .. } => {
            if !(*energy_factor > 0.0 && *energy_factor <= 1.0) {
                return Err(invalid(
                    "equipment.energy_factor",
                    energy_factor,
                    "must be in (0, 1]",
                ));
            }
        }
        EquipmentDef::HeatPumpWaterHeater { heat_pump, .. } => {
            if !HEAT_PUMP_TANK_NODES.contains(&tank.nodes) {
                return Err(ValidationError::Unsupported {
                    feature: format!("heat pump with {}-node tank", tank.nodes),
                    reason: "supported tanks have 1, 2 or 12 nodes".to_string(),
                });
            }
            if scenario.ambient.zone_wet_bulb_c.is_none() {
                return Err(ValidationError::Missing {
                    field: "ambient.zone_wet_bulb_c".to_string(),
                    reason: "heat pump performance depends on wet bulb".to_string(),
                });
            }
            positive("equipment.heat_pump.cop_nominal", heat_pump.cop_nominal)?;
            positive("equipment.heat_pump.power_w", heat_pump.power_w)?;
            if let Some(c) = heat_pump.capacity_w {
                positive("equipment.heat_pump.capacity_w", c)?;
            }
            if !(0.0..=1.0).contains(&heat_pump.shr_nominal) {
                return Err(invalid(
                    "equipment.heat_pump.shr_nominal",
                    heat_pump.shr_nominal,
                    "must be in [0, 1]",
                ));
            }
            if !(0.0..=1.0).contains(&heat_pump.interaction_factor) {
                return Err(invalid(
                    "equipment.heat_pump.interaction_factor",
                    heat_pump.interaction_factor,
                    "must be in [0, 1]",
                ));
            }
            for (field, t) in [
                ("equipment.heat_pump.min_on_time_min", heat_pump.min_on_time_min),
                ("equipment.heat_pump.min_off_time_min", heat_pump.min_off_time_min),
            ] {
                if !(t.is_finite() && t >= 0.0) {
                    return Err(invalid(field, t, "must be non-negative"));
                }
            }
        }
        EquipmentDef::WaterHeater(_) | EquipmentDef::ElectricResistanceWaterHeater(_) => {}
    }
    Ok(())
}

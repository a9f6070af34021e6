//! Conversion of scenarios into runnable models and equipment.

use nalgebra::DVector;
use tn_equipment::{
    ElectricResistanceWaterHeater, GasWaterHeater, HeatPumpWaterHeater, SimOptions, SimRecord,
    ThermostaticEquipment, WaterHeater, WaterTank, run_model, run_sim,
};
use tn_statespace::{RcModel, RcModelConfig, StateSpaceModel};
use tracing::info;

use crate::ProjectResult;
use crate::schema::{EquipmentDef, ModelDef, NetworkDef, Scenario};

/// A scenario ready to run.
pub enum Runtime {
    /// RC model stepped with constant inputs.
    Passive(RcModel),
    /// Thermostatic equipment on a water tank.
    Equipment(Box<dyn ThermostaticEquipment>),
}

impl Runtime {
    pub fn model(&self) -> &StateSpaceModel {
        match self {
            Runtime::Passive(rc) => rc.model(),
            Runtime::Equipment(e) => e.heater().tank().model(),
        }
    }

    pub fn state_names(&self) -> &[String] {
        self.model().state_names().names()
    }

    pub fn run(&mut self, scenario: &Scenario) -> ProjectResult<SimRecord> {
        let opts = sim_options(scenario);
        let record = match self {
            Runtime::Passive(rc) => run_model(rc.model_mut(), &opts)?,
            Runtime::Equipment(e) => {
                let ambient = scenario.ambient.conditions();
                run_sim(e.as_mut(), &opts, |_| ambient)?
            }
        };
        Ok(record)
    }
}

pub fn sim_options(scenario: &Scenario) -> SimOptions {
    SimOptions {
        start: scenario.start,
        steps: scenario.steps,
        record_every: scenario.record_every,
    }
}

/// Build the model (and equipment, if any) described by `scenario`.
pub fn build_runtime(scenario: &Scenario) -> ProjectResult<Runtime> {
    let time_res = tn_core::s(scenario.time_res_s);
    let runtime = match &scenario.model {
        ModelDef::Network(def) => Runtime::Passive(build_network(def, scenario)?),
        ModelDef::WaterTank(def) => {
            let mut tank = WaterTank::new(&def.to_config(), time_res)?;
            tank.set_ambient(scenario.ambient.zone_temp_c)?;
            match &scenario.equipment {
                Some(equipment) => Runtime::Equipment(build_equipment(equipment, tank)?),
                None => Runtime::Passive(tank.into_rc()),
            }
        }
    };
    let model = runtime.model();
    info!(
        scenario = %scenario.name,
        states = model.n_states(),
        inputs = model.n_inputs(),
        equipment = scenario.equipment.as_ref().map(EquipmentDef::kind).unwrap_or("none"),
        "scenario built"
    );
    Ok(runtime)
}

fn build_network(def: &NetworkDef, scenario: &Scenario) -> ProjectResult<RcModel> {
    let config = RcModelConfig::new(&scenario.name, tn_core::s(scenario.time_res_s))
        .with_unused_inputs(def.unused_inputs.clone())
        .with_outputs(def.outputs.iter().map(|o| o.to_output()).collect());
    let params = def.params.iter().map(|(name, value)| (name.as_str(), *value));
    let mut rc = RcModel::from_named_params(params, &def.external_nodes, config)?;

    let model = rc.model_mut();
    if !def.initial_states.is_empty() {
        let mut x = DVector::zeros(model.n_states());
        for (name, value) in &def.initial_states {
            x[model.state_names().index(name)?] = *value;
        }
        model.set_states(x)?;
    }
    for (name, value) in &def.inputs {
        model.set_next_input(name, *value)?;
    }
    Ok(rc)
}

fn build_equipment(
    def: &EquipmentDef,
    tank: WaterTank,
) -> ProjectResult<Box<dyn ThermostaticEquipment>> {
    let config = def.heater().to_config();
    Ok(match def {
        EquipmentDef::WaterHeater(_) => Box::new(WaterHeater::new(config, tank)?),
        EquipmentDef::GasWaterHeater { energy_factor, .. } => {
            Box::new(GasWaterHeater::new(config, tank, *energy_factor)?)
        }
        EquipmentDef::ElectricResistanceWaterHeater(_) => {
            Box::new(ElectricResistanceWaterHeater::new(config, tank)?)
        }
        EquipmentDef::HeatPumpWaterHeater { heat_pump, .. } => Box::new(HeatPumpWaterHeater::new(
            config,
            heat_pump.to_config(),
            tank,
        )?),
    })
}

//! State-space model built from named RC parameters.

use nalgebra::DVector;
use tn_core::Time;
use tn_network::{NameIndex, RcNetwork, RcNetworkBuilder, RcParam, parse_params};
use tracing::{info, warn};

use crate::error::{StateSpaceError, StateSpaceResult};
use crate::matrices::rc_matrices;
use crate::model::{OutputDef, StateSpaceModel};

/// Construction options for [`RcModel`].
#[derive(Debug, Clone)]
pub struct RcModelConfig {
    pub name: String,
    pub time_res: Time,
    /// Input names to drop from `B`. Unknown names are ignored.
    pub unused_inputs: Vec<String>,
    pub initial_states: Option<Vec<f64>>,
    pub outputs: Vec<OutputDef>,
}

impl RcModelConfig {
    pub fn new(name: impl Into<String>, time_res: Time) -> Self {
        Self {
            name: name.into(),
            time_res,
            unused_inputs: Vec::new(),
            initial_states: None,
            outputs: Vec::new(),
        }
    }

    pub fn with_unused_inputs<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.unused_inputs.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_initial_states(mut self, states: Vec<f64>) -> Self {
        self.initial_states = Some(states);
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<OutputDef>) -> Self {
        self.outputs = outputs;
        self
    }
}

/// An RC network together with its discretized state-space model.
#[derive(Debug, Clone)]
pub struct RcModel {
    network: RcNetwork,
    model: StateSpaceModel,
    /// Input index of `H_<node>` for each state, if that input was kept.
    heat_inputs: Vec<Option<usize>>,
}

impl RcModel {
    /// Build from `R_*`/`C_*` name → value pairs.
    pub fn from_named_params<I, S, E>(
        params: I,
        external_nodes: &[E],
        config: RcModelConfig,
    ) -> StateSpaceResult<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
        E: AsRef<str>,
    {
        let params = parse_params(params)?;
        Self::from_params(&params, external_nodes, config)
    }

    pub fn from_params<E: AsRef<str>>(
        params: &[RcParam],
        external_nodes: &[E],
        config: RcModelConfig,
    ) -> StateSpaceResult<Self> {
        let network = RcNetworkBuilder::from_params(params, external_nodes).build()?;
        Self::from_network(network, config)
    }

    /// Single node `INT` tied to external node `EXT` through `resistance`.
    pub fn one_node(
        resistance: f64,
        capacitance: f64,
        config: RcModelConfig,
    ) -> StateSpaceResult<Self> {
        let params = [
            RcParam::resistor("INT", "EXT", resistance),
            RcParam::capacitor("INT", capacitance),
        ];
        Self::from_params(&params, &["EXT"], config)
    }

    pub fn from_network(network: RcNetwork, config: RcModelConfig) -> StateSpaceResult<Self> {
        let (a_c, b_c) = rc_matrices(&network)?;
        let mut inputs = NameIndex::new("input", network.input_names());

        for name in &config.unused_inputs {
            if !inputs.contains(name) {
                warn!(model = %config.name, input = %name, "unused input not found, ignoring");
            }
        }
        let kept = inputs.retain(|n| !config.unused_inputs.iter().any(|u| u == n));
        let b_c = b_c.select_columns(kept.iter());

        let initial = config.initial_states.map(DVector::from_vec);
        let model = StateSpaceModel::new(
            config.name,
            network.state_names(),
            inputs.names().to_vec(),
            a_c,
            b_c,
            config.time_res,
            initial,
        )?
        .with_outputs(&config.outputs)?;

        let heat_inputs = network
            .internal_names()
            .iter()
            .map(|n| model.input_names().get(&format!("H_{n}")))
            .collect();

        info!(
            model = %model.name(),
            states = model.n_states(),
            inputs = model.n_inputs(),
            eliminated = network.eliminated_names().len(),
            "built RC model"
        );
        Ok(Self {
            network,
            model,
            heat_inputs,
        })
    }

    pub fn network(&self) -> &RcNetwork {
        &self.network
    }

    pub fn model(&self) -> &StateSpaceModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut StateSpaceModel {
        &mut self.model
    }

    /// Capacitance of each state, J/K.
    pub fn capacitances(&self) -> &[f64] {
        self.network.capacitances()
    }

    pub fn n_nodes(&self) -> usize {
        self.heat_inputs.len()
    }

    /// Input index of the heat injection into `state`, if present.
    pub fn heat_input_index(&self, state: usize) -> Option<usize> {
        self.heat_inputs.get(state).copied().flatten()
    }

    /// Input change that adds `heats` (W, one per state) to the next inputs.
    pub fn heat_delta(&self, heats: &[f64]) -> StateSpaceResult<DVector<f64>> {
        if heats.len() != self.n_nodes() {
            return Err(StateSpaceError::Dimension {
                what: "node heats",
                expected: self.n_nodes(),
                actual: heats.len(),
            });
        }
        let mut delta = DVector::zeros(self.model.n_inputs());
        for (state, &h) in heats.iter().enumerate() {
            match self.heat_input_index(state) {
                Some(idx) => delta[idx] += h,
                None if h != 0.0 => {
                    return Err(StateSpaceError::InvalidArg {
                        what: format!(
                            "heat into {} but its input was dropped",
                            self.model.state_names().name(state).unwrap_or("?")
                        ),
                    });
                }
                None => {}
            }
        }
        Ok(delta)
    }

    /// Stage the next states with extra per-node heat on top of the next inputs.
    pub fn update_with_heat(&mut self, heats: &[f64]) -> StateSpaceResult<&DVector<f64>> {
        let delta = self.heat_delta(heats)?;
        self.model.update(Some(&delta))
    }
}

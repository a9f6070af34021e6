//! Incremental RC network builder.

use std::collections::HashMap;

use tn_core::NodeId;
use tracing::{debug, info};

use crate::error::{NetworkError, NetworkResult};
use crate::network::RcNetwork;
use crate::param::{ParamKind, RcParam};
use crate::reduce::ResistorSet;
use crate::validate;

/// Builder for constructing an RC network incrementally.
///
/// Use `add_capacitor`, `add_resistor` and `add_external` to describe the
/// network, then call `build()` to validate it, eliminate floating nodes and
/// freeze it into an immutable `RcNetwork`.
#[derive(Debug, Default)]
pub struct RcNetworkBuilder {
    pub(crate) names: Vec<String>,
    by_name: HashMap<String, NodeId>,
    pub(crate) capacitors: Vec<(NodeId, f64)>,
    pub(crate) resistors: Vec<(NodeId, NodeId, f64)>,
    pub(crate) external: Vec<NodeId>,
}

impl RcNetworkBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from parsed parameters and external node names.
    ///
    /// External names are upper-cased to match parsed parameter names.
    pub fn from_params<S: AsRef<str>>(params: &[RcParam], external_nodes: &[S]) -> Self {
        let mut builder = Self::new();
        for name in external_nodes {
            builder.add_external(name.as_ref().to_uppercase());
        }
        for param in params {
            builder.add_param(param);
        }
        builder
    }

    /// Intern a node name and return its ID.
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        let name = name.into();
        if let Some(&id) = self.by_name.get(&name) {
            return id;
        }
        let id = NodeId::from_index(self.names.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.names.push(name);
        id
    }

    /// Mark a node as external (a boundary condition).
    pub fn add_external(&mut self, name: impl Into<String>) -> NodeId {
        let id = self.add_node(name);
        if !self.external.contains(&id) {
            self.external.push(id);
        }
        id
    }

    pub fn add_capacitor(&mut self, node: impl Into<String>, value: f64) -> NodeId {
        let id = self.add_node(node);
        self.capacitors.push((id, value));
        id
    }

    pub fn add_resistor(
        &mut self,
        node_a: impl Into<String>,
        node_b: impl Into<String>,
        value: f64,
    ) {
        let a = self.add_node(node_a);
        let b = self.add_node(node_b);
        self.resistors.push((a, b, value));
    }

    pub fn add_param(&mut self, param: &RcParam) {
        match (param.kind, &param.node_b) {
            (ParamKind::Resistor, Some(b)) => {
                self.add_resistor(param.node_a.clone(), b.clone(), param.value)
            }
            _ => {
                self.add_capacitor(param.node_a.clone(), param.value);
            }
        }
    }

    /// Validate, eliminate floating nodes and return an immutable `RcNetwork`.
    ///
    /// Floating nodes are eliminated one at a time in the order they first
    /// appear in the resistor list, each pass working on the accumulated set.
    pub fn build(self) -> NetworkResult<RcNetwork> {
        if self.capacitors.is_empty() && self.resistors.is_empty() {
            return Err(NetworkError::EmptyParameters);
        }
        validate::validate_values(&self)?;
        validate::validate_capacitors(&self)?;

        let internal: Vec<NodeId> = self.capacitors.iter().map(|&(id, _)| id).collect();
        let capacitances: Vec<f64> = self.capacitors.iter().map(|&(_, c)| c).collect();

        let mut floating = Vec::new();
        for &(a, b, _) in &self.resistors {
            for node in [a, b] {
                if !internal.contains(&node)
                    && !self.external.contains(&node)
                    && !floating.contains(&node)
                {
                    floating.push(node);
                }
            }
        }

        let mut resistors: ResistorSet = self.resistors.iter().copied().collect();
        for &node in &floating {
            let name = &self.names[node.index() as usize];
            resistors = resistors.eliminate(node).map_err(|err| match err {
                NetworkError::AmbiguousShort { count, .. } => NetworkError::AmbiguousShort {
                    node: name.clone(),
                    count,
                },
                other => other,
            })?;
            debug!(node = %name, remaining = resistors.len(), "eliminated floating node");
        }

        let network = RcNetwork {
            names: self.names,
            internal,
            external: self.external,
            capacitances,
            resistors,
            eliminated: floating,
        };
        validate::validate_reduced(&network)?;

        info!(
            states = network.internal.len(),
            externals = network.external.len(),
            eliminated = network.eliminated.len(),
            resistors = network.resistors.len(),
            "built RC network"
        );
        Ok(network)
    }
}

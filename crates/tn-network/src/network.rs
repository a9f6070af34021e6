//! Reduced RC network data structure.

use tn_core::NodeId;

use crate::reduce::ResistorSet;

/// Role of a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Has a capacitance; becomes a state.
    Internal,
    /// Boundary condition; becomes a temperature input.
    External,
    /// No capacitance and not external; eliminated before matrix construction.
    Floating,
}

/// A validated RC network with all floating nodes eliminated.
///
/// Internal node order fixes the state order, external node order fixes the
/// temperature-input order. Neither changes after construction.
#[derive(Debug, Clone)]
pub struct RcNetwork {
    pub(crate) names: Vec<String>,
    pub(crate) internal: Vec<NodeId>,
    pub(crate) external: Vec<NodeId>,
    /// Aligned with `internal`.
    pub(crate) capacitances: Vec<f64>,
    pub(crate) resistors: ResistorSet,
    pub(crate) eliminated: Vec<NodeId>,
}

impl RcNetwork {
    /// Name of a node (empty for unknown IDs).
    pub fn node_name(&self, id: NodeId) -> &str {
        self.names
            .get(id.index() as usize)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Look up a node by name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| NodeId::from_index(i as u32))
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        if self.internal.contains(&id) {
            NodeKind::Internal
        } else if self.external.contains(&id) {
            NodeKind::External
        } else {
            NodeKind::Floating
        }
    }

    pub fn internal_nodes(&self) -> &[NodeId] {
        &self.internal
    }

    pub fn external_nodes(&self) -> &[NodeId] {
        &self.external
    }

    pub fn internal_names(&self) -> Vec<&str> {
        self.internal.iter().map(|&id| self.node_name(id)).collect()
    }

    pub fn external_names(&self) -> Vec<&str> {
        self.external.iter().map(|&id| self.node_name(id)).collect()
    }

    /// Names of the eliminated floating nodes, in elimination order.
    pub fn eliminated_names(&self) -> Vec<&str> {
        self.eliminated.iter().map(|&id| self.node_name(id)).collect()
    }

    /// Capacitances in internal-node order.
    pub fn capacitances(&self) -> &[f64] {
        &self.capacitances
    }

    /// Position of a node among the internal nodes.
    pub fn internal_index(&self, id: NodeId) -> Option<usize> {
        self.internal.iter().position(|&n| n == id)
    }

    /// Position of a node among the external nodes.
    pub fn external_index(&self, id: NodeId) -> Option<usize> {
        self.external.iter().position(|&n| n == id)
    }

    /// The reduced resistor set.
    pub fn resistors(&self) -> &ResistorSet {
        &self.resistors
    }

    /// State names: `T_<internal>`.
    pub fn state_names(&self) -> Vec<String> {
        self.internal_names()
            .into_iter()
            .map(|n| format!("T_{n}"))
            .collect()
    }

    /// Input names: `T_<external>` followed by `H_<internal>`.
    pub fn input_names(&self) -> Vec<String> {
        let temps = self.external_names().into_iter().map(|n| format!("T_{n}"));
        let heats = self.internal_names().into_iter().map(|n| format!("H_{n}"));
        temps.chain(heats).collect()
    }
}

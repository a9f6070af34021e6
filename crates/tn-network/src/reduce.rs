//! Resistor sets and star-mesh elimination of floating nodes.
//!
//! A floating node has no capacitance, so it cannot become a state. It is
//! removed by replacing its star of resistors with an equivalent mesh among
//! its neighbors (<https://en.wikipedia.org/wiki/Star-mesh_transform>).

use std::collections::{BTreeMap, BTreeSet};

use tn_core::NodeId;

use crate::error::{NetworkError, NetworkResult};

/// Parallel combination of resistances: `1 / Σ(1/r_i)`.
///
/// Any zero resistance short-circuits the combination to 0. An empty slice
/// is an open circuit (infinite resistance).
pub fn par(values: &[f64]) -> f64 {
    if values.iter().any(|&r| r == 0.0) {
        return 0.0;
    }
    1.0 / values.iter().map(|r| 1.0 / r).sum::<f64>()
}

/// Undirected resistors keyed by node pair.
///
/// At most one resistor exists per pair; adding a second one combines the two
/// in parallel. Self-loops are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResistorSet {
    edges: BTreeMap<(NodeId, NodeId), f64>,
}

fn key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b { (a, b) } else { (b, a) }
}

impl ResistorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resistor, combining in parallel with any existing one.
    pub fn insert_parallel(&mut self, a: NodeId, b: NodeId, r: f64) {
        if a == b {
            return;
        }
        self.edges
            .entry(key(a, b))
            .and_modify(|existing| *existing = par(&[*existing, r]))
            .or_insert(r);
    }

    /// Resistance between two nodes, if they are directly connected.
    pub fn get(&self, a: NodeId, b: NodeId) -> Option<f64> {
        self.edges.get(&key(a, b)).copied()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Iterate `(node_a, node_b, resistance)` in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeId, f64)> + '_ {
        self.edges.iter().map(|(&(a, b), &r)| (a, b, r))
    }

    /// All nodes touched by at least one resistor.
    pub fn nodes(&self) -> BTreeSet<NodeId> {
        self.edges.keys().flat_map(|&(a, b)| [a, b]).collect()
    }

    /// Neighbors of `node` with the connecting resistance.
    pub fn neighbors(&self, node: NodeId) -> Vec<(NodeId, f64)> {
        self.edges
            .iter()
            .filter_map(|(&(a, b), &r)| {
                if a == node {
                    Some((b, r))
                } else if b == node {
                    Some((a, r))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Remove `node` and return an electrically equivalent resistor set.
    ///
    /// Resistors not touching `node` are kept. With exactly one zero-valued
    /// adjacent resistor the node is merged into that neighbor; with none the
    /// star-mesh formula `r_i * r_j / par(r_1..r_k)` connects every neighbor
    /// pair. New resistors combine in parallel with existing ones.
    pub fn eliminate(&self, node: NodeId) -> NetworkResult<ResistorSet> {
        let adjacent = self.neighbors(node);
        let mut reduced = ResistorSet {
            edges: self
                .edges
                .iter()
                .filter(|&(&(a, b), _)| a != node && b != node)
                .map(|(&k, &r)| (k, r))
                .collect(),
        };

        let zeros: Vec<NodeId> = adjacent
            .iter()
            .filter(|(_, r)| *r == 0.0)
            .map(|(n, _)| *n)
            .collect();

        match zeros.as_slice() {
            [] => {
                let values: Vec<f64> = adjacent.iter().map(|(_, r)| *r).collect();
                let r_parallel = par(&values);
                for (i, &(n1, r1)) in adjacent.iter().enumerate() {
                    for &(n2, r2) in &adjacent[i + 1..] {
                        reduced.insert_parallel(n1, n2, r1 * r2 / r_parallel);
                    }
                }
            }
            [short] => {
                for &(other, r) in &adjacent {
                    if other != *short {
                        reduced.insert_parallel(*short, other, r);
                    }
                }
            }
            many => {
                return Err(NetworkError::AmbiguousShort {
                    node: node.to_string(),
                    count: many.len(),
                });
            }
        }

        Ok(reduced)
    }

    /// Equivalent resistance between `a` and `b` seen through the network.
    ///
    /// Every other node is eliminated; `None` when `a` and `b` are not
    /// connected.
    pub fn effective_resistance(&self, a: NodeId, b: NodeId) -> NetworkResult<Option<f64>> {
        if a == b {
            return Ok(Some(0.0));
        }
        let mut reduced = self.clone();
        for node in self.nodes() {
            if node != a && node != b {
                reduced = reduced.eliminate(node)?;
            }
        }
        Ok(reduced.get(a, b))
    }
}

impl FromIterator<(NodeId, NodeId, f64)> for ResistorSet {
    fn from_iter<T: IntoIterator<Item = (NodeId, NodeId, f64)>>(iter: T) -> Self {
        let mut set = ResistorSet::new();
        for (a, b, r) in iter {
            set.insert_parallel(a, b, r);
        }
        set
    }
}

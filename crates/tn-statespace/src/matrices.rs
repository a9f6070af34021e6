//! Continuous-time system matrices from a reduced RC network.

use nalgebra::DMatrix;
use tn_network::{NetworkError, RcNetwork};

use crate::error::StateSpaceResult;

/// Build continuous-time `A` (n×n) and `B` (n×(m+n)) from a reduced network.
///
/// Columns of `B` are the `m` external temperatures followed by one heat
/// input per state, whose block is `diag(1/C)`. Each resistor adds `1/(C·R)`
/// terms: between two states in `A` only, between a state and an external
/// node in the state's diagonal of `A` and in `B`.
pub fn rc_matrices(network: &RcNetwork) -> StateSpaceResult<(DMatrix<f64>, DMatrix<f64>)> {
    let caps = network.capacitances();
    let n = caps.len();
    let m = network.external_nodes().len();

    let mut a = DMatrix::zeros(n, n);
    let mut b = DMatrix::zeros(n, m + n);
    for (i, &c) in caps.iter().enumerate() {
        b[(i, m + i)] = 1.0 / c;
    }

    for (node1, node2, r) in network.resistors().iter() {
        match (network.internal_index(node1), network.internal_index(node2)) {
            (Some(i1), Some(i2)) => {
                let g1 = 1.0 / caps[i1] / r;
                let g2 = 1.0 / caps[i2] / r;
                a[(i1, i1)] -= g1;
                a[(i2, i2)] -= g2;
                a[(i1, i2)] += g1;
                a[(i2, i1)] += g2;
            }
            (Some(i_int), None) | (None, Some(i_int)) => {
                let other = if network.internal_index(node1).is_some() {
                    node2
                } else {
                    node1
                };
                let i_ext = network.external_index(other).ok_or_else(|| {
                    NetworkError::UnresolvedResistor {
                        node_a: network.node_name(node1).to_string(),
                        node_b: network.node_name(node2).to_string(),
                    }
                })?;
                let g = 1.0 / caps[i_int] / r;
                a[(i_int, i_int)] -= g;
                b[(i_int, i_ext)] += g;
            }
            (None, None) => {
                return Err(NetworkError::UnresolvedResistor {
                    node_a: network.node_name(node1).to_string(),
                    node_b: network.node_name(node2).to_string(),
                }
                .into());
            }
        }
    }

    Ok((a, b))
}

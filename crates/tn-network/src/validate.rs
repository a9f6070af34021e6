//! Network validation logic.

use std::collections::HashSet;

use tn_core::{TnError, ensure_non_negative, ensure_positive};

use crate::builder::RcNetworkBuilder;
use crate::error::{NetworkError, NetworkResult};
use crate::network::RcNetwork;

fn resistor_name(names: &[String], a: usize, b: usize) -> String {
    format!("R_{}_{}", names[a], names[b])
}

/// All values finite; capacitances positive; resistances non-negative.
///
/// Zero resistances are allowed here because a zero edge on a floating node
/// means "merge into the neighbor". Any zero that survives reduction is
/// rejected by `validate_reduced`.
pub(crate) fn validate_values(builder: &RcNetworkBuilder) -> NetworkResult<()> {
    let names = &builder.names;
    let mut bad = Vec::new();

    let capacitors = builder.capacitors.iter().map(|&(id, c)| {
        (
            format!("C_{}", names[id.index() as usize]),
            ensure_positive(c, "capacitance"),
        )
    });
    let resistors = builder.resistors.iter().map(|&(a, b, r)| {
        (
            resistor_name(names, a.index() as usize, b.index() as usize),
            ensure_non_negative(r, "resistance"),
        )
    });
    for (name, checked) in capacitors.chain(resistors) {
        match checked {
            Ok(_) => {}
            Err(TnError::NonPositive { .. }) => bad.push(name),
            Err(_) => return Err(NetworkError::NonFinite { name }),
        }
    }

    if bad.is_empty() {
        Ok(())
    } else {
        Err(NetworkError::NonPositive { names: bad })
    }
}

/// At most one capacitance per node, none on external nodes.
pub(crate) fn validate_capacitors(builder: &RcNetworkBuilder) -> NetworkResult<()> {
    let mut seen = HashSet::new();
    for &(id, _) in &builder.capacitors {
        let node = builder.names[id.index() as usize].clone();
        if builder.external.contains(&id) {
            return Err(NetworkError::CapacitorOnExternal { node });
        }
        if !seen.insert(id) {
            return Err(NetworkError::DuplicateCapacitor { node });
        }
    }
    Ok(())
}

/// Every remaining resistor is positive and touches a capacitive node.
pub(crate) fn validate_reduced(network: &RcNetwork) -> NetworkResult<()> {
    let names = &network.names;
    let mut bad = Vec::new();

    for (a, b, r) in network.resistors.iter() {
        if r <= 0.0 {
            bad.push(resistor_name(names, a.index() as usize, b.index() as usize));
        }
    }
    if !bad.is_empty() {
        return Err(NetworkError::NonPositive { names: bad });
    }

    for (a, b, _) in network.resistors.iter() {
        if !network.internal.contains(&a) && !network.internal.contains(&b) {
            return Err(NetworkError::UnresolvedResistor {
                node_a: names[a.index() as usize].clone(),
                node_b: names[b.index() as usize].clone(),
            });
        }
    }

    Ok(())
}

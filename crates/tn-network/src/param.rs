//! Typed RC parameter records.
//!
//! Parameter names encode topology: `C_<node>` is the capacitance of a node
//! and `R_<node1>_<node2>` is a resistor between two nodes. Names are parsed
//! once here; nothing downstream looks at the encoded strings again.

use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, NetworkResult};

/// Whether a parameter is a resistance or a capacitance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKind {
    /// Thermal resistance, K/W.
    Resistor,
    /// Thermal capacitance, J/K.
    Capacitor,
}

/// One RC parameter: kind, endpoint node(s) and value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RcParam {
    pub kind: ParamKind,
    pub node_a: String,
    /// Second endpoint, only for resistors.
    pub node_b: Option<String>,
    pub value: f64,
}

impl RcParam {
    pub fn resistor(node_a: impl Into<String>, node_b: impl Into<String>, value: f64) -> Self {
        Self {
            kind: ParamKind::Resistor,
            node_a: node_a.into(),
            node_b: Some(node_b.into()),
            value,
        }
    }

    pub fn capacitor(node: impl Into<String>, value: f64) -> Self {
        Self {
            kind: ParamKind::Capacitor,
            node_a: node.into(),
            node_b: None,
            value,
        }
    }

    /// Parse an encoded parameter name such as `R_WH1_AMB` or `c_wh1`.
    ///
    /// Node names are upper-cased and may not contain underscores.
    pub fn parse(name: &str, value: f64) -> NetworkResult<Self> {
        let upper = name.to_uppercase();
        let mut parts = upper.split('_');
        let prefix = parts.next().unwrap_or_default();
        let nodes: Vec<&str> = parts.collect();
        if nodes.iter().any(|n| n.is_empty()) {
            return Err(NetworkError::MalformedName { name: name.into() });
        }

        match (prefix, nodes.as_slice()) {
            ("C", [node]) => Ok(Self::capacitor(*node, value)),
            ("R", [a, b]) => Ok(Self::resistor(*a, *b, value)),
            _ => Err(NetworkError::MalformedName { name: name.into() }),
        }
    }

    /// Canonical encoded name, e.g. `R_WH1_AMB`.
    pub fn name(&self) -> String {
        match (&self.kind, &self.node_b) {
            (ParamKind::Resistor, Some(b)) => format!("R_{}_{}", self.node_a, b),
            _ => format!("C_{}", self.node_a),
        }
    }
}

/// Parse a name → value mapping into typed records, preserving order.
pub fn parse_params<I, S>(params: I) -> NetworkResult<Vec<RcParam>>
where
    I: IntoIterator<Item = (S, f64)>,
    S: AsRef<str>,
{
    let parsed = params
        .into_iter()
        .map(|(name, value)| RcParam::parse(name.as_ref(), value))
        .collect::<NetworkResult<Vec<_>>>()?;
    if parsed.is_empty() {
        return Err(NetworkError::EmptyParameters);
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_capacitor() {
        let p = RcParam::parse("C_wh1", 1000.0).unwrap();
        assert_eq!(p.kind, ParamKind::Capacitor);
        assert_eq!(p.node_a, "WH1");
        assert_eq!(p.node_b, None);
        assert_eq!(p.name(), "C_WH1");
    }

    #[test]
    fn parse_resistor() {
        let p = RcParam::parse("R_WH1_AMB", 2.0).unwrap();
        assert_eq!(p.kind, ParamKind::Resistor);
        assert_eq!(p.node_a, "WH1");
        assert_eq!(p.node_b.as_deref(), Some("AMB"));
        assert_eq!(p.name(), "R_WH1_AMB");
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["X_A", "R_A", "R_A_B_C", "C_A_B", "C_", "R__B", "C"] {
            assert!(
                matches!(
                    RcParam::parse(bad, 1.0),
                    Err(NetworkError::MalformedName { .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn parse_params_empty_is_error() {
        let empty: Vec<(&str, f64)> = vec![];
        assert_eq!(parse_params(empty), Err(NetworkError::EmptyParameters));
    }
}

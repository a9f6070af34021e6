//! Network-specific error types.

/// Result alias for network construction.
pub type NetworkResult<T> = Result<T, NetworkError>;

/// RC network construction and lookup errors.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// No RC parameters were supplied.
    EmptyParameters,

    /// A parameter name is not of the form `R_<a>_<b>` or `C_<node>`.
    MalformedName { name: String },

    /// One or more R or C values are zero or negative.
    NonPositive { names: Vec<String> },

    /// A parameter value is NaN or infinite.
    NonFinite { name: String },

    /// A node was given two capacitances.
    DuplicateCapacitor { node: String },

    /// A node listed as external also carries a capacitance.
    CapacitorOnExternal { node: String },

    /// A resistor touches no capacitive node after reduction.
    UnresolvedResistor { node_a: String, node_b: String },

    /// A floating node has more than one zero-resistance edge.
    AmbiguousShort { node: String, count: usize },

    /// Name not found in a name index.
    NameNotFound { what: &'static str, name: String },
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::EmptyParameters => write!(f, "No RC parameters found"),
            NetworkError::MalformedName { name } => {
                write!(f, "Cannot parse RC parameter name {name:?}")
            }
            NetworkError::NonPositive { names } => {
                write!(f, "RC parameters must be positive: {}", names.join(", "))
            }
            NetworkError::NonFinite { name } => {
                write!(f, "RC parameter {name} is not finite")
            }
            NetworkError::DuplicateCapacitor { node } => {
                write!(f, "Node {node} has more than one capacitance")
            }
            NetworkError::CapacitorOnExternal { node } => {
                write!(f, "External node {node} cannot carry a capacitance")
            }
            NetworkError::UnresolvedResistor { node_a, node_b } => {
                write!(
                    f,
                    "Cannot parse resistor R_{node_a}_{node_b}, no internal nodes defined"
                )
            }
            NetworkError::AmbiguousShort { node, count } => {
                write!(
                    f,
                    "Floating node {node} has {count} zero-resistance edges (at most 1 allowed)"
                )
            }
            NetworkError::NameNotFound { what, name } => {
                write!(f, "{what} {name:?} not found")
            }
        }
    }
}

impl std::error::Error for NetworkError {}

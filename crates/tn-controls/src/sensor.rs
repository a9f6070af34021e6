//! Control-temperature sensors over state vectors.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// Which state(s) a controller reads as its control temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlPoint {
    /// One node.
    Single { index: usize },
    /// Plain mean of several nodes.
    Average { indices: Vec<usize> },
    /// Weighted sum of nodes.
    Weighted { weights: Vec<(usize, f64)> },
}

impl ControlPoint {
    pub fn single(index: usize) -> Self {
        Self::Single { index }
    }

    /// Mean of a node and the node above it (index - 1).
    pub fn with_node_above(index: usize) -> Self {
        match index {
            0 => Self::Single { index },
            _ => Self::Average {
                indices: vec![index - 1, index],
            },
        }
    }

    pub fn weighted(weights: Vec<(usize, f64)>) -> Self {
        Self::Weighted { weights }
    }

    pub fn read(&self, states: &[f64]) -> ControlResult<f64> {
        let get = |i: usize| {
            states
                .get(i)
                .copied()
                .ok_or_else(|| ControlError::InvalidControlPoint {
                    what: format!("node {i} out of {} states", states.len()),
                })
        };
        match self {
            Self::Single { index } => get(*index),
            Self::Average { indices } => {
                if indices.is_empty() {
                    return Err(ControlError::InvalidControlPoint {
                        what: "average of no nodes".into(),
                    });
                }
                let sum = indices.iter().map(|&i| get(i)).sum::<ControlResult<f64>>()?;
                Ok(sum / indices.len() as f64)
            }
            Self::Weighted { weights } => weights.iter().map(|&(i, w)| get(i).map(|t| t * w)).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_single_and_average() {
        let states = [50.0, 48.0, 40.0];
        assert_eq!(ControlPoint::single(2).read(&states).unwrap(), 40.0);
        assert_eq!(ControlPoint::with_node_above(2).read(&states).unwrap(), 44.0);
        assert_eq!(ControlPoint::with_node_above(0).read(&states).unwrap(), 50.0);
    }

    #[test]
    fn weighted_sum() {
        let states = [60.0, 40.0];
        let point = ControlPoint::weighted(vec![(0, 0.75), (1, 0.25)]);
        assert!((point.read(&states).unwrap() - 55.0).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_is_error() {
        assert!(ControlPoint::single(3).read(&[1.0]).is_err());
        assert!(ControlPoint::Average { indices: vec![] }.read(&[1.0]).is_err());
    }
}

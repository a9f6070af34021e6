//! Simultaneous inverse solve for several targets.
//!
//! The sensitivity matrix `M·R` (targets × input groups) only depends on the
//! model matrices, so its inverse is computed once in
//! [`StateSpaceModel::setup_multi_input_solver`] and reused every step.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::error::{StateSpaceError, StateSpaceResult};
use crate::model::{StateSpaceModel, check_len};
use crate::solve::{SENSITIVITY_TOL, TargetKind};

/// One independent control input: a single input, or several inputs moving
/// together with fixed ratios.
#[derive(Debug, Clone, PartialEq)]
pub enum InputGroup {
    Single(String),
    Ratios(Vec<(String, f64)>),
}

impl InputGroup {
    pub fn single(name: impl Into<String>) -> Self {
        InputGroup::Single(name.into())
    }
}

/// Cached inverse for repeated multi-target solves.
#[derive(Debug, Clone)]
pub struct MultiInputSolver {
    kind: TargetKind,
    targets: Vec<usize>,
    /// n_inputs × n_groups
    ratios: DMatrix<f64>,
    /// n_groups × n_targets
    inverse: DMatrix<f64>,
}

impl MultiInputSolver {
    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn targets(&self) -> &[usize] {
        &self.targets
    }
}

impl StateSpaceModel {
    /// Prepare a solver for `targets` (state or output names) driven by
    /// `groups`. There must be exactly one group per target.
    pub fn setup_multi_input_solver<S: AsRef<str>>(
        &mut self,
        targets: &[S],
        groups: &[InputGroup],
        kind: TargetKind,
    ) -> StateSpaceResult<()> {
        if targets.is_empty() || targets.len() != groups.len() {
            return Err(StateSpaceError::Dimension {
                what: "input groups",
                expected: targets.len(),
                actual: groups.len(),
            });
        }
        let target_idxs = match kind {
            TargetKind::State => self.state_names().indices(targets)?,
            TargetKind::Output => self.output_names().indices(targets)?,
        };

        let mut ratios = DMatrix::zeros(self.n_inputs(), groups.len());
        for (col, group) in groups.iter().enumerate() {
            match group {
                InputGroup::Single(name) => {
                    ratios[(self.input_names().index(name)?, col)] = 1.0;
                }
                InputGroup::Ratios(parts) => {
                    for (name, ratio) in parts {
                        ratios[(self.input_names().index(name)?, col)] += ratio;
                    }
                }
            }
        }

        let m = match kind {
            TargetKind::State => self.b().select_rows(target_idxs.iter()),
            TargetKind::Output => {
                self.c().select_rows(target_idxs.iter()) * self.b()
                    + self.d().select_rows(target_idxs.iter())
            }
        };
        let sensitivity = m * &ratios;
        ensure_well_conditioned(&sensitivity)?;
        let inverse = sensitivity
            .try_inverse()
            .ok_or_else(|| StateSpaceError::Singular {
                what: "multi-input sensitivity matrix".into(),
            })?;

        debug!(
            model = %self.name(),
            targets = target_idxs.len(),
            ?kind,
            "multi-input solver ready"
        );
        self.solver = Some(MultiInputSolver {
            kind,
            targets: target_idxs,
            ratios,
            inverse,
        });
        Ok(())
    }

    /// Input change that brings every target to `desired` after one step.
    ///
    /// The returned vector has one entry per model input and is meant to be
    /// passed to [`StateSpaceModel::update`] as the input delta.
    pub fn solve_for_multi_inputs(&self, desired: &[f64]) -> StateSpaceResult<DVector<f64>> {
        let solver = self.solver.as_ref().ok_or(StateSpaceError::SolverNotReady)?;
        let desired = DVector::from_column_slice(desired);
        check_len("desired values", &desired, solver.targets.len())?;

        let u0 = self.next_inputs();
        let x_next = self.a() * self.states() + self.b() * u0;
        let current = match solver.kind {
            TargetKind::State => x_next.select_rows(solver.targets.iter()),
            TargetKind::Output => {
                self.c().select_rows(solver.targets.iter()) * &x_next
                    + self.d().select_rows(solver.targets.iter()) * u0
            }
        };

        let group_values = &solver.inverse * (desired - current);
        Ok(&solver.ratios * group_values)
    }

    pub fn multi_input_solver(&self) -> Option<&MultiInputSolver> {
        self.solver.as_ref()
    }

    pub fn invalidate_multi_input_solver(&mut self) {
        self.solver = None;
    }
}

fn ensure_well_conditioned(m: &DMatrix<f64>) -> StateSpaceResult<()> {
    let singular = m.clone().svd(false, false).singular_values;
    let max = singular.iter().cloned().fold(0.0_f64, f64::max);
    let min = singular.iter().cloned().fold(f64::INFINITY, f64::min);
    if !(max.is_finite() && max > 0.0 && min / max > SENSITIVITY_TOL) {
        return Err(StateSpaceError::Singular {
            what: format!("multi-input sensitivity matrix (σ_min={min:e}, σ_max={max:e})"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_core::s;

    fn two_node() -> StateSpaceModel {
        let a = DMatrix::from_row_slice(2, 2, &[-0.02, 0.01, 0.005, -0.01]);
        let b = DMatrix::from_row_slice(2, 3, &[0.01, 0.01, 0.0, 0.005, 0.0, 0.0025]);
        StateSpaceModel::new(
            "two",
            vec!["T_A".into(), "T_B".into()],
            vec!["T_EXT".into(), "H_A".into(), "H_B".into()],
            a,
            b,
            s(30.0),
            Some(DVector::from_row_slice(&[20.0, 20.0])),
        )
        .unwrap()
    }

    #[test]
    fn hits_both_state_targets() {
        let mut model = two_node();
        model.set_next_input("T_EXT", 5.0).unwrap();
        model
            .setup_multi_input_solver(
                &["T_A", "T_B"],
                &[InputGroup::single("H_A"), InputGroup::single("H_B")],
                TargetKind::State,
            )
            .unwrap();
        let delta = model.solve_for_multi_inputs(&[22.0, 21.0]).unwrap();
        assert_eq!(delta[0], 0.0);
        let next = model.update(Some(&delta)).unwrap();
        assert!((next[0] - 22.0).abs() < 1e-8);
        assert!((next[1] - 21.0).abs() < 1e-8);
    }

    #[test]
    fn ratio_group_splits_input() {
        let mut model = two_node();
        model
            .setup_multi_input_solver(
                &["T_A"],
                &[InputGroup::Ratios(vec![("H_A".into(), 0.5), ("H_B".into(), 0.5)])],
                TargetKind::Output,
            )
            .unwrap();
        let delta = model.solve_for_multi_inputs(&[21.0]).unwrap();
        assert!((delta[1] - delta[2]).abs() < 1e-12);
        let next = model.update(Some(&delta)).unwrap();
        assert!((next[0] - 21.0).abs() < 1e-8);
    }

    #[test]
    fn solve_without_setup_fails() {
        let model = two_node();
        assert_eq!(
            model.solve_for_multi_inputs(&[1.0]).unwrap_err(),
            StateSpaceError::SolverNotReady
        );
    }

    #[test]
    fn colinear_groups_are_singular() {
        let mut model = two_node();
        let result = model.setup_multi_input_solver(
            &["T_A", "T_B"],
            &[InputGroup::single("H_A"), InputGroup::single("H_A")],
            TargetKind::State,
        );
        assert!(matches!(result, Err(StateSpaceError::Singular { .. })));
        assert!(model.multi_input_solver().is_none());
    }

    #[test]
    fn new_outputs_invalidate_solver() {
        let mut model = two_node();
        model
            .setup_multi_input_solver(&["T_A"], &[InputGroup::single("H_A")], TargetKind::State)
            .unwrap();
        assert!(model.multi_input_solver().is_some());
        let model = model
            .with_outputs(&[crate::OutputDef::new("SUM").with_state("T_A", 1.0)])
            .unwrap();
        assert!(model.multi_input_solver().is_none());
    }
}

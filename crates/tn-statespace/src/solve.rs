//! Inverse one-step solves: which input yields a desired state or output.

use tn_core::TnError;

use crate::error::{StateSpaceError, StateSpaceResult};
use crate::model::StateSpaceModel;

/// Sensitivities smaller than this, relative to the largest input
/// coupling of the target row, are treated as zero.
pub(crate) const SENSITIVITY_TOL: f64 = 1e-12;

/// Whether a target index refers to a state or an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    State,
    Output,
}

/// A state or output to drive to a desired value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    State(usize),
    Output(usize),
}

impl Target {
    pub fn kind(&self) -> TargetKind {
        match self {
            Target::State(_) => TargetKind::State,
            Target::Output(_) => TargetKind::Output,
        }
    }
}

impl StateSpaceModel {
    /// Look a target up by name, preferring states over outputs.
    pub fn resolve_target(&self, name: &str) -> StateSpaceResult<Target> {
        if let Some(i) = self.state_names().get(name) {
            return Ok(Target::State(i));
        }
        Ok(Target::Output(self.output_names().index(name)?))
    }

    /// Scalar input that brings `target` to `desired` after one step.
    ///
    /// The inputs at `u_idxs` move together in proportion to `u_ratios`
    /// (equal weights when `None`). Other inputs stay at their next values.
    /// The returned value is the total input `u` such that setting input
    /// `u_idxs[k]` to `u·ratio_k` hits the target.
    pub fn solve_for_inputs(
        &self,
        target: Target,
        u_idxs: &[usize],
        u_ratios: Option<&[f64]>,
        desired: f64,
    ) -> StateSpaceResult<f64> {
        if u_idxs.is_empty() {
            return Err(StateSpaceError::InvalidArg {
                what: "no inputs to solve for".into(),
            });
        }
        let ratios = match u_ratios {
            Some(r) if r.len() != u_idxs.len() => {
                return Err(StateSpaceError::Dimension {
                    what: "input ratios",
                    expected: u_idxs.len(),
                    actual: r.len(),
                });
            }
            Some(r) => r.to_vec(),
            None => vec![1.0 / u_idxs.len() as f64; u_idxs.len()],
        };
        let m = self.n_inputs();
        for &j in u_idxs {
            if j >= m {
                return Err(TnError::IndexOob {
                    what: "input",
                    index: j,
                    len: m,
                }
                .into());
            }
        }

        let x = self.states();
        let u0 = self.next_inputs();
        let (a, b) = (self.a(), self.b());

        let (sensitivity, scale, base) = match target {
            Target::State(i) => {
                check_index("state", i, self.n_states())?;
                let sens: f64 = u_idxs
                    .iter()
                    .zip(&ratios)
                    .map(|(&j, r)| b[(i, j)] * r)
                    .sum();
                let base = (a.row(i) * x)[0] + (b.row(i) * u0)[0];
                (sens, row_scale(b.row(i).iter()), base)
            }
            Target::Output(i) => {
                check_index("output", i, self.n_outputs())?;
                let total = self.d().row(i) + self.c().row(i) * b;
                let sens: f64 = u_idxs
                    .iter()
                    .zip(&ratios)
                    .map(|(&j, r)| total[j] * r)
                    .sum();
                let base =
                    (self.c().row(i) * (a * x + b * u0))[0] + (self.d().row(i) * u0)[0];
                (sens, row_scale(total.iter()), base)
            }
        };

        if !sensitivity.is_finite() || !(sensitivity.abs() > SENSITIVITY_TOL * scale) {
            return Err(StateSpaceError::Singular {
                what: format!("{target:?} does not respond to inputs {u_idxs:?}"),
            });
        }
        Ok((desired - base) / sensitivity)
    }

    /// Name-based single input solve; `target` may be a state or an output.
    pub fn solve_for_input(
        &self,
        target: &str,
        input: &str,
        desired: f64,
    ) -> StateSpaceResult<f64> {
        let target = self.resolve_target(target)?;
        let idx = self.input_names().index(input)?;
        self.solve_for_inputs(target, &[idx], Some(&[1.0]), desired)
    }
}

/// Largest input coupling in a row; zero when the row ignores every input.
fn row_scale<'a>(row: impl Iterator<Item = &'a f64>) -> f64 {
    row.fold(0.0_f64, |m, v| m.max(v.abs()))
}

fn check_index(what: &'static str, index: usize, len: usize) -> StateSpaceResult<()> {
    if index >= len {
        return Err(TnError::IndexOob { what, index, len }.into());
    }
    Ok(())
}

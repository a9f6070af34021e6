//! Labeled matrix export for inspection and tooling.

use nalgebra::DMatrix;
use serde::Serialize;
use tn_core::{Time, as_seconds};

use crate::discretize::discretize;
use crate::error::StateSpaceResult;
use crate::model::StateSpaceModel;

/// Which flavor of `A`/`B` to export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatrixForm {
    Continuous,
    /// Discrete matrices at the model's own timestep.
    Discrete,
    /// Discrete matrices recomputed for another timestep.
    Resampled(Time),
}

/// A matrix with row and column labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledMatrix {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl LabeledMatrix {
    pub fn new(rows: &[String], columns: &[String], m: &DMatrix<f64>) -> Self {
        Self {
            rows: rows.to_vec(),
            columns: columns.to_vec(),
            values: m
                .row_iter()
                .map(|row| row.iter().copied().collect())
                .collect(),
        }
    }

    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let i = self.rows.iter().position(|r| r == row)?;
        let j = self.columns.iter().position(|c| c == column)?;
        Some(self.values[i][j])
    }

    /// Header row of column labels, then one row per label.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.columns.join(","));
        out.insert(0, ',');
        out.push('\n');
        for (label, row) in self.rows.iter().zip(&self.values) {
            out.push_str(label);
            for v in row {
                out.push(',');
                out.push_str(&v.to_string());
            }
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedMatrices {
    pub a: LabeledMatrix,
    pub b: LabeledMatrix,
    pub c: LabeledMatrix,
    pub d: LabeledMatrix,
}

impl StateSpaceModel {
    pub fn export_matrices(&self, form: MatrixForm) -> StateSpaceResult<ExportedMatrices> {
        let (a, b) = match form {
            MatrixForm::Continuous => (self.a_continuous().clone(), self.b_continuous().clone()),
            MatrixForm::Discrete => (self.a().clone(), self.b().clone()),
            MatrixForm::Resampled(dt) => {
                discretize(self.a_continuous(), self.b_continuous(), as_seconds(dt))?
            }
        };
        let states = self.state_names().names();
        let inputs = self.input_names().names();
        let outputs = self.output_names().names();
        Ok(ExportedMatrices {
            a: LabeledMatrix::new(states, states, &a),
            b: LabeledMatrix::new(states, inputs, &b),
            c: LabeledMatrix::new(outputs, states, self.c()),
            d: LabeledMatrix::new(outputs, inputs, self.d()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;
    use tn_core::{minutes, s};

    fn model() -> StateSpaceModel {
        StateSpaceModel::new(
            "one",
            vec!["T_INT".into()],
            vec!["T_EXT".into(), "H_INT".into()],
            DMatrix::from_element(1, 1, -0.5),
            DMatrix::from_row_slice(1, 2, &[0.5, 0.25]),
            s(1.0),
            None,
        )
        .unwrap()
    }

    #[test]
    fn continuous_export_is_labeled() {
        let m = model().export_matrices(MatrixForm::Continuous).unwrap();
        assert_eq!(m.b.get("T_INT", "H_INT"), Some(0.25));
        assert_eq!(m.a.get("T_INT", "T_INT"), Some(-0.5));
        assert_eq!(m.b.get("T_INT", "T_NOPE"), None);
    }

    #[test]
    fn resampled_matches_rebuilt_model() {
        let base = model();
        let coarse = base
            .export_matrices(MatrixForm::Resampled(minutes(1.0)))
            .unwrap();
        let expected = (-0.5_f64 * 60.0).exp();
        let got = coarse.a.get("T_INT", "T_INT").unwrap();
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn csv_has_header_and_rows() {
        let m = model().export_matrices(MatrixForm::Continuous).unwrap();
        let csv = m.b.to_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(",T_EXT,H_INT"));
        assert_eq!(lines.next(), Some("T_INT,0.5,0.25"));
        assert_eq!(lines.next(), None);
    }
}

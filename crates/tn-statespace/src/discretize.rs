//! Exact zero-order-hold discretization.

use nalgebra::DMatrix;

use crate::error::{StateSpaceError, StateSpaceResult};

/// Discretize `(A, B)` for a fixed step `dt` (seconds), inputs held constant.
///
/// Uses the augmented exponential
/// `exp([[A, B], [0, 0]]·dt) = [[A_d, B_d], [0, I]]`, which reproduces the
/// exact exponential RC response over one step.
pub fn discretize(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    dt: f64,
) -> StateSpaceResult<(DMatrix<f64>, DMatrix<f64>)> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(StateSpaceError::InvalidArg {
            what: format!("timestep must be positive, got {dt}"),
        });
    }
    let n = a.nrows();
    let m = b.ncols();
    if a.ncols() != n {
        return Err(StateSpaceError::Dimension {
            what: "A columns",
            expected: n,
            actual: a.ncols(),
        });
    }
    if b.nrows() != n {
        return Err(StateSpaceError::Dimension {
            what: "B rows",
            expected: n,
            actual: b.nrows(),
        });
    }

    let mut aug = DMatrix::zeros(n + m, n + m);
    aug.view_mut((0, 0), (n, n)).copy_from(&(a * dt));
    aug.view_mut((0, n), (n, m)).copy_from(&(b * dt));
    let expm = aug.exp();

    let a_d = expm.view((0, 0), (n, n)).into_owned();
    let b_d = expm.view((0, n), (n, m)).into_owned();
    if a_d.iter().chain(b_d.iter()).any(|v| !v.is_finite()) {
        return Err(StateSpaceError::NonFinite {
            what: "discretized matrices".into(),
        });
    }
    Ok((a_d, b_d))
}

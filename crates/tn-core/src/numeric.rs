use crate::TnError;

/// Absolute and relative bounds for comparing simulated temperatures.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: f64, b: f64, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    diff <= tol.abs || diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, TnError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(TnError::NonFinite { what, value: v })
    }
}

/// Finite and strictly greater than zero, e.g. a capacitance or a volume.
pub fn ensure_positive(v: f64, what: &'static str) -> Result<f64, TnError> {
    match ensure_finite(v, what)? {
        v if v > 0.0 => Ok(v),
        v => Err(TnError::NonPositive { what, value: v }),
    }
}

/// Finite and at least zero; a zero resistance is a short.
pub fn ensure_non_negative(v: f64, what: &'static str) -> Result<f64, TnError> {
    match ensure_finite(v, what)? {
        v if v >= 0.0 => Ok(v),
        v => Err(TnError::NonPositive { what, value: v }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_uses_either_bound() {
        let tol = Tolerances::default();
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(nearly_equal(1e6, 1e6 + 1e-4, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(f64::NAN, "temperature").unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn ensure_positive_rejects_zero() {
        assert_eq!(ensure_positive(1.0, "capacitance"), Ok(1.0));
        assert!(matches!(
            ensure_positive(0.0, "capacitance"),
            Err(TnError::NonPositive { .. })
        ));
        assert!(matches!(
            ensure_positive(f64::INFINITY, "capacitance"),
            Err(TnError::NonFinite { .. })
        ));
    }

    #[test]
    fn ensure_non_negative_allows_shorts() {
        assert_eq!(ensure_non_negative(0.0, "resistance"), Ok(0.0));
        assert!(matches!(
            ensure_non_negative(-1.0, "resistance"),
            Err(TnError::NonPositive { .. })
        ));
    }

    proptest::proptest! {
        #[test]
        fn nearly_equal_is_symmetric(a in -1e6_f64..1e6, b in -1e6_f64..1e6) {
            let tol = Tolerances::default();
            proptest::prop_assert_eq!(nearly_equal(a, b, tol), nearly_equal(b, a, tol));
        }
    }
}

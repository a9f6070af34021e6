//! Biquadratic performance curves.

use serde::{Deserialize, Serialize};

/// `c0 + c1·x + c2·x² + c3·y + c4·y² + c5·x·y`.
///
/// Used as a multiplier on nominal capacity or efficiency, with `x` the
/// entering air wet bulb and `y` the water temperature at the condenser.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Biquadratic {
    pub coefficients: [f64; 6],
}

impl Biquadratic {
    /// Heat pump water heater capacity multiplier.
    pub const HPWH_CAPACITY: Biquadratic = Biquadratic {
        coefficients: [0.563, 0.0437, 0.000039, 0.0055, -0.000148, -0.000145],
    };

    /// Heat pump water heater COP multiplier.
    pub const HPWH_COP: Biquadratic = Biquadratic {
        coefficients: [1.1332, 0.063, -0.0000979, -0.00972, -0.0000214, -0.000686],
    };

    pub fn new(coefficients: [f64; 6]) -> Self {
        Self { coefficients }
    }

    pub fn eval(&self, x: f64, y: f64) -> f64 {
        let terms = [1.0, x, x * x, y, y * y, x * y];
        self.coefficients
            .iter()
            .zip(terms)
            .map(|(c, t)| c * t)
            .sum()
    }
}

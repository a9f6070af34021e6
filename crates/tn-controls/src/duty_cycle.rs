//! Duty-cycle allocation for continuous ("ideal") control.

use std::collections::BTreeMap;

use crate::error::{ControlError, ControlResult};
use crate::mode::Mode;

/// Fraction of a timestep spent in each mode.
///
/// Modes are allocated in priority order: each gets
/// `clamp(required / rated, 0, 1 - already_allocated)`. [`DutyCycles::finish`]
/// assigns whatever is left to [`Mode::Off`], so the fractions sum to 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DutyCycles {
    fractions: BTreeMap<Mode, f64>,
}

impl DutyCycles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocated fraction over all non-Off modes.
    pub fn allocated(&self) -> f64 {
        self.fractions
            .iter()
            .filter(|(m, _)| **m != Mode::Off)
            .map(|(_, f)| f)
            .sum()
    }

    /// Allocate `mode` enough time to deliver `required` with capacity `rated`.
    pub fn allocate(&mut self, mode: Mode, required: f64, rated: f64) -> ControlResult<f64> {
        if !(rated.is_finite() && rated > 0.0) {
            return Err(ControlError::InvalidDutyCycle {
                what: format!("{mode} capacity must be positive, got {rated}"),
            });
        }
        if !required.is_finite() {
            return Err(ControlError::InvalidDutyCycle {
                what: format!("{mode} heat requirement is {required}"),
            });
        }
        let remaining = (1.0 - self.allocated()).max(0.0);
        let duty = (required / rated).clamp(0.0, remaining);
        self.set(mode, duty)?;
        Ok(duty)
    }

    /// Set a fraction directly; it must fit in the unallocated time.
    pub fn set(&mut self, mode: Mode, fraction: f64) -> ControlResult<()> {
        let others = self.allocated() - self.get(mode);
        if !(0.0..=1.0).contains(&fraction) || others + fraction > 1.0 + 1e-12 {
            return Err(ControlError::InvalidDutyCycle {
                what: format!("{mode} fraction {fraction} with {others} already allocated"),
            });
        }
        if mode != Mode::Off {
            self.fractions.insert(mode, fraction);
        }
        Ok(())
    }

    /// Assign the unallocated remainder to Off.
    pub fn finish(mut self) -> Self {
        let off = (1.0 - self.allocated()).max(0.0);
        self.fractions.insert(Mode::Off, off);
        self
    }

    pub fn get(&self, mode: Mode) -> f64 {
        self.fractions.get(&mode).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Mode, f64)> + '_ {
        self.fractions.iter().map(|(&m, &f)| (m, f))
    }

    /// The mode reported for the step: the largest non-Off fraction, or Off.
    pub fn dominant_mode(&self) -> Mode {
        self.fractions
            .iter()
            .filter(|(m, f)| **m != Mode::Off && **f > 0.0)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(&m, _)| m)
            .unwrap_or(Mode::Off)
    }
}

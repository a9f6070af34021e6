//! Operating modes and minimum-time-in-mode tracking.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use tn_core::{Time, as_seconds};
use tracing::debug;

use crate::error::{ControlError, ControlResult};

/// Operating mode of a piece of thermostatic equipment.
///
/// Not every equipment uses every mode; a water heater with one element only
/// uses `On` and `Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "Off")]
    Off,
    #[serde(rename = "On")]
    On,
    #[serde(rename = "Upper On")]
    UpperOn,
    #[serde(rename = "Lower On")]
    LowerOn,
    #[serde(rename = "Heat Pump On")]
    HeatPumpOn,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Off => "Off",
            Mode::On => "On",
            Mode::UpperOn => "Upper On",
            Mode::LowerOn => "Lower On",
            Mode::HeatPumpOn => "Heat Pump On",
        }
    }

    pub fn is_on(self) -> bool {
        self != Mode::Off
    }

    /// Resistance element modes.
    pub fn is_element(self) -> bool {
        matches!(self, Mode::UpperOn | Mode::LowerOn)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current mode plus the time it was entered.
///
/// A mode with a minimum time cannot be left until that much simulated time
/// has passed since it was entered. The initial mode has no entry time and
/// can be left immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeTimer {
    mode: Mode,
    entered_at: Option<NaiveDateTime>,
    min_times: BTreeMap<Mode, TimeDelta>,
}

impl ModeTimer {
    pub fn new(initial: Mode) -> Self {
        Self {
            mode: initial,
            entered_at: None,
            min_times: BTreeMap::new(),
        }
    }

    pub fn with_min_time(mut self, mode: Mode, min_time: Time) -> ControlResult<Self> {
        self.set_min_time(mode, min_time)?;
        Ok(self)
    }

    pub fn set_min_time(&mut self, mode: Mode, min_time: Time) -> ControlResult<()> {
        let secs = as_seconds(min_time);
        if !(secs.is_finite() && secs >= 0.0) {
            return Err(ControlError::InvalidArg {
                what: "minimum time in mode must be non-negative",
            });
        }
        let delta = TimeDelta::try_milliseconds((secs * 1000.0).round() as i64).ok_or(
            ControlError::InvalidArg {
                what: "minimum time in mode out of range",
            },
        )?;
        self.min_times.insert(mode, delta);
        Ok(())
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn min_time(&self, mode: Mode) -> TimeDelta {
        self.min_times.get(&mode).copied().unwrap_or_else(TimeDelta::zero)
    }

    /// Time spent in the current mode; `None` for the initial mode.
    pub fn time_in_mode(&self, now: NaiveDateTime) -> Option<TimeDelta> {
        self.entered_at.map(|t| now - t)
    }

    pub fn can_leave(&self, now: NaiveDateTime) -> bool {
        match self.time_in_mode(now) {
            Some(elapsed) => elapsed >= self.min_time(self.mode),
            None => true,
        }
    }

    /// Apply a requested transition, honoring the minimum time in mode.
    ///
    /// `None` keeps the current mode. Returns the mode in effect afterwards.
    pub fn request(&mut self, requested: Option<Mode>, now: NaiveDateTime) -> Mode {
        match requested {
            Some(next) if next != self.mode => {
                if self.can_leave(now) {
                    self.switch(next, now);
                } else {
                    debug!(mode = %self.mode, requested = %next, "held by minimum time in mode");
                }
            }
            _ => {}
        }
        self.mode
    }

    /// Switch regardless of the minimum time.
    pub fn force(&mut self, mode: Mode, now: NaiveDateTime) {
        if mode != self.mode {
            self.switch(mode, now);
        }
    }

    fn switch(&mut self, next: Mode, now: NaiveDateTime) {
        debug!(from = %self.mode, to = %next, %now, "mode transition");
        self.mode = next;
        self.entered_at = Some(now);
    }
}

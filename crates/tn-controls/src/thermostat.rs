//! Deadband thermostat.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// Whether the controlled equipment adds or removes heat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThermostatAction {
    #[default]
    Heating,
    Cooling,
}

impl ThermostatAction {
    /// `+1` for heating, `-1` for cooling.
    pub fn multiplier(self) -> f64 {
        match self {
            ThermostatAction::Heating => 1.0,
            ThermostatAction::Cooling => -1.0,
        }
    }
}

/// Outcome of a thermostat decision that changes state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchCommand {
    On,
    Off,
}

/// A thermostat with a one-sided deadband.
///
/// For heating it turns on strictly below `setpoint - deadband` and off
/// strictly above `setpoint`. Cooling mirrors this around the setpoint.
/// Inside the band no command is given and the caller keeps its mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeadbandThermostat {
    pub setpoint: f64,
    pub deadband: f64,
    #[serde(default)]
    pub action: ThermostatAction,
}

impl DeadbandThermostat {
    pub fn new(setpoint: f64, deadband: f64, action: ThermostatAction) -> ControlResult<Self> {
        if !setpoint.is_finite() {
            return Err(ControlError::InvalidArg {
                what: "setpoint must be finite",
            });
        }
        if !(deadband.is_finite() && deadband >= 0.0) {
            return Err(ControlError::InvalidArg {
                what: "deadband must be finite and non-negative",
            });
        }
        Ok(Self {
            setpoint,
            deadband,
            action,
        })
    }

    pub fn heating(setpoint: f64, deadband: f64) -> ControlResult<Self> {
        Self::new(setpoint, deadband, ThermostatAction::Heating)
    }

    /// Temperature past which the equipment turns on.
    pub fn on_threshold(&self) -> f64 {
        self.setpoint - self.deadband * self.action.multiplier()
    }

    /// Temperature past which the equipment turns off.
    pub fn off_threshold(&self) -> f64 {
        self.setpoint
    }

    pub fn decide(&self, temperature: f64) -> Option<SwitchCommand> {
        let mult = self.action.multiplier();
        if (temperature - self.on_threshold()) * mult < 0.0 {
            Some(SwitchCommand::On)
        } else if (temperature - self.off_threshold()) * mult > 0.0 {
            Some(SwitchCommand::Off)
        } else {
            None
        }
    }

    /// Next on/off state given the current one.
    pub fn next_state(&self, is_on: bool, temperature: f64) -> bool {
        match self.decide(temperature) {
            Some(SwitchCommand::On) => true,
            Some(SwitchCommand::Off) => false,
            None => is_on,
        }
    }
}

//! Per-step equipment results and verbosity-based reporting.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tn_controls::{DutyCycles, Mode};

/// Prefix used for all equipment result names.
pub const END_USE: &str = "Water Heating";

/// Zone conditions around the equipment for one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientConditions {
    pub zone_temp_c: f64,
    #[serde(default)]
    pub zone_wet_bulb_c: Option<f64>,
}

impl AmbientConditions {
    pub fn dry(zone_temp_c: f64) -> Self {
        Self {
            zone_temp_c,
            zone_wet_bulb_c: None,
        }
    }

    pub fn with_wet_bulb(zone_temp_c: f64, wet_bulb_c: f64) -> Self {
        Self {
            zone_temp_c,
            zone_wet_bulb_c: Some(wet_bulb_c),
        }
    }
}

/// Energy flows for one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HeatOutput {
    /// Heat delivered to the water, W.
    pub delivered_w: f64,
    pub electric_kw: f64,
    /// Fuel use for gas equipment.
    pub gas_therms_per_hour: Option<f64>,
    /// Sensible heat gain to the zone, W (includes tank losses).
    pub sensible_gain_w: f64,
    pub latent_gain_w: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatPumpReport {
    pub max_capacity_w: f64,
    pub on_fraction: f64,
    pub cop: f64,
}

/// A reported value: numeric or the mode name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for ResultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultValue::Number(v) => write!(f, "{v}"),
            ResultValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepResults {
    pub time: NaiveDateTime,
    pub mode: Mode,
    /// Present in ideal mode.
    pub duty_cycles: Option<DutyCycles>,
    pub output: HeatOutput,
    pub setpoint_c: f64,
    pub deadband_c: f64,
    pub heat_pump: Option<HeatPumpReport>,
}

impl StepResults {
    /// Named results; higher verbosity adds more detail.
    pub fn report(&self, verbosity: u8) -> Vec<(String, ResultValue)> {
        let mut out = vec![
            (format!("{END_USE} Mode"), ResultValue::Text(self.mode.to_string())),
            (
                format!("{END_USE} Electric Power (kW)"),
                ResultValue::Number(self.output.electric_kw),
            ),
        ];
        let mut num = |name: &str, v: f64| out.push((format!("{END_USE} {name}"), ResultValue::Number(v)));

        if let Some(therms) = self.output.gas_therms_per_hour {
            num("Gas Power (therms/hour)", therms);
        }
        if verbosity >= 3 {
            num("Delivered (W)", self.output.delivered_w);
        }
        if verbosity >= 6 {
            let cop = if self.output.electric_kw > 0.0 {
                self.output.delivered_w / (self.output.electric_kw * 1000.0)
            } else {
                0.0
            };
            num("COP (-)", cop);
            num("Total Sensible Heat Gain (W)", self.output.sensible_gain_w);
            num("Deadband Upper Limit (C)", self.setpoint_c);
            num("Deadband Lower Limit (C)", self.setpoint_c - self.deadband_c);
            if let Some(hp) = self.heat_pump {
                num("Heat Pump Max Capacity (W)", hp.max_capacity_w);
                num("Heat Pump On Fraction (-)", hp.on_fraction);
                num("Heat Pump COP (-)", hp.cop);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn results() -> StepResults {
        StepResults {
            time: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            mode: Mode::On,
            duty_cycles: None,
            output: HeatOutput {
                delivered_w: 4500.0,
                electric_kw: 4.5,
                gas_therms_per_hour: None,
                sensible_gain_w: 10.0,
                latent_gain_w: 0.0,
            },
            setpoint_c: 51.0,
            deadband_c: 5.0,
            heat_pump: None,
        }
    }

    #[test]
    fn verbosity_levels() {
        let r = results();
        assert_eq!(r.report(0).len(), 2);
        assert_eq!(r.report(3).len(), 3);
        let full = r.report(6);
        assert_eq!(full.len(), 7);
        assert!(full.contains(&(
            "Water Heating Deadband Lower Limit (C)".to_string(),
            ResultValue::Number(46.0)
        )));
        assert!(full.contains(&(
            "Water Heating COP (-)".to_string(),
            ResultValue::Number(1.0)
        )));
    }

    #[test]
    fn mode_is_text() {
        assert_eq!(
            results().report(0)[0].1,
            ResultValue::Text("On".to_string())
        );
    }
}

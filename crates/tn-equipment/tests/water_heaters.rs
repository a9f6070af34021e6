use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use proptest::prelude::*;
use tn_controls::Mode;
use tn_core::{constants::KWH_TO_THERMS, s};
use tn_equipment::{
    AmbientConditions, ElectricResistanceWaterHeater, GasWaterHeater, HeatPumpConfig,
    HeatPumpWaterHeater, SimOptions, StepContext, ThermostaticEquipment, WaterHeater,
    WaterHeaterConfig, WaterTank, WaterTankConfig, run_sim, run_step,
};

fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn tank(nodes: usize, temp: f64, dt_s: f64) -> WaterTank {
    let config = WaterTankConfig {
        nodes,
        initial_temp_c: temp,
        ..WaterTankConfig::default()
    };
    WaterTank::new(&config, s(dt_s)).unwrap()
}

fn config(setpoint_c: f64, deadband_c: Option<f64>, ideal: bool) -> WaterHeaterConfig {
    WaterHeaterConfig {
        setpoint_c,
        deadband_c,
        use_ideal_mode: ideal,
        ..WaterHeaterConfig::default()
    }
}

fn ctx(now: NaiveDateTime, zone: f64) -> StepContext {
    StepContext {
        now,
        ambient: AmbientConditions::with_wet_bulb(zone, zone - 5.0),
    }
}

#[test]
fn lower_element_turns_on_when_lower_node_is_cold() {
    let mut erwh =
        ElectricResistanceWaterHeater::new(config(51.0, Some(5.56), false), tank(2, 50.0, 60.0))
            .unwrap();
    erwh.heater_mut().tank_mut().set_states(&[52.0, 44.0]).unwrap();

    let r = run_step(&mut erwh, &ctx(t0(), 20.0)).unwrap();
    assert_eq!(r.mode, Mode::LowerOn);
    assert!((r.output.delivered_w - 4500.0).abs() < 1e-9);
    assert!((r.output.electric_kw - 4.5).abs() < 1e-12);
    // No element loss at efficiency 1: the zone only sees jacket losses.
    let expected_loss = 2.2 / 2.0 * ((52.0 - 20.0) + (44.0 - 20.0));
    assert!((r.output.sensible_gain_w - expected_loss).abs() < 1e-9);
    // Heat went to the bottom node.
    let states = erwh.heater().tank().states();
    assert!(states[1] > 44.0);
}

#[test]
fn thermostat_switches_only_at_band_edges() {
    let setpoint = 51.0;
    let deadband = 5.0;
    let mut heater =
        WaterHeater::new(config(setpoint, Some(deadband), false), tank(1, 50.0, 60.0)).unwrap();
    let opts = SimOptions {
        start: t0(),
        steps: 3000,
        record_every: 1,
    };
    let record = run_sim(&mut heater, &opts, |_| AmbientConditions::dry(5.0)).unwrap();

    let mut switches = 0;
    for k in 1..record.len() {
        let before = record.results[k - 1].mode;
        let after = record.results[k].mode;
        let temp = record.states[k - 1][0];
        match (before, after) {
            (Mode::Off, Mode::On) => {
                assert!(temp < setpoint - deadband, "turned on at {temp}");
                switches += 1;
            }
            (Mode::On, Mode::Off) => {
                assert!(temp > setpoint, "turned off at {temp}");
                switches += 1;
            }
            _ => {}
        }
    }
    assert!(switches >= 2, "expected cycling, saw {switches} switches");
}

#[test]
fn ideal_one_node_hits_setpoint() {
    let mut heater =
        WaterHeater::new(config(51.67, None, true), tank(1, 50.5, 300.0)).unwrap();
    let r = run_step(&mut heater, &ctx(t0(), 20.0)).unwrap();
    let duty = r.duty_cycles.unwrap();
    assert!(duty.get(Mode::On) > 0.0 && duty.get(Mode::On) < 1.0);
    assert_eq!(r.mode, Mode::On);
    assert!((heater.tank().states()[0] - 51.67).abs() < 1e-6);
}

#[test]
fn ideal_erwh_prefers_upper_element() {
    let mut erwh =
        ElectricResistanceWaterHeater::new(config(51.0, None, true), tank(2, 30.0, 60.0))
            .unwrap();
    let r = run_step(&mut erwh, &ctx(t0(), 20.0)).unwrap();
    let duty = r.duty_cycles.unwrap();
    assert_eq!(duty.get(Mode::UpperOn), 1.0);
    assert_eq!(duty.get(Mode::LowerOn), 0.0);
    assert_eq!(r.mode, Mode::UpperOn);
}

#[test]
fn heat_pump_minimum_on_time() {
    let mut hp = HeatPumpWaterHeater::new(
        config(51.0, None, false),
        HeatPumpConfig::default(),
        tank(12, 40.0, 60.0),
    )
    .unwrap();

    let first = run_step(&mut hp, &ctx(t0(), 20.0)).unwrap();
    assert_eq!(first.mode, Mode::HeatPumpOn);

    hp.heater_mut().tank_mut().set_states(&[60.0; 12]).unwrap();
    for minute in 1..10 {
        let now = t0() + TimeDelta::minutes(minute);
        let r = run_step(&mut hp, &ctx(now, 20.0)).unwrap();
        assert_eq!(r.mode, Mode::HeatPumpOn, "minute {minute}");
    }
    let r = run_step(&mut hp, &ctx(t0() + TimeDelta::minutes(10), 20.0)).unwrap();
    assert_eq!(r.mode, Mode::Off);
}

#[test]
fn heat_pump_power_and_gains() {
    let mut hp = HeatPumpWaterHeater::new(
        config(51.0, None, false),
        HeatPumpConfig::default(),
        tank(2, 40.0, 60.0),
    )
    .unwrap();
    let r = run_step(&mut hp, &ctx(t0(), 20.0)).unwrap();
    assert_eq!(r.mode, Mode::HeatPumpOn);

    let report = r.heat_pump.unwrap();
    assert_eq!(report.on_fraction, 1.0);
    let power_w = report.max_capacity_w / report.cop + 35.0;
    assert!((r.output.electric_kw * 1000.0 - power_w).abs() < 1e-9);
    assert!((r.output.delivered_w - report.max_capacity_w).abs() < 1e-9);
    // The compressor pulls heat and moisture out of the zone.
    assert!(r.output.latent_gain_w < 0.0);
    assert!(r.report(6).len() > r.report(3).len());
}

#[test]
fn heat_pump_locked_out_in_cold_zone() {
    let mut hp = HeatPumpWaterHeater::new(
        config(51.0, None, false),
        HeatPumpConfig::default(),
        tank(2, 40.0, 60.0),
    )
    .unwrap();
    let r = run_step(&mut hp, &ctx(t0(), 5.0)).unwrap();
    assert!(hp.er_only());
    assert_eq!(r.mode, Mode::UpperOn);
    assert_eq!(r.heat_pump.unwrap().on_fraction, 0.0);
}

#[test]
fn heat_pump_delivers_capacity_at_current_tank_temperature() {
    let mut hp = HeatPumpWaterHeater::new(
        config(51.0, None, false),
        HeatPumpConfig {
            hp_only: true,
            ..HeatPumpConfig::default()
        },
        tank(2, 20.0, 60.0),
    )
    .unwrap();
    let r = run_step(&mut hp, &ctx(t0(), 20.0)).unwrap();
    assert_eq!(r.mode, Mode::HeatPumpOn);

    let report = r.heat_pump.unwrap();
    assert_eq!(report.max_capacity_w, hp.capacity_w());
    assert!((r.output.delivered_w - report.max_capacity_w * report.on_fraction).abs() < 1e-9);
    let power_w = report.max_capacity_w / report.cop + 35.0;
    assert!((r.output.electric_kw * 1000.0 - power_w).abs() < 1e-9);
}

#[test]
fn heat_pump_backup_element_respects_max_power() {
    let mut hp = HeatPumpWaterHeater::new(
        WaterHeaterConfig {
            max_power: Some(tn_core::kw(3.0)),
            ..config(51.0, None, false)
        },
        HeatPumpConfig::default(),
        tank(2, 30.0, 60.0),
    )
    .unwrap();
    let r = run_step(&mut hp, &ctx(t0(), 20.0)).unwrap();
    assert_eq!(r.mode, Mode::UpperOn);
    assert!((r.output.delivered_w - 3000.0).abs() < 1e-9);
    // Element draw is capped; only the 1 W controller load sits on top.
    assert!((r.output.electric_kw * 1000.0 - 3001.0).abs() < 1e-9);
}

#[test]
fn locked_out_heat_pump_uses_element_deadband() {
    // 44 °C is inside the 8.17 K heat pump band but below the 5.56 K element band.
    let mut hp = HeatPumpWaterHeater::new(
        config(51.0, None, false),
        HeatPumpConfig::default(),
        tank(2, 44.0, 60.0),
    )
    .unwrap();
    let r = run_step(&mut hp, &ctx(t0(), 5.0)).unwrap();
    assert!(hp.er_only());
    assert_eq!(r.mode, Mode::UpperOn);

    let mut wide = HeatPumpWaterHeater::new(
        config(51.0, None, false),
        HeatPumpConfig {
            element_deadband_c: 8.17,
            ..HeatPumpConfig::default()
        },
        tank(2, 44.0, 60.0),
    )
    .unwrap();
    let r = run_step(&mut wide, &ctx(t0(), 5.0)).unwrap();
    assert_eq!(r.mode, Mode::Off);
}

#[test]
fn heat_pump_requires_wet_bulb() {
    let mut hp = HeatPumpWaterHeater::new(
        config(51.0, None, false),
        HeatPumpConfig::default(),
        tank(2, 40.0, 60.0),
    )
    .unwrap();
    let dry = StepContext {
        now: t0(),
        ambient: AmbientConditions::dry(20.0),
    };
    assert!(run_step(&mut hp, &dry).is_err());
}

#[test]
fn gas_heater_reports_fuel_and_skin_losses() {
    let mut gas =
        GasWaterHeater::new(config(51.0, None, false), tank(2, 40.0, 60.0), 0.62).unwrap();
    let r = run_step(&mut gas, &ctx(t0(), 20.0)).unwrap();
    assert_eq!(r.mode, Mode::On);
    assert_eq!(r.output.electric_kw, 0.0);
    let therms = r.output.gas_therms_per_hour.unwrap();
    assert!((therms - 4.5 * KWH_TO_THERMS).abs() < 1e-12);
    let loss = 2.2 / 2.0 * 2.0 * 20.0;
    assert!((r.output.sensible_gain_w - 0.64 * loss).abs() < 1e-9);
}

#[test]
fn sim_records_with_decimation() {
    let mut heater = WaterHeater::new(config(51.0, None, false), tank(2, 50.0, 60.0)).unwrap();
    let opts = SimOptions {
        start: t0(),
        steps: 10,
        record_every: 3,
    };
    let record = run_sim(&mut heater, &opts, |_| AmbientConditions::dry(20.0)).unwrap();
    assert_eq!(record.len(), 4);
    assert_eq!(record.times[0], t0() + TimeDelta::minutes(2));
    assert_eq!(record.times[3], t0() + TimeDelta::minutes(9));
}

proptest! {
    #[test]
    fn ideal_duty_cycles_are_bounded(
        upper in 10.0f64..70.0,
        lower in 10.0f64..70.0,
        zone in 0.0f64..40.0,
    ) {
        let mut erwh = ElectricResistanceWaterHeater::new(
            config(51.0, None, true),
            tank(2, 50.0, 300.0),
        ).unwrap();
        erwh.heater_mut().tank_mut().set_states(&[upper, lower]).unwrap();
        let r = run_step(&mut erwh, &ctx(t0(), zone)).unwrap();
        let duty = r.duty_cycles.unwrap();
        let mut total = 0.0;
        for (_, f) in duty.iter() {
            prop_assert!((0.0..=1.0).contains(&f));
            total += f;
        }
        prop_assert!((total - 1.0).abs() < 1e-9);
    }
}

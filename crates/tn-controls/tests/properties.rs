use proptest::prelude::*;
use tn_controls::{DeadbandThermostat, DutyCycles, Mode, ThermostatAction};

proptest! {
    #[test]
    fn duty_cycles_stay_in_bounds(
        requests in proptest::collection::vec((-1.0e4f64..2.0e4, 1.0f64..1.0e4), 1..4)
    ) {
        let modes = [Mode::UpperOn, Mode::LowerOn, Mode::HeatPumpOn];
        let mut duty = DutyCycles::new();
        for (mode, (required, rated)) in modes.iter().zip(&requests) {
            let d = duty.allocate(*mode, *required, *rated).unwrap();
            prop_assert!((0.0..=1.0).contains(&d));
        }
        let duty = duty.finish();
        let total: f64 = duty.iter().map(|(_, f)| f).sum();
        for (_, f) in duty.iter() {
            prop_assert!((0.0..=1.0).contains(&f));
        }
        prop_assert!(duty.allocated() <= 1.0 + 1e-12);
        prop_assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn thermostat_only_switches_outside_band(
        setpoint in 30.0f64..60.0,
        deadband in 0.5f64..10.0,
        temps in proptest::collection::vec(-5.0f64..5.0, 1..50),
    ) {
        let t = DeadbandThermostat::new(setpoint, deadband, ThermostatAction::Heating).unwrap();
        let mut on = false;
        for offset in temps {
            let temp = setpoint - deadband / 2.0 + offset * deadband;
            let next = t.next_state(on, temp);
            if next && !on {
                prop_assert!(temp < setpoint - deadband);
            }
            if !next && on {
                prop_assert!(temp > setpoint);
            }
            if temp >= setpoint - deadband && temp <= setpoint {
                prop_assert_eq!(next, on);
            }
            on = next;
        }
    }
}

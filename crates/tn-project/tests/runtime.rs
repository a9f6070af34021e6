use tn_project::{Runtime, build_runtime, from_yaml_str, record_to_csv};

const ONE_NODE: &str = r#"
name: decay
time_res_s: 60
steps: 5
model:
  type: network
  params:
    R_INT_EXT: 0.001
    C_INT: 1.0e5
  external_nodes: [EXT]
  initial_states:
    T_INT: 50.0
  inputs:
    T_EXT: 20.0
"#;

#[test]
fn passive_network_matches_exponential_decay() {
    let scenario = from_yaml_str(ONE_NODE).unwrap();
    let mut runtime = build_runtime(&scenario).unwrap();
    assert!(matches!(runtime, Runtime::Passive(_)));
    assert_eq!(runtime.state_names(), ["T_INT"]);

    let record = runtime.run(&scenario).unwrap();
    assert_eq!(record.len(), 5);
    // tau = R·C = 100 s
    for (k, states) in record.states.iter().enumerate() {
        let t = 60.0 * (k + 1) as f64;
        let expected = 20.0 + 30.0 * (-t / 100.0).exp();
        assert!((states[0] - expected).abs() < 1e-9, "step {k}: {}", states[0]);
    }
}

#[test]
fn floating_node_is_reduced_away() {
    let yaml = r#"
name: attic
time_res_s: 300
steps: 1
model:
  type: network
  params:
    C_LIV: 4.0e6
    R_LIV_ATT: 0.02
    R_ATT_EXT: 0.015
  external_nodes: [EXT]
  outputs:
    - name: T_HALF
      states:
        T_LIV: 0.5
"#;
    let scenario = from_yaml_str(yaml).unwrap();
    let runtime = build_runtime(&scenario).unwrap();
    let model = runtime.model();
    assert_eq!(model.n_states(), 1);
    assert_eq!(model.input_names().names(), ["T_EXT", "H_LIV"]);
    // Series resistors: 1 / (R·C) with R = 0.035.
    let expected = -1.0 / (0.035 * 4.0e6);
    assert!((model.a_continuous()[(0, 0)] - expected).abs() < 1e-15);
    assert!(model.output_names().contains("T_HALF"));
}

#[test]
fn unknown_initial_state_is_an_error() {
    let yaml = ONE_NODE.replace("T_INT: 50.0", "T_XYZ: 50.0");
    let scenario = from_yaml_str(&yaml).unwrap();
    assert!(build_runtime(&scenario).is_err());
}

#[test]
fn equipment_run_renders_csv() {
    let yaml = r#"
name: erwh
time_res_s: 60
start: "2024-01-01T00:00:00"
steps: 4
record_every: 2
verbosity: 3
model:
  type: water_tank
  nodes: 2
  initial_temp_c: 40.0
equipment:
  kind: electric_resistance_water_heater
  setpoint_c: 51.0
ambient:
  zone_temp_c: 20.0
"#;
    let scenario = from_yaml_str(yaml).unwrap();
    let mut runtime = build_runtime(&scenario).unwrap();
    let record = runtime.run(&scenario).unwrap();
    let csv = record_to_csv(&record, runtime.state_names(), scenario.verbosity);

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "Time,T_WH1,T_WH2,Water Heating Mode,Water Heating Electric Power (kW),Water Heating Delivered (W)"
    );
    assert!(lines[1].starts_with("2024-01-01 00:01:00,"));
    assert!(lines[1].contains(",Upper On,4.5,4500"));
}

#[test]
fn heat_pump_without_wet_bulb_fails_validation() {
    let yaml = r#"
name: hp
time_res_s: 60
model:
  type: water_tank
  nodes: 12
equipment:
  kind: heat_pump_water_heater
"#;
    assert!(matches!(
        from_yaml_str(yaml),
        Err(tn_project::ProjectError::Validation(_))
    ));
}

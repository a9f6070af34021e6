use std::path::PathBuf;

fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .join("demos")
}

#[test]
fn demos_load_and_validate() {
    let demos = [
        "one_node.yaml",
        "house_network.yaml",
        "electric_water_heater.yaml",
        "heat_pump_water_heater.yaml",
        "gas_water_heater.json",
    ];

    for name in demos {
        let path = demos_dir().join(name);
        let result = tn_project::load(&path);
        assert!(
            result.is_ok(),
            "demo failed validation: {} => {:?}",
            path.display(),
            result.err()
        );
    }
}

#[test]
fn demos_build_and_run() {
    for name in ["house_network.yaml", "heat_pump_water_heater.yaml", "gas_water_heater.json"] {
        let mut scenario = tn_project::load(&demos_dir().join(name)).unwrap();
        scenario.steps = 24;
        let mut runtime = tn_project::build_runtime(&scenario)
            .unwrap_or_else(|e| panic!("failed to build {name}: {e}"));
        let record = runtime.run(&scenario).unwrap();
        assert!(!record.is_empty(), "{name} recorded nothing");
    }
}

#[test]
fn unknown_extension_is_rejected() {
    let err = tn_project::load(&demos_dir().join("one_node.toml")).unwrap_err();
    assert!(matches!(err, tn_project::ProjectError::UnsupportedFormat { .. }));
}

//! tn-project: scenario file format, validation and runtime construction.

pub mod output;
pub mod runtime;
pub mod schema;
pub mod validate;

use std::path::Path;

pub use output::record_to_csv;
pub use runtime::{Runtime, build_runtime, sim_options};
pub use schema::*;
pub use validate::{ValidationError, validate_scenario};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Network error: {0}")]
    Network(#[from] tn_network::NetworkError),

    #[error("State-space error: {0}")]
    StateSpace(#[from] tn_statespace::StateSpaceError),

    #[error("Equipment error: {0}")]
    Equipment(#[from] tn_equipment::EquipmentError),

    #[error("Unsupported file type: {path}")]
    UnsupportedFormat { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn from_yaml_str(content: &str) -> ProjectResult<Scenario> {
    let scenario: Scenario = serde_yaml::from_str(content)?;
    validate_scenario(&scenario)?;
    Ok(scenario)
}

pub fn from_json_str(content: &str) -> ProjectResult<Scenario> {
    let scenario: Scenario = serde_json::from_str(content)?;
    validate_scenario(&scenario)?;
    Ok(scenario)
}

pub fn load_yaml(path: &Path) -> ProjectResult<Scenario> {
    from_yaml_str(&std::fs::read_to_string(path)?)
}

pub fn load_json(path: &Path) -> ProjectResult<Scenario> {
    from_json_str(&std::fs::read_to_string(path)?)
}

/// Load by extension: `.json` as JSON, `.yaml`/`.yml` as YAML.
pub fn load(path: &Path) -> ProjectResult<Scenario> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => load_json(path),
        Some("yaml" | "yml") => load_yaml(path),
        _ => Err(ProjectError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

pub fn save_yaml(path: &Path, scenario: &Scenario) -> ProjectResult<()> {
    validate_scenario(scenario)?;
    std::fs::write(path, serde_yaml::to_string(scenario)?)?;
    Ok(())
}

pub fn save_json(path: &Path, scenario: &Scenario) -> ProjectResult<()> {
    validate_scenario(scenario)?;
    std::fs::write(path, serde_json::to_string_pretty(scenario)?)?;
    Ok(())
}

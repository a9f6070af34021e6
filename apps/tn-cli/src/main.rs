use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tn_equipment::ThermostaticEquipment;
use tn_project::{ProjectError, ProjectResult, Runtime, build_runtime, record_to_csv};
use tn_statespace::MatrixForm;
use tracing::info;

#[derive(Parser)]
#[command(name = "tn-cli")]
#[command(about = "thermonet CLI - RC network and water heater simulation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and structure
    Validate {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
    /// Run a simulation and print recorded results as CSV
    Run {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        /// Override the number of steps
        #[arg(long)]
        steps: Option<usize>,
        /// Override the result verbosity (0-9)
        #[arg(short, long)]
        verbosity: Option<u8>,
    },
    /// Print the state-space matrices of the scenario model
    Matrices {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
        #[arg(long, value_enum, default_value_t = Form::Discrete)]
        form: Form,
        /// Timestep in seconds for the resampled form
        #[arg(long, required_if_eq("form", "resampled"))]
        dt: Option<f64>,
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },
    /// Print the equivalent battery model of the scenario equipment
    Battery {
        /// Path to the scenario YAML or JSON file
        scenario_path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Form {
    Continuous,
    Discrete,
    Resampled,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn main() -> ProjectResult<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Run {
            scenario_path,
            steps,
            verbosity,
        } => cmd_run(&scenario_path, steps, verbosity),
        Commands::Matrices {
            scenario_path,
            form,
            dt,
            format,
        } => cmd_matrices(&scenario_path, form, dt, format),
        Commands::Battery { scenario_path } => cmd_battery(&scenario_path),
    }
}

fn cmd_validate(scenario_path: &Path) -> ProjectResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = tn_project::load(scenario_path)?;
    build_runtime(&scenario)?;
    println!("✓ Scenario is valid");
    Ok(())
}

fn cmd_run(scenario_path: &Path, steps: Option<usize>, verbosity: Option<u8>) -> ProjectResult<()> {
    let mut scenario = tn_project::load(scenario_path)?;
    if let Some(steps) = steps {
        scenario.steps = steps;
    }
    if let Some(verbosity) = verbosity {
        scenario.verbosity = verbosity;
    }
    tn_project::validate_scenario(&scenario)?;

    let mut runtime = build_runtime(&scenario)?;
    let record = runtime.run(&scenario)?;
    info!(rows = record.len(), "writing results");

    let csv = record_to_csv(&record, runtime.state_names(), scenario.verbosity);
    io::stdout().lock().write_all(csv.as_bytes())?;
    Ok(())
}

fn cmd_matrices(
    scenario_path: &Path,
    form: Form,
    dt: Option<f64>,
    format: Format,
) -> ProjectResult<()> {
    let scenario = tn_project::load(scenario_path)?;
    let runtime = build_runtime(&scenario)?;
    let form = match (form, dt) {
        (Form::Continuous, _) => MatrixForm::Continuous,
        (Form::Discrete, _) => MatrixForm::Discrete,
        (Form::Resampled, Some(dt)) => MatrixForm::Resampled(tn_core::s(dt)),
        (Form::Resampled, None) => MatrixForm::Discrete,
    };
    let matrices = runtime.model().export_matrices(form)?;

    let mut out = io::stdout().lock();
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, &matrices)?;
            writeln!(out)?;
        }
        Format::Csv => {
            for (label, m) in [
                ("A", &matrices.a),
                ("B", &matrices.b),
                ("C", &matrices.c),
                ("D", &matrices.d),
            ] {
                writeln!(out, "# {label}")?;
                out.write_all(m.to_csv().as_bytes())?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

fn cmd_battery(scenario_path: &Path) -> ProjectResult<()> {
    let scenario = tn_project::load(scenario_path)?;
    let Runtime::Equipment(equipment) = build_runtime(&scenario)? else {
        return Err(ProjectError::Validation(
            tn_project::ValidationError::Missing {
                field: "equipment".to_string(),
                reason: "the battery model needs a water heater".to_string(),
            },
        ));
    };
    let battery = equipment.heater().equivalent_battery()?;
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &battery)?;
    writeln!(out)?;
    Ok(())
}

//! Simulation runner and result recording.

use chrono::{NaiveDateTime, TimeDelta};
use tn_statespace::StateSpaceModel;
use tracing::info;

use crate::error::{EquipmentError, EquipmentResult};
use crate::results::{AmbientConditions, StepResults};
use crate::step::{StepContext, run_step};
use crate::traits::ThermostaticEquipment;

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Time of the first step.
    pub start: NaiveDateTime,
    /// Number of fixed steps.
    pub steps: usize,
    /// Record every N-th step (decimation); the last step is always recorded.
    pub record_every: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            start: NaiveDateTime::default(),
            steps: 1440,
            record_every: 1,
        }
    }
}

/// Record of simulation results.
#[derive(Clone, Debug, Default)]
pub struct SimRecord {
    /// Step start times.
    pub times: Vec<NaiveDateTime>,
    /// States after each recorded step.
    pub states: Vec<Vec<f64>>,
    /// Equipment results; empty for passive runs.
    pub results: Vec<StepResults>,
}

impl SimRecord {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

fn step_delta(dt_s: f64) -> EquipmentResult<TimeDelta> {
    TimeDelta::try_milliseconds((dt_s * 1000.0).round() as i64).ok_or_else(|| {
        EquipmentError::InvalidArg {
            what: format!("timestep {dt_s} s out of range"),
        }
    })
}

fn check_options(opts: &SimOptions) -> EquipmentResult<()> {
    if opts.record_every == 0 {
        return Err(EquipmentError::InvalidArg {
            what: "record_every must be positive".into(),
        });
    }
    Ok(())
}

fn should_record(step: usize, opts: &SimOptions) -> bool {
    (step + 1) % opts.record_every == 0 || step + 1 == opts.steps
}

/// Run equipment for `opts.steps` fixed steps.
///
/// `ambient` gives the zone conditions at each step start.
pub fn run_sim<E, F>(
    equipment: &mut E,
    opts: &SimOptions,
    mut ambient: F,
) -> EquipmentResult<SimRecord>
where
    E: ThermostaticEquipment + ?Sized,
    F: FnMut(NaiveDateTime) -> AmbientConditions,
{
    check_options(opts)?;
    let dt = step_delta(equipment.heater().tank().time_step_s())?;

    let mut record = SimRecord::default();
    let mut now = opts.start;
    for step in 0..opts.steps {
        let ctx = StepContext {
            now,
            ambient: ambient(now),
        };
        let results = run_step(equipment, &ctx)?;
        if should_record(step, opts) {
            record.times.push(now);
            record.states.push(equipment.heater().tank().states().to_vec());
            record.results.push(results);
        }
        now += dt;
    }

    info!(
        equipment = %equipment.name(),
        steps = opts.steps,
        recorded = record.len(),
        "simulation finished"
    );
    Ok(record)
}

/// Step a model with its current inputs held constant.
pub fn run_model(model: &mut StateSpaceModel, opts: &SimOptions) -> EquipmentResult<SimRecord> {
    check_options(opts)?;
    let dt = step_delta(model.time_step_s())?;

    let mut record = SimRecord::default();
    let mut now = opts.start;
    for step in 0..opts.steps {
        model.step(None)?;
        if should_record(step, opts) {
            record.times.push(now);
            record.states.push(model.states().iter().copied().collect());
        }
        now += dt;
    }

    info!(model = %model.name(), steps = opts.steps, recorded = record.len(), "simulation finished");
    Ok(record)
}

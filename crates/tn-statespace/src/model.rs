//! Discrete state-space model with a two-phase update.
//!
//! Each step is `x[t+1] = A·x[t] + B·u[t]`, `y[t] = C·x[t] + D·u[t]`.
//! [`StateSpaceModel::update`] computes the next state into a staging buffer;
//! [`StateSpaceModel::commit`] makes it current. Callers can look ahead with
//! `update` as often as they like before committing.

use nalgebra::{DMatrix, DVector};
use tn_core::{Time, TnError, as_seconds};
use tn_network::NameIndex;
use tracing::debug;

use crate::discretize::discretize;
use crate::error::{StateSpaceError, StateSpaceResult};
use crate::multi::MultiInputSolver;

/// Timesteps below this are treated as high resolution (5 minutes).
const HIGH_RES_THRESHOLD_S: f64 = 300.0;

/// Extra output: a weighted sum of states and inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputDef {
    pub name: String,
    pub states: Vec<(String, f64)>,
    pub inputs: Vec<(String, f64)>,
}

impl OutputDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: Vec::new(),
            inputs: Vec::new(),
        }
    }

    pub fn with_state(mut self, name: impl Into<String>, weight: f64) -> Self {
        self.states.push((name.into(), weight));
        self
    }

    pub fn with_input(mut self, name: impl Into<String>, weight: f64) -> Self {
        self.inputs.push((name.into(), weight));
        self
    }
}

#[derive(Debug, Clone)]
pub struct StateSpaceModel {
    name: String,
    state_names: NameIndex,
    input_names: NameIndex,
    output_names: NameIndex,

    a_c: DMatrix<f64>,
    b_c: DMatrix<f64>,
    a: DMatrix<f64>,
    b: DMatrix<f64>,
    c: DMatrix<f64>,
    d: DMatrix<f64>,
    time_res: Time,

    states: DVector<f64>,
    next_states: DVector<f64>,
    inputs: DVector<f64>,
    next_inputs: DVector<f64>,
    applied_inputs: DVector<f64>,

    pub(crate) solver: Option<MultiInputSolver>,
}

impl StateSpaceModel {
    /// Build a model from continuous matrices and discretize it for `time_res`.
    ///
    /// Outputs default to the states (`C = I`, `D = 0`). Initial states are
    /// zero unless given.
    pub fn new(
        name: impl Into<String>,
        state_names: Vec<String>,
        input_names: Vec<String>,
        a_c: DMatrix<f64>,
        b_c: DMatrix<f64>,
        time_res: Time,
        initial_states: Option<DVector<f64>>,
    ) -> StateSpaceResult<Self> {
        let name = name.into();
        let n = state_names.len();
        let m = input_names.len();
        check_shape("A", &a_c, n, n)?;
        check_shape("B", &b_c, n, m)?;

        let (a, b) = discretize(&a_c, &b_c, as_seconds(time_res))?;
        let states = match initial_states {
            Some(x0) => {
                check_len("initial states", &x0, n)?;
                x0
            }
            None => DVector::zeros(n),
        };

        debug!(
            model = %name,
            states = n,
            inputs = m,
            dt_s = as_seconds(time_res),
            "discretized state-space model"
        );

        Ok(Self {
            name,
            output_names: NameIndex::new("output", state_names.clone()),
            state_names: NameIndex::new("state", state_names),
            input_names: NameIndex::new("input", input_names),
            c: DMatrix::identity(n, n),
            d: DMatrix::zeros(n, m),
            a_c,
            b_c,
            a,
            b,
            time_res,
            next_states: states.clone(),
            states,
            inputs: DVector::zeros(m),
            next_inputs: DVector::zeros(m),
            applied_inputs: DVector::zeros(m),
            solver: None,
        })
    }

    /// Append weighted outputs after the default state outputs.
    ///
    /// Invalidates any cached multi-input solver.
    pub fn with_outputs(mut self, outputs: &[OutputDef]) -> StateSpaceResult<Self> {
        if outputs.is_empty() {
            return Ok(self);
        }
        let n = self.n_states();
        let m = self.n_inputs();
        let k = self.c.nrows();

        let mut c = DMatrix::zeros(k + outputs.len(), n);
        let mut d = DMatrix::zeros(k + outputs.len(), m);
        c.view_mut((0, 0), (k, n)).copy_from(&self.c);
        d.view_mut((0, 0), (k, m)).copy_from(&self.d);

        let mut names = self.output_names.names().to_vec();
        for (row, def) in outputs.iter().enumerate() {
            if names.contains(&def.name) {
                return Err(StateSpaceError::InvalidArg {
                    what: format!("duplicate output name {}", def.name),
                });
            }
            for (state, weight) in &def.states {
                c[(k + row, self.state_names.index(state)?)] += weight;
            }
            for (input, weight) in &def.inputs {
                d[(k + row, self.input_names.index(input)?)] += weight;
            }
            names.push(def.name.clone());
        }

        self.c = c;
        self.d = d;
        self.output_names = NameIndex::new("output", names);
        self.solver = None;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time_res(&self) -> Time {
        self.time_res
    }

    pub fn time_step_s(&self) -> f64 {
        as_seconds(self.time_res)
    }

    /// True when the timestep is shorter than five minutes.
    pub fn is_high_res(&self) -> bool {
        self.time_step_s() < HIGH_RES_THRESHOLD_S
    }

    pub fn state_names(&self) -> &NameIndex {
        &self.state_names
    }

    pub fn input_names(&self) -> &NameIndex {
        &self.input_names
    }

    pub fn output_names(&self) -> &NameIndex {
        &self.output_names
    }

    pub fn n_states(&self) -> usize {
        self.state_names.len()
    }

    pub fn n_inputs(&self) -> usize {
        self.input_names.len()
    }

    pub fn n_outputs(&self) -> usize {
        self.output_names.len()
    }

    /// Discrete `A`.
    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }

    /// Discrete `B`.
    pub fn b(&self) -> &DMatrix<f64> {
        &self.b
    }

    pub fn a_continuous(&self) -> &DMatrix<f64> {
        &self.a_c
    }

    pub fn b_continuous(&self) -> &DMatrix<f64> {
        &self.b_c
    }

    pub fn c(&self) -> &DMatrix<f64> {
        &self.c
    }

    pub fn d(&self) -> &DMatrix<f64> {
        &self.d
    }

    /// Committed states.
    pub fn states(&self) -> &DVector<f64> {
        &self.states
    }

    /// States from the latest `update`, not yet committed.
    pub fn next_states(&self) -> &DVector<f64> {
        &self.next_states
    }

    /// Inputs applied in the last committed step.
    pub fn inputs(&self) -> &DVector<f64> {
        &self.inputs
    }

    /// Inputs that the next `update` starts from.
    pub fn next_inputs(&self) -> &DVector<f64> {
        &self.next_inputs
    }

    pub fn state(&self, name: &str) -> StateSpaceResult<f64> {
        Ok(self.states[self.state_names.index(name)?])
    }

    pub fn set_states(&mut self, states: DVector<f64>) -> StateSpaceResult<()> {
        check_len("states", &states, self.n_states())?;
        self.next_states = states.clone();
        self.states = states;
        Ok(())
    }

    pub fn set_next_input(&mut self, name: &str, value: f64) -> StateSpaceResult<()> {
        let idx = self.input_names.index(name)?;
        self.next_inputs[idx] = value;
        Ok(())
    }

    pub fn set_next_input_at(&mut self, index: usize, value: f64) -> StateSpaceResult<()> {
        let len = self.n_inputs();
        let slot = self.next_inputs.get_mut(index).ok_or(TnError::IndexOob {
            what: "input",
            index,
            len,
        })?;
        *slot = value;
        Ok(())
    }

    /// Compute the next states from the next inputs plus an optional change.
    ///
    /// Does not change the committed states.
    pub fn update(&mut self, input_delta: Option<&DVector<f64>>) -> StateSpaceResult<&DVector<f64>> {
        let mut u = self.next_inputs.clone();
        if let Some(delta) = input_delta {
            check_len("input change", delta, self.n_inputs())?;
            u += delta;
        }
        let x = &self.a * &self.states + &self.b * &u;
        if x.iter().any(|v| !v.is_finite()) {
            return Err(StateSpaceError::NonFinite {
                what: format!("next states of {}", self.name),
            });
        }
        self.next_states = x;
        self.applied_inputs = u;
        Ok(&self.next_states)
    }

    /// Make the result of the last `update` current.
    pub fn commit(&mut self) {
        self.states = self.next_states.clone();
        self.inputs = self.applied_inputs.clone();
    }

    /// `update` followed by `commit`.
    pub fn step(&mut self, input_delta: Option<&DVector<f64>>) -> StateSpaceResult<&DVector<f64>> {
        self.update(input_delta)?;
        self.commit();
        Ok(&self.states)
    }

    /// Outputs of the committed step: `C·x + D·u`.
    pub fn outputs(&self) -> DVector<f64> {
        &self.c * &self.states + &self.d * &self.inputs
    }

    /// Outputs for the staged next states and the inputs that produced them.
    pub fn next_outputs(&self) -> DVector<f64> {
        &self.c * &self.next_states + &self.d * &self.applied_inputs
    }

    pub fn output(&self, name: &str) -> StateSpaceResult<f64> {
        let idx = self.output_names.index(name)?;
        Ok(self.outputs()[idx])
    }
}

fn check_shape(
    what: &'static str,
    m: &DMatrix<f64>,
    rows: usize,
    cols: usize,
) -> StateSpaceResult<()> {
    if m.nrows() != rows {
        return Err(StateSpaceError::Dimension {
            what,
            expected: rows,
            actual: m.nrows(),
        });
    }
    if m.ncols() != cols {
        return Err(StateSpaceError::Dimension {
            what,
            expected: cols,
            actual: m.ncols(),
        });
    }
    Ok(())
}

pub(crate) fn check_len(
    what: &'static str,
    v: &DVector<f64>,
    len: usize,
) -> StateSpaceResult<()> {
    if v.len() != len {
        return Err(StateSpaceError::Dimension {
            what,
            expected: len,
            actual: v.len(),
        });
    }
    Ok(())
}

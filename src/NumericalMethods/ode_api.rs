//! # ODE API
//!
//! Calling contract between the reactor models and the `ode_solvers` integrators.
//!
//! ```text
//! dy/dx = f(x, y),   y(x0) = y0,   x ∈ [t_eval[0], t_eval[last]]
//! ```
//!
//! `solve_ivp` restarts the chosen stepper on every interval `[t_eval[k], t_eval[k+1]]` from the
//! state at `t_eval[k]` and stores the state at each sample point. The returned matrix has one
//! row per unknown and one column per sample point.
//!
//! The right-hand side of a reactor model is fallible while `ode_solvers::System::system` is
//! not: the first error is kept aside, the derivative is zeroed and `solout` asks the stepper
//! to stop. The kept error is what `solve_ivp` returns.
use nalgebra::{DMatrix, DVector};
use ode_solvers::dop853::Dop853;
use ode_solvers::dopri5::Dopri5;
use ode_solvers::rk4::Rk4;
use ode_solvers::System;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use thiserror::Error;

/// errors of the numerical primitives
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NumericalError {
    #[error("invalid state at x = {x}: {message}")]
    InvalidState { x: f64, message: String },
    #[error("integrator stopped on [{x0}, {x1}]: {message}")]
    Integrator { x0: f64, x1: f64, message: String },
    #[error("no convergence after {evaluations} residual evaluations, residual norm {residual:e}")]
    NotConverged { evaluations: usize, residual: f64 },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// system of first order ODEs dy/dx = f(x, y)
pub trait OdeSystem {
    /// number of unknowns
    fn dimension(&self) -> usize;
    /// writes f(x, y) into `dydx`
    fn rhs(&self, x: f64, y: &DVector<f64>, dydx: &mut DVector<f64>) -> Result<(), NumericalError>;
}

/// stepper of `ode_solvers`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum IntegratorKind {
    /// adaptive Dormand-Prince 5(4)
    #[default]
    Dopri5,
    /// adaptive Dormand-Prince 8(5,3)
    Dop853,
    /// classic RK4 with a step no longer than `step`
    Rk4 { step: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntegratorSettings {
    pub method: IntegratorKind,
    /// relative tolerance
    pub rtol: f64,
    /// absolute tolerance
    pub atol: f64,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            method: IntegratorKind::Dopri5,
            rtol: 1e-6,
            atol: 1e-9,
        }
    }
}

impl IntegratorSettings {
    pub fn new(method: IntegratorKind, rtol: f64, atol: f64) -> Self {
        Self { method, rtol, atol }
    }

    pub fn validate(&self) -> Result<(), NumericalError> {
        if !(self.rtol > 0.0) || !(self.atol > 0.0) {
            return Err(NumericalError::InvalidInput(format!(
                "tolerances must be positive, got rtol = {}, atol = {}",
                self.rtol, self.atol
            )));
        }
        if let IntegratorKind::Rk4 { step } = self.method {
            if !(step > 0.0) || !step.is_finite() {
                return Err(NumericalError::InvalidInput(format!(
                    "RK4 step must be positive, got {}",
                    step
                )));
            }
        }
        Ok(())
    }
}

/// counters collected during one `solve_ivp` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrationStats {
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub rhs_evaluations: usize,
}

impl IntegrationStats {
    fn add(&mut self, accepted: usize, rejected: usize, evaluations: usize) {
        self.accepted_steps += accepted;
        self.rejected_steps += rejected;
        self.rhs_evaluations += evaluations;
    }
}

/// sampled solution of an IVP
#[derive(Debug, Clone)]
pub struct OdeSolution {
    /// sample points of the independent variable
    pub t: Vec<f64>,
    /// unknowns x sample points
    pub y: DMatrix<f64>,
    pub stats: IntegrationStats,
}

impl OdeSolution {
    /// state at the last sample point
    pub fn last_state(&self) -> DVector<f64> {
        let n = self.y.ncols();
        if n == 0 {
            return DVector::zeros(self.y.nrows());
        }
        self.y.column(n - 1).into_owned()
    }
}

/// `OdeSystem` seen through `ode_solvers::System`; the first failed evaluation stops the stepper
struct GuardedSystem<'a> {
    system: &'a dyn OdeSystem,
    error: &'a RefCell<Option<NumericalError>>,
}

impl GuardedSystem<'_> {
    fn evaluate(&self, x: f64, y: &DVector<f64>, dy: &mut DVector<f64>) -> Result<(), NumericalError> {
        self.system.rhs(x, y, dy)?;
        if let Some(i) = dy.iter().position(|v| !v.is_finite()) {
            return Err(NumericalError::InvalidState {
                x,
                message: format!("non-finite derivative in component {}", i),
            });
        }
        Ok(())
    }
}

impl System<f64, DVector<f64>> for GuardedSystem<'_> {
    fn system(&self, x: f64, y: &DVector<f64>, dy: &mut DVector<f64>) {
        if self.error.borrow().is_some() {
            dy.fill(0.0);
            return;
        }
        if let Err(e) = self.evaluate(x, y, dy) {
            dy.fill(0.0);
            *self.error.borrow_mut() = Some(e);
        }
    }

    fn solout(&mut self, _x: f64, _y: &DVector<f64>, _dy: &DVector<f64>) -> bool {
        self.error.borrow().is_some()
    }
}

fn check_sample_points(t_eval: &[f64]) -> Result<(), NumericalError> {
    if t_eval.len() < 2 {
        return Err(NumericalError::InvalidInput(format!(
            "at least two sample points are required, got {}",
            t_eval.len()
        )));
    }
    if t_eval.iter().any(|t| !t.is_finite()) {
        return Err(NumericalError::InvalidInput(
            "sample points must be finite".to_string(),
        ));
    }
    if t_eval.windows(2).any(|w| !(w[1] > w[0])) {
        return Err(NumericalError::InvalidInput(
            "sample points must be strictly increasing".to_string(),
        ));
    }
    Ok(())
}

/// output of the stepper closest to `target`, if one lies within a small fraction of the interval
fn state_at(x_out: &[f64], y_out: &[DVector<f64>], target: f64, span: f64) -> Option<DVector<f64>> {
    let (k, dist) = x_out
        .iter()
        .map(|x| (x - target).abs())
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(&b.1))?;
    if dist <= 1e-6 * span {
        y_out.get(k).cloned()
    } else {
        None
    }
}

/// one interval `[x0, x1]` from `y0`; returns the state at `x1`
fn advance(
    guarded: GuardedSystem<'_>,
    x0: f64,
    x1: f64,
    y0: &DVector<f64>,
    settings: &IntegratorSettings,
    stats: &mut IntegrationStats,
) -> Result<DVector<f64>, NumericalError> {
    let span = x1 - x0;
    let error = guarded.error;
    let stopped = |message: String| NumericalError::Integrator { x0, x1, message };
    // the adaptive steppers run slightly past x1 so that the dense output at x1 is always written
    let overshoot = x1 + 1e-9 * span;
    let (outcome, end) = match settings.method {
        IntegratorKind::Dopri5 => {
            let mut stepper = Dopri5::new(guarded, x0, overshoot, span, y0.clone(), settings.rtol, settings.atol);
            let outcome = stepper.integrate();
            (outcome, state_at(stepper.x_out(), stepper.y_out(), x1, span))
        }
        IntegratorKind::Dop853 => {
            let mut stepper = Dop853::new(guarded, x0, overshoot, span, y0.clone(), settings.rtol, settings.atol);
            let outcome = stepper.integrate();
            (outcome, state_at(stepper.x_out(), stepper.y_out(), x1, span))
        }
        IntegratorKind::Rk4 { step } => {
            let n = (span / step).ceil().max(1.0);
            let mut stepper = Rk4::new(guarded, x0, y0.clone(), x1, span / n);
            let outcome = stepper.integrate();
            (outcome, state_at(stepper.x_out(), stepper.y_out(), x1, span))
        }
    };
    if let Some(e) = error.borrow_mut().take() {
        return Err(e);
    }
    match outcome {
        Ok(s) => stats.add(s.accepted_steps as usize, s.rejected_steps as usize, s.num_eval as usize),
        Err(e) => return Err(stopped(e.to_string())),
    }
    let y1 = end.ok_or_else(|| stopped(format!("no output written at x = {}", x1)))?;
    if let Some(i) = y1.iter().position(|v| !v.is_finite()) {
        return Err(NumericalError::InvalidState {
            x: x1,
            message: format!("non-finite value in component {}", i),
        });
    }
    Ok(y1)
}

/// Integrates `system` from `t_eval[0]` with initial state `y0` and returns the state at every
/// point of `t_eval`.
pub fn solve_ivp(
    system: &dyn OdeSystem,
    y0: &DVector<f64>,
    t_eval: &[f64],
    settings: &IntegratorSettings,
) -> Result<OdeSolution, NumericalError> {
    settings.validate()?;
    check_sample_points(t_eval)?;
    if y0.len() != system.dimension() {
        return Err(NumericalError::InvalidInput(format!(
            "initial state has {} entries, system dimension is {}",
            y0.len(),
            system.dimension()
        )));
    }
    if let Some(i) = y0.iter().position(|v| !v.is_finite()) {
        return Err(NumericalError::InvalidState {
            x: t_eval[0],
            message: format!("non-finite initial value in component {}", i),
        });
    }

    let error = RefCell::new(None);
    let mut stats = IntegrationStats::default();
    let mut y = y0.clone();
    let mut columns: Vec<DVector<f64>> = Vec::with_capacity(t_eval.len());
    columns.push(y.clone());
    for window in t_eval.windows(2) {
        let guarded = GuardedSystem { system, error: &error };
        y = advance(guarded, window[0], window[1], &y, settings, &mut stats)?;
        columns.push(y.clone());
    }

    Ok(OdeSolution {
        t: t_eval.to_vec(),
        y: DMatrix::from_columns(&columns),
        stats,
    })
}

/// `n` evenly spaced points including both ends
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

//! Solver for square algebraic systems F(x) = 0.
//!
//! The system is handed to `levenberg_marquardt` as the least-squares problem min ½‖F(x)‖².
//! The Jacobian is built by forward differences. A root is accepted when max |F_i| falls below
//! `RootSolverSettings::tolerance`; a local minimum of ‖F‖ above it is reported as
//! `NumericalError::NotConverged`.
use super::ode_api::NumericalError;
use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use log::debug;
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, DVector, Dyn};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// system of algebraic equations F(x) = 0
pub trait AlgebraicSystem {
    fn dimension(&self) -> usize;
    fn residual(&self, x: &DVector<f64>, out: &mut DVector<f64>) -> Result<(), NumericalError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RootSolverSettings {
    /// convergence when max |F_i| falls below this value
    pub tolerance: f64,
    /// the minimiser gives up after `patience * (n + 1)` residual evaluations
    pub patience: usize,
}

impl Default for RootSolverSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            patience: 100,
        }
    }
}

impl RootSolverSettings {
    pub fn validate(&self) -> Result<(), NumericalError> {
        if !(self.tolerance > 0.0) || self.patience == 0 {
            return Err(NumericalError::InvalidInput(format!(
                "root solver tolerance and patience must be positive, got {} and {}",
                self.tolerance, self.patience
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RootSolution {
    pub x: DVector<f64>,
    pub residual_norm: f64,
    pub evaluations: usize,
}

/// F(x) = 0 as a least-squares problem; the residual is cached at every `set_params`
struct ResidualProblem<'a> {
    system: &'a dyn AlgebraicSystem,
    x: DVector<f64>,
    residual: Option<DVector<f64>>,
    error: RefCell<Option<NumericalError>>,
}

impl<'a> ResidualProblem<'a> {
    fn new(system: &'a dyn AlgebraicSystem, x0: &DVector<f64>) -> Self {
        let mut problem = Self {
            system,
            x: x0.clone(),
            residual: None,
            error: RefCell::new(None),
        };
        problem.residual = problem.evaluate(x0);
        problem
    }

    /// None once an evaluation has failed; the first failure is kept
    fn evaluate(&self, x: &DVector<f64>) -> Option<DVector<f64>> {
        if self.error.borrow().is_some() {
            return None;
        }
        let mut out = DVector::zeros(self.system.dimension());
        let outcome = self.system.residual(x, &mut out).and_then(|_| {
            match out.iter().position(|v| !v.is_finite()) {
                Some(i) => Err(NumericalError::InvalidState {
                    x: f64::NAN,
                    message: format!("non-finite residual in equation {}", i),
                }),
                None => Ok(()),
            }
        });
        match outcome {
            Ok(()) => Some(out),
            Err(e) => {
                *self.error.borrow_mut() = Some(e);
                None
            }
        }
    }
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for ResidualProblem<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, x: &DVector<f64>) {
        self.x.copy_from(x);
        self.residual = self.evaluate(x);
    }

    fn params(&self) -> DVector<f64> {
        self.x.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        self.residual.clone()
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let f0 = self.residual.as_ref()?;
        let n = self.x.len();
        let mut jac = DMatrix::zeros(f0.len(), n);
        let mut x_pert = self.x.clone();
        let sqrt_eps = f64::EPSILON.sqrt();
        for j in 0..n {
            let delta = sqrt_eps * self.x[j].abs().max(1.0);
            x_pert[j] = self.x[j] + delta;
            let f = self.evaluate(&x_pert)?;
            jac.set_column(j, &((f - f0) / delta));
            x_pert[j] = self.x[j];
        }
        Some(jac)
    }
}

pub fn solve_root(
    system: &dyn AlgebraicSystem,
    x0: &DVector<f64>,
    settings: &RootSolverSettings,
) -> Result<RootSolution, NumericalError> {
    settings.validate()?;
    let n = system.dimension();
    if x0.len() != n {
        return Err(NumericalError::InvalidInput(format!(
            "initial guess has {} entries, system dimension is {}",
            x0.len(),
            n
        )));
    }
    let problem = ResidualProblem::new(system, x0);
    if let Some(e) = problem.error.borrow_mut().take() {
        return Err(e);
    }
    let (problem, report) = LevenbergMarquardt::new()
        .with_patience(settings.patience)
        .minimize(problem);
    debug!(
        "Levenberg-Marquardt stopped: {:?}, {} evaluations, objective {:e}",
        report.termination, report.number_of_evaluations, report.objective_function
    );
    if let Some(e) = problem.error.borrow_mut().take() {
        return Err(e);
    }
    let residual = problem.residual.as_ref().map_or(f64::INFINITY, |f| f.amax());
    if residual < settings.tolerance {
        Ok(RootSolution {
            x: problem.params(),
            residual_norm: residual,
            evaluations: report.number_of_evaluations,
        })
    } else {
        Err(NumericalError::NotConverged {
            evaluations: report.number_of_evaluations,
            residual,
        })
    }
}

//! # Model Assembler
//!
//! Closed set of reactor models behind one trait. A model is chosen once per run from
//! `ModelVariant` and fixed for the duration of the run:
//!
//! | Id | Type | Independent variable | Unknowns |
//! |----|------|----------------------|----------|
//! | M1 | `PlugFlowFluxModel` | z, m | F_i, flux, T, P |
//! | M3 | `PlugFlowConcentrationModel` | z, m | C_i, T, P |
//! | M4 | `PlugFlowVariableVelocityModel` | z, m | C_i, T, P, v |
//! | M2/M5 | `DynamicDispersedModel` | t, s | C_i(z), T(z) |
//! | N1 | `DimensionlessPlugFlowModel` | z* | C*_i, T*, P* |
//! | T1 | `SteadyDispersedModel` | none (residual) | C*_i(z*), T*(z*) |
//!
//! `OdeAdapter` and `AlgebraicAdapter` hand a model to the numerical primitives; every
//! `ReactorError` raised inside an evaluation stops the primitive with
//! `NumericalError::InvalidState`.
use super::axial_dispersion::DynamicDispersedModel;
use super::dimensionless::{DimensionlessPlugFlowModel, SteadyDispersedModel};
use super::local_state::RunParameters;
use super::plug_flow::{PlugFlowConcentrationModel, PlugFlowFluxModel, PlugFlowVariableVelocityModel};
use super::reactor_config::{ModelVariant, SolverSettings};
use super::reactor_error::ReactorError;
use super::state_layout::StateLayout;
use crate::NumericalMethods::root_solver::AlgebraicSystem;
use crate::NumericalMethods::ode_api::{NumericalError, OdeSystem};
use enum_dispatch::enum_dispatch;
use log::info;
use nalgebra::DVector;

/// physical values of a state: one column per axial node (one node for lumped models)
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalProfile {
    /// `concentrations[i][node]`, mol/m^3
    pub concentrations: Vec<Vec<f64>>,
    /// K
    pub temperature: Vec<f64>,
    /// Pa
    pub pressure: Vec<f64>,
    /// superficial velocity, m/s
    pub velocity: Vec<f64>,
}

#[enum_dispatch]
pub trait RhsAssembler {
    fn params(&self) -> &RunParameters;
    fn layout(&self) -> StateLayout;
    /// state at the inlet for steady models, bed at t = 0 for dynamic models, initial guess
    /// for residual models
    fn initial_state(&self) -> Result<DVector<f64>, ReactorError>;
    /// derivative (or residual) of `state` at `x`, written in the layout of `state`
    fn evaluate(&self, x: f64, state: &DVector<f64>, out: &mut DVector<f64>) -> Result<(), ReactorError>;
    fn physical_profile(&self, state: &DVector<f64>) -> Result<PhysicalProfile, ReactorError>;
    /// integration end of a steady marching model in its own axial unit
    fn axial_end(&self) -> f64 {
        self.params().reactor.length
    }
    /// axial position in metres
    fn to_metres(&self, x: f64) -> f64 {
        x
    }
    /// node positions in metres of grid models, empty for lumped models
    fn axial_nodes(&self) -> Vec<f64> {
        Vec::new()
    }
}

#[enum_dispatch(RhsAssembler)]
#[derive(Debug, Clone)]
pub enum ReactorModel {
    PlugFlowFluxModel,
    PlugFlowConcentrationModel,
    PlugFlowVariableVelocityModel,
    DynamicDispersedModel,
    DimensionlessPlugFlowModel,
    SteadyDispersedModel,
}

impl ReactorModel {
    pub fn new(params: RunParameters, solver: &SolverSettings) -> Result<Self, ReactorError> {
        let variant = params.variant;
        info!("assembling model {} ({:?})", variant.id(), variant);
        let model = match variant {
            ModelVariant::PlugFlowFlux => PlugFlowFluxModel::new(params).into(),
            ModelVariant::PlugFlowConcentration => PlugFlowConcentrationModel::new(params).into(),
            ModelVariant::PlugFlowVariableVelocity => PlugFlowVariableVelocityModel::new(params).into(),
            ModelVariant::DynamicDispersed { velocity } => {
                DynamicDispersedModel::new(params, velocity, solver.z_no)?.into()
            }
            ModelVariant::DimensionlessPlugFlow => DimensionlessPlugFlowModel::new(params)?.into(),
            ModelVariant::SteadyDispersedDimensionless => SteadyDispersedModel::new(params, solver.z_no)?.into(),
        };
        Ok(model)
    }

    pub fn variant(&self) -> ModelVariant {
        self.params().variant
    }
}

fn to_numerical(x: f64, err: ReactorError) -> NumericalError {
    match err {
        ReactorError::Numerical(inner) => inner,
        other => NumericalError::InvalidState {
            x,
            message: other.to_string(),
        },
    }
}

/// a model seen as dy/dx = f(x, y)
pub struct OdeAdapter<'a> {
    pub model: &'a ReactorModel,
}

impl OdeSystem for OdeAdapter<'_> {
    fn dimension(&self) -> usize {
        self.model.layout().len()
    }

    fn rhs(&self, x: f64, y: &DVector<f64>, dydx: &mut DVector<f64>) -> Result<(), NumericalError> {
        self.model.evaluate(x, y, dydx).map_err(|e| to_numerical(x, e))
    }
}

/// a model seen as F(x) = 0
pub struct AlgebraicAdapter<'a> {
    pub model: &'a ReactorModel,
}

impl AlgebraicSystem for AlgebraicAdapter<'_> {
    fn dimension(&self) -> usize {
        self.model.layout().len()
    }

    fn residual(&self, x: &DVector<f64>, out: &mut DVector<f64>) -> Result<(), NumericalError> {
        self.model.evaluate(0.0, x, out).map_err(NumericalError::from)
    }
}

//! # Catalyst Pellet
//!
//! Isothermal diffusion and reaction inside a spherical pellet surrounded by the gas of one
//! point of the bed, on the dimensionless radius r* = r/rp with `r_no` nodes:
//!
//! ```text
//! De_i ∇²C_i + rp² R_i(C) / (1 - ε) = 0,         De_i = D_i εp / τ
//! dC_i/dr* = 0 at r* = 0,   De_i dC_i/dr = k_g,i (C_i,bulk - C_i) at r* = 1
//! ```
//!
//! R_i are the bed-volume formation rates of the kinetics, so `1 - ε` turns them into rates
//! per pellet volume. The nonlinear system is solved with `solve_root`; the initial guess is the
//! linear profile obtained with the rates frozen at the bulk state.
//!
//! The effectiveness factor of reaction j is the pellet-volume average of its rate over the rate
//! at the bulk state, `η_j = 3 ∫ r*² r_j(C(r*)) dr* / r_j(C_bulk)`.
//!
//! With a particle thermal conductivity λp and a gas/solid heat transfer coefficient h, the
//! temperature follows from the reaction heat of the converged profile:
//! `λp ∇²T - rp² Σ ΔH_j r_j / (1 - ε) = 0` with `λp dT/dr = h (T_bulk - T)` at the surface.
use super::local_state::{DerivedLocalState, Location, RunParameters};
use super::reactor_error::ReactorError;
use crate::NumericalMethods::ode_api::NumericalError;
use crate::NumericalMethods::root_solver::{AlgebraicSystem, RootSolverSettings, solve_root};
use crate::Utils::finite_difference::{PelletParameters, UniformGrid, pellet_residual, pellet_system};
use log::{info, warn};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// concentration profile and effectiveness factors of a pellet at one point of the bed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PelletProfile {
    /// m, centre to surface
    pub r: Vec<f64>,
    /// `concentrations[i][node]`, mol/m^3
    pub concentrations: Vec<Vec<f64>>,
    /// per reaction; None when the reaction does not run at the bulk state
    pub effectiveness: Vec<Option<f64>>,
    /// K; None without particle thermal conductivity or gas thermal conductivity
    pub temperature: Option<Vec<f64>>,
}

impl PelletProfile {
    /// C_i at the pellet centre
    pub fn centre_concentration(&self, i: usize) -> Option<f64> {
        self.concentrations.get(i)?.first().copied()
    }
}

/// the pellet at a bulk state (C, T, P, v)
#[allow(non_snake_case)]
pub struct PelletProblem<'a> {
    params: &'a RunParameters,
    grid: UniformGrid,
    coefficients: Vec<PelletParameters>,
    T: f64,
    P: f64,
    v: f64,
    at: Location,
    /// rp h / λp and λp
    heat: Option<(f64, f64)>,
    /// De Ct / dr^2, the size of the diffusion terms
    scale: Vec<f64>,
}

impl<'a> PelletProblem<'a> {
    /// None when the reactor has no pellet porosity or tortuosity
    pub fn new(params: &'a RunParameters, bulk: &DerivedLocalState, r_no: usize, at: Location) -> Result<Option<Self>, ReactorError> {
        let reactor = &params.reactor;
        let (Some(porosity), Some(tortuosity)) = (reactor.particle_porosity, reactor.particle_tortuosity) else {
            return Ok(None);
        };
        let grid = UniformGrid::radial(r_no)?;
        let radius = 0.5 * reactor.particle_diameter;
        if porosity == 0.0 {
            return Ok(None);
        }
        let transport = bulk.transport_numbers(params);
        let k_g = transport.mass_transfer_coefficients;
        let coefficients: Vec<PelletParameters> = params
            .diffusivity
            .iter()
            .zip(&k_g)
            .zip(&bulk.C)
            .map(|((d, k), c)| {
                let effective = d * porosity / tortuosity;
                PelletParameters {
                    diffusivity: effective,
                    alpha: radius * k / effective,
                    bulk: *c,
                    porosity,
                    radius,
                }
            })
            .collect();
        let heat = reactor
            .particle_thermal_conductivity
            .zip(transport.heat_transfer_coefficient)
            .map(|(lambda, h)| (radius * h / lambda, lambda));
        let scale = coefficients
            .iter()
            .map(|c| c.diffusivity * bulk.Ct / grid.dz.powi(2))
            .collect();
        Ok(Some(Self {
            params,
            grid,
            coefficients,
            T: bulk.T,
            P: bulk.P,
            v: bulk.v,
            at,
            heat,
            scale,
        }))
    }

    fn n_species(&self) -> usize {
        self.coefficients.len()
    }

    /// concentrations of every species at one node
    fn node_concentrations(&self, x: &DVector<f64>, node: usize) -> Vec<f64> {
        let n = self.grid.n;
        (0..self.n_species()).map(|i| x[i * n + node]).collect()
    }

    fn node_state(&self, c: &[f64], node: usize) -> Result<DerivedLocalState, ReactorError> {
        DerivedLocalState::evaluate(self.params, c, self.T, self.P, self.v, Location::node(self.at.x, node))
    }

    /// R_i / ((1 - ε)(1 - εp)), the source `pellet_residual` expects
    fn source_factor(&self, i: usize) -> f64 {
        1.0 / ((1.0 - self.params.reactor.void_fraction) * (1.0 - self.coefficients[i].porosity))
    }

    /// linear profiles with the sources frozen at the bulk state
    pub fn initial_guess(&self, bulk: &DerivedLocalState) -> Result<DVector<f64>, ReactorError> {
        let n = self.grid.n;
        let mut x = DVector::zeros(self.n_species() * n);
        for (i, coefficients) in self.coefficients.iter().enumerate() {
            let source = vec![bulk.formation_rates[i] * self.source_factor(i); n];
            let (a, b) = pellet_system(&self.grid, &source, coefficients)?;
            let profile = a.lu().solve(&(-b)).unwrap_or_else(|| DVector::from_element(n, coefficients.bulk));
            for (k, c) in profile.iter().enumerate() {
                x[i * n + k] = c.max(0.0);
            }
        }
        Ok(x)
    }

    fn evaluate(&self, x: &DVector<f64>, out: &mut DVector<f64>) -> Result<(), ReactorError> {
        let n = self.grid.n;
        let ns = self.n_species();
        let mut sources = vec![vec![0.0; n]; ns];
        for node in 0..n {
            let ls = self.node_state(&self.node_concentrations(x, node), node)?;
            for (i, source) in sources.iter_mut().enumerate() {
                source[node] = ls.formation_rates[i] * self.source_factor(i);
            }
        }
        for i in 0..ns {
            let field: Vec<f64> = x.rows(i * n, n).iter().copied().collect();
            let residual = pellet_residual(&self.grid, &field, &sources[i], &self.coefficients[i])?;
            for (k, r) in residual.into_iter().enumerate() {
                out[i * n + k] = r / self.scale[i];
            }
        }
        Ok(())
    }

    /// pellet-volume weights of the nodes, summing to one
    fn volume_weights(&self) -> Vec<f64> {
        let n = self.grid.n;
        let dr = self.grid.dz;
        let w: Vec<f64> = (0..n)
            .map(|k| {
                let r = k as f64 * dr;
                let end = if k == 0 || k == n - 1 { 0.5 } else { 1.0 };
                end * r * r
            })
            .collect();
        let total: f64 = w.iter().sum();
        w.into_iter().map(|wk| wk / total).collect()
    }

    /// profiles and effectiveness factors from a converged solution
    pub fn profile(&self, x: &DVector<f64>, bulk: &DerivedLocalState) -> Result<PelletProfile, ReactorError> {
        let n = self.grid.n;
        let weights = self.volume_weights();
        let mut averaged = vec![0.0; bulk.reaction_rates.len()];
        let mut heat_source = vec![0.0; n];
        for node in 0..n {
            let ls = self.node_state(&self.node_concentrations(x, node), node)?;
            for (avg, r) in averaged.iter_mut().zip(&ls.reaction_rates) {
                *avg += weights[node] * r;
            }
            heat_source[node] = -ls.heat_of_reaction / (1.0 - self.params.reactor.void_fraction);
        }
        let effectiveness = averaged
            .iter()
            .zip(&bulk.reaction_rates)
            .map(|(avg, r)| if r.abs() > f64::MIN_POSITIVE { Some(avg / r) } else { None })
            .collect();
        let radius = 0.5 * self.params.reactor.particle_diameter;
        Ok(PelletProfile {
            r: self.grid.nodes().iter().map(|r| r * radius).collect(),
            concentrations: (0..self.n_species())
                .map(|i| x.rows(i * n, n).iter().copied().collect())
                .collect(),
            effectiveness,
            temperature: self.temperature(&heat_source)?,
        })
    }

    /// linear conduction problem with the given heat sources, W/m^3 of pellet
    fn temperature(&self, heat_source: &[f64]) -> Result<Option<Vec<f64>>, ReactorError> {
        let Some((alpha, lambda)) = self.heat else {
            return Ok(None);
        };
        let conduction = PelletParameters {
            diffusivity: lambda,
            alpha,
            bulk: self.T,
            porosity: 0.0,
            radius: 0.5 * self.params.reactor.particle_diameter,
        };
        let (a, b) = pellet_system(&self.grid, heat_source, &conduction)?;
        match a.lu().solve(&(-b)) {
            Some(t) => Ok(Some(t.iter().copied().collect())),
            None => Err(ReactorError::InvalidConfiguration(
                "singular pellet conduction matrix".to_string(),
            )),
        }
    }
}

impl AlgebraicSystem for PelletProblem<'_> {
    fn dimension(&self) -> usize {
        self.n_species() * self.grid.n
    }

    fn residual(&self, x: &DVector<f64>, out: &mut DVector<f64>) -> Result<(), NumericalError> {
        self.evaluate(x, out).map_err(NumericalError::from)
    }
}

/// Pellet profile at a bulk state, None when the reactor has no pellet data.
pub fn solve_pellet(
    params: &RunParameters,
    bulk: &DerivedLocalState,
    r_no: usize,
    at: Location,
    settings: &RootSolverSettings,
) -> Result<Option<PelletProfile>, ReactorError> {
    let Some(problem) = PelletProblem::new(params, bulk, r_no, at)? else {
        return Ok(None);
    };
    let x0 = problem.initial_guess(bulk)?;
    let solution = match solve_root(&problem, &x0, settings) {
        Ok(solution) => solution,
        Err(e) => {
            warn!("pellet at {}: {}", at, e);
            return Err(e.into());
        }
    };
    info!(
        "pellet at {}: {} residual evaluations, residual norm {:.3e}",
        at, solution.evaluations, solution.residual_norm
    );
    problem.profile(&solution.x, bulk).map(Some)
}

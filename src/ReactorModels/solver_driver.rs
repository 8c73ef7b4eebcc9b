//! # Solver Driver
//!
//! Runs an assembled model through the numerical primitives.
//!
//! - steady marching models: one `solve_ivp` call over the reactor length with
//!   `steady_times_no` samples; a failed integration gives a result with `success = false`
//! - steady residual model: one `solve_root` call from the feed-everywhere guess
//! - dynamic models: `operating_time` split into `t_no` equal windows of `times_no` samples,
//!   integrated one after another from the state at the end of the previous window. A failed
//!   window stops the run with `ReactorError::RunFailed`.
//!
//! Every result gets the feed flow summary. After a successful run the pellet at the outlet state
//! is solved on `r_no` radial nodes when the reactor has pellet data; a pellet that does not
//! converge is logged and left out of the result.
use super::model_assembler::{AlgebraicAdapter, OdeAdapter, PhysicalProfile, ReactorModel, RhsAssembler};
use super::pellet::solve_pellet;
use super::reactor_config::SolverSettings;
use super::reactor_error::{FailureStage, ReactorError};
use super::results::{FeedFlowSummary, SimulationResult};
use crate::NumericalMethods::root_solver::solve_root;
use crate::NumericalMethods::ode_api::{linspace, solve_ivp};
use log::{error, info, warn};
use nalgebra::DVector;
use std::time::Instant;

pub fn run(model: &ReactorModel, solver: &SolverSettings) -> Result<SimulationResult, ReactorError> {
    let variant = model.variant();
    let start = Instant::now();
    let mut result = if variant.is_dynamic() {
        run_dynamic(model, solver)
    } else if variant.is_algebraic() {
        run_steady_residual(model, solver)
    } else {
        run_steady(model, solver)
    }?;
    result.feed_flow = Some(FeedFlowSummary::new(model.params()));
    if result.success {
        attach_outlet_pellet(model, solver, &mut result);
    }
    info!(
        "model {} finished in {:.3} s, success: {}",
        variant.id(),
        start.elapsed().as_secs_f64(),
        result.success
    );
    Ok(result)
}

fn attach_outlet_pellet(model: &ReactorModel, solver: &SolverSettings, result: &mut SimulationResult) {
    let params = model.params();
    let Some((at, outlet)) = result.outlet_state(params) else {
        return;
    };
    match solve_pellet(params, &outlet, solver.r_no, at, &solver.root) {
        Ok(pellet) => result.outlet_pellet = pellet,
        Err(e) => warn!("model {}: no pellet profile at the outlet: {}", model.variant().id(), e),
    }
}

fn species(model: &ReactorModel) -> Vec<String> {
    model.params().reaction_set.species.clone()
}

pub fn run_steady(model: &ReactorModel, solver: &SolverSettings) -> Result<SimulationResult, ReactorError> {
    let variant = model.variant();
    let y0 = model.initial_state()?;
    let xs = linspace(0.0, model.axial_end(), solver.steady_times_no);
    info!(
        "model {}: integrating {} unknowns over [0, {}] with {:?}",
        variant.id(),
        y0.len(),
        model.axial_end(),
        solver.integrator.method
    );
    let solution = match solve_ivp(&OdeAdapter { model }, &y0, &xs, &solver.integrator) {
        Ok(solution) => solution,
        Err(e) => {
            error!("model {}: integration failed: {}", variant.id(), e);
            return Ok(SimulationResult::failed(
                &variant,
                species(model),
                FailureStage::Integration { window: None },
                e.to_string(),
            ));
        }
    };
    info!(
        "model {}: {} steps accepted, {} rejected, {} RHS evaluations",
        variant.id(),
        solution.stats.accepted_steps,
        solution.stats.rejected_steps,
        solution.stats.rhs_evaluations
    );
    let profiles = solution
        .y
        .column_iter()
        .map(|col| model.physical_profile(&col.into_owned()))
        .collect::<Result<Vec<_>, _>>()?;
    let z = solution.t.iter().map(|x| model.to_metres(*x)).collect();
    SimulationResult::from_steady_profiles(model, z, &profiles)
}

pub fn run_steady_residual(model: &ReactorModel, solver: &SolverSettings) -> Result<SimulationResult, ReactorError> {
    let variant = model.variant();
    let x0 = model.initial_state()?;
    info!("model {}: solving {} residual equations", variant.id(), x0.len());
    match solve_root(&AlgebraicAdapter { model }, &x0, &solver.root) {
        Ok(solution) => {
            info!(
                "model {}: converged after {} residual evaluations, residual norm {:.3e}",
                variant.id(),
                solution.evaluations,
                solution.residual_norm
            );
            let profile = model.physical_profile(&solution.x)?;
            SimulationResult::from_grid_profile(model, &profile)
        }
        Err(e) => {
            error!("model {}: root solve failed: {}", variant.id(), e);
            Ok(SimulationResult::failed(
                &variant,
                species(model),
                FailureStage::RootSolve,
                e.to_string(),
            ))
        }
    }
}

/// `t_no` consecutive windows over `[0, operating_time]`
pub fn time_windows(solver: &SolverSettings) -> Vec<(f64, f64)> {
    let dt = solver.operating_time / solver.t_no as f64;
    (0..solver.t_no)
        .map(|k| {
            let end = if k + 1 == solver.t_no { solver.operating_time } else { (k + 1) as f64 * dt };
            (k as f64 * dt, end)
        })
        .collect()
}

pub fn run_dynamic(model: &ReactorModel, solver: &SolverSettings) -> Result<SimulationResult, ReactorError> {
    let variant = model.variant();
    let fail = |window: usize, message: String| {
        error!("model {}: time window {} failed: {}", variant.id(), window, message);
        ReactorError::RunFailed {
            variant: variant.id().to_string(),
            stage: FailureStage::Integration { window: Some(window) },
            message,
        }
    };
    let mut state: DVector<f64> = model.initial_state()?;
    let mut samples: Vec<(f64, PhysicalProfile)> = vec![(0.0, model.physical_profile(&state)?)];
    let mut window_ends = Vec::with_capacity(solver.t_no);
    let windows = time_windows(solver);

    for (k, (t0, t1)) in windows.into_iter().enumerate() {
        info!(
            "model {}: time window {}/{}, t in [{:.4e}, {:.4e}] s",
            variant.id(),
            k + 1,
            solver.t_no,
            t0,
            t1
        );
        let ts = linspace(t0, t1, solver.times_no);
        let solution = solve_ivp(&OdeAdapter { model }, &state, &ts, &solver.integrator)
            .map_err(|e| fail(k, e.to_string()))?;
        // the first column repeats the end of the previous window
        for (t, col) in solution.t.iter().zip(solution.y.column_iter()).skip(1) {
            let profile = model.physical_profile(&col.into_owned()).map_err(|e| fail(k, e.to_string()))?;
            samples.push((*t, profile));
        }
        state = solution.last_state();
        let end_profile = model.physical_profile(&state).map_err(|e| fail(k, e.to_string()))?;
        window_ends.push((t1, end_profile));
    }
    SimulationResult::from_dynamic(model, &samples, &window_ends)
}

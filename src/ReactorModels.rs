/// error enums of the simulator and the stage at which a run failed
pub mod reactor_error;
/// serde configuration of one run: reactor, feed, heat exchange, solver settings, model variant
pub mod reactor_config;
/// named state records and their flat layout for the numerical primitives
pub mod state_layout;
/// feed-referenced scaling factors and conversions between physical and scaled values
pub mod scaling;
/// run parameters and the local state derived from (C, T, P, v) at every evaluation
pub mod local_state;
/// `RhsAssembler` trait, `ReactorModel` enum and adapters to the ODE and root solvers
pub mod model_assembler;
/// steady plug flow: M1 (flowrates and flux), M3 (concentrations), M4 (variable velocity)
pub mod plug_flow;
/// dynamic axially dispersed bed on a finite-difference grid (M2, M5)
pub mod axial_dispersion;
/// feed-scaled models: plug flow N1 and the steady dispersed residual model T1
pub mod dimensionless;
/// diffusion and reaction inside a catalyst pellet, effectiveness factors
pub mod pellet;
/// series of a finished run, tables and JSON
pub mod results;
/// steady runs, time windows of dynamic runs, root solve
pub mod solver_driver;
/// setup chain from configuration to an assembled model
///
/// # Examples
/// ```
/// use PackedBedSim::ReactorModels::reactor_config::ModelVariant;
/// assert_eq!(ModelVariant::PlugFlowVariableVelocity.id(), "M4");
/// ```
pub mod packed_bed_task;

#[cfg(test)]
mod test_fixtures;
mod axial_dispersion_tests;
mod pellet_tests;

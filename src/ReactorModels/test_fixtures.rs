//! A => B test case shared by the model tests.
use super::model_assembler::ReactorModel;
use super::packed_bed_task::PackedBedTask;
use super::reactor_config::{
    FeedComposition, FeedFlow, FeedState, HeatExchange, ModelOptions, ModelVariant,
    ReactorSpec, SimulationConfig, SolverSettings,
};
use crate::Kinetics::rate_expressions::KineticModel;
use crate::Thermodynamics::component_data::{ComponentData, ComponentDataStore, HeatCapacityModel};
use crate::Thermodynamics::thermo_properties::R_G;

pub const C_A0: f64 = 10.0;
pub const T0: f64 = 500.0;
pub const V0: f64 = 0.1;
pub const LENGTH: f64 = 1.0;

/// feed pressure giving a total concentration of `C_A0`
pub fn feed_pressure() -> f64 {
    C_A0 * R_G * T0
}

/// A and B with equal molar mass, constant Cp and equal heats of formation
pub fn ab_store() -> ComponentDataStore {
    let mut store = ComponentDataStore::new();
    store.insert(ComponentData::new("A", 28.0, 300.0, 3e6, HeatCapacityModel::Constant(30.0), -50e3));
    store.insert(ComponentData::new("B", 28.0, 300.0, 3e6, HeatCapacityModel::Constant(30.0), -50e3));
    store
}

pub fn first_order(k: f64) -> KineticModel {
    KineticModel::new()
        .with_parameter("k", k)
        .rate("r1", |ctx| Ok(ctx.param("k")? * ctx.C("A")?))
}

pub fn ab_config(model: ModelVariant) -> SimulationConfig {
    SimulationConfig {
        reactor: ReactorSpec {
            diameter: 0.05,
            length: LENGTH,
            void_fraction: 0.4,
            particle_diameter: 4e-3,
            catalyst_bulk_density: 1000.0,
            particle_density: 1800.0,
            particle_heat_capacity: 900.0,
            particle_porosity: None,
            particle_tortuosity: None,
            particle_thermal_conductivity: None,
        },
        feed: FeedState {
            species: vec!["A".to_string(), "B".to_string()],
            composition: FeedComposition::MoleFractions(vec![1.0, 0.0]),
            flow: FeedFlow::SuperficialVelocity(V0),
            T: T0,
            P: feed_pressure(),
            viscosity: 2e-5,
            diffusivity: Some(vec![1e-5, 1e-5]),
            thermal_conductivity: Some(0.05),
        },
        heat_exchange: HeatExchange::adiabatic(T0),
        solver: SolverSettings::default(),
        model,
        options: ModelOptions::default().isothermal().without_pressure_drop(),
        correlations: Default::default(),
        reactions: vec!["A => B".to_string()],
    }
}

pub fn ab_task(config: SimulationConfig, k: f64) -> PackedBedTask {
    PackedBedTask::new(config, first_order(k)).with_component_store(ab_store())
}

pub fn ab_model(config: SimulationConfig, k: f64) -> ReactorModel {
    let mut task = ab_task(config, k);
    task.setup().unwrap().clone()
}

//! # DME synthesis
//!
//! Direct synthesis of dimethyl ether from syngas over a bifunctional catalyst:
//!
//! 1. CO2 + 3H2 <=> CH3OH + H2O
//! 2. CO + H2O <=> H2 + CO2
//! 3. 2CH3OH <=> DME + H2O
//!
//! Langmuir-Hinshelwood rates in kmol/kgcat/s with partial pressures in bar, converted to
//! mol/m^3/s of bed with the bulk catalyst density.
use crate::Kinetics::rate_expressions::{KineticModel, KineticsError, RateContext};
use crate::ReactorModels::packed_bed_task::PackedBedTask;
use crate::ReactorModels::reactor_config::{
    FeedComposition, FeedFlow, FeedState, HeatExchange, ModelOptions, ModelVariant,
    ReactorSpec, SimulationConfig, SolverSettings, VelocityTreatment,
};
use crate::ReactorModels::reactor_error::ReactorError;
use crate::ReactorModels::results::SimulationResult;
use crate::NumericalMethods::ode_api::{IntegratorKind, IntegratorSettings};
use crate::Thermodynamics::thermo_properties::R_G;
use log::info;

pub const DME_SPECIES: [&str; 6] = ["H2", "CO2", "H2O", "CO", "CH3OH", "DME"];
pub const DME_REACTIONS: [&str; 3] = [
    "CO2 + 3H2 <=> CH3OH + H2O",
    "CO + H2O <=> H2 + CO2",
    "2CH3OH <=> DME + H2O",
];

const BULK_DENSITY: f64 = 1171.2;

/// partial pressure in bar
fn bar(ctx: &RateContext, species: &str) -> Result<f64, KineticsError> {
    Ok(ctx.partial_pressure(species)? * 1e-5)
}

pub fn dme_kinetics(bulk_density: f64) -> KineticModel {
    KineticModel::new()
        .with_parameter("rho_b", bulk_density)
        // kmol -> mol
        .with_parameter("kmol", 1e3)
        .variable("RT", |ctx| Ok(R_G * ctx.T()))
        // rate constants
        .variable("K1", |ctx| Ok(35.45 * (-1.7069e4 / ctx.var("RT")?).exp()))
        .variable("K2", |ctx| Ok(7.3976 * (-2.0436e4 / ctx.var("RT")?).exp()))
        .variable("K3", |ctx| Ok(8.2894e4 * (-5.2940e4 / ctx.var("RT")?).exp()))
        // adsorption constants, 1/bar
        .variable("KH2", |ctx| Ok(0.249 * (3.4394e4 / ctx.var("RT")?).exp()))
        .variable("KCO2", |ctx| Ok(1.02e-7 * (6.74e4 / ctx.var("RT")?).exp()))
        .variable("KCO", |ctx| Ok(7.99e-7 * (5.81e4 / ctx.var("RT")?).exp()))
        // equilibrium constants
        .variable("KP1", |ctx| {
            let t = ctx.T();
            Ok((4213.0 / t - 5.752 * t.ln() - 1.707e-3 * t + 2.682e-6 * t.powi(2) - 7.232e-10 * t.powi(3)
                + 17.6)
                .exp())
        })
        .variable("KP2", |ctx| {
            let t = ctx.T();
            Ok(10f64.powf(2167.0 / t - 0.5194 * t.log10() + 1.037e-3 * t - 2.331e-7 * t.powi(2) - 1.2777))
        })
        .variable("KP3", |ctx| {
            let t = ctx.T();
            Ok((4019.0 / t + 3.707 * t.ln() - 2.783e-3 * t + 3.8e-7 * t.powi(2) - 6.56e-4 / t.powi(3) - 26.64)
                .exp())
        })
        .variable("ra1", |ctx| Ok(bar(ctx, "CO2")? * bar(ctx, "H2")?))
        .variable("ra2", |ctx| {
            Ok(1.0
                + ctx.var("KCO2")? * bar(ctx, "CO2")?
                + ctx.var("KCO")? * bar(ctx, "CO")?
                + (ctx.var("KH2")? * bar(ctx, "H2")?).sqrt())
        })
        .variable("ra3", |ctx| {
            Ok(bar(ctx, "H2O")? * bar(ctx, "CH3OH")? / (ctx.var("KP1")? * bar(ctx, "CO2")? * bar(ctx, "H2")?.powi(3)))
        })
        .variable("ra4", |ctx| {
            Ok(bar(ctx, "H2O")? - bar(ctx, "CO2")? * bar(ctx, "H2")? / (ctx.var("KP2")? * bar(ctx, "CO")?))
        })
        .variable("ra5", |ctx| {
            Ok(bar(ctx, "CH3OH")?.powi(2) / bar(ctx, "H2O")? - bar(ctx, "DME")? / ctx.var("KP3")?)
        })
        .rate("r1", |ctx| {
            Ok(ctx.var("K1")? * ctx.var("ra1")? / ctx.var("ra2")?.powi(3)
                * (1.0 - ctx.var("ra3")?)
                * ctx.param("rho_b")?
                * ctx.param("kmol")?)
        })
        .rate("r2", |ctx| {
            Ok(ctx.var("K2")? / ctx.var("ra2")? * ctx.var("ra4")? * ctx.param("rho_b")? * ctx.param("kmol")?)
        })
        .rate("r3", |ctx| Ok(ctx.var("K3")? * ctx.var("ra5")? * ctx.param("rho_b")? * ctx.param("kmol")?))
}

/// H2/COx = 1 and CO2/COx = 0.5 with traces of the products, 5 MPa and 523 K
pub fn dme_config(model: ModelVariant) -> SimulationConfig {
    SimulationConfig {
        reactor: ReactorSpec {
            diameter: 0.03,
            length: 1.0,
            void_fraction: 0.39,
            particle_diameter: 2e-3,
            catalyst_bulk_density: BULK_DENSITY,
            particle_density: 1982.0,
            particle_heat_capacity: 960.0,
            particle_porosity: Some(0.45),
            particle_tortuosity: Some(4.0),
            particle_thermal_conductivity: Some(0.5),
        },
        feed: FeedState {
            species: DME_SPECIES.iter().map(|s| s.to_string()).collect(),
            composition: FeedComposition::MoleFractions(vec![0.49, 0.245, 0.01, 0.245, 0.005, 0.005]),
            flow: FeedFlow::SuperficialVelocity(0.2),
            T: 523.0,
            P: 5e6,
            viscosity: 1e-5,
            diffusivity: Some(vec![1e-5; 6]),
            thermal_conductivity: Some(0.1),
        },
        heat_exchange: HeatExchange {
            U: 50.0,
            T_medium: 523.0,
            area_per_volume: None,
        },
        solver: SolverSettings {
            integrator: IntegratorSettings::new(IntegratorKind::Rk4 { step: 1e-5 }, 1e-4, 1e-6),
            ..SolverSettings::default()
        },
        model,
        options: ModelOptions::default(),
        correlations: Default::default(),
        reactions: DME_REACTIONS.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn dme_task(model: ModelVariant) -> PackedBedTask {
    let config = dme_config(model);
    let bulk_density = config.reactor.catalyst_bulk_density;
    let mut task = PackedBedTask::new(config, dme_kinetics(bulk_density));
    task.set_problem_name("DME synthesis");
    task
}

pub fn run_dme(model: ModelVariant) -> Result<SimulationResult, ReactorError> {
    let mut task = dme_task(model);
    let result = task.solve()?;
    info!(
        "DME at the outlet: {:?} mol/m3, T = {:?} K",
        result.outlet_concentration("DME"),
        result.outlet_temperature()
    );
    Ok(result)
}

pub fn reactor_examples(task: usize) {
    let model = match task {
        0 => ModelVariant::PlugFlowVariableVelocity,
        1 => ModelVariant::PlugFlowConcentration,
        2 => ModelVariant::PlugFlowFlux,
        _ => ModelVariant::DynamicDispersed {
            velocity: VelocityTreatment::Marching,
        },
    };
    match run_dme(model) {
        Ok(result) => result.print_table(3),
        Err(e) => println!("model {} failed: {}", model.id(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReactorModels::local_state::{DerivedLocalState, Location};
    use crate::ReactorModels::model_assembler::RhsAssembler;

    #[test]
    fn test_dme_task_sets_up() {
        let mut task = dme_task(ModelVariant::PlugFlowVariableVelocity);
        let model = task.setup().unwrap();
        assert_eq!(model.variant().id(), "M4");
        // 6 species, T, P, v
        assert_eq!(model.layout().len(), 9);
    }

    #[test]
    fn test_dme_rates_at_feed() {
        let mut task = dme_task(ModelVariant::PlugFlowConcentration);
        let params = task.setup().unwrap().params();
        let f = &params.feed;
        let ls = DerivedLocalState::evaluate(params, &f.C, f.T, f.P, f.v, Location::at(0.0)).unwrap();
        assert!(ls.reaction_rates.iter().all(|r| *r > 0.0));
        let dme = DME_SPECIES.iter().position(|s| *s == "DME").unwrap();
        let h2 = DME_SPECIES.iter().position(|s| *s == "H2").unwrap();
        assert!(ls.formation_rates[dme] > 0.0);
        assert!(ls.formation_rates[h2] < 0.0);
        // the overall synthesis is exothermic
        assert!(ls.heat_of_reaction < 0.0);
    }
}

#[cfg(test)]
mod tests {
    use crate::Kinetics::rate_expressions::KineticModel;
    use crate::NumericalMethods::root_solver::RootSolverSettings;
    use crate::ReactorModels::local_state::{DerivedLocalState, Location};
    use crate::ReactorModels::model_assembler::{ReactorModel, RhsAssembler};
    use crate::ReactorModels::packed_bed_task::PackedBedTask;
    use crate::ReactorModels::pellet::{PelletProfile, solve_pellet};
    use crate::ReactorModels::reactor_config::{ModelVariant, SimulationConfig};
    use crate::ReactorModels::test_fixtures::*;
    use crate::Thermodynamics::component_data::{ComponentData, ComponentDataStore, HeatCapacityModel};
    use crate::Utils::reactor_utils::{MOLAR_VOLUME_STP, P_STP, T_STP, reactor_cross_section_area};
    use approx::assert_relative_eq;

    const K: f64 = 1.0;
    const POROSITY: f64 = 0.5;
    const TORTUOSITY: f64 = 3.0;
    const RADIUS: f64 = 2e-3;

    fn pellet_config() -> SimulationConfig {
        let mut config = ab_config(ModelVariant::PlugFlowConcentration);
        config.reactor.particle_porosity = Some(POROSITY);
        config.reactor.particle_tortuosity = Some(TORTUOSITY);
        config
    }

    fn feed_state(model: &ReactorModel) -> DerivedLocalState {
        DerivedLocalState::evaluate(model.params(), &[C_A0, 0.0], T0, feed_pressure(), V0, Location::at(0.0)).unwrap()
    }

    fn pellet_at_feed(model: &ReactorModel, r_no: usize) -> PelletProfile {
        let bulk = feed_state(model);
        solve_pellet(model.params(), &bulk, r_no, Location::at(0.0), &RootSolverSettings::default())
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_first_order_effectiveness_matches_thiele_solution() {
        let model = ab_model(pellet_config(), K);
        let pellet = pellet_at_feed(&model, 41);

        let de = 1e-5 * POROSITY / TORTUOSITY;
        let phi = RADIUS * (K / ((1.0 - 0.4) * de)).sqrt();
        let eta = 3.0 / phi.powi(2) * (phi / phi.tanh() - 1.0);
        let k_g = feed_state(&model).transport_numbers(model.params()).mass_transfer_coefficients[0];
        let biot = RADIUS * k_g / de;
        let overall = eta / (1.0 + phi.powi(2) * eta / (3.0 * biot));
        assert_relative_eq!(pellet.effectiveness[0].unwrap(), overall, max_relative = 2e-2);

        assert_eq!(pellet.r.len(), 41);
        assert_relative_eq!(*pellet.r.last().unwrap(), RADIUS, max_relative = 1e-12);
        let a = &pellet.concentrations[0];
        assert!(a.windows(2).all(|w| w[1] > w[0]));
        assert!(*a.last().unwrap() < C_A0);
        // equal diffusivities keep A + B at the bulk total
        for (ca, cb) in a.iter().zip(&pellet.concentrations[1]) {
            assert_relative_eq!(ca + cb, C_A0, max_relative = 1e-6);
        }
        // no particle thermal conductivity
        assert!(pellet.temperature.is_none());
    }

    #[test]
    fn test_no_pellet_without_pore_data() {
        let model = ab_model(ab_config(ModelVariant::PlugFlowConcentration), K);
        let bulk = feed_state(&model);
        let pellet = solve_pellet(model.params(), &bulk, 11, Location::at(0.0), &RootSolverSettings::default());
        assert!(pellet.unwrap().is_none());
    }

    #[test]
    fn test_pellet_temperature_follows_reaction_heat() {
        let mut config = pellet_config();
        config.reactor.particle_thermal_conductivity = Some(0.3);

        // A => B without reaction heat
        let flat = pellet_at_feed(&ab_model(config.clone(), K), 21);
        for t in flat.temperature.unwrap() {
            assert_relative_eq!(t, T0, epsilon = 1e-9);
        }

        let mut store = ComponentDataStore::new();
        store.insert(ComponentData::new("A", 28.0, 300.0, 3e6, HeatCapacityModel::Constant(30.0), -50e3));
        store.insert(ComponentData::new("B", 28.0, 300.0, 3e6, HeatCapacityModel::Constant(30.0), -80e3));
        let mut task = PackedBedTask::new(config, first_order(K)).with_component_store(store);
        let model = task.setup().unwrap().clone();
        let hot = pellet_at_feed(&model, 21).temperature.unwrap();
        assert!(hot.windows(2).all(|w| w[1] < w[0]));
        assert!(*hot.last().unwrap() > T0);
    }

    #[test]
    fn test_run_reports_feed_flow_and_outlet_pellet() {
        let result = ab_task(pellet_config(), 0.5).solve().unwrap();
        assert!(result.success, "{:?}", result.failure);

        let flow = result.feed_flow.as_ref().unwrap();
        let q = V0 * reactor_cross_section_area(0.05);
        let volume = reactor_cross_section_area(0.05) * LENGTH;
        let q_stp = q * (feed_pressure() / P_STP) * (T_STP / T0);
        assert_relative_eq!(flow.volumetric_flowrate, q, max_relative = 1e-12);
        assert_relative_eq!(flow.space_velocity, V0 / LENGTH, max_relative = 1e-12);
        assert_relative_eq!(flow.volumetric_flowrate_stp, q_stp, max_relative = 1e-12);
        assert_relative_eq!(flow.molar_flowrate_stp, q_stp / MOLAR_VOLUME_STP, max_relative = 1e-12);
        assert_relative_eq!(flow.gas_hourly_space_velocity, 3600.0 * q_stp / volume, max_relative = 1e-12);

        let pellet = result.outlet_pellet.as_ref().unwrap();
        assert_eq!(pellet.r.len(), 7);
        let eta = pellet.effectiveness[0].unwrap();
        assert!(eta > 0.0 && eta < 1.0);
        let surface = *pellet.concentrations[0].last().unwrap();
        assert!(surface < result.outlet_concentration("A").unwrap());
        result.print_table(6);
    }

    #[test]
    fn test_failed_run_has_feed_flow_but_no_pellet() {
        // NaN once C_A drops below 9
        let kinetics = KineticModel::new().rate("r1", |ctx| Ok(ctx.C("A")? + 0.0 * (ctx.C("A")? - 9.0).sqrt()));
        let result = PackedBedTask::new(pellet_config(), kinetics)
            .with_component_store(ab_store())
            .solve()
            .unwrap();
        assert!(!result.success);
        assert!(result.feed_flow.is_some());
        assert!(result.outlet_pellet.is_none());
    }
}

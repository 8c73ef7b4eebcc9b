#[cfg(test)]
mod tests {
    use crate::ReactorModels::axial_dispersion::DynamicDispersedModel;
    use crate::ReactorModels::model_assembler::{ReactorModel, RhsAssembler};
    use crate::ReactorModels::reactor_config::{HeatExchange, ModelVariant, SimulationConfig, VelocityTreatment};
    use crate::ReactorModels::reactor_error::ReactorError;
    use crate::ReactorModels::state_layout::Field;
    use crate::ReactorModels::test_fixtures::*;
    use crate::Thermodynamics::transport_correlations::binary_diffusivity;
    use crate::Utils::finite_difference::OutletCondition;
    use approx::assert_relative_eq;
    use nalgebra::DVector;

    const EOS: ModelVariant = ModelVariant::DynamicDispersed {
        velocity: VelocityTreatment::EquationOfState,
    };
    const MARCHING: ModelVariant = ModelVariant::DynamicDispersed {
        velocity: VelocityTreatment::Marching,
    };

    fn config(variant: ModelVariant) -> SimulationConfig {
        let mut config = ab_config(variant);
        config.solver.z_no = 11;
        config
    }

    fn dispersed(model: &ReactorModel) -> &DynamicDispersedModel {
        match model {
            ReactorModel::DynamicDispersedModel(m) => m,
            _ => panic!("not a dispersed model"),
        }
    }

    fn rhs(model: &ReactorModel, y: &DVector<f64>) -> DVector<f64> {
        let mut out = DVector::zeros(y.len());
        model.evaluate(0.0, y, &mut out).unwrap();
        out
    }

    #[test]
    fn test_initial_bed_holds_the_feed() {
        let model = ab_model(config(EOS), 0.5);
        let y0 = model.initial_state().unwrap();
        let layout = model.layout();
        assert_eq!(y0.len(), 3 * 11);
        for z in 0..11 {
            assert_eq!(y0[layout.index(Field::Species(0), z).unwrap()], C_A0);
            assert_eq!(y0[layout.index(Field::Species(1), z).unwrap()], 0.0);
            assert_eq!(y0[layout.index(Field::Temperature, z).unwrap()], T0);
        }
        assert_eq!(model.axial_nodes().len(), 11);
        assert_relative_eq!(*model.axial_nodes().last().unwrap(), LENGTH);
    }

    #[test]
    fn test_uniform_bed_only_reacts() {
        for variant in [EOS, MARCHING] {
            let model = ab_model(config(variant), 0.5);
            let y0 = model.initial_state().unwrap();
            let d = rhs(&model, &y0);
            let layout = model.layout();
            for z in 0..11 {
                let ia = layout.index(Field::Species(0), z).unwrap();
                let ib = layout.index(Field::Species(1), z).unwrap();
                assert_relative_eq!(d[ia], -0.5 * C_A0 / 0.4, max_relative = 1e-6);
                // B is floored in the neighbours but taken as is at the node
                assert_relative_eq!(d[ib], 0.5 * C_A0 / 0.4, max_relative = 1e-6);
                assert_eq!(d[layout.index(Field::Temperature, z).unwrap()], 0.0);
            }
        }
    }

    #[test]
    fn test_dispersion_vanishes_for_a_uniform_bed() {
        let plain = ab_model(config(EOS), 0.5);
        let mut with_dispersion = config(EOS);
        with_dispersion.options.axial_dispersion = true;
        let dispersed_model = ab_model(with_dispersion, 0.5);
        let y0 = plain.initial_state().unwrap();
        let a = rhs(&plain, &y0);
        let b = rhs(&dispersed_model, &y0);
        for k in 0..a.len() {
            assert_relative_eq!(a[k], b[k], epsilon = 1e-6, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_outlet_condition_only_changes_the_last_node() {
        let mut zero_gradient = config(EOS);
        zero_gradient.options.axial_dispersion = true;
        let mut extrapolated = zero_gradient.clone();
        extrapolated.options.outlet_condition = OutletCondition::Extrapolated;
        let a_model = ab_model(zero_gradient, 0.5);
        let b_model = ab_model(extrapolated, 0.5);

        // A falls linearly to half the feed, B makes up the total
        let layout = a_model.layout();
        let mut y = a_model.initial_state().unwrap();
        for z in 0..11 {
            let ca = C_A0 * (1.0 - 0.05 * z as f64);
            y[layout.index(Field::Species(0), z).unwrap()] = ca;
            y[layout.index(Field::Species(1), z).unwrap()] = C_A0 - ca;
        }
        let a = rhs(&a_model, &y);
        let b = rhs(&b_model, &y);
        for z in 0..10 {
            let k = layout.index(Field::Species(0), z).unwrap();
            assert_relative_eq!(a[k], b[k], epsilon = 1e-12, max_relative = 1e-12);
        }
        // zero gradient sees curvature 2 (C_9 - C_10) / dz^2, a straight line continued sees none
        let outlet = layout.index(Field::Species(0), 10).unwrap();
        let curvature = 2.0 * (0.05 * C_A0) / (0.1_f64 * 0.1);
        assert_relative_eq!(a[outlet] - b[outlet], 1e-5 * curvature, max_relative = 1e-6);
    }

    #[test]
    fn test_marched_pressure_and_velocity() {
        let mut cfg = config(MARCHING);
        cfg.options.momentum_balance = true;
        let model = ab_model(cfg, 0.0);
        let m = dispersed(&model);
        let y0 = model.initial_state().unwrap();
        let record = model.layout().unpack(&y0).unwrap();
        let profile = m.march_algebraic_fields(0.0, &record).unwrap();
        assert_eq!(profile.pressure.len(), 12);
        assert_eq!(profile.velocity.len(), 12);
        assert_eq!(profile.pressure[0], feed_pressure());
        assert!(profile.pressure.windows(2).all(|w| w[1] < w[0]));
        // the gas expands as the pressure falls
        assert!(profile.velocity.windows(2).all(|w| w[1] > w[0]));
        assert!(profile.velocity_gradient.iter().all(|g| *g > 0.0));

        // the same snapshot gives the same derivative twice
        let first = rhs(&model, &y0);
        let second = rhs(&model, &y0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_equation_of_state_velocity_without_pressure_drop() {
        let model = ab_model(config(EOS), 0.5);
        let m = dispersed(&model);
        let y0 = model.initial_state().unwrap();
        let record = model.layout().unpack(&y0).unwrap();
        let profile = m.march_algebraic_fields(0.0, &record).unwrap();
        assert!(profile.pressure.iter().all(|p| *p == feed_pressure()));
        for v in &profile.velocity {
            assert_relative_eq!(*v, V0, max_relative = 1e-9);
        }
        assert!(profile.velocity_gradient.iter().all(|g| *g == 0.0));
    }

    #[test]
    fn test_wall_heating_of_the_bed() {
        let mut cfg = config(EOS);
        cfg.options.energy_balance = true;
        cfg.heat_exchange = HeatExchange {
            U: 50.0,
            T_medium: T0 + 20.0,
            area_per_volume: None,
        };
        let model = ab_model(cfg, 0.0);
        let y0 = model.initial_state().unwrap();
        let d = rhs(&model, &y0);
        let capacity = C_A0 * 30.0 * 0.4 + 0.6 * 1800.0 * 900.0;
        let expected = 50.0 * 80.0 * 20.0 / capacity;
        for z in 0..11 {
            let it = model.layout().index(Field::Temperature, z).unwrap();
            assert_relative_eq!(d[it], expected, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_dispersion_needs_thermal_conductivity() {
        let mut cfg = config(EOS);
        cfg.options.axial_dispersion = true;
        cfg.feed.thermal_conductivity = None;
        assert!(matches!(cfg.validate(), Err(ReactorError::MissingData(_))));
        let mut task = ab_task(cfg, 0.5);
        assert!(matches!(task.setup(), Err(ReactorError::MissingData(_))));
    }

    #[test]
    fn test_missing_diffusivities_are_estimated() {
        let mut cfg = config(EOS);
        cfg.options.axial_dispersion = true;
        cfg.feed.diffusivity = None;
        cfg.validate().unwrap();
        let model = ab_model(cfg, 0.5);
        let params = model.params();
        let store = ab_store();
        let a = store.get("A").unwrap();
        let expected = binary_diffusivity(T0, feed_pressure(), a, a);
        for d in &params.diffusivity {
            assert_relative_eq!(*d, expected, max_relative = 1e-12);
        }
        assert_eq!(params.feed_config.diffusivity.as_ref(), Some(&params.diffusivity));
        let y0 = model.initial_state().unwrap();
        assert!(rhs(&model, &y0).iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_nan_in_the_bed_is_invalid_local_state() {
        let model = ab_model(config(MARCHING), 0.5);
        let mut y = model.initial_state().unwrap();
        let k = model.layout().index(Field::Temperature, 4).unwrap();
        y[k] = f64::NAN;
        let mut out = DVector::zeros(y.len());
        match model.evaluate(1.0, &y, &mut out) {
            Err(ReactorError::InvalidLocalState { location, .. }) => assert!(location.contains("node 4")),
            other => panic!("expected an invalid local state, got {:?}", other),
        }
    }
}

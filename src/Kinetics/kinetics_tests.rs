#[cfg(test)]
mod tests {
    use crate::Kinetics::rate_expressions::{KineticModel, KineticsError, LocalConditions};
    use crate::Kinetics::reaction_set::ReactionSet;
    use crate::Kinetics::stoichiometry::{StoichiometryTable, parse_reaction};
    use crate::ReactorModels::reactor_error::ReactorError;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_reaction_coefficients() {
        let r = parse_reaction("2A + B <=> C").unwrap();
        assert_eq!(r.reactants, vec![("A".to_string(), -2.0), ("B".to_string(), -1.0)]);
        assert_eq!(r.products, vec![("C".to_string(), 1.0)]);
        assert_eq!(r.coefficient("A"), -2.0);
        assert_eq!(r.coefficient("B"), -1.0);
        assert_eq!(r.coefficient("C"), 1.0);
        assert_eq!(r.coefficient("D"), 0.0);
    }

    #[test]
    fn test_parse_reaction_forms() {
        let dme = parse_reaction("CO2 + 3H2 <=> CH3OH + H2O").unwrap();
        assert_eq!(dme.coefficient("H2"), -3.0);
        assert_eq!(dme.coefficient("CH3OH"), 1.0);
        assert_eq!(dme.species(), names(&["CO2", "H2", "CH3OH", "H2O"]));

        let arrow = parse_reaction("A -> B").unwrap();
        assert_eq!(arrow.coefficient("A"), -1.0);
        let fat_arrow = parse_reaction("0.5O2+CO=>CO2").unwrap();
        assert_eq!(fat_arrow.coefficient("O2"), -0.5);
        let plain = parse_reaction("2CH3OH = DME + H2O").unwrap();
        assert_eq!(plain.coefficient("CH3OH"), -2.0);
        assert_eq!(plain.coefficient("DME"), 1.0);
    }

    #[test]
    fn test_parse_reaction_errors() {
        for bad in ["A + B", "A = B = C", "A + = B", "= B", "2 = B", "A + 3 = B"] {
            match parse_reaction(bad) {
                Err(ReactorError::ReactionParse(_)) => {}
                other => panic!("'{}' should not parse: {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_formation_rate_of_single_reaction() {
        let r = parse_reaction("2A + B <=> C").unwrap();
        let species = names(&["A", "B", "C", "D"]);
        let table = StoichiometryTable::new(&[r], &species).unwrap();
        let rate = 0.7;
        let ri = table.formation_rates(&[rate]).unwrap();
        assert_relative_eq!(ri[0], -2.0 * rate);
        assert_relative_eq!(ri[1], -rate);
        assert_relative_eq!(ri[2], rate);
        // species absent from every reaction
        assert_eq!(ri[3], 0.0);
    }

    #[test]
    fn test_formation_rates_sum_over_reactions() {
        let reactions = vec![
            parse_reaction("CO2 + 3H2 <=> CH3OH + H2O").unwrap(),
            parse_reaction("CO + H2O <=> H2 + CO2").unwrap(),
            parse_reaction("2CH3OH <=> DME + H2O").unwrap(),
        ];
        let species = names(&["H2", "CO2", "H2O", "CO", "CH3OH", "DME"]);
        let table = StoichiometryTable::new(&reactions, &species).unwrap();
        let rates = [1.0, 2.0, 0.5];
        let ri = table.formation_rates(&rates).unwrap();
        assert_relative_eq!(ri[0], -3.0 + 2.0);
        assert_relative_eq!(ri[1], -1.0 + 2.0);
        assert_relative_eq!(ri[2], 1.0 - 2.0 + 0.5);
        assert_relative_eq!(ri[3], -2.0);
        assert_relative_eq!(ri[4], 1.0 - 1.0);
        assert_relative_eq!(ri[5], 0.5);
        assert!(table.formation_rates(&[1.0]).is_err());
    }

    #[test]
    fn test_unknown_species_in_table() {
        let r = parse_reaction("A => X").unwrap();
        let res = StoichiometryTable::new(&[r], &names(&["A", "B"]));
        assert!(matches!(res, Err(ReactorError::UnknownSpecies(_))));
    }

    #[test]
    fn test_variables_evaluated_in_order() {
        let model = KineticModel::new()
            .with_parameter("k0", 3.0)
            .variable("a", |ctx| Ok(ctx.param("k0")? * ctx.T()))
            .variable("b", |ctx| Ok(ctx.var("a")? + ctx.partial_pressure("A")?))
            .rate("r1", |ctx| Ok(ctx.var("b")? * ctx.C("A")?));
        let index = HashMap::from([("A".to_string(), 0), ("B".to_string(), 1)]);
        let conditions = LocalConditions {
            T: 2.0,
            P: 10.0,
            y: &[0.5, 0.5],
            C: &[4.0, 4.0],
        };
        let rates = model.evaluate(&index, &conditions).unwrap();
        assert_relative_eq!(rates[0], (3.0 * 2.0 + 0.5 * 10.0) * 4.0);
    }

    #[test]
    fn test_forward_reference_is_an_error() {
        let model = KineticModel::new()
            .variable("a", |ctx| ctx.var("b"))
            .variable("b", |_| Ok(1.0))
            .rate("r1", |ctx| ctx.var("a"));
        let index = HashMap::from([("A".to_string(), 0)]);
        let conditions = LocalConditions {
            T: 300.0,
            P: 1e5,
            y: &[1.0],
            C: &[1.0],
        };
        match model.validate(1, &index, &conditions) {
            Err(KineticsError::UndefinedVariable { expression, name }) => {
                assert_eq!(expression, "a");
                assert_eq!(name, "b");
            }
            other => panic!("expected undefined variable, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_errors() {
        let index = HashMap::from([("A".to_string(), 0)]);
        let conditions = LocalConditions {
            T: 300.0,
            P: 1e5,
            y: &[1.0],
            C: &[1.0],
        };
        let unknown = KineticModel::new().rate("r1", |ctx| ctx.C("Z"));
        assert!(matches!(
            unknown.validate(1, &index, &conditions),
            Err(KineticsError::UnknownSpecies { .. })
        ));
        let missing_param = KineticModel::new().rate("r1", |ctx| ctx.param("k"));
        assert!(matches!(
            missing_param.validate(1, &index, &conditions),
            Err(KineticsError::UndefinedParameter { .. })
        ));
        let count = KineticModel::new().rate("r1", |_| Ok(1.0));
        assert!(matches!(
            count.validate(2, &index, &conditions),
            Err(KineticsError::RateCountMismatch { rates: 1, reactions: 2 })
        ));
        let duplicate = KineticModel::new()
            .variable("x", |_| Ok(1.0))
            .rate("x", |_| Ok(1.0));
        assert!(matches!(
            duplicate.validate(1, &index, &conditions),
            Err(KineticsError::DuplicateName(_))
        ));
        let nan = KineticModel::new().rate("r1", |ctx| Ok((ctx.C("A")? - 2.0).ln()));
        assert!(matches!(
            nan.validate(1, &index, &conditions),
            Err(KineticsError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_reaction_set() {
        let species = names(&["A", "B"]);
        let kinetics = KineticModel::new()
            .with_parameter("k", 0.1)
            .rate("r1", |ctx| Ok(ctx.param("k")? * ctx.C("A")?));
        let set = ReactionSet::new(&["A => B"], &species, kinetics).unwrap();
        assert_eq!(set.n_reactions(), 1);
        assert_eq!(set.n_species(), 2);
        assert_eq!(set.equations(), vec!["A => B".to_string()]);
        let conditions = LocalConditions {
            T: 300.0,
            P: 1e5,
            y: &[0.5, 0.5],
            C: &[10.0, 10.0],
        };
        set.validate(&conditions).unwrap();
        let (rates, formation) = set.evaluate(&conditions).unwrap();
        assert_relative_eq!(rates[0], 1.0);
        assert_relative_eq!(formation[0], -1.0);
        assert_relative_eq!(formation[1], 1.0);
    }

    #[test]
    fn test_reaction_set_configuration_errors() {
        let species = names(&["A", "B"]);
        let two_rates = KineticModel::new().rate("r1", |_| Ok(1.0)).rate("r2", |_| Ok(1.0));
        assert!(matches!(
            ReactionSet::new(&["A => B"], &species, two_rates),
            Err(ReactorError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            ReactionSet::new(&["A => C"], &species, KineticModel::new().rate("r1", |_| Ok(1.0))),
            Err(ReactorError::UnknownSpecies(_))
        ));
        let dup = names(&["A", "A"]);
        assert!(ReactionSet::new::<&str>(&[], &dup, KineticModel::new()).is_err());
        let empty: Vec<String> = Vec::new();
        assert!(ReactionSet::new::<&str>(&[], &empty, KineticModel::new()).is_err());
        // no reactions at all is a valid (inert) set
        let inert = ReactionSet::new::<&str>(&[], &species, KineticModel::new()).unwrap();
        assert_eq!(inert.n_reactions(), 0);
    }
}

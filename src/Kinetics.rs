/// parsing of reaction equations into signed stoichiometric coefficients, the
/// stoichiometric table (reactions x species) and the mapping of reaction rates to species
/// formation rates
pub mod stoichiometry;
/// user kinetics as named closures: parameters, ordered intermediate variables, rate formulas
///
/// # Examples
/// ```
/// use PackedBedSim::Kinetics::rate_expressions::KineticModel;
/// let model = KineticModel::new()
///     .with_parameter("k", 0.5)
///     .rate("r1", |ctx| Ok(ctx.param("k")? * ctx.C("A")?));
/// assert_eq!(model.rate_names(), vec!["r1".to_string()]);
/// ```
pub mod rate_expressions;
/// reactions + stoichiometry + kinetics of one run
pub mod reaction_set;
mod kinetics_tests;

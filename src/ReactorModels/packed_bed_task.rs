//! # Packed Bed Task
//!
//! Setup chain of one simulation run, from configuration to an assembled model:
//!
//! 1. configuration check, including component data for every species
//! 2. reaction parsing and stoichiometric table
//! 3. run parameters: feed, molar masses, heats of reaction, wall heat exchange
//! 4. kinetics evaluated once at the feed
//! 5. model assembly for the chosen variant
//!
//! Every failure in this chain happens before the first RHS evaluation.
//!
//! # Examples
//! ```no_run
//! use PackedBedSim::Kinetics::rate_expressions::KineticModel;
//! use PackedBedSim::ReactorModels::packed_bed_task::PackedBedTask;
//! use PackedBedSim::ReactorModels::reactor_config::SimulationConfig;
//! let config = SimulationConfig::from_json_file("run.json").unwrap();
//! let kinetics = KineticModel::new()
//!     .with_parameter("k", 0.1)
//!     .rate("r1", |ctx| Ok(ctx.param("k")? * ctx.C("CO")?));
//! let mut task = PackedBedTask::new(config, kinetics);
//! let result = task.solve().unwrap();
//! result.print_table(5);
//! ```
use super::local_state::RunParameters;
use super::model_assembler::{ReactorModel, RhsAssembler};
use super::reactor_config::SimulationConfig;
use super::reactor_error::{FailureStage, ReactorError};
use super::results::SimulationResult;
use super::solver_driver;
use crate::Kinetics::rate_expressions::KineticModel;
use crate::Kinetics::reaction_set::ReactionSet;
use crate::Thermodynamics::component_data::ComponentDataStore;
use log::{error, info};
use prettytable::{Table, row};

#[derive(Debug, Clone)]
pub struct PackedBedTask {
    pub problem_name: Option<String>,
    pub config: SimulationConfig,
    pub kinetics: KineticModel,
    pub store: ComponentDataStore,
    /// set by `setup`
    pub model: Option<ReactorModel>,
}

impl PackedBedTask {
    /// task with the built-in component data
    pub fn new(config: SimulationConfig, kinetics: KineticModel) -> Self {
        Self {
            problem_name: None,
            config,
            kinetics,
            store: ComponentDataStore::with_builtin(),
            model: None,
        }
    }

    pub fn with_component_store(mut self, store: ComponentDataStore) -> Self {
        self.store = store;
        self
    }

    pub fn set_problem_name(&mut self, name: &str) {
        self.problem_name = Some(name.to_string());
    }

    /// configuration checks that need no kinetics
    pub fn check_task(&self) -> Result<(), ReactorError> {
        self.config.validate()?;
        if let Some(missing) = self.config.feed.species.iter().find(|s| !self.store.contains(s)) {
            return Err(ReactorError::UnknownSpecies(format!(
                "species {} has no entry in the component data store",
                missing
            )));
        }
        Ok(())
    }

    pub fn setup(&mut self) -> Result<&ReactorModel, ReactorError> {
        self.check_task()?;
        info!("task checked!");
        let reaction_set = ReactionSet::new(&self.config.reactions, &self.config.feed.species, self.kinetics.clone())?;
        info!("reactions parsed: {:?}", reaction_set.equations());
        let params = RunParameters::new(&self.config, reaction_set, &self.store)?;
        info!("run parameters resolved");
        params.precheck_kinetics()?;
        info!("kinetics checked at feed conditions");
        let model = ReactorModel::new(params, &self.config.solver)?;
        info!("model {} assembled, {} unknowns", model.variant().id(), model.layout().len());
        Ok(self.model.insert(model))
    }

    /// Sets the task up and runs it. Errors of the setup chain come back as
    /// `ReactorError::RunFailed` with stage `PreCheck`.
    pub fn solve(&mut self) -> Result<SimulationResult, ReactorError> {
        let variant = self.config.model;
        if let Err(e) = self.setup() {
            error!("model {}: pre-check failed: {}", variant.id(), e);
            return Err(ReactorError::RunFailed {
                variant: variant.id().to_string(),
                stage: FailureStage::PreCheck,
                message: e.to_string(),
            });
        }
        self.pretty_print_task();
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| ReactorError::InvalidConfiguration("model was not assembled".to_string()))?;
        solver_driver::run(model, &self.config.solver)
    }

    pub fn pretty_print_task(&self) {
        let cfg = &self.config;
        println!("\n=== PACKED BED TASK ===");
        println!("Problem Name: {:?}", self.problem_name);
        println!("Model: {} ({:?})", cfg.model.id(), cfg.model);
        if cfg.model.is_dimensionless() {
            println!("Solved in feed-scaled variables, reported in SI units");
        }

        let mut table = Table::new();
        table.add_row(row!["Parameter", "Value", "Units"]);
        table.add_row(row!["Length", format!("{:.4}", cfg.reactor.length), "m"]);
        table.add_row(row!["Diameter", format!("{:.4}", cfg.reactor.diameter), "m"]);
        table.add_row(row!["Void fraction", format!("{:.3}", cfg.reactor.void_fraction), "-"]);
        table.add_row(row!["Particle diameter", format!("{:.3e}", cfg.reactor.particle_diameter), "m"]);
        table.add_row(row!["Feed temperature", format!("{:.2}", cfg.feed.T), "K"]);
        table.add_row(row!["Feed pressure", format!("{:.4e}", cfg.feed.P), "Pa"]);
        table.add_row(row![
            "Superficial velocity",
            format!("{:.4e}", cfg.feed.superficial_velocity(&cfg.reactor)),
            "m/s"
        ]);
        table.add_row(row!["U", format!("{:.2}", cfg.heat_exchange.U), "W/m2/K"]);
        table.add_row(row!["Medium temperature", format!("{:.2}", cfg.heat_exchange.T_medium), "K"]);
        println!("\nOperating Conditions:");
        table.printstd();

        let mut feed = Table::new();
        feed.add_row(row!["Species", "y", "C, mol/m3"]);
        for ((s, y), c) in cfg
            .feed
            .species
            .iter()
            .zip(cfg.feed.mole_fractions())
            .zip(cfg.feed.concentrations())
        {
            feed.add_row(row![s, format!("{:.4}", y), format!("{:.4e}", c)]);
        }
        println!("\nFeed:");
        feed.printstd();

        println!("\nReactions ({}):", cfg.reactions.len());
        for (i, equation) in cfg.reactions.iter().enumerate() {
            println!("  {}: {}", i + 1, equation);
        }
    }
}

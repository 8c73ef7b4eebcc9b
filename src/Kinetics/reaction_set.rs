//! ReactionSet: the parsed reactions of a run together with their kinetics.
use super::rate_expressions::{KineticModel, LocalConditions};
use super::stoichiometry::{ReactionStoichiometry, StoichiometryTable, parse_reaction};
use crate::ReactorModels::reactor_error::ReactorError;
use log::info;
use std::collections::HashMap;

/// ordered reactions, stoichiometric table over the component list, and rate expressions
#[derive(Debug, Clone)]
pub struct ReactionSet {
    pub reactions: Vec<ReactionStoichiometry>,
    pub species: Vec<String>,
    pub table: StoichiometryTable,
    pub kinetics: KineticModel,
    species_index: HashMap<String, usize>,
}

impl ReactionSet {
    /// Parses `equations` against the component list `species`. The kinetic model must
    /// carry one rate expression per equation.
    pub fn new<S: AsRef<str>>(
        equations: &[S],
        species: &[String],
        kinetics: KineticModel,
    ) -> Result<Self, ReactorError> {
        if species.is_empty() {
            return Err(ReactorError::InvalidConfiguration(
                "component list is empty".to_string(),
            ));
        }
        let mut species_index = HashMap::new();
        for (i, s) in species.iter().enumerate() {
            if species_index.insert(s.clone(), i).is_some() {
                return Err(ReactorError::InvalidConfiguration(format!(
                    "species {} appears twice in the component list",
                    s
                )));
            }
        }
        let reactions = equations
            .iter()
            .map(|eq| parse_reaction(eq.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let table = StoichiometryTable::new(&reactions, species)?;
        if kinetics.rates.len() != reactions.len() {
            return Err(ReactorError::InvalidConfiguration(format!(
                "{} rate expressions given for {} reactions",
                kinetics.rates.len(),
                reactions.len()
            )));
        }
        info!(
            "reaction set: {} reactions over {} species",
            reactions.len(),
            species.len()
        );
        Ok(Self {
            reactions,
            species: species.to_vec(),
            table,
            kinetics,
            species_index,
        })
    }

    pub fn n_reactions(&self) -> usize {
        self.reactions.len()
    }

    pub fn n_species(&self) -> usize {
        self.species.len()
    }

    pub fn species_index(&self) -> &HashMap<String, usize> {
        &self.species_index
    }

    pub fn equations(&self) -> Vec<String> {
        self.reactions.iter().map(|r| r.equation.clone()).collect()
    }

    /// pre-integration check of the kinetics at the given (feed) conditions
    pub fn validate(&self, conditions: &LocalConditions) -> Result<(), ReactorError> {
        self.kinetics
            .validate(self.n_reactions(), &self.species_index, conditions)?;
        Ok(())
    }

    /// per-reaction rates
    pub fn reaction_rates_into(
        &self,
        conditions: &LocalConditions,
        out: &mut [f64],
    ) -> Result<(), ReactorError> {
        self.kinetics
            .evaluate_into(&self.species_index, conditions, out)?;
        Ok(())
    }

    /// per-species net formation rates from per-reaction rates
    pub fn formation_rates_into(&self, reaction_rates: &[f64], out: &mut [f64]) -> Result<(), ReactorError> {
        self.table.formation_rates_into(reaction_rates, out)
    }

    /// (per-reaction rates, per-species formation rates) at `conditions`
    pub fn evaluate(&self, conditions: &LocalConditions) -> Result<(Vec<f64>, Vec<f64>), ReactorError> {
        let mut rates = vec![0.0; self.n_reactions()];
        self.reaction_rates_into(conditions, &mut rates)?;
        let formation = self.table.formation_rates(&rates)?;
        Ok((rates, formation))
    }
}

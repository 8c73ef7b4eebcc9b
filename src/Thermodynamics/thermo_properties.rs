//! # Thermodynamic Properties
//!
//! Pure functions for the gas mixture:
//!
//! | Quantity | Formula | Units |
//! |----------|---------|-------|
//! | mixture heat capacity | `Cp_mix = Σ y_i Cp_i` | J/mol/K |
//! | enthalpy change Tref → T | `ΔH_i = ½(Cp_i(Tref) + Cp_i(T))·(T - Tref)` | J/mol |
//! | standard heat of reaction | `ΔH25_j = Σ_i ν_ij ΔHf_i` | J/mol |
//! | heat of reaction at T | `ΔH_j(T) = ΔH25_j + Σ_i ν_ij ΔH_i(T)` | J/mol |
//! | density | `ρ = M_mix·C_t` | kg/m^3 |
//! | ideal gas concentration | `C_t = P/(R T)` | mol/m^3 |
use super::component_data::{ComponentData, ComponentDataStore, HeatCapacityModel};
use crate::Kinetics::stoichiometry::{ReactionStoichiometry, StoichiometryTable};
use crate::ReactorModels::reactor_error::ReactorError;

/// Universal gas constant in J/(mol·K)
pub const R_G: f64 = 8.314;
/// reference temperature of the heats of formation, K
pub const T_REF: f64 = 298.15;

/// Cp_i(T) of every component, J/mol/K
#[allow(non_snake_case)]
pub fn heat_capacities(components: &[ComponentData], T: f64) -> Vec<f64> {
    components.iter().map(|c| c.Cp.Cp(T)).collect()
}

/// mole-fraction weighted heat capacity; both slices must have the same length
pub fn mixture_heat_capacity(mole_fractions: &[f64], heat_capacities: &[f64]) -> Result<f64, ReactorError> {
    if mole_fractions.len() != heat_capacities.len() {
        return Err(ReactorError::InvalidConfiguration(format!(
            "mixture heat capacity: {} mole fractions but {} heat capacities",
            mole_fractions.len(),
            heat_capacities.len()
        )));
    }
    Ok(mole_fractions
        .iter()
        .zip(heat_capacities.iter())
        .map(|(y, cp)| y * cp)
        .sum())
}

/// enthalpy change of one component between `T_ref` and `T` with the trapezoidal mean Cp
#[allow(non_snake_case)]
pub fn enthalpy_change(cp: &HeatCapacityModel, T: f64, T_ref: f64) -> f64 {
    0.5 * (cp.Cp(T_ref) + cp.Cp(T)) * (T - T_ref)
}

/// ΔH25 of a reaction from heats of formation (products minus reactants), J/mol
pub fn standard_heat_of_reaction(
    reaction: &ReactionStoichiometry,
    store: &ComponentDataStore,
) -> Result<f64, ReactorError> {
    let mut dh = 0.0;
    for (s, nu) in reaction.reactants.iter().chain(reaction.products.iter()) {
        dh += nu * store.get(s)?.dHf25;
    }
    Ok(dh)
}

/// Heats of reaction at local temperature, prepared once per run.
#[derive(Debug, Clone)]
pub struct ReactionEnthalpy {
    /// ΔH25 per reaction, J/mol
    pub standard_heats: Vec<f64>,
    table: StoichiometryTable,
    components: Vec<ComponentData>,
}

impl ReactionEnthalpy {
    pub fn new(
        reactions: &[ReactionStoichiometry],
        table: &StoichiometryTable,
        store: &ComponentDataStore,
    ) -> Result<Self, ReactorError> {
        let standard_heats = reactions
            .iter()
            .map(|r| standard_heat_of_reaction(r, store))
            .collect::<Result<Vec<_>, _>>()?;
        let components = store.select(&table.species)?;
        Ok(Self {
            standard_heats,
            table: table.clone(),
            components,
        })
    }

    /// ΔH_j(T) = ΔH25_j + Σ_i ν_ij ΔH_i(T), J/mol
    #[allow(non_snake_case)]
    pub fn heats_of_reaction_into(&self, T: f64, out: &mut [f64]) -> Result<(), ReactorError> {
        if out.len() != self.standard_heats.len() {
            return Err(ReactorError::IndexOutOfBounds(format!(
                "heats of reaction: {} slots for {} reactions",
                out.len(),
                self.standard_heats.len()
            )));
        }
        let dh_species: Vec<f64> = self
            .components
            .iter()
            .map(|c| enthalpy_change(&c.Cp, T, T_REF))
            .collect();
        for (j, slot) in out.iter_mut().enumerate() {
            let change: f64 = dh_species
                .iter()
                .enumerate()
                .map(|(k, dh)| self.table.matrix[(j, k)] * dh)
                .sum();
            *slot = self.standard_heats[j] + change;
        }
        Ok(())
    }

    #[allow(non_snake_case)]
    pub fn heats_of_reaction(&self, T: f64) -> Result<Vec<f64>, ReactorError> {
        let mut out = vec![0.0; self.standard_heats.len()];
        self.heats_of_reaction_into(T, &mut out)?;
        Ok(out)
    }
}

/// overall heat of reaction Σ_j R_j ΔH_j, W/m^3 (negative for exothermic chemistry)
pub fn overall_heat_of_reaction(reaction_rates: &[f64], heats: &[f64]) -> f64 {
    reaction_rates.iter().zip(heats.iter()).map(|(r, h)| r * h).sum()
}

/// ρ = M_mix·C_t, `mixture_molar_mass` in kg/mol
pub fn density_ideal_gas(mixture_molar_mass: f64, total_concentration: f64) -> f64 {
    mixture_molar_mass * total_concentration
}

/// C_t = P/(R T)
#[allow(non_snake_case)]
pub fn total_concentration_ideal_gas(P: f64, T: f64) -> f64 {
    P / (R_G * T)
}

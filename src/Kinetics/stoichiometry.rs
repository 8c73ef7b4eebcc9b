//! # Stoichiometry
//!
//! Parsing of reaction equations and conversion of per-reaction rates into per-species
//! formation rates.
//!
//! Accepted equation forms: `aA + bB <=> cC + dD`, `A => B`, `A -> B`, `A = B`. Species without a
//! numeric prefix get coefficient 1, reactant coefficients are stored negative. Spaces are ignored.
//!
//! # Examples
//! ```
//! use PackedBedSim::Kinetics::stoichiometry::parse_reaction;
//! let reaction = parse_reaction("2A + B <=> C").unwrap();
//! assert_eq!(reaction.coefficient("A"), -2.0);
//! assert_eq!(reaction.coefficient("C"), 1.0);
//! ```
use crate::ReactorModels::reactor_error::ReactorError;
use nalgebra::DMatrix;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn term_regex() -> &'static Regex {
    static TERM: OnceLock<Regex> = OnceLock::new();
    // coefficient prefix, then a symbol that starts with a letter
    TERM.get_or_init(|| {
        Regex::new(r"^([0-9]*\.?[0-9]*)([A-Za-z][A-Za-z0-9_()\[\]]*)$").expect("valid regex")
    })
}

/// parsed reaction: symbol and signed coefficient for each side
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionStoichiometry {
    pub equation: String,
    /// reactants with negative coefficients
    pub reactants: Vec<(String, f64)>,
    /// products with positive coefficients
    pub products: Vec<(String, f64)>,
}

impl ReactionStoichiometry {
    /// net signed coefficient of `species` (0.0 if it does not take part)
    pub fn coefficient(&self, species: &str) -> f64 {
        self.reactants
            .iter()
            .chain(self.products.iter())
            .filter(|(s, _)| s == species)
            .map(|(_, c)| *c)
            .sum()
    }

    /// all species in order of appearance, without duplicates
    pub fn species(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for (s, _) in self.reactants.iter().chain(self.products.iter()) {
            if !out.contains(s) {
                out.push(s.clone());
            }
        }
        out
    }
}

fn parse_side(side: &str, sign: f64, equation: &str) -> Result<Vec<(String, f64)>, ReactorError> {
    let mut terms = Vec::new();
    for raw in side.split('+') {
        if raw.is_empty() {
            return Err(ReactorError::ReactionParse(format!(
                "empty term in '{}'",
                equation
            )));
        }
        let caps = term_regex().captures(raw).ok_or_else(|| {
            ReactorError::ReactionParse(format!("bad term '{}' in '{}'", raw, equation))
        })?;
        let coeff_str = caps.get(1).map_or("", |m| m.as_str());
        let symbol = caps.get(2).map_or("", |m| m.as_str()).to_string();
        let coeff = if coeff_str.is_empty() {
            1.0
        } else {
            coeff_str.parse::<f64>().map_err(|_| {
                ReactorError::ReactionParse(format!(
                    "bad coefficient '{}' in '{}'",
                    coeff_str, equation
                ))
            })?
        };
        if !(coeff > 0.0) {
            return Err(ReactorError::ReactionParse(format!(
                "coefficient of {} must be positive in '{}'",
                symbol, equation
            )));
        }
        terms.push((symbol, sign * coeff));
    }
    Ok(terms)
}

/// parses one reaction equation
pub fn parse_reaction(equation: &str) -> Result<ReactionStoichiometry, ReactorError> {
    let compact: String = equation.chars().filter(|c| !c.is_whitespace()).collect();
    let normalized = compact
        .replace("<=>", "=")
        .replace("<->", "=")
        .replace("=>", "=")
        .replace("->", "=")
        .replace(['<', '>'], "");
    let sides: Vec<&str> = normalized.split('=').collect();
    if sides.len() != 2 || sides[0].is_empty() || sides[1].is_empty() {
        return Err(ReactorError::ReactionParse(format!(
            "'{}' must have exactly one reactant side and one product side",
            equation
        )));
    }
    Ok(ReactionStoichiometry {
        equation: equation.trim().to_string(),
        reactants: parse_side(sides[0], -1.0, equation)?,
        products: parse_side(sides[1], 1.0, equation)?,
    })
}

/// stoichiometric coefficient table: reactions x species
#[derive(Debug, Clone, PartialEq)]
pub struct StoichiometryTable {
    pub species: Vec<String>,
    pub matrix: DMatrix<f64>,
}

impl StoichiometryTable {
    /// Builds the table for `species` (the component list of the run). A reaction species
    /// missing from the list is a configuration error.
    pub fn new(
        reactions: &[ReactionStoichiometry],
        species: &[String],
    ) -> Result<Self, ReactorError> {
        let index: HashMap<&str, usize> = species
            .iter()
            .enumerate()
            .map(|(i, s)| (s.as_str(), i))
            .collect();
        let mut matrix = DMatrix::zeros(reactions.len(), species.len());
        for (j, reaction) in reactions.iter().enumerate() {
            for (s, c) in reaction.reactants.iter().chain(reaction.products.iter()) {
                let k = *index.get(s.as_str()).ok_or_else(|| {
                    ReactorError::UnknownSpecies(format!(
                        "{} (reaction '{}') is not in the component list {:?}",
                        s, reaction.equation, species
                    ))
                })?;
                matrix[(j, k)] += c;
            }
        }
        Ok(Self {
            species: species.to_vec(),
            matrix,
        })
    }

    pub fn n_reactions(&self) -> usize {
        self.matrix.nrows()
    }

    /// ri_k = sum_j nu_jk * r_j
    pub fn formation_rates_into(&self, reaction_rates: &[f64], out: &mut [f64]) -> Result<(), ReactorError> {
        if reaction_rates.len() != self.matrix.nrows() || out.len() != self.matrix.ncols() {
            return Err(ReactorError::IndexOutOfBounds(format!(
                "formation rates: got {} reaction rates and {} outputs for a {}x{} table",
                reaction_rates.len(),
                out.len(),
                self.matrix.nrows(),
                self.matrix.ncols()
            )));
        }
        for (k, slot) in out.iter_mut().enumerate() {
            *slot = reaction_rates
                .iter()
                .enumerate()
                .map(|(j, r)| self.matrix[(j, k)] * r)
                .sum();
        }
        Ok(())
    }

    pub fn formation_rates(&self, reaction_rates: &[f64]) -> Result<Vec<f64>, ReactorError> {
        let mut out = vec![0.0; self.matrix.ncols()];
        self.formation_rates_into(reaction_rates, &mut out)?;
        Ok(out)
    }
}

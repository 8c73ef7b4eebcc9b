//! # Rate Expressions
//!
//! User-configurable kinetics as ordered lists of named closures.
//!
//! A `KineticModel` holds
//! - constant parameters (e.g. bulk catalyst density),
//! - intermediate variables, evaluated in declaration order; each may read the local state,
//!   the parameters and every variable declared before it,
//! - one rate expression per reaction, evaluated after all variables.
//!
//! Every lookup returns a `Result`, so a formula that reads an undefined variable or an
//! unknown species fails with a `KineticsError` instead of silently reading zero. Running
//! `KineticModel::validate` once at the feed state surfaces these errors before integration.
//!
//! # Examples
//! ```
//! use PackedBedSim::Kinetics::rate_expressions::{KineticModel, LocalConditions};
//! use std::collections::HashMap;
//! let model = KineticModel::new()
//!     .with_parameter("k0", 2.0)
//!     .variable("k", |ctx| Ok(ctx.param("k0")? * (-1000.0 / ctx.T()).exp()))
//!     .rate("r1", |ctx| Ok(ctx.var("k")? * ctx.C("A")?));
//! let index = HashMap::from([("A".to_string(), 0)]);
//! let conditions = LocalConditions { T: 500.0, P: 1e5, y: &[1.0], C: &[10.0] };
//! let rates = model.evaluate(&index, &conditions).unwrap();
//! assert!(rates[0] > 0.0);
//! ```
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum KineticsError {
    #[error("'{expression}' references undefined variable '{name}'")]
    UndefinedVariable { expression: String, name: String },
    #[error("'{expression}' references undefined parameter '{name}'")]
    UndefinedParameter { expression: String, name: String },
    #[error("'{expression}' references unknown species '{species}'")]
    UnknownSpecies { expression: String, species: String },
    #[error("{rates} rate expressions given for {reactions} reactions")]
    RateCountMismatch { rates: usize, reactions: usize },
    #[error("name '{0}' is declared twice")]
    DuplicateName(String),
    #[error("'{name}' evaluated to a non-finite value {value}")]
    NonFinite { name: String, value: f64 },
}

/// local state seen by the kinetics: temperature [K], pressure [Pa], mole fractions and
/// concentrations [mol/m^3] in component-list order
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy)]
pub struct LocalConditions<'a> {
    pub T: f64,
    pub P: f64,
    pub y: &'a [f64],
    pub C: &'a [f64],
}

/// bindings available to a formula while it is evaluated
pub struct RateContext<'a> {
    conditions: &'a LocalConditions<'a>,
    species_index: &'a HashMap<String, usize>,
    parameters: &'a HashMap<String, f64>,
    names: &'a [String],
    values: &'a [f64],
    current: &'a str,
}

#[allow(non_snake_case)]
impl<'a> RateContext<'a> {
    /// temperature [K]
    pub fn T(&self) -> f64 {
        self.conditions.T
    }
    /// pressure [Pa]
    pub fn P(&self) -> f64 {
        self.conditions.P
    }

    fn species(&self, species: &str) -> Result<usize, KineticsError> {
        self.species_index
            .get(species)
            .copied()
            .ok_or_else(|| KineticsError::UnknownSpecies {
                expression: self.current.to_string(),
                species: species.to_string(),
            })
    }

    /// mole fraction
    pub fn y(&self, species: &str) -> Result<f64, KineticsError> {
        let i = self.species(species)?;
        Ok(self.conditions.y[i])
    }
    /// concentration [mol/m^3]
    pub fn C(&self, species: &str) -> Result<f64, KineticsError> {
        let i = self.species(species)?;
        Ok(self.conditions.C[i])
    }
    /// partial pressure y_i*P [Pa]
    pub fn partial_pressure(&self, species: &str) -> Result<f64, KineticsError> {
        Ok(self.y(species)? * self.conditions.P)
    }
    /// value of a variable declared earlier
    pub fn var(&self, name: &str) -> Result<f64, KineticsError> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
            .ok_or_else(|| KineticsError::UndefinedVariable {
                expression: self.current.to_string(),
                name: name.to_string(),
            })
    }
    pub fn param(&self, name: &str) -> Result<f64, KineticsError> {
        self.parameters
            .get(name)
            .copied()
            .ok_or_else(|| KineticsError::UndefinedParameter {
                expression: self.current.to_string(),
                name: name.to_string(),
            })
    }
}

pub type RateFn = Arc<dyn Fn(&RateContext) -> Result<f64, KineticsError> + Send + Sync>;

#[derive(Clone)]
pub struct NamedExpression {
    pub name: String,
    pub func: RateFn,
}

impl fmt::Debug for NamedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NamedExpression({})", self.name)
    }
}

/// parameters, ordered intermediate variables and per-reaction rate expressions
#[derive(Debug, Clone, Default)]
pub struct KineticModel {
    pub parameters: HashMap<String, f64>,
    pub variables: Vec<NamedExpression>,
    pub rates: Vec<NamedExpression>,
}

impl KineticModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(mut self, name: &str, value: f64) -> Self {
        self.parameters.insert(name.to_string(), value);
        self
    }

    /// appends an intermediate variable
    pub fn variable<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(&RateContext) -> Result<f64, KineticsError> + Send + Sync + 'static,
    {
        self.variables.push(NamedExpression {
            name: name.to_string(),
            func: Arc::new(func),
        });
        self
    }

    /// appends the rate expression of the next reaction
    pub fn rate<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(&RateContext) -> Result<f64, KineticsError> + Send + Sync + 'static,
    {
        self.rates.push(NamedExpression {
            name: name.to_string(),
            func: Arc::new(func),
        });
        self
    }

    pub fn rate_names(&self) -> Vec<String> {
        self.rates.iter().map(|r| r.name.clone()).collect()
    }

    /// Evaluates variables then rates and writes the per-reaction rates into `out`.
    pub fn evaluate_into(
        &self,
        species_index: &HashMap<String, usize>,
        conditions: &LocalConditions,
        out: &mut [f64],
    ) -> Result<(), KineticsError> {
        if out.len() != self.rates.len() {
            return Err(KineticsError::RateCountMismatch {
                rates: self.rates.len(),
                reactions: out.len(),
            });
        }
        let mut names: Vec<String> = Vec::with_capacity(self.variables.len());
        let mut values: Vec<f64> = Vec::with_capacity(self.variables.len());
        for variable in &self.variables {
            let value = {
                let ctx = RateContext {
                    conditions,
                    species_index,
                    parameters: &self.parameters,
                    names: &names,
                    values: &values,
                    current: &variable.name,
                };
                (variable.func)(&ctx)?
            };
            if !value.is_finite() {
                return Err(KineticsError::NonFinite {
                    name: variable.name.clone(),
                    value,
                });
            }
            names.push(variable.name.clone());
            values.push(value);
        }
        for (slot, rate) in out.iter_mut().zip(self.rates.iter()) {
            let ctx = RateContext {
                conditions,
                species_index,
                parameters: &self.parameters,
                names: &names,
                values: &values,
                current: &rate.name,
            };
            let value = (rate.func)(&ctx)?;
            if !value.is_finite() {
                return Err(KineticsError::NonFinite {
                    name: rate.name.clone(),
                    value,
                });
            }
            *slot = value;
        }
        Ok(())
    }

    pub fn evaluate(
        &self,
        species_index: &HashMap<String, usize>,
        conditions: &LocalConditions,
    ) -> Result<Vec<f64>, KineticsError> {
        let mut out = vec![0.0; self.rates.len()];
        self.evaluate_into(species_index, conditions, &mut out)?;
        Ok(out)
    }

    /// Checks names and rate count, then runs one evaluation at `conditions` so that every
    /// reference to an undefined variable, parameter or species is reported up front.
    pub fn validate(
        &self,
        n_reactions: usize,
        species_index: &HashMap<String, usize>,
        conditions: &LocalConditions,
    ) -> Result<(), KineticsError> {
        if self.rates.len() != n_reactions {
            return Err(KineticsError::RateCountMismatch {
                rates: self.rates.len(),
                reactions: n_reactions,
            });
        }
        let mut seen: Vec<&str> = Vec::new();
        for expr in self.variables.iter().chain(self.rates.iter()) {
            if seen.contains(&expr.name.as_str()) || self.parameters.contains_key(&expr.name) {
                return Err(KineticsError::DuplicateName(expr.name.clone()));
            }
            seen.push(&expr.name);
        }
        self.evaluate(species_index, conditions).map(|_| ())
    }
}

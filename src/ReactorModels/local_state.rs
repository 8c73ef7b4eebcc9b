//! # Local State
//!
//! `RunParameters` bundles everything a model reads during a run and never changes:
//! reactions and kinetics, component data, geometry, feed, wall heat exchange and options.
//!
//! `DerivedLocalState` is recomputed at every point of every RHS evaluation from
//! (C, T, P, v):
//!
//! 1. concentrations clamped to the floor, total concentration, mole fractions
//! 2. mixture molar mass and density
//! 3. reaction rates and species formation rates
//! 4. mixture heat capacity, overall heat of reaction, wall heat exchange
//! 5. Ergun pressure gradient
//!
//! A NaN or infinite value in any of these is reported as `ReactorError::InvalidLocalState`.
use super::reactor_config::{FeedState, ModelOptions, ModelVariant, ReactorSpec, SimulationConfig};
use super::reactor_error::ReactorError;
use crate::Kinetics::rate_expressions::{KineticsError, LocalConditions};
use crate::Kinetics::reaction_set::ReactionSet;
use crate::Thermodynamics::component_data::{ComponentData, ComponentDataStore};
use crate::Thermodynamics::thermo_properties::{
    ReactionEnthalpy, density_ideal_gas, heat_capacities, mixture_heat_capacity, overall_heat_of_reaction,
};
use crate::Thermodynamics::transport_correlations::{
    CorrelationSettings, ergun_pressure_gradient, heat_transfer_coefficient, mass_transfer_coefficient,
    mixture_diffusivities, prandtl, reynolds, schmidt,
};
use crate::Utils::reactor_utils::{heat_exchange, mixture_molar_mass};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// where a local state is evaluated: independent variable and grid node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub x: f64,
    pub node: Option<usize>,
}

impl Location {
    pub fn at(x: f64) -> Self {
        Self { x, node: None }
    }

    pub fn node(x: f64, node: usize) -> Self {
        Self { x, node: Some(node) }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node {
            Some(n) => write!(f, "x = {:e}, node {}", self.x, n),
            None => write!(f, "x = {:e}", self.x),
        }
    }
}

pub fn invalid_state(at: Location, message: String) -> ReactorError {
    ReactorError::InvalidLocalState {
        location: at.to_string(),
        message,
    }
}

pub fn ensure_finite(at: Location, name: &str, value: f64) -> Result<f64, ReactorError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid_state(at, format!("{} is {}", name, value)))
    }
}

pub fn ensure_finite_slice(at: Location, name: &str, values: &[f64]) -> Result<(), ReactorError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(invalid_state(at, format!("{}[{}] is {}", name, i, values[i]))),
        None => Ok(()),
    }
}

/// feed values at z = 0
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConditions {
    /// mol/m^3
    pub C: Vec<f64>,
    pub Ct: f64,
    pub y: Vec<f64>,
    pub T: f64,
    pub P: f64,
    /// superficial velocity, m/s
    pub v: f64,
    /// total molar flux, mol/m^2/s
    pub flux: f64,
}

/// wall heat exchange resolved for the tube
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallHeatExchange {
    pub U: f64,
    pub T_medium: f64,
    pub a: f64,
}

/// immutable data of one run
#[derive(Debug, Clone)]
pub struct RunParameters {
    pub variant: ModelVariant,
    pub reaction_set: ReactionSet,
    pub enthalpy: ReactionEnthalpy,
    pub components: Vec<ComponentData>,
    /// kg/mol
    pub molar_masses: Vec<f64>,
    pub reactor: ReactorSpec,
    pub options: ModelOptions,
    /// feed as configured
    pub feed_config: FeedState,
    /// feed resolved to concentrations, velocity and flux
    pub feed: FeedConditions,
    pub wall: WallHeatExchange,
    /// Pa·s
    pub viscosity: f64,
    /// per species at the feed, m^2/s; given by the feed or estimated from the critical constants
    pub diffusivity: Vec<f64>,
    pub thermal_conductivity: Option<f64>,
    /// empty tube cross section, m^2
    pub area: f64,
    pub correlations: CorrelationSettings,
}

impl RunParameters {
    /// Resolves the configuration against the component data store. Every species of the
    /// feed must have an entry in the store.
    pub fn new(
        config: &SimulationConfig,
        reaction_set: ReactionSet,
        store: &ComponentDataStore,
    ) -> Result<Self, ReactorError> {
        if reaction_set.species != config.feed.species {
            return Err(ReactorError::InvalidConfiguration(format!(
                "reaction set species {:?} differ from the feed species {:?}",
                reaction_set.species, config.feed.species
            )));
        }
        let components = store.select(&config.feed.species)?;
        let molar_masses = components.iter().map(|c| c.molar_mass / 1000.0).collect();
        let enthalpy = ReactionEnthalpy::new(&reaction_set.reactions, &reaction_set.table, store)?;
        let c = config.feed.concentrations();
        let ct: f64 = c.iter().sum();
        let v = config.feed.superficial_velocity(&config.reactor);
        let feed = FeedConditions {
            y: config.feed.mole_fractions(),
            C: c,
            Ct: ct,
            T: config.feed.T,
            P: config.feed.P,
            v,
            flux: ct * v,
        };
        let mut feed_config = config.feed.clone();
        let diffusivity = match &config.feed.diffusivity {
            Some(d) => d.clone(),
            None => {
                let d = mixture_diffusivities(&feed.y, feed.T, feed.P, &components)?;
                debug!("estimated feed diffusivities: {:?} m2/s", d);
                feed_config.diffusivity = Some(d.clone());
                d
            }
        };
        let wall = WallHeatExchange {
            U: config.heat_exchange.U,
            T_medium: config.heat_exchange.T_medium,
            a: config.heat_exchange.area(&config.reactor),
        };
        Ok(Self {
            variant: config.model,
            reaction_set,
            enthalpy,
            components,
            molar_masses,
            reactor: config.reactor.clone(),
            options: config.options.clone(),
            feed_config,
            feed,
            wall,
            viscosity: config.feed.viscosity,
            diffusivity,
            thermal_conductivity: config.feed.thermal_conductivity,
            area: config.reactor.cross_section_area(),
            correlations: config.correlations,
        })
    }

    pub fn n_species(&self) -> usize {
        self.feed.C.len()
    }

    pub fn floor(&self, c: f64) -> f64 {
        c.max(self.options.concentration_floor)
    }

    /// Σ max(C_i, floor)
    pub fn floored_total(&self, concentrations: &[f64]) -> f64 {
        concentrations.iter().map(|c| self.floor(*c)).sum()
    }

    /// mixture Cp at feed composition and temperature, J/mol/K
    pub fn feed_heat_capacity(&self) -> Result<f64, ReactorError> {
        let cp = heat_capacities(&self.components, self.feed.T);
        mixture_heat_capacity(&self.feed.y, &cp)
    }

    /// runs the kinetics once at the feed so that configuration errors surface before integration
    pub fn precheck_kinetics(&self) -> Result<(), ReactorError> {
        let c: Vec<f64> = self.feed.C.iter().map(|c| self.floor(*c)).collect();
        let conditions = LocalConditions {
            T: self.feed.T,
            P: self.feed.P,
            y: &self.feed.y,
            C: &c,
        };
        self.reaction_set.validate(&conditions)
    }
}

/// everything derived from (C, T, P, v) at one point
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedLocalState {
    /// floored concentrations, mol/m^3
    pub C: Vec<f64>,
    pub Ct: f64,
    pub y: Vec<f64>,
    pub T: f64,
    pub P: f64,
    pub v: f64,
    /// kg/mol
    pub mixture_molar_mass: f64,
    /// kg/m^3
    pub density: f64,
    /// J/mol/K
    pub Cp: f64,
    /// per reaction, mol/m^3/s
    pub reaction_rates: Vec<f64>,
    /// per species, mol/m^3/s
    pub formation_rates: Vec<f64>,
    pub total_formation_rate: f64,
    /// Σ R_j ΔH_j, W/m^3
    pub heat_of_reaction: f64,
    /// U a (Tm - T), W/m^3
    pub heat_exchange: f64,
    /// dP/dz, Pa/m; zero without momentum balance
    pub pressure_gradient: f64,
}

impl DerivedLocalState {
    #[allow(non_snake_case)]
    pub fn evaluate(
        params: &RunParameters,
        concentrations: &[f64],
        T: f64,
        P: f64,
        v: f64,
        at: Location,
    ) -> Result<Self, ReactorError> {
        ensure_finite_slice(at, "C", concentrations)?;
        ensure_finite(at, "T", T)?;
        ensure_finite(at, "P", P)?;
        ensure_finite(at, "v", v)?;
        if !(T > 0.0) || !(P > 0.0) {
            return Err(invalid_state(at, format!("non-physical T = {} K, P = {} Pa", T, P)));
        }

        let c: Vec<f64> = concentrations.iter().map(|ci| params.floor(*ci)).collect();
        let ct: f64 = c.iter().sum();
        let y: Vec<f64> = c.iter().map(|ci| ci / ct).collect();
        let mw = mixture_molar_mass(&y, &params.molar_masses)?;
        let density = ensure_finite(at, "density", density_ideal_gas(mw, ct))?;

        let conditions = LocalConditions { T, P, y: &y, C: &c };
        let n_reactions = params.reaction_set.n_reactions();
        let mut rates = vec![0.0; n_reactions];
        params
            .reaction_set
            .reaction_rates_into(&conditions, &mut rates)
            .map_err(|e| match e {
                ReactorError::Kinetics(KineticsError::NonFinite { name, value }) => {
                    invalid_state(at, format!("rate expression '{}' gave {}", name, value))
                }
                other => other,
            })?;
        let mut formation = vec![0.0; params.n_species()];
        params.reaction_set.formation_rates_into(&rates, &mut formation)?;
        ensure_finite_slice(at, "formation rate", &formation)?;
        let total_formation: f64 = formation.iter().sum();

        let cp_list = heat_capacities(&params.components, T);
        let cp = ensure_finite(at, "Cp", mixture_heat_capacity(&y, &cp_list)?)?;
        let heats = params.enthalpy.heats_of_reaction(T)?;
        let heat_of_reaction = ensure_finite(at, "heat of reaction", overall_heat_of_reaction(&rates, &heats))?;
        let wall = &params.wall;
        let q = heat_exchange(wall.T_medium, T, wall.U, wall.a);

        let dpdz = if params.options.momentum_balance {
            let r = &params.reactor;
            ensure_finite(
                at,
                "pressure gradient",
                ergun_pressure_gradient(params.viscosity, density, v, r.particle_diameter, r.void_fraction),
            )?
        } else {
            0.0
        };
        debug!("local state at {}: Ct = {:.4e}, T = {:.2}, P = {:.4e}, v = {:.4e}", at, ct, T, P, v);
        Ok(Self {
            C: c,
            Ct: ct,
            y,
            T,
            P,
            v,
            mixture_molar_mass: mw,
            density,
            Cp: cp,
            reaction_rates: rates,
            formation_rates: formation,
            total_formation_rate: total_formation,
            heat_of_reaction,
            heat_exchange: q,
            pressure_gradient: dpdz,
        })
    }

    /// -Σ R ΔH + Q, W/m^3
    pub fn heat_source(&self) -> f64 {
        -self.heat_of_reaction + self.heat_exchange
    }

    /// Dimensionless groups and gas/solid transfer coefficients at this point. Prandtl, Nusselt
    /// and h need the thermal conductivity.
    pub fn transport_numbers(&self, params: &RunParameters) -> TransportNumbers {
        let dp = params.reactor.particle_diameter;
        let mu = params.viscosity;
        let re = reynolds(self.density, self.v, dp, mu);
        let corr = params.correlations;
        let sc: Vec<f64> = params.diffusivity.iter().map(|di| schmidt(self.density, mu, *di)).collect();
        let sherwood: Vec<f64> = sc.iter().map(|sc| corr.sherwood.sherwood(re, *sc)).collect();
        let mass_transfer_coefficients = sherwood
            .iter()
            .zip(&params.diffusivity)
            .map(|(sh, di)| mass_transfer_coefficient(*sh, *di, dp))
            .collect();
        let heat = params.thermal_conductivity.map(|lambda| {
            let pr = prandtl(self.Cp, mu, lambda, self.mixture_molar_mass);
            let nu = corr.nusselt.nusselt(re, pr);
            (pr, nu, heat_transfer_coefficient(nu, lambda, dp))
        });
        TransportNumbers {
            reynolds: re,
            schmidt: sc,
            sherwood,
            mass_transfer_coefficients,
            prandtl: heat.map(|h| h.0),
            nusselt: heat.map(|h| h.1),
            heat_transfer_coefficient: heat.map(|h| h.2),
        }
    }
}

/// dimensionless groups at one point of the bed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportNumbers {
    pub reynolds: f64,
    pub schmidt: Vec<f64>,
    pub sherwood: Vec<f64>,
    /// m/s, per species
    pub mass_transfer_coefficients: Vec<f64>,
    pub prandtl: Option<f64>,
    pub nusselt: Option<f64>,
    /// W/m^2/K
    pub heat_transfer_coefficient: Option<f64>,
}

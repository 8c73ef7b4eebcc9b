//! # Run Configuration
//!
//! Immutable, validated description of one simulation run: reactor geometry and packing,
//! feed, wall heat exchange, numerical settings and the model variant.
//!
//! All quantities are SI molar: mol, J, Pa, m, s, K.
//!
//! ## Main Structures
//! - **`ReactorSpec`**: tube and catalyst bed
//! - **`FeedState`**: component list, composition, flow and state of the feed (z = 0, t = 0)
//! - **`HeatExchange`**: overall wall heat transfer coefficient, medium temperature, area per volume
//! - **`SolverSettings`**: grid sizes, time windows, integrator and root-solver settings
//! - **`ModelVariant`** / **`ModelOptions`**: closed set of reactor models and their switches
//! - **`SimulationConfig`**: everything above plus the reaction equations, loadable from JSON
//!
//! Rate expressions are closures and are attached in code (see `PackedBedTask`).
use super::reactor_error::ReactorError;
use crate::NumericalMethods::root_solver::RootSolverSettings;
use crate::NumericalMethods::ode_api::IntegratorSettings;
use crate::Thermodynamics::thermo_properties::total_concentration_ideal_gas;
use crate::Thermodynamics::transport_correlations::CorrelationSettings;
use crate::Utils::finite_difference::OutletCondition;
use crate::Utils::reactor_utils::{
    reactor_cross_section_area, superficial_velocity_from_flux, tube_heat_transfer_area,
};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// tube and catalyst bed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactorSpec {
    /// inner diameter, m
    pub diameter: f64,
    /// m
    pub length: f64,
    /// bed void fraction ε
    pub void_fraction: f64,
    /// m
    pub particle_diameter: f64,
    /// kg catalyst per m^3 of bed
    pub catalyst_bulk_density: f64,
    /// kg/m^3
    pub particle_density: f64,
    /// J/kg/K
    pub particle_heat_capacity: f64,
    /// pellet porosity εp; with the tortuosity it enables the outlet pellet analysis
    #[serde(default)]
    pub particle_porosity: Option<f64>,
    #[serde(default)]
    pub particle_tortuosity: Option<f64>,
    /// W/m/K
    #[serde(default)]
    pub particle_thermal_conductivity: Option<f64>,
}

impl ReactorSpec {
    pub fn cross_section_area(&self) -> f64 {
        reactor_cross_section_area(self.diameter)
    }

    pub fn volume(&self) -> f64 {
        self.cross_section_area() * self.length
    }

    pub fn validate(&self) -> Result<(), ReactorError> {
        for (name, value) in [
            ("diameter", self.diameter),
            ("length", self.length),
            ("particle diameter", self.particle_diameter),
            ("catalyst bulk density", self.catalyst_bulk_density),
            ("particle density", self.particle_density),
            ("particle heat capacity", self.particle_heat_capacity),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(ReactorError::InvalidConfiguration(format!(
                    "reactor {} must be positive, got {}",
                    name, value
                )));
            }
        }
        if !(self.void_fraction > 0.0 && self.void_fraction < 1.0) {
            return Err(ReactorError::InvalidConfiguration(format!(
                "void fraction must lie in (0, 1), got {}",
                self.void_fraction
            )));
        }
        if let Some(porosity) = self.particle_porosity {
            if !(0.0..1.0).contains(&porosity) {
                return Err(ReactorError::InvalidConfiguration(format!(
                    "particle porosity must lie in [0, 1), got {}",
                    porosity
                )));
            }
        }
        for (name, value) in [
            ("particle tortuosity", self.particle_tortuosity),
            ("particle thermal conductivity", self.particle_thermal_conductivity),
        ] {
            if let Some(value) = value.filter(|v| !(*v > 0.0) || !v.is_finite()) {
                return Err(ReactorError::InvalidConfiguration(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// feed composition, in component-list order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeedComposition {
    MoleFractions(Vec<f64>),
    /// mol/m^3
    Concentrations(Vec<f64>),
}

/// how the feed flow is given
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FeedFlow {
    /// m/s
    SuperficialVelocity(f64),
    /// mol/s
    MolarFlowrate(f64),
    /// m^3/s at feed conditions
    VolumetricFlowrate(f64),
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedState {
    pub species: Vec<String>,
    pub composition: FeedComposition,
    pub flow: FeedFlow,
    /// K
    pub T: f64,
    /// Pa
    pub P: f64,
    /// mixture viscosity, Pa·s
    pub viscosity: f64,
    /// per-species gas diffusivity, m^2/s; estimated from the critical constants when absent
    #[serde(default)]
    pub diffusivity: Option<Vec<f64>>,
    /// mixture thermal conductivity, W/m/K
    #[serde(default)]
    pub thermal_conductivity: Option<f64>,
}

impl FeedState {
    /// feed concentrations, mol/m^3; mole fractions are converted with the ideal-gas law
    pub fn concentrations(&self) -> Vec<f64> {
        match &self.composition {
            FeedComposition::Concentrations(c) => c.clone(),
            FeedComposition::MoleFractions(y) => {
                let ct = total_concentration_ideal_gas(self.P, self.T);
                y.iter().map(|yi| yi * ct).collect()
            }
        }
    }

    pub fn total_concentration(&self) -> f64 {
        self.concentrations().iter().sum()
    }

    pub fn mole_fractions(&self) -> Vec<f64> {
        match &self.composition {
            FeedComposition::MoleFractions(y) => {
                let total: f64 = y.iter().sum();
                y.iter().map(|yi| yi / total).collect()
            }
            FeedComposition::Concentrations(c) => {
                let total: f64 = c.iter().sum();
                c.iter().map(|ci| ci / total).collect()
            }
        }
    }

    /// superficial velocity at the inlet, m/s
    pub fn superficial_velocity(&self, reactor: &ReactorSpec) -> f64 {
        let area = reactor.cross_section_area();
        match self.flow {
            FeedFlow::SuperficialVelocity(v) => v,
            FeedFlow::VolumetricFlowrate(q) => q / area,
            FeedFlow::MolarFlowrate(f) => f / (self.total_concentration() * area),
        }
    }

    /// total molar flux at the inlet, mol/m^2/s
    pub fn molar_flux(&self, reactor: &ReactorSpec) -> f64 {
        self.total_concentration() * self.superficial_velocity(reactor)
    }

    pub fn validate(&self, reactor: &ReactorSpec) -> Result<(), ReactorError> {
        let n = self.species.len();
        if n == 0 {
            return Err(ReactorError::InvalidConfiguration(
                "feed has no species".to_string(),
            ));
        }
        let composition = match &self.composition {
            FeedComposition::MoleFractions(y) => y,
            FeedComposition::Concentrations(c) => c,
        };
        if composition.len() != n {
            return Err(ReactorError::InvalidConfiguration(format!(
                "feed composition has {} entries for {} species",
                composition.len(),
                n
            )));
        }
        if composition.iter().any(|v| *v < 0.0 || !v.is_finite()) {
            return Err(ReactorError::InvalidConfiguration(
                "feed composition must be finite and non-negative".to_string(),
            ));
        }
        if !(composition.iter().sum::<f64>() > 0.0) {
            return Err(ReactorError::InvalidConfiguration(
                "feed composition sums to zero".to_string(),
            ));
        }
        if let FeedComposition::MoleFractions(y) = &self.composition {
            let sum: f64 = y.iter().sum();
            if (sum - 1.0).abs() > 1e-6 {
                return Err(ReactorError::InvalidConfiguration(format!(
                    "feed mole fractions sum to {}, not 1",
                    sum
                )));
            }
        }
        for (name, value) in [
            ("temperature", self.T),
            ("pressure", self.P),
            ("viscosity", self.viscosity),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(ReactorError::InvalidConfiguration(format!(
                    "feed {} must be positive, got {}",
                    name, value
                )));
            }
        }
        let flow = match self.flow {
            FeedFlow::SuperficialVelocity(v) => v,
            FeedFlow::MolarFlowrate(f) => f,
            FeedFlow::VolumetricFlowrate(q) => q,
        };
        if !(flow > 0.0) || !flow.is_finite() {
            return Err(ReactorError::InvalidConfiguration(format!(
                "feed flow must be positive, got {}",
                flow
            )));
        }
        if let Some(d) = &self.diffusivity {
            if d.len() != n || d.iter().any(|v| !(*v > 0.0)) {
                return Err(ReactorError::InvalidConfiguration(
                    "one positive diffusivity per species is required".to_string(),
                ));
            }
        }
        if let Some(lambda) = self.thermal_conductivity {
            if !(lambda > 0.0) {
                return Err(ReactorError::InvalidConfiguration(format!(
                    "thermal conductivity must be positive, got {}",
                    lambda
                )));
            }
        }
        let v = self.superficial_velocity(reactor);
        if !(v > 0.0) || !v.is_finite() {
            return Err(ReactorError::InvalidConfiguration(format!(
                "feed superficial velocity is {}",
                v
            )));
        }
        Ok(())
    }
}

/// wall heat exchange Q = U a (Tm - T)
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatExchange {
    /// overall heat transfer coefficient, W/m^2/K
    pub U: f64,
    /// medium temperature, K
    pub T_medium: f64,
    /// heat transfer area per reactor volume, m^2/m^3; 4/D when absent
    #[serde(default)]
    pub area_per_volume: Option<f64>,
}

impl HeatExchange {
    #[allow(non_snake_case)]
    pub fn adiabatic(T_medium: f64) -> Self {
        Self {
            U: 0.0,
            T_medium,
            area_per_volume: None,
        }
    }

    pub fn area(&self, reactor: &ReactorSpec) -> f64 {
        self.area_per_volume
            .unwrap_or_else(|| tube_heat_transfer_area(reactor.diameter))
    }

    pub fn validate(&self) -> Result<(), ReactorError> {
        if self.U < 0.0 || !self.U.is_finite() {
            return Err(ReactorError::InvalidConfiguration(format!(
                "heat transfer coefficient must be non-negative, got {}",
                self.U
            )));
        }
        if !(self.T_medium > 0.0) {
            return Err(ReactorError::InvalidConfiguration(format!(
                "medium temperature must be positive, got {}",
                self.T_medium
            )));
        }
        if let Some(a) = self.area_per_volume {
            if !(a > 0.0) {
                return Err(ReactorError::InvalidConfiguration(format!(
                    "heat transfer area per volume must be positive, got {}",
                    a
                )));
            }
        }
        Ok(())
    }
}

/// grid sizes, time windows and numerical settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    /// axial grid nodes of the discretised models
    pub z_no: usize,
    /// radial nodes of a catalyst pellet
    pub r_no: usize,
    /// number of time windows of a dynamic run
    pub t_no: usize,
    /// samples stored inside each time window
    pub times_no: usize,
    /// samples along the reactor of a steady plug-flow run
    pub steady_times_no: usize,
    /// total operating time of a dynamic run, s
    pub operating_time: f64,
    pub integrator: IntegratorSettings,
    pub root: RootSolverSettings,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            z_no: 25,
            r_no: 7,
            t_no: 25,
            times_no: 5,
            steady_times_no: 25,
            operating_time: 10.0,
            integrator: IntegratorSettings::default(),
            root: RootSolverSettings::default(),
        }
    }
}

impl SolverSettings {
    pub fn validate(&self, model: &ModelVariant) -> Result<(), ReactorError> {
        if model.is_discretised() && self.z_no < 2 {
            return Err(ReactorError::InvalidConfiguration(format!(
                "axial grid needs at least 2 nodes, got z_no = {}",
                self.z_no
            )));
        }
        if model.is_dynamic() {
            if self.t_no == 0 {
                return Err(ReactorError::InvalidConfiguration(
                    "dynamic run needs at least one time window".to_string(),
                ));
            }
            if self.times_no < 2 {
                return Err(ReactorError::InvalidConfiguration(format!(
                    "each time window needs at least 2 samples, got {}",
                    self.times_no
                )));
            }
            if !(self.operating_time > 0.0) || !self.operating_time.is_finite() {
                return Err(ReactorError::InvalidConfiguration(format!(
                    "operating time span is empty: {}",
                    self.operating_time
                )));
            }
        } else if self.steady_times_no < 2 {
            return Err(ReactorError::InvalidConfiguration(format!(
                "steady run needs at least 2 samples, got {}",
                self.steady_times_no
            )));
        }
        self.integrator
            .validate()
            .map_err(|e| ReactorError::InvalidConfiguration(e.to_string()))?;
        self.root
            .validate()
            .map_err(|e| ReactorError::InvalidConfiguration(e.to_string()))?;
        Ok(())
    }
}

/// velocity of the dynamic dispersed model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VelocityTreatment {
    /// v = v0 (C0/C)(P0/P) at every node
    #[default]
    EquationOfState,
    /// dv/dz from the differential ideal-gas law, marched node by node
    Marching,
}

/// closed set of reactor models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelVariant {
    /// steady plug flow; species flowrates, total flux, T, P
    PlugFlowFlux,
    /// steady plug flow; concentrations, T, P
    PlugFlowConcentration,
    /// steady plug flow; concentrations, T, P, v
    PlugFlowVariableVelocity,
    /// dynamic, axial finite-difference grid; concentrations and T per node
    DynamicDispersed { velocity: VelocityTreatment },
    /// steady plug flow in feed-scaled variables
    DimensionlessPlugFlow,
    /// steady axially dispersed residual model in feed-scaled variables
    SteadyDispersedDimensionless,
}

impl ModelVariant {
    /// stable short name used in logs, errors and results
    pub fn id(&self) -> &'static str {
        match self {
            ModelVariant::PlugFlowFlux => "M1",
            ModelVariant::DynamicDispersed {
                velocity: VelocityTreatment::EquationOfState,
            } => "M2",
            ModelVariant::PlugFlowConcentration => "M3",
            ModelVariant::PlugFlowVariableVelocity => "M4",
            ModelVariant::DynamicDispersed {
                velocity: VelocityTreatment::Marching,
            } => "M5",
            ModelVariant::DimensionlessPlugFlow => "N1",
            ModelVariant::SteadyDispersedDimensionless => "T1",
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, ModelVariant::DynamicDispersed { .. })
    }

    /// models on an axial grid of `z_no` nodes
    pub fn is_discretised(&self) -> bool {
        matches!(
            self,
            ModelVariant::DynamicDispersed { .. } | ModelVariant::SteadyDispersedDimensionless
        )
    }

    /// models solved as F(x) = 0
    pub fn is_algebraic(&self) -> bool {
        matches!(self, ModelVariant::SteadyDispersedDimensionless)
    }

    pub fn is_dimensionless(&self) -> bool {
        matches!(
            self,
            ModelVariant::DimensionlessPlugFlow | ModelVariant::SteadyDispersedDimensionless
        )
    }
}

/// reference concentration of the scaled models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConcentrationReference {
    /// each species by its own feed concentration; every feed concentration must be positive
    PerSpecies,
    /// every species by the largest feed concentration
    #[default]
    Max,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOptions {
    /// when false the temperature stays at its feed value
    pub energy_balance: bool,
    /// when false the pressure stays at its feed value
    pub momentum_balance: bool,
    /// effective axial dispersion terms in the dynamic grid model
    pub axial_dispersion: bool,
    /// lower bound of concentrations seen by the local state, mol/m^3
    pub concentration_floor: f64,
    pub concentration_reference: ConcentrationReference,
    /// closure of the grid models at z = L
    #[serde(default)]
    pub outlet_condition: OutletCondition,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            energy_balance: true,
            momentum_balance: true,
            axial_dispersion: false,
            concentration_floor: 1e-10,
            concentration_reference: ConcentrationReference::Max,
            outlet_condition: OutletCondition::ZeroGradient,
        }
    }
}

impl ModelOptions {
    pub fn isothermal(mut self) -> Self {
        self.energy_balance = false;
        self
    }

    pub fn without_pressure_drop(mut self) -> Self {
        self.momentum_balance = false;
        self
    }
}

/// complete data of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub reactor: ReactorSpec,
    pub feed: FeedState,
    pub heat_exchange: HeatExchange,
    #[serde(default)]
    pub solver: SolverSettings,
    pub model: ModelVariant,
    #[serde(default)]
    pub options: ModelOptions,
    #[serde(default)]
    pub correlations: CorrelationSettings,
    /// reaction equations such as "CO2 + 3H2 <=> CH3OH + H2O"
    pub reactions: Vec<String>,
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ReactorError> {
        self.reactor.validate()?;
        self.feed.validate(&self.reactor)?;
        self.heat_exchange.validate()?;
        self.solver.validate(&self.model)?;
        if !(self.options.concentration_floor > 0.0) {
            return Err(ReactorError::InvalidConfiguration(format!(
                "concentration floor must be positive, got {}",
                self.options.concentration_floor
            )));
        }
        let needs_transport = self.model == ModelVariant::SteadyDispersedDimensionless
            || (self.model.is_dynamic() && self.options.axial_dispersion);
        // diffusivities left out are estimated from the critical constants
        if needs_transport && self.feed.thermal_conductivity.is_none() {
            return Err(ReactorError::MissingData(format!(
                "model {} with axial dispersion needs the gas thermal conductivity",
                self.model.id()
            )));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, ReactorError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ReactorError> {
        info!("loading run configuration from {}", path.as_ref().display());
        let file = File::open(path)?;
        let config: SimulationConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ReactorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// feed molar flux, mol/m^2/s
    pub fn feed_molar_flux(&self) -> f64 {
        self.feed.molar_flux(&self.reactor)
    }

    /// superficial velocity recomputed from the feed flux with the ideal-gas law
    pub fn feed_velocity_from_flux(&self) -> f64 {
        superficial_velocity_from_flux(self.feed_molar_flux(), self.feed.P, self.feed.T)
    }
}

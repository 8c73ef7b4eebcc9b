//! # Feed-Scaled Models
//!
//! Both models work in the variables of `ScalingFactors` and rebuild physical values only to
//! evaluate the local state.
//!
//! ## N1, steady plug flow over z* ∈ [0, 1]
//! ```text
//! v* = v/vf,  ρ* = Ct/Cf,  Cp* = Cp/Cpf
//! dC*_i/dz* = r_i / (mass_conv_i v*)
//! dT*/dz*   = (-Σ R_j ΔH_j + Q) / heat_conv / (ρ* Cp* v*)
//! dP*/dz*   = Ergun zf / Pf
//! ```
//! ## T1, steady axial dispersion as F(x) = 0
//! Unknowns C*_i and T* on `z_no` nodes over z* ∈ [0, 1], pressure fixed at the feed value.
//! ```text
//! 0 = -v* dC*_i/dz* + (ε/Pe_m,i) d2C*_i/dz*2 + r_i / mass_conv_i
//! 0 = -v* ρ* Cp* dT*/dz* + (ε/Pe_h) d2T*/dz*2 + (-Σ R_j ΔH_j + Q) / heat_conv
//! ```
//! Danckwerts inlet ghosts and zero-gradient outlet ghosts close the stencils. Without the
//! energy balance the temperature residual is T* itself.
use super::local_state::{DerivedLocalState, Location, RunParameters, invalid_state};
use super::model_assembler::{PhysicalProfile, RhsAssembler};
use super::plug_flow::{lumped, species_at};
use super::reactor_error::ReactorError;
use super::scaling::ScalingFactors;
use super::state_layout::{StateLayout, StateRecord};
use crate::Utils::finite_difference::{FdScheme, InletCondition, UniformGrid, axial_stencil};
use crate::Utils::reactor_utils::velocity_from_eos;
use log::info;
use nalgebra::DVector;

fn scaling_for(params: &RunParameters) -> Result<ScalingFactors, ReactorError> {
    let scaling = ScalingFactors::new(
        &params.feed_config,
        &params.reactor,
        params.feed_heat_capacity()?,
        params.options.concentration_reference,
    )?;
    info!(
        "scaling: Cf = {:.4e} mol/m3, Tf = {} K, Pf = {:.4e} Pa, vf = {:.4e} m/s, zf = {} m",
        scaling.Cf, scaling.Tf, scaling.Pf, scaling.vf, scaling.zf
    );
    Ok(scaling)
}

/// physical (C, T, P, v) of one scaled point
#[allow(non_snake_case)]
fn physical_point(
    params: &RunParameters,
    s: &ScalingFactors,
    c_star: &[f64],
    T_star: f64,
    P_star: f64,
) -> (Vec<f64>, f64, f64, f64) {
    let c = s.concentration_to_physical(c_star);
    let T = s.temperature_to_physical(T_star);
    let P = s.pressure_to_physical(P_star);
    let v = velocity_from_eos(s.vf, s.Cf, params.floored_total(&c), s.Pf, P);
    (c, T, P, v)
}

#[derive(Debug, Clone)]
pub struct DimensionlessPlugFlowModel {
    params: RunParameters,
    scaling: ScalingFactors,
    layout: StateLayout,
}

impl DimensionlessPlugFlowModel {
    pub fn new(params: RunParameters) -> Result<Self, ReactorError> {
        let scaling = scaling_for(&params)?;
        let layout = StateLayout::for_variant(&params.variant, params.n_species(), 1);
        Ok(Self {
            params,
            scaling,
            layout,
        })
    }

    pub fn scaling(&self) -> &ScalingFactors {
        &self.scaling
    }
}

impl RhsAssembler for DimensionlessPlugFlowModel {
    fn params(&self) -> &RunParameters {
        &self.params
    }

    fn layout(&self) -> StateLayout {
        self.layout
    }

    fn initial_state(&self) -> Result<DVector<f64>, ReactorError> {
        let s = &self.scaling;
        let mut record = self.layout.zeros();
        for (i, c) in s.concentration_to_dimensionless(&s.Cif).into_iter().enumerate() {
            record.species[i][0] = c;
        }
        record.temperature[0] = 0.0;
        record.pressure = Some(vec![1.0]);
        self.layout.pack_new(&record)
    }

    #[allow(non_snake_case)]
    fn evaluate(&self, x: f64, state: &DVector<f64>, out: &mut DVector<f64>) -> Result<(), ReactorError> {
        let at = Location::at(x);
        let s = &self.scaling;
        let record = self.layout.unpack(state)?;
        let P_star = lumped(&record.pressure, "pressure")?;
        let (c, T, P, v) = physical_point(&self.params, s, &species_at(&record, 0), record.temperature[0], P_star);
        let ls = DerivedLocalState::evaluate(&self.params, &c, T, P, v, at)?;
        let v_star = s.velocity_to_dimensionless(v);
        let rho_star = ls.Ct / s.Cf;
        let cp_star = ls.Cp / s.Cpf;

        let mut d = self.layout.zeros();
        for (i, r) in ls.formation_rates.iter().enumerate() {
            d.species[i][0] = r / (s.mass_convective[i] * v_star);
        }
        if self.params.options.energy_balance {
            d.temperature[0] = ls.heat_source() / s.heat_convective / (rho_star * cp_star * v_star);
        }
        d.pressure = Some(vec![ls.pressure_gradient * s.zf / s.Pf]);
        self.layout.pack(&d, out)
    }

    #[allow(non_snake_case)]
    fn physical_profile(&self, state: &DVector<f64>) -> Result<PhysicalProfile, ReactorError> {
        let record = self.layout.unpack(state)?;
        let P_star = lumped(&record.pressure, "pressure")?;
        let (c, T, P, v) = physical_point(
            &self.params,
            &self.scaling,
            &species_at(&record, 0),
            record.temperature[0],
            P_star,
        );
        Ok(PhysicalProfile {
            concentrations: c.into_iter().map(|ci| vec![ci]).collect(),
            temperature: vec![T],
            pressure: vec![P],
            velocity: vec![v],
        })
    }

    fn axial_end(&self) -> f64 {
        1.0
    }

    fn to_metres(&self, x: f64) -> f64 {
        self.scaling.length_to_physical(x)
    }
}

#[derive(Debug, Clone)]
pub struct SteadyDispersedModel {
    params: RunParameters,
    scaling: ScalingFactors,
    layout: StateLayout,
    /// grid over z* ∈ [0, 1]
    grid: UniformGrid,
    peclet_mass: Vec<f64>,
    peclet_heat: f64,
}

impl SteadyDispersedModel {
    pub fn new(params: RunParameters, z_no: usize) -> Result<Self, ReactorError> {
        let scaling = scaling_for(&params)?;
        let peclet_mass = scaling
            .peclet_mass
            .clone()
            .ok_or_else(|| ReactorError::MissingData("species diffusivities for the mass Peclet numbers".to_string()))?;
        let peclet_heat = scaling.peclet_heat.ok_or_else(|| {
            ReactorError::MissingData("gas thermal conductivity for the heat Peclet number".to_string())
        })?;
        info!("Peclet numbers: mass {:?}, heat {:.4e}", peclet_mass, peclet_heat);
        let grid = UniformGrid::new(z_no, 1.0)?;
        let layout = StateLayout::for_variant(&params.variant, params.n_species(), z_no);
        Ok(Self {
            params,
            scaling,
            layout,
            grid,
            peclet_mass,
            peclet_heat,
        })
    }

    pub fn scaling(&self) -> &ScalingFactors {
        &self.scaling
    }

    #[allow(non_snake_case)]
    fn local_states(&self, record: &StateRecord) -> Result<Vec<DerivedLocalState>, ReactorError> {
        (0..self.grid.n)
            .map(|z| {
                let at = Location::node(z as f64 * self.grid.dz, z);
                let (c, T, P, v) =
                    physical_point(&self.params, &self.scaling, &species_at(record, z), record.temperature[z], 1.0);
                if !(v > 0.0) {
                    return Err(invalid_state(at, format!("superficial velocity is {}", v)));
                }
                DerivedLocalState::evaluate(&self.params, &c, T, P, v, at)
            })
            .collect()
    }
}

impl RhsAssembler for SteadyDispersedModel {
    fn params(&self) -> &RunParameters {
        &self.params
    }

    fn layout(&self) -> StateLayout {
        self.layout
    }

    /// feed everywhere
    fn initial_state(&self) -> Result<DVector<f64>, ReactorError> {
        let s = &self.scaling;
        let n = self.grid.n;
        let mut record = self.layout.zeros();
        for (i, c) in s.concentration_to_dimensionless(&s.Cif).into_iter().enumerate() {
            record.species[i] = vec![c; n];
        }
        self.layout.pack_new(&record)
    }

    fn evaluate(&self, _x: f64, state: &DVector<f64>, out: &mut DVector<f64>) -> Result<(), ReactorError> {
        let record = self.layout.unpack(state)?;
        let states = self.local_states(&record)?;
        let s = &self.scaling;
        let eps = self.params.reactor.void_fraction;
        let dz = self.grid.dz;
        let feed = s.concentration_to_dimensionless(&s.Cif);

        let outlet = self.params.options.outlet_condition;
        let mut res = self.layout.zeros();
        for (z, ls) in states.iter().enumerate() {
            let v_star = s.velocity_to_dimensionless(ls.v);
            for i in 0..self.params.n_species() {
                let inlet = InletCondition::Danckwerts {
                    feed: feed[i],
                    peclet: self.peclet_mass[i],
                };
                let st = axial_stencil(&self.grid, &record.species[i], z, inlet, outlet, None)?;
                res.species[i][z] = -v_star * st.first(dz, FdScheme::Backward)
                    + eps / self.peclet_mass[i] * st.second(dz)
                    + ls.formation_rates[i] / s.mass_convective[i];
            }
            res.temperature[z] = if self.params.options.energy_balance {
                let inlet = InletCondition::Danckwerts {
                    feed: 0.0,
                    peclet: self.peclet_heat,
                };
                let st = axial_stencil(&self.grid, &record.temperature, z, inlet, outlet, None)?;
                let rho_star = ls.Ct / s.Cf;
                let cp_star = ls.Cp / s.Cpf;
                -v_star * rho_star * cp_star * st.first(dz, FdScheme::Backward)
                    + eps / self.peclet_heat * st.second(dz)
                    + ls.heat_source() / s.heat_convective
            } else {
                record.temperature[z]
            };
        }
        self.layout.pack(&res, out)
    }

    fn physical_profile(&self, state: &DVector<f64>) -> Result<PhysicalProfile, ReactorError> {
        let record = self.layout.unpack(state)?;
        let n = self.grid.n;
        let mut profile = PhysicalProfile {
            concentrations: vec![Vec::with_capacity(n); self.params.n_species()],
            temperature: Vec::with_capacity(n),
            pressure: vec![self.scaling.Pf; n],
            velocity: Vec::with_capacity(n),
        };
        for z in 0..n {
            let (c, t, _, v) =
                physical_point(&self.params, &self.scaling, &species_at(&record, z), record.temperature[z], 1.0);
            for (i, ci) in c.into_iter().enumerate() {
                profile.concentrations[i].push(ci);
            }
            profile.temperature.push(t);
            profile.velocity.push(v);
        }
        Ok(profile)
    }

    fn axial_end(&self) -> f64 {
        1.0
    }

    fn to_metres(&self, x: f64) -> f64 {
        self.scaling.length_to_physical(x)
    }

    fn axial_nodes(&self) -> Vec<f64> {
        self.grid.nodes().into_iter().map(|z| self.scaling.length_to_physical(z)).collect()
    }
}

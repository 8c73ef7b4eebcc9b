//! # Dynamic Axially Dispersed Bed
//!
//! Concentrations and temperature on `z_no` axial nodes, integrated in time. Pressure and
//! velocity are algebraic along z and are not part of the state: every evaluation first
//! marches them from the inlet over the current snapshot (`march_algebraic_fields`), then
//! computes the field derivatives from the snapshot and the marched profile. Neither step
//! mutates anything outside its return value.
//!
//! Per node, with backward first derivatives and the feed as inlet ghost:
//! ```text
//! ε dC_i/dt = -v dC_i/dz - C_i dv/dz + r_i (+ ε D_i d2C_i/dz2)
//! (Ct Cp ε + (1-ε) ρp Cpp) dT/dt = -Ct v Cp dT/dz - Σ R_j ΔH_j + Q (+ ε λ d2T/dz2)
//! ```
//! `EquationOfState` velocity: `v = v0 (C0/Ct)(P0/P)` and the `dv/dz` term is absent (M2).
//! `Marching` velocity: `v_{k+1} = v_k + dz dv/dz` from the differential ideal-gas law (M5).
//! Dispersion terms use a Danckwerts inlet and a zero-gradient outlet.
use super::local_state::{DerivedLocalState, Location, RunParameters, ensure_finite};
use super::model_assembler::{PhysicalProfile, RhsAssembler};
use super::plug_flow::{species_at, velocity_gradient};
use super::reactor_config::VelocityTreatment;
use super::reactor_error::ReactorError;
use super::state_layout::{StateLayout, StateRecord};
use crate::Utils::finite_difference::{FdScheme, InletCondition, UniformGrid, axial_stencil};
use crate::Utils::reactor_utils::velocity_from_eos;
use log::trace;
use nalgebra::DVector;

/// pressure and velocity marched over one snapshot of the bed
#[derive(Debug, Clone)]
pub struct AlgebraicProfile {
    /// local state of every node
    pub states: Vec<DerivedLocalState>,
    /// Pa, `z_no + 1` values, the last one beyond the outlet node
    pub pressure: Vec<f64>,
    /// m/s, `z_no + 1` values
    pub velocity: Vec<f64>,
    /// dv/dz per node, zero for the equation-of-state velocity
    pub velocity_gradient: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct DynamicDispersedModel {
    params: RunParameters,
    velocity: VelocityTreatment,
    layout: StateLayout,
    grid: UniformGrid,
}

impl DynamicDispersedModel {
    pub fn new(params: RunParameters, velocity: VelocityTreatment, z_no: usize) -> Result<Self, ReactorError> {
        let grid = UniformGrid::new(z_no, params.reactor.length)?;
        if params.options.axial_dispersion && params.thermal_conductivity.is_none() {
            return Err(ReactorError::MissingData(
                "axial dispersion needs the gas thermal conductivity".to_string(),
            ));
        }
        let layout = StateLayout::for_variant(&params.variant, params.n_species(), z_no);
        Ok(Self {
            params,
            velocity,
            layout,
            grid,
        })
    }

    pub fn grid(&self) -> &UniformGrid {
        &self.grid
    }

    /// Marches P (and v for the marching treatment) from the inlet across `record`.
    #[allow(non_snake_case)]
    pub fn march_algebraic_fields(&self, t: f64, record: &StateRecord) -> Result<AlgebraicProfile, ReactorError> {
        let p = &self.params;
        let n = self.grid.n;
        let dz = self.grid.dz;
        let mut pressure = Vec::with_capacity(n + 1);
        let mut velocity = Vec::with_capacity(n + 1);
        let mut gradient = Vec::with_capacity(n);
        let mut states = Vec::with_capacity(n);
        pressure.push(p.feed.P);
        velocity.push(p.feed.v);

        for z in 0..n {
            let at = Location::node(t, z);
            let c = species_at(record, z);
            let T = record.temperature[z];
            let P = pressure[z];
            let v = match self.velocity {
                VelocityTreatment::EquationOfState => {
                    let v = velocity_from_eos(p.feed.v, p.feed.Ct, p.floored_total(&c), p.feed.P, P);
                    velocity[z] = v;
                    v
                }
                VelocityTreatment::Marching => velocity[z],
            };
            let ls = DerivedLocalState::evaluate(p, &c, T, P, v, at)?;
            pressure.push(ensure_finite(at, "marched pressure", P + dz * ls.pressure_gradient)?);

            let dvdz = match self.velocity {
                VelocityTreatment::EquationOfState => 0.0,
                VelocityTreatment::Marching => {
                    let dTdz = axial_stencil(
                        &self.grid,
                        &record.temperature,
                        z,
                        InletCondition::Feed(p.feed.T),
                        p.options.outlet_condition,
                        None,
                    )?
                    .first(dz, FdScheme::Backward);
                    velocity_gradient(ls.Ct, v, T, P, ls.pressure_gradient, dTdz, ls.total_formation_rate)
                }
            };
            velocity.push(ensure_finite(at, "marched velocity", v + dz * dvdz)?);
            gradient.push(dvdz);
            states.push(ls);
        }
        trace!(
            "t = {:e}: outlet P = {:.5e} Pa, outlet v = {:.5e} m/s",
            t,
            pressure[n],
            velocity[n]
        );
        Ok(AlgebraicProfile {
            states,
            pressure,
            velocity,
            velocity_gradient: gradient,
        })
    }

    fn species_inlet(&self, i: usize, v: f64) -> Result<InletCondition, ReactorError> {
        let feed = self.params.feed.C[i];
        if !self.params.options.axial_dispersion {
            return Ok(InletCondition::Feed(feed));
        }
        Ok(InletCondition::Danckwerts {
            feed,
            peclet: v / self.params.diffusivity[i],
        })
    }

    fn temperature_inlet(&self, ls: &DerivedLocalState) -> Result<InletCondition, ReactorError> {
        let feed = self.params.feed.T;
        if !self.params.options.axial_dispersion {
            return Ok(InletCondition::Feed(feed));
        }
        let lambda = self
            .params
            .thermal_conductivity
            .ok_or_else(|| ReactorError::MissingData("gas thermal conductivity".to_string()))?;
        Ok(InletCondition::Danckwerts {
            feed,
            peclet: ls.Ct * ls.Cp * ls.v / lambda,
        })
    }
}

impl RhsAssembler for DynamicDispersedModel {
    fn params(&self) -> &RunParameters {
        &self.params
    }

    fn layout(&self) -> StateLayout {
        self.layout
    }

    /// the bed holds the feed everywhere at t = 0
    fn initial_state(&self) -> Result<DVector<f64>, ReactorError> {
        let feed = &self.params.feed;
        let n = self.grid.n;
        let mut record = self.layout.zeros();
        for (i, c) in feed.C.iter().enumerate() {
            record.species[i] = vec![*c; n];
        }
        record.temperature = vec![feed.T; n];
        self.layout.pack_new(&record)
    }

    fn evaluate(&self, t: f64, state: &DVector<f64>, out: &mut DVector<f64>) -> Result<(), ReactorError> {
        let record = self.layout.unpack(state)?;
        let profile = self.march_algebraic_fields(t, &record)?;
        let p = &self.params;
        let eps = p.reactor.void_fraction;
        let dz = self.grid.dz;
        let floor = Some(p.options.concentration_floor);
        let solid_capacity = (1.0 - eps) * p.reactor.particle_density * p.reactor.particle_heat_capacity;

        let mut d = self.layout.zeros();
        for z in 0..self.grid.n {
            let ls = &profile.states[z];
            let v = ls.v;
            let dvdz = profile.velocity_gradient[z];
            for i in 0..p.n_species() {
                let field = &record.species[i];
                let inlet = self.species_inlet(i, v)?;
                let stencil = axial_stencil(&self.grid, field, z, inlet, p.options.outlet_condition, floor)?;
                let convection = -v * stencil.first(dz, FdScheme::Backward);
                let dispersion = if p.options.axial_dispersion {
                    eps * p.diffusivity[i] * stencil.second(dz)
                } else {
                    0.0
                };
                d.species[i][z] = (convection - field[z] * dvdz + ls.formation_rates[i] + dispersion) / eps;
            }

            if p.options.energy_balance {
                let inlet = self.temperature_inlet(ls)?;
                let stencil = axial_stencil(
                    &self.grid,
                    &record.temperature,
                    z,
                    inlet,
                    p.options.outlet_condition,
                    None,
                )?;
                let convection = -(ls.Ct * v) * ls.Cp * stencil.first(dz, FdScheme::Backward);
                let conduction = match p.thermal_conductivity {
                    Some(lambda) if p.options.axial_dispersion => eps * lambda * stencil.second(dz),
                    _ => 0.0,
                };
                let capacity = ls.Ct * ls.Cp * eps + solid_capacity;
                d.temperature[z] = (convection + ls.heat_source() + conduction) / capacity;
            }
        }
        self.layout.pack(&d, out)
    }

    fn physical_profile(&self, state: &DVector<f64>) -> Result<PhysicalProfile, ReactorError> {
        let record = self.layout.unpack(state)?;
        let profile = self.march_algebraic_fields(f64::NAN, &record)?;
        let n = self.grid.n;
        Ok(PhysicalProfile {
            concentrations: record.species,
            temperature: record.temperature,
            pressure: profile.pressure[..n].to_vec(),
            velocity: profile.states.iter().map(|s| s.v).collect(),
        })
    }

    fn axial_nodes(&self) -> Vec<f64> {
        self.grid.nodes()
    }
}
